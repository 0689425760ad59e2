use std::fmt;
use std::path::Path;

use crate::rules::{Finding, RuleId};

/// 一次守卫运行的汇总结果。
///
/// # 契约（What）
/// - `findings` 按（规则顺序、路径、行号）排序，与文件处理顺序无关；
/// - `rules` 记录本次运行启用的规则，用于输出“哪些规则通过”。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuardReport {
    rules: Vec<RuleId>,
    findings: Vec<Finding>,
    files_scanned: usize,
}

impl GuardReport {
    pub(crate) fn new(
        mut rules: Vec<RuleId>,
        mut findings: Vec<Finding>,
        files_scanned: usize,
    ) -> Self {
        rules.sort();
        rules.dedup();
        findings.sort_by(|left, right| {
            (left.rule, &left.path, left.line, &left.fragment).cmp(&(
                right.rule,
                &right.path,
                right.line,
                &right.fragment,
            ))
        });
        Self {
            rules,
            findings,
            files_scanned,
        }
    }

    /// 没有任何违规时返回 `true`。
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn rules(&self) -> &[RuleId] {
        &self.rules
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// 指定规则的违规。
    pub fn for_rule(&self, rule: RuleId) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |finding| finding.rule == rule)
    }

    /// 出现在任一违规中的文件，去重且有序。
    pub fn offending_paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self
            .findings
            .iter()
            .map(|finding| finding.path.as_path())
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

impl fmt::Display for GuardReport {
    /// 逐条规则列出全部违规，便于一次性修复。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(
                f,
                "{} file(s) checked, no violations ({})",
                self.files_scanned,
                self.rules
                    .iter()
                    .map(|rule| rule.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        writeln!(
            f,
            "{} violation(s) in {} of {} file(s):",
            self.findings.len(),
            self.offending_paths().len(),
            self.files_scanned
        )?;
        for rule in &self.rules {
            let findings: Vec<&Finding> = self.for_rule(*rule).collect();
            if findings.is_empty() {
                continue;
            }
            writeln!(f, "[{rule}] {} violation(s)", findings.len())?;
            for finding in findings {
                writeln!(f, "  - {finding}")?;
            }
        }
        Ok(())
    }
}
