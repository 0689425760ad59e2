use std::path::Path;

use rayon::prelude::*;

use crate::config::{FileSet, GuardConfig};
use crate::error::GuardError;
use crate::report::GuardReport;
use crate::rules::{Finding, Rule, RuleId, build_rule};
use crate::signature::locate_entry;
use crate::source::{SourceFile, load_sources};

/// 守卫引擎：持有规则表构造出的规则集合，对一组源码执行检查。
///
/// # 教案级说明
/// - **意图 (Why)**：四条规则共享同一次文件读取与入口定位，单条规则的命令行工具与
///   汇总工具走同一条路径；
/// - **契约 (What)**：[`Guard::check_sources`] 是纯函数，不访问文件系统；
///   [`Guard::check_tree`] 负责收集与读取文件后再调用前者；
/// - **执行逻辑 (How)**：文件之间无共享可变状态，使用 rayon 并行检查，
///   汇总后由 [`GuardReport`] 统一排序，输出与处理顺序无关。
pub struct Guard {
    files: FileSet,
    rules: Vec<Box<dyn Rule>>,
}

impl Guard {
    /// 按规则表构造包含全部规则的引擎。
    pub fn new(config: GuardConfig) -> Result<Self, GuardError> {
        Self::with_rules(config, &RuleId::ALL)
    }

    /// 使用内置规则表。
    pub fn builtin() -> Result<Self, GuardError> {
        Self::new(GuardConfig::builtin()?)
    }

    /// 仅启用指定规则；重复的规则标识只保留一次。
    pub fn with_rules(config: GuardConfig, rules: &[RuleId]) -> Result<Self, GuardError> {
        config.validate()?;
        let mut ids = rules.to_vec();
        ids.sort();
        ids.dedup();
        Ok(Self {
            rules: ids.into_iter().map(|id| build_rule(id, &config)).collect(),
            files: config.files,
        })
    }

    /// 已启用的规则标识，按报告顺序。
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// 检查内存中的源码集合。
    pub fn check_sources(&self, sources: &[SourceFile]) -> GuardReport {
        let findings: Vec<Finding> = sources
            .par_iter()
            .flat_map_iter(|source| self.inspect(source))
            .collect();
        GuardReport::new(self.rule_ids(), findings, sources.len())
    }

    /// 收集并检查 `root` 下的全部入口文件。
    pub fn check_tree(&self, root: &Path) -> Result<GuardReport, GuardError> {
        let sources = load_sources(root, &self.files)?;
        tracing::debug!(
            root = %root.display(),
            files = sources.len(),
            rules = self.rules.len(),
            "running shape guard"
        );
        Ok(self.check_sources(&sources))
    }

    fn inspect(&self, source: &SourceFile) -> Vec<Finding> {
        let entry = locate_entry(&source.text);
        if entry.is_none() {
            tracing::debug!(path = %source.path.display(), "no default-exported entry function");
        }

        let mut findings = Vec::new();
        for rule in self.rules.iter().filter(|rule| rule.scans(source.kind)) {
            findings.extend(rule.inspect(source, entry.as_ref()));
        }
        findings
    }
}
