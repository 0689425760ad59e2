//! 守卫规则。
//!
//! # 设计说明（Why）
//! - 每条规则都是纯函数：输入一份源码及其入口签名，输出违规列表，不读写文件系统；
//! - 规则常量来自 [`GuardConfig`]，规则实现只负责匹配逻辑。
//!
//! # 契约（What）
//! - 参数列表类规则在文件没有默认导出入口时直接返回空列表；
//! - 每条违规都携带规则标识、相对路径、行号与空白规范化后的片段。

use std::fmt;
use std::path::PathBuf;

use crate::config::GuardConfig;
use crate::lexer::is_ident_continue;
use crate::signature::{EntrySignature, normalize_whitespace};
use crate::source::{EntryKind, SourceFile};

/// 规则标识；声明顺序即报告中的分组顺序。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleId {
    NoLegacyPropsType,
    NoDefensiveParamAliases,
    NoRawRouteParamNames,
    CanonicalSignatureOnly,
}

impl RuleId {
    /// 全部规则，按报告顺序排列。
    pub const ALL: [RuleId; 4] = [
        RuleId::NoLegacyPropsType,
        RuleId::NoDefensiveParamAliases,
        RuleId::NoRawRouteParamNames,
        RuleId::CanonicalSignatureOnly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::NoLegacyPropsType => "no-legacy-props-type",
            RuleId::NoDefensiveParamAliases => "no-defensive-param-aliases",
            RuleId::NoRawRouteParamNames => "no-raw-route-param-names",
            RuleId::CanonicalSignatureOnly => "canonical-signature-only",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单条违规。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub rule: RuleId,
    /// 相对应用根目录的路径。
    pub path: PathBuf,
    /// 违规起始行（从 1 开始）。
    pub line: usize,
    /// 空白规范化后的违规片段。
    pub fragment: String,
    /// 面向开发者的说明。
    pub detail: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} ({})",
            self.path.display(),
            self.line,
            self.fragment,
            self.detail
        )
    }
}

/// 守卫规则的统一接口。
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;

    /// 该规则是否检查此类入口文件。
    fn scans(&self, kind: EntryKind) -> bool;

    /// 检查单个文件；`entry` 为已定位的默认导出入口。
    fn inspect(&self, source: &SourceFile, entry: Option<&EntrySignature>) -> Vec<Finding>;
}

/// 按规则表构造指定规则。
pub fn build_rule(id: RuleId, config: &GuardConfig) -> Box<dyn Rule> {
    match id {
        RuleId::NoLegacyPropsType => Box::new(LegacyPropsType {
            type_names: config.legacy_props.type_names.clone(),
            path_markers: config.legacy_props.path_markers.clone(),
            kinds: config.legacy_props.kinds.clone(),
        }),
        RuleId::NoDefensiveParamAliases => Box::new(ForbiddenParamNames {
            id,
            label: "defensive parameter alias",
            names: config.param_aliases.names.clone(),
            kinds: config.param_aliases.kinds.clone(),
        }),
        RuleId::NoRawRouteParamNames => Box::new(ForbiddenParamNames {
            id,
            label: "raw route parameter name",
            names: config.raw_param_names.names.clone(),
            kinds: config.raw_param_names.kinds.clone(),
        }),
        RuleId::CanonicalSignatureOnly => Box::new(CanonicalSignature {
            sanctioned_type: config.signature.sanctioned_type.clone(),
            kinds: config.signature.kinds.clone(),
        }),
    }
}

/// 历史属性类型名以标识符形式出现在文件任意位置。
///
/// 每个文件最多一条违规：行号取首个命中行，片段为全部命中行以 ` | ` 连接。
/// 生成类型路径片段本身不构成违规；文件已因类型名被报告时，引用该路径的行一并列入片段。
struct LegacyPropsType {
    type_names: Vec<String>,
    path_markers: Vec<String>,
    kinds: Vec<EntryKind>,
}

impl Rule for LegacyPropsType {
    fn id(&self) -> RuleId {
        RuleId::NoLegacyPropsType
    }

    fn scans(&self, kind: EntryKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn inspect(&self, source: &SourceFile, _entry: Option<&EntrySignature>) -> Vec<Finding> {
        let mut first_line = None;
        let mut fragments = Vec::new();
        let mut matched: Vec<&str> = Vec::new();

        for (index, line) in source.text.lines().enumerate() {
            let mut named = false;
            for name in &self.type_names {
                if contains_identifier(line, name) {
                    named = true;
                    if !matched.contains(&name.as_str()) {
                        matched.push(name);
                    }
                }
            }
            let marked = self
                .path_markers
                .iter()
                .any(|marker| line.contains(marker.as_str()));

            if named {
                first_line.get_or_insert(index + 1);
            }
            if named || marked {
                fragments.push(normalize_whitespace(line));
            }
        }

        let Some(line) = first_line else {
            return Vec::new();
        };
        vec![Finding {
            rule: self.id(),
            path: source.path.clone(),
            line,
            fragment: fragments.join(" | "),
            detail: format!("legacy props reference: {}", quote_all(&matched)),
        }]
    }
}

/// 参数列表中出现禁用标识符。
struct ForbiddenParamNames {
    id: RuleId,
    label: &'static str,
    names: Vec<String>,
    kinds: Vec<EntryKind>,
}

impl Rule for ForbiddenParamNames {
    fn id(&self) -> RuleId {
        self.id
    }

    fn scans(&self, kind: EntryKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn inspect(&self, source: &SourceFile, entry: Option<&EntrySignature>) -> Vec<Finding> {
        let Some(entry) = entry else {
            return Vec::new();
        };

        let mut matched: Vec<&str> = Vec::new();
        for identifier in &entry.identifiers {
            if self.names.iter().any(|name| name == identifier)
                && !matched.contains(&identifier.as_str())
            {
                matched.push(identifier);
            }
        }
        if matched.is_empty() {
            return Vec::new();
        }

        vec![Finding {
            rule: self.id,
            path: source.path.clone(),
            line: entry.line,
            fragment: entry.fragment(),
            detail: format!("{}: {}", self.label, quote_all(&matched)),
        }]
    }
}

/// 入口签名必须是认可形态之一。
struct CanonicalSignature {
    sanctioned_type: String,
    kinds: Vec<EntryKind>,
}

impl Rule for CanonicalSignature {
    fn id(&self) -> RuleId {
        RuleId::CanonicalSignatureOnly
    }

    fn scans(&self, kind: EntryKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn inspect(&self, source: &SourceFile, entry: Option<&EntrySignature>) -> Vec<Finding> {
        let Some(entry) = entry else {
            return Vec::new();
        };
        if entry.descriptor.shape(&self.sanctioned_type).is_some() {
            return Vec::new();
        }

        let sanctioned = &self.sanctioned_type;
        vec![Finding {
            rule: self.id(),
            path: source.path.clone(),
            line: entry.line,
            fragment: entry.fragment(),
            detail: format!(
                "expected `()`, `({{ params }}: {sanctioned})` \
                 or `({{ params, searchParams }}: {sanctioned})`"
            ),
        }]
    }
}

/// 以标识符边界判断 `haystack` 是否包含 `name`。
pub(crate) fn contains_identifier(haystack: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    haystack.match_indices(name).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + name.len()..].chars().next();
        !before.is_some_and(is_ident_continue) && !after.is_some_and(is_ident_continue)
    })
}

fn quote_all(terms: &[&str]) -> String {
    terms
        .iter()
        .map(|term| format!("`{term}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::locate_entry;

    fn config() -> GuardConfig {
        GuardConfig::builtin().expect("内置规则表必须合法")
    }

    fn run(id: RuleId, path: &str, kind: EntryKind, text: &str) -> Vec<Finding> {
        let rule = build_rule(id, &config());
        let source = SourceFile::new(path, kind, text);
        let entry = locate_entry(&source.text);
        if !rule.scans(kind) {
            return Vec::new();
        }
        rule.inspect(&source, entry.as_ref())
    }

    #[test]
    fn identifier_boundaries_are_respected() {
        assert!(contains_identifier("x: LegacyPageProps)", "LegacyPageProps"));
        assert!(!contains_identifier("LegacyPagePropsV2", "LegacyPageProps"));
        assert!(!contains_identifier("MyLegacyPageProps", "LegacyPageProps"));
    }

    #[test]
    fn legacy_type_reports_one_finding_per_file() {
        let text = "import type { LegacyPageProps } from '@/types/page';\n\nexport default async function Page({ params }: LegacyPageProps) {}\n";
        let findings = run(RuleId::NoLegacyPropsType, "src/app/page.tsx", EntryKind::Page, text);
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.line, 1);
        assert!(finding.fragment.contains("LegacyPageProps"));
        assert!(finding.fragment.contains(" | "));
        assert_eq!(finding.detail, "legacy props reference: `LegacyPageProps`");
    }

    #[test]
    fn generated_type_path_alone_is_not_a_finding() {
        let text = "import type { ResolvingMetadata } from '../.next/types/app/page';\nexport default async function Page({ params }: AsyncPageProps) {}\n";
        assert!(
            run(
                RuleId::NoLegacyPropsType,
                "src/app/page.tsx",
                EntryKind::Page,
                text,
            )
            .is_empty()
        );
    }

    #[test]
    fn generated_type_path_lines_join_a_legacy_finding() {
        let text = "import type { LayoutProps } from '../../.next/types/app/layout';\nexport default function Layout({ children }: LegacyLayoutProps) {}\n";
        let findings = run(
            RuleId::NoLegacyPropsType,
            "src/app/layout.tsx",
            EntryKind::Layout,
            text,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
        assert!(findings[0].fragment.starts_with("import type { LayoutProps }"));
        assert_eq!(findings[0].detail, "legacy props reference: `LegacyLayoutProps`");
    }

    #[test]
    fn alias_rule_reproduces_normalised_parameter_list() {
        let text = "export default async function Page({\n    rawParams\n}) {}\n";
        let findings = run(
            RuleId::NoDefensiveParamAliases,
            "src/app/page.tsx",
            EntryKind::Page,
            text,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].fragment, "({ rawParams })");
        assert_eq!(findings[0].detail, "defensive parameter alias: `rawParams`");
    }

    #[test]
    fn alias_outside_parameter_list_is_ignored() {
        let text = "export default async function Page({ params }: AsyncPageProps) {\n  const rawParams = await params;\n}\n";
        assert!(
            run(
                RuleId::NoDefensiveParamAliases,
                "src/app/page.tsx",
                EntryKind::Page,
                text,
            )
            .is_empty()
        );
    }

    #[test]
    fn raw_route_names_are_flagged() {
        let text = "export default function Page({ params: routeParams }: AsyncPageProps) {}";
        let findings = run(RuleId::NoRawRouteParamNames, "src/app/page.tsx", EntryKind::Page, text);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].detail, "raw route parameter name: `routeParams`");
    }

    #[test]
    fn canonical_rule_accepts_sanctioned_shapes_only() {
        let good = "export default async function Page({ params, searchParams }: Sanctioned.AsyncPageProps) {}";
        assert!(
            run(
                RuleId::CanonicalSignatureOnly,
                "src/app/page.tsx",
                EntryKind::Page,
                good,
            )
            .is_empty()
        );

        let bad = "export default async function Page(props: AsyncPageProps) {}";
        let findings = run(
            RuleId::CanonicalSignatureOnly,
            "src/app/page.tsx",
            EntryKind::Page,
            bad,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].fragment, "(props: AsyncPageProps)");
    }

    #[test]
    fn parameter_rules_skip_files_without_entry() {
        let text = "const Page = ({ rawParams }) => null;\nexport default Page;\n";
        for id in [
            RuleId::NoDefensiveParamAliases,
            RuleId::NoRawRouteParamNames,
            RuleId::CanonicalSignatureOnly,
        ] {
            assert!(run(id, "src/app/page.tsx", EntryKind::Page, text).is_empty());
        }
    }

    #[test]
    fn parameter_rules_do_not_scan_layouts_by_default() {
        let text = "export default function Layout({ children }: { children: unknown }) {}";
        assert!(
            run(
                RuleId::CanonicalSignatureOnly,
                "src/app/layout.tsx",
                EntryKind::Layout,
                text,
            )
            .is_empty()
        );
    }
}
