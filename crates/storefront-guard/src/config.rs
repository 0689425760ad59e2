//! 规则表：守卫引擎的全部常量均以数据形式注入。
//!
//! # 教案级说明
//! - **意图 (Why)**：禁用标识符、文件集合与认可类型名不再散落在规则逻辑中，
//!   测试可以直接构造任意规则表，而不依赖文件系统；
//! - **契约 (What)**：命令行工具只使用内置规则表 [`GuardConfig::builtin`]，不接受参数或外部配置文件；
//! - **实现 (How)**：`rules.toml` 在编译期嵌入，运行时经 `serde` + `toml` 反序列化并校验。

use serde::Deserialize;

use crate::error::GuardError;
use crate::lexer::{is_ident_continue, is_ident_start};
use crate::source::EntryKind;

/// 内置规则表原文。
pub const BUILTIN_RULES: &str = include_str!("../rules.toml");

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    pub files: FileSet,
    pub signature: SignatureRules,
    pub legacy_props: LegacyPropsRules,
    pub param_aliases: ForbiddenNames,
    pub raw_param_names: ForbiddenNames,
}

/// 需要扫描的文件集合。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileSet {
    /// 相对应用根目录的路由根目录。
    pub roots: Vec<String>,
    /// 入口文件扩展名（不含 `.`）。
    pub extensions: Vec<String>,
    /// 遍历时跳过的目录名。
    #[serde(default)]
    pub skip_dirs: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SignatureRules {
    pub sanctioned_type: String,
    pub kinds: Vec<EntryKind>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LegacyPropsRules {
    pub type_names: Vec<String>,
    #[serde(default)]
    pub path_markers: Vec<String>,
    pub kinds: Vec<EntryKind>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ForbiddenNames {
    pub names: Vec<String>,
    pub kinds: Vec<EntryKind>,
}

impl GuardConfig {
    /// 解析内置规则表。
    pub fn builtin() -> Result<Self, GuardError> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    /// 从 TOML 文本解析并校验规则表。
    pub fn from_toml_str(text: &str) -> Result<Self, GuardError> {
        let config: GuardConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验取值约束。
    ///
    /// - 认可类型名与全部禁用名必须是合法标识符；
    /// - 扩展名列表不能为空；
    /// - 每条规则至少作用于一种入口文件。
    pub fn validate(&self) -> Result<(), GuardError> {
        if self.files.extensions.is_empty() {
            return Err(invalid("files.extensions must not be empty"));
        }
        if self.files.roots.is_empty() {
            return Err(invalid("files.roots must not be empty"));
        }
        require_identifier("signature.sanctioned_type", &self.signature.sanctioned_type)?;

        let name_lists = [
            ("legacy_props.type_names", &self.legacy_props.type_names),
            ("param_aliases.names", &self.param_aliases.names),
            ("raw_param_names.names", &self.raw_param_names.names),
        ];
        for (field, names) in name_lists {
            for name in names {
                require_identifier(field, name)?;
            }
        }
        if self.legacy_props.path_markers.iter().any(String::is_empty) {
            return Err(invalid("legacy_props.path_markers must not contain empty entries"));
        }

        let kind_lists = [
            ("signature.kinds", &self.signature.kinds),
            ("legacy_props.kinds", &self.legacy_props.kinds),
            ("param_aliases.kinds", &self.param_aliases.kinds),
            ("raw_param_names.kinds", &self.raw_param_names.kinds),
        ];
        for (field, kinds) in kind_lists {
            if kinds.is_empty() {
                return Err(invalid(format!("{field} must name at least one entry kind")));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> GuardError {
    GuardError::InvalidConfig(message.into())
}

fn require_identifier(field: &str, value: &str) -> Result<(), GuardError> {
    let mut chars = value.chars();
    let valid = chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue);
    if valid {
        Ok(())
    } else {
        Err(invalid(format!("{field} entry `{value}` is not an identifier")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rule_table_is_valid() {
        let config = GuardConfig::builtin().expect("内置规则表必须合法");
        assert_eq!(config.signature.sanctioned_type, "AsyncPageProps");
        assert_eq!(config.raw_param_names.names.len(), 2);
        assert_eq!(config.legacy_props.type_names.len(), 2);
        assert_eq!(
            config.legacy_props.kinds,
            [EntryKind::Page, EntryKind::Layout]
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = BUILTIN_RULES.replace("[signature]", "[signature]\nstrict = true");
        assert!(matches!(
            GuardConfig::from_toml_str(&text),
            Err(GuardError::Config(_))
        ));
    }

    #[test]
    fn non_identifier_names_are_rejected() {
        let text = BUILTIN_RULES.replace("\"routeQuery\"", "\"route query\"");
        assert!(matches!(
            GuardConfig::from_toml_str(&text),
            Err(GuardError::InvalidConfig(message)) if message.contains("route query")
        ));
    }

    #[test]
    fn empty_kind_list_is_rejected() {
        let text = BUILTIN_RULES.replace(
            "sanctioned_type = \"AsyncPageProps\"\nkinds = [\"page\"]",
            "sanctioned_type = \"AsyncPageProps\"\nkinds = []",
        );
        assert!(matches!(
            GuardConfig::from_toml_str(&text),
            Err(GuardError::InvalidConfig(_))
        ));
    }
}
