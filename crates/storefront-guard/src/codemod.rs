//! 历史属性类型导入清理（codemod）。
//!
//! # 行为（What）
//! - 模块路径命中生成类型路径片段的 `import` 语句整条删除；
//! - 具名导入列表中的历史类型名被剔除；剔除后不再导入任何名称的语句整条删除；
//! - 默认导入或命名空间导入名为历史类型名时，删除该导入；
//! - 其它文本原样保留。
//!
//! # 执行逻辑（How）
//! 语句边界由词法记号决定：`import` 之后只允许导入子句中的记号，语句止于 `from` 后的模块路径字符串
//! （或副作用导入的路径字符串）及同一行紧随的 `;`。遇到其它记号即放弃该语句，
//! 因此行尾注释、省略分号等写法不会把后续代码并入语句。
//!
//! 改写结果以规范形式重建，对规范形式再次清理得到相同文本，因此重复运行不会产生新的修改。

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::GuardConfig;
use crate::error::GuardError;
use crate::lexer::{Token, TokenKind, tokenize};
use crate::source::collect_entry_paths;

/// 导入清理器，常量来自规则表的 `legacy_props` 段。
#[derive(Clone, Debug)]
pub struct ImportCleanup {
    type_names: Vec<String>,
    path_markers: Vec<String>,
}

/// 源码中一条 `import` 语句。
struct ImportStatement<'t, 's> {
    /// 从 `import` 关键字到路径字符串（含可选 `;`）的字节区间。
    span: Range<usize>,
    /// `import` 与 `from` 之间的子句记号；副作用导入为空。
    clause: &'t [Token<'s>],
    /// 带引号的模块路径记号。
    specifier: Token<'s>,
    semicolon: bool,
}

impl ImportStatement<'_, '_> {
    fn module_path(&self) -> &str {
        let text = self.specifier.text;
        text.get(1..text.len().saturating_sub(1)).unwrap_or_default()
    }
}

/// 单条 `import` 语句的处理结果。
enum Rewrite {
    Keep,
    Remove,
    Replace(String),
}

impl ImportCleanup {
    pub fn new(type_names: Vec<String>, path_markers: Vec<String>) -> Self {
        Self {
            type_names,
            path_markers,
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(
            config.legacy_props.type_names.clone(),
            config.legacy_props.path_markers.clone(),
        )
    }

    /// 清理一份源码；无需修改时返回 `None`。
    pub fn apply(&self, text: &str) -> Option<String> {
        let tokens = tokenize(text);
        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut changed = false;

        for statement in import_statements(text, &tokens) {
            output.push_str(&text[cursor..statement.span.start]);
            cursor = statement.span.end;

            let original = &text[statement.span.clone()];
            match self.rewrite(&statement) {
                Rewrite::Keep => output.push_str(original),
                Rewrite::Replace(replacement) if replacement == original => {
                    output.push_str(original)
                }
                Rewrite::Replace(replacement) => {
                    output.push_str(&replacement);
                    changed = true;
                }
                Rewrite::Remove => {
                    changed = true;
                    let line_end = text[cursor..].find('\n').map_or(text.len(), |at| cursor + at);
                    let rest = &text[cursor..line_end];
                    if rest.trim().is_empty() {
                        // 整行只有这条语句：连同缩进与换行一起删除。
                        let trimmed = output.trim_end_matches([' ', '\t']).len();
                        output.truncate(trimmed);
                        cursor = (line_end + 1).min(text.len());
                    } else {
                        cursor += rest.len() - rest.trim_start_matches([' ', '\t']).len();
                    }
                }
            }
        }

        output.push_str(&text[cursor..]);
        changed.then_some(output)
    }

    fn is_legacy(&self, name: &str) -> bool {
        self.type_names.iter().any(|legacy| legacy == name)
    }

    fn rewrite(&self, statement: &ImportStatement<'_, '_>) -> Rewrite {
        let module_path = statement.module_path();
        if self
            .path_markers
            .iter()
            .any(|marker| module_path.contains(marker.as_str()))
        {
            return Rewrite::Remove;
        }
        if !statement
            .clause
            .iter()
            .any(|token| token.kind == TokenKind::Ident && self.is_legacy(token.text))
        {
            return Rewrite::Keep;
        }

        let Some(clause) = ImportClause::parse(statement.clause) else {
            return Rewrite::Keep;
        };
        let default = clause.default.filter(|name| !self.is_legacy(name));
        let namespace = clause.namespace.filter(|name| !self.is_legacy(name));
        let named: Vec<String> = clause
            .named
            .iter()
            .filter(|specifier| !self.is_legacy(specifier.imported))
            .map(|specifier| specifier.text.clone())
            .collect();

        let mut bindings = Vec::new();
        if let Some(default) = default {
            bindings.push(default.to_string());
        }
        if let Some(namespace) = namespace {
            bindings.push(format!("* as {namespace}"));
        }
        if !named.is_empty() {
            bindings.push(format!("{{ {} }}", named.join(", ")));
        }
        if bindings.is_empty() {
            return Rewrite::Remove;
        }

        Rewrite::Replace(format!(
            "import {}{} from {}{}",
            if clause.type_only { "type " } else { "" },
            bindings.join(", "),
            statement.specifier.text,
            if statement.semicolon { ";" } else { "" },
        ))
    }
}

/// `import` 子句的结构：`[type] [Default] [, * as Ns | , { a, b as c }]`。
struct ImportClause<'s> {
    type_only: bool,
    default: Option<&'s str>,
    namespace: Option<&'s str>,
    named: Vec<NamedSpecifier<'s>>,
}

struct NamedSpecifier<'s> {
    /// 被导入的原名：`type X as Y` 取 `X`。
    imported: &'s str,
    /// 规范化后的完整写法。
    text: String,
}

impl<'s> ImportClause<'s> {
    fn parse(tokens: &[Token<'s>]) -> Option<Self> {
        let mut rest = tokens;
        let mut clause = ImportClause {
            type_only: false,
            default: None,
            namespace: None,
            named: Vec::new(),
        };

        if let [first, second, ..] = rest
            && first.is_ident("type")
            && (second.kind == TokenKind::Ident || second.is_punct('{') || second.is_punct('*'))
        {
            clause.type_only = true;
            rest = &rest[1..];
        }

        while let Some((token, tail)) = rest.split_first() {
            let leading = clause.default.is_none() && clause.named.is_empty();
            if token.kind == TokenKind::Ident && leading && clause.namespace.is_none() {
                clause.default = Some(token.text);
                rest = tail;
            } else if token.is_punct('*') {
                match tail {
                    [alias, name, after @ ..]
                        if alias.is_ident("as") && name.kind == TokenKind::Ident =>
                    {
                        clause.namespace = Some(name.text);
                        rest = after;
                    }
                    _ => return None,
                }
            } else if token.is_punct('{') {
                let close = tail.iter().position(|t| t.is_punct('}'))?;
                clause.named = tail[..close]
                    .split(|t| t.is_punct(','))
                    .filter(|parts| !parts.is_empty())
                    .map(NamedSpecifier::parse)
                    .collect::<Option<Vec<_>>>()?;
                rest = &tail[close + 1..];
            } else {
                return None;
            }

            match rest.split_first() {
                Some((comma, tail)) if comma.is_punct(',') => rest = tail,
                Some(_) => return None,
                None => {}
            }
        }

        Some(clause)
    }
}

impl<'s> NamedSpecifier<'s> {
    fn parse(parts: &[Token<'s>]) -> Option<Self> {
        if parts.iter().any(|t| t.kind != TokenKind::Ident) {
            return None;
        }
        let imported = match parts {
            [modifier, name, ..] if modifier.is_ident("type") && !name.is_ident("as") => {
                name.text
            }
            [name, ..] => name.text,
            [] => return None,
        };
        Some(Self {
            imported,
            text: parts.iter().map(|t| t.text).collect::<Vec<_>>().join(" "),
        })
    }
}

/// 按词法记号切出源码中的全部顶层 `import` 语句。
///
/// 只有位于行首的 `import` 才被考虑；`import(` 与 `import.meta` 不是导入语句。
fn import_statements<'t, 's>(
    text: &str,
    tokens: &'t [Token<'s>],
) -> Vec<ImportStatement<'t, 's>> {
    let mut statements = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        if !token.is_ident("import") || !at_line_start(text, token.start) {
            index += 1;
            continue;
        }

        let Some(specifier_index) = specifier_position(tokens, index) else {
            index += 1;
            continue;
        };
        let specifier = tokens[specifier_index];
        let clause_end = if specifier_index == index + 1 {
            index + 1
        } else {
            specifier_index - 1
        };

        let mut end = specifier.end;
        let mut next = specifier_index + 1;
        let semicolon = tokens.get(next).is_some_and(|t| {
            t.is_punct(';') && !text[specifier.end..t.start].contains('\n')
        });
        if let Some(semi) = tokens.get(next).filter(|_| semicolon) {
            end = semi.end;
            next += 1;
        }

        statements.push(ImportStatement {
            span: token.start..end,
            clause: &tokens[index + 1..clause_end],
            specifier,
            semicolon,
        });
        index = next;
    }

    statements
}

/// 从 `tokens[import]` 出发定位模块路径字符串的下标；不是导入语句时返回 `None`。
fn specifier_position(tokens: &[Token<'_>], import: usize) -> Option<usize> {
    let first = tokens.get(import + 1)?;
    if first.kind == TokenKind::Str {
        return Some(import + 1);
    }

    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(import + 1) {
        match token.kind {
            TokenKind::Ident if token.text == "from" && depth == 0 => {
                let next = tokens.get(index + 1)?;
                return (next.kind == TokenKind::Str).then_some(index + 1);
            }
            TokenKind::Ident => {}
            TokenKind::Punct if token.is_punct('{') => depth += 1,
            TokenKind::Punct if token.is_punct('}') => depth = depth.checked_sub(1)?,
            TokenKind::Punct if token.is_punct(',') || token.is_punct('*') => {}
            _ => return None,
        }
    }
    None
}

fn at_line_start(text: &str, offset: usize) -> bool {
    let line_start = text[..offset].rfind('\n').map_or(0, |at| at + 1);
    text[line_start..offset].trim().is_empty()
}

/// codemod 运行结果。
#[derive(Debug, Default)]
pub struct CodemodSummary {
    /// 被改写的文件（相对应用根目录）。
    pub modified: Vec<PathBuf>,
    /// 读写失败的文件及原因；失败不会中断其它文件的处理。
    pub failed: Vec<(PathBuf, String)>,
    pub files_scanned: usize,
}

/// 对 `root` 下的全部入口文件执行导入清理并原地写回。
///
/// 只有目录遍历失败才返回错误；单个文件的读写失败记录在 [`CodemodSummary::failed`] 中。
pub fn run_codemod(root: &Path, config: &GuardConfig) -> Result<CodemodSummary, GuardError> {
    let cleanup = ImportCleanup::from_config(config);
    let paths = collect_entry_paths(root, &config.files)?;
    let files_scanned = paths.len();

    let outcomes: Vec<(PathBuf, Result<bool, GuardError>)> = paths
        .into_par_iter()
        .map(|(path, _)| {
            let outcome = rewrite_file(&cleanup, &path);
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            (relative, outcome)
        })
        .collect();

    let mut summary = CodemodSummary {
        files_scanned,
        ..CodemodSummary::default()
    };
    for (path, outcome) in outcomes {
        match outcome {
            Ok(true) => summary.modified.push(path),
            Ok(false) => {}
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "import cleanup skipped file");
                summary.failed.push((path, error.to_string()));
            }
        }
    }
    Ok(summary)
}

fn rewrite_file(cleanup: &ImportCleanup, path: &Path) -> Result<bool, GuardError> {
    let text = fs::read_to_string(path).map_err(|error| GuardError::io(path, error))?;
    match cleanup.apply(&text) {
        Some(rewritten) => {
            fs::write(path, rewritten).map_err(|error| GuardError::io(path, error))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleanup() -> ImportCleanup {
        ImportCleanup::new(
            vec!["LegacyPageProps".to_string(), "LegacyLayoutProps".to_string()],
            vec![".next/types".to_string()],
        )
    }

    #[test]
    fn sole_legacy_import_is_removed() {
        let text = "import type { LegacyPageProps } from '@/types/page';\nimport { db } from '@/lib/db';\n";
        assert_eq!(
            cleanup().apply(text).as_deref(),
            Some("import { db } from '@/lib/db';\n")
        );
    }

    #[test]
    fn legacy_specifier_is_pruned_from_mixed_import() {
        let text = "import type { AsyncPageProps, LegacyPageProps as Props } from \"@/types/page\";\n";
        assert_eq!(
            cleanup().apply(text).as_deref(),
            Some("import type { AsyncPageProps } from \"@/types/page\";\n")
        );
    }

    #[test]
    fn generated_type_import_is_removed() {
        let text = "import type { PageProps } from '../../.next/types/app/page';\nexport default function Page() {}\n";
        assert_eq!(
            cleanup().apply(text).as_deref(),
            Some("export default function Page() {}\n")
        );
    }

    #[test]
    fn multi_line_import_is_handled_as_one_statement() {
        let text = "import {\n  AsyncPageProps,\n  LegacyLayoutProps,\n} from '@/types/page';\nconst x = 1;\n";
        assert_eq!(
            cleanup().apply(text).as_deref(),
            Some("import { AsyncPageProps } from '@/types/page';\nconst x = 1;\n")
        );
    }

    #[test]
    fn legacy_default_import_is_dropped() {
        let text = "import LegacyPageProps, { helper } from './types';\nimport LegacyLayoutProps from './layout-types';\n";
        assert_eq!(
            cleanup().apply(text).as_deref(),
            Some("import { helper } from './types';\n")
        );
    }

    #[test]
    fn default_import_survives_when_only_legacy_names_are_pruned() {
        let text = "import React, { LegacyPageProps } from 'react';\n";
        assert_eq!(
            cleanup().apply(text).as_deref(),
            Some("import React from 'react';\n")
        );
    }

    #[test]
    fn trailing_comment_does_not_swallow_following_code() {
        let text = "import { LegacyPageProps } from './types' // legacy\nexport default async function Page({ params }: LegacyPageProps) {\n  return null;\n}\n";
        assert_eq!(
            cleanup().apply(text).as_deref(),
            Some("// legacy\nexport default async function Page({ params }: LegacyPageProps) {\n  return null;\n}\n")
        );
    }

    #[test]
    fn import_without_semicolon_ends_at_module_path() {
        let text = "import { AsyncPageProps, LegacyPageProps } from '@/types/page'\nexport default async function Page({ params }: AsyncPageProps) {\n  return null;\n}\n";
        assert_eq!(
            cleanup().apply(text).as_deref(),
            Some("import { AsyncPageProps } from '@/types/page'\nexport default async function Page({ params }: AsyncPageProps) {\n  return null;\n}\n")
        );
    }

    #[test]
    fn comments_inside_named_list_are_dropped_with_the_rewrite() {
        let text = "import {\n  AsyncPageProps, // sanctioned\n  LegacyPageProps,\n} from './t';\n";
        assert_eq!(
            cleanup().apply(text).as_deref(),
            Some("import { AsyncPageProps } from './t';\n")
        );
    }

    #[test]
    fn legacy_namespace_import_is_removed() {
        let text = "  import * as LegacyPageProps from './legacy';\nconst x = 1;\n";
        assert_eq!(cleanup().apply(text).as_deref(), Some("const x = 1;\n"));
    }

    #[test]
    fn dynamic_import_and_unknown_forms_are_left_alone() {
        let text = "import('./LegacyPageProps').then(load)\nconst m = import.meta;\n";
        assert_eq!(cleanup().apply(text), None);
    }

    #[test]
    fn aliasing_to_a_legacy_name_is_stable() {
        let text = "import { AsyncPageProps as LegacyPageProps } from './t';\n";
        assert_eq!(cleanup().apply(text), None);
    }

    #[test]
    fn unrelated_files_are_untouched() {
        let text = "import { AsyncPageProps } from '@/types/page';\nexport default async function Page({ params }: AsyncPageProps) {}\n";
        assert_eq!(cleanup().apply(text), None);
    }

    #[test]
    fn legacy_names_outside_imports_are_left_for_the_guard() {
        let text = "export default function Page({ params }: LegacyPageProps) {}\n";
        assert_eq!(cleanup().apply(text), None);
    }
}
