//! 页面入口签名的定位与解析。
//!
//! # 设计动机（Why）
//! - 正则匹配签名对换行、注释与空白非常敏感；此处先做词法扫描，再按括号配对截取参数列表，
//!   最后把参数列表解析为 [`SignatureDescriptor`]；
//! - 规则只与描述符或参数列表中的标识符打交道，不再直接处理原始文本。
//!
//! # 识别范围（What）
//! - 仅识别 `export default [async] function [name][<generics>](...)` 形式的默认导出入口；
//! - 其它写法（如先声明再 `export default Page`）视为“没有入口”，参数列表类规则会跳过该文件。

use crate::lexer::{Token, TokenKind, matching_close, tokenize};

/// 入口函数参数列表的解析结果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureDescriptor {
    /// `()`。
    Empty,
    /// 单个解构参数，如 `{ params, searchParams }: AsyncPageProps`。
    ///
    /// `fields` 为各字段规范化后的文本（`params`、`params: p`、`...rest` 等）。
    Destructured {
        fields: Vec<String>,
        annotation: Option<String>,
    },
    /// 单个具名参数，如 `props: AsyncPageProps`。
    Identifier {
        name: String,
        annotation: Option<String>,
    },
    /// 多个参数、默认值或其它无法归类的写法。
    Unrecognized,
}

/// 认可的入口签名形态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureShape {
    /// `()`。
    NoParams,
    /// `({ params }: AsyncPageProps)`。
    ParamsOnly,
    /// `({ params, searchParams }: AsyncPageProps)`。
    ParamsAndQuery,
}

impl SignatureDescriptor {
    /// 按认可类型名对描述符归类；不属于任何认可形态时返回 `None`。
    ///
    /// 注解可以带命名空间前缀（`Sanctioned.AsyncPageProps`）与泛型实参
    /// （`AsyncPageProps<{ brandSlug: string }>`），但末段类型名必须与 `sanctioned_type` 一致。
    pub fn shape(&self, sanctioned_type: &str) -> Option<SignatureShape> {
        match self {
            SignatureDescriptor::Empty => Some(SignatureShape::NoParams),
            SignatureDescriptor::Destructured {
                fields,
                annotation: Some(annotation),
            } if is_sanctioned_annotation(annotation, sanctioned_type) => {
                let mut names: Vec<&str> = fields.iter().map(String::as_str).collect();
                names.sort_unstable();
                match names.as_slice() {
                    ["params"] => Some(SignatureShape::ParamsOnly),
                    ["params", "searchParams"] => Some(SignatureShape::ParamsAndQuery),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// 默认导出入口的签名信息。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntrySignature {
    /// 函数名；匿名默认导出时为 `None`。
    pub name: Option<String>,
    /// `export` 关键字所在行（从 1 开始）。
    pub line: usize,
    /// 括号内的原始文本。
    pub params_text: String,
    /// 空白规范化后的参数列表。
    pub normalized: String,
    /// 参数列表中出现的全部标识符，按出现顺序。
    pub identifiers: Vec<String>,
    pub descriptor: SignatureDescriptor,
}

impl EntrySignature {
    /// 报告中展示的签名片段，形如 `({ params }: AsyncPageProps)`。
    pub fn fragment(&self) -> String {
        format!("({})", self.normalized)
    }
}

/// 把连续空白压缩为单个空格并去除首尾空白。
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 定位源码中的默认导出入口函数。
pub fn locate_entry(source: &str) -> Option<EntrySignature> {
    let tokens = tokenize(source);

    for (index, token) in tokens.iter().enumerate() {
        if !token.is_ident("export") {
            continue;
        }
        if !tokens.get(index + 1).is_some_and(|t| t.is_ident("default")) {
            continue;
        }

        let mut cursor = index + 2;
        if tokens.get(cursor).is_some_and(|t| t.is_ident("async")) {
            cursor += 1;
        }
        if !tokens.get(cursor).is_some_and(|t| t.is_ident("function")) {
            continue;
        }
        cursor += 1;
        if tokens.get(cursor).is_some_and(|t| t.is_punct('*')) {
            cursor += 1;
        }

        let mut name = None;
        if let Some(candidate) = tokens.get(cursor).filter(|t| t.kind == TokenKind::Ident) {
            name = Some(candidate.text.to_string());
            cursor += 1;
        }
        if tokens.get(cursor).is_some_and(|t| t.is_punct('<')) {
            cursor = matching_close(&tokens, cursor, '<', '>')? + 1;
        }
        if !tokens.get(cursor).is_some_and(|t| t.is_punct('(')) {
            continue;
        }

        let close = matching_close(&tokens, cursor, '(', ')')?;
        let params_text = &source[tokens[cursor].end..tokens[close].start];
        let line = source[..token.start].matches('\n').count() + 1;

        return Some(EntrySignature {
            name,
            line,
            params_text: params_text.to_string(),
            normalized: normalize_whitespace(params_text),
            identifiers: tokens[cursor + 1..close]
                .iter()
                .filter(|t| t.kind == TokenKind::Ident)
                .map(|t| t.text.to_string())
                .collect(),
            descriptor: parse_params(params_text),
        });
    }

    None
}

/// 把参数列表文本解析为描述符。
pub fn parse_params(params_text: &str) -> SignatureDescriptor {
    let tokens = tokenize(params_text);
    let mut parameters = split_top_level(&tokens);
    if parameters.last().is_some_and(|p| p.is_empty()) {
        parameters.pop();
    }

    match parameters.as_slice() {
        [] => SignatureDescriptor::Empty,
        [single] => parse_single(params_text, single),
        _ => SignatureDescriptor::Unrecognized,
    }
}

fn parse_single(source: &str, tokens: &[Token<'_>]) -> SignatureDescriptor {
    let Some(first) = tokens.first() else {
        return SignatureDescriptor::Unrecognized;
    };

    if first.is_punct('{') {
        let Some(close) = matching_close(tokens, 0, '{', '}') else {
            return SignatureDescriptor::Unrecognized;
        };
        let fields: Vec<String> = split_top_level(&tokens[1..close])
            .into_iter()
            .filter(|field| !field.is_empty())
            .map(|field| span_text(source, field))
            .collect();

        return match annotation_after(source, &tokens[close + 1..]) {
            Some(annotation) => SignatureDescriptor::Destructured { fields, annotation },
            None => SignatureDescriptor::Unrecognized,
        };
    }

    if first.kind == TokenKind::Ident {
        let mut rest = &tokens[1..];
        if rest.first().is_some_and(|t| t.is_punct('?')) {
            rest = &rest[1..];
        }
        return match annotation_after(source, rest) {
            Some(annotation) => SignatureDescriptor::Identifier {
                name: first.text.to_string(),
                annotation,
            },
            None => SignatureDescriptor::Unrecognized,
        };
    }

    SignatureDescriptor::Unrecognized
}

/// 解析模式之后的部分：为空表示无注解；以 `:` 开头表示类型注解；其它（如默认值）无法归类。
fn annotation_after(source: &str, rest: &[Token<'_>]) -> Option<Option<String>> {
    match rest.split_first() {
        None => Some(None),
        Some((colon, annotation)) if colon.is_punct(':') && !annotation.is_empty() => {
            Some(Some(span_text(source, annotation)))
        }
        _ => None,
    }
}

/// 按顶层逗号切分记号序列，括号、花括号、方括号与尖括号内的逗号不参与切分。
fn split_top_level<'t, 's>(tokens: &'t [Token<'s>]) -> Vec<&'t [Token<'s>]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text {
            "(" | "{" | "[" | "<" => depth += 1,
            ")" | "}" | "]" | ">" => depth = depth.saturating_sub(1),
            "," if depth == 0 => {
                parts.push(&tokens[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if !tokens.is_empty() {
        parts.push(&tokens[start..]);
    }
    parts
}

fn span_text(source: &str, tokens: &[Token<'_>]) -> String {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => normalize_whitespace(&source[first.start..last.end]),
        _ => String::new(),
    }
}

fn is_sanctioned_annotation(annotation: &str, sanctioned_type: &str) -> bool {
    let tokens = tokenize(annotation);
    let mut cursor = 0;
    let mut last_ident = None;

    loop {
        match tokens.get(cursor) {
            Some(token) if token.kind == TokenKind::Ident => {
                last_ident = Some(token.text);
                cursor += 1;
            }
            _ => return false,
        }
        if tokens.get(cursor).is_some_and(|t| t.is_punct('.')) {
            cursor += 1;
        } else {
            break;
        }
    }

    if tokens.get(cursor).is_some_and(|t| t.is_punct('<')) {
        match matching_close(&tokens, cursor, '<', '>') {
            Some(close) => cursor = close + 1,
            None => return false,
        }
    }

    cursor == tokens.len() && last_ident == Some(sanctioned_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SANCTIONED: &str = "AsyncPageProps";

    fn shape_of(source: &str) -> Option<SignatureShape> {
        locate_entry(source)
            .expect("应识别入口")
            .descriptor
            .shape(SANCTIONED)
    }

    #[test]
    fn sanctioned_shapes_are_recognised() {
        assert_eq!(
            shape_of("export default function Page() {}"),
            Some(SignatureShape::NoParams)
        );
        assert_eq!(
            shape_of("export default async function Page({ params }: AsyncPageProps) {}"),
            Some(SignatureShape::ParamsOnly)
        );
        assert_eq!(
            shape_of(
                "export default async function Page({\n  params,\n  searchParams,\n}: Sanctioned.AsyncPageProps) {}"
            ),
            Some(SignatureShape::ParamsAndQuery)
        );
        assert_eq!(
            shape_of(
                "export default async function Page({ searchParams, params }: AsyncPageProps<{ brandSlug: string }>) {}"
            ),
            Some(SignatureShape::ParamsAndQuery)
        );
    }

    #[test]
    fn other_shapes_are_rejected() {
        for source in [
            "export default async function Page(props: AsyncPageProps) {}",
            "export default async function Page({ params }) {}",
            "export default async function Page({ params }: LegacyPageProps) {}",
            "export default async function Page({ params: p }: AsyncPageProps) {}",
            "export default async function Page({ params }: AsyncPageProps, extra: string) {}",
            "export default async function Page({ params } = defaults) {}",
            "export default async function Page({ params }: AsyncPageProps | undefined) {}",
        ] {
            assert_eq!(shape_of(source), None, "{source}");
        }
    }

    #[test]
    fn entry_line_and_identifiers_are_captured() {
        let source = "import x from 'y';\n\n// export default function Old(rawParams) {}\nexport default async function Page({ params }: AsyncPageProps) {}\n";
        let entry = locate_entry(source).expect("应识别入口");
        assert_eq!(entry.name.as_deref(), Some("Page"));
        assert_eq!(entry.line, 4);
        assert_eq!(entry.identifiers, ["params", "AsyncPageProps"]);
        assert_eq!(entry.fragment(), "({ params }: AsyncPageProps)");
    }

    #[test]
    fn anonymous_and_generic_entries_are_located() {
        let entry = locate_entry("export default function <T>({ params }: AsyncPageProps) {}")
            .expect("应识别入口");
        assert_eq!(entry.name, None);
        assert_eq!(entry.normalized, "{ params }: AsyncPageProps");
    }

    #[test]
    fn files_without_default_function_have_no_entry() {
        assert!(locate_entry("const Page = () => null;\nexport default Page;").is_none());
        assert!(locate_entry("export const metadata = {};").is_none());
    }

    #[test]
    fn whitespace_is_normalised() {
        assert_eq!(normalize_whitespace("  {\n\t rawParams \n}  "), "{ rawParams }");
    }
}
