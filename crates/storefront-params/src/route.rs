use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use percent_encoding::percent_decode_str;

use crate::bag::ParameterBag;
use crate::error::PatternError;

/// 路由段的组成单元。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteSegment {
    /// 字面量段，要求目标完全一致。
    Literal(String),
    /// 参数占位符，匹配任意非空单段。
    Parameter(String),
    /// 通配段，匹配剩余所有段（至少一段），取值以 `/` 拼接。
    CatchAll(String),
}

/// 路由模式，由段序列组成。
///
/// # 语法（What）
/// - 字面量：`/checkout`；
/// - 参数：`/:brandSlug` 或文件系统风格 `/[brandSlug]`；
/// - 通配：`/*slug` 或 `/[...slug]`，只能位于最后一段；
/// - 根路由 `/` 没有任何段。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<RouteSegment>,
}

impl RoutePattern {
    /// 解析路由模式。
    ///
    /// # 执行逻辑（How）
    /// 1. 校验前导 `/`，按 `/` 切分并忽略空段（容忍尾随 `/`）；
    /// 2. 逐段识别字面量、参数与通配；
    /// 3. 检查通配位置与参数名唯一性。
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash {
                pattern: pattern.to_string(),
            });
        }

        let raw_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut seen = BTreeSet::new();

        for (index, raw) in raw_segments.iter().enumerate() {
            let segment = parse_segment(pattern, raw)?;
            match &segment {
                RouteSegment::Literal(_) => {}
                RouteSegment::Parameter(name) | RouteSegment::CatchAll(name) => {
                    if !seen.insert(name.clone()) {
                        return Err(PatternError::DuplicateParameter {
                            pattern: pattern.to_string(),
                            name: name.clone(),
                        });
                    }
                }
            }
            if let RouteSegment::CatchAll(name) = &segment {
                if index + 1 != raw_segments.len() {
                    return Err(PatternError::CatchAllNotLast {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// 原始模式文本。
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> core::slice::Iter<'_, RouteSegment> {
        self.segments.iter()
    }

    /// 按声明顺序返回参数名。
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            RouteSegment::Parameter(name) | RouteSegment::CatchAll(name) => Some(name.as_str()),
            RouteSegment::Literal(_) => None,
        })
    }

    /// 匹配请求路径，命中时返回键集合恰为参数名的 [`ParameterBag`]。
    ///
    /// # 契约（What）
    /// - 路径中的查询串与片段需由调用方预先剥离；
    /// - 参数值经过百分号解码；解码结果非 UTF-8 时按有损方式替换；
    /// - 参数段不匹配空段，因此返回的参数值均非空。
    pub fn match_path(&self, path: &str) -> Option<ParameterBag> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut captured: Vec<(String, String)> = Vec::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                RouteSegment::Literal(expected) => {
                    let actual = parts.get(index)?;
                    if decode(actual) != expected.as_str() {
                        return None;
                    }
                }
                RouteSegment::Parameter(name) => {
                    let actual = parts.get(index)?;
                    captured.push((name.clone(), decode(actual).into_owned()));
                }
                RouteSegment::CatchAll(name) => {
                    let rest = parts.get(index..).filter(|rest| !rest.is_empty())?;
                    let joined = rest
                        .iter()
                        .map(|part| decode(part))
                        .collect::<Vec<_>>()
                        .join("/");
                    captured.push((name.clone(), joined));
                    return Some(captured.into_iter().collect());
                }
            }
        }

        if parts.len() != self.segments.len() {
            return None;
        }
        Some(captured.into_iter().collect())
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segment(pattern: &str, raw: &str) -> Result<RouteSegment, PatternError> {
    let empty_name = || PatternError::EmptyParameterName {
        pattern: pattern.to_string(),
    };

    if let Some(name) = raw.strip_prefix(':') {
        if name.is_empty() {
            return Err(empty_name());
        }
        return Ok(RouteSegment::Parameter(name.to_string()));
    }
    if let Some(name) = raw.strip_prefix('*') {
        if name.is_empty() {
            return Err(empty_name());
        }
        return Ok(RouteSegment::CatchAll(name.to_string()));
    }

    let opens = raw.starts_with('[');
    let closes = raw.ends_with(']');
    match (opens, closes) {
        (true, true) if raw.len() >= 2 => {
            let inner = &raw[1..raw.len() - 1];
            if inner.contains('[') || inner.contains(']') {
                return Err(PatternError::UnbalancedBrackets {
                    pattern: pattern.to_string(),
                    segment: raw.to_string(),
                });
            }
            match inner.strip_prefix("...") {
                Some("") => Err(empty_name()),
                Some(name) => Ok(RouteSegment::CatchAll(name.to_string())),
                None if inner.is_empty() => Err(empty_name()),
                None => Ok(RouteSegment::Parameter(inner.to_string())),
            }
        }
        (false, false) if !raw.contains('[') && !raw.contains(']') => {
            Ok(RouteSegment::Literal(raw.to_string()))
        }
        _ => Err(PatternError::UnbalancedBrackets {
            pattern: pattern.to_string(),
            segment: raw.to_string(),
        }),
    }
}

fn decode(part: &str) -> Cow<'_, str> {
    percent_decode_str(part).decode_utf8_lossy()
}
