//! # error 模块说明
//!
//! - [`NotFound`] 不是故障，而是“停止正常渲染、改为渲染未找到页面”的控制信号；
//! - [`PatternError`] 描述路由模式书写错误，仅在构造路由表时出现；
//! - 延迟参数的上游失败保持其原始类型，不在此处建模。

use thiserror::Error;

/// 必需的路由参数缺失或为空。
///
/// # 契约（What）
/// - `key` 为调用方要求的参数名；
/// - 路由层收到该信号后应渲染未找到响应，而不是进入通用错误边界。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("required route parameter `{key}` is missing or empty")]
pub struct NotFound {
    /// 缺失的参数名。
    pub key: String,
}

impl NotFound {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// 路由模式语法错误。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// 模式必须以 `/` 开头。
    #[error("route pattern `{pattern}` must start with `/`")]
    MissingLeadingSlash { pattern: String },

    /// 参数段名为空，例如 `/[]` 或 `/:`。
    #[error("route pattern `{pattern}` declares a parameter without a name")]
    EmptyParameterName { pattern: String },

    /// `[` 与 `]` 未成对出现。
    #[error("route pattern `{pattern}` has an unbalanced segment `{segment}`")]
    UnbalancedBrackets { pattern: String, segment: String },

    /// 通配段只能位于最后。
    #[error("route pattern `{pattern}` places catch-all `{name}` before the last segment")]
    CatchAllNotLast { pattern: String, name: String },

    /// 同一模式内参数名重复。
    #[error("route pattern `{pattern}` declares parameter `{name}` more than once")]
    DuplicateParameter { pattern: String, name: String },
}
