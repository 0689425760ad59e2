//! 守卫工具自身的错误。
//!
//! 规则违规不属于错误，而是 [`GuardReport`](crate::GuardReport) 的内容；
//! 这里只描述“守卫无法完成检查”的情形。

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    /// 读取或写入源码文件失败。
    #[error("failed to access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 规则表不是合法的 TOML，或字段与结构不符。
    #[error("rule table is malformed: {0}")]
    Config(#[from] toml::de::Error),

    /// 规则表语法合法，但取值违反约束（如认可类型名为空）。
    #[error("rule table is invalid: {0}")]
    InvalidConfig(String),
}

impl GuardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GuardError::Io {
            path: path.into(),
            source,
        }
    }
}
