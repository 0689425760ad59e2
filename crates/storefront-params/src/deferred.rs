//! 同步值与延迟值的统一抽象。
//!
//! # 设计动机（Why）
//! - 路由层在框架升级过程中，有时直接交付参数，有时交付一个尚未完成的 Future；
//! - 页面入口只应有一个调用约定：无论输入形态如何，都通过 [`Deferrable::settle`] 得到普通值。
//!
//! # 结构（How）
//! - [`Deferrable`]：“可结算为 `Result<T, E>`”的能力；普通参数包以 `Infallible` 实现；
//! - [`Deferred`]：装箱的 `Send` Future，代表延迟交付；
//! - [`MaybeDeferred`]：运行期才知道形态时使用的标签联合。

use core::convert::Infallible;
use core::fmt;
use core::future::Future;

use futures::future::{self, BoxFuture, Either, FutureExt, Ready};

use crate::bag::{ParameterBag, QueryBag};

/// 可结算为普通值的输入。
///
/// # 契约（What）
/// - `settle` 只能调用一次（按值消费 `self`）；
/// - 上游失败以 `Self::Error` 原样返回，实现不得吞掉或包装错误；
/// - 已就绪的实现必须在首次 `poll` 即完成，不产生挂起。
pub trait Deferrable<T> {
    /// 上游生产者的失败类型。
    type Error;
    /// 结算 Future。
    type Settle: Future<Output = Result<T, Self::Error>>;

    /// 消费输入并返回结算 Future。
    fn settle(self) -> Self::Settle;
}

impl Deferrable<ParameterBag> for ParameterBag {
    type Error = Infallible;
    type Settle = Ready<Result<ParameterBag, Infallible>>;

    fn settle(self) -> Self::Settle {
        future::ready(Ok(self))
    }
}

impl Deferrable<QueryBag> for QueryBag {
    type Error = Infallible;
    type Settle = Ready<Result<QueryBag, Infallible>>;

    fn settle(self) -> Self::Settle {
        future::ready(Ok(self))
    }
}

/// 延迟交付的值，内部为装箱的 `Send` Future。
pub struct Deferred<'a, T, E> {
    inner: BoxFuture<'a, Result<T, E>>,
}

impl<'a, T, E> Deferred<'a, T, E> {
    /// 包装上游 Future。
    pub fn new<F>(producer: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'a,
    {
        Self {
            inner: producer.boxed(),
        }
    }
}

impl<T, E> fmt::Debug for Deferred<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

impl<'a, T, E> Deferrable<T> for Deferred<'a, T, E> {
    type Error = E;
    type Settle = BoxFuture<'a, Result<T, E>>;

    fn settle(self) -> Self::Settle {
        self.inner
    }
}

/// 运行期标签联合：要么已就绪，要么延迟交付。
///
/// # 教案级说明
/// - **意图 (Why)**：路由层在同一处既可能拿到普通值也可能拿到 Future，用一个类型承载两者，
///   调用方无需分支；
/// - **契约 (What)**：`Ready` 结算时不挂起；`Deferred` 结算时仅等待一次并原样传播失败；
/// - **实现 (How)**：结算 Future 为 [`Either`]，两条路径在入口处即合并为同一输出类型。
#[derive(Debug)]
pub enum MaybeDeferred<'a, T, E> {
    /// 已经就绪的普通值。
    Ready(T),
    /// 尚需等待的延迟值。
    Deferred(Deferred<'a, T, E>),
}

impl<'a, T, E> MaybeDeferred<'a, T, E> {
    /// 以普通值构造。
    pub fn ready(value: T) -> Self {
        MaybeDeferred::Ready(value)
    }

    /// 以上游 Future 构造。
    pub fn deferred<F>(producer: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'a,
    {
        MaybeDeferred::Deferred(Deferred::new(producer))
    }

    /// 是否已就绪。
    pub fn is_ready(&self) -> bool {
        matches!(self, MaybeDeferred::Ready(_))
    }
}

impl<'a, T, E> From<Deferred<'a, T, E>> for MaybeDeferred<'a, T, E> {
    fn from(deferred: Deferred<'a, T, E>) -> Self {
        MaybeDeferred::Deferred(deferred)
    }
}

impl<'a, T, E> Deferrable<T> for MaybeDeferred<'a, T, E> {
    type Error = E;
    type Settle = Either<Ready<Result<T, E>>, BoxFuture<'a, Result<T, E>>>;

    fn settle(self) -> Self::Settle {
        match self {
            MaybeDeferred::Ready(value) => Either::Left(future::ready(Ok(value))),
            MaybeDeferred::Deferred(deferred) => {
                tracing::trace!("settling deferred route input");
                Either::Right(deferred.inner)
            }
        }
    }
}
