use core::convert::Infallible;

use crate::bag::{ParameterBag, QueryBag};
use crate::deferred::{Deferrable, MaybeDeferred};
use crate::error::NotFound;

/// 将普通或延迟的参数包归一为普通参数包。
///
/// # 契约（What）
/// - 普通输入原样返回（同一份存储，不复制、不挂起）；
/// - 延迟输入仅等待一次；上游失败原样返回，不捕获、不包装；
/// - 不校验键集合，键集合由路由模式决定。
pub async fn resolve_params<I>(input: I) -> Result<ParameterBag, I::Error>
where
    I: Deferrable<ParameterBag>,
{
    input.settle().await
}

/// 将可选的普通或延迟查询包归一为普通查询包。
///
/// `None` 表示路由未携带查询串，返回空查询包。
pub async fn resolve_search_params<I>(input: Option<I>) -> Result<QueryBag, I::Error>
where
    I: Deferrable<QueryBag>,
{
    match input {
        Some(input) => input.settle().await,
        None => Ok(QueryBag::new()),
    }
}

/// 读取必需参数；缺失或为空时返回 [`NotFound`] 信号。
///
/// 调用方通常以 `?` 传播该信号，交由路由层渲染未找到响应。
pub fn require_param<'b>(bag: &'b ParameterBag, key: &str) -> Result<&'b str, NotFound> {
    match bag.get(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(NotFound::new(key)),
    }
}

/// 页面入口唯一认可的属性形态：参数包必选，查询包可选，二者均可延迟交付。
///
/// # 教案级说明
/// - **意图 (Why)**：与守卫规则认可的 `{ params, searchParams }: AsyncPageProps` 签名一一对应；
/// - **契约 (What)**：`params` 与 `search_params` 共享同一上游错误类型 `E`；
/// - **执行逻辑 (How)**：[`AsyncPageProps::resolve`] 依次调用 [`resolve_params`] 与
///   [`resolve_search_params`]，任一失败即原样返回。
#[derive(Debug)]
pub struct AsyncPageProps<'a, E = Infallible> {
    /// 路由动态段。
    pub params: MaybeDeferred<'a, ParameterBag, E>,
    /// 查询串；`None` 表示路由不接收查询参数。
    pub search_params: Option<MaybeDeferred<'a, QueryBag, E>>,
}

impl<'a, E> AsyncPageProps<'a, E> {
    /// 以已就绪的参数包构造，不携带查询包。
    pub fn ready(params: ParameterBag) -> Self {
        Self {
            params: MaybeDeferred::Ready(params),
            search_params: None,
        }
    }

    /// 附加查询包。
    pub fn with_search_params(mut self, search_params: MaybeDeferred<'a, QueryBag, E>) -> Self {
        self.search_params = Some(search_params);
        self
    }

    /// 解析为普通属性。
    pub async fn resolve(self) -> Result<PageProps, E> {
        let params = resolve_params(self.params).await?;
        let search_params = resolve_search_params(self.search_params).await?;
        Ok(PageProps {
            params,
            search_params,
        })
    }
}

/// 解析完成后交给页面主体的普通属性。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageProps {
    pub params: ParameterBag,
    pub search_params: QueryBag,
}

impl PageProps {
    /// 等价于对 `params` 调用 [`require_param`]。
    pub fn require(&self, key: &str) -> Result<&str, NotFound> {
        require_param(&self.params, key)
    }
}
