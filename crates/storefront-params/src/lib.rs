//! `storefront-params`：店面应用的路由参数解析层。
//!
//! # 设计动机（Why）
//! - 框架升级期间，路由层交付参数的方式在“直接给值”与“给一个延迟值”之间变化；
//! - 上百个页面入口需要同一种调用方式，不在调用点判断输入形态。
//!
//! # 模块结构（How）
//! - `bag`：[`ParameterBag`] 与 [`QueryBag`]，请求级、不可变、克隆廉价；
//! - `deferred`：[`Deferrable`] 抽象、[`Deferred`] 装箱 Future 与 [`MaybeDeferred`] 标签联合；
//! - `resolve`：[`resolve_params`]、[`resolve_search_params`]、[`require_param`] 与
//!   [`AsyncPageProps`]；
//! - `route` / `table`：路由模式解析与店面路由表，负责生成参数包。
//!
//! # 使用契约（What）
//! - 普通输入原样返回，不复制、不挂起；
//! - 延迟输入只等待一次，上游失败原样传播；
//! - 必需参数缺失时返回 [`NotFound`] 信号，由路由层渲染未找到响应。

mod bag;
mod deferred;
mod error;
mod resolve;
mod route;
mod table;

pub use bag::{ParameterBag, QueryBag, QueryValue};
pub use deferred::{Deferrable, Deferred, MaybeDeferred};
pub use error::{NotFound, PatternError};
pub use resolve::{AsyncPageProps, PageProps, require_param, resolve_params, resolve_search_params};
pub use route::{RoutePattern, RouteSegment};
pub use table::{RouteEntry, RouteMatch, RouteTable};
