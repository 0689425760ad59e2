//! 店面应用的页面路由表。
//!
//! # 教案级说明
//! - **意图 (Why)**：路由层负责为每个请求生成参数包与查询包，本模块以最小实现承担该角色，
//!   使解析层可以在真实路由上被端到端验证；
//! - **契约 (What)**：按声明顺序匹配，首个命中者胜出；命中结果以 [`AsyncPageProps`] 交付，
//!   两个参数包均为就绪形态；
//! - **保留前缀**：任一路由以字面量开头时，该字面量成为保留的首段；首段为保留字面量的路径
//!   只与以该字面量开头的路由匹配，`/superadmin/未知页面` 不会落入 `/[brandSlug]/[locationSlug]`；
//! - **权衡 (Trade-offs)**：顺序遍历足以覆盖当前规模的路由表，字面量路由需声明在同层参数路由之前。

use core::convert::Infallible;

use crate::bag::QueryBag;
use crate::deferred::MaybeDeferred;
use crate::error::PatternError;
use crate::resolve::AsyncPageProps;
use crate::route::{RoutePattern, RouteSegment};

/// 单条页面路由。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    name: &'static str,
    pattern: RoutePattern,
}

impl RouteEntry {
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            name,
            pattern: RoutePattern::parse(pattern)?,
        })
    }

    /// 稳定的路由名，用于日志与页面分派。
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// 模式首段为字面量时返回该字面量。
    fn leading_literal(&self) -> Option<&str> {
        match self.pattern.segments().next() {
            Some(RouteSegment::Literal(literal)) => Some(literal.as_str()),
            _ => None,
        }
    }
}

/// 一次命中的结果。
#[derive(Debug)]
pub struct RouteMatch<'t> {
    pub entry: &'t RouteEntry,
    pub props: AsyncPageProps<'static, Infallible>,
}

/// 有序路由表。
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

/// 店面应用的页面路由声明：`(路由名, 模式)`。
const STOREFRONT_ROUTES: &[(&str, &str)] = &[
    ("home", "/"),
    ("superadmin.dashboard", "/superadmin"),
    ("superadmin.brands", "/superadmin/brands"),
    ("superadmin.brand.new", "/superadmin/brands/new"),
    ("superadmin.brand", "/superadmin/brands/[brandId]"),
    ("superadmin.locations", "/superadmin/brands/[brandId]/locations"),
    (
        "superadmin.location",
        "/superadmin/brands/[brandId]/locations/[locationId]",
    ),
    (
        "superadmin.location.menu",
        "/superadmin/brands/[brandId]/locations/[locationId]/menu",
    ),
    (
        "superadmin.menu.category",
        "/superadmin/brands/[brandId]/locations/[locationId]/menu/[categoryId]",
    ),
    (
        "superadmin.menu.item",
        "/superadmin/brands/[brandId]/locations/[locationId]/menu/[categoryId]/items/[itemId]",
    ),
    ("superadmin.discounts", "/superadmin/brands/[brandId]/discounts"),
    (
        "superadmin.discount",
        "/superadmin/brands/[brandId]/discounts/[discountId]",
    ),
    ("superadmin.combos", "/superadmin/brands/[brandId]/combos"),
    ("superadmin.combo", "/superadmin/brands/[brandId]/combos/[comboId]"),
    ("superadmin.upsells", "/superadmin/brands/[brandId]/upsells"),
    ("superadmin.upsell", "/superadmin/brands/[brandId]/upsells/[upsellId]"),
    ("superadmin.feedback", "/superadmin/brands/[brandId]/feedback"),
    (
        "superadmin.feedback.entry",
        "/superadmin/brands/[brandId]/feedback/[feedbackId]",
    ),
    ("superadmin.website", "/superadmin/brands/[brandId]/website"),
    (
        "superadmin.website.page",
        "/superadmin/brands/[brandId]/website/[pageId]",
    ),
    ("site.page", "/site/[brandSlug]/[...slug]"),
    ("storefront.brand", "/[brandSlug]"),
    ("storefront.location", "/[brandSlug]/[locationSlug]"),
    ("storefront.menu", "/[brandSlug]/[locationSlug]/menu"),
    (
        "storefront.category",
        "/[brandSlug]/[locationSlug]/menu/[categoryId]",
    ),
    (
        "storefront.item",
        "/[brandSlug]/[locationSlug]/menu/[categoryId]/[itemId]",
    ),
    ("storefront.checkout", "/[brandSlug]/[locationSlug]/checkout"),
    (
        "storefront.order",
        "/[brandSlug]/[locationSlug]/orders/[orderId]",
    ),
];

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造店面应用的完整路由表。
    pub fn storefront() -> Result<Self, PatternError> {
        STOREFRONT_ROUTES
            .iter()
            .try_fold(Self::new(), |table, &(name, pattern)| {
                table.with_route(name, pattern)
            })
    }

    /// 追加一条路由。
    pub fn with_route(mut self, name: &'static str, pattern: &str) -> Result<Self, PatternError> {
        self.entries.push(RouteEntry::new(name, pattern)?);
        Ok(self)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// 按名称查找路由。
    pub fn get(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// 是否有路由以字面量 `first` 开头。
    fn reserves(&self, first: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.leading_literal() == Some(first))
    }

    /// 匹配请求路径与原始查询串。
    ///
    /// # 执行逻辑（How）
    /// 1. 若 `path` 自带 `?` 或 `#`，先剥离片段并把内嵌查询串与 `raw_query` 合并考虑；
    /// 2. 首段为保留字面量时，只考虑以该字面量开头的路由；
    /// 3. 顺序遍历候选路由，首个命中者生成参数包；
    /// 4. 查询串非空时附带就绪的查询包，否则 `search_params` 为 `None`。
    pub fn route(&self, path: &str, raw_query: Option<&str>) -> Option<RouteMatch<'_>> {
        let path = path.split('#').next().unwrap_or(path);
        let (path, embedded_query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let query = raw_query.or(embedded_query).filter(|q| !q.is_empty());

        let reserved = path
            .split('/')
            .find(|segment| !segment.is_empty())
            .filter(|first| self.reserves(first));

        let (entry, params) = self
            .entries
            .iter()
            .filter(|entry| reserved.is_none_or(|prefix| entry.leading_literal() == Some(prefix)))
            .find_map(|entry| entry.pattern.match_path(path).map(|bag| (entry, bag)))?;
        tracing::debug!(route = entry.name, path, "route matched");

        let mut props = AsyncPageProps::ready(params);
        if let Some(query) = query {
            props = props.with_search_params(MaybeDeferred::Ready(QueryBag::parse(query)));
        }
        Some(RouteMatch { entry, props })
    }
}
