use std::collections::BTreeMap;
use std::sync::Arc;

/// `ParameterBag` 承载单次请求中路由动态段的解析结果。
///
/// # 设计说明（Why）
/// - 页面入口只读取参数，不修改参数；内部以 `Arc` 共享存储，克隆只增加引用计数；
/// - 克隆之间指针相同，可通过 [`ParameterBag::ptr_eq`] 验证“解析未复制输入”。
///
/// # 契约（What）
/// - 键为路由模式声明的动态段名，值恒为字符串；
/// - 构造后不可变，不提供任何写入接口；
/// - 迭代顺序按键名字典序，便于日志与断言稳定。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterBag {
    entries: Arc<BTreeMap<String, String>>,
}

impl ParameterBag {
    /// 构造空参数包，对应无动态段的路由。
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取指定键的值。
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// 判断是否包含指定键。
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 按字典序返回全部键。
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 按字典序遍历键值对。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 判断两个参数包是否共享同一份底层存储。
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterBag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }
}

/// 查询参数的取值：单值或按出现顺序排列的多值。
///
/// 缺省（undefined）不建模为变体，而是“键不存在”。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
    /// 查询串中仅出现一次的键。
    Single(String),
    /// 同名键重复出现时，保留全部取值及其原始顺序。
    Many(Vec<String>),
}

impl QueryValue {
    /// 返回第一个取值。
    pub fn first(&self) -> Option<&str> {
        match self {
            QueryValue::Single(value) => Some(value.as_str()),
            QueryValue::Many(values) => values.first().map(String::as_str),
        }
    }

    /// 以切片视图返回全部取值。
    pub fn as_slice(&self) -> &[String] {
        match self {
            QueryValue::Single(value) => core::slice::from_ref(value),
            QueryValue::Many(values) => values.as_slice(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(existing) => {
                let first = core::mem::take(existing);
                *self = QueryValue::Many(vec![first, value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }
}

/// `QueryBag` 承载解码后的查询串。
///
/// # 契约（What）
/// - 键不存在即视为 undefined；
/// - 与 [`ParameterBag`] 一样不可变、克隆廉价且可用 [`QueryBag::ptr_eq`] 判断同源。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryBag {
    entries: Arc<BTreeMap<String, QueryValue>>,
}

impl QueryBag {
    /// 构造空查询包，对应“路由未携带查询串”。
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析 `application/x-www-form-urlencoded` 查询串。
    ///
    /// # 执行逻辑（How）
    /// 1. 去除可选的前导 `?`；
    /// 2. 交由 `form_urlencoded` 完成 `+` 与百分号解码；
    /// 3. 丢弃空键；同名键依次累积为 [`QueryValue::Many`]。
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut entries: BTreeMap<String, QueryValue> = BTreeMap::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            match entries.get_mut(key.as_ref()) {
                Some(existing) => existing.push(value.into_owned()),
                None => {
                    entries.insert(key.into_owned(), QueryValue::Single(value.into_owned()));
                }
            }
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    /// 读取原始取值；键不存在时返回 `None`。
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.get(key)
    }

    /// 读取第一个取值，适合只关心单值的页面（如 `?tab=menu`）。
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(QueryValue::first)
    }

    /// 读取全部取值；键不存在时返回空切片。
    pub fn all(&self, key: &str) -> &[String] {
        self.entries
            .get(key)
            .map(QueryValue::as_slice)
            .unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 判断两个查询包是否共享同一份底层存储。
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl<K: Into<String>> FromIterator<(K, QueryValue)> for QueryBag {
    fn from_iter<I: IntoIterator<Item = (K, QueryValue)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }
}
