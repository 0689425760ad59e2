//! `storefront-guard`：店面应用页面入口的形状守卫。
//!
//! # 设计动机（Why）
//! - 参数解析层统一之后，页面入口只允许一种签名：`({ params, searchParams }: AsyncPageProps)`；
//! - 历史属性类型、防御性别名与原始参数名需要在 CI 中被阻断，而不是依赖代码审查。
//!
//! # 模块结构（How）
//! - `config`：编译期嵌入的规则表 [`BUILTIN_RULES`]，反序列化为 [`GuardConfig`]；
//! - `source`：收集并读取 `page.*` / `layout.*` 入口文件；
//! - `signature`：定位默认导出的入口函数并描述其参数形状；
//! - `rules` / `engine` / `report`：四条规则、并行检查引擎与确定性排序的报告；
//! - `codemod`：清理历史属性类型导入的一次性改写工具；
//! - `cli`：六个命令行入口共享的运行逻辑。
//!
//! # 使用契约（What）
//! - 违规不是错误：检查结果总是 [`GuardReport`]，只有文件访问或规则表问题才返回 [`GuardError`]；
//! - 同一棵源码树多次检查，报告完全一致。

mod cli;
mod codemod;
mod config;
mod engine;
mod error;
mod lexer;
mod report;
mod rules;
mod signature;
mod source;

pub use cli::{
    CliOutcome, LOG_ENV, codemod_outcome, guard_outcome, init_tracing, run_codemod_cli,
    run_guard_cli,
};
pub use codemod::{CodemodSummary, ImportCleanup, run_codemod};
pub use config::{
    BUILTIN_RULES, FileSet, ForbiddenNames, GuardConfig, LegacyPropsRules, SignatureRules,
};
pub use engine::Guard;
pub use error::GuardError;
pub use report::GuardReport;
pub use rules::{Finding, Rule, RuleId, build_rule};
pub use signature::{
    EntrySignature, SignatureDescriptor, SignatureShape, locate_entry, normalize_whitespace,
    parse_params,
};
pub use source::{EntryKind, SourceFile, collect_entry_paths, load_sources};
