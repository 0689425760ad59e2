//! 命令行入口共享的运行逻辑。
//!
//! 所有工具以当前工作目录为应用根目录、使用内置规则表，不接受参数。
//! 守卫的退出码：`0` 表示通过，`1` 表示存在违规或检查无法完成；codemod 的退出码恒为 `0`。
//!
//! 运行结果先收集为 [`CliOutcome`]，再由 [`CliOutcome::emit`] 写出，
//! 便于在临时目录上直接断言退出状态与输出内容。

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::codemod::run_codemod;
use crate::config::GuardConfig;
use crate::engine::Guard;
use crate::error::GuardError;
use crate::report::GuardReport;
use crate::rules::RuleId;

/// 日志过滤环境变量，语法同 `RUST_LOG`，缺省为 `warn`。
pub const LOG_ENV: &str = "STOREFRONT_GUARD_LOG";

const CODEMOD_TOOL: &str = "codemod-legacy-imports";

/// 安装输出到 stderr 的 fmt 订阅器；重复安装时静默忽略。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 一次命令行运行的结果。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOutcome {
    /// `true` 对应退出码 `0`。
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CliOutcome {
    fn failure(stderr: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// 写出两路输出并返回退出码。
    pub fn emit(self) -> ExitCode {
        print!("{}", self.stdout);
        eprint!("{}", self.stderr);
        self.exit_code()
    }
}

/// 在 `root` 上运行一组规则。
///
/// 通过时 stdout 为一行摘要；存在违规时 stderr 为完整报告，
/// 启用了签名规则时再附一行认可签名提示。
pub fn guard_outcome(tool: &str, root: &Path, rules: &[RuleId]) -> CliOutcome {
    match check_tree(root, rules) {
        Ok((report, _)) if report.is_clean() => CliOutcome {
            success: true,
            stdout: format!("{tool}: {report}\n"),
            stderr: String::new(),
        },
        Ok((report, hint)) => {
            let mut stderr = format!("{tool}: {report}");
            if let Some(hint) = hint {
                stderr.push_str(&format!("{tool}: {hint}\n"));
            }
            CliOutcome::failure(stderr)
        }
        Err(error) => CliOutcome::failure(format!("{tool}: {error}\n")),
    }
}

/// 在 `root` 上执行导入清理。任何失败都只写入 stderr，结果恒为成功。
pub fn codemod_outcome(root: &Path) -> CliOutcome {
    let summary = match GuardConfig::builtin().and_then(|config| run_codemod(root, &config)) {
        Ok(summary) => summary,
        Err(error) => {
            tracing::warn!(%error, "import cleanup did not run");
            return CliOutcome {
                success: true,
                stdout: String::new(),
                stderr: format!("{CODEMOD_TOOL}: {error}\n"),
            };
        }
    };

    let mut stdout = String::new();
    for path in &summary.modified {
        stdout.push_str(&format!("{CODEMOD_TOOL}: rewrote {}\n", path.display()));
    }
    stdout.push_str(&format!(
        "{CODEMOD_TOOL}: {} of {} file(s) rewritten\n",
        summary.modified.len(),
        summary.files_scanned
    ));

    let mut stderr = String::new();
    for (path, reason) in &summary.failed {
        stderr.push_str(&format!("{CODEMOD_TOOL}: skipped {}: {reason}\n", path.display()));
    }

    CliOutcome {
        success: true,
        stdout,
        stderr,
    }
}

/// 守卫二进制的入口：以当前工作目录运行并写出结果。
pub fn run_guard_cli(tool: &str, rules: &[RuleId]) -> ExitCode {
    init_tracing();
    let outcome = match current_dir() {
        Ok(root) => guard_outcome(tool, &root, rules),
        Err(error) => CliOutcome::failure(format!("{tool}: {error}\n")),
    };
    outcome.emit()
}

/// codemod 二进制的入口；退出码恒为 `0`。
pub fn run_codemod_cli() -> ExitCode {
    init_tracing();
    let outcome = match current_dir() {
        Ok(root) => codemod_outcome(&root),
        Err(error) => CliOutcome {
            success: true,
            stdout: String::new(),
            stderr: format!("{CODEMOD_TOOL}: {error}\n"),
        },
    };
    outcome.emit()
}

fn check_tree(root: &Path, rules: &[RuleId]) -> Result<(GuardReport, Option<String>), GuardError> {
    let config = GuardConfig::builtin()?;
    let hint = rules
        .contains(&RuleId::CanonicalSignatureOnly)
        .then(|| signature_hint(&config.signature.sanctioned_type));
    let report = Guard::with_rules(config, rules)?.check_tree(root)?;
    Ok((report, hint))
}

fn signature_hint(sanctioned: &str) -> String {
    format!(
        "page entries must use `()`, `({{ params }}: {sanctioned})` \
         or `({{ params, searchParams }}: {sanctioned})`"
    )
}

fn current_dir() -> Result<PathBuf, GuardError> {
    env::current_dir().map_err(|error| GuardError::io(".", error))
}
