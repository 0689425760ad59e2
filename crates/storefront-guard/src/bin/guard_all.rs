//! 一次运行全部规则，按规则分组输出所有违规。

use std::process::ExitCode;

use storefront_guard::{RuleId, run_guard_cli};

fn main() -> ExitCode {
    run_guard_cli("guard-all", &RuleId::ALL)
}
