use std::process::ExitCode;

use storefront_guard::{RuleId, run_guard_cli};

fn main() -> ExitCode {
    run_guard_cli("guard-param-aliases", &[RuleId::NoDefensiveParamAliases])
}
