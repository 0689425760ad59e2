use std::process::ExitCode;

use storefront_guard::{RuleId, run_guard_cli};

fn main() -> ExitCode {
    run_guard_cli("guard-raw-param-names", &[RuleId::NoRawRouteParamNames])
}
