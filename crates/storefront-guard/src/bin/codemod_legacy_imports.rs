use std::process::ExitCode;

fn main() -> ExitCode {
    storefront_guard::run_codemod_cli()
}
