use std::process::ExitCode;
use timebill::{commands::Cli, libs::messages::macros::is_debug_mode, msg_error};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    if is_debug_mode() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("timebill=debug")))
            .with_target(false)
            .init();
    }

    match Cli::menu() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            msg_error!(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
