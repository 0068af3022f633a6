use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use pingpy::cmd;
use pingpy::error::{PingError, USAGE_EXIT_CODE};
use pingpy::logging;

/// Ping a target with the same flags on every platform, optionally logging to a file.
#[derive(Parser)]
#[command(name = "pingpy", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    ping: cmd::Ping,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.ping.verbosity());

    match cli.ping.exec() {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            let code = err
                .downcast_ref::<PingError>()
                .map_or(USAGE_EXIT_CODE, PingError::exit_code);
            ExitCode::from(code)
        }
    }
}
