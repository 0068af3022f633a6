use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use crate::request::{LogDestination, PingRequest, VerbosityLevel};
use crate::translate::{self, PlatformId};

pub mod ping;
pub mod tee;

pub use ping::{ctrl_channel, RunResult, Runner, TerminationReason};

#[derive(Args, Debug)]
pub struct Ping {
    /// Target IP address or hostname to ping.
    target: String,

    /// Number of times to ping. Use 0 for infinite.
    #[arg(short, long, default_value_t = 3, env = "PINGPY_COUNT")]
    count: u32,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output.
    #[arg(short, long)]
    debug: bool,

    /// Path to the log file.
    #[arg(short, long, env = "PINGPY_LOG_FILE")]
    file: Option<PathBuf>,

    /// Overwrite the log file if it exists.
    #[arg(short, long, requires = "file", conflicts_with = "append")]
    overwrite: bool,

    /// Append to the log file if it exists.
    #[arg(short, long, requires = "file")]
    append: bool,

    /// Number of seconds to wait between pings.
    #[arg(short, long, default_value_t = 1.0, env = "PINGPY_SLEEP", value_parser = non_negative_secs)]
    sleep: f64,
}

impl Ping {
    pub fn verbosity(&self) -> VerbosityLevel {
        VerbosityLevel::from_flags(self.verbose, self.debug)
    }

    pub fn exec(self) -> Result<ExitCode> {
        let request = PingRequest::new(self.target, self.count, self.sleep)?
            .with_verbose(self.verbose)
            .with_debug(self.debug);
        debug!(?request, "ping settings");

        let log = LogDestination::from_flags(self.file, self.overwrite, self.append)?;
        let platform = PlatformId::detect()?;
        let command = translate::translate(&request, platform)?;
        info!(%platform, %command, "translated ping request");

        let interrupts = ctrl_channel().context("failed to install the interrupt handler")?;
        let stdout = io::stdout().lock();
        let result = Runner::new(stdout, request.verbosity(), interrupts).run(&command, log.as_ref())?;
        info!(reason = %result.reason, exit_code = result.exit_code, "ping finished");

        Ok(ExitCode::from(exit_status(result)))
    }
}

/// Process exit statuses are a byte; anything outside that range becomes 1.
fn exit_status(result: RunResult) -> u8 {
    u8::try_from(result.exit_code).unwrap_or(1)
}

fn non_negative_secs(s: &str) -> Result<f64, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("`{s}` must be a number of seconds >= 0"));
    }
    Ok(secs)
}
