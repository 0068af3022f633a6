//! Runs the host's native `ping` behind one set of flags and tees its output
//! to an optional log file.

pub mod cmd;
pub mod error;
pub mod logging;
pub mod request;
pub mod translate;

pub use cmd::{RunResult, Runner, TerminationReason};
pub use error::PingError;
pub use request::{LogDestination, LogMode, PingRequest, VerbosityLevel};
pub use translate::{translate, PlatformCommand, PlatformId};
