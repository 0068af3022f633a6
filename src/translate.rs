//! Maps a unified [`PingRequest`] onto the host's native `ping` flags.

use std::fmt;

use crate::error::PingError;
use crate::request::PingRequest;

pub mod platform;

pub use platform::PlatformId;

const PING_EXECUTABLE: &str = "ping";

/// Characters a naive shell would treat specially. The child is never run
/// through a shell, but a target containing them is certainly not a host.
const SHELL_METACHARACTERS: &[char] = &[
    ';', '&', '|', '$', '`', '<', '>', '(', ')', '{', '}', '[', ']', '*', '?', '!', '\'', '"',
    '\\',
];

/// The native command line for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    pub executable: String,
    pub arguments: Vec<String>,
}

impl PlatformCommand {
    pub fn new<I, S>(executable: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlatformCommand {
            executable: executable.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for PlatformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable)?;
        for arg in &self.arguments {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Translation rules of one ping dialect.
struct Dialect {
    count_flag: &'static str,
    /// `None` when the dialect pings forever if no count is given.
    infinite_flag: Option<&'static str>,
    /// `None` when the interval cannot be configured at all.
    interval_flag: Option<&'static str>,
    min_interval_secs: f64,
}

impl Dialect {
    fn of(platform: PlatformId) -> Self {
        match platform {
            PlatformId::Linux => Dialect {
                count_flag: "-c",
                infinite_flag: None,
                interval_flag: Some("-i"),
                // iputils refuses shorter intervals for unprivileged users
                min_interval_secs: 0.2,
            },
            PlatformId::Bsd => Dialect {
                count_flag: "-c",
                infinite_flag: None,
                interval_flag: Some("-i"),
                min_interval_secs: 0.1,
            },
            PlatformId::Windows => Dialect {
                count_flag: "-n",
                infinite_flag: Some("-t"),
                interval_flag: None,
                min_interval_secs: 1.0,
            },
        }
    }
}

/// Builds the native command line for `request` on `platform`.
///
/// Pure: the same input always yields the same command.
pub fn translate(request: &PingRequest, platform: PlatformId) -> Result<PlatformCommand, PingError> {
    let dialect = Dialect::of(platform);
    validate_target(request.target())?;

    let interval = request.interval_secs();
    if !interval.is_finite() || interval <= 0.0 {
        return Err(PingError::invalid(format!(
            "interval must be greater than 0 seconds, got {interval}"
        )));
    }
    if interval < dialect.min_interval_secs {
        return Err(PingError::invalid(format!(
            "interval {interval}s is below the {platform} minimum of {}s",
            dialect.min_interval_secs
        )));
    }

    let mut arguments = Vec::with_capacity(5);

    if request.is_infinite() {
        if let Some(flag) = dialect.infinite_flag {
            arguments.push(flag.to_string());
        }
    } else {
        arguments.push(dialect.count_flag.to_string());
        arguments.push(request.count().to_string());
    }

    match dialect.interval_flag {
        Some(flag) => {
            arguments.push(flag.to_string());
            arguments.push(interval.to_string());
        }
        None if interval != dialect.min_interval_secs => {
            return Err(PingError::invalid(format!(
                "{platform} ping has a fixed interval of {}s, got {interval}s",
                dialect.min_interval_secs
            )));
        }
        None => {}
    }

    arguments.push(request.target().to_string());

    Ok(PlatformCommand {
        executable: PING_EXECUTABLE.to_string(),
        arguments,
    })
}

fn validate_target(target: &str) -> Result<(), PingError> {
    if target.is_empty() {
        return Err(PingError::invalid("target must not be empty"));
    }
    if target.starts_with('-') {
        return Err(PingError::invalid(format!(
            "target {target:?} would be read as a ping option"
        )));
    }
    if let Some(c) = target
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || SHELL_METACHARACTERS.contains(c))
    {
        return Err(PingError::invalid(format!(
            "target {target:?} contains forbidden character {c:?}"
        )));
    }
    Ok(())
}
