use std::fmt;

use crate::error::PingError;

/// Host families whose ping dialects we know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformId {
    /// iputils ping.
    Linux,
    Windows,
    /// macOS/Darwin and the BSDs.
    Bsd,
}

impl PlatformId {
    pub fn detect() -> Result<Self, PingError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value. Unknown systems are an error;
    /// there is no default dialect.
    pub fn from_os(os: &str) -> Result<Self, PingError> {
        match os {
            "linux" | "android" => Ok(PlatformId::Linux),
            "windows" => Ok(PlatformId::Windows),
            "macos" | "ios" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => {
                Ok(PlatformId::Bsd)
            }
            other => Err(PingError::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformId::Linux => "linux",
            PlatformId::Windows => "windows",
            PlatformId::Bsd => "darwin/bsd",
        };
        f.write_str(name)
    }
}
