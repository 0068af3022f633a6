use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::PingError;

/// A unified ping request, independent of the host's ping dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct PingRequest {
    target: String,
    count: u32,
    interval_secs: f64,
    verbose: bool,
    debug: bool,
}

impl PingRequest {
    /// `count == 0` pings until interrupted.
    pub fn new(target: impl Into<String>, count: u32, interval_secs: f64) -> Result<Self, PingError> {
        let target = target.into();
        if target.is_empty() {
            return Err(PingError::invalid("target must not be empty"));
        }
        if !interval_secs.is_finite() || interval_secs < 0.0 {
            return Err(PingError::invalid(format!(
                "interval must be a non-negative number of seconds, got {interval_secs}"
            )));
        }

        Ok(PingRequest {
            target,
            count,
            interval_secs,
            verbose: false,
            debug: false,
        })
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    pub fn is_infinite(&self) -> bool {
        self.count == 0
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        VerbosityLevel::from_flags(self.verbose, self.debug)
    }
}

/// How much the console shows. The log file always gets everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        if debug {
            VerbosityLevel::Debug
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Overwrite,
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDestination {
    pub path: PathBuf,
    pub mode: LogMode,
}

impl LogDestination {
    pub fn new(path: impl Into<PathBuf>, mode: LogMode) -> Self {
        LogDestination {
            path: path.into(),
            mode,
        }
    }

    /// Resolves the `-f/-o/-a` flags.
    ///
    /// An existing file without an explicit mode is refused so that a previous
    /// log is never clobbered or mixed into by accident.
    pub fn from_flags(
        path: Option<PathBuf>,
        overwrite: bool,
        append: bool,
    ) -> Result<Option<Self>, PingError> {
        let Some(path) = path else {
            return Ok(None);
        };

        let mode = match (overwrite, append) {
            (true, true) => {
                return Err(PingError::invalid(
                    "-o/--overwrite and -a/--append are mutually exclusive",
                ))
            }
            (true, false) => LogMode::Overwrite,
            (false, true) => LogMode::Append,
            (false, false) if path.exists() => {
                return Err(PingError::invalid(format!(
                    "file {} already exists, use -a/--append or -o/--overwrite",
                    path.display()
                )))
            }
            (false, false) => LogMode::Overwrite,
        };

        Ok(Some(LogDestination { path, mode }))
    }

    /// Opens the file for writing. The parent directory must already exist.
    pub fn open(&self) -> Result<File, PingError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(PingError::LogOpen {
                path: self.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("directory {} does not exist", parent.display()),
                ),
            });
        }

        let mut options = OpenOptions::new();
        options.create(true);
        match self.mode {
            LogMode::Overwrite => options.write(true).truncate(true),
            LogMode::Append => options.append(true),
        };

        options.open(&self.path).map_err(|source| PingError::LogOpen {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn request_rejects_bad_input() {
        assert!(PingRequest::new("", 3, 1.0).is_err());
        assert!(PingRequest::new("localhost", 3, -1.0).is_err());
        assert!(PingRequest::new("localhost", 3, f64::NAN).is_err());
        assert!(PingRequest::new("localhost", 3, f64::INFINITY).is_err());
    }

    #[test]
    fn zero_count_means_infinite() {
        let req = PingRequest::new("localhost", 0, 1.0).unwrap();
        assert!(req.is_infinite());
        assert!(!PingRequest::new("localhost", 1, 1.0).unwrap().is_infinite());
    }

    #[test]
    fn debug_beats_verbose() {
        assert_eq!(VerbosityLevel::from_flags(false, false), VerbosityLevel::Normal);
        assert_eq!(VerbosityLevel::from_flags(true, false), VerbosityLevel::Verbose);
        assert_eq!(VerbosityLevel::from_flags(true, true), VerbosityLevel::Debug);

        let req = PingRequest::new("localhost", 1, 1.0)
            .unwrap()
            .with_verbose(true)
            .with_debug(true);
        assert_eq!(req.verbosity(), VerbosityLevel::Debug);
    }

    #[test]
    fn no_file_means_console_only() {
        assert_eq!(LogDestination::from_flags(None, false, false).unwrap(), None);
    }

    #[test]
    fn new_file_defaults_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ping.log");
        let dest = LogDestination::from_flags(Some(path.clone()), false, false)
            .unwrap()
            .unwrap();
        assert_eq!(dest, LogDestination::new(path, LogMode::Overwrite));
    }

    #[test]
    fn existing_file_needs_a_mode() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let err = LogDestination::from_flags(Some(path.clone()), false, false).unwrap_err();
        assert!(matches!(err, PingError::InvalidArgument(_)));

        let append = LogDestination::from_flags(Some(path.clone()), false, true).unwrap();
        assert_eq!(append.unwrap().mode, LogMode::Append);
        let overwrite = LogDestination::from_flags(Some(path), true, false).unwrap();
        assert_eq!(overwrite.unwrap().mode, LogMode::Overwrite);
    }

    #[test]
    fn both_modes_conflict() {
        let err = LogDestination::from_flags(Some("x.log".into()), true, true).unwrap_err();
        assert!(matches!(err, PingError::InvalidArgument(_)));
    }

    #[test]
    fn overwrite_truncates_and_append_keeps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ping.log");
        fs::write(&path, "old\n").unwrap();

        let mut f = LogDestination::new(&path, LogMode::Append).open().unwrap();
        f.write_all(b"new\n").unwrap();
        drop(f);
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");

        let mut f = LogDestination::new(&path, LogMode::Overwrite).open().unwrap();
        f.write_all(b"fresh\n").unwrap();
        drop(f);
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn missing_parent_is_a_log_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("ping.log");
        let err = LogDestination::new(&path, LogMode::Overwrite).open().unwrap_err();
        assert!(matches!(err, PingError::LogOpen { .. }));
        assert!(!path.exists());
    }
}
