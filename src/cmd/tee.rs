use std::fmt;
use std::fs::File;
use std::io::{self, LineWriter, Write};

use chrono::{DateTime, Local};

use crate::request::VerbosityLevel;

/// Where a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Stdout,
    Stderr,
    /// Messages from pingpy itself.
    Runner,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Stdout => "stdout",
            Source::Stderr => "stderr",
            Source::Runner => "pingpy",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub source: Source,
    pub text: String,
}

impl Line {
    pub fn new(source: Source, text: impl Into<String>) -> Self {
        Line {
            source,
            text: text.into(),
        }
    }
}

/// Fans every line out to the console and, if open, the log file.
///
/// The console is formatted by verbosity. The log file always receives the
/// full timestamped history.
pub struct Tee<W: Write> {
    console: W,
    log: Option<LineWriter<File>>,
    verbosity: VerbosityLevel,
}

impl<W: Write> Tee<W> {
    pub fn new(console: W, log: Option<File>, verbosity: VerbosityLevel) -> Self {
        Tee {
            console,
            log: log.map(LineWriter::new),
            verbosity,
        }
    }

    pub fn write_line(&mut self, line: &Line) -> io::Result<()> {
        let now = Local::now();

        // log first so a broken console cannot cost it a line
        if let Some(log) = self.log.as_mut() {
            writeln!(log, "{}", log_format(line, &now))?;
        }

        if line.source != Source::Runner || self.verbosity > VerbosityLevel::Normal {
            writeln!(self.console, "{}", console_format(line, self.verbosity, &now))?;
            self.console.flush()?;
        }
        Ok(())
    }

    /// Writes a message of our own rather than the child's.
    pub fn note(&mut self, text: impl Into<String>) -> io::Result<()> {
        self.write_line(&Line::new(Source::Runner, text))
    }

    /// Flushes both sinks and closes the log file.
    pub fn close(mut self) -> io::Result<()> {
        if let Some(log) = self.log.take() {
            let file = log.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        self.console.flush()
    }
}

fn console_format(line: &Line, verbosity: VerbosityLevel, now: &DateTime<Local>) -> String {
    match verbosity {
        VerbosityLevel::Normal => line.text.clone(),
        VerbosityLevel::Verbose => format!("{} > {}", now.format("%H:%M:%S"), line.text),
        VerbosityLevel::Debug => format!(
            "{} > [{}] > {}",
            now.format("%Y-%m-%d %H:%M:%S"),
            line.source,
            line.text
        ),
    }
}

fn log_format(line: &Line, now: &DateTime<Local>) -> String {
    format!(
        "{} | [{}] | {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        line.source,
        line.text
    )
}
