//! A levelled line logger bound to an output stream.
//!
//! The statistics report is user-facing output rather than diagnostics, so it
//! goes through this sink instead of `tracing`. Lines below the logger's level
//! are dropped.

use std::fmt;
use std::io::Write;

/// Width the optional prefix is padded to.
const PREFIX_WIDTH: usize = 20;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Verbose,
    Info,
    Warning,
    Fatal,
}

#[derive(Debug)]
pub struct Logger<W: Write> {
    out: W,
    level: LogLevel,
    prefix: Option<String>,
}

impl Logger<std::io::StdoutLock<'static>> {
    /// Creates a logger that writes to standard output.
    #[must_use]
    pub fn stdout(level: LogLevel) -> Self {
        Self::new(std::io::stdout().lock(), level)
    }
}

impl<W: Write> Logger<W> {
    pub fn new(out: W, level: LogLevel) -> Self {
        Self {
            out,
            level,
            prefix: None,
        }
    }

    /// Writes `prefix: ` (padded) in front of every line.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    /// Writes one line if `level` is at or above the logger's level.
    pub fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) -> std::io::Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        if let Some(prefix) = &self.prefix {
            write!(self.out, "{:<width$}: ", prefix, width = PREFIX_WIDTH)?;
        }
        self.out.write_fmt(args)?;
        self.out.write_all(b"\n")
    }

    pub fn info(&mut self, args: fmt::Arguments<'_>) -> std::io::Result<()> {
        self.log(LogLevel::Info, args)
    }

    pub fn verbose(&mut self, args: fmt::Arguments<'_>) -> std::io::Result<()> {
        self.log(LogLevel::Verbose, args)
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    /// Returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_below_level() {
        let mut log = Logger::new(Vec::new(), LogLevel::Info);
        log.verbose(format_args!("hidden")).unwrap();
        log.info(format_args!("shown {}", 1)).unwrap();
        log.log(LogLevel::Warning, format_args!("warned")).unwrap();
        let out = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(out, "shown 1\nwarned\n");
    }

    #[test]
    fn prefix_is_padded() {
        let mut log = Logger::new(Vec::new(), LogLevel::Verbose).with_prefix("gen-mesh");
        log.verbose(format_args!("x")).unwrap();
        let out = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(out, format!("{:<20}: x\n", "gen-mesh"));
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Verbose < LogLevel::Info);
        assert!(LogLevel::Warning < LogLevel::Fatal);
        let log = Logger::new(std::io::sink(), LogLevel::Warning);
        assert!(!log.enabled(LogLevel::Info));
        assert!(log.enabled(LogLevel::Fatal));
    }
}
