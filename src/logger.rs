//! Console output gated by a process-wide verbosity.
//!
//! `--quiet` keeps only errors, `--verbose` adds per-file detail. The level is
//! set once from `main` before any worker thread starts.

use crate::constants::{ERROR_PREFIX, VERBOSE_PREFIX, WARNING_PREFIX};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    Quiet = 0,
    Normal = 1,
    Verbose = 2,
}

/// What a message is; decides both the stream and whether it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
    Info,
    Detail,
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

impl Verbosity {
    /// Quiet wins when both switches are given.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }

    pub fn allows(self, level: Level) -> bool {
        match level {
            Level::Error => true,
            Level::Warn | Level::Info => self >= Verbosity::Normal,
            Level::Detail => self == Verbosity::Verbose,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Verbosity::Quiet,
            2 => Verbosity::Verbose,
            _ => Verbosity::Normal,
        }
    }
}

pub fn set_verbosity(verbosity: Verbosity) {
    VERBOSITY.store(verbosity as u8, Ordering::Relaxed);
}

pub fn verbosity() -> Verbosity {
    Verbosity::from_u8(VERBOSITY.load(Ordering::Relaxed))
}

/// Applies the command-line switches.
pub fn configure(quiet: bool, verbose: bool) {
    set_verbosity(Verbosity::from_flags(quiet, verbose));
}

pub fn is_quiet() -> bool {
    verbosity() == Verbosity::Quiet
}

/// Prefix and message as they appear on the console, or `None` when the
/// current verbosity hides this level.
pub fn render(verbosity: Verbosity, level: Level, args: fmt::Arguments<'_>) -> Option<String> {
    if !verbosity.allows(level) {
        return None;
    }
    Some(match level {
        Level::Error => format!("{} {}", ERROR_PREFIX, args),
        Level::Warn => format!("{}  {}", WARNING_PREFIX, args),
        Level::Info => args.to_string(),
        Level::Detail => format!("{} {}", VERBOSE_PREFIX, args),
    })
}

/// Backend of the logging macros. Errors and warnings go to stderr.
pub fn emit(level: Level, args: fmt::Arguments<'_>) {
    let Some(line) = render(verbosity(), level, args) else {
        return;
    };
    match level {
        Level::Error | Level::Warn => eprintln!("{}", line),
        Level::Info | Level::Detail => println!("{}", line),
    }
}

// The macros expand to a single call expression so they can sit in closure
// bodies and match arms without a trailing semicolon.

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Level::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Level::Detail, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Level::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Level::Error, format_args!($($arg)*))
    };
}
