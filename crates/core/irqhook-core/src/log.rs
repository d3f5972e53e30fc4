//! Leveled logging without an output device.
//!
//! The crate never owns a sink. Integrators register one leveled log
//! function with [`set_log_fn`]; until then every message goes to a no-op.
//! Messages are formatted lazily through [`core::fmt::Arguments`], so nothing
//! here allocates.
//!
//! Vector operations log at [`LogLevel::Debug`]. Code running in interrupt
//! context only ever logs at [`LogLevel::Trace`], and a sink must be safe to
//! call from there.

use core::fmt;
use core::sync::atomic::{AtomicPtr, Ordering};

// ---------------------------------------------------------------------------
// Log levels, lower is more severe
// ---------------------------------------------------------------------------

/// Log severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    /// Fatal: the machine cannot continue.
    Fatal = 0,
    /// Error: something failed but the system may continue.
    Error = 1,
    /// Warning: unexpected condition, not necessarily an error.
    Warn = 2,
    /// Informational: high-level progress messages.
    Info = 3,
    /// Debug: vector operations and their byte images.
    Debug = 4,
    /// Trace: interrupt-context activity.
    Trace = 5,
}

impl LogLevel {
    /// Returns the human-readable name (fixed-width for aligned output).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_end())
    }
}

// ---------------------------------------------------------------------------
// Leveled log function (hlog! and convenience macros)
// ---------------------------------------------------------------------------

/// The signature of the global leveled log function.
pub type LogFn = fn(LogLevel, fmt::Arguments<'_>);

fn null_log(_level: LogLevel, _args: fmt::Arguments<'_>) {}

static LOG_FN: AtomicPtr<()> = AtomicPtr::new(null_log as *mut ());

/// Registers the global leveled log function.
///
/// # Safety
///
/// The provided function must be safe to call from any context, including
/// from inside an interrupt handler with interrupts masked. May be called more
/// than once. Uses `Release` ordering so subsequent loads see the new function.
pub unsafe fn set_log_fn(f: LogFn) {
    LOG_FN.store(f as *mut (), Ordering::Release);
}

#[inline]
fn load_log_fn() -> LogFn {
    let ptr = LOG_FN.load(Ordering::Acquire);
    // SAFETY: Only valid `LogFn` pointers (or the initial `null_log`) are
    // ever stored into LOG_FN.
    unsafe { core::mem::transmute::<*mut (), LogFn>(ptr) }
}

/// Implementation detail for [`hlog!`]. Not public API.
#[doc(hidden)]
pub fn _log(level: LogLevel, args: fmt::Arguments<'_>) {
    load_log_fn()(level, args);
}

/// Logs a message at the given level.
#[macro_export]
macro_rules! hlog {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::_log($level, format_args!($($arg)*))
    };
}

/// Logs a warning-level message (level 2).
#[macro_export]
macro_rules! hwarn {
    ($($arg:tt)*) => { $crate::hlog!($crate::log::LogLevel::Warn, $($arg)*) };
}

/// Logs a debug-level message (level 4).
#[macro_export]
macro_rules! hdebug {
    ($($arg:tt)*) => { $crate::hlog!($crate::log::LogLevel::Debug, $($arg)*) };
}

/// Logs a trace-level message (level 5).
#[macro_export]
macro_rules! htrace {
    ($($arg:tt)*) => { $crate::hlog!($crate::log::LogLevel::Trace, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static CAPTURED: Mutex<Vec<(LogLevel, String)>> = Mutex::new(Vec::new());

    fn capture(level: LogLevel, args: fmt::Arguments<'_>) {
        CAPTURED.lock().unwrap().push((level, args.to_string()));
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(LogLevel::Fatal < LogLevel::Error);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn names_are_fixed_width() {
        for level in [
            LogLevel::Fatal,
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(level.name().len(), 5);
        }
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
    }

    #[test]
    fn registered_sink_receives_messages() {
        unsafe { set_log_fn(capture) };
        hwarn!("log-sink-marker {}", 7);
        let found = CAPTURED
            .lock()
            .unwrap()
            .iter()
            .any(|(level, msg)| *level == LogLevel::Warn && msg == "log-sink-marker 7");
        assert!(found);
    }

    #[test]
    fn level_macros_tag_their_level() {
        unsafe { set_log_fn(capture) };
        hdebug!("level-marker debug");
        htrace!("level-marker trace");
        let captured = CAPTURED.lock().unwrap();
        let level_of = |text: &str| {
            captured
                .iter()
                .find(|(_, msg)| msg == text)
                .map(|(level, _)| *level)
        };
        assert_eq!(level_of("level-marker debug"), Some(LogLevel::Debug));
        assert_eq!(level_of("level-marker trace"), Some(LogLevel::Trace));
    }
}
