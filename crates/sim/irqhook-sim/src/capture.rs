//! A log sink that keeps lines in memory.

use std::fmt;
use std::sync::Mutex;

use irqhook_core::log::{LogLevel, set_log_fn};

static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn record(level: LogLevel, args: fmt::Arguments<'_>) {
    if let Ok(mut lines) = LINES.lock() {
        lines.push(format!("[{}] {args}", level.name()));
    }
}

/// Routes `irqhook_core` logging into the in-memory buffer.
pub fn install() {
    // SAFETY: `record` never blocks on anything an interrupt could hold; the
    // simulator runs handlers on the caller's thread.
    unsafe { set_log_fn(record) };
}

/// Takes every line recorded so far.
pub fn drain() -> Vec<String> {
    LINES
        .lock()
        .map(|mut lines| core::mem::take(&mut *lines))
        .unwrap_or_default()
}
