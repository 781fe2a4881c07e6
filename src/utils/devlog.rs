//! Developer trace lines with an optional per-thread capture buffer.
//!
//! Lines always go to the `filterkit::dev` log target at TRACE. When a thread has
//! called [`capture`], they are also kept in memory so tests can assert on them
//! without installing a global logger.

use std::cell::RefCell;

pub const DEV_TARGET: &str = "filterkit::dev";

thread_local! {
    static CAPTURED: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Stops capturing on the current thread when dropped.
pub struct CaptureGuard;

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURED.with(|c| *c.borrow_mut() = None);
    }
}

/// Starts capturing developer lines emitted on the current thread.
#[must_use]
pub fn capture() -> CaptureGuard {
    CAPTURED.with(|c| *c.borrow_mut() = Some(Vec::new()));
    CaptureGuard
}

/// Sends one line to the dev target and, when capturing, to this thread's buffer.
pub fn emit(line: &str) {
    CAPTURED.with(|c| {
        if let Some(buf) = c.borrow_mut().as_mut() {
            buf.push(line.to_owned());
        }
    });
    log::trace!(target: DEV_TARGET, "{line}");
}

/// Returns and clears the captured lines; empty when capture is off.
#[must_use]
pub fn take() -> Vec<String> {
    CAPTURED.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

#[macro_export]
macro_rules! devlog {
    ($($arg:tt)*) => {
        $crate::utils::devlog::emit(&format!($($arg)*))
    };
}
