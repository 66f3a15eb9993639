#![deny(missing_docs)]
//! Shared logging utilities for the market workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a minimal test initializer for the global logger, and the process-wide
//! diagnostic [`LogBuffer`] that every concurrent search appends to.

use std::io;
use std::sync::{Arc, Mutex, OnceLock};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

#[derive(Debug, Default)]
struct BufferInner {
    lines: Vec<String>,
    partial: String,
}

/// Append-only, in-memory sink for formatted log lines.
///
/// Cloning yields another handle onto the same buffer. The buffer implements
/// [`io::Write`] so it can back a `simplelog::WriteLogger`; bytes are split on
/// newlines and each complete line is appended.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<BufferInner>>,
}

impl LogBuffer {
    /// Creates an empty, standalone buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide buffer shared by every search.
    pub fn global() -> &'static LogBuffer {
        static GLOBAL: OnceLock<LogBuffer> = OnceLock::new();
        GLOBAL.get_or_init(LogBuffer::new)
    }

    /// Appends one complete line.
    pub fn push_line(&self, line: impl Into<String>) {
        let mut inner = self.lock();
        inner.lines.push(line.into());
    }

    /// Returns a copy of every complete line appended so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    /// Number of complete lines appended so far.
    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    /// Returns true when no complete line has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BufferInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let mut inner = self.lock();
        for ch in text.chars() {
            if ch == '\n' {
                let line = std::mem::take(&mut inner.partial);
                inner.lines.push(line);
            } else {
                inner.partial.push(ch);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
