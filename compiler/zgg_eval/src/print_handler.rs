//! Destination for script output.
//!
//! `print` and `println` write through the runtime's handler:
//! - `Stdout` for embedded use (default)
//! - `Buffer` to capture output for tests and hosts that display it later
//! - `Silent` to discard it
//!
//! Dispatch is a plain enum match; the handler is shared by every context
//! cloned from the same runtime, including spawned threads.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

pub enum PrintHandler {
    Stdout,
    Buffer(Mutex<String>),
    Silent,
}

impl PrintHandler {
    /// Write `text` followed by a newline.
    pub fn println(&self, text: &str) {
        match self {
            Self::Stdout => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                // Output errors (closed pipe) are not script errors.
                let _ = writeln!(lock, "{text}");
            }
            Self::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(text);
                buf.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Write `text` as is.
    pub fn print(&self, text: &str) {
        match self {
            Self::Stdout => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                let _ = lock.write_all(text.as_bytes());
                let _ = lock.flush();
            }
            Self::Buffer(buf) => buf.lock().push_str(text),
            Self::Silent => {}
        }
    }

    /// Everything captured so far. Empty unless this is a buffer.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(buf) => buf.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    /// Drop captured output and return it.
    pub fn take_output(&self) -> String {
        match self {
            Self::Buffer(buf) => std::mem::take(&mut *buf.lock()),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Buffer(_))
    }
}

pub type SharedPrintHandler = Arc<PrintHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(Mutex::new(String::new())))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}
