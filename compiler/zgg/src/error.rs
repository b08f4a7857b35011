//! Host-facing error type.

use thiserror::Error;
use zgg_eval::{EvalError, EvalErrorKind};
use zgg_ir::Position;

/// Why a module run failed.
#[derive(Debug, Error)]
pub enum Error {
    /// An exception nothing caught.
    #[error("{message}{}", located(.position.as_ref()))]
    Runtime {
        message: String,
        position: Option<Position>,
        backtrace: String,
        #[source]
        source: EvalError,
    },

    /// Control-flow misuse or a broken evaluator invariant.
    #[error("fatal: {message}{}", located(.position.as_ref()))]
    Fatal {
        message: String,
        position: Option<Position>,
        backtrace: String,
        #[source]
        source: EvalError,
    },

    /// A spawned thread failed and its error reached the top of a join.
    #[error("thread failed: {message}{}", located(.position.as_ref()))]
    Thread {
        message: String,
        position: Option<Position>,
        backtrace: String,
        #[source]
        source: EvalError,
    },
}

fn located(position: Option<&Position>) -> String {
    position.map_or_else(String::new, |pos| format!(" (at {pos})"))
}

impl Error {
    pub fn message(&self) -> &str {
        match self {
            Error::Runtime { message, .. }
            | Error::Fatal { message, .. }
            | Error::Thread { message, .. } => message,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            Error::Runtime { position, .. }
            | Error::Fatal { position, .. }
            | Error::Thread { position, .. } => position.as_ref(),
        }
    }

    /// One line per function activation, innermost first.
    pub fn backtrace(&self) -> &str {
        match self {
            Error::Runtime { backtrace, .. }
            | Error::Fatal { backtrace, .. }
            | Error::Thread { backtrace, .. } => backtrace,
        }
    }

    /// The evaluator error this was built from.
    pub fn eval_error(&self) -> &EvalError {
        match self {
            Error::Runtime { source, .. }
            | Error::Fatal { source, .. }
            | Error::Thread { source, .. } => source,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal { .. })
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        let message = err.message.clone();
        let position = err.position.clone();
        let backtrace = err
            .backtrace
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        if err.is_fatal() {
            Error::Fatal {
                message,
                position,
                backtrace,
                source: err,
            }
        } else if err.kind == EvalErrorKind::ThreadFailed {
            Error::Thread {
                message,
                position,
                backtrace,
                source: err,
            }
        } else {
            Error::Runtime {
                message,
                position,
                backtrace,
                source: err,
            }
        }
    }
}
