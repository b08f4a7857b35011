//! Evaluation errors.
//!
//! Everything that aborts evaluation is an `EvalError`. Its `kind` tells
//! catchable exceptions (type errors, user throws, host failures) apart
//! from fatal errors that no `try`, `fallback` or `??` may intercept
//! (control-flow misuse and broken invariants).
//!
//! Factory functions populate `kind` and `message` together; the message
//! is always the kind's `Display` output.

use std::fmt;

use zgg_ir::{BinaryOp, Position};

use crate::value::Value;

/// Result of evaluating an expression or running a callable.
pub type EvalResult = Result<Value, EvalError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Arithmetic
    DivisionByZero,
    RepeatTooLarge {
        count: i64,
        limit: usize,
    },

    // Type/Operator
    TypeMismatch {
        expected: String,
        got: String,
    },
    BinaryTypeMismatch {
        verb: &'static str,
        left: String,
        right: String,
    },
    NotCallable {
        type_name: String,
    },
    NotIterable {
        type_name: String,
    },

    // Access
    UndefinedVariable {
        name: String,
    },
    VariableRedefined {
        name: String,
    },
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    InvalidKeyword {
        keyword: String,
        callee: String,
    },

    // Calls
    StackOverflow {
        depth: usize,
    },

    // Raised by scripts
    UserException,
    AssertionFailed {
        message: String,
    },

    // Modules and threads
    ImportFailed {
        module: String,
    },
    ThreadFailed,

    /// Failure reported by a host function.
    Host {
        message: String,
    },

    // Fatal
    ExportOutsideModule,
    UnmatchedLabel {
        keyword: &'static str,
        label: Option<String>,
    },
    DeferNotCallable,
    Internal {
        message: String,
    },
}

impl EvalErrorKind {
    /// Fatal kinds end the thread's evaluation and are never caught.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ExportOutsideModule
                | Self::UnmatchedLabel { .. }
                | Self::DeferNotCallable
                | Self::Internal { .. }
        )
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::RepeatTooLarge { count, limit } => {
                write!(f, "repeat count {count} exceeds the {limit} element limit")
            }

            Self::TypeMismatch { expected, got } => {
                write!(f, "value requires {expected}, got {got}")
            }
            Self::BinaryTypeMismatch { verb, left, right } => {
                write!(f, "Cannot {verb} between {left} and {right}")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::NotIterable { type_name } => write!(f, "{type_name} is not iterable"),

            Self::UndefinedVariable { name } => write!(f, "variable {name} not exists"),
            Self::VariableRedefined { name } => write!(f, "variable {name} redefined"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of range (length {len})")
            }
            Self::InvalidKeyword { keyword, callee } => {
                write!(f, "'{keyword}' is an invalid keyword argument for {callee}")
            }

            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }

            Self::UserException => write!(f, "exception raised"),
            Self::AssertionFailed { message } => write!(f, "Assertion fail! {message}"),

            Self::ImportFailed { module } => write!(f, "ImportError: module {module} not exists"),
            Self::ThreadFailed => write!(f, "spawned thread failed"),

            Self::Host { message } => f.write_str(message),

            Self::ExportOutsideModule => write!(f, "export must be in module top block"),
            Self::UnmatchedLabel { keyword, label } => match label {
                Some(label) => write!(f, "{keyword} to unknown label {label}"),
                None => write!(f, "{keyword} outside of a loop"),
            },
            Self::DeferNotCallable => write!(f, "defer call not callable"),
            Self::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

/// Secondary information attached to an error.
#[derive(Clone, Debug)]
pub struct EvalNote {
    pub message: String,
    pub position: Option<Position>,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    pub fn at(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
        }
    }
}

/// One function activation in a backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub function: String,
    pub position: Position,
}

/// Snapshot of the function frames active when an error was raised,
/// innermost first.
#[derive(Clone, Debug, Default)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "  {} line {} ({})", frame.position.file_name(), frame.position.line, frame.function)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    /// The thrown value for user exceptions; the host value for re-raised
    /// thread errors.
    pub payload: Option<Value>,
    /// Statement being executed when the error was raised.
    pub position: Option<Position>,
    pub backtrace: Option<EvalBacktrace>,
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    /// A host failure with a free-form message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Host {
            message: message.into(),
        })
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            payload: None,
            position: None,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Message followed by position and backtrace.
    pub fn message_with_stack(&self) -> String {
        let mut out = self.message.clone();
        if let Some(pos) = &self.position {
            out.push_str(&format!(" (at {pos})"));
        }
        if let Some(bt) = self.backtrace.as_ref().filter(|bt| !bt.is_empty()) {
            out.push_str("\nstack:\n");
            out.push_str(&bt.to_string());
        }
        out
    }

    /// The object a `catch` clause binds: `{message, stack, value?}`.
    pub fn to_value(&self) -> Value {
        let stack = self
            .backtrace
            .as_ref()
            .map(|bt| {
                bt.frames()
                    .iter()
                    .map(|f| {
                        Value::array(vec![
                            Value::str(f.position.file_name()),
                            Value::Int(i64::from(f.position.line)),
                            Value::str(&f.function),
                        ])
                    })
                    .collect()
            })
            .unwrap_or_default();
        let mut members = vec![
            ("message", Value::str(&self.message)),
            ("stack", Value::array(stack)),
        ];
        if let Some(payload) = &self.payload {
            members.push(("value", payload.clone()));
        }
        Value::object(members)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Operators

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn repeat_too_large(count: i64, limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RepeatTooLarge { count, limit })
}

/// "Cannot plus between Int and Str"
#[cold]
pub fn binary_type_mismatch(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BinaryTypeMismatch {
        verb: op.verb(),
        left: left.type_name().to_string(),
        right: right.type_name().to_string(),
    })
}

#[cold]
pub fn unary_type_mismatch(symbol: &str, operand: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: format!("an operand for unary {symbol}"),
        got: operand.type_name().to_string(),
    })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.type_name().to_string(),
    })
}

#[cold]
pub fn not_callable(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: value.type_name().to_string(),
    })
}

#[cold]
pub fn not_iterable(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotIterable {
        type_name: value.type_name().to_string(),
    })
}

// Variables and access

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn variable_redefined(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::VariableRedefined {
        name: name.to_string(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn invalid_keyword(keyword: &str, callee: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidKeyword {
        keyword: keyword.to_string(),
        callee: callee.to_string(),
    })
}

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

// Script-raised

/// `throw value`: the message is the rendered value.
#[cold]
pub fn user_exception(message: String, value: Value) -> EvalError {
    let mut err = EvalError::from_kind(EvalErrorKind::UserException);
    err.message = message;
    err.payload = Some(value);
    err
}

#[cold]
pub fn assertion_failed(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssertionFailed {
        message: message.to_string(),
    })
}

// Modules and threads

#[cold]
pub fn import_failed(module: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ImportFailed {
        module: module.to_string(),
    })
}

/// Re-raise a spawned thread's error in the joining thread. Always
/// catchable, even when the thread died of a fatal error.
#[cold]
pub fn thread_failed(inner: &EvalError) -> EvalError {
    let mut err = EvalError::from_kind(EvalErrorKind::ThreadFailed);
    err.message = inner.message.clone();
    err.payload = Some(inner.payload.clone().unwrap_or_else(|| inner.to_value()));
    if let Some(pos) = &inner.position {
        err.notes.push(EvalNote::at("raised in spawned thread", pos.clone()));
    }
    err
}

// Fatal

#[cold]
pub fn export_outside_module() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ExportOutsideModule)
}

#[cold]
pub fn unmatched_label(keyword: &'static str, label: Option<&str>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnmatchedLabel {
        keyword,
        label: label.map(str::to_string),
    })
}

#[cold]
pub fn defer_not_callable() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DeferNotCallable)
}

#[cold]
pub fn internal(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Internal {
        message: message.into(),
    })
}
