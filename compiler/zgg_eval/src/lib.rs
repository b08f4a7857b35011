//! zgg Eval - tree-walking evaluator for zgg programs.
//!
//! # Architecture
//!
//! - `Value`: the dynamic value model (scalars inline, shared kinds behind `Arc`)
//! - `TypeDef`: builtin and user types, member tables and statics
//! - `SharedScope`: lexical scopes shared by closures
//! - `Context`: per-thread evaluation state (frames, defers, flow signal)
//! - `Runtime`: state shared by every context (globals, `extend` table,
//!   module cache, print handler)
//! - `ClassBuilder`: host-defined types
//!
//! Input is a `zgg_ir::Module`; running it yields the module's export
//! object or an `EvalError`.

mod builtins;
mod context;
mod environment;
pub mod errors;
mod interpreter;
mod print_handler;
mod runtime;
mod stack;
mod value;

pub use builtins::{make_iterator, ClassBuilder};
pub use context::{Context, Flow};
pub use environment::{BindError, SharedScope};
pub use errors::{EvalBacktrace, EvalError, EvalErrorKind, EvalNote, EvalResult};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use runtime::{ModuleImporter, ModuleInfo, Runtime, RuntimeBuilder, RuntimeConfig};
pub use value::{
    builtin_types, type_id, BoundMethod, BuiltinFn, BuiltinTypes, CompareResult, FuncValue, Heap,
    HostValue, NativeFn, Object, ObjectRef, OrderedMembers, Reserved, TypeDef, TypeRef, Value,
};

#[cfg(test)]
mod tests;
