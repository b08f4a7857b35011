//! zgg - embed the zgg dynamic language in a Rust host.
//!
//! Build an [`Engine`], hand it a [`zgg_ir::Module`] (assembled with
//! [`zgg_ir::build`] or produced by a front end) and get back the module's
//! export object:
//!
//! ```ignore
//! use zgg::ir::build::{export, int, module};
//!
//! let engine = zgg::Engine::new();
//! let exports = engine.run(&module(vec![export("answer", int(42))]))?;
//! ```
//!
//! Host functions and classes enter through [`EngineBuilder::global`] with
//! [`Value::native`] and [`ClassBuilder`]; `import` is served by an
//! [`EngineBuilder::importer`] callback.

mod engine;
mod error;
mod tracing_setup;

pub use engine::{Engine, EngineBuilder};
pub use error::Error;
pub use tracing_setup::init_tracing;

pub use zgg_eval::{
    buffer_handler, silent_handler, stdout_handler, ClassBuilder, Context, EvalError,
    EvalErrorKind, ModuleImporter, ModuleInfo, ObjectRef, Runtime, RuntimeConfig, Value,
};
pub use zgg_ir as ir;
