//! `Engine`: one runtime plus the entry points a host needs.

use std::sync::Arc;

use zgg_eval::{
    Context, ModuleImporter, Runtime, RuntimeBuilder, RuntimeConfig, SharedPrintHandler, Value,
};
use zgg_ir::{Module, Name};

use crate::{init_tracing, Error};

/// Runs zgg modules against one shared runtime.
///
/// Every `run` gets a fresh [`Context`], so top-level bindings of one
/// module never clash with another's. Globals, `extend` registrations and
/// the module cache persist across runs.
pub struct Engine {
    runtime: Arc<Runtime>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// An engine with the default configuration printing to stdout.
    pub fn new() -> Self {
        Engine::builder().build()
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    pub fn set_global(&self, name: impl Into<Name>, value: Value) {
        self.runtime.set_global(name, value);
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.runtime.get_global(name)
    }

    /// Evaluate `module` and return its export object.
    pub fn run(&self, module: &Module) -> Result<Value, Error> {
        let mut ctx = self.context();
        ctx.run_module(module).map_err(|err| {
            tracing::debug!(error = %err, fatal = err.is_fatal(), "module failed");
            Error::from(err)
        })
    }

    /// A fresh evaluation context on this engine's runtime.
    pub fn context(&self) -> Context {
        Context::new(Arc::clone(&self.runtime))
    }

    /// Output captured since the last call, if the engine prints to a
    /// buffer.
    pub fn output(&self) -> Option<String> {
        let handler = self.runtime.print_handler();
        handler.is_capturing().then(|| handler.take_output())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    runtime: RuntimeBuilder,
    tracing: bool,
}

impl EngineBuilder {
    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.runtime = self.runtime.config(config);
        self
    }

    #[must_use]
    pub fn importer(mut self, importer: impl ModuleImporter + 'static) -> Self {
        self.runtime = self.runtime.importer(importer);
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.runtime = self.runtime.print_handler(handler);
        self
    }

    #[must_use]
    pub fn global(mut self, name: impl Into<Name>, value: Value) -> Self {
        self.runtime = self.runtime.global(name, value);
        self
    }

    /// Install the tracing subscriber (see [`init_tracing`]) on `build`.
    #[must_use]
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    pub fn build(self) -> Engine {
        if self.tracing {
            init_tracing();
        }
        Engine {
            runtime: self.runtime.build(),
        }
    }
}
