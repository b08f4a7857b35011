//! Process-shared evaluator state.
//!
//! A `Runtime` holds everything contexts share: configuration, the global
//! scope, the extension table written by `extend`, the module cache, the
//! import callback and the print handler. Every `Context` (including the
//! ones cloned for spawned threads) holds an `Arc<Runtime>`.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use zgg_ir::Name;

use crate::environment::SharedScope;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::value::{builtin_types, TypeDef, Value};
use crate::{Context, EvalError};

/// Tunables for one runtime.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Add host type names to some diagnostics.
    pub debug: bool,
    /// Nested script calls allowed before raising a stack overflow.
    pub max_call_depth: usize,
    /// Name prefix for spawned evaluation threads.
    pub thread_name_prefix: String,
    /// Significant decimal digits kept by BigNum arithmetic.
    pub bignum_precision: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            debug: false,
            max_call_depth: 10_000,
            thread_name_prefix: "zgg-spawn".to_string(),
            bignum_precision: 308,
        }
    }
}

/// A cached module and the timestamp it was loaded with.
#[derive(Clone, Debug)]
pub struct ModuleInfo {
    pub value: Value,
    /// Source timestamp; zero means the module never reloads.
    pub modified: i64,
}

/// Resolves and loads modules for `import`.
///
/// `cached_modified` is the timestamp of the cached copy (zero if none).
/// Returning `Ok(None)` means the module does not exist. Returning a
/// `ModuleInfo` whose timestamp equals `cached_modified` keeps the cached
/// value.
pub trait ModuleImporter: Send + Sync {
    fn import(
        &self,
        ctx: &mut Context,
        name: &str,
        cached_modified: i64,
    ) -> Result<Option<ModuleInfo>, EvalError>;
}

impl<F> ModuleImporter for F
where
    F: Fn(&mut Context, &str, i64) -> Result<Option<ModuleInfo>, EvalError> + Send + Sync,
{
    fn import(
        &self,
        ctx: &mut Context,
        name: &str,
        cached_modified: i64,
    ) -> Result<Option<ModuleInfo>, EvalError> {
        self(ctx, name, cached_modified)
    }
}

pub struct Runtime {
    config: RuntimeConfig,
    globals: SharedScope,
    /// `extend` table keyed by (type id, member name).
    extensions: RwLock<FxHashMap<(i64, Name), Value>>,
    modules: DashMap<Arc<str>, ModuleInfo>,
    importer: Option<Arc<dyn ModuleImporter>>,
    print: SharedPrintHandler,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    /// A runtime with the default configuration and stdout output.
    pub fn new() -> Arc<Runtime> {
        RuntimeBuilder::default().build()
    }

    #[inline]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[inline]
    pub fn globals(&self) -> &SharedScope {
        &self.globals
    }

    /// Bind or replace a global.
    pub fn set_global(&self, name: impl Into<Name>, value: Value) {
        self.globals.force_define(name.into(), value);
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.lookup(name)
    }

    #[inline]
    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    pub fn importer(&self) -> Option<&Arc<dyn ModuleImporter>> {
        self.importer.as_ref()
    }

    pub(crate) fn modules(&self) -> &DashMap<Arc<str>, ModuleInfo> {
        &self.modules
    }

    /// Attach `value` to the type with `type_id` under `name`. A later
    /// registration of the same pair replaces the earlier one.
    pub fn extend(&self, type_id: i64, name: Name, value: Value) {
        tracing::debug!(type_id, name = %name, "register extension");
        self.extensions.write().insert((type_id, name), value);
    }

    /// Extension lookup: the exact type first, then its bases depth-first.
    pub fn find_extension(&self, ty: &TypeDef, name: &str) -> Option<Value> {
        let table = self.extensions.read();
        Self::find_extension_in(&table, ty, name)
    }

    fn find_extension_in(
        table: &FxHashMap<(i64, Name), Value>,
        ty: &TypeDef,
        name: &str,
    ) -> Option<Value> {
        if let Some(v) = table.get(&(ty.id(), Name::from(name))) {
            return Some(v.clone());
        }
        ty.bases()
            .iter()
            .find_map(|base| Self::find_extension_in(table, base, name))
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("modules", &self.modules.len())
            .field("extensions", &self.extensions.read().len())
            .finish_non_exhaustive()
    }
}

/// Builder for `Runtime`.
#[derive(Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    importer: Option<Arc<dyn ModuleImporter>>,
    print: Option<SharedPrintHandler>,
    globals: Vec<(Name, Value)>,
}

impl RuntimeBuilder {
    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn importer(mut self, importer: impl ModuleImporter + 'static) -> Self {
        self.importer = Some(Arc::new(importer));
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print = Some(handler);
        self
    }

    /// Add a global binding, installed after the builtins so it may
    /// shadow them.
    #[must_use]
    pub fn global(mut self, name: impl Into<Name>, value: Value) -> Self {
        self.globals.push((name.into(), value));
        self
    }

    pub fn build(self) -> Arc<Runtime> {
        let globals = SharedScope::new_root();
        for ty in builtin_types().all() {
            globals.force_define(ty.name().clone(), Value::Type(Arc::clone(ty)));
        }
        crate::builtins::register(&globals);
        for (name, value) in self.globals {
            globals.force_define(name, value);
        }
        Arc::new(Runtime {
            config: self.config,
            globals,
            extensions: RwLock::new(FxHashMap::default()),
            modules: DashMap::new(),
            importer: self.importer,
            print: self.print.unwrap_or_else(stdout_handler),
        })
    }
}
