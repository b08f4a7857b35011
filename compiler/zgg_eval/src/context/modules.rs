//! Module import through the runtime's cache.

use std::sync::Arc;

use super::Context;
use crate::errors;
use crate::runtime::ModuleInfo;
use crate::value::Value;
use crate::EvalResult;

impl Context {
    /// Import `name` through the module cache.
    ///
    /// A cached module is returned as is unless `force_reload` is set and
    /// its timestamp is non-zero. Otherwise the importer is asked; if it
    /// reports the cached timestamp the cached value is kept, and any
    /// other non-`Undefined` result replaces the cache entry.
    pub fn import_module(&mut self, name: &str, force_reload: bool) -> EvalResult {
        let cached = self.runtime.modules().get(name).map(|entry| entry.value().clone());
        let mut cached_modified = 0;
        if let Some(info) = &cached {
            if !force_reload || info.modified == 0 {
                return Ok(info.value.clone());
            }
            cached_modified = info.modified;
        }

        let Some(importer) = self.runtime.importer().cloned() else {
            return Err(errors::import_failed(name));
        };
        tracing::debug!(module = name, force_reload, "import");
        let Some(loaded) = importer.import(self, name, cached_modified)? else {
            tracing::warn!(module = name, "module not found");
            return Err(errors::import_failed(name));
        };

        if let Some(info) = cached {
            if loaded.modified == cached_modified {
                return Ok(info.value);
            }
        }
        if !loaded.value.is_undefined() {
            self.runtime.modules().insert(
                Arc::from(name),
                ModuleInfo {
                    value: loaded.value.clone(),
                    modified: loaded.modified,
                },
            );
        }
        Ok(loaded.value)
    }

    /// Drop a cached module so the next import reloads it.
    pub fn forget_module(&self, name: &str) -> Option<Value> {
        self.runtime.modules().remove(name).map(|(_, info)| info.value)
    }
}
