//! Two-phase construction support for the transform DAG (§4.4, §9 "Cycles in
//! transform DAG").
//!
//! `Compose` (and `JsonPath`) can reference other transforms by name, and the
//! declarative config may name them in any order, or even cyclically. Rather
//! than require a topological sort up front, every named transform gets a
//! [`DeferredTransformer`] placeholder *before* any transformer is actually
//! constructed; `Compose`/`JsonPath` close over the placeholder (an `Arc`, so
//! the indirection is free after setup), and [`DeferredTransformer::resolve`]
//! fills it in once construction of the whole set has finished. This ties the
//! fixpoint knot: forward references and cycles in the config become real
//! (but perfectly well-defined, since nothing calls `transform` during
//! construction) cycles in the instance graph.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use slicedb_errors::{ObjectId, SliceError};

use crate::Transformer;

/// A placeholder for a named transformer, resolved after every transformer
/// in the set has been constructed.
pub struct DeferredTransformer {
    name: String,
    cell: OnceLock<Arc<dyn Transformer>>,
}

impl DeferredTransformer {
    fn new(name: String) -> Self {
        DeferredTransformer {
            name,
            cell: OnceLock::new(),
        }
    }

    /// Binds the real transformer. Must be called exactly once per name,
    /// after all names have placeholders.
    pub fn resolve(&self, transformer: Arc<dyn Transformer>) {
        // Construction assigns each name exactly once; a second call would
        // indicate a bug in the build order, not a runtime condition to
        // recover from.
        let _ = self.cell.set(transformer);
    }
}

impl Transformer for DeferredTransformer {
    fn transform(&self, input: Option<&str>) -> Result<Option<String>, SliceError> {
        let inner = self.cell.get().unwrap_or_else(|| {
            panic!(
                "transform '{}' used before its construction completed",
                self.name
            )
        });
        inner.transform(input)
    }
}

/// The per-dump registry of deferred transformer handles, keyed by the name
/// used in the transform config's `transforms` map.
#[derive(Clone, Default)]
pub struct Context {
    handles: HashMap<String, Arc<DeferredTransformer>>,
}

impl Context {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let handles = names
            .into_iter()
            .map(|name| {
                let handle = Arc::new(DeferredTransformer::new(name.clone()));
                (name, handle)
            })
            .collect();
        Context { handles }
    }

    /// Looks up a named transform for `Compose`/`JsonPath` to reference.
    /// Returns the deferred handle itself — resolving it is the caller's
    /// job once every transformer has been constructed.
    pub fn get_transform(&self, name: &str) -> Result<Arc<dyn Transformer>, SliceError> {
        self.handles
            .get(name)
            .map(|handle| Arc::clone(handle) as Arc<dyn Transformer>)
            .ok_or_else(|| {
                SliceError::configuration(
                    ObjectId::Transform(name.to_string()),
                    "unknown transform name".to_string(),
                )
            })
    }

    pub(crate) fn handle(&self, name: &str) -> Option<Arc<DeferredTransformer>> {
        self.handles.get(name).cloned()
    }
}
