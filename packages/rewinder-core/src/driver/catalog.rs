//! Catalog of defined connection types and their definition event.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::{ConnectionType, ConnectionTypeBuilder, Driver};
use crate::adapter::InstallTarget;
use crate::error::RewindError;

static GLOBAL: OnceLock<DriverCatalog> = OnceLock::new();

/// Callback fired for each connection type defined in a catalog.
pub type DefinitionHook = Arc<dyn Fn(&dyn InstallTarget) + Send + Sync>;

#[derive(Default)]
struct CatalogState {
    types: Vec<Arc<dyn InstallTarget>>,
    hooks: Vec<DefinitionHook>,
}

/// Every connection type known to the process, plus observers of new ones.
///
/// Definition and subscription are serialized on one lock: a hook sees each
/// type exactly once, either while subscribing or while the type is being
/// defined, and [`define`](Self::define) only hands a type back after every
/// hook has run on it. Hooks must not define types themselves.
#[derive(Default)]
pub struct DriverCatalog {
    state: Mutex<CatalogState>,
}

impl DriverCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide catalog.
    pub fn global() -> &'static DriverCatalog {
        GLOBAL.get_or_init(DriverCatalog::new)
    }

    /// Defines a connection type and fires the definition hooks on it.
    ///
    /// # Errors
    /// [`RewindError::TypeAlreadyDefined`] if the name is taken.
    pub fn define<D: Driver>(&self, builder: ConnectionTypeBuilder<D>) -> Result<Arc<ConnectionType<D>>, RewindError> {
        let mut state = self.state.lock();
        if state.types.iter().any(|t| t.type_name() == builder.name()) {
            return Err(RewindError::TypeAlreadyDefined {
                name: builder.name().to_string(),
            });
        }

        let connection_type = builder.build();
        tracing::debug!(
            connection_type = connection_type.name(),
            parent = connection_type.parent(),
            hooks = state.hooks.len(),
            "defining connection type"
        );
        for hook in &state.hooks {
            hook(&*connection_type);
        }
        state.types.push(connection_type.clone());
        Ok(connection_type)
    }

    /// Registers `hook` for future definitions and runs it on every type
    /// already defined.
    ///
    /// Returns the number of already-defined types the hook ran on.
    pub fn subscribe(&self, hook: DefinitionHook) -> usize {
        let mut state = self.state.lock();
        for connection_type in &state.types {
            hook(connection_type.as_ref());
        }
        state.hooks.push(hook);
        state.types.len()
    }

    /// Returns the names of all defined types, in definition order.
    pub fn type_names(&self) -> Vec<String> {
        self.state
            .lock()
            .types
            .iter()
            .map(|t| t.type_name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().types.is_empty()
    }
}
