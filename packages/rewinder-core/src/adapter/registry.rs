//! Installation of interception across every connection type.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{InstallTarget, StatementObserver};
use crate::config::RewinderConfig;
use crate::driver::DriverCatalog;
use crate::recorder::RecordingRegistry;

/// Installs insert interception on every connection type of a catalog.
///
/// [`attach`](Self::attach) covers the types already defined and subscribes
/// to the catalog so each type defined later is intercepted before
/// [`DriverCatalog::define`] returns it.
///
/// Installation never wraps a handler twice. A derived type inheriting an
/// intercepted handler keeps that single interceptor; a derived type that
/// re-declares an entry point gets a fresh interceptor for its own handler.
/// One statement is therefore recorded by exactly one interceptor.
#[derive(Debug)]
pub struct AdapterRegistry {
    observer: StatementObserver,
    config: RewinderConfig,
    installed: Mutex<Vec<String>>,
}

impl AdapterRegistry {
    /// Creates a registry recording into `recorder`.
    pub fn new(recorder: Arc<RecordingRegistry>, config: RewinderConfig) -> Arc<Self> {
        Arc::new(Self {
            observer: StatementObserver::new(recorder, config.split_statements),
            config,
            installed: Mutex::new(Vec::new()),
        })
    }

    pub fn recorder(&self) -> &Arc<RecordingRegistry> {
        self.observer.recorder()
    }

    pub fn config(&self) -> &RewinderConfig {
        &self.config
    }

    /// Installs on every type in `catalog` and on every type defined later.
    ///
    /// Returns the number of already-defined types processed.
    pub fn attach(self: &Arc<Self>, catalog: &DriverCatalog) -> usize {
        let adapters = Arc::clone(self);
        let existing = catalog.subscribe(Arc::new(move |target: &dyn InstallTarget| {
            adapters.install(target);
        }));
        tracing::debug!(existing, "attached insert interception to driver catalog");
        existing
    }

    /// Installs on one connection type.
    ///
    /// Returns the number of handlers newly wrapped; zero when the type
    /// exposes no configured entry point or is already intercepted.
    pub fn install(&self, target: &dyn InstallTarget) -> usize {
        let wrapped = target.install(&self.observer, &self.config.entry_points);
        tracing::debug!(
            connection_type = target.type_name(),
            parent = target.parent_name(),
            wrapped,
            "installed insert interception"
        );

        let mut installed = self.installed.lock();
        if !installed.iter().any(|name| name == target.type_name()) {
            installed.push(target.type_name().to_string());
        }
        wrapped
    }

    /// Names of the types this registry has installed on.
    pub fn installed_types(&self) -> Vec<String> {
        self.installed.lock().clone()
    }
}
