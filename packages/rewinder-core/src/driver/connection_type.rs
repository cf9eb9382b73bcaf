//! Connection type descriptors and their handler tables.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::{Driver, EntryPoint, Handler};

/// Handlers of a connection type, one optional slot per [`EntryPoint`].
pub struct HandlerTable<D: Driver> {
    slots: [Option<Handler<D>>; EntryPoint::COUNT],
}

impl<D: Driver> HandlerTable<D> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    pub fn get(&self, entry_point: EntryPoint) -> Option<&Handler<D>> {
        self.slots[entry_point.index()].as_ref()
    }

    pub fn set(&mut self, entry_point: EntryPoint, handler: Handler<D>) {
        self.slots[entry_point.index()] = Some(handler);
    }

    /// Returns the entry points that have a handler.
    pub fn entry_points(&self) -> Vec<EntryPoint> {
        EntryPoint::ALL
            .into_iter()
            .filter(|ep| self.get(*ep).is_some())
            .collect()
    }
}

impl<D: Driver> Default for HandlerTable<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Driver> Clone for HandlerTable<D> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

/// Runtime descriptor of a driver family.
///
/// Handlers live behind an [`ArcSwap`], so dispatch is a lock-free load and
/// installing interception replaces the whole table atomically.
pub struct ConnectionType<D: Driver> {
    name: String,
    parent: Option<String>,
    handlers: ArcSwap<HandlerTable<D>>,
    installed: AtomicBool,
}

impl<D: Driver> ConnectionType<D> {
    /// Starts describing a connection type called `name`.
    pub fn builder(name: impl Into<String>) -> ConnectionTypeBuilder<D> {
        ConnectionTypeBuilder {
            name: name.into(),
            parent: None,
            table: HandlerTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the type this one was derived from.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Returns the current handler for `entry_point`.
    pub fn handler(&self, entry_point: EntryPoint) -> Option<Handler<D>> {
        self.handlers.load().get(entry_point).cloned()
    }

    /// Returns the entry points this type exposes.
    pub fn entry_points(&self) -> Vec<EntryPoint> {
        self.handlers.load().entry_points()
    }

    /// Returns whether insert interception has been installed.
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    /// Replaces the handler table with the result of `f`.
    ///
    /// `f` may run more than once if the table changes concurrently.
    pub(crate) fn update_handlers<F>(&self, mut f: F)
    where
        F: FnMut(&HandlerTable<D>) -> HandlerTable<D>,
    {
        self.handlers.rcu(|current| f(&**current));
    }

    pub(crate) fn mark_installed(&self) {
        self.installed.store(true, Ordering::Release);
    }
}

impl<D: Driver> fmt::Debug for ConnectionType<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionType")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("entry_points", &self.entry_points())
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Builder for [`ConnectionType`].
pub struct ConnectionTypeBuilder<D: Driver> {
    name: String,
    parent: Option<String>,
    table: HandlerTable<D>,
}

impl<D: Driver> ConnectionTypeBuilder<D> {
    /// Derives from `parent`, taking its current handlers.
    ///
    /// Handlers declared afterwards with [`handler`](Self::handler) override
    /// the inherited ones. Inherited handlers keep any interception the parent
    /// already carries.
    pub fn inherit(mut self, parent: &ConnectionType<D>) -> Self {
        self.parent = Some(parent.name.clone());
        self.table = (**parent.handlers.load()).clone();
        self
    }

    /// Declares the handler for `entry_point`.
    pub fn handler(mut self, entry_point: EntryPoint, handler: Handler<D>) -> Self {
        self.table.set(entry_point, handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the type. Public callers go through [`DriverCatalog::define`],
    /// which fires the definition hooks before handing the type out.
    ///
    /// [`DriverCatalog::define`]: super::DriverCatalog::define
    pub(crate) fn build(self) -> Arc<ConnectionType<D>> {
        Arc::new(ConnectionType {
            name: self.name,
            parent: self.parent,
            handlers: ArcSwap::from_pointee(self.table),
            installed: AtomicBool::new(false),
        })
    }
}
