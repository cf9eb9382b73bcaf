//! Installation of insert interception on connection types.

mod registry;
mod signature;

pub use registry::AdapterRegistry;
pub use signature::{SignatureAdapter, StatementObserver};

use crate::driver::{ConnectionType, Driver, EntryPoint};

/// A connection type that interception can be installed on, with its driver
/// type erased.
pub trait InstallTarget: Send + Sync {
    fn type_name(&self) -> &str;

    fn parent_name(&self) -> Option<&str>;

    /// Entry points the type currently exposes.
    fn exposed_entry_points(&self) -> Vec<EntryPoint>;

    /// Wraps each of `entry_points` the type exposes and that is not already
    /// intercepted. Returns how many handlers were wrapped.
    fn install(&self, observer: &StatementObserver, entry_points: &[EntryPoint]) -> usize;

    fn is_installed(&self) -> bool;
}

impl<D: Driver> InstallTarget for ConnectionType<D> {
    fn type_name(&self) -> &str {
        self.name()
    }

    fn parent_name(&self) -> Option<&str> {
        self.parent()
    }

    fn exposed_entry_points(&self) -> Vec<EntryPoint> {
        self.entry_points()
    }

    fn install(&self, observer: &StatementObserver, entry_points: &[EntryPoint]) -> usize {
        let mut wrapped = 0;
        self.update_handlers(|current| {
            wrapped = 0;
            let mut next = current.clone();
            for &entry_point in entry_points {
                let Some(handler) = current.get(entry_point) else {
                    continue;
                };
                if let Some(interceptor) = SignatureAdapter::wrap(handler, observer) {
                    next.set(entry_point, interceptor);
                    wrapped += 1;
                }
            }
            next
        });
        self.mark_installed();
        wrapped
    }

    fn is_installed(&self) -> bool {
        ConnectionType::is_installed(self)
    }
}
