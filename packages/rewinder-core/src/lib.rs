//! Insert interception and per-connection table recording.
//!
//! Wraps the write entry points of every connection type defined in a
//! [`DriverCatalog`](driver::DriverCatalog), classifies each statement, and
//! records the tables that received insertions so an external reset routine
//! can truncate exactly those tables between test cases.

pub mod adapter;
pub mod classifier;
pub mod config;
pub mod driver;
pub mod error;
pub mod recorder;

use std::sync::{Arc, OnceLock};

pub use adapter::AdapterRegistry;
pub use config::RewinderConfig;
pub use driver::{Args, Connection, ConnectionId, ConnectionType, Driver, DriverCatalog, EntryPoint};
pub use error::RewindError;
pub use recorder::{RecordingRegistry, TableRecorder};

static GLOBAL_ADAPTERS: OnceLock<Arc<AdapterRegistry>> = OnceLock::new();

/// Attaches the process-wide adapter registry to the global catalog.
///
/// Installs interception on every connection type already defined in
/// [`DriverCatalog::global`] and on every type defined afterward, recording
/// into [`RecordingRegistry::global`]. Calling it again returns the same
/// registry without reinstalling.
pub fn init() -> &'static Arc<AdapterRegistry> {
    GLOBAL_ADAPTERS.get_or_init(|| {
        let adapters = AdapterRegistry::new(
            Arc::clone(RecordingRegistry::global()),
            RewinderConfig::default(),
        );
        adapters.attach(DriverCatalog::global());
        adapters
    })
}
