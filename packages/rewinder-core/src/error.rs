//! Driver-layer error types.

use thiserror::Error;

use crate::driver::EntryPoint;

/// Errors raised by the driver layer around interception.
///
/// Classification and recording never fail; these cover misuse of the
/// connection-type surface only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewindError {
    /// Entry point not exposed by the connection type
    #[error("Connection type '{type_name}' does not expose '{entry_point}'")]
    UnsupportedEntryPoint {
        type_name: String,
        entry_point: EntryPoint,
    },

    /// Connection type name already defined in the catalog
    #[error("Connection type '{name}' already defined")]
    TypeAlreadyDefined { name: String },
}
