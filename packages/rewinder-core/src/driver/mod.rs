//! Driver-facing surface: connection types, their write entry points, and
//! connection handles that dispatch through them.
//!
//! A [`Driver`] is the per-connection state of one database engine binding.
//! A [`ConnectionType`] describes a driver family at runtime: its name, an
//! optional parent it was derived from, and the [`Handler`] behind each
//! [`EntryPoint`] it exposes. [`Connection`] handles dispatch every write
//! call through the type's current handler table, which is where
//! interception is installed.

mod catalog;
mod connection;
mod connection_type;
mod handler;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RewindError;

pub use catalog::{DefinitionHook, DriverCatalog};
pub use connection::Connection;
pub use connection_type::{ConnectionType, ConnectionTypeBuilder, HandlerTable};
pub use handler::{Call, CallShape, Handler, NamedFn, PositionalFn};

/// Driver state behind one connection.
///
/// `Output` and `Error` are whatever the driver's entry points return; the
/// interception layer never inspects or converts them.
pub trait Driver: Send + 'static {
    /// Result of a successful write call
    type Output;
    /// Driver-specific failure; also carries driver-layer misuse such as an
    /// entry point the connection type does not expose
    type Error: From<RewindError>;
}

/// Stable identity of a connection for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(u64);

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

impl ConnectionId {
    /// Allocates a process-unique identifier.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Write-capable entry points a connection type may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    /// Simple execute path
    Execute,
    /// Parameterized query path
    ExecQuery,
    /// Low-level execute path that bypasses statement logging
    RawExecute,
}

impl EntryPoint {
    pub const COUNT: usize = 3;

    pub const ALL: [EntryPoint; Self::COUNT] =
        [EntryPoint::Execute, EntryPoint::ExecQuery, EntryPoint::RawExecute];

    pub(crate) fn index(self) -> usize {
        match self {
            EntryPoint::Execute => 0,
            EntryPoint::ExecQuery => 1,
            EntryPoint::RawExecute => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryPoint::Execute => "execute",
            EntryPoint::ExecQuery => "exec_query",
            EntryPoint::RawExecute => "raw_execute",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values bound to a statement: positional binds plus named options.
///
/// Passed through interception untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Args {
    pub positional: Vec<Value>,
    pub named: Map<String, Value>,
}

impl Args {
    /// Creates empty arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional bind.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named option.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn has_named(&self) -> bool {
        !self.named.is_empty()
    }
}

impl From<Vec<Value>> for Args {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: Map::new(),
        }
    }
}
