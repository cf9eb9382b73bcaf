//! Per-connection bookkeeping of tables that received insertions.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::classifier;
use crate::driver::ConnectionId;

static GLOBAL: OnceLock<Arc<RecordingRegistry>> = OnceLock::new();

/// Deduplicated set of tables dirtied by one connection.
///
/// Grows monotonically until the reset collaborator clears it.
#[derive(Debug, Default, Clone)]
pub struct TableRecorder {
    tables: HashSet<String>,
}

impl TableRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `table` unless it is already present.
    ///
    /// Only allocates the first time a name is seen.
    pub fn record(&mut self, table: &str) {
        if !self.tables.contains(table) {
            self.tables.insert(table.to_owned());
        }
    }

    /// Returns whether `table` has been recorded.
    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// Returns the recorded tables.
    pub fn tables(&self) -> &HashSet<String> {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Process-wide map from connection identity to its [`TableRecorder`].
///
/// Entries are created on the first recorded insertion of a connection and
/// live until [`clear`](Self::clear) or [`clear_all`](Self::clear_all); they
/// are not tied to the connection being dropped. The map is sharded, so
/// connections on different threads record without contending on one lock,
/// and first-use creation of an entry is race-free.
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    recorders: DashMap<ConnectionId, TableRecorder>,
}

impl RecordingRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            recorders: DashMap::new(),
        }
    }

    /// Returns the process-wide registry, creating it on first access.
    pub fn global() -> &'static Arc<RecordingRegistry> {
        GLOBAL.get_or_init(|| Arc::new(RecordingRegistry::new()))
    }

    /// Records `table` as dirtied by `connection`.
    ///
    /// Idempotent; creates the connection's set on first use.
    pub fn record(&self, connection: ConnectionId, table: &str) {
        tracing::trace!(%connection, table, "recording inserted table");
        self.recorders.entry(connection).or_default().record(table);
    }

    /// Classifies `sql` and records every insertion target it contains.
    ///
    /// `sql` may be a `;`-separated batch. Statements that are not
    /// insertions, or whose target cannot be resolved, are ignored.
    pub fn record_statement(&self, connection: ConnectionId, sql: &str) {
        for table in classifier::inserted_tables(sql) {
            self.record(connection, &table);
        }
    }

    /// Returns a copy of the tables recorded for `connection`.
    ///
    /// Empty when nothing has been recorded.
    pub fn snapshot(&self, connection: ConnectionId) -> HashSet<String> {
        self.recorders
            .get(&connection)
            .map(|recorder| recorder.tables().clone())
            .unwrap_or_default()
    }

    /// Returns whether `connection` has recorded `table`.
    pub fn contains(&self, connection: ConnectionId, table: &str) -> bool {
        self.recorders
            .get(&connection)
            .is_some_and(|recorder| recorder.contains(table))
    }

    /// Returns the connections that currently have recorded tables.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.recorders.iter().map(|entry| *entry.key()).collect()
    }

    /// Drops everything recorded for `connection`.
    pub fn clear(&self, connection: ConnectionId) {
        if self.recorders.remove(&connection).is_some() {
            tracing::debug!(%connection, "cleared recorded tables");
        }
    }

    /// Drops everything recorded for every connection.
    pub fn clear_all(&self) {
        tracing::debug!(connections = self.recorders.len(), "clearing all recorded tables");
        self.recorders.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.recorders.is_empty()
    }
}
