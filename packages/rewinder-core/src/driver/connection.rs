//! Connection handles.

use std::fmt;
use std::sync::Arc;

use super::{Args, ConnectionId, ConnectionType, Driver, EntryPoint};
use crate::error::RewindError;

/// One session to a backing data store.
///
/// Every write call is dispatched through the handler table of the
/// connection's type at call time, so interception installed on the type
/// applies to connections opened before and after installation alike.
pub struct Connection<D: Driver> {
    id: ConnectionId,
    connection_type: Arc<ConnectionType<D>>,
    driver: D,
}

impl<D: Driver> Connection<D> {
    /// Opens a connection of `connection_type` over `driver`.
    pub fn open(connection_type: &Arc<ConnectionType<D>>, driver: D) -> Self {
        Self {
            id: ConnectionId::next(),
            connection_type: Arc::clone(connection_type),
            driver,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn connection_type(&self) -> &Arc<ConnectionType<D>> {
        &self.connection_type
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Runs `sql` through the simple execute path.
    pub fn execute(&mut self, sql: &str, args: &Args) -> Result<D::Output, D::Error> {
        self.call(EntryPoint::Execute, sql, args)
    }

    /// Runs `sql` through the parameterized query path.
    pub fn exec_query(&mut self, sql: &str, args: &Args) -> Result<D::Output, D::Error> {
        self.call(EntryPoint::ExecQuery, sql, args)
    }

    /// Runs `sql` through the raw low-level execute path.
    pub fn raw_execute(&mut self, sql: &str, args: &Args) -> Result<D::Output, D::Error> {
        self.call(EntryPoint::RawExecute, sql, args)
    }

    /// Runs `sql` through `entry_point`.
    ///
    /// # Errors
    /// Whatever the handler returns, unchanged. An entry point the type does
    /// not expose yields [`RewindError::UnsupportedEntryPoint`] converted into
    /// the driver's error type.
    pub fn call(&mut self, entry_point: EntryPoint, sql: &str, args: &Args) -> Result<D::Output, D::Error> {
        let handler = self.connection_type.handler(entry_point).ok_or_else(|| {
            RewindError::UnsupportedEntryPoint {
                type_name: self.connection_type.name().to_string(),
                entry_point,
            }
        })?;
        handler.invoke(self, sql, args)
    }
}

impl<D: Driver + fmt::Debug> fmt::Debug for Connection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("connection_type", &self.connection_type.name())
            .field("driver", &self.driver)
            .finish()
    }
}
