//! Test driver families and fixtures.

use std::collections::HashSet;
use std::sync::Arc;

use rewinder_core::driver::{ConnectionTypeBuilder, Handler};
use rewinder_core::{
    AdapterRegistry, Connection, ConnectionType, Driver, DriverCatalog, EntryPoint,
    RecordingRegistry, RewindError, RewinderConfig,
};
use serde_json::{Map, Value};

/// A call as it reached the driver, after any interception.
#[derive(Debug, Clone, PartialEq)]
pub struct DelegatedCall {
    pub entry_point: EntryPoint,
    pub sql: String,
    pub binds: Vec<Value>,
    pub named: Option<Map<String, Value>>,
}

/// Driver-specific error, distinct from anything the core produces.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FakeDriverError {
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error(transparent)]
    Rewind(#[from] RewindError),
}

/// Per-connection driver state that logs every delegated call.
#[derive(Debug, Default)]
pub struct FakeDriver {
    pub calls: Vec<DelegatedCall>,
}

/// Result a driver hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeResult {
    pub call_number: usize,
    pub sql_len: usize,
}

impl Driver for FakeDriver {
    type Output = FakeResult;
    type Error = FakeDriverError;
}

fn respond(conn: &mut Connection<FakeDriver>, call: DelegatedCall) -> Result<FakeResult, FakeDriverError> {
    if call.sql.contains("VIOLATE") {
        return Err(FakeDriverError::Constraint(call.sql));
    }
    let sql_len = call.sql.len();
    conn.driver_mut().calls.push(call);
    Ok(FakeResult {
        call_number: conn.driver().calls.len(),
        sql_len,
    })
}

/// Handler using the legacy positional-only convention.
pub fn positional_handler(entry_point: EntryPoint) -> Handler<FakeDriver> {
    Handler::positional(move |conn: &mut Connection<FakeDriver>, sql: &str, binds: &[Value]| {
        respond(
            conn,
            DelegatedCall {
                entry_point,
                sql: sql.to_string(),
                binds: binds.to_vec(),
                named: None,
            },
        )
    })
}

/// Handler using the convention with named options.
pub fn named_handler(entry_point: EntryPoint) -> Handler<FakeDriver> {
    Handler::named(
        move |conn: &mut Connection<FakeDriver>, sql: &str, binds: &[Value], named: &Map<String, Value>| {
            respond(
                conn,
                DelegatedCall {
                    entry_point,
                    sql: sql.to_string(),
                    binds: binds.to_vec(),
                    named: Some(named.clone()),
                },
            )
        },
    )
}

/// Family exposing positional-only `execute` and `exec_query`.
pub fn legacy_family(name: &str) -> ConnectionTypeBuilder<FakeDriver> {
    ConnectionType::builder(name)
        .handler(EntryPoint::Execute, positional_handler(EntryPoint::Execute))
        .handler(EntryPoint::ExecQuery, positional_handler(EntryPoint::ExecQuery))
}

/// Family exposing all three entry points with named options.
pub fn modern_family(name: &str) -> ConnectionTypeBuilder<FakeDriver> {
    ConnectionType::builder(name)
        .handler(EntryPoint::Execute, named_handler(EntryPoint::Execute))
        .handler(EntryPoint::ExecQuery, named_handler(EntryPoint::ExecQuery))
        .handler(EntryPoint::RawExecute, named_handler(EntryPoint::RawExecute))
}

/// A private catalog with interception attached.
pub struct Harness {
    pub catalog: DriverCatalog,
    pub adapters: Arc<AdapterRegistry>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RewinderConfig::default())
    }

    pub fn with_config(config: RewinderConfig) -> Self {
        let catalog = DriverCatalog::new();
        let adapters = AdapterRegistry::new(Arc::new(RecordingRegistry::new()), config);
        adapters.attach(&catalog);
        Self { catalog, adapters }
    }

    pub fn recorder(&self) -> &Arc<RecordingRegistry> {
        self.adapters.recorder()
    }

    pub fn define(
        &self,
        builder: ConnectionTypeBuilder<FakeDriver>,
    ) -> Arc<ConnectionType<FakeDriver>> {
        self.catalog.define(builder).expect("type name is unique")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn tables(names: &[&str]) -> HashSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}
