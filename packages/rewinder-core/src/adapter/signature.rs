//! Forwarding wrappers matched to an entry point's call shape.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::classifier;
use crate::driver::{Call, CallShape, Connection, ConnectionId, Driver, Handler};
use crate::recorder::RecordingRegistry;

/// Classification and recording step run by every interceptor before it
/// delegates.
#[derive(Debug, Clone)]
pub struct StatementObserver {
    recorder: Arc<RecordingRegistry>,
    split_statements: bool,
}

impl StatementObserver {
    pub fn new(recorder: Arc<RecordingRegistry>, split_statements: bool) -> Self {
        Self {
            recorder,
            split_statements,
        }
    }

    pub fn recorder(&self) -> &Arc<RecordingRegistry> {
        &self.recorder
    }

    /// Records the insertion targets of `sql` against `connection`.
    pub fn observe(&self, connection: ConnectionId, sql: &str) {
        if self.split_statements {
            self.recorder.record_statement(connection, sql);
        } else if let Some(table) = classifier::classify(sql) {
            self.recorder.record(connection, &table);
        }
    }
}

/// Chooses and builds the interceptor for one entry point.
pub struct SignatureAdapter;

impl SignatureAdapter {
    /// Returns the call shape an interceptor for `handler` must accept.
    pub fn select<D: Driver>(handler: &Handler<D>) -> CallShape {
        handler.shape()
    }

    /// Builds an interceptor around `handler`.
    ///
    /// The shape is inspected once here; the returned handler forwards every
    /// argument, the result and any error of the original unchanged. Returns
    /// `None` when `handler` is already intercepted.
    pub fn wrap<D: Driver>(handler: &Handler<D>, observer: &StatementObserver) -> Option<Handler<D>> {
        if handler.is_intercepted() {
            return None;
        }

        let observer = observer.clone();
        let call = match handler.call() {
            Call::Positional(original) => {
                let original = Arc::clone(original);
                Call::Positional(Arc::new(
                    move |conn: &mut Connection<D>, sql: &str, binds: &[Value]| {
                        observer.observe(conn.id(), sql);
                        original(conn, sql, binds)
                    },
                ))
            }
            Call::Named(original) => {
                let original = Arc::clone(original);
                Call::Named(Arc::new(
                    move |conn: &mut Connection<D>,
                          sql: &str,
                          binds: &[Value],
                          named: &Map<String, Value>| {
                        observer.observe(conn.id(), sql);
                        original(conn, sql, binds, named)
                    },
                ))
            }
        };
        Some(Handler::intercepting(call))
    }
}
