//! Entry-point handlers and their call shapes.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Args, Connection, Driver};

/// Handler accepting positional binds only.
pub type PositionalFn<D> = dyn Fn(&mut Connection<D>, &str, &[Value]) -> Result<<D as Driver>::Output, <D as Driver>::Error>
    + Send
    + Sync;

/// Handler accepting positional binds and named options.
pub type NamedFn<D> = dyn Fn(
        &mut Connection<D>,
        &str,
        &[Value],
        &Map<String, Value>,
    ) -> Result<<D as Driver>::Output, <D as Driver>::Error>
    + Send
    + Sync;

/// Declared parameter shape of an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallShape {
    /// `(sql, positional...)`
    Positional,
    /// `(sql, positional..., named...)`
    Named,
}

/// Callable behind an entry point, tagged by its call shape.
pub enum Call<D: Driver> {
    Positional(Arc<PositionalFn<D>>),
    Named(Arc<NamedFn<D>>),
}

impl<D: Driver> Clone for Call<D> {
    fn clone(&self) -> Self {
        match self {
            Call::Positional(f) => Call::Positional(Arc::clone(f)),
            Call::Named(f) => Call::Named(Arc::clone(f)),
        }
    }
}

/// One entry point implementation of a connection type.
pub struct Handler<D: Driver> {
    call: Call<D>,
    intercepted: bool,
}

impl<D: Driver> Handler<D> {
    /// Creates a handler taking positional binds only.
    pub fn positional<F>(f: F) -> Self
    where
        F: Fn(&mut Connection<D>, &str, &[Value]) -> Result<D::Output, D::Error>
            + Send
            + Sync
            + 'static,
    {
        Self {
            call: Call::Positional(Arc::new(f)),
            intercepted: false,
        }
    }

    /// Creates a handler taking positional binds and named options.
    pub fn named<F>(f: F) -> Self
    where
        F: Fn(&mut Connection<D>, &str, &[Value], &Map<String, Value>) -> Result<D::Output, D::Error>
            + Send
            + Sync
            + 'static,
    {
        Self {
            call: Call::Named(Arc::new(f)),
            intercepted: false,
        }
    }

    /// Creates a handler already carrying insert interception.
    pub(crate) fn intercepting(call: Call<D>) -> Self {
        Self {
            call,
            intercepted: true,
        }
    }

    pub fn call(&self) -> &Call<D> {
        &self.call
    }

    pub fn shape(&self) -> CallShape {
        match self.call {
            Call::Positional(_) => CallShape::Positional,
            Call::Named(_) => CallShape::Named,
        }
    }

    /// Returns whether this handler already records insertions.
    pub fn is_intercepted(&self) -> bool {
        self.intercepted
    }

    /// Invokes the handler.
    ///
    /// A positional-only handler called with named options receives them as
    /// one trailing object bind, so nothing the caller passed is dropped.
    pub fn invoke(&self, conn: &mut Connection<D>, sql: &str, args: &Args) -> Result<D::Output, D::Error> {
        match &self.call {
            Call::Positional(f) if args.named.is_empty() => f(conn, sql, args.positional.as_slice()),
            Call::Positional(f) => {
                let mut binds = Vec::with_capacity(args.positional.len() + 1);
                binds.extend_from_slice(&args.positional);
                binds.push(Value::Object(args.named.clone()));
                f(conn, sql, binds.as_slice())
            }
            Call::Named(f) => f(conn, sql, args.positional.as_slice(), &args.named),
        }
    }
}

impl<D: Driver> Clone for Handler<D> {
    fn clone(&self) -> Self {
        Self {
            call: self.call.clone(),
            intercepted: self.intercepted,
        }
    }
}

impl<D: Driver> fmt::Debug for Handler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("shape", &self.shape())
            .field("intercepted", &self.intercepted)
            .finish()
    }
}
