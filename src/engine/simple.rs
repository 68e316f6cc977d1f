//! The thinnest engine: direct passthrough to the backend.

use super::Engine;
use crate::backend::Backend;
use crate::error::Error;
use crate::future::QueryFuture;
use crate::oid::Oid;
use crate::value::Value;

/// Issues every request synchronously against the backend, wraps the
/// result in an already-fulfilled Future, and translates sentinels into
/// terminal failures. Never defers any work; `step()` always returns
/// `false`. Grounded on `nssct.engine.SimpleEngine`.
pub struct SimpleEngine<B> {
    backend: B,
}

impl<B: Backend> SimpleEngine<B> {
    /// Wrap a backend directly.
    pub fn new(backend: B) -> Self {
        SimpleEngine { backend }
    }
}

impl<B: Backend> Engine for SimpleEngine<B> {
    fn get(&self, oid: Oid) -> QueryFuture<Value> {
        match self.backend.get(&oid) {
            Ok(Value::NoSuchObject | Value::NoSuchInstance) => {
                QueryFuture::failed(Error::NoSuchObject { oid })
            }
            Ok(Value::EndOfMibView) => QueryFuture::failed(Error::EndOfMib),
            Ok(v) => QueryFuture::ready(v),
            Err(e) => QueryFuture::failed(Error::Backend(e)),
        }
    }

    fn get_next(&self, oid: Oid) -> QueryFuture<(Oid, Value)> {
        match self.backend.getnext(&oid) {
            Ok((_, Value::EndOfMibView)) => QueryFuture::failed(Error::EndOfMib),
            Ok(pair) => QueryFuture::ready(pair),
            Err(e) => QueryFuture::failed(Error::Backend(e)),
        }
    }

    fn step(&self) -> bool {
        false
    }

    fn has_work(&self) -> bool {
        false
    }
}
