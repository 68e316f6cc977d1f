//! Batches pending requests into one GETBULK per [`Engine::step`].
//! Grounded on `nssct.engine.BulkEngine`.

use std::cell::RefCell;
use std::rc::Rc;

use super::Engine;
use crate::backend::Backend;
use crate::cache::ObjectCache;
use crate::error::{BackendError, Error};
use crate::future::QueryFuture;
use crate::oid::Oid;
use crate::value::Value;

/// Default cap on variable bindings requested per GETBULK, absent an
/// explicit override.
const DEFAULT_BULKMAX: usize = 64;

/// Coalesces outstanding requests into GETBULK calls.
///
/// GETs are turned into non-repeater rows via the `prev(oid)` trick:
/// GETBULK's non-repeaters behave like GETNEXT, so asking for the successor
/// of `prev(oid)` answers the point query `oid` while sharing the same wire
/// request as the repeaters. When a cache is attached, extra repeater rows
/// beyond the first (`lookahead`) are requested too and fed into the cache
/// for free, never exposed to callers directly.
pub struct BulkEngine<B> {
    backend: B,
    lookahead: usize,
    bulkmax: usize,
    cache: RefCell<Option<Rc<RefCell<ObjectCache>>>>,
    pending_get: RefCell<Vec<(Oid, QueryFuture<Value>)>>,
    #[allow(clippy::type_complexity)]
    pending_next: RefCell<Vec<(Oid, QueryFuture<(Oid, Value)>)>>,
}

impl<B: Backend> BulkEngine<B> {
    /// Wrap `backend`. `lookahead` is the number of *extra* successor rows
    /// requested per GETNEXT beyond the first, populating the cache for
    /// free; it has no effect unless a cache is attached.
    pub fn new(backend: B, lookahead: usize) -> Self {
        BulkEngine {
            backend,
            lookahead,
            bulkmax: DEFAULT_BULKMAX,
            cache: RefCell::new(None),
            pending_get: RefCell::new(Vec::new()),
            pending_next: RefCell::new(Vec::new()),
        }
    }

    /// Override the default cap (64) on variable bindings requested per
    /// GETBULK.
    pub fn with_bulkmax(mut self, bulkmax: usize) -> Self {
        self.bulkmax = bulkmax.max(1);
        self
    }

    fn effective_maxrep(&self) -> usize {
        if self.cache.borrow().is_some() {
            1 + self.lookahead
        } else {
            1
        }
    }

    fn record_cache(&self, oid: &Oid, next: &Oid, value: &Value) {
        if let Some(cache) = self.cache.borrow().as_ref() {
            cache
                .borrow_mut()
                .set_next_value(oid.clone(), next.clone(), value.clone());
        }
    }

    fn record_end(&self, oid: &Oid) {
        if let Some(cache) = self.cache.borrow().as_ref() {
            cache.borrow_mut().set_end(oid.clone());
        }
    }
}

impl<B: Backend> Engine for BulkEngine<B> {
    fn get(&self, oid: Oid) -> QueryFuture<Value> {
        let fut = QueryFuture::pending();
        self.pending_get.borrow_mut().push((oid, fut.clone()));
        fut
    }

    fn get_next(&self, oid: Oid) -> QueryFuture<(Oid, Value)> {
        let fut = QueryFuture::pending();
        self.pending_next.borrow_mut().push((oid, fut.clone()));
        fut
    }

    fn step(&self) -> bool {
        let mut gets = self.pending_get.borrow_mut();
        let mut nexts = self.pending_next.borrow_mut();

        if gets.is_empty() && nexts.is_empty() {
            return false;
        }

        // Fast path: a single GET with nothing else outstanding.
        if gets.len() == 1 && nexts.is_empty() {
            let (oid, fut) = gets.remove(0);
            match self.backend.get(&oid) {
                Ok(Value::NoSuchObject | Value::NoSuchInstance) => {
                    fut.set_failure(Error::NoSuchObject { oid });
                }
                Ok(value) => fut.set_result(value),
                Err(e) => fut.set_failure(Error::Backend(e)),
            }
            return !gets.is_empty() || !nexts.is_empty();
        }

        let effective_maxrep = self.effective_maxrep();

        // Fast path: a single GETNEXT with nothing to gain from batching.
        if effective_maxrep <= 1 && nexts.len() == 1 && gets.is_empty() {
            let (oid, fut) = nexts.remove(0);
            match self.backend.getnext(&oid) {
                Ok((roid, Value::EndOfMibView)) => {
                    self.record_end(&roid);
                    fut.set_failure(Error::EndOfMib);
                }
                Ok((roid, rval)) => {
                    self.record_cache(&oid, &roid, &rval);
                    fut.set_result((roid, rval));
                }
                Err(e) => fut.set_failure(Error::Backend(e)),
            }
            return !gets.is_empty() || !nexts.is_empty();
        }

        // Bulk path: fuse up to `bulkmax` outstanding requests into one
        // GETBULK, non-repeaters first.
        let take_gets = gets.len().min(self.bulkmax);
        let nonrep = take_gets;
        let take_nexts = nexts.len().min(self.bulkmax - nonrep);

        let mut oids: Vec<Oid> = Vec::with_capacity(nonrep + take_nexts);
        oids.extend(gets[..take_gets].iter().map(|(oid, _)| oid.prev()));
        oids.extend(nexts[..take_nexts].iter().map(|(oid, _)| oid.clone()));

        tracing::debug!(
            nonrep,
            repeaters = take_nexts,
            maxrep = effective_maxrep,
            "issuing getbulk"
        );
        match self.backend.getbulk(&oids, nonrep, effective_maxrep) {
            Err(e) => {
                tracing::warn!(error = %e, "getbulk failed, failing queries in this batch");
                for (_, fut) in gets.drain(..take_gets) {
                    fut.set_failure(Error::Backend(e.clone()));
                }
                for (_, fut) in nexts.drain(..take_nexts) {
                    fut.set_failure(Error::Backend(e.clone()));
                }
            }
            Ok(rows) => {
                let cap = nonrep + effective_maxrep * take_nexts;
                if rows.len() > cap {
                    tracing::warn!(got = rows.len(), cap, "getbulk returned more bindings than requested");
                    let err = Error::Backend(BackendError::new(
                        "backend returned more bindings than requested",
                    ));
                    for (_, fut) in gets.drain(..take_gets) {
                        fut.set_failure(err.clone());
                    }
                    for (_, fut) in nexts.drain(..take_nexts) {
                        fut.set_failure(err.clone());
                    }
                } else {
                    let mut row = 0;

                    // Phase a: non-repeater resolution. A short response
                    // leaves the un-answered tail queued for the next step.
                    let drained_gets: Vec<_> = gets.drain(..take_gets).collect();
                    for (oid, fut) in drained_gets {
                        match rows.get(row) {
                            None => gets.push((oid, fut)),
                            Some((roid, rval)) => {
                                row += 1;
                                if matches!(rval, Value::EndOfMibView) {
                                    self.record_end(roid);
                                    fut.set_failure(Error::EndOfMib);
                                } else if *roid > oid {
                                    self.record_cache(&oid.prev(), roid, rval);
                                    fut.set_failure(Error::NoSuchObject { oid });
                                } else if *roid == oid {
                                    self.record_cache(&oid.prev(), roid, rval);
                                    fut.set_result(rval.clone());
                                } else {
                                    fut.set_failure(Error::Backend(BackendError::new(format!(
                                        "getbulk returned {roid} strictly before queried {oid}"
                                    ))));
                                }
                            }
                        }
                    }

                    // Phase b: first repeater row per column, same
                    // short-response handling.
                    let drained_nexts: Vec<_> = nexts.drain(..take_nexts).collect();
                    let mut columns: Vec<Oid> = Vec::with_capacity(drained_nexts.len());
                    for (oid, fut) in drained_nexts {
                        match rows.get(row) {
                            None => nexts.push((oid, fut)),
                            Some((roid, rval)) => {
                                row += 1;
                                if matches!(rval, Value::EndOfMibView) {
                                    self.record_end(roid);
                                    fut.set_failure(Error::EndOfMib);
                                } else {
                                    self.record_cache(&oid, roid, rval);
                                    fut.set_result((roid.clone(), rval.clone()));
                                    columns.push(roid.clone());
                                }
                            }
                        }
                    }

                    // Phase c: extra lookahead rows populate the cache only,
                    // never answering a caller-visible Future.
                    while row < rows.len() && !columns.is_empty() {
                        let mut next_columns = Vec::with_capacity(columns.len());
                        for prev_oid in columns {
                            let Some((roid, rval)) = rows.get(row) else {
                                break;
                            };
                            row += 1;
                            if matches!(rval, Value::EndOfMibView) {
                                self.record_end(roid);
                            } else {
                                self.record_cache(&prev_oid, roid, rval);
                                next_columns.push(roid.clone());
                            }
                        }
                        columns = next_columns;
                    }
                }
            }
        }

        !gets.is_empty() || !nexts.is_empty()
    }

    fn has_work(&self) -> bool {
        !self.pending_get.borrow().is_empty() || !self.pending_next.borrow().is_empty()
    }

    fn attach_cache(&self, cache: Rc<RefCell<ObjectCache>>) {
        *self.cache.borrow_mut() = Some(cache);
    }
}
