//! Coalescing wrapper: caches bindings and collapses concurrent identical
//! requests into a single call to an inner engine. Grounded on
//! `nssct.engine.CachingEngine`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::Engine;
use crate::cache::ObjectCache;
use crate::future::QueryFuture;
use crate::oid::Oid;
use crate::value::Value;

struct Shared<E> {
    inner: E,
    cache: Rc<RefCell<ObjectCache>>,
    pending_get: RefCell<HashMap<Oid, QueryFuture<Value>>>,
    pending_next: RefCell<HashMap<Oid, QueryFuture<(Oid, Value)>>>,
}

/// Wraps any [`Engine`] with an [`ObjectCache`], so repeated or concurrent
/// requests for the same OID share one inner query.
pub struct CachingEngine<E> {
    shared: Rc<Shared<E>>,
}

impl<E> Clone for CachingEngine<E> {
    fn clone(&self) -> Self {
        CachingEngine {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<E: Engine> CachingEngine<E> {
    /// Wrap `inner`, handing it a fresh cache it may also populate
    /// opportunistically (see [`Engine::attach_cache`]).
    pub fn new(inner: E) -> Self {
        let cache = Rc::new(RefCell::new(ObjectCache::new()));
        inner.attach_cache(Rc::clone(&cache));
        CachingEngine {
            shared: Rc::new(Shared {
                inner,
                cache,
                pending_get: RefCell::new(HashMap::new()),
                pending_next: RefCell::new(HashMap::new()),
            }),
        }
    }
}

impl<E: Engine + 'static> Engine for CachingEngine<E> {
    fn get(&self, oid: Oid) -> QueryFuture<Value> {
        if let Ok(value) = self.shared.cache.borrow().get(&oid) {
            return match value {
                Value::NoSuchObject | Value::NoSuchInstance => {
                    QueryFuture::failed(crate::error::Error::NoSuchObject { oid })
                }
                value => QueryFuture::ready(value),
            };
        }
        if let Some(existing) = self.shared.pending_get.borrow().get(&oid) {
            return existing.clone();
        }

        let out: QueryFuture<Value> = QueryFuture::pending();
        self.shared
            .pending_get
            .borrow_mut()
            .insert(oid.clone(), out.clone());

        let shared = Rc::clone(&self.shared);
        let key = oid.clone();
        let out_for_callback = out.clone();
        let inner_fut = self.shared.inner.get(oid);
        inner_fut.on_done(move |result| {
            shared.pending_get.borrow_mut().remove(&key);
            if let Ok(value) = result {
                shared.cache.borrow_mut().set(key.clone(), value.clone());
            }
            match result {
                Ok(v) => out_for_callback.set_result(v.clone()),
                Err(e) => out_for_callback.set_failure(e.clone()),
            }
        });
        out
    }

    fn get_next(&self, oid: Oid) -> QueryFuture<(Oid, Value)> {
        if let Ok(pair) = self.shared.cache.borrow().getnext(&oid) {
            return match pair {
                (_, Value::EndOfMibView) => QueryFuture::failed(crate::error::Error::EndOfMib),
                pair => QueryFuture::ready(pair),
            };
        }
        if let Some(existing) = self.shared.pending_next.borrow().get(&oid) {
            return existing.clone();
        }

        let out: QueryFuture<(Oid, Value)> = QueryFuture::pending();
        self.shared
            .pending_next
            .borrow_mut()
            .insert(oid.clone(), out.clone());

        let shared = Rc::clone(&self.shared);
        let key = oid.clone();
        let out_for_callback = out.clone();
        let inner_fut = self.shared.inner.get_next(oid);
        inner_fut.on_done(move |result| {
            shared.pending_next.borrow_mut().remove(&key);
            if let Ok((roid, rval)) = result {
                shared
                    .cache
                    .borrow_mut()
                    .set_next_value(key.clone(), roid.clone(), rval.clone());
            }
            match result {
                Ok(pair) => out_for_callback.set_result(pair.clone()),
                Err(e) => out_for_callback.set_failure(e.clone()),
            }
        });
        out
    }

    fn step(&self) -> bool {
        let has_pending = !self.shared.pending_get.borrow().is_empty()
            || !self.shared.pending_next.borrow().is_empty();
        self.shared.inner.step() || has_pending
    }

    fn has_work(&self) -> bool {
        !self.shared.pending_get.borrow().is_empty()
            || !self.shared.pending_next.borrow().is_empty()
            || self.shared.inner.has_work()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::engine::SimpleEngine;
    use crate::error::Error;
    use crate::oid;

    fn backend() -> MockBackend {
        MockBackend::from_text(".1.1 = INTEGER: 1\n.1.2 = INTEGER: 2\n.1.3 = INTEGER: 3\n").unwrap()
    }

    #[test]
    fn get_is_served_from_cache_on_second_call() {
        let engine = CachingEngine::new(SimpleEngine::new(backend()));
        let first = engine.get(oid!(1, 1));
        assert_eq!(first.result(), Some(Ok(Value::Integer(1))));
        let second = engine.get(oid!(1, 1));
        assert!(second.is_done());
        assert_eq!(second.result(), Some(Ok(Value::Integer(1))));
    }

    #[test]
    fn concurrent_identical_gets_share_one_future() {
        let engine = CachingEngine::new(SimpleEngine::new(backend()));
        let a = engine.get(oid!(1, 2));
        let b = engine.get(oid!(1, 2));
        assert_eq!(a.result(), b.result());
    }

    /// An inner [`Engine`] that records how many times `get`/`get_next` are
    /// called, so coalescing can be checked by call count rather than by
    /// result equality alone.
    struct CountingEngine<E> {
        inner: E,
        gets: std::cell::Cell<usize>,
    }

    impl<E: Engine> Engine for CountingEngine<E> {
        fn get(&self, oid: Oid) -> QueryFuture<Value> {
            self.gets.set(self.gets.get() + 1);
            self.inner.get(oid)
        }
        fn get_next(&self, oid: Oid) -> QueryFuture<(Oid, Value)> {
            self.inner.get_next(oid)
        }
        fn step(&self) -> bool {
            self.inner.step()
        }
        fn has_work(&self) -> bool {
            self.inner.has_work()
        }
        fn attach_cache(&self, cache: Rc<RefCell<ObjectCache>>) {
            self.inner.attach_cache(cache);
        }
    }

    #[test]
    fn two_concurrent_gets_reach_the_inner_engine_exactly_once() {
        let counting = CountingEngine {
            inner: SimpleEngine::new(backend()),
            gets: std::cell::Cell::new(0),
        };
        let engine = CachingEngine::new(counting);
        let a = engine.get(oid!(1, 2));
        let b = engine.get(oid!(1, 2));
        assert_eq!(engine.shared.inner.gets.get(), 1);
        assert_eq!(a.result(), Some(Ok(Value::Integer(2))));
        assert_eq!(b.result(), Some(Ok(Value::Integer(2))));
    }

    #[test]
    fn get_next_populates_interval_cache() {
        let engine = CachingEngine::new(SimpleEngine::new(backend()));
        let first = engine.get_next(oid!(1, 1));
        assert_eq!(first.result(), Some(Ok((oid!(1, 2), Value::Integer(2)))));
        // A point lookup strictly between 1.1 and 1.2 is now known absent.
        let miss = engine.get(oid!(1, 1, 5));
        assert_eq!(miss.result(), Some(Err(Error::NoSuchObject { oid: oid!(1, 1, 5) })));
    }

    #[test]
    fn step_delegates_and_reports_own_pending_state() {
        let engine = CachingEngine::new(SimpleEngine::new(backend()));
        assert!(!engine.step());
    }
}
