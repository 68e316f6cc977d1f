//! The engine family: three interchangeable query engines sharing one
//! contract.

mod bulk;
mod caching;
mod simple;

pub use bulk::BulkEngine;
pub use caching::CachingEngine;
pub use simple::SimpleEngine;

use std::cell::RefCell;
use std::rc::Rc;

use crate::cache::ObjectCache;
use crate::future::QueryFuture;
use crate::oid::Oid;
use crate::value::Value;

/// The query-coalescing engine contract.
///
/// `get`/`get_next` each return an already-fulfilled or eventually-completed
/// [`QueryFuture`]; `step` drains outstanding work and reports whether any
/// of its own Futures are still pending.
pub trait Engine {
    /// Eventually yields the value bound to `oid`, or fails with
    /// [`crate::Error::NoSuchObject`]/[`crate::Error::EndOfMib`].
    fn get(&self, oid: Oid) -> QueryFuture<Value>;

    /// Eventually yields the next bound `(OID, Value)`, or fails with
    /// [`crate::Error::EndOfMib`].
    fn get_next(&self, oid: Oid) -> QueryFuture<(Oid, Value)>;

    /// Performs a bounded chunk of work. Returns `true` iff at least one
    /// Future this engine created is still pending.
    fn step(&self) -> bool;

    /// Whether this engine currently has any outstanding registered query,
    /// without performing any work. Unlike `step`'s return value, this can
    /// be checked again after new work was registered since the last
    /// `step()` call (e.g. a plugin resuming and issuing a follow-up
    /// query), which is what makes it suitable as a stall check.
    fn has_work(&self) -> bool;

    /// Opt in to opportunistic cache population: an inner engine
    /// (currently only [`BulkEngine`]) that is given a cache records extra
    /// successor facts it learns for free while resolving its own queue.
    fn attach_cache(&self, _cache: Rc<RefCell<ObjectCache>>) {}
}

#[cfg(test)]
mod equivalence_tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::oid;

    fn walk_text() -> &'static str {
        ".1.1 = INTEGER: 1\n.1.2 = INTEGER: 2\n.1.3 = INTEGER: 3\n"
    }

    fn run_to_completion<E: Engine + ?Sized>(engine: &E) {
        while engine.step() {}
    }

    /// For a backend that never raises `BackendError`, all four engine
    /// compositions agree on a plugin that only calls `get`/`get_next`.
    #[test]
    fn all_four_compositions_agree() {
        let point = oid!(1, 2);
        let successor_of = oid!(1, 1);
        let past_end = oid!(1, 3);

        let simple = SimpleEngine::new(MockBackend::from_text(walk_text()).unwrap());
        let cached_simple = CachingEngine::new(SimpleEngine::new(MockBackend::from_text(walk_text()).unwrap()));
        let bulk = BulkEngine::new(MockBackend::from_text(walk_text()).unwrap(), 4);
        let cached_bulk = CachingEngine::new(BulkEngine::new(MockBackend::from_text(walk_text()).unwrap(), 4));

        let simple_get = simple.get(point.clone());
        let simple_next = simple.get_next(successor_of.clone());
        let simple_end = simple.get_next(past_end.clone());
        run_to_completion(&simple);

        let cached_simple_get = cached_simple.get(point.clone());
        let cached_simple_next = cached_simple.get_next(successor_of.clone());
        let cached_simple_end = cached_simple.get_next(past_end.clone());
        run_to_completion(&cached_simple);

        let bulk_get = bulk.get(point.clone());
        let bulk_next = bulk.get_next(successor_of.clone());
        let bulk_end = bulk.get_next(past_end.clone());
        run_to_completion(&bulk);

        let cached_bulk_get = cached_bulk.get(point.clone());
        let cached_bulk_next = cached_bulk.get_next(successor_of.clone());
        let cached_bulk_end = cached_bulk.get_next(past_end.clone());
        run_to_completion(&cached_bulk);

        assert_eq!(simple_get.result(), cached_simple_get.result());
        assert_eq!(simple_get.result(), bulk_get.result());
        assert_eq!(simple_get.result(), cached_bulk_get.result());

        assert_eq!(simple_next.result(), cached_simple_next.result());
        assert_eq!(simple_next.result(), bulk_next.result());
        assert_eq!(simple_next.result(), cached_bulk_next.result());

        assert_eq!(simple_end.result(), cached_simple_end.result());
        assert_eq!(simple_end.result(), bulk_end.result());
        assert_eq!(simple_end.result(), cached_bulk_end.result());
    }
}
