//! The OID-interval object cache.
//!
//! Stores point bindings plus proven "successor of" intervals, so that a
//! `getnext` for any OID inside a previously-observed gap can be answered
//! without a network round-trip. Grounded on `nssct.cache.ObjectCache`.

use crate::oid::Oid;
use crate::value::Value;

/// Signals that the cache holds no information about the requested OID.
/// Strictly internal: never leaves the engine/cache boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotCached;

/// An assertion "the next OID strictly greater than `oid` is `next`, and the
/// open interval `(oid, next)` is known to be empty."
#[derive(Debug, Clone, PartialEq, Eq)]
struct NextEntry {
    oid: Oid,
    next: Oid,
}

/// Maps OIDs to values, and remembers proven successor pairs over
/// intervals.
#[derive(Debug, Default)]
pub struct ObjectCache {
    values: std::collections::HashMap<Oid, Value>,
    /// Strictly increasing by `oid`, pairwise-disjoint open intervals.
    nexts: Vec<NextEntry>,
    /// If set, no OID strictly greater than `last` exists in the MIB.
    last: Option<Oid>,
}

impl ObjectCache {
    /// A cache with no knowledge at all.
    pub fn new() -> Self {
        ObjectCache::default()
    }

    /// Index of the last entry with `entry.oid <= oid`, if any.
    fn floor_index(&self, oid: &Oid) -> Option<usize> {
        match self.nexts.binary_search_by(|e| e.oid.cmp(oid)) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        }
    }

    /// `get(o) -> Value | NotCached`.
    pub fn get(&self, oid: &Oid) -> Result<Value, NotCached> {
        if let Some(v) = self.values.get(oid) {
            return Ok(v.clone());
        }
        if let Some(i) = self.floor_index(oid) {
            let entry = &self.nexts[i];
            debug_assert!(&entry.oid <= oid);
            if oid < &entry.next && oid != &entry.oid {
                return Ok(Value::NoSuchObject);
            }
        }
        Err(NotCached)
    }

    /// The NextEntry covering `oid` from below (`entry.oid <= oid <
    /// entry.next`), if any, distinct from end-of-MIB handling.
    fn covering_index(&self, oid: &Oid) -> Option<usize> {
        let i = self.floor_index(oid)?;
        let entry = &self.nexts[i];
        if &entry.next > oid { Some(i) } else { None }
    }

    /// `getnext(o) -> (OID, Value) | NotCached`.
    pub fn getnext(&self, oid: &Oid) -> Result<(Oid, Value), NotCached> {
        if let Some(last) = &self.last
            && oid >= last {
                return Ok((oid.clone(), Value::EndOfMibView));
            }
        let i = self.covering_index(oid).ok_or(NotCached)?;
        let next = self.nexts[i].next.clone();
        let value = self.get(&next)?;
        Ok((next, value))
    }

    /// `set(o, v)`. Does not touch `nexts`.
    pub fn set(&mut self, oid: Oid, value: Value) {
        self.values.insert(oid, value);
    }

    /// `setNext(o, n)` with `o < n`: install "successor of `o` is `n`",
    /// preserving disjointness.
    pub fn set_next(&mut self, oid: Oid, next: Oid) {
        assert!(oid < next, "setNext requires oid < next");

        if let Some(last) = &self.last
            && *last < next {
                self.last = None;
            }

        // Remove entries whose low endpoint lies in [oid, next).
        let mut i = self
            .nexts
            .binary_search_by(|e| e.oid.cmp(&oid))
            .unwrap_or_else(|i| i);
        while i < self.nexts.len() && self.nexts[i].oid < next {
            debug_assert!(oid <= self.nexts[i].oid);
            self.nexts.remove(i);
        }

        // Scan backwards, removing entries whose high endpoint lies in (oid, next].
        if i > 0 {
            i -= 1;
        } else {
            // i == 0 means nothing was removed forward and there is nothing
            // before position 0 to scan; fall through with i treated as -1.
            self.insert_next(oid, next);
            return;
        }
        loop {
            let entry = &self.nexts[i];
            if entry.next <= oid {
                break;
            }
            debug_assert!(oid > entry.oid);
            if entry.next == next && entry.oid < oid {
                // Existing entry already covers the new interval.
                return;
            }
            self.nexts.remove(i);
            if i == 0 {
                break;
            }
            i -= 1;
        }

        self.insert_next(oid, next);
    }

    fn insert_next(&mut self, oid: Oid, next: Oid) {
        let pos = self
            .nexts
            .binary_search_by(|e| e.oid.cmp(&oid))
            .unwrap_or_else(|i| i);
        self.nexts.insert(pos, NextEntry { oid, next });
    }

    /// `setNextValue(o, n, v)`: `setNext(o, n)` then `set(n, v)`.
    pub fn set_next_value(&mut self, oid: Oid, next: Oid, value: Value) {
        self.set_next(oid, next.clone());
        self.set(next, value);
    }

    /// `setEnd(o)`: assert no OID strictly greater than `o` exists.
    pub fn set_end(&mut self, oid: Oid) {
        if let Some(last) = &self.last
            && *last <= oid {
                return;
            }
        while let Some(last_entry) = self.nexts.last() {
            if last_entry.next > oid {
                self.nexts.pop();
            } else {
                break;
            }
        }
        self.last = Some(oid);
    }

    /// Forget everything known about `oid`: its value and the NextEntry
    /// spanning it, if any. If `oid` lay beyond `last`, clear `last`.
    pub fn invalidate(&mut self, oid: &Oid) {
        self.values.remove(oid);
        if let Some(last) = &self.last
            && oid >= last {
                self.last = None;
                return;
            }
        if let Some(i) = self.covering_index(oid) {
            self.nexts.remove(i);
        }
    }

    /// Build a cache from an unordered stream of `(OID, Value)` pairs with
    /// distinct OIDs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Oid, Value)>) -> Self {
        let mut cache = ObjectCache::new();
        let mut pairs: Vec<_> = pairs.into_iter().collect();
        for (oid, value) in &pairs {
            cache.values.insert(oid.clone(), value.clone());
        }
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let mut last = Oid::root();
        for (oid, _) in &pairs {
            if last < *oid {
                cache.set_next(last.clone(), oid.clone());
            }
            last = oid.clone();
        }
        if let Some((max_oid, _)) = pairs.last() {
            cache.set_end(max_oid.clone());
        } else {
            cache.set_end(Oid::root());
        }
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn get_miss_is_not_cached() {
        let cache = ObjectCache::new();
        assert_eq!(cache.get(&oid!(1, 2)), Err(NotCached));
    }

    #[test]
    fn set_then_get() {
        let mut cache = ObjectCache::new();
        cache.set(oid!(1, 2), Value::Integer(5));
        assert_eq!(cache.get(&oid!(1, 2)), Ok(Value::Integer(5)));
    }

    #[test]
    fn set_next_answers_no_such_object_in_gap() {
        let mut cache = ObjectCache::new();
        cache.set_next_value(oid!(1, 1), oid!(1, 5), Value::Integer(9));
        assert_eq!(cache.get(&oid!(1, 3)), Ok(Value::NoSuchObject));
        assert_eq!(cache.get(&oid!(1, 5)), Ok(Value::Integer(9)));
        assert_eq!(cache.get(&oid!(1, 1)), Err(NotCached));
    }

    #[test]
    fn getnext_within_interval() {
        let mut cache = ObjectCache::new();
        cache.set_next_value(oid!(1, 1), oid!(1, 5), Value::Integer(9));
        assert_eq!(cache.getnext(&oid!(1, 2)), Ok((oid!(1, 5), Value::Integer(9))));
        assert_eq!(cache.getnext(&oid!(1, 1)), Ok((oid!(1, 5), Value::Integer(9))));
    }

    #[test]
    fn getnext_past_last_is_end_of_mib() {
        let mut cache = ObjectCache::new();
        cache.set_end(oid!(1, 5));
        assert_eq!(cache.getnext(&oid!(1, 5)), Ok((oid!(1, 5), Value::EndOfMibView)));
        assert_eq!(cache.getnext(&oid!(2, 0)), Ok((oid!(2, 0), Value::EndOfMibView)));
    }

    #[test]
    fn set_end_drops_overreaching_entries() {
        let mut cache = ObjectCache::new();
        cache.set_next(oid!(1, 1), oid!(1, 9));
        cache.set_end(oid!(1, 5));
        assert_eq!(cache.getnext(&oid!(1, 1)), Err(NotCached));
    }

    #[test]
    fn set_next_covered_by_existing_is_noop() {
        let mut cache = ObjectCache::new();
        cache.set_next_value(oid!(1, 0), oid!(1, 9), Value::Integer(9));
        // (1,3)-(1,9) is already covered by (1,0)-(1,9); the new, narrower
        // assertion must be discarded rather than shrinking the existing one.
        cache.set_next(oid!(1, 3), oid!(1, 9));
        assert_eq!(cache.getnext(&oid!(1, 0)), Ok((oid!(1, 9), Value::Integer(9))));
        // The narrower assertion must still answer from the wider interval.
        assert_eq!(cache.getnext(&oid!(1, 3)), Ok((oid!(1, 9), Value::Integer(9))));
    }

    #[test]
    fn invalidate_removes_value_and_interval() {
        let mut cache = ObjectCache::new();
        cache.set_next_value(oid!(1, 1), oid!(1, 5), Value::Integer(1));
        cache.invalidate(&oid!(1, 3));
        assert_eq!(cache.get(&oid!(1, 3)), Err(NotCached));
    }

    #[test]
    fn from_pairs_round_trips() {
        let cache = ObjectCache::from_pairs([
            (oid!(1, 1), Value::Integer(1)),
            (oid!(1, 2), Value::Integer(2)),
            (oid!(1, 3), Value::Integer(3)),
        ]);
        assert_eq!(cache.get(&oid!(1, 1)), Ok(Value::Integer(1)));
        assert_eq!(cache.getnext(&oid!(1, 1)), Ok((oid!(1, 2), Value::Integer(2))));
        assert_eq!(cache.getnext(&oid!(1, 2)), Ok((oid!(1, 3), Value::Integer(3))));
        assert_eq!(cache.getnext(&oid!(1, 3)), Ok((oid!(1, 3), Value::EndOfMibView)));
    }

    use proptest::prop_assert;

    proptest::proptest! {
        #[test]
        fn disjoint_intervals_after_random_ops(
            ops in proptest::collection::vec(
                (0u32..3, 0u32..6, 0u32..6),
                0..40,
            )
        ) {
            let mut cache = ObjectCache::new();
            for (kind, a, b) in ops {
                let (lo, hi) = if a < b { (a, b) } else { (b, a + 1) };
                match kind {
                    0 => cache.set_next(Oid::from_slice(&[lo]), Oid::from_slice(&[hi])),
                    1 => cache.set_end(Oid::from_slice(&[hi])),
                    _ => cache.invalidate(&Oid::from_slice(&[lo])),
                }
                // Invariant: strictly increasing by low endpoint, disjoint
                // open intervals.
                for w in cache.nexts.windows(2) {
                    prop_assert!(w[0].oid < w[1].oid);
                    prop_assert!(w[0].next <= w[1].oid);
                }
                if let Some(last) = &cache.last
                    && let Some(e) = cache.nexts.last()
                {
                    prop_assert!(e.next <= *last);
                }
            }
        }
    }
}
