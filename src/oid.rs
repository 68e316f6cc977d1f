//! Object identifiers: ordered sequences of non-negative integers naming a
//! variable in an SNMP agent's MIB.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::{Error, OidErrorKind};

/// An SNMP object identifier.
///
/// Comparison is lexicographic over the arc sequence, matching the ordering
/// the SNMP protocol itself imposes on OIDs (and therefore on GETNEXT
/// traversal order).
///
/// ```
/// use snmp_probe_core::oid;
///
/// let a = oid!(1, 3, 6, 1);
/// let b = oid!(1, 3, 6, 2);
/// assert!(a < b);
/// assert!(a.starts_with(&oid!(1, 3)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Oid(SmallVec<[u32; 16]>);

impl Oid {
    /// The empty OID, the lower bound of every non-empty OID.
    pub fn root() -> Self {
        Oid(SmallVec::new())
    }

    /// Build an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Oid(SmallVec::from_slice(arcs))
    }

    /// Parse a dotted OID string such as `.1.3.6.1` or `1.3.6.1`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.strip_prefix('.').unwrap_or(s);
        if s.is_empty() {
            return Ok(Oid::root());
        }
        let mut arcs = SmallVec::new();
        for part in s.split('.') {
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid(OidErrorKind::NotANumber, s))?;
            arcs.push(arc);
        }
        Ok(Oid(arcs))
    }

    /// The arcs making up this OID.
    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the empty (root) OID.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` is a prefix of `other`: `other[0..len(self)] == self`.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Append arcs, returning a new OID.
    pub fn extend(&self, arcs: &[u32]) -> Self {
        let mut v = self.0.clone();
        v.extend_from_slice(arcs);
        Oid(v)
    }

    /// The immediate lexicographic predecessor: decrement the last arc, or
    /// drop it if it is already zero. `prev(o) < o` for every non-empty `o`.
    ///
    /// # Panics
    ///
    /// Panics if called on the empty OID, which has no predecessor.
    pub fn prev(&self) -> Oid {
        let mut v = self.0.clone();
        match v.pop() {
            None => panic!("prev() called on the empty OID"),
            Some(0) => Oid(v),
            Some(last) => {
                v.push(last - 1);
                Oid(v)
            }
        }
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for arc in &self.0 {
            write!(f, ".{arc}")?;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Oid::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Oid::from_slice(arcs)
    }
}

impl From<Vec<u32>> for Oid {
    fn from(arcs: Vec<u32>) -> Self {
        Oid(SmallVec::from_vec(arcs))
    }
}

/// Construct an [`Oid`] from a literal arc list at the call site.
///
/// ```
/// use snmp_probe_core::oid;
/// assert_eq!(oid!(1, 3, 6).to_string(), ".1.3.6");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::Oid::from_slice(&[$($arc),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        assert!(oid!(1, 3, 6, 1) < oid!(1, 3, 6, 2));
        assert!(oid!(1, 3) < oid!(1, 3, 0));
        assert!(oid!(1, 2, 9) < oid!(1, 3));
    }

    #[test]
    fn prefix_check() {
        assert!(oid!(1, 3, 6, 1, 2).starts_with(&oid!(1, 3, 6)));
        assert!(!oid!(1, 3, 7).starts_with(&oid!(1, 3, 6)));
        assert!(oid!(1, 2).starts_with(&Oid::root()));
    }

    #[test]
    fn prev_decrements_last_arc() {
        assert_eq!(oid!(1, 2, 4).prev(), oid!(1, 2, 3));
    }

    #[test]
    fn prev_drops_zero_arc() {
        assert_eq!(oid!(1, 2, 0).prev(), oid!(1, 2));
    }

    #[test]
    #[should_panic]
    fn prev_of_root_panics() {
        Oid::root().prev();
    }

    #[test]
    fn prev_is_strictly_less() {
        for o in [oid!(1), oid!(1, 0), oid!(5, 5, 5), oid!(9, 0, 0, 0)] {
            assert!(o.prev() < o);
        }
    }

    #[test]
    fn parse_and_display_round_trip() {
        let o = Oid::parse(".1.3.6.1.2.1").unwrap();
        assert_eq!(o.to_string(), ".1.3.6.1.2.1");
        assert_eq!(Oid::parse("1.3.6.1.2.1").unwrap(), o);
    }

    #[test]
    fn parse_root() {
        assert_eq!(Oid::parse("").unwrap(), Oid::root());
        assert_eq!(Oid::parse(".").unwrap(), Oid::root());
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert!(Oid::parse(".1.x.3").is_err());
    }
}
