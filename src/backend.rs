//! The synchronous backend contract the engine family is built over.
//!
//! The wire-level SNMPv2c client itself is out of scope for this crate:
//! callers plug in any type implementing [`Backend`]. This
//! module ships one concrete, in-scope implementation,
//! [`mock::MockBackend`], built from the offline walk-text format, because
//! the core's own tests depend on it.

pub mod mock;

use crate::error::BackendError;
use crate::oid::Oid;
use crate::value::Value;

/// A synchronous SNMP agent surface: `get`/`getnext`/`getbulk`, blocking.
///
/// Only one outstanding backend call exists at a time; the
/// engine family never calls a `Backend` from more than one logical place
/// concurrently.
pub trait Backend {
    /// Point query. Returns a concrete value or one of the sentinels
    /// (`Value::NoSuchObject`); never raises for an unbound OID.
    fn get(&self, oid: &Oid) -> Result<Value, BackendError>;

    /// Successor query. Returns `(oid, Value::EndOfMibView)` style
    /// sentinel through the returned OID/value pair when no successor
    /// exists — concretely, implementations return the queried OID paired
    /// with `Value::EndOfMibView`.
    fn getnext(&self, oid: &Oid) -> Result<(Oid, Value), BackendError>;

    /// Batched successor query: `nonrep` of `oids` are queried as
    /// non-repeaters (one row each), the remainder as repeaters (up to
    /// `maxrep` rows each). Returns a flat sequence of bindings; may return
    /// fewer than requested (short response) but never more than
    /// `nonrep + maxrep * (oids.len() - nonrep)`.
    ///
    /// The default implementation emulates GETBULK via repeated `getnext`
    /// calls, mirroring `nssct.backend.BackendBase.getbulk`.
    fn getbulk(
        &self,
        oids: &[Oid],
        nonrep: usize,
        maxrep: usize,
    ) -> Result<Vec<(Oid, Value)>, BackendError> {
        let mut out = Vec::new();
        for oid in &oids[..nonrep] {
            let (roid, rval) = self.getnext(oid)?;
            out.push((roid, rval));
        }
        let mut current: Vec<Oid> = oids[nonrep..].to_vec();
        for _ in 0..maxrep {
            if current.is_empty() {
                break;
            }
            let mut next_round = Vec::with_capacity(current.len());
            for oid in &current {
                let (roid, rval) = self.getnext(oid)?;
                let done = matches!(rval, Value::EndOfMibView);
                out.push((roid.clone(), rval));
                if !done {
                    next_round.push(roid);
                }
            }
            current = next_round;
        }
        Ok(out)
    }
}
