//! SNMP-typed values, including the two wire-level sentinels.

use std::fmt;

use bytes::Bytes;

use crate::oid::Oid;

/// An SNMP value, or one of the two sentinels the protocol mixes into the
/// same channel as concrete values.
///
/// [`Value::NoSuchObject`] and [`Value::EndOfMibView`] are returned by a
/// [`Backend`](crate::backend::Backend) exactly as the wire protocol
/// represents them; the engine family is responsible for peeling them off
/// into `QueryFuture` failures at its boundary (see
/// [`crate::engine`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// INTEGER
    Integer(i32),
    /// OCTET STRING
    OctetString(Bytes),
    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),
    /// IpAddress (4 octets)
    IpAddress([u8; 4]),
    /// Counter32
    Counter32(u32),
    /// Counter64
    Counter64(u64),
    /// Gauge32
    Gauge32(u32),
    /// TimeTicks
    TimeTicks(u32),
    /// The NULL value.
    Null,
    /// Sentinel: the agent has no instance of this object at this OID.
    NoSuchObject,
    /// Sentinel: the agent has no instance of this object's conceptual row.
    NoSuchInstance,
    /// Sentinel: no OID strictly greater than the queried one exists.
    EndOfMibView,
}

impl Value {
    /// Whether this value is one of the protocol's exception sentinels
    /// rather than a concrete value.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "INTEGER: {n}"),
            Value::OctetString(b) => write!(f, "STRING: {b:?}"),
            Value::ObjectIdentifier(o) => write!(f, "OID: {o}"),
            Value::IpAddress(ip) => write!(f, "IpAddress: {}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]),
            Value::Counter32(n) => write!(f, "Counter32: {n}"),
            Value::Counter64(n) => write!(f, "Counter64: {n}"),
            Value::Gauge32(n) => write!(f, "Gauge32: {n}"),
            Value::TimeTicks(n) => write!(f, "Timeticks: ({n})"),
            Value::Null => write!(f, "NULL"),
            Value::NoSuchObject => write!(f, "No Such Object"),
            Value::NoSuchInstance => write!(f, "No Such Instance"),
            Value::EndOfMibView => write!(f, "End of MIB View"),
        }
    }
}
