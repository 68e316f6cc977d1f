//! Error types for the probe core.
//!
//! A narrow leaf `*ErrorKind` enum with a hand-written `Display`, wrapped
//! by one umbrella, `#[non_exhaustive]` `thiserror::Error` enum with
//! constructor helpers.

/// Result type alias using this crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// OID parse error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// A dotted component was not a valid non-negative integer.
    NotANumber,
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber => write!(f, "component is not a non-negative integer"),
        }
    }
}

/// Walk-text parse error kinds, produced by [`crate::backend::mock::parse_snmpwalk_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkParseErrorKind {
    /// The line is not of the form `<oid> = <value>`.
    NotAnAssignment,
    /// The value carries a `kind: value` tag this parser does not recognize.
    UnknownType(String),
    /// The value has no type tag and is not the empty-string literal `""`.
    UnknownSpecialValue(String),
    /// A typed value's payload failed to parse (e.g. a non-numeric INTEGER).
    MalformedValue(String),
}

impl std::fmt::Display for WalkParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnAssignment => write!(f, "line is not an OID assignment"),
            Self::UnknownType(kind) => write!(f, "unknown type tag: {kind}"),
            Self::UnknownSpecialValue(v) => write!(f, "unknown special value: {v}"),
            Self::MalformedValue(v) => write!(f, "malformed value: {v}"),
        }
    }
}

/// A backend (transport/protocol) failure, raised by a
/// [`Backend`](crate::backend::Backend) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    /// Construct a backend error carrying a diagnostic message.
    pub fn new(message: impl Into<String>) -> Self {
        BackendError {
            message: message.into(),
        }
    }
}

/// The umbrella error type for this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The agent reports no instance bound at the queried OID.
    ///
    /// Per the engine's sentinel-to-failure policy, this always travels as
    /// a failed `QueryFuture`, never as a success-channel value.
    #[error("no such object: {oid}")]
    NoSuchObject {
        /// The OID that turned out to be unbound.
        oid: crate::Oid,
    },

    /// No OID strictly greater than the queried one exists in the agent's
    /// MIB.
    #[error("end of MIB view")]
    EndOfMib,

    /// The backend failed to complete the request.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// An OID string failed to parse.
    #[error("invalid oid {input:?}: {kind}")]
    InvalidOid {
        /// What about the input was invalid.
        kind: OidErrorKind,
        /// The offending input.
        input: String,
    },

    /// A walk-text line failed to parse.
    #[error("walk-text parse error at line {line}: {kind}")]
    WalkParse {
        /// 1-based line number within the source.
        line: usize,
        /// What went wrong.
        kind: WalkParseErrorKind,
    },
}

impl Error {
    /// Build an [`Error::InvalidOid`].
    pub fn invalid_oid(kind: OidErrorKind, input: impl Into<String>) -> Self {
        Error::InvalidOid {
            kind,
            input: input.into(),
        }
    }

    /// Build an [`Error::WalkParse`].
    pub fn walk_parse(line: usize, kind: WalkParseErrorKind) -> Self {
        Error::WalkParse { line, kind }
    }

    /// Whether this error represents a normal control-flow outcome
    /// (`NoSuchObject`/`EndOfMib`) that a plugin may reasonably catch and
    /// adapt to, as opposed to an unexpected backend/parse failure.
    pub fn is_control_flow(&self) -> bool {
        matches!(self, Error::NoSuchObject { .. } | Error::EndOfMib)
    }
}
