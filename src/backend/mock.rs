//! Offline replay: parses the walk-text format and answers queries from an
//! [`ObjectCache`] built from it. Grounded on `nssct.backend.mock`.

use std::io::BufRead;

use bytes::Bytes;

use super::Backend;
use crate::cache::{NotCached, ObjectCache};
use crate::error::{BackendError, Error, WalkParseErrorKind};
use crate::oid::Oid;
use crate::value::Value;

fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn parse_integer_like(s: &str) -> Option<u64> {
    first_digit_run(s)?.parse().ok()
}

fn parse_timeticks(s: &str) -> Option<u32> {
    let open = s.find('(')?;
    let close = s[open..].find(')')? + open;
    s[open + 1..close].trim().parse().ok()
}

fn parse_hexstring(s: &str) -> Option<Bytes> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if !cleaned.len().is_multiple_of(2) {
        return None;
    }
    let mut bytes = Vec::with_capacity(cleaned.len() / 2);
    for i in (0..cleaned.len()).step_by(2) {
        bytes.push(u8::from_str_radix(&cleaned[i..i + 2], 16).ok()?);
    }
    Some(Bytes::from(bytes))
}

fn parse_ip_address(s: &str) -> Option<[u8; 4]> {
    let parts: Vec<&str> = s.trim().split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    let mut out = [0u8; 4];
    for (i, p) in parts.iter().enumerate() {
        out[i] = p.parse().ok()?;
    }
    Some(out)
}

/// Parse one line of the walk-text format:
/// `<dotted-oid> = <TYPE>: <value>` or `<dotted-oid> = ""`.
pub fn parse_snmpwalk_line(line: &str, line_no: usize) -> Result<(Oid, Value), Error> {
    let line = line.trim();
    let eq = line
        .find('=')
        .ok_or_else(|| Error::walk_parse(line_no, WalkParseErrorKind::NotAnAssignment))?;
    let oid_str = line[..eq].trim();
    let value_str = line[eq + 1..].trim();

    let oid = Oid::parse(oid_str)
        .map_err(|_| Error::walk_parse(line_no, WalkParseErrorKind::NotAnAssignment))?;

    if value_str == "\"\"" {
        return Ok((oid, Value::OctetString(Bytes::new())));
    }

    let Some(colon) = value_str.find(':') else {
        return Err(Error::walk_parse(
            line_no,
            WalkParseErrorKind::UnknownSpecialValue(value_str.to_string()),
        ));
    };
    let kind = value_str[..colon].trim();
    let payload = value_str[colon + 1..].trim();

    let malformed = || Error::walk_parse(line_no, WalkParseErrorKind::MalformedValue(payload.to_string()));

    let value = match kind {
        "Counter32" => Value::Counter32(parse_integer_like(payload).ok_or_else(malformed)? as u32),
        "Counter64" => Value::Counter64(parse_integer_like(payload).ok_or_else(malformed)?),
        "Gauge32" => Value::Gauge32(parse_integer_like(payload).ok_or_else(malformed)? as u32),
        "Hex-STRING" => Value::OctetString(parse_hexstring(payload).ok_or_else(malformed)?),
        "INTEGER" => Value::Integer(parse_integer_like(payload).ok_or_else(malformed)? as i32),
        "IpAddress" => Value::IpAddress(parse_ip_address(payload).ok_or_else(malformed)?),
        "OID" => Value::ObjectIdentifier(
            Oid::parse(payload).map_err(|_| malformed())?,
        ),
        "Timeticks" => Value::TimeTicks(parse_timeticks(payload).ok_or_else(malformed)?),
        other => {
            return Err(Error::walk_parse(
                line_no,
                WalkParseErrorKind::UnknownType(other.to_string()),
            ));
        }
    };
    Ok((oid, value))
}

/// Parse every line of a walk-text source into `(OID, Value)` pairs.
pub fn parse_snmpwalk(lines: impl Iterator<Item = std::io::Result<String>>) -> Result<Vec<(Oid, Value)>, Error> {
    let mut out = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line.map_err(|_| Error::walk_parse(i + 1, WalkParseErrorKind::NotAnAssignment))?;
        if line.trim().is_empty() {
            continue;
        }
        out.push(parse_snmpwalk_line(&line, i + 1)?);
    }
    Ok(out)
}

/// A [`Backend`] that answers from an [`ObjectCache`] built from walk-text,
/// for offline replay and tests.
pub struct MockBackend {
    cache: ObjectCache,
}

impl MockBackend {
    /// Build from already-parsed pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Oid, Value)>) -> Self {
        MockBackend {
            cache: ObjectCache::from_pairs(pairs),
        }
    }

    /// Build by parsing walk-text from any line source (a file, a `&str`'s
    /// lines, stdin, ...).
    pub fn from_reader(reader: impl BufRead) -> Result<Self, Error> {
        let pairs = parse_snmpwalk(reader.lines())?;
        Ok(Self::from_pairs(pairs))
    }

    /// Build by parsing a walk-text string directly (test convenience).
    pub fn from_text(text: &str) -> Result<Self, Error> {
        Self::from_reader(std::io::Cursor::new(text.as_bytes()))
    }
}

impl Backend for MockBackend {
    fn get(&self, oid: &Oid) -> Result<Value, BackendError> {
        match self.cache.get(oid) {
            Ok(v) => Ok(v),
            Err(NotCached) => Ok(Value::NoSuchObject),
        }
    }

    fn getnext(&self, oid: &Oid) -> Result<(Oid, Value), BackendError> {
        match self.cache.getnext(oid) {
            Ok(pair) => Ok(pair),
            Err(NotCached) => Err(BackendError::new(format!(
                "mock backend has no knowledge of the successor of {oid}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_line() {
        let (oid, value) = parse_snmpwalk_line(".1.2 = INTEGER: 3", 1).unwrap();
        assert_eq!(oid, crate::oid!(1, 2));
        assert_eq!(value, Value::Integer(3));
    }

    #[test]
    fn parses_empty_string_line() {
        let (_, value) = parse_snmpwalk_line(".1.3 = \"\"", 1).unwrap();
        assert_eq!(value, Value::OctetString(Bytes::new()));
    }

    #[test]
    fn parses_oid_line() {
        let (_, value) = parse_snmpwalk_line(".1.4 = OID: .3.4", 1).unwrap();
        assert_eq!(value, Value::ObjectIdentifier(crate::oid!(3, 4)));
    }

    #[test]
    fn parses_timeticks_with_parens() {
        let (_, value) = parse_snmpwalk_line(".1.5 = Timeticks: (123) 0:00:01.23", 1).unwrap();
        assert_eq!(value, Value::TimeTicks(123));
    }

    #[test]
    fn parses_hex_string() {
        let (_, value) = parse_snmpwalk_line(".1.6 = Hex-STRING: 66 6f 6f", 1).unwrap();
        assert_eq!(value, Value::OctetString(Bytes::from_static(b"foo")));
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(parse_snmpwalk_line(".1.7 = Bogus: 1", 1).is_err());
    }

    #[test]
    fn rejects_non_assignment() {
        assert!(parse_snmpwalk_line("not an assignment", 1).is_err());
    }

    #[test]
    fn mock_backend_answers_get_and_getnext() {
        let backend = MockBackend::from_text(".1.2 = INTEGER: 3\n.1.4 = OID: .3.4\n").unwrap();
        assert_eq!(backend.get(&crate::oid!(1, 2)).unwrap(), Value::Integer(3));
        assert_eq!(backend.get(&crate::oid!(9, 9)).unwrap(), Value::NoSuchObject);
        let (oid, value) = backend.getnext(&crate::oid!(1, 2)).unwrap();
        assert_eq!(oid, crate::oid!(1, 4));
        assert_eq!(value, Value::ObjectIdentifier(crate::oid!(3, 4)));
    }
}
