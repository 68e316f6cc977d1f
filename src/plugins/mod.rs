//! Example plugins demonstrating the coroutine contract the core exposes.
//!
//! These are illustrative, not an exhaustive device-plugin library: the
//! wire protocol and vendor MIB tables a production probe would ship are
//! out of scope. Grounded on `nssct.plugins`.

pub mod detect;
