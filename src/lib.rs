//! A query-coalescing SNMPv2c engine and cooperative plugin scheduler for
//! a Nagios-style monitoring probe.
//!
//! The wire-level protocol client, MIB compiler, and Nagios text/perfdata
//! renderer are deliberately out of scope; this crate is the core that
//! sits between a synchronous [`Backend`](backend::Backend) and a
//! collection of `async fn` device plugins, batching and caching their
//! queries and driving them to completion.

pub mod backend;
pub mod cache;
pub mod controller;
pub mod engine;
pub mod error;
pub mod future;
pub mod oid;
pub mod plugins;
pub mod report;
pub mod value;
pub mod varbind;
pub mod walk;

pub use controller::Controller;
pub use engine::Engine;
pub use error::{Error, Result};
pub use future::QueryFuture;
pub use oid::Oid;
pub use report::{Alert, Collector, Severity};
pub use value::Value;
