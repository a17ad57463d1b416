//! rejoin-cli
//!
//! HTTP transport for the reassembly pipeline. The `rejoin` binary wires it to
//! a filesystem store; tests drive the router directly.

pub mod http;

pub use http::router;
