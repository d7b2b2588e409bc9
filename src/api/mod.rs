//! HTTP binding for the ledger engine
//!
//! Transport layer only: extractors, DTOs, error mapping and the
//! middleware stack. All money and state semantics live in the engine.

pub mod admin;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
