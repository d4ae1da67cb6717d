//! innkeep: a single-property reservation engine.
//!
//! State is an in-memory calendar of bookings and blocked ranges,
//! durably backed by a group-committed write-ahead log and served over a
//! small JSON HTTP API.

pub mod auth;
pub mod compactor;
pub mod config;
pub mod engine;
pub mod http;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod pricing;
pub mod wal;
