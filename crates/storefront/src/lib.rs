//! Acme Shop storefront library.
//!
//! Catalog browsing, the session-backed shopping cart and checkout. The
//! binary in `main.rs` wires these pieces to `PostgreSQL`; the integration
//! tests wire them to in-memory services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
