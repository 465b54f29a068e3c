//! KYC Record Store & Status API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! document storage) so integration tests and the binary entrypoint can both
//! access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;
