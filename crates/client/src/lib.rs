//! Client for the KYC status API.
//!
//! [`api::KycClient`] wraps the HTTP contract; [`views`] holds the state
//! machines behind the submission form, the pending queue, the record detail
//! page and the status check.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod views;
