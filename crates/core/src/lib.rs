//! Domain rules for the KYC record lifecycle.
//!
//! This crate has no I/O. It defines the record status state machine,
//! submission validation, the hash-chained ledger rules and document naming
//! so the store, the HTTP service and the client all agree on them.

pub mod document;
pub mod error;
pub mod hashing;
pub mod kyc;
pub mod ledger;
pub mod types;
