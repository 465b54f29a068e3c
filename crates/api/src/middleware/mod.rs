//! Request extractors enforcing access policy.
//!
//! - [`document_access::DocumentAccess`] -- Guards document downloads.

pub mod document_access;
