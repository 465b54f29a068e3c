//! Bearer-token guard for document downloads.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use kyc_core::error::CoreError;
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the caller may download identity documents.
///
/// When `DOCUMENT_ACCESS_TOKEN` is configured the request must carry
/// `Authorization: Bearer <token>`. Without a configured token every caller
/// is admitted.
#[derive(Debug, Clone, Copy)]
pub struct DocumentAccess;

impl FromRequestParts<AppState> for DocumentAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.document_access_token.as_deref() else {
            return Ok(DocumentAccess);
        };

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        if !digests_match(token, expected) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid document access token".into(),
            )));
        }

        Ok(DocumentAccess)
    }
}

/// Compare fixed-length digests so timing does not depend on the token.
fn digests_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
