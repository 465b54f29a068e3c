use kyc_core::kyc::KycStatus;
use reqwest::StatusCode;
use serde::Deserialize;

/// Errors surfaced by [`crate::api::KycClient`].
///
/// Server failures are classified by the `code` of the error body, falling
/// back to the HTTP status when the body is not the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (connect, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The record left `PENDING` before this decision arrived.
    ///
    /// `current` is the record's status when the client could learn it.
    #[error("Already decided: {message}")]
    AlreadyDecided {
        message: String,
        current: Option<KycStatus>,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-2xx answer.
    #[error("KYC API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The configured base URL cannot have endpoint paths appended.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// A 2xx answer whose body did not match the contract.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Error body shape shared by every endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

impl ClientError {
    /// Classify a non-2xx response from its status and raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => (Some(parsed.code), parsed.error),
            Err(_) => (None, body.to_string()),
        };

        match (code.as_deref(), status) {
            (Some("NOT_FOUND"), _) | (None, StatusCode::NOT_FOUND) => {
                ClientError::NotFound(message)
            }
            (Some("ALREADY_DECIDED"), _) | (None, StatusCode::CONFLICT) => {
                ClientError::AlreadyDecided {
                    message,
                    current: None,
                }
            }
            (Some("VALIDATION_ERROR"), _)
            | (None, StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY) => {
                ClientError::Validation(message)
            }
            (Some("UNAUTHORIZED"), _) | (None, StatusCode::UNAUTHORIZED) => {
                ClientError::Unauthorized(message)
            }
            _ => ClientError::Api {
                status: status.as_u16(),
                code: code.unwrap_or_else(|| "UNKNOWN".to_string()),
                message,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}
