//! REST client for the KYC API.
//!
//! Wraps submission, the pending queue, record details, decisions, status
//! checks and the ledger endpoints using [`reqwest`]. Nothing is retried.

use kyc_core::kyc::{Decision, KycStatus, NewSubmission};
use kyc_core::ledger::{ChainReport, LedgerEvent};
use reqwest::multipart::{Form, Part};
use reqwest::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{
    DocumentUpload, HistoryResponse, KycDetails, PendingResponse, StatusResponse, SubmitResponse,
    VerifyResponse,
};

/// HTTP client for a single KYC API deployment.
#[derive(Debug, Clone)]
pub struct KycClient {
    client: reqwest::Client,
    base_url: Url,
}

impl KycClient {
    /// Build a client with its own connection pool and the configured
    /// request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Self::with_client(client, &config.base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute download URL of a record's identity document.
    pub fn document_url(&self, kyc_id: &str) -> Result<Url, ClientError> {
        self.endpoint(&["kyc", kyc_id, "document"])
    }

    /// Submit an application with its document.
    ///
    /// Sends `POST /kyc/submit` as `multipart/form-data` and returns the new
    /// record's id.
    pub async fn submit(
        &self,
        fields: &NewSubmission,
        document: &DocumentUpload,
    ) -> Result<String, ClientError> {
        let file = Part::bytes(document.bytes.clone()).file_name(document.filename.clone());
        let form = Form::new()
            .text("name", fields.name.clone())
            .text("dob", fields.dob.clone())
            .text("address", fields.address.clone())
            .text("documentId", fields.document_id.clone())
            .part("file", file);

        let response = self
            .client
            .post(self.endpoint(&["kyc", "submit"])?)
            .multipart(form)
            .send()
            .await?;

        let body: SubmitResponse = Self::parse_response(response).await?;
        tracing::debug!(kyc_id = %body.kyc_id, "KYC submitted");
        Ok(body.kyc_id)
    }

    /// IDs of records awaiting a decision (`GET /kyc/pending`).
    pub async fn list_pending(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["kyc", "pending"])?)
            .send()
            .await?;
        let body: PendingResponse = Self::parse_response(response).await?;
        Ok(body.pending)
    }

    /// Full record including its current status (`GET /kyc/{id}`).
    pub async fn get_details(&self, kyc_id: &str) -> Result<KycDetails, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["kyc", kyc_id])?)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Current status only (`GET /kyc/status/{id}`).
    pub async fn get_status(&self, kyc_id: &str) -> Result<KycStatus, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["kyc", "status", kyc_id])?)
            .send()
            .await?;
        let body: StatusResponse = Self::parse_response(response).await?;
        Ok(body.status)
    }

    /// Record a decision (`POST /kyc/verify/{id}`) and return the new status.
    ///
    /// When the server answers `ALREADY_DECIDED`, the record's current
    /// status is looked up once so callers can show it.
    pub async fn decide(&self, kyc_id: &str, decision: Decision) -> Result<KycStatus, ClientError> {
        let response = self
            .client
            .post(self.endpoint(&["kyc", "verify", kyc_id])?)
            .json(&serde_json::json!({ "decision": decision.as_str() }))
            .send()
            .await?;

        match Self::parse_response::<VerifyResponse>(response).await {
            Ok(body) => Ok(body.status),
            Err(ClientError::AlreadyDecided { message, .. }) => {
                let current = self.get_status(kyc_id).await.ok();
                tracing::warn!(
                    kyc_id,
                    decision = %decision,
                    current = ?current,
                    "KYC already decided"
                );
                Err(ClientError::AlreadyDecided { message, current })
            }
            Err(e) => Err(e),
        }
    }

    /// Ledger events of one record (`GET /kyc/{id}/history`).
    pub async fn history(&self, kyc_id: &str) -> Result<Vec<LedgerEvent>, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["kyc", kyc_id, "history"])?)
            .send()
            .await?;
        let body: HistoryResponse = Self::parse_response(response).await?;
        Ok(body.events)
    }

    /// Integrity report for the whole ledger (`GET /ledger/verify`).
    pub async fn verify_ledger(&self) -> Result<ChainReport, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["ledger", "verify"])?)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Download a record's document (`GET /kyc/{id}/document`).
    ///
    /// `token` is sent as a bearer token when the server requires one.
    pub async fn download_document(
        &self,
        kyc_id: &str,
        token: Option<&str>,
    ) -> Result<Vec<u8>, ClientError> {
        let mut request = self.client.get(self.document_url(kyc_id)?);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = Self::ensure_success(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Append `segments` to the base URL path.
    ///
    /// Each segment is percent-encoded on its own, so an id can never add
    /// path levels or climb out of its route. Empty and dot segments cannot
    /// name a record and are reported as not found without a request.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ClientError::NotFound(format!("KYC with id '{bad}' not found")));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Return the response unchanged on success, or the classified error.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::from_response(status, &body));
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
