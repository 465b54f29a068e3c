//! Handlers for the KYC submission and verification workflow.
//!
//! Provides endpoints for submitting a record with its identity document,
//! listing the pending queue, reading a record, deciding on it, checking its
//! status, downloading its document and reading its ledger history.

use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use kyc_core::document;
use kyc_core::error::CoreError;
use kyc_core::kyc::{Decision, KycStatus, NewSubmission};
use kyc_core::ledger::LedgerEvent;
use kyc_core::types::{parse_kyc_id, Timestamp};
use kyc_db::models::kyc::{CreateKycRecord, KycRecord};
use kyc_db::store::DecisionOutcome;

use crate::error::{kyc_not_found, AppError, AppResult};
use crate::middleware::document_access::DocumentAccess;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    #[serde(rename = "kycId")]
    pub kyc_id: String,
}

#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub pending: Vec<String>,
}

/// Full record view returned by `GET /kyc/{id}`.
///
/// Status is read together with the rest of the record.
#[derive(Debug, Serialize)]
pub struct KycDetailsResponse {
    #[serde(rename = "kycId")]
    pub kyc_id: String,
    pub name: String,
    pub dob: String,
    pub address: String,
    #[serde(rename = "documentId")]
    pub document_id: String,
    pub document_path: String,
    pub document_url: String,
    pub document_filename: Option<String>,
    pub status: KycStatus,
    pub submission_hash: String,
    pub submitted_at: Timestamp,
    pub decided_at: Option<Timestamp>,
}

impl From<KycRecord> for KycDetailsResponse {
    fn from(r: KycRecord) -> Self {
        let kyc_id = r.id.to_string();
        Self {
            document_url: format!("/kyc/{kyc_id}/document"),
            kyc_id,
            name: r.name,
            dob: r.dob,
            address: r.address,
            document_id: r.document_id,
            document_path: r.document_path,
            document_filename: r.document_filename,
            status: r.status,
            submission_hash: r.submission_hash,
            submitted_at: r.submitted_at,
            decided_at: r.decided_at,
        }
    }
}

/// Body of `POST /kyc/verify/{id}`.
///
/// The decision is taken as a raw string so an unknown value is reported as
/// a validation error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub decision: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub message: &'static str,
    #[serde(rename = "kycId")]
    pub kyc_id: String,
    pub status: KycStatus,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: KycStatus,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub events: Vec<LedgerEvent>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a record by the raw path id; malformed ids are simply unknown.
async fn load_record(state: &AppState, raw_id: &str) -> AppResult<KycRecord> {
    let id = parse_kyc_id(raw_id).ok_or_else(|| kyc_not_found(raw_id))?;
    state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| kyc_not_found(raw_id))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Uploaded file taken from the `file` multipart field.
struct Upload {
    filename: Option<String>,
    data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /kyc/submit
///
/// Accepts a multipart form with `name`, `dob`, `address`, `documentId` and
/// a `file` field, all mandatory. Stores the document, creates the record in
/// `PENDING` and returns its id.
pub async fn submit_kyc(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let mut multipart = multipart?;
    let mut name = String::new();
    let mut dob = String::new();
    let mut address = String::new();
    let mut document_id = String::new();
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                upload = Some(Upload {
                    filename,
                    data: data.to_vec(),
                });
            }
            "name" => name = field.text().await.map_err(multipart_error)?,
            "dob" => dob = field.text().await.map_err(multipart_error)?,
            "address" => address = field.text().await.map_err(multipart_error)?,
            "documentId" => document_id = field.text().await.map_err(multipart_error)?,
            _ => {} // ignore unknown fields
        }
    }

    let fields = NewSubmission::new(name, dob, address, document_id);
    fields.check()?;

    let upload = upload.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "Missing required 'file' field".into(),
        ))
    })?;
    document::validate_document(&upload.data)?;

    let stored = state
        .documents
        .save(upload.filename.as_deref(), &upload.data)
        .await?;

    let input = CreateKycRecord {
        id: uuid::Uuid::new_v4(),
        fields,
        document_path: stored.name.clone(),
        document_filename: upload.filename,
        document_size: stored.size,
    };

    let record = match state.store.create(input).await {
        Ok(record) => record,
        Err(e) => {
            state.documents.remove(&stored.name).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        kyc_id = %record.id,
        document_size = record.document_size,
        "KYC submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            kyc_id: record.id.to_string(),
        }),
    ))
}

/// GET /kyc/pending
///
/// IDs of all records awaiting a decision. An empty list is a normal answer.
pub async fn list_pending(State(state): State<AppState>) -> AppResult<Json<PendingResponse>> {
    let pending = state
        .store
        .list_pending()
        .await?
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    Ok(Json(PendingResponse { pending }))
}

/// GET /kyc/{id}
pub async fn get_kyc_details(
    State(state): State<AppState>,
    Path(kyc_id): Path<String>,
) -> AppResult<Json<KycDetailsResponse>> {
    let record = load_record(&state, &kyc_id).await?;
    Ok(Json(record.into()))
}

/// POST /kyc/verify/{id}
///
/// Record a verifier decision. Only `PENDING` records accept one; deciding
/// twice returns 409 `ALREADY_DECIDED`.
pub async fn verify_kyc(
    State(state): State<AppState>,
    Path(kyc_id): Path<String>,
    input: Result<Json<VerifyRequest>, JsonRejection>,
) -> AppResult<Json<VerifyResponse>> {
    let Json(input) = input?;
    let decision: Decision = input.decision.parse()?;
    let id = parse_kyc_id(&kyc_id).ok_or_else(|| kyc_not_found(&kyc_id))?;

    match state.store.decide(id, decision).await? {
        DecisionOutcome::Decided(record) => {
            tracing::info!(kyc_id = %record.id, decision = %decision, "KYC decided");
            Ok(Json(VerifyResponse {
                message: "updated",
                kyc_id: record.id.to_string(),
                status: record.status,
            }))
        }
        DecisionOutcome::NotFound => Err(kyc_not_found(&kyc_id)),
        DecisionOutcome::AlreadyDecided(status) => {
            tracing::warn!(
                kyc_id = %id,
                decision = %decision,
                current = %status,
                "Decision rejected, KYC already decided"
            );
            Err(AppError::Core(CoreError::AlreadyDecided {
                id: kyc_id,
                status,
            }))
        }
    }
}

/// GET /kyc/status/{id}
pub async fn get_status(
    State(state): State<AppState>,
    Path(kyc_id): Path<String>,
) -> AppResult<Json<StatusResponse>> {
    let record = load_record(&state, &kyc_id).await?;
    Ok(Json(StatusResponse {
        status: record.status,
    }))
}

/// GET /kyc/{id}/document
///
/// Streams the record's identity document, subject to [`DocumentAccess`].
pub async fn get_document(
    _access: DocumentAccess,
    State(state): State<AppState>,
    Path(kyc_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = load_record(&state, &kyc_id).await?;
    let bytes = state
        .documents
        .read(&record.document_path)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "KycDocument",
                id: kyc_id.clone(),
            })
        })?;

    let content_type = document::content_type_for(&record.document_path).to_string();
    let disposition = format!("inline; filename=\"{}\"", record.document_path);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// GET /kyc/{id}/history
///
/// Ledger events for one record, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(kyc_id): Path<String>,
) -> AppResult<Json<HistoryResponse>> {
    let record = load_record(&state, &kyc_id).await?;
    let events = state.store.history(record.id).await?;
    Ok(Json(HistoryResponse { events }))
}
