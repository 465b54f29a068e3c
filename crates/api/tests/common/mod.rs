#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use kyc_api::config::ServerConfig;
use kyc_api::router::build_app_router;
use kyc_api::state::AppState;
use kyc_api::storage::DocumentStorage;
use kyc_core::kyc::Decision;
use kyc_core::ledger::LedgerEvent;
use kyc_core::types::KycId;
use kyc_db::models::kyc::{CreateKycRecord, KycRecord};
use kyc_db::store::{
    DecisionOutcome, KycStore, MemoryKycStore, StoreError, StoreResult,
};

pub const BOUNDARY: &str = "kyc-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and uploads under `upload_dir`.
pub fn test_config(upload_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 64 * 1024,
        document_access_token: None,
    }
}

/// A router over an in-memory store, plus handles the tests poke at.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryKycStore>,
    /// Keeps the upload directory alive for the duration of the test.
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Build the app after letting the caller adjust the default config.
    pub fn with_config(adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let mut config = test_config(upload_dir.path());
        adjust(&mut config);

        let store = Arc::new(MemoryKycStore::new());
        Self {
            router: build_router_with_store(store.clone(), &config),
            store,
            upload_dir,
        }
    }

    /// A fresh handle on the router; `oneshot` consumes its service.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Submit a complete, valid application and return its id.
    pub async fn submit_sample(&self, name: &str) -> String {
        let response = post_multipart(
            self.app(),
            "/kyc/submit",
            &sample_fields(name),
            Some(("passport.pdf", b"%PDF-1.4 sample".as_slice())),
        )
        .await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        body_json(response).await["kycId"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

/// Build the full router over an arbitrary store.
pub fn build_router_with_store(store: Arc<dyn KycStore>, config: &ServerConfig) -> Router {
    let state = AppState {
        store,
        documents: Arc::new(DocumentStorage::new(config.upload_dir.clone())),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, config)
}

/// A store whose every write fails, as if the database had gone away.
pub struct FailingStore;

#[async_trait]
impl KycStore for FailingStore {
    async fn create(&self, _input: CreateKycRecord) -> StoreResult<KycRecord> {
        Err(StoreError::Corrupt("store unavailable".to_string()))
    }

    async fn find_by_id(&self, _id: KycId) -> StoreResult<Option<KycRecord>> {
        Ok(None)
    }

    async fn list_pending(&self) -> StoreResult<Vec<KycId>> {
        Ok(Vec::new())
    }

    async fn decide(&self, _id: KycId, _decision: Decision) -> StoreResult<DecisionOutcome> {
        Err(StoreError::Corrupt("store unavailable".to_string()))
    }

    async fn history(&self, _id: KycId) -> StoreResult<Vec<LedgerEvent>> {
        Ok(Vec::new())
    }

    async fn ledger(&self) -> StoreResult<Vec<LedgerEvent>> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Err(StoreError::Corrupt("store unavailable".to_string()))
    }
}

pub fn sample_fields(name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", name.to_string()),
        ("dob", "1990-04-12".to_string()),
        ("address", "1 Main St, Springfield".to_string()),
        ("documentId", "P1234567".to_string()),
    ]
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_with_header(app: Router, uri: &str, name: &str, value: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a `multipart/form-data` body built from text fields and an
/// optional `file` part.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    fields: &[(&str, String)],
    file: Option<(&str, &[u8])>,
) -> Response<Body> {
    let request = Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, file)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub fn multipart_body(fields: &[(&str, String)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
