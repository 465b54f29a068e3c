//! Drives the real router over TCP through `KycClient`.

use std::sync::Arc;

use assert_matches::assert_matches;
use tempfile::TempDir;

use kyc_api::config::ServerConfig;
use kyc_api::router::build_app_router;
use kyc_api::state::AppState;
use kyc_api::storage::DocumentStorage;
use kyc_client::api::KycClient;
use kyc_client::config::ClientConfig;
use kyc_client::error::ClientError;
use kyc_client::models::DocumentUpload;
use kyc_client::views::{DetailView, PendingQueueView, StatusCheckView, SubmitForm};
use kyc_core::kyc::{Decision, KycStatus, NewSubmission};
use kyc_db::store::MemoryKycStore;

/// Serve a fresh in-memory app on an ephemeral port.
///
/// The returned directory holds uploads and must outlive the test.
async fn spawn_server(document_access_token: Option<&str>) -> (KycClient, TempDir) {
    spawn_server_with_store(Arc::new(MemoryKycStore::new()), document_access_token).await
}

async fn spawn_server_with_store(
    store: Arc<MemoryKycStore>,
    document_access_token: Option<&str>,
) -> (KycClient, TempDir) {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        upload_dir: upload_dir.path().to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        document_access_token: document_access_token.map(str::to_string),
    };
    let state = AppState {
        store,
        documents: Arc::new(DocumentStorage::new(upload_dir.path())),
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = KycClient::new(&ClientConfig::new(format!("http://{addr}"))).unwrap();
    (client, upload_dir)
}

fn alice() -> (NewSubmission, DocumentUpload) {
    (
        NewSubmission::new("Alice", "1990-01-01", "1 Main St", "X1"),
        DocumentUpload::new("passport.pdf", b"%PDF-1.4 alice".to_vec()),
    )
}

#[tokio::test]
async fn submitted_record_is_pending() {
    let (client, _dir) = spawn_server(None).await;
    let (fields, document) = alice();

    let id = client.submit(&fields, &document).await.unwrap();

    assert_eq!(client.list_pending().await.unwrap(), vec![id.clone()]);
    assert_eq!(client.get_status(&id).await.unwrap(), KycStatus::Pending);

    let details = client.get_details(&id).await.unwrap();
    assert_eq!(details.name, "Alice");
    assert_eq!(details.document_id, "X1");
    assert_eq!(details.status, KycStatus::Pending);
    assert!(details.decided_at.is_none());
}

#[tokio::test]
async fn decision_is_final() {
    let (client, _dir) = spawn_server(None).await;
    let (fields, document) = alice();
    let id = client.submit(&fields, &document).await.unwrap();

    let status = client.decide(&id, Decision::Verified).await.unwrap();
    assert_eq!(status, KycStatus::Verified);
    assert_eq!(client.get_status(&id).await.unwrap(), KycStatus::Verified);
    assert!(client.list_pending().await.unwrap().is_empty());

    let err = client.decide(&id, Decision::Rejected).await.unwrap_err();
    assert_matches!(
        err,
        ClientError::AlreadyDecided {
            current: Some(KycStatus::Verified),
            ..
        }
    );
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (client, _dir) = spawn_server(None).await;

    assert_matches!(
        client.get_details("unknown-id").await,
        Err(ClientError::NotFound(_))
    );
    assert_matches!(
        client.get_status("unknown-id").await,
        Err(ClientError::NotFound(_))
    );
    assert_matches!(
        client.decide("unknown-id", Decision::Verified).await,
        Err(ClientError::NotFound(_))
    );
}

#[tokio::test]
async fn path_like_ids_are_not_found() {
    let (client, _dir) = spawn_server(None).await;
    let (fields, document) = alice();
    client.submit(&fields, &document).await.unwrap();

    for raw in ["../pending", "../../health", "../../ledger/verify", "a/b", ".."] {
        let mut check = StatusCheckView::default();
        let typed = check.begin(raw).unwrap();
        check.finish(client.get_status(&typed).await);
        assert_eq!(check, StatusCheckView::NotFound, "{raw}");

        assert_matches!(
            client.get_details(raw).await,
            Err(ClientError::NotFound(_)),
            "{raw}"
        );
        assert_matches!(
            client.decide(raw, Decision::Verified).await,
            Err(ClientError::NotFound(_)),
            "{raw}"
        );
    }

    // Nothing was decided by the attempts above.
    assert_eq!(client.list_pending().await.unwrap().len(), 1);
}

#[tokio::test]
async fn server_side_validation_is_surfaced() {
    let (client, _dir) = spawn_server(None).await;
    let fields = NewSubmission::new("Alice", "", "1 Main St", "X1");
    let document = DocumentUpload::new("passport.pdf", b"%PDF".to_vec());

    let err = client.submit(&fields, &document).await.unwrap_err();
    assert_matches!(err, ClientError::Validation(ref msg) if msg.contains("dob"));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let client = KycClient::new(&ClientConfig::new("http://127.0.0.1:1")).unwrap();
    assert_matches!(client.list_pending().await, Err(ClientError::Network(_)));
}

#[tokio::test]
async fn document_download_honours_token() {
    let (client, _dir) = spawn_server(Some("s3cret")).await;
    let (fields, document) = alice();
    let id = client.submit(&fields, &document).await.unwrap();

    assert_matches!(
        client.download_document(&id, None).await,
        Err(ClientError::Unauthorized(_))
    );
    let bytes = client.download_document(&id, Some("s3cret")).await.unwrap();
    assert_eq!(bytes, document.bytes);
}

#[tokio::test]
async fn ledger_tracks_lifecycle() {
    let (client, _dir) = spawn_server(None).await;
    let (fields, document) = alice();
    let id = client.submit(&fields, &document).await.unwrap();
    client.decide(&id, Decision::Rejected).await.unwrap();

    let events = client.history(&id).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].status, KycStatus::Pending);
    assert_eq!(events[1].status, KycStatus::Rejected);

    let report = client.verify_ledger().await.unwrap();
    assert!(report.valid);
    assert_eq!(report.length, 2);
}

#[tokio::test]
async fn tampered_ledger_is_reported() {
    let store = Arc::new(MemoryKycStore::new());
    let (client, _dir) = spawn_server_with_store(store.clone(), None).await;
    let (fields, document) = alice();
    let id = client.submit(&fields, &document).await.unwrap();
    client.decide(&id, Decision::Verified).await.unwrap();

    assert!(store.tamper_with_ledger(2, KycStatus::Rejected).await);

    let report = client.verify_ledger().await.unwrap();
    assert!(!report.valid);
    assert_eq!(report.length, 2);
    assert_eq!(report.first_invalid_sequence, Some(2));
}

#[tokio::test]
async fn views_walk_through_the_workflow() {
    let (client, _dir) = spawn_server(None).await;

    // Submit through the form.
    let mut form = SubmitForm {
        name: "Bob".into(),
        dob: "1985-06-30".into(),
        address: "2 High St".into(),
        document_id: "Y2".into(),
        document: Some(DocumentUpload::new("id.png", vec![0x89, b'P', b'N', b'G'])),
        ..SubmitForm::default()
    };
    let (fields, document) = form.begin_submit().unwrap();
    let id = client.submit(&fields, &document).await.unwrap();
    form.on_success(&id);
    assert_eq!(form.message, Some(format!("Submitted! KYC ID: {id}")));

    // The queue shows it.
    let queue = PendingQueueView::from_result(client.list_pending().await);
    assert_eq!(queue.ids(), [id.clone()]);

    // Decide from the detail page.
    let mut detail = DetailView::from_result(client.get_details(&id).await);
    let decision = detail.begin_decision(Decision::Rejected).unwrap();
    let result = client.decide(&id, decision).await;
    detail.finish_decision(decision, result);
    assert_eq!(detail.message(), Some("KYC REJECTED"));
    assert!(!detail.can_decide());

    // A second verifier racing on a stale view is refused and locked.
    let mut stale = DetailView::from_result(Ok(client.get_details(&id).await.unwrap()));
    if let DetailView::Loaded(loaded) = &mut stale {
        loaded.status = KycStatus::Pending;
    }
    let decision = stale.begin_decision(Decision::Verified).unwrap();
    let result = client.decide(&id, decision).await;
    stale.finish_decision(decision, result);
    assert_eq!(stale.status(), Some(KycStatus::Rejected));
    assert!(!stale.can_decide());

    // The queue is now empty, which is not an error.
    let queue = PendingQueueView::from_result(client.list_pending().await);
    assert_eq!(queue, PendingQueueView::Empty);

    // Status check by id.
    let mut check = StatusCheckView::default();
    let typed = check.begin(&id).unwrap();
    check.finish(client.get_status(&typed).await);
    assert_eq!(check, StatusCheckView::Found(KycStatus::Rejected));

    let typed = check.begin("no-such-id").unwrap();
    check.finish(client.get_status(&typed).await);
    assert_eq!(check, StatusCheckView::NotFound);
}
