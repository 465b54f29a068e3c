//! Append-only, hash-chained ledger of KYC lifecycle events.
//!
//! Every submission and every accepted decision appends one event. Each
//! event's hash covers its canonical content plus the previous event's hash,
//! so rewriting any historical event breaks every hash after it.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::hashing;
use crate::kyc::KycStatus;
use crate::types::{KycId, Timestamp};

/// Known seed value standing in for the previous hash of the first event.
const CHAIN_SEED: &str = "KYC_LEDGER_CHAIN_SEED_V1";

/// Known event types.
pub mod event_types {
    pub const KYC_SUBMITTED: &str = "KYC_SUBMITTED";
    pub const KYC_DECIDED: &str = "KYC_DECIDED";
}

/// A persisted ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub sequence: i64,
    pub kyc_id: KycId,
    pub event_type: String,
    pub status: KycStatus,
    pub submission_hash: Option<String>,
    pub recorded_at: Timestamp,
    pub prev_hash: Option<String>,
    pub hash: String,
}

/// Event content before it is chained.
#[derive(Debug, Clone)]
pub struct PendingEvent {
    pub kyc_id: KycId,
    pub event_type: &'static str,
    pub status: KycStatus,
    pub submission_hash: Option<String>,
}

impl PendingEvent {
    pub fn submitted(kyc_id: KycId, submission_hash: String) -> Self {
        Self {
            kyc_id,
            event_type: event_types::KYC_SUBMITTED,
            status: KycStatus::Pending,
            submission_hash: Some(submission_hash),
        }
    }

    pub fn decided(kyc_id: KycId, status: KycStatus) -> Self {
        Self {
            kyc_id,
            event_type: event_types::KYC_DECIDED,
            status,
            submission_hash: None,
        }
    }

    /// Chain this event after `prev` (the current tail, if any).
    ///
    /// The timestamp is truncated to microseconds so it survives a
    /// round-trip through PostgreSQL `TIMESTAMPTZ` unchanged.
    pub fn chain(self, prev: Option<&LedgerEvent>) -> LedgerEvent {
        let sequence = prev.map_or(1, |p| p.sequence + 1);
        let prev_hash = prev.map(|p| p.hash.clone());
        let recorded_at = Utc::now().trunc_subsecs(6);

        let mut event = LedgerEvent {
            sequence,
            kyc_id: self.kyc_id,
            event_type: self.event_type.to_string(),
            status: self.status,
            submission_hash: self.submission_hash,
            recorded_at,
            prev_hash,
            hash: String::new(),
        };
        event.hash = compute_event_hash(event.prev_hash.as_deref(), &canonical_entry(&event));
        event
    }
}

/// Canonical sorted-key JSON of the hashed fields of an event.
pub fn canonical_entry(event: &LedgerEvent) -> String {
    let mut map: BTreeMap<&str, serde_json::Value> = BTreeMap::new();
    map.insert("eventType", event.event_type.clone().into());
    map.insert("kycId", event.kyc_id.to_string().into());
    map.insert(
        "recordedAt",
        event
            .recorded_at
            .to_rfc3339_opts(SecondsFormat::Micros, true)
            .into(),
    );
    map.insert("sequence", event.sequence.into());
    map.insert("status", event.status.as_str().into());
    map.insert(
        "submissionHash",
        event
            .submission_hash
            .clone()
            .map_or(serde_json::Value::Null, Into::into),
    );
    serde_json::to_string(&map).unwrap_or_default()
}

/// Compute the SHA-256 hash of an event.
///
/// `prev_hash` is the hash of the previous event, or `None` for the first
/// event in the chain (which uses a known seed value).
pub fn compute_event_hash(prev_hash: Option<&str>, entry_data: &str) -> String {
    let prev = prev_hash.unwrap_or(CHAIN_SEED);
    let combined = format!("{prev}|{entry_data}");
    hashing::sha256_hex(combined.as_bytes())
}

/// Result of walking the whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub valid: bool,
    pub length: usize,
    pub first_invalid_sequence: Option<i64>,
}

/// Verify an ordered slice of events from the start of the chain.
pub fn verify_chain(events: &[LedgerEvent]) -> ChainReport {
    let mut prev: Option<&LedgerEvent> = None;

    for event in events {
        let expected_sequence = prev.map_or(1, |p| p.sequence + 1);
        let linked = event.prev_hash.as_deref() == prev.map(|p| p.hash.as_str());
        let recomputed =
            compute_event_hash(event.prev_hash.as_deref(), &canonical_entry(event));

        if event.sequence != expected_sequence || !linked || recomputed != event.hash {
            return ChainReport {
                valid: false,
                length: events.len(),
                first_invalid_sequence: Some(event.sequence),
            };
        }
        prev = Some(event);
    }

    ChainReport {
        valid: true,
        length: events.len(),
        first_invalid_sequence: None,
    }
}
