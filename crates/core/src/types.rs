/// Record identifiers are opaque UUIDs assigned by the store.
pub type KycId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Parse an identifier taken from a URL path.
///
/// Returns `None` for anything that is not a UUID; callers treat that the
/// same as an unknown id.
pub fn parse_kyc_id(raw: &str) -> Option<KycId> {
    uuid::Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphenated_uuid() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(parse_kyc_id(&id.to_string()), Some(id));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_kyc_id("unknown-id"), None);
        assert_eq!(parse_kyc_id(""), None);
    }
}
