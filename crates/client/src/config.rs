use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the KYC API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `KYC_API_URL`          | `http://localhost:8000` |
    /// | `KYC_API_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("KYC_API_URL").unwrap_or_else(|_| "http://localhost:8000".into());

        let timeout_secs: u64 = std::env::var("KYC_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("KYC_API_TIMEOUT_SECS must be a valid u64");

        Self {
            timeout: Duration::from_secs(timeout_secs),
            ..Self::new(base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let config = ClientConfig::new("http://kyc.internal:8000/");
        assert_eq!(config.base_url, "http://kyc.internal:8000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
