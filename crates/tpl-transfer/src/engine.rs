//! The engine handle

use std::time::Duration;

/// Handle through which all transfer operations run.
///
/// Cheap to clone; the only state is the shared HTTP client. Unrelated
/// operations running on clones of one engine share nothing but that client.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    pub(crate) http: reqwest::Client,
}

impl TransferEngine {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { http }
    }
}

impl Default for TransferEngine {
    fn default() -> Self {
        Self::new()
    }
}
