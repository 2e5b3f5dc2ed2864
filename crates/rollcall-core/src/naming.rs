// Seam for the external group-naming service.
//
// The partition engine only knows this trait. The Claude-backed
// implementation lives in the `rollcall-llm` crate; tests use scripted
// implementations.

use async_trait::async_trait;

/// What the partition engine asks the naming service for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRequest {
    /// Number of groups that need a name.
    pub count: usize,
    /// Current (placeholder) names, in group order.
    pub current_names: Vec<String>,
}

/// Reasons a naming request produced nothing usable. All of them are
/// swallowed by the partition engine; they exist for logging.
#[derive(Debug, thiserror::Error)]
pub enum NamingError {
    #[error("naming service not configured")]
    NotConfigured,

    #[error("naming request failed: {0}")]
    Request(String),

    #[error("naming response was not a JSON array of strings: {0}")]
    Malformed(String),

    #[error("naming request timed out")]
    Timeout,
}

/// A service that proposes creative names for a set of groups.
#[async_trait]
pub trait NamingService: Send + Sync {
    /// Return candidate names in group order. Implementations may return
    /// fewer names than requested; the caller decides whether to use them.
    async fn suggest_names(&self, request: &NamingRequest) -> Result<Vec<String>, NamingError>;
}

/// Naming service used when no credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNaming;

#[async_trait]
impl NamingService for DisabledNaming {
    async fn suggest_names(&self, _request: &NamingRequest) -> Result<Vec<String>, NamingError> {
        Err(NamingError::NotConfigured)
    }
}
