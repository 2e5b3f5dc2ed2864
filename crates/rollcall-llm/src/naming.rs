// Group naming backed by Claude.
//
// Builds the naming prompt, sends it through `ClaudeClient` and parses the
// reply as a JSON array of strings.

use async_trait::async_trait;
use tracing::{debug, info};

use rollcall_core::config::Config;
use rollcall_core::naming::{NamingError, NamingRequest, NamingService};

use crate::client::{ClaudeClient, LlmError};

const SYSTEM_PROMPT: &str = "You name teams for workplace group activities. \
Names are short, upbeat and easy to shout across a room. \
Reply with a JSON array of strings only, one name per group, in group order.";

/// Build the user message for `request`.
pub fn build_user_prompt(request: &NamingRequest) -> String {
    format!(
        "Give these {} groups creative, energetic team names. \
         Current names, in order: {}. \
         Return exactly {} names as a JSON array of strings.",
        request.count,
        request.current_names.join(", "),
        request.count
    )
}

/// Parse a reply into names.
///
/// The reply should be a bare JSON array, but prose or code fences around it
/// are tolerated: the outermost `[...]` is what gets parsed.
pub fn parse_names(reply: &str) -> Result<Vec<String>, NamingError> {
    let start = reply.find('[');
    let end = reply.rfind(']');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => return Err(NamingError::Malformed(truncate(reply))),
    };

    let names: Vec<String> =
        serde_json::from_str(json).map_err(|e| NamingError::Malformed(e.to_string()))?;
    Ok(names.into_iter().map(|n| n.trim().to_string()).collect())
}

fn truncate(reply: &str) -> String {
    const MAX: usize = 80;
    match reply.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &reply[..idx]),
        None => reply.to_string(),
    }
}

impl From<LlmError> for NamingError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => NamingError::NotConfigured,
            other => NamingError::Request(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// LlmClient
// ---------------------------------------------------------------------------

/// Naming service that is either backed by Claude or disabled.
pub enum LlmClient {
    /// An API key is configured.
    Active { client: ClaudeClient, max_tokens: u32 },
    /// No API key; every request fails with `NotConfigured`.
    Disabled,
}

impl LlmClient {
    /// Returns `Active` if an API key is present in credentials, otherwise
    /// `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.trim().is_empty() => LlmClient::Active {
                client: ClaudeClient::new(
                    key.trim().to_string(),
                    config.naming.model.clone(),
                    config.naming.api_url.clone(),
                ),
                max_tokens: config.naming.max_tokens,
            },
            _ => LlmClient::Disabled,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LlmClient::Active { .. })
    }
}

#[async_trait]
impl NamingService for LlmClient {
    async fn suggest_names(&self, request: &NamingRequest) -> Result<Vec<String>, NamingError> {
        let (client, max_tokens) = match self {
            LlmClient::Active { client, max_tokens } => (client, *max_tokens),
            LlmClient::Disabled => return Err(NamingError::NotConfigured),
        };

        debug!(count = request.count, model = client.model(), "requesting group names");
        let completion = client
            .complete(SYSTEM_PROMPT, &build_user_prompt(request), max_tokens)
            .await?;
        let names = parse_names(&completion.text)?;
        info!(
            "Naming service suggested {} names ({} in / {} out tokens)",
            names.len(),
            completion.input_tokens,
            completion.output_tokens
        );
        Ok(names)
    }
}
