//! Analysis pipeline
//!
//! Turns a slice of recent events into optimization proposals by calling
//! the Anthropic messages API: build a deterministic prompt, wait out the
//! client-side rate limit, perform one bounded HTTP call, then parse the
//! model output fail-soft into the strict [`AnalysisResponse`] schema.
//!
//! Malformed model output is never an error; it yields an empty response.
//! External-call failures (auth, rate limit, outage, timeout) are always
//! surfaced as typed errors so the caller can inform the user.

use crate::config::Settings;
use crate::error::{ClinicError, Result};
use crate::services::rate_limit::RateLimiter;
use crate::types::{AnalysisResponse, LogEvent};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anthropic messages endpoint.
const API_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Protocol-version marker sent with every request.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Fixed system instruction for the analysis call.
const SYSTEM_PROMPT: &str = "You are 'Command Clinic', an expert at optimizing \
command-launcher usage. Analyze logs and propose actionable improvements.";

/// Hard cap on proposals returned to the caller.
const MAX_PROPOSALS: usize = 3;

/// Fixed ruleset and output-schema sections of the prompt. Byte-stable
/// across calls so the service's behavior is reproducible.
const PROMPT_RULES: &str = r##"# RULES (v2)
- frequent launch: count(aliasId) >= 10/7d -> shortcut suggestion
- repeated long input: len >= 20 and same text >= 3 -> snippet suggestion
- chain: pattern A->B->C within 10 minutes repeated >= 2 -> macro suggestion
- output up to 3 proposals, prioritize chain > frequent > long
- detect frequent keywords in input text that suggest missing tools -> extension hints
- respond ONLY with JSON matching the schema below.

# EXTENSION_DETECTION
- Look for patterns in input text suggesting uninstalled extensions:
  - "jira-XXX" or "JIRA" pattern -> Jira extension
  - "github.com/" or "gh " URLs -> GitHub extension
  - "notion.so/" URLs -> Notion extension
  - "slack " or "#channel" -> Slack extension
  - "figma.com/" URLs -> Figma extension
  - "linear " or "LIN-" pattern -> Linear extension

# OUTPUT_SCHEMA
{
  "proposals": [
    {
      "type": "shortcut|snippet|macro",
      "title": "string",
      "rationale": "string (max 80 chars)",
      "evidence": {
        "aliases": ["..."],
        "count": 0,
        "time_windows": ["HH:MM-HH:MM"]
      },
      "payload": {
        "shortcut": { "aliasId": "id", "suggestedHotkey": "Alt+Cmd+K" },
        "snippet": { "text": "the repeated text", "alias": "short" },
        "macro": { "sequence": ["AliasA", "AliasB", "AliasC"] }
      },
      "confidence": 0.0
    }
  ],
  "extension_hints": [
    {
      "keyword": "pattern detected",
      "frequency": 5,
      "suggested_search": "search query for the extension store",
      "extension_name": "suggested extension name",
      "description": "why this extension would help"
    }
  ]
}"##;

/// Configuration for the analysis pipeline
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Anthropic API key
    pub api_key: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Token budget per response
    pub max_tokens: u32,

    /// Absolute deadline for one call
    pub request_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: crate::config::DEFAULT_MODEL.to_string(),
            max_tokens: crate::config::DEFAULT_MAX_TOKENS,
            request_timeout: Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl From<&Settings> for AnalysisConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}

/// Anthropic API request format
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Anthropic API response format: a list of content blocks, the first of
/// which carries the model-emitted text.
#[derive(Debug, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: String,
}

/// Error body shape returned by the API on non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Rate-limited, time-bounded bridge to the analysis service.
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    limiter: Arc<RateLimiter>,
    client: reqwest::Client,
}

impl AnalysisPipeline {
    /// Create a pipeline with an explicitly provided limiter.
    ///
    /// Passing the limiter in keeps its state visible: pipelines sharing
    /// one limiter share one throttle.
    pub fn new(config: AnalysisConfig, limiter: Arc<RateLimiter>) -> Self {
        Self {
            config,
            limiter,
            client: reqwest::Client::new(),
        }
    }

    /// Create a pipeline and a private limiter from resolved settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            settings.min_call_interval_ms,
        )));
        Self::new(AnalysisConfig::from(settings), limiter)
    }

    /// Build the prompt for a slice of events.
    ///
    /// Deterministic: the events are serialized one per line as compact
    /// JSON in the order given (callers pass the already-sorted,
    /// already-limited slice), followed by the fixed ruleset and schema.
    pub fn build_prompt(events: &[LogEvent]) -> String {
        let jsonl = events
            .iter()
            .filter_map(|event| serde_json::to_string(event).ok())
            .collect::<Vec<_>>()
            .join("\n");

        format!("# RAW_LOGS (last 7 days, max 100 events)\n{jsonl}\n\n{PROMPT_RULES}")
    }

    /// Analyze recent events into proposals and extension hints.
    ///
    /// Fails fast without a credential; returns an empty response without
    /// any network call when `events` is empty. Non-2xx statuses map onto
    /// the error taxonomy; the 2xx body is parsed fail-soft and proposals
    /// are capped at 3 preserving order.
    pub async fn analyze(&self, events: &[LogEvent]) -> Result<AnalysisResponse> {
        if self.config.api_key.trim().is_empty() {
            return Err(ClinicError::MissingCredential);
        }

        if events.is_empty() {
            debug!("no events to analyze");
            return Ok(AnalysisResponse::empty());
        }

        self.limiter.acquire().await;

        let prompt = Self::build_prompt(events);
        info!(
            events = events.len(),
            model = %self.config.model,
            "requesting analysis"
        );

        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let timeout_secs = self.config.request_timeout.as_secs();
        let response = self
            .client
            .post(API_ENDPOINT)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClinicError::Timeout(timeout_secs)
                } else {
                    ClinicError::Http(e)
                }
            })?;

        let status = response.status();
        debug!(status = status.as_u16(), "analysis response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }

        let raw: MessagesResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ClinicError::Timeout(timeout_secs)
            } else {
                ClinicError::Http(e)
            }
        })?;

        Ok(parse_and_cap(&raw))
    }
}

/// Parse a raw response and apply the proposal cap, exactly as [`analyze`]
/// does with a 2xx body. Order is preserved; entries past the cap are
/// dropped.
///
/// [`analyze`]: AnalysisPipeline::analyze
pub fn parse_and_cap(raw: &MessagesResponse) -> AnalysisResponse {
    let mut result = parse_response(raw);
    result.proposals.truncate(MAX_PROPOSALS);
    result
}

/// Map a non-2xx status and raw error body onto the error taxonomy.
fn classify_status(status: u16, body: &str) -> ClinicError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message)
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 => ClinicError::Auth(message),
        429 => ClinicError::RateLimited(message),
        500..=599 => ClinicError::ServiceUnavailable { status, message },
        _ => ClinicError::UnknownApi { status, message },
    }
}

/// Parse a raw API response into the strict analysis schema, fail-soft.
///
/// Missing or empty content, and any JSON parse failure after stripping an
/// optional fenced-code-block wrapper, yield an empty response rather than
/// an error. Missing fields default to empty lists.
pub fn parse_response(raw: &MessagesResponse) -> AnalysisResponse {
    let text = raw
        .content
        .first()
        .map(|block| block.text.trim())
        .unwrap_or("");

    if text.is_empty() {
        warn!("empty text block in analysis response");
        return AnalysisResponse::empty();
    }

    let stripped = strip_code_fence(text);
    match serde_json::from_str(stripped) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "discarding unparseable analysis output");
            AnalysisResponse::empty()
        }
    }
}

/// Strip a single leading/trailing fenced-code-block wrapper, with or
/// without a language tag. Anything not shaped like a fence is returned
/// unchanged.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // The language tag (if any) runs to the first newline.
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let body = &rest[newline + 1..];

    match body.strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}
