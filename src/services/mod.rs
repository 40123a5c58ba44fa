//! Services layer for the Command Clinic telemetry core
//!
//! Provides the rate-limited analysis pipeline over the external LLM
//! service.

pub mod llm;
pub mod rate_limit;

pub use llm::{
    parse_and_cap, parse_response, AnalysisConfig, AnalysisPipeline, ContentBlock,
    MessagesResponse,
};
pub use rate_limit::RateLimiter;
