//! AI-powered issue explanations and fixes
//!
//! Optional collaborator that runs after a review completes. It attaches
//! `ai_explanation` / `ai_fix` text to the most severe issues and never
//! touches scores or counts. Uses BYOK (bring your own key): API keys are
//! read from environment variables.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY`: Required for the Anthropic backend
//! - `OPENAI_API_KEY`: Required for the OpenAI backend
//! - `GROQ_API_KEY`: Required for the Groq backend
//!
//! # Example
//!
//! ```rust,ignore
//! use pyreview::ai::{enhance_result, AiClient, AiEnhancer, Provider};
//!
//! let client = AiClient::from_env(Provider::Anthropic)?;
//! let stats = enhance_result(&mut result, &AiEnhancer::new(client), 10);
//! ```

mod client;
mod enhancer;
mod prompts;

pub use client::{AiClient, Provider, ProviderInfo};
pub use enhancer::{enhance_result, AiEnhancer, EnhanceStats, IssueEnhancer};
pub use prompts::{code_context, explain_prompt, fix_prompt, parse_fix};

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type AiResult<T> = Result<T, AiError>;
