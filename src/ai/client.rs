//! Provider registry and blocking completion client
//!
//! Three providers speak two wire dialects: Anthropic's Messages API, and
//! the chat-completions shape shared by OpenAI and Groq. Requests are sync
//! (ureq), so the review pipeline needs no async runtime.

use crate::ai::{AiError, AiResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// An AI provider selectable with `--ai-provider`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Anthropic,
    OpenAi,
    Groq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Messages,
    ChatCompletions,
}

/// Static facts about one provider
#[derive(Debug)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub env_var: &'static str,
    pub signup_url: &'static str,
    pub default_model: &'static str,
    pub endpoint: &'static str,
    dialect: Dialect,
}

/// Indexed by `Provider as usize`
static REGISTRY: [(Provider, ProviderInfo); 3] = [
    (
        Provider::Anthropic,
        ProviderInfo {
            name: "anthropic",
            env_var: "ANTHROPIC_API_KEY",
            signup_url: "https://console.anthropic.com/settings/keys",
            default_model: "claude-sonnet-4-20250514",
            endpoint: "https://api.anthropic.com/v1/messages",
            dialect: Dialect::Messages,
        },
    ),
    (
        Provider::OpenAi,
        ProviderInfo {
            name: "openai",
            env_var: "OPENAI_API_KEY",
            signup_url: "https://platform.openai.com/api-keys",
            default_model: "gpt-4o",
            endpoint: "https://api.openai.com/v1/chat/completions",
            dialect: Dialect::ChatCompletions,
        },
    ),
    (
        Provider::Groq,
        ProviderInfo {
            name: "groq",
            env_var: "GROQ_API_KEY",
            signup_url: "https://console.groq.com/keys",
            default_model: "llama-3.3-70b-versatile",
            endpoint: "https://api.groq.com/openai/v1/chat/completions",
            dialect: Dialect::ChatCompletions,
        },
    ),
];

impl Provider {
    /// Registered provider names, in registry order
    pub fn names() -> Vec<&'static str> {
        REGISTRY.iter().map(|(_, info)| info.name).collect()
    }

    pub fn info(self) -> &'static ProviderInfo {
        &REGISTRY[self as usize].1
    }

    /// Look up a provider by its registered name.
    pub fn from_name(name: &str) -> AiResult<Provider> {
        let wanted = name.trim().to_lowercase();
        REGISTRY
            .iter()
            .find(|(_, info)| info.name == wanted)
            .map(|(p, _)| *p)
            .ok_or_else(|| {
                AiError::ConfigError(format!(
                    "unknown AI provider '{}' (available: {})",
                    name,
                    Provider::names().join(", ")
                ))
            })
    }
}

impl FromStr for Provider {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::from_name(s)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.info().name)
    }
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Turn<'a>; 1],
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Turn<'a>; 2],
}

#[derive(Deserialize)]
struct MessagesReply {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking completion client for one provider
pub struct AiClient {
    provider: Provider,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    agent: ureq::Agent,
}

impl AiClient {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        let agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(120)))
            .build()
            .new_agent();
        Self {
            provider,
            model: provider.info().default_model.to_string(),
            api_key: api_key.into(),
            max_tokens: 1024,
            temperature: 0.2,
            agent,
        }
    }

    /// Client keyed from the provider's environment variable.
    pub fn from_env(provider: Provider) -> AiResult<Self> {
        let info = provider.info();
        match std::env::var(info.env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(provider, key)),
            _ => Err(AiError::MissingApiKey {
                env_var: info.env_var.to_string(),
                signup_url: info.signup_url.to_string(),
            }),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn body(&self, system: &str, prompt: &str) -> AiResult<serde_json::Value> {
        let value = match self.provider.info().dialect {
            Dialect::Messages => serde_json::to_value(MessagesBody {
                model: &self.model,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                system,
                messages: [Turn {
                    role: "user",
                    content: prompt,
                }],
            }),
            Dialect::ChatCompletions => serde_json::to_value(ChatBody {
                model: &self.model,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                messages: [
                    Turn {
                        role: "system",
                        content: system,
                    },
                    Turn {
                        role: "user",
                        content: prompt,
                    },
                ],
            }),
        };
        value.map_err(|e| AiError::ParseError(e.to_string()))
    }

    /// One system + user exchange; returns the reply text.
    pub fn complete(&self, system: &str, prompt: &str) -> AiResult<String> {
        let info = self.provider.info();
        let body = self.body(system, prompt)?;

        let request = self
            .agent
            .post(info.endpoint)
            .header("Content-Type", "application/json");
        let request = match info.dialect {
            Dialect::Messages => request
                .header("x-api-key", self.api_key.as_str())
                .header("anthropic-version", "2023-06-01"),
            Dialect::ChatCompletions => {
                request.header("Authorization", format!("Bearer {}", self.api_key).as_str())
            }
        };

        let mut response = request.send_json(&body).map_err(|e| AiError::ApiError {
            status: 0,
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        if status >= 400 {
            return Err(AiError::ApiError {
                status,
                message: text,
            });
        }
        reply_text(info.dialect, &text)
    }
}

fn reply_text(dialect: Dialect, raw: &str) -> AiResult<String> {
    let parse_err = |e: serde_json::Error| AiError::ParseError(e.to_string());
    let text = match dialect {
        Dialect::Messages => serde_json::from_str::<MessagesReply>(raw)
            .map_err(parse_err)?
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text),
        Dialect::ChatCompletions => serde_json::from_str::<ChatReply>(raw)
            .map_err(parse_err)?
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default()),
    };
    text.ok_or_else(|| AiError::ParseError("reply has no text".to_string()))
}
