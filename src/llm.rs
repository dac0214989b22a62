//! Language-model completion clients for SQL generation.
//!
//! The engine talks to a model only through [`CompletionClient`], so any
//! backend that can turn a [`Prompt`] into text can drive it. [`LlmClient`]
//! is the HTTP implementation for three providers:
//!
//! | Provider | Endpoint | Authentication |
//! |----------|----------|----------------|
//! | OpenAI | `api.openai.com` or any compatible gateway | Bearer token |
//! | Anthropic | `api.anthropic.com` | x-api-key header |
//! | Ollama | Local (configurable) | None |
//!
//! Each request is a single attempt bounded by a flat timeout; failures are
//! reported immediately, never retried.
//!
//! Models are told to answer with bare SQL but often wrap it in markdown
//! anyway. [`extract_sql`] strips the fences.
//!
//! # Example
//!
//! ```
//! use nl_sql_engine::llm::{GenerationOptions, LlmClient, LlmProvider, extract_sql};
//!
//! let provider = LlmProvider::Ollama {
//!     base_url: "http://localhost:11434".into(),
//!     model:    "llama3.2".into()
//! };
//! let _client = LlmClient::new(provider, GenerationOptions::default()).unwrap();
//!
//! assert_eq!(extract_sql("```sql\nSELECT 1\n```"), "SELECT 1");
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{EngineResult, config_error, http_error, llm_api_error},
    prompt::Prompt
};

/// Default OpenAI chat-completions endpoint
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Anything that can complete a chat prompt
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the prompt and return the raw completion text
    async fn complete(&self, prompt: &Prompt) -> EngineResult<String>;
}

/// Ask the model for SQL and extract a single statement from its answer.
///
/// # Errors
///
/// Returns a generation error if the call fails or nothing but fences and
/// whitespace comes back.
pub async fn generate_sql(client: &dyn CompletionClient, prompt: &Prompt) -> EngineResult<String> {
    let raw = client.complete(prompt).await?;
    let sql = extract_sql(&raw);
    if sql.is_empty() {
        return Err(llm_api_error("Language model returned an empty SQL query"));
    }
    debug!(sql = %sql, "generated SQL");
    Ok(sql)
}

/// Strip markdown fences and surrounding whitespace from a completion.
///
/// Order matters: trim, drop a leading ```` ```sql ```` opener, else a bare
/// leading fence, drop a trailing fence, trim again.
pub fn extract_sql(raw: &str) -> String {
    let mut sql = raw.trim();
    if sql.len() >= 6 && sql.is_char_boundary(6) && sql[..6].eq_ignore_ascii_case("```sql") {
        sql = &sql[6..];
    }
    if let Some(rest) = sql.strip_prefix("```") {
        sql = rest;
    }
    if let Some(rest) = sql.strip_suffix("```") {
        sql = rest;
    }
    sql.trim().to_string()
}

/// LLM provider configuration with authentication credentials.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// OpenAI chat completions, or a compatible gateway
    OpenAI {
        /// API key (sk-...)
        api_key:  String,
        /// Model identifier (e.g., "gpt-4")
        model:    String,
        /// Chat-completions URL
        endpoint: String
    },
    /// Anthropic API (Claude models)
    Anthropic {
        /// API key
        api_key: String,
        /// Model identifier (e.g., "claude-sonnet-4-20250514")
        model:   String
    },
    /// Local Ollama instance
    Ollama {
        /// Base URL (e.g., "http://localhost:11434")
        base_url: String,
        /// Model name (e.g., "llama3.2", "codellama")
        model:    String
    }
}

impl LlmProvider {
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI {
                model, ..
            }
            | Self::Anthropic {
                model, ..
            }
            | Self::Ollama {
                model, ..
            } => model
        }
    }
}

/// Sampling and transport settings shared by every provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Upper bound on one HTTP call
    pub timeout:     Duration,
    pub temperature: f32,
    pub max_tokens:  u32
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            timeout:     Duration::from_secs(30),
            temperature: 0.1,
            max_tokens:  500
        }
    }
}

/// HTTP client for LLM API communication.
///
/// Handles provider-specific request formatting and response parsing.
pub struct LlmClient {
    provider: LlmProvider,
    client:   reqwest::Client,
    options:  GenerationOptions
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role:    &'a str,
    content: &'a str
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model:       &'a str,
    messages:    Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens:  u32
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: ResponseMessage
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model:       &'a str,
    system:      &'a str,
    max_tokens:  u32,
    temperature: f32,
    messages:    Vec<ChatMessage<'a>>
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model:    &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream:   bool,
    options:  OllamaOptions
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: ResponseMessage
}

impl LlmClient {
    /// Create a client; the timeout applies to every request
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(provider: LlmProvider, options: GenerationOptions) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| config_error(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            provider,
            client,
            options
        })
    }

    async fn call_openai(
        &self,
        api_key: &str,
        model: &str,
        endpoint: &str,
        prompt: &Prompt
    ) -> EngineResult<String> {
        let request = OpenAIRequest {
            model,
            messages: vec![
                ChatMessage {
                    role:    "system",
                    content: &prompt.system
                },
                ChatMessage {
                    role:    "user",
                    content: &prompt.user
                }
            ],
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens
        };
        let response = self
            .client
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "OpenAI API error {}: {}",
                status, text
            )));
        }
        let result: OpenAIResponse = response.json().await.map_err(http_error)?;
        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| llm_api_error("Empty response from OpenAI"))
    }

    async fn call_anthropic(&self, api_key: &str, model: &str, prompt: &Prompt) -> EngineResult<String> {
        let request = AnthropicRequest {
            model,
            system: &prompt.system,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            messages: vec![ChatMessage {
                role:    "user",
                content: &prompt.user
            }]
        };
        let response = self
            .client
            .post(ANTHROPIC_ENDPOINT)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "Anthropic API error {}: {}",
                status, text
            )));
        }
        let result: AnthropicResponse = response.json().await.map_err(http_error)?;
        result
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| llm_api_error("Empty response from Anthropic"))
    }

    async fn call_ollama(&self, base_url: &str, model: &str, prompt: &Prompt) -> EngineResult<String> {
        let request = OllamaRequest {
            model,
            messages: vec![
                ChatMessage {
                    role:    "system",
                    content: &prompt.system
                },
                ChatMessage {
                    role:    "user",
                    content: &prompt.user
                }
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.options.temperature,
                num_predict: self.options.max_tokens
            }
        };
        let url = format!("{}/api/chat", base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "Ollama API error {}: {}",
                status, text
            )));
        }
        let result: OllamaResponse = response.json().await.map_err(http_error)?;
        Ok(result.message.content)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, prompt: &Prompt) -> EngineResult<String> {
        debug!(model = self.provider.model(), "requesting SQL completion");
        match &self.provider {
            LlmProvider::OpenAI {
                api_key,
                model,
                endpoint
            } => self.call_openai(api_key, model, endpoint, prompt).await,
            LlmProvider::Anthropic {
                api_key,
                model
            } => self.call_anthropic(api_key, model, prompt).await,
            LlmProvider::Ollama {
                base_url,
                model
            } => self.call_ollama(base_url, model, prompt).await
        }
    }
}
