//! Groq LLM provider via the OpenAI-compatible chat completions API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::llm::{LlmProvider, Prompt};
use super::retry::retry_request;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Client for Groq-hosted chat models (llama-3.1-8b-instant by default)
pub struct GroqClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_retries: u32,
}

impl GroqClient {
    /// Create from LLM configuration, reading the key from `api_key_env`.
    ///
    /// A missing key is not an error here: the client still builds and every
    /// completion fails with a configuration error instead.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Self::with_api_key(config, config.api_key())
    }

    /// Create with an explicit API key
    pub fn with_api_key(config: &LlmConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if api_key.is_none() {
            tracing::warn!(
                "{} is not set; questions will fail until it is provided",
                config.api_key_env
            );
        }
        tracing::info!("Groq client configured: endpoint={}, model={}", base_url, config.model);

        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::config(format!(
                "{} is not set. Export your Groq API key before asking questions.",
                self.api_key_env
            ))
        })
    }

    async fn send(&self, api_key: &str, prompt: &Prompt) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.user,
        });

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("Groq request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(Error::llm(format!("Groq returned HTTP {}: {}", status, message)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse Groq response: {}", e)))?;

        if let Some(usage) = &chat_response.usage {
            tracing::debug!("Groq completion used {} tokens", usage.total_tokens);
        }

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::llm("Groq response contained no choices"))?;
        choice
            .message
            .content
            .ok_or_else(|| Error::llm("Groq response contained no message content"))
    }
}

#[async_trait]
impl LlmProvider for GroqClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let api_key = self.api_key()?;
        retry_request(self.max_retries, "Groq completion", || self.send(api_key, prompt)).await
    }

    async fn health_check(&self) -> Result<bool> {
        let Ok(api_key) = self.api_key() else {
            return Ok(false);
        };

        match self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::debug!("Groq health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
