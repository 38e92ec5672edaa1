//! Chat-completion client
//!
//! One request per panic event, no retries. Transport failures surface as
//! [`RemoteCallError`] and the orchestrator decides how to degrade.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Sampling temperature, fixed
const TEMPERATURE: f32 = 0.7;

/// Output length cap, fixed
const MAX_TOKENS: u32 = 800;

const SYSTEM_PROMPT: &str = "You are Sentinel's safety assistant, designed to provide emergency guidance to people in potential danger.

Your responses must be detailed, empathetic, and genuinely helpful, showing understanding of the nuanced dangers people face daily.

EXTREMELY IMPORTANT: Your responses MUST be formatted as valid parseable JSON when requested. Do not add any explanation text before or after the JSON. Only return the exact JSON format specified in the user prompt.

When analyzing threats:
- Prioritize life-threatening situations (weapons, violence indicators)
- Consider environmental context (remote locations, time of day)
- Account for emotional state (fear, distress)
- Provide practical, actionable advice
- Use a reassuring but urgent tone where appropriate

Your advice matters - it could make the difference in someone's safety.";

/// Remote call error types
#[derive(Error, Debug)]
pub enum RemoteCallError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Completion service returned status {0}")]
    Status(u16),

    #[error("Completion response carried no choices")]
    EmptyCompletion,
}

/// Chat service configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Chat-completion endpoint URL
    pub endpoint: String,
    /// Bearer token
    pub api_key: String,
    /// Model identifier
    pub model: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "llama3-70b-8192".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for the remote language-model service
pub struct ChatClient {
    config: ChatConfig,
    http: reqwest::Client,
}

impl ChatClient {
    /// Create a new client
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Send the built prompt and return the raw text of the first
    /// completion choice. Single attempt; any failure is surfaced
    /// immediately.
    pub async fn complete(&self, prompt: &str) -> Result<String, RemoteCallError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteCallError::Status(response.status().as_u16()));
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(RemoteCallError::EmptyCompletion)?;

        debug!(bytes = content.len(), "Completion received");
        Ok(content)
    }
}
