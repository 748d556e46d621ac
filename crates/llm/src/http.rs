use std::time::Duration;

use async_trait::async_trait;
use ll_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::traits::{GenerationRequest, GenerationResponse, LlmCapability, LlmClient};

/// OpenAI-compatible chat-completions client. Most self-hosted and hosted
/// providers (OpenAI itself, Azure OpenAI, vLLM, Ollama's OpenAI shim) speak
/// this wire format, so one adapter covers the common case.
pub struct HttpLlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    capability: std::sync::atomic::AtomicU8,
}

const CAP_AVAILABLE: u8 = 0;
const CAP_RATE_LIMITED: u8 = 1;
const CAP_UNAVAILABLE: u8 = 2;

impl HttpLlmClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client builds with static config");

        Self {
            http,
            base_url,
            api_key,
            model,
            capability: std::sync::atomic::AtomicU8::new(CAP_AVAILABLE),
        }
    }

    fn set_capability(&self, cap: u8) {
        self.capability.store(cap, std::sync::atomic::Ordering::Relaxed);
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn generate(&self, req: GenerationRequest) -> Result<GenerationResponse> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &req.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &req.user_prompt,
                },
            ],
            max_tokens: req.max_tokens,
            temperature: 0.2,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                self.set_capability(CAP_UNAVAILABLE);
                return Err(Error::Timeout(format!("llm request timed out: {e}")));
            }
            Err(e) => {
                self.set_capability(CAP_UNAVAILABLE);
                return Err(Error::Http(format!("llm request failed: {e}")));
            }
        };

        let status = response.status();
        if status.as_u16() == 429 {
            self.set_capability(CAP_RATE_LIMITED);
            return Err(Error::Http("llm provider rate limited".into()));
        }
        if status.is_server_error() {
            self.set_capability(CAP_UNAVAILABLE);
            return Err(Error::Http(format!("llm provider returned {status}")));
        }
        if !status.is_success() {
            return Err(Error::Http(format!("llm provider returned {status}")));
        }

        self.set_capability(CAP_AVAILABLE);

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("llm response decode failed: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Http("llm response had no choices".into()))?;

        Ok(GenerationResponse { text })
    }

    fn capability(&self) -> LlmCapability {
        match self.capability.load(std::sync::atomic::Ordering::Relaxed) {
            CAP_AVAILABLE => LlmCapability::Available,
            CAP_RATE_LIMITED => LlmCapability::RateLimited,
            _ => LlmCapability::Unavailable,
        }
    }

    fn provider_id(&self) -> &str {
        "http-openai-compat"
    }
}

/// Stands in for the LLM client when no API key is configured. Always
/// reports `Unavailable`, which routes every engine stage to its
/// deterministic heuristic fallback.
pub struct NullLlmClient;

#[async_trait]
impl LlmClient for NullLlmClient {
    async fn generate(&self, _req: GenerationRequest) -> Result<GenerationResponse> {
        Err(Error::Other("no llm provider configured".into()))
    }

    fn capability(&self) -> LlmCapability {
        LlmCapability::Unavailable
    }

    fn provider_id(&self) -> &str {
        "null"
    }
}
