use async_trait::async_trait;
use ll_domain::error::Result;

/// Advertised readiness of an LLM backend. The engine consults this before
/// every stage and routes to its heuristic fallback unless the answer is
/// `Available` — a rate-limited or unreachable provider never blocks the
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmCapability {
    Available,
    RateLimited,
    Unavailable,
}

/// A single free-form generation request. The engine always asks for plain
/// text and parses it itself — there is no tool-calling or streaming surface
/// here, only what the exercise pipeline needs.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub text: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, req: GenerationRequest) -> Result<GenerationResponse>;

    fn capability(&self) -> LlmCapability;

    fn provider_id(&self) -> &str;
}
