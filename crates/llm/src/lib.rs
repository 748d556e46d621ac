pub mod http;
pub mod traits;

pub use http::{HttpLlmClient, NullLlmClient};
pub use traits::{GenerationRequest, GenerationResponse, LlmCapability, LlmClient};

use std::sync::Arc;

use ll_domain::config::Config;

/// Builds the configured LLM client from the process config. Absent an API
/// key this returns the null client, so callers never need to branch on
/// whether an LLM is configured — only on what `capability()` reports.
pub fn client_from_config(config: &Config) -> Arc<dyn LlmClient> {
    match (&config.llm_api_key, &config.llm_model) {
        (Some(key), Some(model)) => Arc::new(HttpLlmClient::new(
            "https://api.openai.com/v1".to_string(),
            key.clone(),
            model.clone(),
        )),
        _ => Arc::new(NullLlmClient),
    }
}
