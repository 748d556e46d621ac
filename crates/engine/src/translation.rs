use ll_domain::trace::TraceEvent;
use ll_llm::{GenerationRequest, LlmCapability, LlmClient};

/// Translates one term to `target_lang`. Returns `None` if the LLM is
/// unavailable or the call fails — callers must treat that as "leave the
/// field empty and flag `translation_present=false`", never as an error.
pub async fn translate_term(
    summary_id: i64,
    llm: &dyn LlmClient,
    term: &str,
    target_lang: &str,
) -> Option<String> {
    if llm.capability() != LlmCapability::Available {
        return None;
    }

    let request = GenerationRequest {
        system_prompt: format!(
            "Translate the given English word or phrase to {target_lang}. Respond with only the \
             translation, no explanation."
        ),
        user_prompt: term.to_string(),
        max_tokens: 64,
    };

    match llm.generate(request).await {
        Ok(response) => {
            let trimmed = response.text.trim();
            if trimmed.is_empty() {
                TraceEvent::EngineFallback {
                    summary_id,
                    stage: "translation".to_string(),
                    reason: format!("llm returned an empty translation for {term:?}"),
                }
                .emit();
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(e) => {
            TraceEvent::EngineFallback {
                summary_id,
                stage: "translation".to_string(),
                reason: e.to_string(),
            }
            .emit();
            None
        }
    }
}
