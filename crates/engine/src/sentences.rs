use ll_domain::models::ExerciseSource;
use ll_domain::trace::TraceEvent;
use ll_llm::{GenerationRequest, LlmCapability, LlmClient};
use serde::Deserialize;

use crate::normalize::NormalizedSentence;
use crate::vocabulary::VocabItem;

#[derive(Debug, Clone)]
pub struct SentenceItem {
    pub text: String,
    pub source: ExerciseSource,
}

#[derive(Deserialize)]
struct LlmSentenceSelection {
    sentences: Vec<String>,
}

/// Sentences that contain at least one extracted vocabulary item, in
/// document order, capped at `n_sent`. Deterministic: no ranking beyond
/// document order.
pub fn extract_heuristic(
    sentences: &[NormalizedSentence],
    vocab: &[VocabItem],
    n_sent: usize,
) -> Vec<SentenceItem> {
    sentences
        .iter()
        .filter(|s| {
            let lower = s.text.to_lowercase();
            vocab.iter().any(|v| lower.contains(&v.word))
        })
        .take(n_sent)
        .map(|s| SentenceItem {
            text: s.text.clone(),
            source: ExerciseSource::Heuristic,
        })
        .collect()
}

fn llm_prompt(sentences: &[NormalizedSentence], n_sent: usize) -> String {
    let joined = sentences
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Select up to {n_sent} of the most \"teachable\" sentences from this transcript — \
         ones useful for demonstrating vocabulary or grammar to a language learner. Respond \
         with JSON: {{\"sentences\": [...]}} using the sentences verbatim.\n\n{joined}"
    )
}

pub async fn extract(
    summary_id: i64,
    llm: &dyn LlmClient,
    sentences: &[NormalizedSentence],
    vocab: &[VocabItem],
    n_sent: usize,
) -> Vec<SentenceItem> {
    if llm.capability() != LlmCapability::Available {
        return extract_heuristic(sentences, vocab, n_sent);
    }

    let request = GenerationRequest {
        system_prompt: "You select teachable sentences for language learners. Respond with JSON only."
            .to_string(),
        user_prompt: llm_prompt(sentences, n_sent),
        max_tokens: 1024,
    };

    match llm.generate(request).await {
        Ok(response) => match serde_json::from_str::<LlmSentenceSelection>(response.text.trim()) {
            Ok(selection) if !selection.sentences.is_empty() => selection
                .sentences
                .into_iter()
                .take(n_sent)
                .map(|text| SentenceItem {
                    text,
                    source: ExerciseSource::Llm,
                })
                .collect(),
            Ok(_) => {
                TraceEvent::EngineFallback {
                    summary_id,
                    stage: "sentences".to_string(),
                    reason: "llm returned an empty sentence selection".to_string(),
                }
                .emit();
                extract_heuristic(sentences, vocab, n_sent)
            }
            Err(e) => {
                TraceEvent::EngineFallback {
                    summary_id,
                    stage: "sentences".to_string(),
                    reason: format!("llm response did not parse as json: {e}"),
                }
                .emit();
                extract_heuristic(sentences, vocab, n_sent)
            }
        },
        Err(e) => {
            TraceEvent::EngineFallback {
                summary_id,
                stage: "sentences".to_string(),
                reason: e.to_string(),
            }
            .emit();
            extract_heuristic(sentences, vocab, n_sent)
        }
    }
}
