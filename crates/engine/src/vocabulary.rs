use std::collections::HashMap;

use ll_domain::models::ExerciseSource;
use ll_domain::trace::TraceEvent;
use ll_llm::{GenerationRequest, LlmCapability, LlmClient};
use serde::Deserialize;

use crate::normalize::NormalizedSentence;
use crate::stopwords::is_stopword;

#[derive(Debug, Clone)]
pub struct VocabItem {
    pub word: String,
    pub definition: Option<String>,
    pub source: ExerciseSource,
}

#[derive(Deserialize)]
struct LlmVocabItem {
    word: String,
    #[serde(default)]
    definition: Option<String>,
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Frequency-filtered fallback: counts tokens across all sentences, drops
/// stopwords and very short tokens, and biases toward mid-frequency words
/// (appearing more than once but not dominating the transcript) since
/// those are more likely to be content words worth teaching rather than
/// names or filler repeated once, or extremely common words.
pub fn extract_heuristic(sentences: &[NormalizedSentence], n_vocab: usize) -> Vec<VocabItem> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for sentence in sentences {
        for token in tokenize(&sentence.text) {
            if token.len() < 4 || is_stopword(&token) {
                continue;
            }
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let max_count = counts.values().copied().max().unwrap_or(1);
    let mid_ceiling = (max_count as f64 * 0.8).ceil() as usize;

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| {
        let a_mid = a.1 >= 2 && a.1 <= mid_ceiling;
        let b_mid = b.1 >= 2 && b.1 <= mid_ceiling;
        b_mid.cmp(&a_mid).then(b.1.cmp(&a.1)).then(a.0.cmp(&b.0))
    });

    ranked
        .into_iter()
        .take(n_vocab)
        .map(|(word, _)| VocabItem {
            word,
            definition: None,
            source: ExerciseSource::Heuristic,
        })
        .collect()
}

fn llm_prompt(sentences: &[NormalizedSentence], n_vocab: usize) -> String {
    let joined = sentences
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Extract up to {n_vocab} pedagogically valuable words or short phrases from this \
         language-learning transcript, each with a one-sentence definition suitable for a \
         learner. Respond with a JSON array of objects: [{{\"word\": ..., \"definition\": ...}}].\n\n{joined}"
    )
}

pub async fn extract(
    summary_id: i64,
    llm: &dyn LlmClient,
    sentences: &[NormalizedSentence],
    n_vocab: usize,
) -> Vec<VocabItem> {
    if llm.capability() != LlmCapability::Available {
        return extract_heuristic(sentences, n_vocab);
    }

    let request = GenerationRequest {
        system_prompt: "You extract vocabulary for language learners. Respond with JSON only."
            .to_string(),
        user_prompt: llm_prompt(sentences, n_vocab),
        max_tokens: 1024,
    };

    match llm.generate(request).await {
        Ok(response) => match serde_json::from_str::<Vec<LlmVocabItem>>(response.text.trim()) {
            Ok(items) if !items.is_empty() => items
                .into_iter()
                .take(n_vocab)
                .map(|item| VocabItem {
                    word: item.word.to_lowercase(),
                    definition: item.definition,
                    source: ExerciseSource::Llm,
                })
                .collect(),
            Ok(_) => {
                TraceEvent::EngineFallback {
                    summary_id,
                    stage: "vocabulary".to_string(),
                    reason: "llm returned an empty vocabulary list".to_string(),
                }
                .emit();
                extract_heuristic(sentences, n_vocab)
            }
            Err(e) => {
                TraceEvent::EngineFallback {
                    summary_id,
                    stage: "vocabulary".to_string(),
                    reason: format!("llm response did not parse as json: {e}"),
                }
                .emit();
                extract_heuristic(sentences, n_vocab)
            }
        },
        Err(e) => {
            TraceEvent::EngineFallback {
                summary_id,
                stage: "vocabulary".to_string(),
                reason: e.to_string(),
            }
            .emit();
            extract_heuristic(sentences, n_vocab)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(text: &str) -> NormalizedSentence {
        NormalizedSentence { text: text.to_string() }
    }

    #[test]
    fn heuristic_skips_stopwords_and_short_tokens() {
        let sentences = vec![sentence("The cat sat on the mat with the dog.")];
        let items = extract_heuristic(&sentences, 5);
        assert!(items.iter().all(|i| i.word.len() >= 4));
        assert!(items.iter().all(|i| !is_stopword(&i.word)));
    }

    #[test]
    fn heuristic_is_deterministic() {
        let sentences = vec![sentence("Grammar practice helps learners improve grammar fast.")];
        let a = extract_heuristic(&sentences, 5);
        let b = extract_heuristic(&sentences, 5);
        let words_a: Vec<_> = a.iter().map(|i| i.word.clone()).collect();
        let words_b: Vec<_> = b.iter().map(|i| i.word.clone()).collect();
        assert_eq!(words_a, words_b);
    }
}
