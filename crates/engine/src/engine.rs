use std::collections::HashMap;
use std::sync::Arc;

use ll_domain::error::Result;
use ll_domain::models::{ExerciseCounts, ExerciseMetadata, ExerciseSource, ExercisesDocument};
use ll_llm::LlmClient;

use crate::config::EngineConfig;
use crate::determinism::rng_for_summary;
use crate::quality::{self, QualityInputs};
use crate::{construct, construct_pad, mistakes, normalize, sentences, translation, vocabulary};

/// Converts raw transcripts into structured, quality-scored exercise sets.
///
/// Every stage prefers an LLM-backed path and falls back to a deterministic
/// heuristic whenever the LLM is unavailable, rate-limited, or returns
/// something the pipeline can't parse — the engine always returns a
/// complete [`ExercisesDocument`], never an error, for any non-empty input.
pub struct Engine {
    llm: Arc<dyn LlmClient>,
}

impl Engine {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn generate(&self, summary_id: i64, transcript: &str, config: &EngineConfig) -> Result<ExercisesDocument> {
        let mut rng = rng_for_summary(summary_id);

        let normalized = normalize::normalize_and_split(
            transcript,
            config.min_sentence_chars,
            config.max_sentence_chars,
        );

        let vocab = vocabulary::extract(summary_id, self.llm.as_ref(), &normalized, config.n_vocab).await;
        let vocab_source = aggregate_source(vocab.iter().map(|v| v.source));
        let vocab_pool: Vec<String> = vocab.iter().map(|v| v.word.clone()).collect();

        let taught = sentences::extract(summary_id, self.llm.as_ref(), &normalized, &vocab, config.n_sent).await;
        let sentence_source = aggregate_source(taught.iter().map(|s| s.source));

        let extracted_mistakes = mistakes::extract(transcript);

        let mut flashcard_translations: HashMap<String, Option<String>> = HashMap::new();
        let mut sentence_translations: HashMap<String, Option<String>> = HashMap::new();
        let translation_enabled = config.translation_target_language.is_some();

        if let Some(target_lang) = &config.translation_target_language {
            for item in &vocab {
                let translated =
                    translation::translate_term(summary_id, self.llm.as_ref(), &item.word, target_lang).await;
                flashcard_translations.insert(item.word.clone(), translated);
            }
            for item in &taught {
                let translated =
                    translation::translate_term(summary_id, self.llm.as_ref(), &item.text, target_lang).await;
                sentence_translations.insert(item.text.clone(), translated);
            }
        }

        let flashcards = construct::build_flashcards(&vocab, &taught, &normalized, &flashcard_translations);

        let mut cloze = construct::build_cloze(
            &normalized,
            &vocab,
            &extracted_mistakes,
            &vocab_pool,
            &mut rng,
            config.windows.cloze.max,
        );
        let mut grammar = construct::build_grammar(
            &extracted_mistakes,
            &normalized,
            &vocab_pool,
            &mut rng,
            config.windows.grammar.max,
        );
        let mut sentence = construct::build_sentence_builder(
            &taught,
            &sentence_translations,
            &vocab_pool,
            &mut rng,
            config.windows.sentence.max,
        );

        // Sanitize first so the hard-floor check operates on the final counts.
        let flashcards_before = flashcards.len();
        let flashcards: Vec<_> = flashcards
            .into_iter()
            .filter(crate::sanitize::flashcard_valid)
            .collect();
        cloze.retain(crate::sanitize::cloze_valid);
        grammar.retain(crate::sanitize::grammar_valid);
        sentence.retain(crate::sanitize::sentence_builder_valid);

        let mut sanitization_dropped_any = flashcards.len() < flashcards_before;

        let counts_before = ExerciseCounts {
            flashcards: flashcards.len(),
            cloze: cloze.len(),
            grammar: grammar.len(),
            sentence: sentence.len(),
        };

        for below in quality::below_hard_floor(&counts_before) {
            sanitization_dropped_any = true;
            match below {
                "cloze" => {
                    let needed = quality::HARD_FLOOR - cloze.len();
                    let mut padded = construct_pad::pad_cloze(&vocab_pool, &vocab_pool, &mut rng, needed);
                    padded.retain(crate::sanitize::cloze_valid);
                    cloze.extend(padded);
                }
                "grammar" => {
                    let needed = quality::HARD_FLOOR - grammar.len();
                    let mut padded = construct_pad::pad_grammar(&vocab_pool, &vocab_pool, &mut rng, needed);
                    padded.retain(crate::sanitize::grammar_valid);
                    grammar.extend(padded);
                }
                "sentence" => {
                    let needed = quality::HARD_FLOOR - sentence.len();
                    let mut padded = construct_pad::pad_sentence_builder(&vocab_pool, needed);
                    padded.retain(crate::sanitize::sentence_builder_valid);
                    sentence.extend(padded);
                }
                _ => {}
            }
        }

        let counts = ExerciseCounts {
            flashcards: flashcards.len(),
            cloze: cloze.len(),
            grammar: grammar.len(),
            sentence: sentence.len(),
        };

        let translation_present = translation_enabled
            && flashcard_translations.values().any(|t| t.is_some());
        let translation_coverage = if flashcards.is_empty() {
            0.0
        } else {
            flashcards.iter().filter(|f| f.translation.is_some()).count() as f64 / flashcards.len() as f64
        };

        let score = quality::score(&QualityInputs {
            counts,
            windows: config.windows,
            translation_coverage,
            mistake_derived_present: !extracted_mistakes.is_empty(),
            sanitization_dropped_any,
        });

        let metadata = ExerciseMetadata {
            quality_passed: score >= config.quality_min,
            quality_score: score,
            vocabulary_count: vocab.len(),
            sentences_count: taught.len(),
            translation_present,
            flashcards_source: vocab_source,
            cloze_source: ExerciseSource::Heuristic,
            grammar_source: ExerciseSource::Heuristic,
            sentence_source,
        };

        Ok(ExercisesDocument {
            flashcards,
            cloze,
            grammar,
            sentence,
            counts,
            metadata,
        })
    }
}

fn aggregate_source(sources: impl Iterator<Item = ExerciseSource>) -> ExerciseSource {
    let mut saw_llm = false;
    let mut saw_any = false;
    for s in sources {
        saw_any = true;
        if s == ExerciseSource::Llm {
            saw_llm = true;
        }
    }
    if saw_any && saw_llm {
        ExerciseSource::Llm
    } else {
        ExerciseSource::Heuristic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ll_llm::NullLlmClient;

    fn sample_transcript() -> &'static str {
        "Teacher: Today we will practice vocabulary and grammar together.\n\
         Student: I goed to the market yesterday and buyed some apples.\n\
         Teacher: correct: went\n\
         Teacher: correct: bought\n\
         Student: The weather was nice and sunny all afternoon.\n\
         Teacher: should be warmer, but that is alright for today.\n\
         Student: I really enjoy learning new vocabulary every single day.\n\
         Teacher: That sentence is grammatically correct and well structured.\n\
         Student: My favorite subject is grammar because it helps my writing.\n\
         Teacher: Grammar practice will continue to improve your fluency steadily."
    }

    #[tokio::test]
    async fn produces_a_complete_document_without_an_llm() {
        let engine = Engine::new(Arc::new(NullLlmClient));
        let config = EngineConfig::default();
        let doc = engine.generate(42, sample_transcript(), &config).await.unwrap();
        assert!(doc.counts.flashcards > 0 || doc.metadata.vocabulary_count == 0);
        assert_eq!(doc.metadata.flashcards_source, ExerciseSource::Heuristic);
    }

    #[tokio::test]
    async fn is_deterministic_given_a_fixed_seed() {
        let engine = Engine::new(Arc::new(NullLlmClient));
        let config = EngineConfig::default();
        let a = engine.generate(7, sample_transcript(), &config).await.unwrap();
        let b = engine.generate(7, sample_transcript(), &config).await.unwrap();
        assert_eq!(a.counts.flashcards, b.counts.flashcards);
        assert_eq!(
            a.flashcards.iter().map(|f| f.word.clone()).collect::<Vec<_>>(),
            b.flashcards.iter().map(|f| f.word.clone()).collect::<Vec<_>>()
        );
    }
}
