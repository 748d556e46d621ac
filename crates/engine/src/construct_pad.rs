//! Relaxed second-pass construction. Invoked only when a type's count
//! falls below [`crate::quality::HARD_FLOOR`] after the primary pass —
//! guarantees the engine always returns a usable set even on a sparse or
//! repetitive transcript.

use ll_domain::models::{ClozeExercise, GrammarExercise, SentenceBuilderExercise};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::construct::generate_distractors;

pub fn pad_cloze(words: &[String], vocab_pool: &[String], rng: &mut impl Rng, needed: usize) -> Vec<ClozeExercise> {
    words
        .iter()
        .take(needed)
        .map(|word| {
            let mut options = vec![word.clone()];
            options.extend(generate_distractors(word, vocab_pool, None, rng));
            options.shuffle(rng);
            let correct_index = options.iter().position(|o| o == word).unwrap_or(0);
            ClozeExercise {
                sentence_with_blank: "I want to practice the word ____ in a sentence.".to_string(),
                options,
                correct_index,
                explanation: format!("The correct word is \"{word}\"."),
            }
        })
        .collect()
}

pub fn pad_grammar(words: &[String], vocab_pool: &[String], rng: &mut impl Rng, needed: usize) -> Vec<GrammarExercise> {
    words
        .iter()
        .take(needed)
        .map(|word| {
            let mut options = vec![word.clone()];
            options.extend(generate_distractors(word, vocab_pool, None, rng));
            options.shuffle(rng);
            let correct_index = options.iter().position(|o| o == word).unwrap_or(0);
            GrammarExercise {
                prompt: "Choose the word that best completes the sentence: I really enjoy learning new ____.".to_string(),
                options,
                correct_index,
                explanation: format!("\"{word}\" fits the sentence grammatically and semantically."),
            }
        })
        .collect()
}

pub fn pad_sentence_builder(words: &[String], needed: usize) -> Vec<SentenceBuilderExercise> {
    words
        .iter()
        .take(needed)
        .map(|word| {
            let sentence = format!("I like the word {word}.");
            let sentence_tokens = sentence
                .trim_end_matches('.')
                .split(' ')
                .map(str::to_string)
                .chain(std::iter::once(".".to_string()))
                .collect();
            SentenceBuilderExercise {
                english_sentence: sentence,
                sentence_tokens,
                distractors: None,
                translation: None,
            }
        })
        .collect()
}
