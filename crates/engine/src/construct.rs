use std::collections::HashMap;

use ll_domain::models::{
    ClozeExercise, Difficulty, ExerciseSource, Flashcard, GrammarExercise, Mistake,
    SentenceBuilderExercise,
};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::normalize::NormalizedSentence;
use crate::sentences::SentenceItem;
use crate::vocabulary::VocabItem;

fn difficulty_for(word: &str) -> Difficulty {
    match word.chars().count() {
        0..=5 => Difficulty::Beginner,
        6..=8 => Difficulty::Intermediate,
        _ => Difficulty::Advanced,
    }
}

fn find_example_sentence(term: &str, preferred: &[SentenceItem], fallback: &[NormalizedSentence]) -> String {
    let lower = term.to_lowercase();
    if let Some(s) = preferred.iter().find(|s| s.text.to_lowercase().contains(&lower)) {
        return s.text.clone();
    }
    if let Some(s) = fallback.iter().find(|s| s.text.to_lowercase().contains(&lower)) {
        return s.text.clone();
    }
    format!("I learned the word \"{term}\" today.")
}

pub fn build_flashcards(
    vocab: &[VocabItem],
    taught: &[SentenceItem],
    all_sentences: &[NormalizedSentence],
    translations: &HashMap<String, Option<String>>,
) -> Vec<Flashcard> {
    vocab
        .iter()
        .map(|v| Flashcard {
            word: v.word.clone(),
            translation: translations.get(&v.word).cloned().flatten(),
            example_sentence: find_example_sentence(&v.word, taught, all_sentences),
            category: v.definition.clone(),
            difficulty: difficulty_for(&v.word),
        })
        .collect()
}

fn mutate_last_letter(word: &str, shift: u8) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    if let Some(last) = chars.last_mut() {
        if last.is_ascii_lowercase() {
            let shifted = ((*last as u8 - b'a' + 1 + shift) % 26) + b'a';
            *last = shifted as char;
        } else if last.is_ascii_uppercase() {
            let shifted = ((*last as u8 - b'A' + 1 + shift) % 26) + b'A';
            *last = shifted as char;
        }
    }
    chars.into_iter().collect()
}

/// Builds three distractors for `answer`: prefers the student's own
/// incorrect form, then lexical neighbors from the vocabulary pool of
/// similar length, then synthesized near-misses so the list is always
/// exactly three items, all distinct from each other and the answer.
pub(crate) fn generate_distractors(
    answer: &str,
    vocab_pool: &[String],
    incorrect_form: Option<&str>,
    rng: &mut impl Rng,
) -> Vec<String> {
    let answer_lower = answer.to_lowercase();
    let mut candidates: Vec<String> = Vec::new();

    if let Some(incorrect) = incorrect_form {
        if incorrect.to_lowercase() != answer_lower && incorrect.chars().all(|c| c.is_alphabetic()) {
            candidates.push(incorrect.to_string());
        }
    }

    let mut pool_matches: Vec<String> = vocab_pool
        .iter()
        .filter(|w| {
            w.to_lowercase() != answer_lower
                && w.chars().all(|c| c.is_alphabetic())
                && w.len().abs_diff(answer.len()) <= 3
        })
        .cloned()
        .collect();
    pool_matches.sort();
    pool_matches.shuffle(rng);
    candidates.extend(pool_matches);

    candidates.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());
    candidates.retain(|c| c.to_lowercase() != answer_lower);
    candidates.truncate(3);

    let mut shift = 1u8;
    while candidates.len() < 3 {
        let synthesized = mutate_last_letter(answer, shift);
        shift = shift.wrapping_add(3);
        if synthesized.to_lowercase() != answer_lower
            && !candidates.iter().any(|c| c.to_lowercase() == synthesized.to_lowercase())
        {
            candidates.push(synthesized);
        }
        if shift > 100 {
            break;
        }
    }

    candidates.truncate(3);
    candidates
}

fn find_sentence_with_token<'a>(token: &str, sentences: &'a [NormalizedSentence]) -> Option<&'a str> {
    let lower = token.to_lowercase();
    sentences
        .iter()
        .find(|s| {
            s.text
                .split(|c: char| !c.is_alphanumeric() && c != '\'')
                .any(|w| w.to_lowercase() == lower)
        })
        .map(|s| s.text.as_str())
}

fn blank_first_match(sentence: &str, token: &str) -> Option<String> {
    let lower_sentence = sentence.to_lowercase();
    let lower_token = token.to_lowercase();
    let words: Vec<&str> = sentence.split(' ').collect();
    let mut out = Vec::with_capacity(words.len());
    let mut blanked = false;
    for word in &words {
        let bare: String = word
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '\'')
            .collect();
        if !blanked && bare.to_lowercase() == lower_token {
            out.push("____".to_string());
            blanked = true;
        } else {
            out.push(word.to_string());
        }
    }
    if blanked {
        Some(out.join(" "))
    } else if lower_sentence.contains(&lower_token) {
        Some(lower_sentence.replacen(&lower_token, "____", 1))
    } else {
        None
    }
}

pub fn build_cloze(
    sentences: &[NormalizedSentence],
    vocab: &[VocabItem],
    mistakes: &[Mistake],
    vocab_pool: &[String],
    rng: &mut impl Rng,
    target_count: usize,
) -> Vec<ClozeExercise> {
    let mut out = Vec::new();

    let mut targets: Vec<(String, Option<String>)> = mistakes
        .iter()
        .map(|m| (m.correct.clone(), Some(m.incorrect.clone())))
        .collect();
    targets.extend(vocab.iter().map(|v| (v.word.clone(), None)));

    for (target, incorrect) in targets {
        if out.len() >= target_count {
            break;
        }
        let Some(sentence) = find_sentence_with_token(&target, sentences) else {
            continue;
        };
        let Some(with_blank) = blank_first_match(sentence, &target) else {
            continue;
        };

        let mut distractors = generate_distractors(&target, vocab_pool, incorrect.as_deref(), rng);
        let mut options = vec![target.clone()];
        options.append(&mut distractors);
        options.shuffle(rng);
        let correct_index = options.iter().position(|o| o == &target).unwrap_or(0);

        out.push(ClozeExercise {
            sentence_with_blank: with_blank,
            options,
            correct_index,
            explanation: format!("The correct word is \"{target}\"."),
        });
    }

    out
}

pub fn build_grammar(
    mistakes: &[Mistake],
    sentences: &[NormalizedSentence],
    vocab_pool: &[String],
    rng: &mut impl Rng,
    target_count: usize,
) -> Vec<GrammarExercise> {
    let mut out = Vec::new();

    for mistake in mistakes {
        if out.len() >= target_count {
            break;
        }
        let prompt = match find_sentence_with_token(&mistake.correct, sentences)
            .and_then(|s| blank_first_match(s, &mistake.correct))
        {
            Some(p) => p,
            None => format!("____ (correct form of \"{}\")", mistake.incorrect),
        };

        let mut distractors = generate_distractors(&mistake.correct, vocab_pool, Some(&mistake.incorrect), rng);
        if !distractors.iter().any(|d| d.to_lowercase() == mistake.incorrect.to_lowercase()) {
            distractors.pop();
            distractors.insert(0, mistake.incorrect.clone());
        }
        let mut options = vec![mistake.correct.clone()];
        options.extend(distractors);
        options.truncate(4);
        while options.len() < 4 {
            options.push(mutate_last_letter(&mistake.correct, options.len() as u8));
        }
        options.shuffle(rng);
        let correct_index = options
            .iter()
            .position(|o| o.to_lowercase() == mistake.correct.to_lowercase())
            .unwrap_or(0);

        out.push(GrammarExercise {
            prompt,
            options,
            correct_index,
            explanation: format!(
                "\"{}\" is incorrect here; the correct form is \"{}\".",
                mistake.incorrect, mistake.correct
            ),
        });
    }

    out
}

fn tokenize_preserving_punctuation(sentence: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in sentence.split(' ') {
        if word.is_empty() {
            continue;
        }
        let trailing_punct: String = word
            .chars()
            .rev()
            .take_while(|c| matches!(c, '.' | ',' | '?' | '!'))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let core_len = word.len() - trailing_punct.len();
        let core = &word[..core_len];
        if !core.is_empty() {
            tokens.push(core.to_string());
        }
        for punct in trailing_punct.chars() {
            tokens.push(punct.to_string());
        }
    }
    tokens
}

pub fn build_sentence_builder(
    taught: &[SentenceItem],
    sentence_translations: &HashMap<String, Option<String>>,
    vocab_pool: &[String],
    rng: &mut impl Rng,
    target_count: usize,
) -> Vec<SentenceBuilderExercise> {
    taught
        .iter()
        .take(target_count)
        .map(|s| {
            let sentence_tokens = tokenize_preserving_punctuation(&s.text);

            let mut distractor_pool: Vec<String> = vocab_pool
                .iter()
                .filter(|w| !sentence_tokens.iter().any(|t| t.eq_ignore_ascii_case(w)))
                .cloned()
                .collect();
            distractor_pool.shuffle(rng);
            distractor_pool.truncate(2);

            let translation = sentence_translations.get(&s.text).cloned().flatten();

            SentenceBuilderExercise {
                english_sentence: s.text.clone(),
                sentence_tokens,
                distractors: if distractor_pool.is_empty() {
                    None
                } else {
                    Some(distractor_pool)
                },
                translation,
            }
        })
        .collect()
}
