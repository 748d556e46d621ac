use std::collections::HashSet;

use ll_domain::models::{ClozeExercise, Flashcard, GrammarExercise, SentenceBuilderExercise};

fn has_double_punctuation(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).any(|w| {
        matches!(w[0], '.' | '!' | '?' | ',') && matches!(w[1], '.' | '!' | '?' | ',')
    })
}

fn has_trailing_whitespace(s: &str) -> bool {
    s != s.trim_end()
}

fn options_valid(options: &[String], correct_index: usize) -> bool {
    if options.is_empty() || correct_index >= options.len() {
        return false;
    }
    if options.iter().any(|o| o.trim().is_empty()) {
        return false;
    }
    let unique: HashSet<String> = options.iter().map(|o| o.to_lowercase()).collect();
    unique.len() == options.len()
}

pub fn flashcard_valid(card: &Flashcard) -> bool {
    !card.word.trim().is_empty()
        && !card.example_sentence.trim().is_empty()
        && !has_double_punctuation(&card.example_sentence)
        && !has_trailing_whitespace(&card.example_sentence)
}

pub fn cloze_valid(item: &ClozeExercise) -> bool {
    if item.sentence_with_blank.trim().is_empty() || item.explanation.trim().is_empty() {
        return false;
    }
    if item.sentence_with_blank.matches("____").count() != 1 {
        return false;
    }
    options_valid(&item.options, item.correct_index)
}

pub fn grammar_valid(item: &GrammarExercise) -> bool {
    if item.prompt.trim().is_empty() || item.explanation.trim().is_empty() {
        return false;
    }
    options_valid(&item.options, item.correct_index)
}

pub fn sentence_builder_valid(item: &SentenceBuilderExercise) -> bool {
    if item.english_sentence.trim().is_empty() || item.sentence_tokens.is_empty() {
        return false;
    }
    if has_double_punctuation(&item.english_sentence) || has_trailing_whitespace(&item.english_sentence) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_options() {
        assert!(!options_valid(&["cat".into(), "cat".into(), "dog".into(), "bird".into()], 0));
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        assert!(!options_valid(&["a".into(), "b".into()], 5));
    }

    #[test]
    fn detects_double_punctuation() {
        assert!(has_double_punctuation("Hello there.."));
        assert!(!has_double_punctuation("Hello there."));
    }
}
