use unicode_segmentation::UnicodeSegmentation;

/// A sentence that survived length filtering, trimmed of surrounding
/// whitespace and any leading speaker label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSentence {
    pub text: String,
}

/// Strips a leading `"Speaker Name: "` label from one line, if present.
/// Labels are short (under 40 chars), contain no sentence-ending
/// punctuation before the colon, and are followed by a space.
fn strip_speaker_prefix(line: &str) -> &str {
    if let Some(colon_idx) = line.find(':') {
        let label = &line[..colon_idx];
        let rest = line[colon_idx + 1..].trim_start();
        if !label.is_empty()
            && label.len() <= 40
            && !label.contains(['.', '?', '!'])
            && label.chars().next().map(|c| c.is_alphabetic()).unwrap_or(false)
        {
            return rest;
        }
    }
    line
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits normalized text into sentence candidates using a punctuation-aware
/// splitter, then drops anything outside `[min_chars, max_chars]`.
pub fn normalize_and_split(
    transcript: &str,
    min_chars: usize,
    max_chars: usize,
) -> Vec<NormalizedSentence> {
    let mut sentences = Vec::new();

    for paragraph in transcript.split('\n') {
        let stripped = strip_speaker_prefix(paragraph);
        let collapsed = collapse_whitespace(stripped);
        if collapsed.is_empty() {
            continue;
        }

        for candidate in split_into_sentences(&collapsed) {
            let trimmed = candidate.trim();
            let char_count = trimmed.chars().count();
            if trimmed.is_empty() || char_count < min_chars || char_count > max_chars {
                continue;
            }
            sentences.push(NormalizedSentence {
                text: trimmed.to_string(),
            });
        }
    }

    sentences
}

/// Splits on sentence-ending punctuation (`.`, `?`, `!`) while keeping the
/// punctuation attached to the sentence it closes. Does not attempt
/// abbreviation detection — this is a pipeline pre-filter, not a full NLP
/// sentence boundary detector.
fn split_into_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for grapheme in text.graphemes(true) {
        current.push_str(grapheme);
        if matches!(grapheme, "." | "?" | "!") {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.trim().is_empty() {
        out.push(current);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_speaker_labels() {
        assert_eq!(
            strip_speaker_prefix("Teacher: How are you today?"),
            "How are you today?"
        );
        assert_eq!(strip_speaker_prefix("No colon here"), "No colon here");
    }

    #[test]
    fn rejects_sentences_outside_bounds() {
        let transcript = "Teacher: Hi.\nStudent: I am learning English very well every single day with my tutor today.";
        let sentences = normalize_and_split(transcript, 12, 280);
        assert!(sentences.iter().all(|s| s.text.chars().count() >= 12));
        assert!(sentences.iter().any(|s| s.text.contains("learning English")));
    }

    #[test]
    fn collapses_internal_whitespace() {
        let transcript = "Teacher:   I    think   this   sentence   has   extra   spaces   everywhere.";
        let sentences = normalize_and_split(transcript, 12, 280);
        assert_eq!(sentences.len(), 1);
        assert!(!sentences[0].text.contains("  "));
    }
}
