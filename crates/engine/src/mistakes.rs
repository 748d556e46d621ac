use std::collections::HashSet;

use ll_domain::models::{Mistake, MistakeType};

const CORRECT_MARKERS: &[&str] = &["correct:", "correction:"];
const SHOULD_BE_MARKERS: &[&str] = &["should be", "should've been", "you mean"];
const MAX_ADJACENCY_WORD_CHARS: usize = 20;

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

fn classify(incorrect: &str, correct: &str) -> MistakeType {
    let inc = incorrect.to_lowercase();
    let cor = correct.to_lowercase();

    if inc.split_whitespace().count() == 1 && cor.split_whitespace().count() == 1 {
        if edit_distance(&inc, &cor) <= 2 && inc.len().abs_diff(cor.len()) <= 2 {
            return MistakeType::Spelling;
        }
        return MistakeType::Vocabulary;
    }
    if inc.split_whitespace().count() == cor.split_whitespace().count() {
        return MistakeType::Grammar;
    }
    MistakeType::Unknown
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        dp[0][j] = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }
    dp[a.len()][b.len()]
}

/// Extracts explicit teacher-correction pairs from the raw transcript.
/// Three patterns are recognized, in order of preference:
///
/// 1. `correct: <text>` / `correction: <text>` — `correct` is the marked
///    text; `incorrect` is the immediately preceding non-empty line.
/// 2. `... should be <text>` — same pairing logic.
/// 3. Adjacency heuristic: a short all-alphabetic line directly followed
///    by a teacher line that quotes a single different word is treated as
///    a one-word correction.
///
/// Operates on the raw (unnormalized) transcript so speaker lines remain
/// intact for adjacency context.
pub fn extract(transcript: &str) -> Vec<Mistake> {
    let lines: Vec<&str> = transcript.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let mut mistakes = Vec::new();
    let mut consumed: HashSet<usize> = HashSet::new();

    for (idx, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();

        let marker_hit = CORRECT_MARKERS.iter().find(|m| lower.contains(**m));
        if let Some(marker) = marker_hit {
            if let Some(pos) = lower.find(*marker) {
                let correct = strip_quotes(&line[pos + marker.len()..]).to_string();
                if let Some(incorrect) = previous_candidate(&lines, idx) {
                    if !correct.is_empty() && correct.to_lowercase() != incorrect.to_lowercase() {
                        let kind = classify(&incorrect, &correct);
                        mistakes.push(Mistake {
                            incorrect,
                            correct,
                            kind,
                            rule: Some("correct: marker".to_string()),
                        });
                        consumed.insert(idx - 1);
                        consumed.insert(idx);
                        continue;
                    }
                }
            }
        }

        if let Some(marker) = SHOULD_BE_MARKERS.iter().find(|m| lower.contains(**m)) {
            if let Some(pos) = lower.find(*marker) {
                let correct = strip_quotes(&line[pos + marker.len()..]).to_string();
                if let Some(incorrect) = previous_candidate(&lines, idx) {
                    if !correct.is_empty() && correct.to_lowercase() != incorrect.to_lowercase() {
                        let kind = classify(&incorrect, &correct);
                        mistakes.push(Mistake {
                            incorrect,
                            correct,
                            kind,
                            rule: Some("should-be marker".to_string()),
                        });
                        consumed.insert(idx - 1);
                        consumed.insert(idx);
                    }
                }
            }
        }
    }

    mistakes.extend(extract_adjacency(&lines, &consumed));
    mistakes
}

/// Marker-free adjacency heuristic: a short all-alphabetic line directly
/// followed by a line that quotes a single different word is treated as a
/// one-word correction (student says a word, teacher echoes the right one
/// back in quotes with no "correct:"/"should be" marker at all).
fn extract_adjacency(lines: &[&str], consumed: &HashSet<usize>) -> Vec<Mistake> {
    let mut mistakes = Vec::new();

    for idx in 0..lines.len().saturating_sub(1) {
        if consumed.contains(&idx) || consumed.contains(&(idx + 1)) {
            continue;
        }

        let Some(incorrect) = single_alpha_word(speaker_content(lines[idx])) else {
            continue;
        };
        let Some(correct) = quoted_single_word(speaker_content(lines[idx + 1])) else {
            continue;
        };
        if correct.eq_ignore_ascii_case(&incorrect) {
            continue;
        }

        let kind = classify(&incorrect, &correct);
        mistakes.push(Mistake {
            incorrect,
            correct,
            kind,
            rule: Some("adjacency heuristic".to_string()),
        });
    }

    mistakes
}

/// Strips a leading `Speaker:` label, matching `previous_candidate`'s logic.
fn speaker_content(line: &str) -> &str {
    match line.find(':') {
        Some(pos) if pos < 40 => &line[pos + 1..],
        _ => line,
    }
}

/// `Some(word)` if the trimmed content is exactly one short alphabetic word.
fn single_alpha_word(content: &str) -> Option<String> {
    let trimmed = content.trim().trim_end_matches(['.', '!', '?']);
    if trimmed.is_empty()
        || trimmed.split_whitespace().count() != 1
        || trimmed.chars().count() > MAX_ADJACENCY_WORD_CHARS
        || !trimmed.chars().all(|c| c.is_alphabetic())
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// `Some(word)` if `content` contains a quoted (`"`, `'`, or backtick)
/// single alphabetic word.
fn quoted_single_word(content: &str) -> Option<String> {
    for quote in ['"', '\'', '`'] {
        let Some(start) = content.find(quote) else { continue };
        let rest = &content[start + quote.len_utf8()..];
        let Some(end) = rest.find(quote) else { continue };
        let inner = rest[..end].trim();
        if !inner.is_empty() && inner.split_whitespace().count() == 1 && inner.chars().all(|c| c.is_alphabetic()) {
            return Some(inner.to_string());
        }
    }
    None
}

/// Walks backward from `idx` for the nearest prior line that looks like a
/// plain utterance rather than another marker line, and returns its final
/// clause as the incorrect form.
fn previous_candidate(lines: &[&str], idx: usize) -> Option<String> {
    if idx == 0 {
        return None;
    }
    let prev = lines[idx - 1];
    let lower = prev.to_lowercase();
    if CORRECT_MARKERS.iter().any(|m| lower.contains(*m))
        || SHOULD_BE_MARKERS.iter().any(|m| lower.contains(*m))
    {
        return None;
    }
    let content = match prev.find(':') {
        Some(pos) if pos < 40 => &prev[pos + 1..],
        _ => prev,
    };
    let trimmed = content.trim().trim_end_matches(['.', '!', '?']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_correct_marker_pair() {
        let transcript = "Student: I goed to the store.\nTeacher: correct: went";
        let mistakes = extract(transcript);
        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].correct, "went");
    }

    #[test]
    fn extracts_should_be_pair() {
        let transcript = "Student: She don't like coffee.\nTeacher: that should be doesn't";
        let mistakes = extract(transcript);
        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].correct, "doesn't");
    }

    #[test]
    fn classifies_single_char_typo_as_spelling() {
        assert_eq!(classify("recieve", "receive"), MistakeType::Spelling);
    }

    #[test]
    fn extracts_marker_free_adjacency_pair() {
        let transcript = "Student: goed\nTeacher: \"went\"";
        let mistakes = extract(transcript);
        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].incorrect, "goed");
        assert_eq!(mistakes[0].correct, "went");
        assert_eq!(mistakes[0].rule.as_deref(), Some("adjacency heuristic"));
    }

    #[test]
    fn adjacency_heuristic_ignores_multi_word_lines() {
        let transcript = "Student: I goed there\nTeacher: \"went\"";
        assert!(extract(transcript).is_empty());
    }

    #[test]
    fn adjacency_heuristic_does_not_double_count_marker_pairs() {
        let transcript = "Student: goed\nTeacher: correct: went";
        let mistakes = extract(transcript);
        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].rule.as_deref(), Some("correct: marker"));
    }
}
