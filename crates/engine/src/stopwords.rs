/// A short, hand-picked list of high-frequency function words to exclude
/// from heuristic vocabulary extraction. Not exhaustive — good enough to
/// keep the heuristic path from surfacing "the", "and", "is" as vocabulary.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "so", "to", "of", "in", "on", "at", "by", "for",
    "with", "about", "as", "is", "are", "was", "were", "be", "been", "being", "am", "do", "does",
    "did", "have", "has", "had", "i", "you", "he", "she", "it", "we", "they", "this", "that",
    "these", "those", "my", "your", "his", "her", "its", "our", "their", "me", "him", "us",
    "them", "not", "no", "yes", "very", "just", "also", "can", "could", "will", "would", "should",
    "shall", "may", "might", "must", "then", "than", "there", "here", "what", "when", "where",
    "why", "how", "who", "whom", "which", "ok", "okay", "well", "um", "uh", "like", "get", "got",
    "go", "going", "into", "out", "up", "down", "over", "again", "all", "some", "one", "two",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word.to_lowercase().as_str())
}
