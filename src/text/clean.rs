// Text normalization for modeling.
//
// Lowercase, strip URLs, strip everything that isn't a letter or whitespace,
// split on whitespace, then drop stop words and very short tokens. The output
// is a single space-joined string so it round-trips through CSV unchanged.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;
use stop_words::{get, LANGUAGE};

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").unwrap());
static NON_ALPHA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z\s]").unwrap());
static STOP_WORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    get(LANGUAGE::English)
        .into_iter()
        .map(|w| w.to_lowercase())
        .collect()
});

/// Tokens at or below this length are dropped.
const MIN_TOKEN_LEN: usize = 2;

/// The English stop word set used by the cleaner.
pub fn stop_words() -> &'static HashSet<String> {
    &STOP_WORDS
}

/// Normalize a post's text into space-separated content tokens.
pub fn clean_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lower, "");
    let letters = NON_ALPHA_RE.replace_all(&no_urls, "");

    letters
        .split_whitespace()
        .filter(|token| token.len() > MIN_TOKEN_LEN && !STOP_WORDS.contains(*token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_urls_and_punctuation() {
        let cleaned = clean_text("Kubernetes3 SEGFAULTED!! https://example.com/x?y=1 --");
        assert_eq!(cleaned, "kubernetes segfaulted");
    }

    #[test]
    fn test_drops_stop_words_and_short_tokens() {
        let cleaned = clean_text("I am on it and the webpack compiler is");
        assert_eq!(cleaned, "webpack compiler");
    }

    #[test]
    fn test_problem_vocabulary_survives() {
        let cleaned =
            clean_text("Need help: problem with my code, it keeps working then fails. Any information?");
        assert_eq!(cleaned, "need help problem code keeps working fails information");
        for word in ["problem", "help", "fix", "working", "information"] {
            assert!(!stop_words().contains(word), "{word}");
        }
    }

    #[test]
    fn test_apostrophes_collapse() {
        // Non-letters go before tokenizing, so contractions fuse
        assert_eq!(
            clean_text("kubernetes pod's crashloop"),
            "kubernetes pods crashloop"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   !!! 42 "), "");
    }
}
