// Sentiment polarity.
//
// The default estimator is VADER's compound score: a valence lexicon of some
// 7,500 words, slang terms and emoticons, with rules for negation, degree
// modifiers and "but" clauses, normalized into [-1, 1]. Texts with no lexicon
// hits score 0.0 (neutral).

use vader_sentiment::SentimentIntensityAnalyzer;

/// Trait for scoring the sentiment polarity of a text.
///
/// Lets the labeler run against a fixed estimator in tests.
pub trait PolarityEstimator: Send + Sync {
    /// Polarity from -1.0 (negative) to 1.0 (positive).
    fn polarity(&self, text: &str) -> f64;
}

/// The default polarity estimator: VADER compound score.
#[derive(Debug, Default, Clone, Copy)]
pub struct VaderPolarity;

impl PolarityEstimator for VaderPolarity {
    fn polarity(&self, text: &str) -> f64 {
        // The analyzer only borrows the crate's shared lexicons
        let analyzer = SentimentIntensityAnalyzer::new();
        analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
            .clamp(-1.0, 1.0)
    }
}
