// Problem-signal labeling.
//
// A post is labeled a problem when it mentions one of the label keywords AND
// its sentiment is not clearly positive. Requiring both keeps "help, this
// library is great!" style posts out of the positive class.

use super::keywords::KeywordSet;
use super::sentiment::PolarityEstimator;

pub struct ProblemLabeler {
    keywords: KeywordSet,
    estimator: Box<dyn PolarityEstimator>,
    /// Polarity must be strictly below this
    threshold: f64,
}

impl ProblemLabeler {
    pub fn new(keywords: KeywordSet, estimator: Box<dyn PolarityEstimator>, threshold: f64) -> Self {
        Self {
            keywords,
            estimator,
            threshold,
        }
    }

    /// Label the combined title + body text of a post.
    pub fn label(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        if !self.keywords.contains_any(&lower) {
            return false;
        }
        self.estimator.polarity(&lower) < self.threshold
    }
}
