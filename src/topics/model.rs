// A fitted topic model: the TF-IDF vocabulary plus the NMF factors.
//
// Lives only for the duration of one run; nothing is persisted, so topic ids
// from two runs are unrelated.

use super::nmf::{argmax, NmfFit};
use super::tfidf::FittedTfIdf;
use crate::models::TopicAssignment;

/// Iterations used when projecting unseen documents onto fixed topics.
const TRANSFORM_ITER: usize = 200;

pub struct TopicModel {
    tfidf: FittedTfIdf,
    factors: NmfFit,
    keywords: Vec<String>,
    seed: u64,
}

impl TopicModel {
    pub fn new(tfidf: FittedTfIdf, factors: NmfFit, n_top_words: usize, seed: u64) -> Self {
        let keywords = (0..factors.h.len())
            .map(|topic| {
                top_terms(&factors.h[topic], tfidf.vocabulary(), n_top_words)
                    .into_iter()
                    .map(|(term, _)| term)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect();

        Self {
            tfidf,
            factors,
            keywords,
            seed,
        }
    }

    pub fn n_topics(&self) -> usize {
        self.factors.h.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.tfidf.n_features()
    }

    pub fn reconstruction_err(&self) -> f64 {
        self.factors.reconstruction_err
    }

    /// The keyword string of every topic, indexed by topic id.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn topic_keywords(&self, topic_id: usize) -> &str {
        self.keywords.get(topic_id).map(String::as_str).unwrap_or("")
    }

    /// Dominant topic of each document the model was fitted on, in corpus order.
    pub fn assignments(&self) -> Vec<TopicAssignment> {
        self.factors
            .w
            .iter()
            .map(|row| self.assignment(argmax(row)))
            .collect()
    }

    /// Project an unseen document onto the fitted topics.
    pub fn assign(&self, text: &str) -> TopicAssignment {
        let row = self.tfidf.transform_one(text);
        let weights = self.factors.transform(&[row], TRANSFORM_ITER, self.seed);
        let topic = weights.first().map(|w| argmax(w)).unwrap_or(0);
        self.assignment(topic)
    }

    fn assignment(&self, topic_id: usize) -> TopicAssignment {
        TopicAssignment {
            topic_id,
            topic_keywords: self.topic_keywords(topic_id).to_string(),
        }
    }
}

/// The `n` highest-weighted terms of one topic row, heaviest first.
/// Equal weights keep vocabulary order.
pub fn top_terms(weights: &[f64], vocabulary: &[String], n: usize) -> Vec<(String, f64)> {
    let mut order: Vec<usize> = (0..weights.len().min(vocabulary.len())).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));
    order
        .into_iter()
        .take(n)
        .map(|i| (vocabulary[i].clone(), weights[i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_terms_orders_by_weight() {
        let vocab: Vec<String> = ["alpha", "beta", "gamma", "delta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let top = top_terms(&[0.1, 0.9, 0.5, 0.5], &vocab, 3);
        let terms: Vec<&str> = top.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(terms, vec!["beta", "gamma", "delta"]);
    }

    #[test]
    fn test_top_terms_shorter_than_n() {
        let vocab = vec!["only".to_string()];
        assert_eq!(top_terms(&[0.3], &vocab, 10).len(), 1);
    }
}
