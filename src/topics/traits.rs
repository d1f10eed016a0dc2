// Topic modeler trait.
//
// The pipeline only needs "fit a corpus, then ask for assignments", so the
// factorization behind it can change without touching the topic stage.

use anyhow::Result;
use tracing::info;

use super::model::TopicModel;
use super::nmf::Nmf;
use super::tfidf::TfIdfVectorizer;

pub trait TopicModeler {
    /// Fit a model on cleaned document texts.
    fn fit(&self, docs: &[String]) -> Result<TopicModel>;
}

/// TF-IDF followed by NMF with a fixed component count and seed.
pub struct NmfTopicModeler {
    pub n_topics: usize,
    pub n_top_words: usize,
    pub seed: u64,
    pub vectorizer: TfIdfVectorizer,
}

impl NmfTopicModeler {
    pub fn new(n_topics: usize, n_top_words: usize, seed: u64) -> Self {
        Self {
            n_topics,
            n_top_words,
            seed,
            vectorizer: TfIdfVectorizer::for_topics(),
        }
    }
}

impl TopicModeler for NmfTopicModeler {
    fn fit(&self, docs: &[String]) -> Result<TopicModel> {
        if self.n_topics == 0 {
            anyhow::bail!("Topic count must be at least 1");
        }

        let (tfidf, rows) = self.vectorizer.fit_transform(docs)?;
        let factors = Nmf::new(self.n_topics, self.seed).fit(&rows, tfidf.n_features());

        info!(
            docs = docs.len(),
            vocabulary = tfidf.n_features(),
            topics = self.n_topics,
            iterations = factors.n_iter,
            "Fitted topic model"
        );

        Ok(TopicModel::new(tfidf, factors, self.n_top_words, self.seed))
    }
}
