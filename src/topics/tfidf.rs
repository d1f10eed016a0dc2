// TF-IDF document-term matrix.
//
// Each post is one document. Terms are lowercase runs of two or more word
// characters. Vocabulary pruning happens here in two passes, document-frequency
// bounds first and then an optional cap on the vocabulary size by total term
// count. The pruned documents then go through aprender's TfidfVectorizer, and
// its columns are remapped onto the vocabulary sorted alphabetically so column
// order is stable for a given corpus. Every row is L2-normalized.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Result;
use aprender::text::tokenize::WhitespaceTokenizer;
use aprender::text::vectorize::TfidfVectorizer as WeightedVectorizer;
use regex_lite::Regex;
use tracing::debug;

use crate::text::clean::stop_words;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// A sparse document row: (column index, weight), sorted by column.
pub type SparseRow = Vec<(usize, f64)>;

/// A document-frequency bound, either absolute or relative to corpus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DocFrequency {
    Count(usize),
    Proportion(f64),
}

impl DocFrequency {
    fn resolve(self, n_docs: usize) -> f64 {
        match self {
            DocFrequency::Count(c) => c as f64,
            DocFrequency::Proportion(p) => p * n_docs as f64,
        }
    }
}

/// Vectorizer settings. `fit` produces a [`FittedTfIdf`].
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    /// Drop terms in more documents than this
    pub max_df: DocFrequency,
    /// Drop terms in fewer documents than this
    pub min_df: DocFrequency,
    /// Keep only the most frequent terms
    pub max_features: Option<usize>,
    pub remove_stop_words: bool,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self {
            max_df: DocFrequency::Proportion(1.0),
            min_df: DocFrequency::Count(1),
            max_features: None,
            remove_stop_words: false,
        }
    }
}

impl TfIdfVectorizer {
    /// Settings for topic modeling: drop near-ubiquitous and one-off terms.
    pub fn for_topics() -> Self {
        Self {
            max_df: DocFrequency::Proportion(0.95),
            min_df: DocFrequency::Count(2),
            max_features: None,
            remove_stop_words: true,
        }
    }

    /// Settings for clustering: keep the corpus vocabulary, capped in size.
    pub fn for_clustering(max_features: usize) -> Self {
        Self {
            max_features: Some(max_features),
            ..Self::default()
        }
    }

    /// Learn the vocabulary and idf weights from a corpus.
    pub fn fit(&self, docs: &[String]) -> Result<FittedTfIdf> {
        Ok(self.fit_transform(docs)?.0)
    }

    /// Fit on a corpus and return its weighted rows.
    pub fn fit_transform(&self, docs: &[String]) -> Result<(FittedTfIdf, Vec<SparseRow>)> {
        if docs.is_empty() {
            anyhow::bail!("Cannot fit TF-IDF on an empty corpus");
        }

        let n_docs = docs.len();
        let tokenized: Vec<Vec<String>> = docs
            .iter()
            .map(|d| tokenize(d, self.remove_stop_words))
            .collect();
        let vocabulary = self.prune(&tokenized)?;
        let index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        // Only vocabulary terms reach the weighting step
        let pruned: Vec<String> = tokenized
            .iter()
            .map(|tokens| {
                tokens
                    .iter()
                    .filter(|t| index.contains_key(t.as_str()))
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        let mut weighted =
            WeightedVectorizer::new().with_tokenizer(Box::new(WhitespaceTokenizer::new()));
        let matrix = weighted
            .fit_transform(&pruned)
            .map_err(|e| anyhow::anyhow!("TF-IDF weighting failed: {e}"))?;

        // Column of the weighting matrix -> column in `vocabulary`
        let mut column: Vec<Option<usize>> = vec![None; matrix.n_cols()];
        let mut idf = vec![1.0; vocabulary.len()];
        let idf_values = weighted.idf_values();
        for (term, source) in weighted.vocabulary().iter() {
            let Some(&target) = index.get(term.as_str()) else {
                continue;
            };
            if let Some(slot) = column.get_mut(*source) {
                *slot = Some(target);
            }
            if let Some(&value) = idf_values.get(*source) {
                idf[target] = value;
            }
        }

        let rows: Vec<SparseRow> = (0..matrix.n_rows())
            .map(|r| {
                let mut row: SparseRow = column
                    .iter()
                    .copied()
                    .enumerate()
                    .filter_map(|(c, target)| {
                        let weight = matrix.get(r, c);
                        target.filter(|_| weight != 0.0).map(|t| (t, weight))
                    })
                    .collect();
                row.sort_by_key(|&(col, _)| col);
                normalize(&mut row);
                row
            })
            .collect();

        debug!(vocabulary = vocabulary.len(), docs = n_docs, "Fitted TF-IDF");

        let fitted = FittedTfIdf {
            vocabulary,
            index,
            idf,
            remove_stop_words: self.remove_stop_words,
        };
        Ok((fitted, rows))
    }

    /// Apply the document-frequency bounds and the size cap, returning the
    /// surviving terms alphabetically.
    fn prune(&self, tokenized: &[Vec<String>]) -> Result<Vec<String>> {
        let n_docs = tokenized.len();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut term_freq: HashMap<&str, usize> = HashMap::new();

        for tokens in tokenized {
            let mut seen: Vec<&str> = Vec::new();
            for token in tokens {
                *term_freq.entry(token.as_str()).or_insert(0) += 1;
                if !seen.contains(&token.as_str()) {
                    seen.push(token.as_str());
                    *doc_freq.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        let max_doc = self.max_df.resolve(n_docs);
        let min_doc = self.min_df.resolve(n_docs);
        if max_doc < min_doc {
            anyhow::bail!(
                "max_df allows fewer documents ({max_doc}) than min_df requires ({min_doc})"
            );
        }

        let mut kept: Vec<&str> = doc_freq
            .into_iter()
            .filter(|(_, df)| (*df as f64) >= min_doc && (*df as f64) <= max_doc)
            .map(|(term, _)| term)
            .collect();

        if let Some(limit) = self.max_features {
            // Most frequent first; alphabetical among equals
            kept.sort_by(|a, b| {
                let fa = term_freq.get(a).copied().unwrap_or(0);
                let fb = term_freq.get(b).copied().unwrap_or(0);
                fb.cmp(&fa).then_with(|| a.cmp(b))
            });
            kept.truncate(limit);
        }

        if kept.is_empty() {
            anyhow::bail!(
                "After pruning, no terms remain in a corpus of {n_docs} documents. \
                 Try collecting more posts."
            );
        }

        kept.sort_unstable();
        Ok(kept.into_iter().map(str::to_string).collect())
    }
}

/// A vocabulary with its idf weights.
pub struct FittedTfIdf {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
    remove_stop_words: bool,
}

impl FittedTfIdf {
    /// Terms in column order (alphabetical).
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn transform(&self, docs: &[String]) -> Vec<SparseRow> {
        docs.iter().map(|d| self.transform_one(d)).collect()
    }

    /// Weight one document against the fitted vocabulary. Unknown terms are ignored.
    pub fn transform_one(&self, doc: &str) -> SparseRow {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in tokenize(doc, self.remove_stop_words) {
            if let Some(&col) = self.index.get(&token) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(col, count)| (col, count as f64 * self.idf[col]))
            .filter(|&(_, w)| w != 0.0)
            .collect();
        row.sort_by_key(|&(col, _)| col);
        normalize(&mut row);
        row
    }
}

/// Expand sparse rows into dense vectors of `n_features` columns.
pub fn to_dense(rows: &[SparseRow], n_features: usize) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| {
            let mut dense = vec![0.0; n_features];
            for &(col, w) in row {
                dense[col] = w;
            }
            dense
        })
        .collect()
}

fn tokenize(doc: &str, remove_stop_words: bool) -> Vec<String> {
    let lower = doc.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|term| !(remove_stop_words && stop_words().contains(*term)))
        .map(str::to_string)
        .collect()
}

fn normalize(row: &mut SparseRow) {
    let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_is_sorted_and_rows_normalized() {
        let corpus = docs(&["zeta alpha alpha", "beta zeta", "alpha beta gamma"]);
        let (fitted, rows) = TfIdfVectorizer::default().fit_transform(&corpus).unwrap();
        assert_eq!(fitted.vocabulary(), &["alpha", "beta", "gamma", "zeta"]);

        for row in &rows {
            let norm: f64 = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_document_frequency_bounds() {
        let corpus = docs(&["kafka shared once", "kafka shared", "kafka docker", "kafka docker"]);
        let vectorizer = TfIdfVectorizer {
            max_df: DocFrequency::Proportion(0.95),
            min_df: DocFrequency::Count(2),
            ..TfIdfVectorizer::default()
        };
        let fitted = vectorizer.fit(&corpus).unwrap();
        // kafka is in every document, "once" in only one
        assert_eq!(fitted.vocabulary(), &["docker", "shared"]);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let corpus = docs(&["rust rust rust go", "rust go zig", "zig"]);
        let fitted = TfIdfVectorizer::for_clustering(2).fit(&corpus).unwrap();
        // rust=4, go=2, zig=2 → rust plus go (alphabetical tie-break)
        assert_eq!(fitted.vocabulary(), &["go", "rust"]);
    }

    #[test]
    fn test_rarer_terms_weigh_more() {
        let corpus = docs(&["common rare", "common", "common"]);
        let (fitted, rows) = TfIdfVectorizer::default().fit_transform(&corpus).unwrap();
        let common = fitted.vocabulary().iter().position(|t| t == "common").unwrap();
        let rare = fitted.vocabulary().iter().position(|t| t == "rare").unwrap();
        let weight = |col: usize| {
            rows[0]
                .iter()
                .find(|(c, _)| *c == col)
                .map(|&(_, w)| w)
                .unwrap_or(0.0)
        };
        assert!(weight(rare) > weight(common));
    }

    #[test]
    fn test_weights_land_on_the_document_terms() {
        let corpus = docs(&["zulu alpha", "mike", "alpha mike"]);
        let (fitted, rows) = TfIdfVectorizer::default().fit_transform(&corpus).unwrap();
        let column = |term: &str| fitted.vocabulary().iter().position(|t| t == term).unwrap();

        let cols = |row: &SparseRow| row.iter().map(|(c, _)| *c).collect::<Vec<_>>();
        assert_eq!(cols(&rows[0]), vec![column("alpha"), column("zulu")]);
        assert_eq!(cols(&rows[1]), vec![column("mike")]);
        let projected = fitted.transform_one("alpha mike");
        assert_eq!(cols(&projected), cols(&rows[2]));
        for ((_, a), (_, b)) in projected.iter().zip(&rows[2]) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_vocabulary_fails() {
        let corpus = docs(&["one", "two"]);
        let result = TfIdfVectorizer::for_topics().fit(&corpus);
        assert!(result.is_err());
    }
}
