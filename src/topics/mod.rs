// Topic modeling: TF-IDF vectorization and NMF factorization.

pub mod model;
pub mod nmf;
pub mod tfidf;
pub mod traits;
