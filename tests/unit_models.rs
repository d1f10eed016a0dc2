// Unit tests for the numeric models: TF-IDF, NMF topics, layout and k-means.
//
// Small synthetic corpora with obvious structure, checked for shape, range
// and determinism rather than exact values.

use innomine::cluster::embed::UmapLayout;
use innomine::cluster::kmeans::KMeans;
use innomine::topics::nmf::Nmf;
use innomine::topics::tfidf::{to_dense, TfIdfVectorizer};
use innomine::topics::traits::{NmfTopicModeler, TopicModeler};

fn corpus() -> Vec<String> {
    [
        "docker container image build fails",
        "docker container network unreachable",
        "docker container volume permission denied",
        "docker image registry push rejected",
        "react component state update loop",
        "react component props undefined",
        "react hook state stale closure",
        "react component render twice",
        "python pandas dataframe merge",
        "python pandas dataframe index",
        "python pandas groupby dataframe",
        "python virtualenv pandas install",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ============================================================
// TF-IDF
// ============================================================

#[test]
fn topic_vectorizer_drops_rare_terms() {
    let fitted = TfIdfVectorizer::for_topics().fit(&corpus()).unwrap();
    let vocab = fitted.vocabulary();
    assert!(vocab.contains(&"docker".to_string()));
    assert!(vocab.contains(&"pandas".to_string()));
    // Only in one document
    assert!(!vocab.contains(&"registry".to_string()));
}

#[test]
fn clustering_vectorizer_caps_vocabulary() {
    let fitted = TfIdfVectorizer::for_clustering(5).fit(&corpus()).unwrap();
    assert_eq!(fitted.n_features(), 5);
}

#[test]
fn unknown_terms_transform_to_empty_row() {
    let fitted = TfIdfVectorizer::for_topics().fit(&corpus()).unwrap();
    assert!(fitted.transform_one("kotlin coroutines").is_empty());
}

#[test]
fn empty_corpus_is_an_error() {
    assert!(TfIdfVectorizer::default().fit(&[]).is_err());
}

// ============================================================
// NMF topic model
// ============================================================

#[test]
fn topic_ids_lie_in_range() {
    let model = NmfTopicModeler::new(3, 10, 42).fit(&corpus()).unwrap();
    assert_eq!(model.n_topics(), 3);
    for a in model.assignments() {
        assert!(a.topic_id < 3);
        assert_eq!(a.topic_keywords, model.topic_keywords(a.topic_id));
    }
}

#[test]
fn topics_group_related_posts() {
    let model = NmfTopicModeler::new(3, 10, 42).fit(&corpus()).unwrap();
    let a = model.assignments();
    // Identical rows after pruning ("merge"/"index" appear once)
    assert_eq!(a[8].topic_id, a[9].topic_id);

    let mut distinct: Vec<usize> = [0, 4, 8].iter().map(|&i| a[i].topic_id).collect();
    distinct.sort();
    distinct.dedup();
    assert!(distinct.len() >= 2, "unrelated posts collapsed into {distinct:?}");
}

#[test]
fn keywords_are_comma_joined_top_terms() {
    let model = NmfTopicModeler::new(3, 4, 42).fit(&corpus()).unwrap();
    for keywords in model.keywords() {
        let terms: Vec<&str> = keywords.split(", ").collect();
        assert!(terms.len() <= 4);
        assert!(terms.iter().all(|t| !t.is_empty()));
    }
}

#[test]
fn topic_model_is_deterministic() {
    let a = NmfTopicModeler::new(3, 10, 42).fit(&corpus()).unwrap();
    let b = NmfTopicModeler::new(3, 10, 42).fit(&corpus()).unwrap();
    assert_eq!(a.assignments(), b.assignments());
    assert_eq!(a.keywords(), b.keywords());
}

#[test]
fn nmf_reduces_reconstruction_error() {
    let (fitted, rows) = TfIdfVectorizer::for_topics().fit_transform(&corpus()).unwrap();
    let short = Nmf {
        max_iter: 1,
        ..Nmf::new(3, 42)
    }
    .fit(&rows, fitted.n_features());
    let long = Nmf::new(3, 42).fit(&rows, fitted.n_features());
    assert!(long.reconstruction_err <= short.reconstruction_err);
}

// ============================================================
// Layout and k-means
// ============================================================

fn dense_corpus() -> Vec<Vec<f64>> {
    let (fitted, rows) = TfIdfVectorizer::for_clustering(500)
        .fit_transform(&corpus())
        .unwrap();
    to_dense(&rows, fitted.n_features())
}

#[test]
fn layout_is_deterministic_and_finite() {
    let data = dense_corpus();
    let a = UmapLayout::new(42).fit(&data);
    let b = UmapLayout::new(42).fit(&data);
    assert_eq!(a.len(), data.len());
    assert_eq!(a, b);
    assert!(a.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
}

#[test]
fn kmeans_labels_lie_in_range_and_repeat() {
    let data = dense_corpus();
    let a = KMeans::new(3, 42).fit(&data).unwrap();
    let b = KMeans::new(3, 42).fit(&data).unwrap();
    assert!(a.labels.iter().all(|&l| l < 3));
    assert_eq!(a.labels, b.labels);
}

#[test]
fn kmeans_more_clusters_than_posts() {
    let data = dense_corpus();
    let fit = KMeans::new(50, 42).fit(&data[..4]).unwrap();
    assert_eq!(fit.n_clusters, 4);
    assert!(fit.labels.iter().all(|&l| l < 4));
}
