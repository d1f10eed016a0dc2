// Clustering stage: TF-IDF → 2D layout + k-means → problem_clusters.csv.
//
// The layout is for plotting only; k-means runs on the TF-IDF rows, so
// cluster ids describe vocabulary overlap rather than screen proximity.

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

use crate::cluster::embed::UmapLayout;
use crate::cluster::kmeans::KMeans;
use crate::config::{Paths, PipelineSettings};
use crate::models::ClusterPoint;
use crate::store::tables::{read_headers, read_table, write_clusters};
use crate::topics::tfidf::{to_dense, TfIdfVectorizer};

use super::input_missing;

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub documents: usize,
    /// Posts per cluster id
    pub sizes: Vec<usize>,
}

/// The columns clustering needs; everything else in the labeled CSV is ignored.
#[derive(Debug, Deserialize)]
struct ClusterInput {
    #[serde(default)]
    title: String,
    #[serde(default)]
    clean_text: String,
}

/// Lay out and cluster cleaned texts. Returns one point per text.
pub fn cluster_texts(
    titles: &[String],
    texts: &[String],
    settings: &PipelineSettings,
) -> Result<Vec<ClusterPoint>> {
    let (tfidf, rows) =
        TfIdfVectorizer::for_clustering(settings.cluster_max_features).fit_transform(texts)?;
    let dense = to_dense(&rows, tfidf.n_features());

    let layout = UmapLayout::new(settings.seed).fit(&dense);
    let fit = KMeans::new(settings.n_clusters, settings.seed).fit(&dense)?;

    Ok(layout
        .into_iter()
        .zip(fit.labels)
        .zip(titles.iter().zip(texts))
        .map(|(((x, y), cluster), (title, text))| ClusterPoint {
            x,
            y,
            cluster,
            title: title.clone(),
            clean_text: text.clone(),
        })
        .collect())
}

pub fn run(paths: &Paths, settings: &PipelineSettings) -> Result<Option<ClusterSummary>> {
    let input = paths.labeled();
    if input_missing(&input, "Run `innomine label` first.") {
        return Ok(None);
    }

    if !read_headers(&input)?.iter().any(|h| h == "clean_text") {
        println!(
            "{} has no clean_text column. Re-run `innomine label`.",
            input.display()
        );
        return Ok(None);
    }

    let rows: Vec<ClusterInput> = read_table(&input, &["clean_text"])?;
    // Posts whose text cleaned down to nothing still get a point (a zero row)
    let (titles, texts): (Vec<String>, Vec<String>) =
        rows.into_iter().map(|r| (r.title, r.clean_text)).unzip();

    if texts.iter().all(|t| t.trim().is_empty()) {
        println!("No cleaned text to cluster in {}.", input.display());
        return Ok(None);
    }

    let points = cluster_texts(&titles, &texts, settings)?;
    write_clusters(&paths.clusters(), &points)?;

    let k = points.iter().map(|p| p.cluster + 1).max().unwrap_or(0);
    let mut sizes = vec![0; k];
    for p in &points {
        sizes[p.cluster] += 1;
    }

    info!(documents = points.len(), clusters = k, "Clustering complete");
    println!(
        "Clustered {} posts into {} groups; saved to {}",
        points.len(),
        k,
        paths.clusters().display()
    );

    Ok(Some(ClusterSummary {
        documents: points.len(),
        sizes,
    }))
}
