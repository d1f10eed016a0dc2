// CSV artifacts: labeled posts, ranked summary, topic assignments, clusters.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ensure_parent;
use crate::models::{ClusterPoint, LabeledItem, RankedRow, TopicRow};

/// Columns every reader of the labeled CSV depends on.
pub const LABELED_COLUMNS: &[&str] = &[
    "clean_text",
    "problem_signal",
    "subreddit",
    "title",
    "text",
    "created_utc",
];

pub const RANKED_COLUMNS: &[&str] = &[
    "Rank",
    "Score",
    "Upvotes",
    "Comments",
    "Title",
    "Top Comment",
    "Signals",
    "URL",
];

/// Appended to the ranked summary by the topic modeler.
pub const TOPIC_COLUMNS: &[&str] = &["topic_id", "topic", "topic_keywords"];

pub const TOPIC_ROW_COLUMNS: &[&str] = &["title", "clean_text", "topic_id", "topic_keywords"];

pub const CLUSTER_COLUMNS: &[&str] = &["x", "y", "cluster", "title"];

/// Serialize rows to a CSV file with a header taken from the field names.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read a CSV file after checking that the required columns are present.
pub fn read_table<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "{} is missing required column(s): {}",
            path.display(),
            missing.join(", ")
        );
    }

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<T>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let row = record.with_context(|| format!("{}: bad row at line {}", path.display(), i + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

/// The header names of a CSV file.
pub fn read_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(reader.headers()?.iter().map(|h| h.to_string()).collect())
}

/// Count data rows without deserializing them.
pub fn count_rows(path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}

pub fn write_labeled(path: &Path, rows: &[LabeledItem]) -> Result<()> {
    write_table(path, rows)
}

pub fn read_labeled(path: &Path) -> Result<Vec<LabeledItem>> {
    read_table(path, LABELED_COLUMNS)
}

/// Write the ranked summary. Topic columns are included only once some row
/// carries a topic, so the ranker's output has exactly the summary columns.
pub fn write_ranked(path: &Path, rows: &[RankedRow]) -> Result<()> {
    ensure_parent(path)?;
    let with_topics = rows.iter().any(|r| r.topic_id.is_some());

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut header: Vec<&str> = RANKED_COLUMNS.to_vec();
    if with_topics {
        header.extend_from_slice(TOPIC_COLUMNS);
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.rank.to_string(),
            format!("{:?}", row.score),
            row.upvotes.to_string(),
            row.comments.to_string(),
            row.title.clone(),
            row.top_comment.clone(),
            row.signals.clone(),
            row.url.clone(),
        ];
        if with_topics {
            record.push(row.topic_id.map(|t| t.to_string()).unwrap_or_default());
            record.push(row.topic.clone().unwrap_or_default());
            record.push(row.topic_keywords.clone().unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn read_ranked(path: &Path) -> Result<Vec<RankedRow>> {
    read_table(path, RANKED_COLUMNS)
}

pub fn write_topic_rows(path: &Path, rows: &[TopicRow]) -> Result<()> {
    write_table(path, rows)
}

pub fn read_topic_rows(path: &Path) -> Result<Vec<TopicRow>> {
    read_table(path, TOPIC_ROW_COLUMNS)
}

pub fn write_clusters(path: &Path, points: &[ClusterPoint]) -> Result<()> {
    write_table(path, points)
}

pub fn read_clusters(path: &Path) -> Result<Vec<ClusterPoint>> {
    read_table(path, CLUSTER_COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_are_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labeled.csv");
        std::fs::write(&path, "title,text\nhello,world\n").unwrap();

        let err = read_labeled(&path).unwrap_err().to_string();
        assert!(err.contains("clean_text"), "{err}");
        assert!(err.contains("problem_signal"), "{err}");
        assert!(!err.contains("title,"), "{err}");
    }

    #[test]
    fn test_labeled_accepts_capitalized_booleans() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labeled.csv");
        std::fs::write(
            &path,
            "subreddit,title,text,created_utc,clean_text,problem_signal\n\
             rust,a,b,1.5,alpha beta,True\n\
             rust,c,d,2,gamma,False\n",
        )
        .unwrap();

        let rows = read_labeled(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].problem_signal);
        assert!(!rows[1].problem_signal);
        assert_eq!(rows[1].created_utc, 2.0);
    }
}
