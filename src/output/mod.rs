// Output formatting: terminal display and the markdown report.
//
// Presentation never fails on missing inputs. Each artifact that isn't there
// yet becomes a warning and an empty section.

pub mod markdown;
pub mod terminal;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use tracing::warn;

use crate::config::Paths;
use crate::insights::Insights;
use crate::models::{ClusterPoint, RankedRow, TopicRow};
use crate::store::tables::{read_clusters, read_labeled, read_ranked, read_topic_rows};

/// Posts listed per cluster in summaries.
pub const CLUSTER_SAMPLE_TITLES: usize = 3;
pub const CLUSTER_TOP_WORDS: usize = 5;

/// Everything the renderers show, loaded from the stage outputs.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub ranked: Vec<RankedRow>,
    pub topics: Vec<TopicRow>,
    pub clusters: Vec<ClusterPoint>,
    pub insights: Option<Insights>,
}

impl ReportData {
    /// Load whatever stage outputs exist. Missing or unreadable files are
    /// reported and left empty.
    pub fn load(paths: &Paths) -> Self {
        let ranked = load_or_warn(&paths.ranked(), "innomine rank", read_ranked);
        let topics = load_or_warn(&paths.topic_assignments(), "innomine topics", read_topic_rows);
        let clusters = load_or_warn(&paths.clusters(), "innomine cluster", read_clusters);
        let labeled = load_or_warn(&paths.labeled(), "innomine label", read_labeled);

        let insights = if labeled.is_empty() {
            None
        } else {
            Some(Insights::compute(&labeled, &topics))
        };

        Self {
            ranked,
            topics,
            clusters,
            insights,
        }
    }

    /// Point the insights' topic trend at `topic_id`.
    pub fn focus_topic(&mut self, topic_id: usize) {
        if let Some(insights) = &mut self.insights {
            insights.focus_topic(&self.topics, topic_id);
        }
    }

    /// Topic rows, optionally restricted to one topic id.
    pub fn topic_rows(&self, topic_filter: Option<usize>) -> Vec<&TopicRow> {
        self.topics
            .iter()
            .filter(|r| topic_filter.is_none_or(|t| r.topic_id == t))
            .collect()
    }
}

fn load_or_warn<T>(path: &Path, command: &str, read: fn(&Path) -> Result<Vec<T>>) -> Vec<T> {
    if !path.exists() {
        println!(
            "{} {} not found. {}",
            "!".yellow(),
            path.display(),
            format!("Run `{command}` to create it.").dimmed()
        );
        return Vec::new();
    }
    match read(path) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read report input");
            println!("{} Could not read {}: {}", "!".yellow(), path.display(), e);
            Vec::new()
        }
    }
}

/// A topic and how many posts were assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicCount {
    pub topic_id: usize,
    pub topic: String,
    pub keywords: String,
    pub posts: usize,
}

/// Topics by post count, most posts first. Ties go to the lower id.
pub fn topic_counts(rows: &[TopicRow]) -> Vec<TopicCount> {
    let mut by_id: BTreeMap<usize, TopicCount> = BTreeMap::new();
    for row in rows {
        by_id
            .entry(row.topic_id)
            .or_insert_with(|| TopicCount {
                topic_id: row.topic_id,
                topic: row.topic.clone(),
                keywords: row.topic_keywords.clone(),
                posts: 0,
            })
            .posts += 1;
    }
    let mut counts: Vec<TopicCount> = by_id.into_values().collect();
    counts.sort_by(|a, b| b.posts.cmp(&a.posts));
    counts
}

/// One k-means cluster: size, a few titles, and its most frequent words.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    pub sample_titles: Vec<String>,
    pub top_words: Vec<String>,
}

pub fn cluster_summaries(points: &[ClusterPoint]) -> Vec<ClusterSummary> {
    let mut groups: BTreeMap<usize, Vec<&ClusterPoint>> = BTreeMap::new();
    for p in points {
        groups.entry(p.cluster).or_default().push(p);
    }

    groups
        .into_iter()
        .map(|(cluster, members)| {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            let mut order: Vec<&str> = Vec::new();
            for p in &members {
                for word in p.clean_text.split_whitespace() {
                    let c = counts.entry(word).or_insert(0);
                    if *c == 0 {
                        order.push(word);
                    }
                    *c += 1;
                }
            }
            order.sort_by(|a, b| counts[b].cmp(&counts[a]));

            ClusterSummary {
                cluster,
                size: members.len(),
                sample_titles: members
                    .iter()
                    .take(CLUSTER_SAMPLE_TITLES)
                    .map(|p| p.title.clone())
                    .collect(),
                top_words: order
                    .into_iter()
                    .take(CLUSTER_TOP_WORDS)
                    .map(String::from)
                    .collect(),
            }
        })
        .collect()
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like emoji or accented letters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(cluster: usize, title: &str, text: &str) -> ClusterPoint {
        ClusterPoint {
            x: 0.0,
            y: 0.0,
            cluster,
            title: title.to_string(),
            clean_text: text.to_string(),
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_cluster_summaries_group_and_rank_words() {
        let points = vec![
            point(1, "B1", "docker build"),
            point(0, "A1", "react hook"),
            point(1, "B2", "docker compose"),
        ];
        let summaries = cluster_summaries(&points);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].cluster, 0);
        assert_eq!(summaries[1].size, 2);
        assert_eq!(summaries[1].top_words[0], "docker");
        assert_eq!(summaries[1].sample_titles, vec!["B1", "B2"]);
    }
}
