// Data models for the records that flow between pipeline stages.
//
// Each stage reads one of these shapes from disk and writes the next one.
// They live apart from the file readers/writers so scoring and topic code
// can use them without depending on csv or serde_json directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A post as collected from a subreddit. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub subreddit: String,
    pub title: String,
    /// Self-text body; empty for link posts
    #[serde(default)]
    pub text: String,
    /// Creation time in epoch seconds
    pub created_utc: f64,
    #[serde(default)]
    pub url: String,
    /// Net upvotes
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    /// Top-level comment bodies, in the order the source returned them
    #[serde(default)]
    pub comments: Vec<String>,
    /// Source-relative path of the post, used to fetch its comments
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub permalink: String,
}

impl RawItem {
    /// Title and body joined by a space. This is the text the labeler works on.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.text)
    }

    /// Title, body and comments joined; the ranker searches this for signals.
    pub fn full_text(&self) -> String {
        format!("{} {} {}", self.title, self.text, self.comments.join(" "))
    }

    /// The creation time as an RFC 3339 UTC string, or empty if out of range.
    pub fn created_date(&self) -> String {
        created_date(self.created_utc)
    }
}

/// Render epoch seconds as an RFC 3339 UTC timestamp.
pub fn created_date(epoch_secs: f64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_secs.trunc() as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// A cleaned and labeled row of `cleaned_labeled_posts.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledItem {
    pub subreddit: String,
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub created_utc: f64,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub clean_text: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub problem_signal: bool,
}

impl LabeledItem {
    pub fn from_raw(raw: &RawItem, clean_text: String, problem_signal: bool) -> Self {
        Self {
            subreddit: raw.subreddit.clone(),
            title: raw.title.clone(),
            text: raw.text.clone(),
            created_utc: raw.created_utc,
            created_date: raw.created_date(),
            url: raw.url.clone(),
            score: raw.score,
            num_comments: raw.num_comments,
            clean_text,
            problem_signal,
        }
    }
}

/// A raw item that passed the signal threshold, with its ranking score.
///
/// Serialized flat, so a ranked JSON file still reads back as `RawItem`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    #[serde(flatten)]
    pub item: RawItem,
    /// Distinct matched signal keywords, in keyword-list order
    pub problem_signals: Vec<String>,
    pub score_rank: f64,
}

/// One row of the `ranked_problems.csv` summary.
///
/// The topic columns are absent until the topic modeler appends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Upvotes")]
    pub upvotes: i64,
    #[serde(rename = "Comments")]
    pub comments: i64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Top Comment", default)]
    pub top_comment: String,
    #[serde(rename = "Signals", default)]
    pub signals: String,
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(default)]
    pub topic_id: Option<usize>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub topic_keywords: Option<String>,
}

impl RankedRow {
    pub fn set_topic(&mut self, assignment: &TopicAssignment) {
        self.topic_id = Some(assignment.topic_id);
        self.topic = Some(topic_name(assignment.topic_id));
        self.topic_keywords = Some(assignment.topic_keywords.clone());
    }
}

/// The dominant topic of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAssignment {
    pub topic_id: usize,
    /// Top terms of the topic joined by ", "
    pub topic_keywords: String,
}

/// Display name for a topic id, as written to the `topic` column.
pub fn topic_name(topic_id: usize) -> String {
    format!("Topic {topic_id}")
}

/// A labeled row with its topic columns, one row of `topic_assignments.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRow {
    pub subreddit: String,
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub created_utc: f64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub clean_text: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub problem_signal: bool,
    pub topic_id: usize,
    pub topic: String,
    pub topic_keywords: String,
}

impl TopicRow {
    pub fn new(item: &LabeledItem, assignment: &TopicAssignment) -> Self {
        Self {
            subreddit: item.subreddit.clone(),
            title: item.title.clone(),
            text: item.text.clone(),
            created_utc: item.created_utc,
            url: item.url.clone(),
            clean_text: item.clean_text.clone(),
            problem_signal: item.problem_signal,
            topic_id: assignment.topic_id,
            topic: topic_name(assignment.topic_id),
            topic_keywords: assignment.topic_keywords.clone(),
        }
    }
}

/// A document's position in the 2D layout and its k-means cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPoint {
    pub x: f64,
    pub y: f64,
    pub cluster: usize,
    pub title: String,
    #[serde(default)]
    pub clean_text: String,
}

/// Accept the boolean spellings spreadsheets and hand-edited files produce.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "true" | "True" | "TRUE" | "1" => Ok(true),
        "false" | "False" | "FALSE" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean value: {other:?}"
        ))),
    }
}
