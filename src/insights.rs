// Corpus-level aggregations over labeled and topic-annotated posts.
//
// Everything here is a pure function of its input rows; the terminal and
// markdown renderers decide how to show it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate};
use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use stop_words::{get, LANGUAGE};

use crate::models::{LabeledItem, TopicRow};

pub const COMMON_WORDS: usize = 20;
pub const WORD_PAIRS: usize = 30;
pub const DISTINCTIVE_TERMS: usize = 15;

/// Posts per calendar day (UTC), oldest first.
pub fn posts_per_day(rows: &[LabeledItem]) -> Vec<(NaiveDate, usize)> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for row in rows {
        if let Some(dt) = DateTime::from_timestamp(row.created_utc.trunc() as i64, 0) {
            *days.entry(dt.date_naive()).or_insert(0) += 1;
        }
    }
    days.into_iter().collect()
}

/// Posts per subreddit, most active first.
pub fn posts_per_subreddit(rows: &[LabeledItem]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.subreddit.as_str()).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(s, c)| (s.to_string(), c))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Share of each subreddit's posts labeled as problems, highest first.
pub fn problem_rate_by_subreddit(rows: &[LabeledItem]) -> Vec<(String, f64)> {
    let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
    for row in rows {
        let entry = tally.entry(row.subreddit.as_str()).or_insert((0, 0));
        entry.1 += 1;
        if row.problem_signal {
            entry.0 += 1;
        }
    }
    let mut rates: Vec<(String, f64)> = tally
        .into_iter()
        .map(|(s, (problems, total))| (s.to_string(), problems as f64 / total as f64))
        .collect();
    rates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rates
}

/// Most frequent words across problem posts. Equal counts keep first-seen order.
pub fn common_problem_words(rows: &[LabeledItem], n: usize) -> Vec<(String, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows.iter().filter(|r| r.problem_signal) {
        for word in row.clean_text.split_whitespace() {
            let count = counts.entry(word).or_insert(0);
            if *count == 0 {
                order.push(word);
            }
            *count += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|w| (w.to_string(), counts[w]))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Terms that stand out in problem posts, by TF-IDF across those posts.
pub fn distinctive_terms(rows: &[LabeledItem], n: usize) -> Vec<(String, f32)> {
    let docs: Vec<String> = rows
        .iter()
        .filter(|r| r.problem_signal && !r.clean_text.is_empty())
        .map(|r| r.clean_text.clone())
        .collect();
    if docs.is_empty() {
        return Vec::new();
    }
    let stop_words: Vec<String> = get(LANGUAGE::English);
    let params = TfIdfParams::UnprocessedDocuments(&docs, &stop_words, None);
    TfIdf::new(params).get_ranked_word_scores(n)
}

/// Posts per topic keyword string, most common first. Ties keep first-seen order.
pub fn topic_frequency(rows: &[TopicRow]) -> Vec<(String, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let count = counts.entry(row.topic_keywords.as_str()).or_insert(0);
        if *count == 0 {
            order.push(row.topic_keywords.as_str());
        }
        *count += 1;
    }
    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|k| (k.to_string(), counts[k]))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Monthly (`YYYY-MM`) post counts for the topic with this keyword string.
pub fn topic_trend(rows: &[TopicRow], topic_keywords: &str) -> Vec<(String, usize)> {
    let mut months: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.topic_keywords == topic_keywords) {
        if let Some(dt) = DateTime::from_timestamp(row.created_utc.trunc() as i64, 0) {
            *months.entry(dt.format("%Y-%m").to_string()).or_insert(0) += 1;
        }
    }
    months.into_iter().collect()
}

/// Word pairs that appear together in the most posts.
///
/// Each post contributes each pair of its distinct words once, with the pair
/// in alphabetical order.
pub fn word_pairs(rows: &[LabeledItem], n: usize) -> Vec<((String, String), usize)> {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for row in rows {
        let words: Vec<&str> = row
            .clean_text
            .split_whitespace()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        for (i, a) in words.iter().enumerate() {
            for b in &words[i + 1..] {
                *counts.entry((*a, *b)).or_insert(0) += 1;
            }
        }
    }
    let mut ranked: Vec<((String, String), usize)> = counts
        .into_iter()
        .map(|((a, b), c)| ((a.to_string(), b.to_string()), c))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

/// Month-by-month volume of one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicTrend {
    pub topic_id: usize,
    pub topic_keywords: String,
    /// (`YYYY-MM`, posts), oldest month first
    pub months: Vec<(String, usize)>,
}

impl TopicTrend {
    /// Trend of the topic with this id, if any row carries it.
    pub fn for_topic(rows: &[TopicRow], topic_id: usize) -> Option<Self> {
        let keywords = &rows.iter().find(|r| r.topic_id == topic_id)?.topic_keywords;
        Some(Self {
            topic_id,
            topic_keywords: keywords.clone(),
            months: topic_trend(rows, keywords),
        })
    }

    /// Trend of the topic with the most posts.
    pub fn busiest(rows: &[TopicRow]) -> Option<Self> {
        let (keywords, _) = topic_frequency(rows).into_iter().next()?;
        let topic_id = rows.iter().find(|r| r.topic_keywords == keywords)?.topic_id;
        Some(Self {
            topic_id,
            months: topic_trend(rows, &keywords),
            topic_keywords: keywords,
        })
    }
}

/// Every aggregation at once, for the `insights` command and the report.
#[derive(Debug, Clone)]
pub struct Insights {
    pub total_posts: usize,
    pub problem_posts: usize,
    pub posts_per_day: Vec<(NaiveDate, usize)>,
    pub posts_per_subreddit: Vec<(String, usize)>,
    pub problem_rates: Vec<(String, f64)>,
    pub common_words: Vec<(String, usize)>,
    pub distinctive_terms: Vec<(String, f32)>,
    pub word_pairs: Vec<((String, String), usize)>,
    /// Empty when topic assignments haven't been written yet
    pub topic_frequency: Vec<(String, usize)>,
    /// The busiest topic's trend unless a topic was picked
    pub topic_trend: Option<TopicTrend>,
}

impl Insights {
    pub fn compute(labeled: &[LabeledItem], topics: &[TopicRow]) -> Self {
        Self {
            total_posts: labeled.len(),
            problem_posts: labeled.iter().filter(|r| r.problem_signal).count(),
            posts_per_day: posts_per_day(labeled),
            posts_per_subreddit: posts_per_subreddit(labeled),
            problem_rates: problem_rate_by_subreddit(labeled),
            common_words: common_problem_words(labeled, COMMON_WORDS),
            distinctive_terms: distinctive_terms(labeled, DISTINCTIVE_TERMS),
            word_pairs: word_pairs(labeled, WORD_PAIRS),
            topic_frequency: topic_frequency(topics),
            topic_trend: TopicTrend::busiest(topics),
        }
    }

    /// Show the trend of `topic_id` instead of the busiest topic. Unknown ids
    /// keep the current trend.
    pub fn focus_topic(&mut self, topics: &[TopicRow], topic_id: usize) {
        if let Some(trend) = TopicTrend::for_topic(topics, topic_id) {
            self.topic_trend = Some(trend);
        }
    }
}
