use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::scoring::rank::RankWeights;
use crate::text::keywords::KeywordSet;

/// Subreddits the collector scans by default.
pub const DEFAULT_SUBREDDITS: &[&str] = &[
    "learnprogramming",
    "webdev",
    "reactjs",
    "datascience",
    "coding",
    "Python",
    "java",
    "cpp_questions",
    "programming",
    "AskProgramming",
    "machinelearning",
    "computerscience",
    "devops",
    "Frontend",
    "backend",
];

/// A post must contain one of these to be collected at all.
pub const RELEVANCE_KEYWORDS: &[&str] = &[
    "error",
    "issue",
    "stuck",
    "bug",
    "help",
    "can't",
    "frustrated",
    "how do i",
];

/// Keywords the labeler requires (alongside non-positive sentiment).
pub const LABEL_KEYWORDS: &[&str] = &[
    "stuck",
    "error",
    "can't",
    "issue",
    "bug",
    "frustrated",
    "problem",
    "help",
    "how do i",
    "why does",
    "not working",
    "fail",
    "failed",
    "fix",
    "broken",
];

/// Phrases the ranker counts as problem signals.
pub const SIGNAL_KEYWORDS: &[&str] = &[
    "bug",
    "bugs",
    "error",
    "errors",
    "issue",
    "issues",
    "crash",
    "crashes",
    "failing",
    "failed",
    "broken",
    "glitch",
    "freeze",
    "lag",
    "not working",
    "unexpected",
    "unresponsive",
    "slow",
    "timeout",
    "disconnect",
    "stuck",
    "how do i",
    "how can i",
    "can't seem",
    "need help",
    "missing feature",
    "not saving",
    "won’t load",
    "fails silently",
    "confused",
    "struggling",
    "doesn't respond",
    "login issue",
    "network error",
    "compile error",
    "runtime error",
    "api fail",
    "authentication error",
    "memory leak",
    "db not syncing",
    "token expired",
    "rate limited",
    "invalid",
    "no output",
    "wrong output",
    "missing",
    "won’t build",
    "crashing",
    "segfault",
    "infinite loop",
    "syntax error",
    "logic bug",
    "loop doesn't end",
    "stack overflow",
    "environment issue",
    "version conflict",
    "ci error",
    "deployment error",
    "cors issue",
    "ssl error",
    "authorization denied",
    "index out of range",
];

pub const DEFAULT_USER_AGENT: &str = "innomine/0.1 (developer-pain-point-scanner)";

/// Where each stage reads and writes its files.
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Paths {
    pub fn new(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Collector output; overwritten by the ranker with the qualifying set.
    pub fn raw_data(&self) -> PathBuf {
        self.data_dir.join("raw_data.json")
    }

    pub fn labeled(&self) -> PathBuf {
        self.data_dir.join("cleaned_labeled_posts.csv")
    }

    pub fn ranked(&self) -> PathBuf {
        self.output_dir.join("ranked_problems.csv")
    }

    pub fn topic_assignments(&self) -> PathBuf {
        self.output_dir.join("topic_assignments.csv")
    }

    pub fn clusters(&self) -> PathBuf {
        self.output_dir.join("problem_clusters.csv")
    }

    pub fn report(&self) -> PathBuf {
        self.output_dir.join("innomine-report.md")
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new("data", "output")
    }
}

/// Knobs for every stage. Defaults match the stock keyword lists and
/// model sizes; tests inject small keyword sets through here.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub subreddits: Vec<String>,
    /// Recency window for collected posts
    pub days_limit: i64,
    pub limit_per_sub: usize,
    /// Top-level comments fetched per kept post (0 disables)
    pub comments_per_post: usize,
    pub relevance_keywords: KeywordSet,
    pub label_keywords: KeywordSet,
    pub signal_keywords: KeywordSet,
    /// Labeler requires polarity strictly below this
    pub polarity_threshold: f64,
    /// Distinct signals needed to qualify for ranking
    pub min_signals: usize,
    pub rank_weights: RankWeights,
    /// Rows in the ranked summary
    pub top_n: usize,
    pub n_topics: usize,
    pub n_top_words: usize,
    pub n_clusters: usize,
    /// Vocabulary cap for the clustering TF-IDF
    pub cluster_max_features: usize,
    pub seed: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            subreddits: DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect(),
            days_limit: 30,
            limit_per_sub: 100,
            comments_per_post: 5,
            relevance_keywords: KeywordSet::new(RELEVANCE_KEYWORDS.iter().copied()),
            label_keywords: KeywordSet::new(LABEL_KEYWORDS.iter().copied()),
            signal_keywords: KeywordSet::new(SIGNAL_KEYWORDS.iter().copied()),
            polarity_threshold: 0.1,
            min_signals: 2,
            rank_weights: RankWeights::default(),
            top_n: 15,
            n_topics: 10,
            n_top_words: 10,
            n_clusters: 5,
            cluster_max_features: 500,
            seed: 42,
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// Reddit credentials are optional: without them the collector uses the
/// public JSON listings. The .env file is loaded at startup via dotenvy.
pub struct Config {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub reddit_requests_per_second: f64,
    pub paths: Paths,
    pub settings: PipelineSettings,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let defaults = PipelineSettings::default();

        let subreddits = match env::var("INNOMINE_SUBREDDITS") {
            Ok(list) if !list.trim().is_empty() => parse_list(&list),
            _ => defaults.subreddits.clone(),
        };

        let settings = PipelineSettings {
            subreddits,
            days_limit: check_days_limit(env_parse("INNOMINE_DAYS", defaults.days_limit)?)?,
            limit_per_sub: env_parse("INNOMINE_LIMIT_PER_SUB", defaults.limit_per_sub)?,
            comments_per_post: env_parse(
                "INNOMINE_COMMENTS_PER_POST",
                defaults.comments_per_post,
            )?,
            n_topics: env_parse("INNOMINE_TOPICS", defaults.n_topics)?,
            n_clusters: env_parse("INNOMINE_CLUSTERS", defaults.n_clusters)?,
            seed: env_parse("INNOMINE_SEED", defaults.seed)?,
            ..defaults
        };

        let reddit_requests_per_second = env_parse("REDDIT_REQUESTS_PER_SECOND", 1.0)?;
        if reddit_requests_per_second <= 0.0 {
            anyhow::bail!("REDDIT_REQUESTS_PER_SECOND must be positive");
        }

        Ok(Self {
            reddit_client_id: env::var("REDDIT_CLIENT_ID").unwrap_or_default(),
            reddit_client_secret: env::var("REDDIT_CLIENT_SECRET").unwrap_or_default(),
            reddit_user_agent: env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            reddit_requests_per_second,
            paths: Paths::new(
                env::var("INNOMINE_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
                env::var("INNOMINE_OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
            ),
            settings,
        })
    }

    /// Whether app-only OAuth credentials are configured.
    pub fn has_reddit_credentials(&self) -> bool {
        !self.reddit_client_id.is_empty() && !self.reddit_client_secret.is_empty()
    }

    /// Ensure the output directories exist before a stage writes.
    pub fn ensure_dirs(&self) -> Result<()> {
        ensure_dir(&self.paths.data_dir)?;
        ensure_dir(&self.paths.output_dir)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))
}

/// Longest recency window accepted, about a century.
pub const MAX_DAYS_LIMIT: i64 = 36_500;

/// Reject recency windows that are empty or too large to subtract from now.
pub fn check_days_limit(days: i64) -> Result<i64> {
    if !(1..=MAX_DAYS_LIMIT).contains(&days) {
        anyhow::bail!("INNOMINE_DAYS must be between 1 and {MAX_DAYS_LIMIT}, got {days}");
    }
    Ok(days)
}

/// Split a comma-separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Read and parse an env var, falling back to `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value {raw:?}: {e}")),
        _ => Ok(default),
    }
}
