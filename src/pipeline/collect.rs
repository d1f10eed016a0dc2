// Collection stage: recent, relevant posts from each subreddit.
//
// A source that fails is logged and skipped; the others still contribute.
// Comments are fetched only for posts that survive the filters.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::{Paths, PipelineSettings};
use crate::models::RawItem;
use crate::reddit::source::ContentSource;
use crate::store::raw::write_json;
use crate::text::keywords::KeywordSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectSummary {
    pub sources_ok: usize,
    pub sources_failed: usize,
    /// Posts returned by the sources before filtering
    pub fetched: usize,
    /// Posts written
    pub kept: usize,
}

/// Whether a post falls inside the recency window and mentions a relevance keyword.
pub fn is_recent_and_relevant(item: &RawItem, cutoff: f64, keywords: &KeywordSet) -> bool {
    item.created_utc >= cutoff && keywords.contains_any(&item.combined_text())
}

/// Unix timestamp `days` days before `now`. Fails when the window can't be
/// represented instead of overflowing.
pub fn recency_cutoff(now: DateTime<Utc>, days: i64) -> Result<f64> {
    let window = Duration::try_days(days)
        .with_context(|| format!("A {days}-day recency window is out of range"))?;
    let cutoff = now
        .checked_sub_signed(window)
        .with_context(|| format!("A {days}-day recency window reaches past the earliest date"))?;
    Ok(cutoff.timestamp() as f64)
}

/// Collect posts from every configured subreddit and write them as JSON.
///
/// `now` anchors the recency window.
pub async fn run(
    source: &dyn ContentSource,
    settings: &PipelineSettings,
    paths: &Paths,
    now: DateTime<Utc>,
) -> Result<CollectSummary> {
    let cutoff = recency_cutoff(now, settings.days_limit)?;
    let mut summary = CollectSummary::default();
    let mut collected: Vec<RawItem> = Vec::new();

    println!(
        "Collecting from {} subreddits (last {} days, up to {} posts each)...",
        settings.subreddits.len(),
        settings.days_limit,
        settings.limit_per_sub,
    );

    let pb = ProgressBar::new(settings.subreddits.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Subreddits [{bar:30}] {pos}/{len} {msg}")
            .unwrap(),
    );

    for subreddit in &settings.subreddits {
        pb.set_message(format!("r/{subreddit}"));

        let items = match source.fetch_recent(subreddit, settings.limit_per_sub).await {
            Ok(items) => items,
            Err(e) => {
                warn!(subreddit = %subreddit, error = %e, "Failed to fetch subreddit, skipping");
                pb.println(format!("  {} r/{}: {}", "!".yellow(), subreddit, e));
                summary.sources_failed += 1;
                pb.inc(1);
                continue;
            }
        };
        summary.sources_ok += 1;
        summary.fetched += items.len();

        let mut kept: Vec<RawItem> = items
            .into_iter()
            .filter(|item| is_recent_and_relevant(item, cutoff, &settings.relevance_keywords))
            .collect();

        if settings.comments_per_post > 0 {
            for item in &mut kept {
                match source.fetch_comments(item, settings.comments_per_post).await {
                    Ok(comments) => item.comments = comments,
                    Err(e) => {
                        warn!(
                            subreddit = %subreddit,
                            title = %item.title,
                            error = %e,
                            "Failed to fetch comments"
                        );
                    }
                }
            }
        }

        info!(subreddit = %subreddit, kept = kept.len(), "Collected subreddit");
        collected.extend(kept);
        pb.inc(1);
    }
    pb.finish_and_clear();

    summary.kept = collected.len();
    write_json(&paths.raw_data(), &collected)?;

    println!(
        "  Saved {} posts to {} ({} of {} sources failed)",
        summary.kept.to_string().bold(),
        paths.raw_data().display(),
        summary.sources_failed,
        settings.subreddits.len(),
    );

    Ok(summary)
}
