// Colored terminal output for the ranked table, topics, clusters and insights.

use colored::Colorize;

use super::{cluster_summaries, topic_counts, truncate_chars, ReportData};
use crate::insights::Insights;
use crate::models::{ClusterPoint, RankedRow, TopicRow};

const TRENDING_TOPICS: usize = 5;
const BAR_WIDTH: usize = 30;

/// Display the ranked problems table.
pub fn display_ranked(rows: &[RankedRow]) {
    if rows.is_empty() {
        println!("No ranked problems yet. Run `innomine rank` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Top Problems ({} posts) ===", rows.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:>7}  {:>5}  {:>5}  {:<50}  {}",
        "Rank".dimmed(),
        "Score".dimmed(),
        "Ups".dimmed(),
        "Cmts".dimmed(),
        "Title".dimmed(),
        "Signals".dimmed(),
    );
    println!("  {}", "-".repeat(100).dimmed());

    for row in rows {
        println!(
            "  {:>4}. {:>7.2}  {:>5}  {:>5}  {:<50}  {}",
            row.rank,
            row.score,
            row.upvotes,
            row.comments,
            truncate_chars(&row.title, 47),
            row.signals.yellow(),
        );
        if let Some(topic) = &row.topic {
            println!("         {}", topic.cyan());
        }
        if !row.top_comment.is_empty() {
            println!(
                "         {}",
                format!("\"{}\"", truncate_chars(&row.top_comment, 90)).dimmed()
            );
        }
    }
    println!();
}

/// Display the most populated topics.
pub fn display_trending_topics(rows: &[TopicRow]) {
    let counts = topic_counts(rows);
    if counts.is_empty() {
        return;
    }

    println!("\n{}", "=== Trending Topics ===".bold());
    for t in counts.iter().take(TRENDING_TOPICS) {
        println!(
            "  {:<9} {:>4} posts  {}",
            t.topic.cyan(),
            t.posts,
            t.keywords.dimmed()
        );
    }
}

/// List posts grouped by topic, optionally for one topic only.
pub fn display_topic_posts(data: &ReportData, topic_filter: Option<usize>) {
    let rows = data.topic_rows(topic_filter);
    if rows.is_empty() {
        match topic_filter {
            Some(t) => println!("No posts assigned to topic {t}."),
            None => println!("No topic assignments yet. Run `innomine topics` first."),
        }
        return;
    }

    let mut current: Option<usize> = None;
    let mut sorted = rows;
    sorted.sort_by_key(|r| r.topic_id);

    for row in sorted {
        if current != Some(row.topic_id) {
            current = Some(row.topic_id);
            println!("\n{} {}", row.topic.bold().cyan(), row.topic_keywords.dimmed());
        }
        let marker = if row.problem_signal {
            "!".red().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "  {} r/{:<16} {}",
            marker,
            row.subreddit,
            truncate_chars(&row.title, 80)
        );
    }
}

/// Horizontal bar chart of posts per topic.
pub fn display_topic_chart(rows: &[TopicRow]) {
    let counts = topic_counts(rows);
    let Some(max) = counts.iter().map(|t| t.posts).max() else {
        return;
    };

    println!("\n{}", "=== Topic Frequency ===".bold());
    for t in &counts {
        println!(
            "  {:<9} {} {}",
            t.topic,
            bar(t.posts, max, BAR_WIDTH).cyan(),
            t.posts
        );
    }
}

/// Size, sample titles and top words of each cluster.
pub fn display_clusters(points: &[ClusterPoint]) {
    let summaries = cluster_summaries(points);
    if summaries.is_empty() {
        return;
    }

    println!("\n{}", "=== Problem Clusters ===".bold());
    for s in &summaries {
        println!(
            "\n  {} ({} posts)  {}",
            format!("Cluster {}", s.cluster).bold(),
            s.size,
            s.top_words.join(", ").dimmed()
        );
        for title in &s.sample_titles {
            println!("    - {}", truncate_chars(title, 80));
        }
    }
}

/// Corpus statistics from the labeled posts.
pub fn display_insights(insights: &Insights) {
    println!("\n{}", "=== Insights ===".bold());
    println!(
        "  {} posts, {} labeled as problems",
        insights.total_posts, insights.problem_posts
    );

    if !insights.posts_per_subreddit.is_empty() {
        println!("\n  {}", "Posts per subreddit".underline());
        let max = insights.posts_per_subreddit[0].1;
        for (sub, count) in &insights.posts_per_subreddit {
            println!("    r/{:<18} {} {}", sub, bar(*count, max, 20).green(), count);
        }
    }

    if !insights.problem_rates.is_empty() {
        println!("\n  {}", "Problem rate by subreddit".underline());
        for (sub, rate) in &insights.problem_rates {
            println!("    r/{:<18} {:>5.1}%", sub, rate * 100.0);
        }
    }

    if !insights.posts_per_day.is_empty() {
        println!("\n  {}", "Posts per day".underline());
        let max = insights
            .posts_per_day
            .iter()
            .map(|(_, c)| *c)
            .max()
            .unwrap_or(1);
        for (day, count) in &insights.posts_per_day {
            println!("    {}  {} {}", day, bar(*count, max, 20).blue(), count);
        }
    }

    if !insights.common_words.is_empty() {
        println!("\n  {}", "Common words in problem posts".underline());
        let words: Vec<String> = insights
            .common_words
            .iter()
            .map(|(w, c)| format!("{w} ({c})"))
            .collect();
        println!("    {}", words.join(", "));
    }

    if !insights.distinctive_terms.is_empty() {
        println!("\n  {}", "Distinctive problem terms".underline());
        let terms: Vec<&str> = insights
            .distinctive_terms
            .iter()
            .map(|(t, _)| t.as_str())
            .collect();
        println!("    {}", terms.join(", "));
    }

    if !insights.word_pairs.is_empty() {
        println!("\n  {}", "Words that appear together".underline());
        for ((a, b), count) in insights.word_pairs.iter().take(10) {
            println!("    {a} + {b}  {}", count.to_string().dimmed());
        }
    }

    if !insights.topic_frequency.is_empty() {
        println!("\n  {}", "Topic frequency".underline());
        for (keywords, count) in &insights.topic_frequency {
            println!("    {:>4}  {}", count, truncate_chars(keywords, 70));
        }
    }

    if let Some(trend) = &insights.topic_trend {
        println!(
            "\n  {} {}",
            format!("Monthly trend for Topic {}", trend.topic_id).underline(),
            truncate_chars(&trend.topic_keywords, 50).dimmed()
        );
        let max = trend.months.iter().map(|(_, c)| *c).max().unwrap_or(1);
        for (month, count) in &trend.months {
            println!("    {}  {} {}", month, bar(*count, max, 20).magenta(), count);
        }
    }
}

/// A bar of `width` characters scaled so that `max` fills it.
pub fn bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = (value * width).div_ceil(max).min(width);
    "█".repeat(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_scales_to_width() {
        assert_eq!(bar(10, 10, 5).chars().count(), 5);
        assert_eq!(bar(1, 10, 5).chars().count(), 1);
        assert_eq!(bar(0, 10, 5), "");
        assert_eq!(bar(3, 0, 5), "");
    }
}
