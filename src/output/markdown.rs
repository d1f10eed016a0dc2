// Markdown report: the ranked table, topics, clusters and insights in one
// shareable file.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use super::{cluster_summaries, topic_counts, truncate_chars, ReportData};

/// Render the full report.
pub fn generate_report(data: &ReportData, topic_filter: Option<usize>, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# Developer Pain Points Report\n");
    let _ = writeln!(md, "Generated {}\n", generated_at.format("%Y-%m-%d %H:%M UTC"));

    if let Some(insights) = &data.insights {
        let _ = writeln!(
            md,
            "{} posts collected, {} labeled as problems.\n",
            insights.total_posts, insights.problem_posts
        );
    }

    write_ranked(&mut md, data);
    write_topics(&mut md, data, topic_filter);
    write_clusters(&mut md, data);
    write_insights(&mut md, data);

    md
}

/// Render the report and write it to `path`.
pub fn write_report(
    path: &Path,
    data: &ReportData,
    topic_filter: Option<usize>,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let report = generate_report(data, topic_filter, generated_at);
    std::fs::write(path, report).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote markdown report");
    Ok(())
}

fn write_ranked(md: &mut String, data: &ReportData) {
    let _ = writeln!(md, "## Top Problems\n");
    if data.ranked.is_empty() {
        let _ = writeln!(md, "_No ranked problems._\n");
        return;
    }

    let with_topics = data.ranked.iter().any(|r| r.topic.is_some());
    if with_topics {
        let _ = writeln!(md, "| Rank | Score | Upvotes | Comments | Title | Signals | Topic |");
        let _ = writeln!(md, "|---:|---:|---:|---:|---|---|---|");
    } else {
        let _ = writeln!(md, "| Rank | Score | Upvotes | Comments | Title | Signals |");
        let _ = writeln!(md, "|---:|---:|---:|---:|---|---|");
    }

    for row in &data.ranked {
        let title = if row.url.is_empty() {
            escape_cell(&row.title)
        } else {
            format!("[{}]({})", escape_cell(&row.title), row.url)
        };
        let _ = write!(
            md,
            "| {} | {:.2} | {} | {} | {} | {} |",
            row.rank,
            row.score,
            row.upvotes,
            row.comments,
            title,
            escape_cell(&row.signals)
        );
        if with_topics {
            let _ = write!(md, " {} |", row.topic.as_deref().unwrap_or(""));
        }
        md.push('\n');
    }
    md.push('\n');
}

fn write_topics(md: &mut String, data: &ReportData, topic_filter: Option<usize>) {
    let _ = writeln!(md, "## Topics\n");
    let counts = topic_counts(&data.topics);
    if counts.is_empty() {
        let _ = writeln!(md, "_No topic assignments._\n");
        return;
    }

    let _ = writeln!(md, "| Topic | Posts | Keywords |");
    let _ = writeln!(md, "|---|---:|---|");
    for t in &counts {
        let _ = writeln!(md, "| {} | {} | {} |", t.topic, t.posts, t.keywords);
    }
    md.push('\n');

    if let Some(topic_id) = topic_filter {
        let rows = data.topic_rows(Some(topic_id));
        let _ = writeln!(md, "### Posts in Topic {topic_id}\n");
        if rows.is_empty() {
            let _ = writeln!(md, "_No posts._\n");
            return;
        }
        for row in rows {
            let _ = writeln!(
                md,
                "- r/{}: {}",
                row.subreddit,
                escape_cell(&truncate_chars(&row.title, 120))
            );
        }
        md.push('\n');
    }
}

fn write_clusters(md: &mut String, data: &ReportData) {
    let _ = writeln!(md, "## Clusters\n");
    let summaries = cluster_summaries(&data.clusters);
    if summaries.is_empty() {
        let _ = writeln!(md, "_No clusters._\n");
        return;
    }

    for s in &summaries {
        let _ = writeln!(
            md,
            "### Cluster {} ({} posts)\n\nTop words: {}\n",
            s.cluster,
            s.size,
            s.top_words.join(", ")
        );
        for title in &s.sample_titles {
            let _ = writeln!(md, "- {}", truncate_chars(title, 120));
        }
        md.push('\n');
    }
}

fn write_insights(md: &mut String, data: &ReportData) {
    let Some(insights) = &data.insights else {
        return;
    };

    let _ = writeln!(md, "## Insights\n");

    if !insights.posts_per_subreddit.is_empty() {
        let _ = writeln!(md, "| Subreddit | Posts | Problem rate |");
        let _ = writeln!(md, "|---|---:|---:|");
        for (sub, count) in &insights.posts_per_subreddit {
            let rate = insights
                .problem_rates
                .iter()
                .find(|(s, _)| s == sub)
                .map(|(_, r)| *r)
                .unwrap_or(0.0);
            let _ = writeln!(md, "| r/{} | {} | {:.1}% |", sub, count, rate * 100.0);
        }
        md.push('\n');
    }

    if !insights.common_words.is_empty() {
        let words: Vec<String> = insights
            .common_words
            .iter()
            .map(|(w, c)| format!("{w} ({c})"))
            .collect();
        let _ = writeln!(md, "**Common words in problem posts:** {}\n", words.join(", "));
    }

    if !insights.distinctive_terms.is_empty() {
        let terms: Vec<&str> = insights
            .distinctive_terms
            .iter()
            .map(|(t, _)| t.as_str())
            .collect();
        let _ = writeln!(md, "**Distinctive problem terms:** {}\n", terms.join(", "));
    }

    if !insights.word_pairs.is_empty() {
        let _ = writeln!(md, "**Words that appear together:**\n");
        for ((a, b), count) in insights.word_pairs.iter().take(10) {
            let _ = writeln!(md, "- {a} + {b} ({count})");
        }
        md.push('\n');
    }

    if let Some(trend) = &insights.topic_trend {
        let _ = writeln!(
            md,
            "### Monthly trend: Topic {} ({})\n",
            trend.topic_id,
            escape_cell(&trend.topic_keywords)
        );
        let _ = writeln!(md, "| Month | Posts |");
        let _ = writeln!(md, "|---|---:|");
        for (month, count) in &trend.months {
            let _ = writeln!(md, "| {month} | {count} |");
        }
        md.push('\n');
    }
}

/// Keep pipes and newlines from breaking table rows.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{Insights, TopicTrend};
    use crate::models::RankedRow;

    fn ranked_row(title: &str) -> RankedRow {
        RankedRow {
            rank: 1,
            score: 11.0,
            upvotes: 10,
            comments: 2,
            title: title.to_string(),
            top_comment: String::new(),
            signals: "crash; timeout".to_string(),
            url: "https://example.com/a".to_string(),
            topic_id: None,
            topic: None,
            topic_keywords: None,
        }
    }

    #[test]
    fn test_report_sections_present_when_empty() {
        let report = generate_report(&ReportData::default(), None, Utc::now());
        assert!(report.starts_with("# Developer Pain Points Report"));
        assert!(report.contains("_No ranked problems._"));
        assert!(report.contains("_No topic assignments._"));
        assert!(report.contains("_No clusters._"));
    }

    #[test]
    fn test_ranked_rows_are_linked_and_escaped() {
        let data = ReportData {
            ranked: vec![ranked_row("a | b")],
            ..ReportData::default()
        };
        let report = generate_report(&data, None, Utc::now());
        assert!(report.contains("| 1 | 11.00 | 10 | 2 | [a \\| b](https://example.com/a) | crash; timeout |"));
        assert!(!report.contains("| Topic |"));
    }

    #[test]
    fn test_insights_render_topic_trend() {
        let mut insights = Insights::compute(&[], &[]);
        insights.topic_trend = Some(TopicTrend {
            topic_id: 3,
            topic_keywords: "docker compose".to_string(),
            months: vec![("2023-11".to_string(), 2), ("2023-12".to_string(), 1)],
        });
        let data = ReportData {
            insights: Some(insights),
            ..ReportData::default()
        };
        let report = generate_report(&data, None, Utc::now());
        assert!(report.contains("### Monthly trend: Topic 3 (docker compose)"));
        assert!(report.contains("| 2023-11 | 2 |\n| 2023-12 | 1 |"));
    }

    #[test]
    fn test_write_report_names_the_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.md");
        let err = write_report(&path, &ReportData::default(), None, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("report.md"), "{err}");

        let path = dir.path().join("report.md");
        write_report(&path, &ReportData::default(), None, Utc::now()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("# Developer"));
    }
}
