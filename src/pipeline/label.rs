// Cleaning and labeling stage: raw posts → cleaned_labeled_posts.csv.

use anyhow::Result;
use colored::Colorize;
use tracing::info;

use crate::config::{Paths, PipelineSettings};
use crate::models::{LabeledItem, RawItem};
use crate::store::raw::read_raw_items;
use crate::store::tables::write_labeled;
use crate::text::clean::clean_text;
use crate::text::label::ProblemLabeler;
use crate::text::sentiment::VaderPolarity;

use super::input_missing;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelSummary {
    pub total: usize,
    pub problems: usize,
}

impl LabelSummary {
    pub fn non_problems(&self) -> usize {
        self.total - self.problems
    }
}

/// The labeler configured from settings, scoring polarity with VADER.
pub fn default_labeler(settings: &PipelineSettings) -> ProblemLabeler {
    ProblemLabeler::new(
        settings.label_keywords.clone(),
        Box::new(VaderPolarity),
        settings.polarity_threshold,
    )
}

/// Clean and label one post.
pub fn label_item(item: &RawItem, labeler: &ProblemLabeler) -> LabeledItem {
    let text = item.combined_text();
    LabeledItem::from_raw(item, clean_text(&text), labeler.label(&text))
}

/// Label every collected post and write the CSV.
///
/// Fails without writing when every post lands in the same class: a
/// one-class file is useless to everything downstream.
pub fn run(paths: &Paths, labeler: &ProblemLabeler) -> Result<Option<LabelSummary>> {
    let input = paths.raw_data();
    if input_missing(&input, "Run `innomine collect` first.") {
        return Ok(None);
    }

    let items = read_raw_items(&input)?;
    if items.is_empty() {
        println!("No posts to label in {}.", input.display());
        return Ok(None);
    }

    let labeled: Vec<LabeledItem> = items.iter().map(|item| label_item(item, labeler)).collect();
    let summary = LabelSummary {
        total: labeled.len(),
        problems: labeled.iter().filter(|l| l.problem_signal).count(),
    };

    println!("Label distribution:");
    println!("  {:<8} {}", "true".red(), summary.problems);
    println!("  {:<8} {}", "false".green(), summary.non_problems());

    if summary.problems == 0 || summary.problems == summary.total {
        anyhow::bail!(
            "All {} posts were labeled {}; both classes are needed. \
             Collect more posts or adjust the label keywords.",
            summary.total,
            summary.problems == summary.total
        );
    }

    write_labeled(&paths.labeled(), &labeled)?;
    info!(
        total = summary.total,
        problems = summary.problems,
        "Wrote labeled posts"
    );
    println!("  Saved to {}", paths.labeled().display());

    Ok(Some(summary))
}
