// Topic stage: fit the topic model on the labeled corpus, write per-post
// assignments, and annotate the ranked summary with each row's topic.

use std::collections::HashMap;

use anyhow::Result;
use colored::Colorize;
use tracing::{info, warn};

use crate::config::Paths;
use crate::models::{topic_name, LabeledItem, RankedRow, TopicAssignment, TopicRow};
use crate::store::tables::{read_labeled, read_ranked, write_ranked, write_topic_rows};
use crate::text::clean::clean_text;
use crate::topics::model::TopicModel;
use crate::topics::traits::TopicModeler;

use super::input_missing;

#[derive(Debug, Clone, PartialEq)]
pub struct TopicSummary {
    pub documents: usize,
    /// Keyword string per topic id
    pub keywords: Vec<String>,
    /// Ranked rows annotated, or None when there was no ranked summary
    pub ranked_annotated: Option<usize>,
}

pub fn run(paths: &Paths, modeler: &dyn TopicModeler) -> Result<Option<TopicSummary>> {
    let input = paths.labeled();
    if input_missing(&input, "Run `innomine label` first.") {
        return Ok(None);
    }

    let labeled = read_labeled(&input)?;
    if labeled.is_empty() {
        println!("No labeled posts in {}.", input.display());
        return Ok(None);
    }

    let docs: Vec<String> = labeled.iter().map(|l| l.clean_text.clone()).collect();
    let model = modeler.fit(&docs)?;
    let assignments = model.assignments();

    let rows: Vec<TopicRow> = labeled
        .iter()
        .zip(&assignments)
        .map(|(item, assignment)| TopicRow::new(item, assignment))
        .collect();
    write_topic_rows(&paths.topic_assignments(), &rows)?;

    let ranked_path = paths.ranked();
    let ranked_annotated = if ranked_path.exists() {
        let mut ranked = read_ranked(&ranked_path)?;
        annotate_ranked(&mut ranked, &labeled, &assignments, &model);
        write_ranked(&ranked_path, &ranked)?;
        Some(ranked.len())
    } else {
        warn!(path = %ranked_path.display(), "No ranked summary to annotate");
        println!(
            "{} {} not found; topic columns not added. {}",
            "!".yellow(),
            ranked_path.display(),
            "Run `innomine rank` first.".dimmed()
        );
        None
    };

    info!(
        documents = docs.len(),
        topics = model.n_topics(),
        vocabulary = model.vocabulary_size(),
        "Topic modeling complete"
    );

    println!("\n{}", "Topics:".bold());
    for (id, keywords) in model.keywords().iter().enumerate() {
        println!("  {:<9} {}", topic_name(id).cyan(), keywords);
    }
    println!("  Saved to {}", paths.topic_assignments().display());

    Ok(Some(TopicSummary {
        documents: docs.len(),
        keywords: model.keywords().to_vec(),
        ranked_annotated,
    }))
}

/// Give each ranked row the topic of its post.
///
/// Rows are matched to the labeled corpus by URL, then by title. A row with no
/// match is projected onto the fitted topics from its cleaned title.
pub fn annotate_ranked(
    ranked: &mut [RankedRow],
    labeled: &[LabeledItem],
    assignments: &[TopicAssignment],
    model: &TopicModel,
) {
    let mut by_url: HashMap<&str, usize> = HashMap::new();
    let mut by_title: HashMap<&str, usize> = HashMap::new();
    for (i, item) in labeled.iter().enumerate() {
        if !item.url.is_empty() {
            by_url.entry(item.url.as_str()).or_insert(i);
        }
        by_title.entry(item.title.as_str()).or_insert(i);
    }

    for row in ranked.iter_mut() {
        let matched = by_url
            .get(row.url.as_str())
            .filter(|_| !row.url.is_empty())
            .or_else(|| by_title.get(row.title.as_str()))
            .and_then(|&i| assignments.get(i));

        let assignment = match matched {
            Some(a) => a.clone(),
            None => model.assign(&clean_text(&row.title)),
        };
        row.set_topic(&assignment);
    }
}
