// Ranking stage: keep posts with enough problem signals and score them.
//
// Writes the full qualifying set back over raw_data.json and the top rows to
// ranked_problems.csv.

use anyhow::Result;
use tracing::info;

use crate::config::{Paths, PipelineSettings};
use crate::scoring::rank::{rank_items, summary_rows};
use crate::store::raw::{read_raw_items, write_json};
use crate::store::tables::write_ranked;

use super::input_missing;

#[derive(Debug, Clone, PartialEq)]
pub struct RankSummary {
    pub scanned: usize,
    pub qualifying: usize,
    /// Rows in the summary CSV
    pub written: usize,
}

pub fn run(paths: &Paths, settings: &PipelineSettings) -> Result<Option<RankSummary>> {
    let input = paths.raw_data();
    if input_missing(&input, "Run `innomine collect` first.") {
        return Ok(None);
    }

    let items = read_raw_items(&input)?;
    let scanned = items.len();
    let ranked = rank_items(
        items,
        &settings.signal_keywords,
        settings.min_signals,
        &settings.rank_weights,
    );

    if ranked.is_empty() {
        println!(
            "No posts had at least {} problem signals ({} scanned). Nothing written.",
            settings.min_signals, scanned
        );
        return Ok(Some(RankSummary {
            scanned,
            qualifying: 0,
            written: 0,
        }));
    }

    write_json(&input, &ranked)?;
    let rows = summary_rows(&ranked, settings.top_n);
    write_ranked(&paths.ranked(), &rows)?;

    info!(
        scanned,
        qualifying = ranked.len(),
        written = rows.len(),
        "Ranked posts"
    );
    println!(
        "Ranked {} of {} posts; top {} saved to {}",
        ranked.len(),
        scanned,
        rows.len(),
        paths.ranked().display()
    );

    Ok(Some(RankSummary {
        scanned,
        qualifying: ranked.len(),
        written: rows.len(),
    }))
}
