// Pipeline stages: collect → label → rank → topics → cluster.
//
// Each stage is a batch transformation from one set of files to the next.
// A stage whose input file is missing tells the user which command to run
// first and returns without output, so `innomine run` degrades gracefully
// when an early stage produced nothing.

pub mod cluster;
pub mod collect;
pub mod label;
pub mod rank;
pub mod topics;

use std::path::Path;

use colored::Colorize;

/// Print a hint and return true when a stage input doesn't exist.
pub(crate) fn input_missing(path: &Path, hint: &str) -> bool {
    if path.exists() {
        return false;
    }
    println!(
        "{} {} not found. {}",
        "!".yellow(),
        path.display(),
        hint.dimmed()
    );
    true
}
