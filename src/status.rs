// Pipeline status: which stage outputs exist, how big they are, how many rows.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use crate::config::Paths;
use crate::store::raw::read_raw_items;
use crate::store::tables::{count_rows, read_headers};

/// One stage artifact and what's known about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactStatus {
    pub stage: &'static str,
    pub path: PathBuf,
    /// File size in bytes, None if the file doesn't exist
    pub size: Option<u64>,
    /// Records in the file, None if missing or unreadable
    pub records: Option<usize>,
}

/// Inspect every stage output.
pub fn collect(paths: &Paths) -> Vec<ArtifactStatus> {
    vec![
        inspect("collect/rank", paths.raw_data(), count_json),
        inspect("label", paths.labeled(), count_rows),
        inspect("rank", paths.ranked(), count_rows),
        inspect("topics", paths.topic_assignments(), count_rows),
        inspect("cluster", paths.clusters(), count_rows),
        inspect("report", paths.report(), |_| Ok(0)),
    ]
}

fn inspect(
    stage: &'static str,
    path: PathBuf,
    count: impl Fn(&Path) -> Result<usize>,
) -> ArtifactStatus {
    let size = std::fs::metadata(&path).ok().map(|m| m.len());
    let records = size.and_then(|_| count(&path).ok());
    ArtifactStatus {
        stage,
        path,
        size,
        records,
    }
}

fn count_json(path: &Path) -> Result<usize> {
    Ok(read_raw_items(path)?.len())
}

/// Display pipeline status to the terminal.
pub fn show(paths: &Paths) -> Result<()> {
    println!("{}", "=== Pipeline Status ===".bold());
    println!("Data directory:   {}", paths.data_dir.display());
    println!("Output directory: {}", paths.output_dir.display());
    println!();

    for artifact in collect(paths) {
        match artifact.size {
            Some(size) => {
                let records = match artifact.records {
                    Some(n) if artifact.stage != "report" => format!("{n} records"),
                    Some(_) => String::new(),
                    None => "unreadable".red().to_string(),
                };
                println!(
                    "  {} {:<13} {} ({}) {}",
                    "✓".green(),
                    artifact.stage,
                    artifact.path.display(),
                    format_bytes(size),
                    records
                );
            }
            None => {
                println!(
                    "  {} {:<13} {}",
                    "-".dimmed(),
                    artifact.stage,
                    "not yet created".dimmed()
                );
            }
        }
    }

    let ranked = paths.ranked();
    if ranked.exists() {
        let has_topics = read_headers(&ranked)?.iter().any(|h| h == "topic_id");
        println!(
            "\nRanked summary {} topic columns",
            if has_topics { "has" } else { "does not have" }
        );
    }

    Ok(())
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_missing_artifacts_have_no_size() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::new(dir.path().join("data"), dir.path().join("output"));
        let statuses = collect(&paths);
        assert_eq!(statuses.len(), 6);
        assert!(statuses.iter().all(|s| s.size.is_none() && s.records.is_none()));
    }

    #[test]
    fn test_counts_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::new(dir.path().join("data"), dir.path().join("output"));
        std::fs::create_dir_all(&paths.output_dir).unwrap();
        std::fs::write(paths.clusters(), "x,y,cluster,title\n1,2,0,a\n3,4,1,b\n").unwrap();

        let statuses = collect(&paths);
        let clusters = statuses.iter().find(|s| s.stage == "cluster").unwrap();
        assert_eq!(clusters.records, Some(2));
    }
}
