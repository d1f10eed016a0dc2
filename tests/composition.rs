// Composition tests verifying that the stages chain together through files.
//
// These tests exercise the data flow between stages:
//   raw_data.json -> label -> rank -> topics -> cluster -> report
// in a scratch directory, without any network calls.

use innomine::config::{Paths, PipelineSettings};
use innomine::models::{LabeledItem, RankedRow, RawItem};
use innomine::output::markdown::generate_report;
use innomine::output::ReportData;
use innomine::pipeline::{cluster, label, rank, topics};
use innomine::store::raw::{read_raw_items, write_json};
use innomine::store::tables::{
    read_clusters, read_headers, read_labeled, read_ranked, read_topic_rows, write_labeled,
    write_ranked, RANKED_COLUMNS,
};
use innomine::topics::traits::NmfTopicModeler;

fn scratch() -> (tempfile::TempDir, Paths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::new(dir.path().join("data"), dir.path().join("output"));
    (dir, paths)
}

fn raw(title: &str, text: &str, score: i64, num_comments: i64, comments: &[&str]) -> RawItem {
    RawItem {
        subreddit: "webdev".to_string(),
        title: title.to_string(),
        text: text.to_string(),
        created_utc: 1_700_000_000.0,
        url: format!("https://www.reddit.com/r/webdev/comments/{}", title.replace(' ', "_")),
        score,
        num_comments,
        comments: comments.iter().map(|c| c.to_string()).collect(),
        permalink: String::new(),
    }
}

// ============================================================
// Ranker: raw_data.json -> ranked_problems.csv
// ============================================================

#[test]
fn ranked_csv_contains_exactly_qualifying_posts_in_order() {
    let (_dir, paths) = scratch();
    let items = vec![
        raw(
            "App crash on launch",
            "It keeps hitting a timeout.",
            10,
            2,
            &["Same here", "Try a reinstall"],
        ),
        raw(
            "Parser trouble",
            "parser hits a segfault then a memory leak and finally a stack overflow",
            5,
            0,
            &[],
        ),
        raw("Question about closures", "is this a bug", 3, 0, &[]),
    ];
    write_json(&paths.raw_data(), &items).unwrap();

    let summary = rank::run(&paths, &PipelineSettings::default())
        .unwrap()
        .unwrap();
    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.qualifying, 2);

    let rows = read_ranked(&paths.ranked()).unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[0].title, "App crash on launch");
    assert_eq!(rows[0].score, 11.0);
    assert_eq!(rows[0].top_comment, "Same here");
    assert_eq!(rows[0].signals, "crash; timeout");

    assert_eq!(rows[1].rank, 2);
    assert_eq!(rows[1].title, "Parser trouble");
    assert_eq!(rows[1].score, 8.5);
    assert_eq!(rows[1].top_comment, "");

    assert_eq!(read_headers(&paths.ranked()).unwrap(), RANKED_COLUMNS);

    // The qualifying set replaces the collected posts
    let remaining = read_raw_items(&paths.raw_data()).unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].title, "App crash on launch");
}

#[test]
fn ranker_writes_nothing_when_no_post_qualifies() {
    let (_dir, paths) = scratch();
    write_json(&paths.raw_data(), &[raw("Hello", "is this a bug", 1, 0, &[])]).unwrap();

    let summary = rank::run(&paths, &PipelineSettings::default())
        .unwrap()
        .unwrap();
    assert_eq!(summary.qualifying, 0);
    assert!(!paths.ranked().exists());
}

#[test]
fn ranked_csv_round_trip_keeps_rows_and_columns() {
    let (_dir, paths) = scratch();
    let rows: Vec<RankedRow> = (1..=3)
        .map(|i| RankedRow {
            rank: i,
            score: 10.0 / i as f64,
            upvotes: i as i64,
            comments: 0,
            title: format!("Post, with \"quotes\" {i}"),
            top_comment: String::new(),
            signals: "bug; crash".to_string(),
            url: format!("https://example.com/{i}"),
            topic_id: None,
            topic: None,
            topic_keywords: None,
        })
        .collect();

    write_ranked(&paths.ranked(), &rows).unwrap();
    let back = read_ranked(&paths.ranked()).unwrap();

    assert_eq!(back.len(), rows.len());
    assert_eq!(read_headers(&paths.ranked()).unwrap(), RANKED_COLUMNS);
    assert_eq!(back[0].title, rows[0].title);
}

// ============================================================
// Missing inputs are messages, not errors
// ============================================================

#[test]
fn stages_without_input_return_none() {
    let (_dir, paths) = scratch();
    let settings = PipelineSettings::default();

    assert!(label::run(&paths, &label::default_labeler(&settings))
        .unwrap()
        .is_none());
    assert!(rank::run(&paths, &settings).unwrap().is_none());
    assert!(topics::run(&paths, &NmfTopicModeler::new(2, 5, 42))
        .unwrap()
        .is_none());
    assert!(cluster::run(&paths, &settings).unwrap().is_none());
}

#[test]
fn cluster_without_clean_text_column_writes_nothing() {
    let (_dir, paths) = scratch();
    std::fs::create_dir_all(&paths.data_dir).unwrap();
    std::fs::write(paths.labeled(), "title,text\na,b\n").unwrap();

    let settings = PipelineSettings::default();
    assert!(cluster::run(&paths, &settings).unwrap().is_none());
    assert!(!paths.clusters().exists());
}

#[test]
fn cluster_keeps_posts_with_empty_clean_text() {
    let (_dir, paths) = scratch();
    std::fs::create_dir_all(&paths.data_dir).unwrap();
    let labeled: Vec<LabeledItem> = [
        ("Docker build", "docker build cache"),
        ("Docker compose", "docker compose volume"),
        ("Just emoji", ""),
        ("React hooks", "react hooks state"),
    ]
    .iter()
    .map(|(title, clean)| LabeledItem {
        subreddit: "webdev".to_string(),
        title: title.to_string(),
        text: String::new(),
        created_utc: 1_700_000_000.0,
        created_date: String::new(),
        url: String::new(),
        score: 0,
        num_comments: 0,
        clean_text: clean.to_string(),
        problem_signal: false,
    })
    .collect();
    write_labeled(&paths.labeled(), &labeled).unwrap();

    let settings = PipelineSettings {
        n_clusters: 2,
        ..PipelineSettings::default()
    };
    let summary = cluster::run(&paths, &settings).unwrap().unwrap();
    assert_eq!(summary.documents, 4);

    let points = read_clusters(&paths.clusters()).unwrap();
    assert_eq!(points.len(), 4);
    assert_eq!(points[2].title, "Just emoji");
    assert_eq!(points[2].clean_text, "");
}

// ============================================================
// Labeler: single-class corpora abort
// ============================================================

#[test]
fn single_class_corpus_aborts_without_writing() {
    let (_dir, paths) = scratch();
    let items = vec![
        raw("Weekly showcase", "sharing my side project", 1, 0, &[]),
        raw("Release notes", "the new version shipped today", 1, 0, &[]),
    ];
    write_json(&paths.raw_data(), &items).unwrap();

    let labeler = label::default_labeler(&PipelineSettings::default());
    let err = label::run(&paths, &labeler).unwrap_err();
    assert!(err.to_string().contains("both classes"), "{err}");
    assert!(!paths.labeled().exists());
}

// ============================================================
// Full chain: label -> rank -> topics -> cluster -> report
// ============================================================

fn pipeline_corpus() -> Vec<RawItem> {
    vec![
        raw(
            "Docker container build error",
            "docker container build keeps failing with permission error",
            8,
            3,
            &[],
        ),
        raw(
            "Docker container network timeout",
            "docker container network error on startup",
            5,
            1,
            &[],
        ),
        raw(
            "Docker compose volume issue",
            "docker container volume mount is stuck",
            2,
            0,
            &[],
        ),
        raw(
            "React component render bug",
            "react component crash after state update",
            12,
            4,
            &[],
        ),
        raw(
            "React component library showcase",
            "sharing react component patterns",
            30,
            2,
            &[],
        ),
        raw("React hooks tutorial", "react component hooks guide", 7, 0, &[]),
        raw("Weekly docker meetup", "docker container talks this week", 3, 0, &[]),
        raw("Rust release notes", "rust compiler release notes", 9, 1, &[]),
    ]
}

#[test]
fn full_chain_produces_every_artifact() {
    let (_dir, paths) = scratch();
    write_json(&paths.raw_data(), &pipeline_corpus()).unwrap();

    let settings = PipelineSettings {
        n_topics: 2,
        n_clusters: 2,
        ..PipelineSettings::default()
    };

    let labeled = label::run(&paths, &label::default_labeler(&settings))
        .unwrap()
        .unwrap();
    assert_eq!(labeled.total, 8);
    assert_eq!(labeled.problems, 4);

    let ranked = rank::run(&paths, &settings).unwrap().unwrap();
    assert_eq!(ranked.qualifying, 4);

    let modeler = NmfTopicModeler::new(settings.n_topics, settings.n_top_words, settings.seed);
    let topic_summary = topics::run(&paths, &modeler).unwrap().unwrap();
    assert_eq!(topic_summary.documents, 8);
    assert_eq!(topic_summary.keywords.len(), 2);
    assert_eq!(topic_summary.ranked_annotated, Some(4));

    let clustered = cluster::run(&paths, &settings).unwrap().unwrap();
    assert_eq!(clustered.documents, 8);

    // Labeled CSV keeps every post
    assert_eq!(read_labeled(&paths.labeled()).unwrap().len(), 8);

    // Topic assignments cover the corpus with ids in range
    let topic_rows = read_topic_rows(&paths.topic_assignments()).unwrap();
    assert_eq!(topic_rows.len(), 8);
    assert!(topic_rows.iter().all(|r| r.topic_id < 2));
    assert!(topic_rows.iter().all(|r| r.topic == format!("Topic {}", r.topic_id)));

    // Ranked summary gained the topic columns, matched back by URL
    let headers = read_headers(&paths.ranked()).unwrap();
    assert!(headers.ends_with(&[
        "topic_id".to_string(),
        "topic".to_string(),
        "topic_keywords".to_string()
    ]));
    let ranked_rows = read_ranked(&paths.ranked()).unwrap();
    for row in &ranked_rows {
        let source = topic_rows.iter().find(|t| t.url == row.url).unwrap();
        assert_eq!(row.topic_id, Some(source.topic_id));
    }

    // Clusters have one point per post with labels in range
    let points = read_clusters(&paths.clusters()).unwrap();
    assert_eq!(points.len(), 8);
    assert!(points.iter().all(|p| p.cluster < 2));

    // The report sees all of it
    let data = ReportData::load(&paths);
    assert_eq!(data.ranked.len(), 4);
    assert_eq!(data.topics.len(), 8);
    assert!(data.insights.is_some());
    let report = generate_report(&data, Some(0), chrono::Utc::now());
    assert!(report.contains("| Topic |"));
    assert!(report.contains("## Clusters"));
}
