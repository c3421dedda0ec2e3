//! Subcommands run end to end against the in-memory API

use chrono::{TimeZone, Utc};
use clap::Parser;
use wikimetrix_api::fake::{FakePage, FakeWikiApi};
use wikimetrix_api::Revision;
use wikimetrix_cli::{run, Cli};
use wikimetrix_common::test_utils::{create_temp_dir, de_wikipedia, init_test_logging, mock_date};
use wikimetrix_common::Project;
use wikimetrix_config::Config;

fn revision(revid: u64, day: u32, user: &str) -> Revision {
    Revision {
        revid,
        timestamp: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
        user: Some(user.to_string()),
        size: 100,
    }
}

fn api() -> FakeWikiApi {
    let de = de_wikipedia();
    let en = Project::new("en", "wikipedia");
    FakeWikiApi::new()
        .with_page(
            &de,
            "Faust",
            FakePage::new(4096)
                .with_revision(revision(1, 2, "Goethe"))
                .with_revision(revision(2, 2, "Schiller"))
                .with_revision(revision(3, 3, "Goethe"))
                .with_views(mock_date(2024, 1, 2), Some(5))
                .with_views(mock_date(2024, 1, 3), Some(7))
                .with_langlink("en", "Faust (play)"),
        )
        .with_page(&de, "Mephisto", FakePage::new(512))
        .with_page(
            &en,
            "Faust (play)",
            FakePage::new(2048).with_views(mock_date(2024, 1, 1), Some(11)),
        )
        .with_category(&de, "Category:Drama", &["Faust", "Mephisto"])
}

fn config_in(directory: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.site.lang = "de".to_string();
    config.output.directory = directory.display().to_string();
    config
}

async fn run_args(args: &[&str], config: &Config, api: &FakeWikiApi) -> anyhow::Result<()> {
    let cli = Cli::try_parse_from(args.iter().copied())?;
    run(&cli.command, config, api, false).await
}

#[tokio::test]
async fn stats_by_category_writes_one_row_per_article() {
    init_test_logging();
    let dir = create_temp_dir();
    let config = config_in(dir.path());

    run_args(&["wikimetrix", "stats", "-c", "Drama", "-o", "drama.tsv"], &config, &api())
        .await
        .unwrap();

    let written = std::fs::read_to_string(dir.path().join("drama.tsv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("title\turl\tlength\t"));
    assert!(lines[0].ends_with("label\ttimestamp\tselection_method\tselection\tselection_case"));
    assert!(lines[1].starts_with("Faust\t"));
    assert!(lines[1].contains("\tcategory\tDrama\t"));
    assert!(lines[2].starts_with("Mephisto\t"));
}

#[tokio::test]
async fn pageviews_are_zero_filled() {
    init_test_logging();
    let dir = create_temp_dir();
    let config = config_in(dir.path());

    run_args(
        &[
            "wikimetrix",
            "pageviews",
            "Faust",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-04",
            "-o",
            "views.tsv",
        ],
        &config,
        &api(),
    )
    .await
    .unwrap();

    let written = std::fs::read_to_string(dir.path().join("views.tsv")).unwrap();
    assert_eq!(
        written,
        "date\tviews\n2024-01-01\t0\n2024-01-02\t5\n2024-01-03\t7\n2024-01-04\t0\n"
    );
}

#[tokio::test]
async fn revisions_are_bucketed_per_day() {
    let dir = create_temp_dir();
    let config = config_in(dir.path());

    run_args(
        &[
            "wikimetrix",
            "revisions",
            "Faust",
            "--start",
            "20240101",
            "--end",
            "20240103",
            "-o",
            "edits.tsv",
        ],
        &config,
        &api(),
    )
    .await
    .unwrap();

    let written = std::fs::read_to_string(dir.path().join("edits.tsv")).unwrap();
    assert_eq!(written, "date\tedits\n2024-01-01\t0\n2024-01-02\t2\n2024-01-03\t1\n");
}

#[tokio::test]
async fn compare_language_editions_writes_wide_table() {
    let dir = create_temp_dir();
    let config = config_in(dir.path());

    let result = run_args(
        &[
            "wikimetrix",
            "compare",
            "Faust",
            "--langlinks",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-03",
            "--plot",
            "compare.svg",
            "-o",
            "compare.tsv",
        ],
        &config,
        &api(),
    )
    .await;

    // The table is written before the plot; rendering needs system fonts
    if let Err(error) = &result {
        assert!(format!("{error:#}").contains("Failed to render plot"), "{error:#}");
    }
    let written = std::fs::read_to_string(dir.path().join("compare.tsv")).unwrap();
    assert_eq!(
        written,
        "date\ten:Faust (play)\tde:Faust\n2024-01-01\t11\t0\n2024-01-02\t0\t5\n2024-01-03\t0\t7\n"
    );
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let dir = create_temp_dir();
    let config = config_in(dir.path());

    let error = run_args(
        &["wikimetrix", "pageviews", "Faust", "--start", "2024-02-01", "--end", "2024-01-01"],
        &config,
        &api(),
    )
    .await
    .unwrap_err();
    assert!(error.to_string().contains("after end date"));
}

#[tokio::test]
async fn empty_category_fails() {
    let dir = create_temp_dir();
    let config = config_in(dir.path());

    let error = run_args(&["wikimetrix", "stats", "-c", "Leer"], &config, &api())
        .await
        .unwrap_err();
    assert!(error.to_string().contains("No cases found."));
}
