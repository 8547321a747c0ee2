use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};
use repotrend_core::{build_charts, fetch_event_log, read_event_log, Chart, ChartKind, EventLog};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repotrend")]
#[command(author, version, about = "Issue and pull-request trend charts from a repository event log")]
struct Cli {
    #[arg(help = "Path to a local event-log JSON file")]
    file: Option<PathBuf>,

    #[arg(long, help = "Fetch the event log from a URL instead of a file")]
    url: Option<String>,

    #[arg(long, default_value = "charts", help = "Directory for the generated chart documents")]
    out_dir: PathBuf,

    #[arg(
        long = "pin",
        help = "Project key drawn by default instead of legend-only (repeatable)"
    )]
    pinned: Vec<String>,

    #[arg(long, help = "Treat this date (YYYY-MM-DD) as today, for reproducible output")]
    today: Option<NaiveDate>,

    #[arg(long, help = "Print the summary as JSON instead of a table")]
    json: bool,
}

#[derive(serde::Serialize)]
struct SummaryRow {
    project: String,
    open_issues: i64,
    open_pull_requests: i64,
    total_issues: i64,
    total_pull_requests: i64,
    issue_openers: i64,
    pull_request_openers: i64,
}

async fn load_event_log(cli: &Cli) -> Result<EventLog> {
    match (&cli.file, &cli.url) {
        (Some(_), Some(_)) => bail!("pass either a file or --url, not both"),
        (Some(path), None) => read_event_log(path)
            .with_context(|| format!("failed to read event log from {}", path.display())),
        (None, Some(url)) => fetch_event_log(url)
            .await
            .with_context(|| format!("failed to fetch event log from {url}")),
        (None, None) => bail!("no event log given; pass a file or --url"),
    }
}

/// Per-project summary, one row per key. Charts are all built over the same
/// sorted key set, so the i-th series of every chart belongs to the same key.
fn summary_rows(charts: &[Chart]) -> Vec<SummaryRow> {
    let by_kind = |kind: ChartKind| charts.iter().find(|c| c.kind == kind);
    let Some(open_issues) = by_kind(ChartKind::OpenIssues) else {
        return Vec::new();
    };

    let value = |kind: ChartKind, i: usize| {
        by_kind(kind)
            .and_then(|c| c.series.get(i))
            .map(|s| s.last_value())
            .unwrap_or(0)
    };

    open_issues
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| SummaryRow {
            project: series.name.clone(),
            open_issues: series.last_value(),
            open_pull_requests: value(ChartKind::OpenPullRequests, i),
            total_issues: value(ChartKind::CumulativeIssues, i),
            total_pull_requests: value(ChartKind::CumulativePullRequests, i),
            issue_openers: value(ChartKind::IssueUsers, i),
            pull_request_openers: value(ChartKind::PullRequestUsers, i),
        })
        .collect()
}

fn print_summary_table(rows: &[SummaryRow]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header([
        "Project",
        "Open issues",
        "Open PRs",
        "Total issues",
        "Total PRs",
        "Issue openers",
        "PR openers",
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.project),
            Cell::new(row.open_issues).set_alignment(CellAlignment::Right),
            Cell::new(row.open_pull_requests).set_alignment(CellAlignment::Right),
            Cell::new(row.total_issues).set_alignment(CellAlignment::Right),
            Cell::new(row.total_pull_requests).set_alignment(CellAlignment::Right),
            Cell::new(row.issue_openers).set_alignment(CellAlignment::Right),
            Cell::new(row.pull_request_openers).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{table}");
}

fn write_charts(charts: &[Chart], out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for chart in charts {
        let path = out_dir.join(format!("{}.json", chart.kind.file_stem()));
        let doc = serde_json::to_string_pretty(chart)?;
        std::fs::write(&path, doc)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(chart = chart.kind.title(), path = %path.display(), "wrote chart");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let log = load_event_log(&cli).await?;
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let charts = build_charts(&log, &cli.pinned, today)?;
    write_charts(&charts, &cli.out_dir)?;

    let rows = summary_rows(&charts);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_summary_table(&rows);
    }

    Ok(())
}
