//! Chart assembly: one chart per series type, one series per project key.

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::{aggregator, Error, Event, EventLog, Series, Visibility};

/// The six charts derived from one event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    OpenIssues,
    OpenPullRequests,
    CumulativeIssues,
    CumulativePullRequests,
    IssueUsers,
    PullRequestUsers,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::OpenIssues,
        ChartKind::OpenPullRequests,
        ChartKind::CumulativeIssues,
        ChartKind::CumulativePullRequests,
        ChartKind::IssueUsers,
        ChartKind::PullRequestUsers,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::OpenIssues => "Count of open issues",
            ChartKind::OpenPullRequests => "Count of open pull requests",
            ChartKind::CumulativeIssues => "Cumulative count of opened issues",
            ChartKind::CumulativePullRequests => "Cumulative count of opened pull requests",
            ChartKind::IssueUsers => "Count of users who opened an issue",
            ChartKind::PullRequestUsers => "Count of users who opened a pull request",
        }
    }

    /// File stem for the chart sink document, matching the chart element ids
    /// the frontend uses.
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::OpenIssues => "count_open_issues",
            ChartKind::OpenPullRequests => "count_open_pull_requests",
            ChartKind::CumulativeIssues => "cumulative_count_open_issues",
            ChartKind::CumulativePullRequests => "cumulative_count_open_pull_requests",
            ChartKind::IssueUsers => "count_users_open_issues",
            ChartKind::PullRequestUsers => "count_users_open_pull_requests",
        }
    }

    pub fn is_pr(self) -> bool {
        matches!(
            self,
            ChartKind::OpenPullRequests
                | ChartKind::CumulativePullRequests
                | ChartKind::PullRequestUsers
        )
    }

    /// Item-count charts stack their series; user-count charts do not.
    fn stacked(self) -> bool {
        !matches!(self, ChartKind::IssueUsers | ChartKind::PullRequestUsers)
    }

    fn build_series(self, name: &str, events: &[Event], today: NaiveDate) -> Result<Series, Error> {
        match self {
            ChartKind::OpenIssues | ChartKind::OpenPullRequests => {
                aggregator::count_opened(name, events, self.is_pr(), false, today)
            }
            ChartKind::CumulativeIssues | ChartKind::CumulativePullRequests => {
                aggregator::count_opened(name, events, self.is_pr(), true, today)
            }
            ChartKind::IssueUsers | ChartKind::PullRequestUsers => {
                aggregator::count_users(name, events, self.is_pr(), today)
            }
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Margin {
    pub b: u32,
    pub t: u32,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Axis {
    pub title: &'static str,
}

/// Shared layout handed to the chart sink alongside each chart's series.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Layout {
    pub margin: Margin,
    pub hovermode: &'static str,
    pub yaxis: Axis,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            margin: Margin { b: 30, t: 20 },
            hovermode: "closest",
            yaxis: Axis { title: "Count" },
        }
    }
}

/// One chart document: a shared layout plus one series per project key,
/// keys in sorted order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Chart {
    #[serde(skip)]
    pub kind: ChartKind,
    pub layout: Layout,
    pub series: Vec<Series>,
}

/// Build one chart from the full event log. Series for keys in `pinned` are
/// drawn by default; everything else starts legend-only so a multi-project
/// chart stays readable.
pub fn build_chart(
    log: &EventLog,
    kind: ChartKind,
    pinned: &[String],
    today: NaiveDate,
) -> Result<Chart, Error> {
    let keyed: Vec<(&String, &Vec<Event>)> = log.iter().collect();
    let series = keyed
        .par_iter()
        .map(|&(key, events)| {
            let mut series = kind.build_series(key, events, today)?;
            if kind.stacked() {
                series.stack_group = Some("one");
            }
            if pinned.iter().any(|p| p == key) {
                series.visibility = Visibility::Visible;
            }
            Ok(series)
        })
        .collect::<Result<Vec<Series>, Error>>()?;

    Ok(Chart {
        kind,
        layout: Layout::default(),
        series,
    })
}

/// Build all six charts. Per-key computations are independent and each task
/// scans a single key's events in their supplied order.
pub fn build_charts(log: &EventLog, pinned: &[String], today: NaiveDate) -> Result<Vec<Chart>, Error> {
    tracing::debug!(projects = log.len(), "building charts");
    ChartKind::ALL
        .into_iter()
        .map(|kind| build_chart(log, kind, pinned, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn event(date: &str, is_pr: bool, kind: EventKind, user: &str) -> Event {
        Event {
            date: date.to_string(),
            is_pr,
            kind,
            user: user.to_string(),
        }
    }

    fn sample_log() -> EventLog {
        let mut log = EventLog::new();
        log.insert(
            "zeta".to_string(),
            vec![
                event("2020-01-01", false, EventKind::Opened, "u1"),
                event("2020-01-02", true, EventKind::Opened, "u1"),
            ],
        );
        log.insert(
            "alpha".to_string(),
            vec![
                event("2020-01-01", false, EventKind::Opened, "u2"),
                event("2020-01-03", false, EventKind::Closed, "u2"),
            ],
        );
        log
    }

    #[test]
    fn series_follow_sorted_key_order() {
        let chart = build_chart(&sample_log(), ChartKind::OpenIssues, &[], day("2020-01-04")).unwrap();
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn pinned_keys_are_visible_by_default() {
        let pinned = vec!["zeta".to_string()];
        let chart =
            build_chart(&sample_log(), ChartKind::OpenIssues, &pinned, day("2020-01-04")).unwrap();
        assert_eq!(chart.series[0].visibility, Visibility::LegendOnly);
        assert_eq!(chart.series[1].visibility, Visibility::Visible);
    }

    #[test]
    fn count_charts_stack_and_user_charts_do_not() {
        let log = sample_log();
        let counts = build_chart(&log, ChartKind::OpenIssues, &[], day("2020-01-04")).unwrap();
        assert!(counts.series.iter().all(|s| s.stack_group == Some("one")));

        let users = build_chart(&log, ChartKind::IssueUsers, &[], day("2020-01-04")).unwrap();
        assert!(users.series.iter().all(|s| s.stack_group.is_none()));
    }

    #[test]
    fn every_series_reaches_today() {
        let today = day("2020-02-01");
        for chart in build_charts(&sample_log(), &[], today).unwrap() {
            for series in &chart.series {
                assert_eq!(series.x.last().copied(), Some(today));
                assert_eq!(series.x.len(), series.y.len());
            }
        }
    }

    #[test]
    fn build_charts_produces_all_six() {
        let charts = build_charts(&sample_log(), &[], day("2020-01-04")).unwrap();
        assert_eq!(charts.len(), 6);
        let stems: Vec<&str> = charts.iter().map(|c| c.kind.file_stem()).collect();
        assert_eq!(
            stems,
            [
                "count_open_issues",
                "count_open_pull_requests",
                "cumulative_count_open_issues",
                "cumulative_count_open_pull_requests",
                "count_users_open_issues",
                "count_users_open_pull_requests"
            ]
        );
    }

    #[test]
    fn bad_key_data_fails_the_chart() {
        let mut log = sample_log();
        log.insert(
            "broken".to_string(),
            vec![
                event("2020-01-05", false, EventKind::Opened, "u1"),
                event("2020-01-02", false, EventKind::Opened, "u2"),
            ],
        );
        let err = build_chart(&log, ChartKind::OpenIssues, &[], day("2020-01-06")).unwrap_err();
        assert!(matches!(err, Error::OutOfOrderInput { .. }));
    }
}
