#![deny(clippy::all)]

mod aggregator;
mod chart;
mod series;
mod source;

pub use aggregator::{count_opened, count_users};
pub use chart::{build_chart, build_charts, Axis, Chart, ChartKind, Layout, Margin};
pub use series::DateSeriesBuilder;
pub use source::{fetch_event_log, parse_event_log, read_event_log};

use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A single issue or pull-request action from the event log.
///
/// `date` is kept as the raw wire string (ISO date or datetime); only its
/// first 10 characters (`YYYY-MM-DD`) participate in aggregation.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Event {
    pub date: String,
    pub is_pr: bool,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Opened,
    Closed,
}

/// Project key -> events for that key, in the order the source supplied them.
///
/// A BTreeMap so iteration yields keys in sorted order, which fixes the
/// series order within each chart.
pub type EventLog = BTreeMap<String, Vec<Event>>;

/// Whether a series is drawn by default or parked in the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    LegendOnly,
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// One dense daily series, named after its project key.
///
/// Serializes to the chart-sink shape: `visible` is only emitted for
/// legend-only series, `stackgroup` only for stacked count charts.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<i64>,
    #[serde(rename = "stackgroup", skip_serializing_if = "Option::is_none")]
    pub stack_group: Option<&'static str>,
    #[serde(rename = "visible", skip_serializing_if = "Visibility::is_visible")]
    pub visibility: Visibility,
}

impl Series {
    /// Final value of the series, i.e. the current count.
    pub fn last_value(&self) -> i64 {
        self.y.last().copied().unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("out-of-order observation: {next} is earlier than {prev}")]
    OutOfOrderInput { prev: NaiveDate, next: NaiveDate },

    #[error("malformed event date {0:?}")]
    MalformedDate(String),

    #[error("event source request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("event log is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_deserializes_from_wire_shape() {
        let raw = r#"{"date": "2020-01-01T12:34:56Z", "is_pr": false, "type": "opened", "user": "u1"}"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.date, "2020-01-01T12:34:56Z");
        assert!(!event.is_pr);
        assert_eq!(event.kind, EventKind::Opened);
        assert_eq!(event.user, "u1");
    }

    #[test]
    fn series_omits_visible_unless_legend_only() {
        let mut series = Series {
            name: "A".to_string(),
            x: vec!["2020-01-01".parse().unwrap()],
            y: vec![1],
            stack_group: None,
            visibility: Visibility::Visible,
        };
        let json = serde_json::to_value(&series).unwrap();
        assert!(json.get("visible").is_none());
        assert!(json.get("stackgroup").is_none());
        assert_eq!(json["x"][0], "2020-01-01");

        series.visibility = Visibility::LegendOnly;
        series.stack_group = Some("one");
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["visible"], "legendonly");
        assert_eq!(json["stackgroup"], "one");
    }
}
