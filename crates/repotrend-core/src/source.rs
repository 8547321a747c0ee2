//! Event-source loading.
//!
//! The event log is an external JSON document mapping project keys to event
//! arrays. Loading is a single-shot operation: a failure is reported and the
//! whole load is abandoned, so the aggregation core never sees partial data.
//! Retry policy, if any, belongs to the caller.

use std::path::Path;
use std::time::Duration;

use crate::{Error, EventLog};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch the event log from a URL with a single GET.
pub async fn fetch_event_log(url: &str) -> Result<EventLog, Error> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(url, error = %err, "event source request failed");
            return Err(err.into());
        }
    };

    let response = match response.error_for_status() {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(url, error = %err, "event source returned non-success status");
            return Err(err.into());
        }
    };

    let body = response.text().await?;
    parse_event_log(&body).inspect_err(|err| {
        tracing::error!(url, error = %err, "event source body is not a valid event log");
    })
}

/// Load the event log from a local JSON file.
pub fn read_event_log(path: &Path) -> Result<EventLog, Error> {
    let body = std::fs::read_to_string(path)?;
    parse_event_log(&body)
}

pub fn parse_event_log(body: &str) -> Result<EventLog, Error> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "proj-a": [
            {"date": "2020-01-01", "is_pr": false, "type": "opened", "user": "u1"},
            {"date": "2020-01-02T09:00:00Z", "is_pr": true, "type": "closed", "user": "u2"}
        ],
        "proj-b": []
    }"#;

    #[test]
    fn parses_keyed_event_arrays() {
        let log = parse_event_log(SAMPLE).unwrap();
        assert_eq!(log.len(), 2);
        let events = &log["proj-a"];
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::Opened);
        assert_eq!(events[1].kind, EventKind::Closed);
        assert!(events[1].is_pr);
        assert!(log["proj-b"].is_empty());
    }

    #[test]
    fn keys_iterate_in_sorted_order() {
        let log = parse_event_log(r#"{"zeta": [], "alpha": [], "mid": []}"#).unwrap();
        let keys: Vec<&str> = log.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let err = parse_event_log("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let err = parse_event_log(
            r#"{"a": [{"date": "2020-01-01", "is_pr": false, "type": "reopened", "user": "u"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn reads_event_log_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let log = read_event_log(file.path()).unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_event_log(Path::new("/nonexistent/data.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
