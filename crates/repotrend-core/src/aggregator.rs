//! Event-log aggregation into daily series.
//!
//! Each function scans one project key's events in supplied order, owns its
//! counter state for the duration of the call, and feeds a
//! [`DateSeriesBuilder`]. Events are assumed non-decreasing by date; the
//! first violation aborts with [`Error::OutOfOrderInput`].

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{DateSeriesBuilder, Error, Event, EventKind, Series};

/// Calendar day of an event: the first 10 characters of its date string.
fn event_day(event: &Event) -> Result<NaiveDate, Error> {
    event
        .date
        .get(..10)
        .and_then(|prefix| prefix.parse().ok())
        .ok_or_else(|| Error::MalformedDate(event.date.clone()))
}

/// Daily count of opened items of one kind for one project key.
///
/// With `cumulative` false this tracks the currently-open count: "opened"
/// increments, "closed" decrements. A "closed" event whose "opened" predates
/// the log window still decrements, which can drive the count negative; that
/// is a property of the data window and is preserved as-is. With `cumulative`
/// true, "closed" events are ignored and the count never decreases.
pub fn count_opened(
    name: &str,
    events: &[Event],
    is_pr: bool,
    cumulative: bool,
    today: NaiveDate,
) -> Result<Series, Error> {
    let mut open: i64 = 0;
    let mut builder = DateSeriesBuilder::new();

    for event in events {
        if event.is_pr != is_pr {
            continue;
        }
        match event.kind {
            EventKind::Opened => open += 1,
            EventKind::Closed if cumulative => continue,
            EventKind::Closed => open -= 1,
        }
        builder.record(event_day(event)?, open)?;
    }

    builder.finalize(today)?;
    Ok(builder.into_series(name))
}

/// Cumulative count of distinct users who opened at least one item of one
/// kind for one project key. Monotone by construction: only a user's first
/// qualifying "opened" event is counted, "closed" events never participate.
pub fn count_users(
    name: &str,
    events: &[Event],
    is_pr: bool,
    today: NaiveDate,
) -> Result<Series, Error> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut users: i64 = 0;
    let mut builder = DateSeriesBuilder::new();

    for event in events {
        if event.is_pr != is_pr || event.kind == EventKind::Closed {
            continue;
        }
        if !seen.insert(event.user.as_str()) {
            continue;
        }
        users += 1;
        builder.record(event_day(event)?, users)?;
    }

    builder.finalize(today)?;
    Ok(builder.into_series(name))
}
