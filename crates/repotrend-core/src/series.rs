//! Dense daily series construction.
//!
//! Turns a chronological stream of (date, value) observations, possibly with
//! repeated or skipped dates, into a gap-free daily step function.

use chrono::NaiveDate;

use crate::{Error, Series, Visibility};

/// Append-only builder for a dense daily series.
///
/// Observations must arrive in non-decreasing date order. A repeated date
/// overwrites the previous value (the last observation of a day wins); a
/// skipped range of days is filled by carrying the previous value forward,
/// so charts render a step function rather than a slanted line.
#[derive(Debug, Default)]
pub struct DateSeriesBuilder {
    x: Vec<NaiveDate>,
    y: Vec<i64>,
}

impl DateSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, date: NaiveDate, value: i64) -> Result<(), Error> {
        match self.x.last().copied() {
            None => {
                self.x.push(date);
                self.y.push(value);
            }
            Some(last) if date == last => {
                if let Some(slot) = self.y.last_mut() {
                    *slot = value;
                }
            }
            Some(last) if date > last => {
                let held = self.y.last().copied().unwrap_or_default();
                let mut day = last;
                while let Some(next) = day.succ_opt() {
                    if next >= date {
                        break;
                    }
                    self.x.push(next);
                    self.y.push(held);
                    day = next;
                }
                self.x.push(date);
                self.y.push(value);
            }
            Some(last) => {
                return Err(Error::OutOfOrderInput {
                    prev: last,
                    next: date,
                })
            }
        }
        Ok(())
    }

    /// Extend the series to `today` by carrying the last value forward, so a
    /// freshly rendered chart never shows a stale tail. No-op when a point
    /// for `today` already exists; a builder with no observations yields the
    /// single point `(today, 0)`.
    pub fn finalize(&mut self, today: NaiveDate) -> Result<(), Error> {
        let held = self.y.last().copied().unwrap_or(0);
        self.record(today, held)
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn into_series(self, name: impl Into<String>) -> Series {
        Series {
            name: name.into(),
            x: self.x,
            y: self.y,
            stack_group: None,
            visibility: Visibility::LegendOnly,
        }
    }
}
