//! Recurrence rules and the next-occurrence calculator.
//!
//! Two rule kinds are supported:
//! - `y`: every year on the anchor's month/day
//! - `d N`: every N days, `1 <= N <= 400`
//!
//! The calculator always moves the anchor forward by at least one period,
//! even when the anchor already lies on or after the reference date.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};

use crate::date::{format_date, parse_date};
use crate::error::TodoError;

/// Largest interval accepted by a `d N` rule.
pub const MAX_DAILY_INTERVAL: u32 = 400;

/// A parsed repeat rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatRule {
    /// `y`
    Yearly,
    /// `d N`
    Daily(u32),
}

impl FromStr for RepeatRule {
    type Err = TodoError;

    /// Parse a rule string. Tokens after the ones a rule needs are ignored.
    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let mut parts = rule.split_whitespace();
        let kind = parts
            .next()
            .ok_or_else(|| TodoError::InvalidRepeat("empty repeat rule".to_string()))?;

        match kind {
            "y" => Ok(Self::Yearly),
            "d" => {
                let raw = parts.next().ok_or_else(|| {
                    TodoError::InvalidRepeat("daily rule needs an interval: d <days>".to_string())
                })?;
                raw.parse::<u32>()
                    .ok()
                    .filter(|days| (1..=MAX_DAILY_INTERVAL).contains(days))
                    .map(Self::Daily)
                    .ok_or_else(|| {
                        TodoError::InvalidRepeat(format!("invalid number of days: {raw}"))
                    })
            }
            other => Err(TodoError::UnsupportedRepeat(other.to_string())),
        }
    }
}

impl RepeatRule {
    /// Compute the next occurrence of `anchor` relative to `now`.
    ///
    /// - Yearly: an anchor before `now` steps a year at a time until it is no
    ///   longer before `now`; any other anchor steps exactly one year.
    /// - Daily: an anchor on or before `now` lands on the first
    ///   `anchor + k * N` strictly after `now`; a future anchor steps exactly
    ///   N days.
    pub fn advance(&self, now: NaiveDate, anchor: NaiveDate) -> Result<NaiveDate, TodoError> {
        match *self {
            Self::Yearly => {
                let mut date = add_year(anchor)?;
                while date < now {
                    date = add_year(date)?;
                }
                Ok(date)
            }
            Self::Daily(days) => {
                let days = u64::from(days);
                let steps = if anchor <= now {
                    // Days elapsed is non-negative here.
                    let elapsed = (now - anchor).num_days() as u64;
                    elapsed / days + 1
                } else {
                    1
                };
                anchor
                    .checked_add_days(Days::new(steps * days))
                    .ok_or_else(|| out_of_range(anchor))
            }
        }
    }
}

/// Compute the next occurrence date for a task.
///
/// Returns `Ok(None)` when `rule` is empty (a one-off task). The anchor is
/// validated before the rule, so a malformed anchor fails even without a rule.
pub fn next_date(now: NaiveDate, anchor: &str, rule: &str) -> Result<Option<String>, TodoError> {
    let anchor = parse_date(anchor)?;

    if rule.is_empty() {
        return Ok(None);
    }

    let rule: RepeatRule = rule.parse()?;
    let next = rule.advance(now, anchor)?;
    Ok(Some(format_date(next)))
}

/// Add one calendar year. Feb 29 rolls over to Mar 1 in non-leap years.
fn add_year(date: NaiveDate) -> Result<NaiveDate, TodoError> {
    let year = date.year() + 1;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .ok_or_else(|| out_of_range(date))
}

fn out_of_range(date: NaiveDate) -> TodoError {
    TodoError::InvalidDate(format!("{} cannot be advanced further", format_date(date)))
}
