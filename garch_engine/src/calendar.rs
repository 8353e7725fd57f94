//! Forecast date labelling.
//!
//! `Weekdays` skips Saturdays and Sundays so that each forecast step lands on
//! a plausible trading day. Exchange holidays are not modelled. `Calendar`
//! advances one calendar day per step.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ForecastCalendar {
    Weekdays,
    Calendar,
}

impl std::str::FromStr for ForecastCalendar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekdays" | "business" => Ok(ForecastCalendar::Weekdays),
            "calendar" => Ok(ForecastCalendar::Calendar),
            other => Err(format!("unknown forecast calendar '{other}' (expected weekdays|calendar)")),
        }
    }
}

/// `count` dates strictly after `last`.
pub fn forward_dates(last: NaiveDate, count: usize, calendar: ForecastCalendar) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut d = last;
    while dates.len() < count {
        let Some(next) = d.checked_add_days(Days::new(1)) else {
            break;
        };
        d = next;
        let weekend = matches!(d.weekday(), Weekday::Sat | Weekday::Sun);
        if calendar == ForecastCalendar::Calendar || !weekend {
            dates.push(d);
        }
    }
    dates
}
