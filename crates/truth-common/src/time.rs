//! Date handling for alert-anchored catalog searches.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{TruthError, TruthResult};

/// Parse an alert date in `YYYY-MM-DD` form.
pub fn parse_alert_date(s: &str) -> TruthResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| TruthError::InvalidArgument(format!("invalid date: {}", s)))
}

/// An inclusive date window ending at a target date, used to bound
/// backward-looking catalog searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl SearchWindow {
    /// Window covering `[end - days_back, end]`.
    pub fn ending_at(end: NaiveDate, days_back: i64) -> Self {
        Self {
            begin: end - Duration::days(days_back),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.begin && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_alert_date() {
        let date = parse_alert_date("2014-09-30").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2014, 9, 30).unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_alert_date("2014/09/30").is_err());
        assert!(parse_alert_date("not-a-date").is_err());
        assert!(parse_alert_date("2014-13-01").is_err());
    }

    #[test]
    fn test_window_ending_at() {
        let end = NaiveDate::from_ymd_opt(2014, 9, 30).unwrap();
        let window = SearchWindow::ending_at(end, 180);
        assert_eq!(window.end, end);
        assert_eq!(window.begin, NaiveDate::from_ymd_opt(2014, 4, 3).unwrap());
        assert!(window.contains(end));
        assert!(window.contains(window.begin));
        assert!(!window.contains(window.begin - Duration::days(1)));
    }
}
