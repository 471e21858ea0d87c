use crate::error::{Result, VaxError};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const DATE_FORMAT: &str = "%d/%m/%Y";

static DATE_RE: OnceLock<Regex> = OnceLock::new();

fn date_re() -> &'static Regex {
    DATE_RE.get_or_init(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap())
}

/// Parse `D/M/YYYY` (leading zeros optional). Impossible dates are rejected.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    if !date_re().is_match(text) {
        return Err(VaxError::InvalidDate(text.to_string()));
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| VaxError::InvalidDate(text.to_string()))
}

/// Whole weeks from `date` to `today`, rounded toward negative infinity.
pub fn weeks_since(date: NaiveDate, today: NaiveDate) -> i64 {
    (today - date).num_days().div_euclid(7)
}

// ---------------------------------------------------------------------------
// DoseWindow
// ---------------------------------------------------------------------------

/// Weeks after the first dose during which the second is on time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseWindow {
    pub min_weeks: i64,
    pub max_weeks: i64,
}

impl Default for DoseWindow {
    fn default() -> Self {
        Self {
            min_weeks: 4,
            max_weeks: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "band", rename_all = "snake_case")]
pub enum Eligibility {
    /// First dose lies in the future.
    Reject,
    NotYetEligible { weeks_remaining: i64 },
    OnTime,
    /// Advisory only; scheduling proceeds.
    Late { weeks_late: i64 },
}

impl Eligibility {
    pub fn classify(weeks: i64, window: DoseWindow) -> Self {
        if weeks < 0 {
            Eligibility::Reject
        } else if weeks < window.min_weeks {
            Eligibility::NotYetEligible {
                weeks_remaining: window.min_weeks - weeks,
            }
        } else if weeks <= window.max_weeks {
            Eligibility::OnTime
        } else {
            Eligibility::Late {
                weeks_late: weeks - window.max_weeks,
            }
        }
    }

    pub fn may_proceed(self) -> bool {
        matches!(self, Eligibility::OnTime | Eligibility::Late { .. })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Eligibility::Reject => "reject",
            Eligibility::NotYetEligible { .. } => "not_yet_eligible",
            Eligibility::OnTime => "on_time",
            Eligibility::Late { .. } => "late",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_day_month_year() {
        assert_eq!(parse_date("12/5/2021").unwrap(), d(2021, 5, 12));
        assert_eq!(parse_date("03/11/2020").unwrap(), d(2020, 11, 3));
    }

    #[test]
    fn rejects_malformed_and_impossible_dates() {
        let bad_inputs = [
            "31/02/2021",
            "2021-05-12",
            "12/5/21",
            "12/13/2021",
            "",
            "q",
            "1/1/20211",
        ];
        for bad in bad_inputs {
            assert!(
                matches!(parse_date(bad), Err(VaxError::InvalidDate(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn weeks_floor_toward_negative() {
        let today = d(2021, 5, 10);
        assert_eq!(weeks_since(d(2021, 4, 5), today), 5);
        assert_eq!(weeks_since(d(2021, 5, 4), today), 0);
        assert_eq!(weeks_since(d(2021, 5, 12), today), -1);
        assert_eq!(weeks_since(today, today), 0);
    }

    #[test]
    fn weeks_since_is_pure() {
        let (a, b) = (d(2021, 1, 1), d(2021, 3, 1));
        assert_eq!(weeks_since(a, b), weeks_since(a, b));
    }

    #[test]
    fn band_boundaries() {
        let w = DoseWindow::default();
        assert_eq!(Eligibility::classify(-1, w), Eligibility::Reject);
        assert_eq!(
            Eligibility::classify(0, w),
            Eligibility::NotYetEligible { weeks_remaining: 4 }
        );
        assert_eq!(
            Eligibility::classify(3, w),
            Eligibility::NotYetEligible { weeks_remaining: 1 }
        );
        assert_eq!(Eligibility::classify(4, w), Eligibility::OnTime);
        assert_eq!(Eligibility::classify(8, w), Eligibility::OnTime);
        assert_eq!(
            Eligibility::classify(9, w),
            Eligibility::Late { weeks_late: 1 }
        );
    }

    #[test]
    fn bands_partition_the_integers() {
        let w = DoseWindow::default();
        for weeks in -50..200 {
            let band = Eligibility::classify(weeks, w);
            let hits = [
                weeks < 0,
                (0..4).contains(&weeks),
                (4..=8).contains(&weeks),
                weeks > 8,
            ];
            assert_eq!(hits.iter().filter(|h| **h).count(), 1);
            let expected = hits.iter().position(|h| *h).unwrap();
            let got = match band {
                Eligibility::Reject => 0,
                Eligibility::NotYetEligible { .. } => 1,
                Eligibility::OnTime => 2,
                Eligibility::Late { .. } => 3,
            };
            assert_eq!(got, expected, "weeks = {weeks}");
        }
    }
}
