use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::errors::{Result, SchemeError};

/// billing calendar for an enrollment.
///
/// All computations clamp the billing day to the target month's length:
/// billing day 31 falls on the 30th of a 30-day month and on Feb 28/29.
/// The clamp applies to every month, not just the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BillingSchedule {
    pub billing_day_of_month: u8,
}

impl BillingSchedule {
    pub fn new(billing_day_of_month: u8) -> Result<Self> {
        if billing_day_of_month < 1 || billing_day_of_month > 31 {
            return Err(SchemeError::InvalidBillingDay {
                day: billing_day_of_month,
            });
        }
        Ok(Self {
            billing_day_of_month,
        })
    }

    /// first calendar day of the start date's month
    pub fn first_billing_month(start: DateTime<Utc>) -> Result<NaiveDate> {
        Self::month_of(start.date_naive())
    }

    /// first calendar day of the given date's month
    pub fn month_of(date: NaiveDate) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1).ok_or_else(|| {
            SchemeError::InvalidDate {
                message: format!("no first day for {}-{}", date.year(), date.month()),
            }
        })
    }

    /// due date for a billing month: the billing day of the following month
    pub fn due_date_for_month(&self, month: NaiveDate) -> Result<NaiveDate> {
        let next = Self::add_months(Self::month_of(month)?, 1)?;
        let day = (self.billing_day_of_month as u32).min(days_in_month(next.year(), next.month()));

        NaiveDate::from_ymd_opt(next.year(), next.month(), day).ok_or_else(|| {
            SchemeError::InvalidDate {
                message: format!("no day {} in {}-{}", day, next.year(), next.month()),
            }
        })
    }

    /// due date of the first billing month for an enrollment starting `start`
    pub fn next_due_date(&self, start: DateTime<Utc>) -> Result<NaiveDate> {
        self.due_date_for_month(Self::first_billing_month(start)?)
    }

    /// add calendar months, clamping the day to the target month's length
    pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
        let zero_based = date.month0() as i64 + months as i64;
        let year = date.year() + (zero_based / 12) as i32;
        let month = (zero_based % 12) as u32 + 1;
        let day = date.day().min(days_in_month(year, month));

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| SchemeError::InvalidDate {
            message: format!("no day {} in {}-{}", day, year, month),
        })
    }

    /// maturity date: enrollment start plus the plan duration in months
    pub fn maturity_date(start: DateTime<Utc>, duration_months: u32) -> Result<NaiveDate> {
        Self::add_months(start.date_naive(), duration_months)
    }
}

/// days in a calendar month, leap-year aware
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

/// check if year is a leap year
fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
