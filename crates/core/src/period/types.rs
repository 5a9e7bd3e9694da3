//! Budgeting period types.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::error::PeriodError;

/// Date range whose transactions an analysis considers. Both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BudgetingPeriod {
    /// A calendar month, e.g. 2024-04-01 to 2024-04-30.
    CalendarMonth {
        /// Four-digit year.
        year: i32,
        /// Month, 1-12.
        month: u32,
    },
    /// A calendar year, January 1 to December 31.
    CalendarYear {
        /// Four-digit year.
        year: i32,
    },
    /// First Friday of the month through the Thursday before the next
    /// month's first Friday.
    PaydateMonth {
        /// Four-digit year.
        year: i32,
        /// Month, 1-12.
        month: u32,
    },
    /// Arbitrary range.
    Custom {
        /// First day.
        start: NaiveDate,
        /// Last day.
        end: NaiveDate,
    },
}

impl BudgetingPeriod {
    /// Calendar month period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMonth` if the month is not 1-12.
    pub fn calendar_month(year: i32, month: u32) -> Result<Self, PeriodError> {
        let period = Self::CalendarMonth { year, month };
        period.bounds()?;
        Ok(period)
    }

    /// Calendar year period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidYear` if the year cannot be represented.
    pub fn calendar_year(year: i32) -> Result<Self, PeriodError> {
        let period = Self::CalendarYear { year };
        period.bounds()?;
        Ok(period)
    }

    /// Paydate month period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMonth` if the month is not 1-12.
    pub fn paydate_month(year: i32, month: u32) -> Result<Self, PeriodError> {
        let period = Self::PaydateMonth { year, month };
        period.bounds()?;
        Ok(period)
    }

    /// Custom period.
    ///
    /// # Errors
    ///
    /// Returns `EndBeforeStart` if `end < start`.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        let period = Self::Custom { start, end };
        period.bounds()?;
        Ok(period)
    }

    /// The calendar month containing `date`.
    #[must_use]
    pub fn month_of(date: NaiveDate) -> Self {
        Self::CalendarMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First and last day of the period.
    ///
    /// # Errors
    ///
    /// Returns an error if the period's parameters do not form a valid range.
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate), PeriodError> {
        match *self {
            Self::CalendarMonth { year, month } => {
                let start = first_of_month(year, month)?;
                let (next_year, next_month) = next_month(year, month);
                let end = day_before(first_of_month(next_year, next_month)?, year, month)?;
                Ok((start, end))
            }
            Self::CalendarYear { year } => {
                let start =
                    NaiveDate::from_ymd_opt(year, 1, 1).ok_or(PeriodError::InvalidYear(year))?;
                let end =
                    NaiveDate::from_ymd_opt(year, 12, 31).ok_or(PeriodError::InvalidYear(year))?;
                Ok((start, end))
            }
            Self::PaydateMonth { year, month } => {
                let start = first_friday(year, month)?;
                let (next_year, next_month) = next_month(year, month);
                let end = day_before(first_friday(next_year, next_month)?, year, month)?;
                Ok((start, end))
            }
            Self::Custom { start, end } => {
                if end < start {
                    return Err(PeriodError::EndBeforeStart { start, end });
                }
                Ok((start, end))
            }
        }
    }

    /// First day of the period.
    ///
    /// # Errors
    ///
    /// See [`BudgetingPeriod::bounds`].
    pub fn start_date(&self) -> Result<NaiveDate, PeriodError> {
        self.bounds().map(|(start, _)| start)
    }

    /// Last day of the period.
    ///
    /// # Errors
    ///
    /// See [`BudgetingPeriod::bounds`].
    pub fn end_date(&self) -> Result<NaiveDate, PeriodError> {
        self.bounds().map(|(_, end)| end)
    }

    /// Returns true if `date` falls within the period. An invalid period
    /// contains nothing.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.bounds()
            .is_ok_and(|(start, end)| start <= date && date <= end)
    }

    /// Returns true if the whole period lies before `today`.
    #[must_use]
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.end_date().is_ok_and(|end| end < today)
    }

    /// Human-readable label, e.g. `"April 2024"` or
    /// `"2024-03-01 - 2024-04-04"`.
    #[must_use]
    pub fn description(&self) -> String {
        match (self, self.bounds()) {
            (_, Err(err)) => err.to_string(),
            (Self::CalendarMonth { .. }, Ok((start, _))) => start.format("%B %Y").to_string(),
            (Self::CalendarYear { year }, Ok(_)) => year.to_string(),
            (Self::PaydateMonth { .. } | Self::Custom { .. }, Ok((start, end))) => {
                format!("{start} - {end}")
            }
        }
    }
}

const fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, PeriodError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(PeriodError::InvalidMonth { year, month })
}

fn first_friday(year: i32, month: u32) -> Result<NaiveDate, PeriodError> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Fri, 1)
        .ok_or(PeriodError::InvalidMonth { year, month })
}

fn day_before(date: NaiveDate, year: i32, month: u32) -> Result<NaiveDate, PeriodError> {
    date.checked_sub_days(Days::new(1))
        .ok_or(PeriodError::InvalidMonth { year, month })
}
