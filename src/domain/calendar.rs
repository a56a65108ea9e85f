use chrono::{Datelike, Days, Months, NaiveDate};

use super::{consultation::ConsultationRequest, profile::UserProfile};

/// Titles shown per day before collapsing the rest into `+N more`.
pub const MAX_TITLES_PER_DAY: usize = 2;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    first: NaiveDate,
}

impl MonthView {
    /// Returns `None` unless `month` is within 1..=12 and the year is one chrono can represent.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.trim().split_once('-')?;
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn title(&self) -> String {
        format!(
            "{} {}",
            MONTH_NAMES[self.first.month0() as usize],
            self.first.year()
        )
    }

    /// `None` past the last month chrono supports.
    pub fn next(&self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }

    /// `None` before the first month chrono supports.
    pub fn previous(&self) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        match self.next() {
            Some(next) => (next.first - self.first).num_days() as u32,
            // Only the final supported December has no successor.
            None => 31,
        }
    }

    /// Leading blank cells in a Sunday-first grid.
    pub fn first_weekday_offset(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    pub fn entries_for<'a>(
        &self,
        day: u32,
        consultations: &'a [ConsultationRequest],
        viewer: &UserProfile,
    ) -> Vec<&'a ConsultationRequest> {
        let Some(date) = self.date(day) else {
            return Vec::new();
        };

        consultations
            .iter()
            .filter(|item| item.deadline == date && viewer.can_view(&item.client_id))
            .collect()
    }
}
