use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("calendar requires at least one working day")]
    NoWorkingDays,
    #[error("day offset {0} is before the project start")]
    NegativeOffset(i64),
    #[error("working day {offset} after {start} is beyond the supported date range")]
    OutOfRange { start: NaiveDate, offset: i64 },
}

/// Working weekdays plus explicit holidays. Maps CPM day offsets onto dates.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    working_days: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Every day of the week is a working day and there are no holidays.
    pub fn continuous() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::new(),
        }
    }

    pub fn custom<I, J>(working_days: I, holidays: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let config = WorkCalendarConfig::new(working_days, holidays)?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        if config.working_days.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !config.working_days.contains(day))
            .collect();
        Ok(Self {
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
        })
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn set_working_days(&mut self, days: &[Weekday]) -> Result<(), CalendarError> {
        if days.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
        Ok(())
    }

    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// `None` when no working day exists before chrono's maximum date.
    pub fn first_available_on_or_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut current = date;
        while !self.is_available(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    /// Next working day strictly after `from`.
    pub fn next_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        self.first_available_on_or_after(from.succ_opt()?)
    }

    /// Date of working day `offset`, where offset 0 is the first working day
    /// on or after `start`.
    ///
    /// Skips whole weeks at a time, so the cost grows with the number of
    /// holidays crossed rather than with `offset`.
    pub fn date_for_offset(
        &self,
        start: NaiveDate,
        offset: i64,
    ) -> Result<NaiveDate, CalendarError> {
        if offset < 0 {
            return Err(CalendarError::NegativeOffset(offset));
        }
        let out_of_range = || CalendarError::OutOfRange { start, offset };

        // `current` is always a working day with index `offset - remaining`.
        let mut current = self.first_available_on_or_after(start).ok_or_else(out_of_range)?;
        let mut remaining = offset;
        let per_week = 7 - self.non_working_days.len() as i64;

        while remaining >= per_week {
            let weeks = remaining / per_week;
            let jump = Duration::try_weeks(weeks)
                .and_then(|span| current.checked_add_signed(span))
                .ok_or_else(out_of_range)?;
            let lost = self.holidays_on_working_days(current, jump);
            remaining -= weeks * per_week - lost;
            current = self.first_available_on_or_after(jump).ok_or_else(out_of_range)?;
        }
        for _ in 0..remaining {
            current = self.next_available(current).ok_or_else(out_of_range)?;
        }
        Ok(current)
    }

    /// Working days in `start..=end`.
    pub fn count_available_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| self.is_available(*date))
            .count() as i64
    }

    /// Holidays in `from..until` that would otherwise be working days.
    fn holidays_on_working_days(&self, from: NaiveDate, until: NaiveDate) -> i64 {
        self.holidays
            .iter()
            .filter(|date| **date >= from && **date < until)
            .filter(|date| !self.non_working_days.contains(&date.weekday()))
            .count() as i64
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Ok(Self {
            working_days: working,
            holidays,
        })
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working_days = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day))
            .collect();

        let mut holidays: Vec<NaiveDate> = calendar.holidays.iter().copied().collect();
        holidays.sort();

        Self {
            working_days,
            holidays,
        }
    }
}
