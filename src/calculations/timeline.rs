use super::CpmNode;
use crate::calendar::{CalendarError, WorkCalendar};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub late_start_date: NaiveDate,
    pub late_finish_date: NaiveDate,
    pub is_critical: bool,
}

/// CPM offsets laid onto working days of a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub project_start: NaiveDate,
    pub project_finish: Option<NaiveDate>,
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn build(
        nodes: &[CpmNode],
        calendar: &WorkCalendar,
        project_start: NaiveDate,
    ) -> Result<Self, CalendarError> {
        let mut entries = Vec::with_capacity(nodes.len());
        for node in nodes {
            let (start_date, finish_date) =
                span(calendar, project_start, node.earliest_start, node.earliest_finish)?;
            let (late_start_date, late_finish_date) =
                span(calendar, project_start, node.latest_start, node.latest_finish)?;
            entries.push(TimelineEntry {
                id: node.id.clone(),
                start_date,
                finish_date,
                late_start_date,
                late_finish_date,
                is_critical: node.is_critical,
            });
        }

        let project_finish = entries.iter().map(|entry| entry.finish_date).max();

        Ok(Self {
            project_start: calendar.date_for_offset(project_start, 0)?,
            project_finish,
            entries,
        })
    }
}

/// A task occupying offsets `start..finish` works from the date of `start`
/// through the date of `finish - 1`. Zero-length tasks sit on their start date.
fn span(
    calendar: &WorkCalendar,
    project_start: NaiveDate,
    start: i64,
    finish: i64,
) -> Result<(NaiveDate, NaiveDate), CalendarError> {
    let start_date = calendar.date_for_offset(project_start, start)?;
    let finish_date = if finish > start {
        calendar.date_for_offset(project_start, finish - 1)?
    } else {
        start_date
    };
    Ok((start_date, finish_date))
}
