use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Calendar date of CPM day 0 (moved forward to the first working day).
    pub start_date: NaiveDate,
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self {
            name: "New Project".to_string(),
            description: "No description".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap_or_default(),
        }
    }
}
