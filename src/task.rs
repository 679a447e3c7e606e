use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "Id")]
    pub id: u32,
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Description")]
    pub description: String,
    #[serde(alias = "DueDate", deserialize_with = "deserialize_due_date")]
    pub due_date: NaiveDate,
    #[serde(default, alias = "IsCompleted")]
    pub completed: bool,
}

impl Task {
    pub fn status_label(&self) -> &'static str {
        if self.completed {
            "Done"
        } else {
            "Not done"
        }
    }

    /// One-line summary used by list and search views.
    pub fn summary(&self) -> String {
        format!(
            "{}. {} - {} (Due: {})",
            self.id,
            self.title,
            self.status_label(),
            self.due_date.format("%Y-%m-%d")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    IncompleteOnly,
    CompleteOnly,
    SortedByDueDate,
}

impl TaskFilter {
    pub fn label(self) -> &'static str {
        match self {
            TaskFilter::All => "All tasks",
            TaskFilter::IncompleteOnly => "Not done",
            TaskFilter::CompleteOnly => "Done",
            TaskFilter::SortedByDueDate => "Sorted by due date",
        }
    }
}

/// Parses a due date typed by the user. A trailing time of day is dropped.
pub fn parse_due_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| Error::InvalidInput(format!("'{}' is not a valid date (YYYY-MM-DD)", input)))
}

// Older data files store the due date with a midnight time component.
fn deserialize_due_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_due_date(&raw).map_err(serde::de::Error::custom)
}
