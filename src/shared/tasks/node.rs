use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::shared::dates::parse_date;

/// Task status label. The three well-known labels get their own variants;
/// anything else the client stores is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Other(String),
}

impl TaskStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Not Started" => Self::NotStarted,
            "In Progress" => Self::InProgress,
            "Completed" => Self::Completed,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(s) => s,
            other => other.label().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Timestamped free-text note attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Recursive schedule node. A node with no subtasks is a leaf and owns its
/// `progress`; a parent's `progress` is always derived from its subtasks.
///
/// Optional fields serialize as `null` rather than being skipped, so an
/// absent date stays distinguishable from an empty string or a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: String,
    #[serde(default)]
    pub wbs: String,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub planned_start_date: Option<String>,
    #[serde(default)]
    pub planned_end_date: Option<String>,
    #[serde(default)]
    pub predecessor_string: Option<String>,
    #[serde(default, deserialize_with = "lenient::duration")]
    pub original_duration_days: Option<f64>,
    #[serde(default, deserialize_with = "lenient::weight")]
    pub weightage: f64,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub actual_start_date: Option<String>,
    #[serde(default)]
    pub actual_end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::percent")]
    pub progress: u8,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub is_client_deliverable: bool,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub is_critical: bool,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub dependencies: Vec<String>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub client_comments: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient::days")]
    pub delay_weather_days: u32,
    #[serde(default, deserialize_with = "lenient::days")]
    pub delay_contractor_days: u32,
    #[serde(default, deserialize_with = "lenient::days")]
    pub delay_client_days: u32,
    #[serde(default = "default_expanded", deserialize_with = "expanded")]
    pub is_expanded: bool,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub subtasks: Vec<TaskNode>,
}

fn default_expanded() -> bool {
    true
}

fn expanded<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

// ── TaskNode helpers ────────────────────────────────────────────────

impl TaskNode {
    /// Fresh node with every field at its default: no dates, zero weight,
    /// zero progress, "Not Started".
    pub fn new(wbs: impl Into<String>) -> Self {
        let wbs = wbs.into();
        Self {
            id: wbs.clone(),
            wbs,
            task_name: None,
            planned_start_date: None,
            planned_end_date: None,
            predecessor_string: None,
            original_duration_days: None,
            weightage: 0.0,
            notes: Vec::new(),
            actual_start_date: None,
            actual_end_date: None,
            progress: 0,
            status: TaskStatus::NotStarted,
            is_client_deliverable: false,
            is_critical: false,
            dependencies: Vec::new(),
            client_comments: Vec::new(),
            delay_weather_days: 0,
            delay_contractor_days: 0,
            delay_client_days: 0,
            is_expanded: true,
            subtasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.subtasks.is_empty()
    }

    /// Name for display; empty when the source row had none.
    pub fn display_name(&self) -> &str {
        self.task_name.as_deref().unwrap_or("")
    }

    /// Weight used for roll-ups. Anything that is not a finite positive
    /// number counts as zero.
    pub fn effective_weight(&self) -> f64 {
        if self.weightage.is_finite() && self.weightage > 0.0 {
            self.weightage
        } else {
            0.0
        }
    }

    pub fn planned_start(&self) -> Option<NaiveDate> {
        self.planned_start_date.as_deref().and_then(parse_date)
    }

    pub fn planned_end(&self) -> Option<NaiveDate> {
        self.planned_end_date.as_deref().and_then(parse_date)
    }

    pub fn actual_end(&self) -> Option<NaiveDate> {
        self.actual_end_date.as_deref().and_then(parse_date)
    }
}
