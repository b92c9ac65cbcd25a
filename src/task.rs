use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Work status shared by tasks and milestones.
///
/// Text the loader cannot map is kept as `Unrecognized` so the engine can
/// report it instead of the loader silently guessing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Completed,
    InProgress,
    NotStarted,
    Unrecognized(String),
}

impl TaskStatus {
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_ascii_lowercase().replace('_', " ");
        match normalized.as_str() {
            "completed" => Self::Completed,
            "in progress" => Self::InProgress,
            "not started" => Self::NotStarted,
            _ => Self::Unrecognized(input.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "Completed",
            Self::InProgress => "In Progress",
            Self::NotStarted => "Not Started",
            Self::Unrecognized(raw) => raw.as_str(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Risk level in the inclusive range 1 (lowest) to 5 (critical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RiskLevel(u8);

impl RiskLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(raw: i64) -> Option<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&raw) {
            u8::try_from(raw).ok().map(Self)
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of project work as handed over by a loader.
///
/// Fields are typed but not yet checked against the project invariants;
/// `validation::screen_tasks` does that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub department: String,
    pub resource_name: String,
    pub planned_value: f64,
    pub actual_cost: f64,
    pub earned_value: f64,
    pub status: TaskStatus,
    pub risk_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<NaiveDate>,
}

impl Task {
    pub fn new(name: impl Into<String>, planned_value: f64, actual_cost: f64, earned_value: f64) -> Self {
        Self {
            name: name.into(),
            department: String::new(),
            resource_name: String::new(),
            planned_value,
            actual_cost,
            earned_value,
            status: TaskStatus::NotStarted,
            risk_level: 1,
            estimated_completion_date: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_resource(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_name = resource_name.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_risk_level(mut self, risk_level: i64) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn with_estimated_completion(mut self, date: NaiveDate) -> Self {
        self.estimated_completion_date = Some(date);
        self
    }
}
