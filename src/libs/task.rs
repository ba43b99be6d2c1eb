use super::error::FieldError;
use super::messages::Message;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status {:?}", other)),
        }
    }
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// A task row as stored; references are bare user ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    pub created_by: String,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Validated task fields ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    pub created_by: String,
    pub due_date: DateTime<Utc>,
}

/// Which tasks a listing may see.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskScope {
    All,
    AssignedTo(String),
}

/// Body of `POST /tasks`. Every field is optional here so that missing
/// values surface as field errors instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
}

impl CreateTaskRequest {
    /// Checks the shape of the request. Whether `assigned_to` names a student
    /// needs the store and is checked by the caller.
    pub fn validate(&self, created_by: &str) -> Result<NewTask, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = non_blank(self.title.as_deref());
        if title.is_none() {
            errors.push(FieldError::new("title", Message::TitleRequired));
        }
        let description = non_blank(self.description.as_deref());
        if description.is_none() {
            errors.push(FieldError::new("description", Message::DescriptionRequired));
        }
        let assigned_to = non_blank(self.assigned_to.as_deref());
        if assigned_to.is_none() {
            errors.push(FieldError::new("assigned_to", Message::AssigneeRequired));
        }
        let due_date = self.due_date.as_deref().and_then(parse_due_date);
        if due_date.is_none() {
            errors.push(FieldError::new("due_date", Message::DueDateInvalid));
        }

        match (title, description, assigned_to, due_date) {
            (Some(title), Some(description), Some(assigned_to), Some(due_date)) if errors.is_empty() => Ok(NewTask {
                title,
                description,
                assigned_to,
                created_by: created_by.to_string(),
                due_date,
            }),
            _ => Err(errors),
        }
    }
}

/// Body of `PATCH /tasks/:id/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

impl StatusUpdateRequest {
    pub fn validate(&self) -> Result<TaskStatus, Vec<FieldError>> {
        self.status
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| vec![FieldError::new("status", Message::InvalidStatus)])
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Parses an ISO 8601 date or date-time. Values without an offset are taken
/// as UTC; a bare date means midnight UTC.
pub fn parse_due_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorRef {
    pub id: String,
    pub name: String,
}

/// A task with its user references resolved for presentation. A reference
/// whose user no longer exists is `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub assigned_to: Option<AssigneeRef>,
    pub created_by: Option<CreatorRef>,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
