//! Completion statistics for the admin reports.
//!
//! ## Completion Rate
//!
//! ```text
//! completionRate = completedTasks / totalTasks * 100
//! ```
//!
//! The ratio is taken in floating point before scaling. The grouped report
//! only ever sees groups with at least one task; the per-student report
//! defines the rate of a student without tasks as 0.

use super::task::TaskView;
use super::user::UserProfile;
use serde::Serialize;

/// Raw per-assignee counts as produced by the grouped store query.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionGroup {
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCompletion {
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub student: UserProfile,
    pub task_stats: TaskCounts,
    pub completion_rate: f64,
    pub recent_tasks: Vec<TaskView>,
}

/// Percentage of completed tasks, 0 when there are none.
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (completed as f64 / total as f64) * 100.0
}

/// Computes each group's rate and orders the report: highest rate first,
/// then by student name, then by student id.
pub fn rank(groups: Vec<CompletionGroup>) -> Vec<StudentCompletion> {
    let mut report: Vec<StudentCompletion> = groups
        .into_iter()
        .map(|g| StudentCompletion {
            completion_rate: completion_rate(g.completed_tasks, g.total_tasks),
            student_id: g.student_id,
            student_name: g.student_name,
            student_email: g.student_email,
            total_tasks: g.total_tasks,
            completed_tasks: g.completed_tasks,
        })
        .collect();

    report.sort_by(|a, b| {
        b.completion_rate
            .total_cmp(&a.completion_rate)
            .then_with(|| a.student_name.cmp(&b.student_name))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    report
}

impl TaskCounts {
    pub fn new(total: i64, completed: i64) -> Self {
        TaskCounts {
            total,
            completed,
            pending: total - completed,
        }
    }

    pub fn completion_rate(&self) -> f64 {
        completion_rate(self.completed, self.total)
    }
}
