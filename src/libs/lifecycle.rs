//! Task lifecycle: creation, scoped listing, status transitions, deletion and
//! the admin reports built on top of the task store.
//!
//! Every operation takes the acting [`Identity`] explicitly. Rows come back
//! from the store with bare user ids; [`enrich`] resolves them afterwards in
//! one batched lookup.
//!
//! ## Ownership
//!
//! Only the assigned student may change a task's status. A task that exists
//! but belongs to someone else is reported exactly like a missing one, so a
//! student cannot probe for other students' task ids.

use super::auth::Identity;
use super::error::{FieldError, ServiceError, ServiceResult};
use super::messages::Message;
use super::stats::{rank, PerformanceReport, StudentCompletion};
use super::task::{AssigneeRef, CreateTaskRequest, CreatorRef, StatusUpdateRequest, Task, TaskScope, TaskStatus, TaskView};
use super::user::UserProfile;
use crate::db::tasks::Tasks;
use crate::db::users::Users;
use chrono::Utc;
use rusqlite::Connection;

/// Number of tasks shown in a performance report.
pub const RECENT_TASKS_LIMIT: i64 = 5;

pub struct TaskService<'a> {
    conn: &'a Connection,
}

impl<'a> TaskService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Creates a pending task on behalf of an admin.
    pub fn create(&self, caller: &Identity, request: &CreateTaskRequest) -> ServiceResult<TaskView> {
        caller.require_admin()?;

        let new_task = match request.validate(&caller.id) {
            Ok(new_task) => {
                if Users::new(self.conn).get_student(&new_task.assigned_to)?.is_none() {
                    return Err(ServiceError::field("assigned_to", Message::AssigneeNotStudent));
                }
                new_task
            }
            Err(mut errors) => {
                if let Some(assignee) = request.assigned_to.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
                    if Users::new(self.conn).get_student(assignee)?.is_none() {
                        errors.push(FieldError::new("assigned_to", Message::AssigneeNotStudent));
                    }
                }
                return Err(ServiceError::Validation(errors));
            }
        };

        let task = Tasks::new(self.conn).insert(&new_task, Utc::now())?;
        tracing::info!(task = %task.id, assignee = %task.assigned_to, "{}", Message::TaskCreated(task.id.clone()));

        self.enrich_one(task)
    }

    /// All tasks for admins, the caller's own tasks for students.
    pub fn list(&self, caller: &Identity) -> ServiceResult<Vec<TaskView>> {
        let scope = if caller.is_admin() {
            TaskScope::All
        } else {
            TaskScope::AssignedTo(caller.id.clone())
        };
        let tasks = Tasks::new(self.conn).fetch(&scope)?;

        enrich(self.conn, tasks)
    }

    /// Moves one of the caller's tasks to the requested status.
    pub fn set_status(&self, caller: &Identity, task_id: &str, request: &StatusUpdateRequest) -> ServiceResult<TaskView> {
        let status = request.validate().map_err(ServiceError::Validation)?;
        let completed_at = match status {
            TaskStatus::Completed => Some(Utc::now()),
            TaskStatus::Pending => None,
        };

        let tasks = Tasks::new(self.conn);
        if tasks.set_status(task_id, &caller.id, status, completed_at)? == 0 {
            return Err(ServiceError::NotFound(Message::TaskNotFound));
        }
        let task = tasks
            .get_owned(task_id, &caller.id)?
            .ok_or(ServiceError::NotFound(Message::TaskNotFound))?;
        tracing::info!(task = %task.id, "{}", Message::TaskStatusChanged(task.id.clone(), status.to_string()));

        self.enrich_one(task)
    }

    pub fn delete(&self, caller: &Identity, task_id: &str) -> ServiceResult<()> {
        caller.require_admin()?;

        if Tasks::new(self.conn).delete(task_id)? == 0 {
            return Err(ServiceError::NotFound(Message::TaskNotFound));
        }
        tracing::info!(task = %task_id, "{}", Message::TaskDeleted);

        Ok(())
    }

    /// Completion per student, best rate first. Students without tasks do
    /// not appear.
    pub fn completion_stats(&self, caller: &Identity) -> ServiceResult<Vec<StudentCompletion>> {
        caller.require_admin()?;

        Ok(rank(Tasks::new(self.conn).completion_groups()?))
    }

    pub fn student_performance(&self, caller: &Identity, student_id: &str) -> ServiceResult<PerformanceReport> {
        caller.require_admin()?;

        let student = Users::new(self.conn)
            .get_student(student_id)?
            .ok_or(ServiceError::NotFound(Message::StudentNotFound))?;
        let tasks = Tasks::new(self.conn);
        let task_stats = tasks.counts_for(&student.id)?;
        let recent_tasks = enrich(self.conn, tasks.recent_for(&student.id, RECENT_TASKS_LIMIT)?)?;

        Ok(PerformanceReport {
            student: UserProfile::from(&student),
            completion_rate: task_stats.completion_rate(),
            task_stats,
            recent_tasks,
        })
    }

    /// Removes a student together with every task assigned to them. Returns
    /// the number of tasks removed.
    pub fn delete_student(&self, caller: &Identity, student_id: &str) -> ServiceResult<usize> {
        caller.require_admin()?;

        let tx = self.conn.unchecked_transaction()?;
        if Users::new(&tx).get_student(student_id)?.is_none() {
            return Err(ServiceError::NotFound(Message::StudentNotFound));
        }
        let removed = Tasks::new(&tx).delete_by_assignee(student_id)?;
        Users::new(&tx).delete(student_id)?;
        tx.commit()?;

        tracing::info!(student = %student_id, "{}", Message::StudentDeletedWithTasks(student_id.to_string(), removed));
        Ok(removed)
    }

    fn enrich_one(&self, task: Task) -> ServiceResult<TaskView> {
        enrich(self.conn, vec![task])?
            .pop()
            .ok_or(ServiceError::NotFound(Message::TaskNotFound))
    }
}

/// Resolves the assignee and creator of each task with a single user lookup.
/// References to users that no longer exist become `None`. Order is kept.
pub fn enrich(conn: &Connection, tasks: Vec<Task>) -> ServiceResult<Vec<TaskView>> {
    let mut ids: Vec<&str> = tasks
        .iter()
        .flat_map(|t| [t.assigned_to.as_str(), t.created_by.as_str()])
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let users = Users::new(conn).get_many(&ids)?;

    Ok(tasks
        .into_iter()
        .map(|task| TaskView {
            assigned_to: users.get(&task.assigned_to).map(|u| AssigneeRef {
                id: u.id.clone(),
                name: u.name.clone(),
                email: u.email.clone(),
            }),
            created_by: users.get(&task.created_by).map(|u| CreatorRef {
                id: u.id.clone(),
                name: u.name.clone(),
            }),
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            due_date: task.due_date,
            completed_at: task.completed_at,
            created_at: task.created_at,
        })
        .collect())
}
