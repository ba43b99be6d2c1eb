use crate::libs::stats::{CompletionGroup, TaskCounts};
use crate::libs::task::{NewTask, Task, TaskScope, TaskStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, description, assigned_to, created_by, status, due_date, completed_at, created_at";
const INSERT_TASK: &str = "INSERT INTO tasks (id, title, description, assigned_to, created_by, status, due_date, completed_at, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8)";
const UPDATE_STATUS: &str = "UPDATE tasks SET status = ?3, completed_at = ?4 WHERE id = ?1 AND assigned_to = ?2";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";
const DELETE_BY_ASSIGNEE: &str = "DELETE FROM tasks WHERE assigned_to = ?1";
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, rowid DESC";
const COMPLETION_GROUPS: &str = "
    SELECT u.id, u.name, u.email, g.total, g.completed
    FROM (
        SELECT assigned_to,
               COUNT(*) AS total,
               SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END) AS completed
        FROM tasks
        GROUP BY assigned_to
    ) g
    JOIN users u ON u.id = g.assigned_to
";
const COUNTS_FOR_ASSIGNEE: &str = "
    SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0)
    FROM tasks WHERE assigned_to = ?1
";

/// Task store over the `tasks` table.
pub struct Tasks<'a> {
    conn: &'a Connection,
}

impl<'a> Tasks<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Persists a new pending task.
    pub fn insert(&self, task: &NewTask, now: DateTime<Utc>) -> Result<Task> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            INSERT_TASK,
            params![id, task.title, task.description, task.assigned_to, task.created_by, TaskStatus::Pending, task.due_date, now],
        )?;

        Ok(Task {
            id,
            title: task.title.clone(),
            description: task.description.clone(),
            assigned_to: task.assigned_to.clone(),
            created_by: task.created_by.clone(),
            status: TaskStatus::Pending,
            due_date: task.due_date,
            completed_at: None,
            created_at: now,
        })
    }

    /// Tasks visible in `scope`, newest first.
    pub fn fetch(&self, scope: &TaskScope) -> Result<Vec<Task>> {
        match scope {
            TaskScope::All => {
                let mut stmt = self.conn.prepare(&format!("SELECT {} FROM tasks {}", TASK_COLUMNS, NEWEST_FIRST))?;
                let tasks = stmt.query_map([], task_from_row)?.collect::<Result<Vec<_>>>()?;
                Ok(tasks)
            }
            TaskScope::AssignedTo(student) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {} FROM tasks WHERE assigned_to = ?1 {}", TASK_COLUMNS, NEWEST_FIRST))?;
                let tasks = stmt.query_map(params![student], task_from_row)?.collect::<Result<Vec<_>>>()?;
                Ok(tasks)
            }
        }
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Task>> {
        self.conn
            .query_row(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS), params![id], task_from_row)
            .optional()
    }

    /// The task with `id`, only if it is assigned to `assignee`.
    pub fn get_owned(&self, id: &str, assignee: &str) -> Result<Option<Task>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1 AND assigned_to = ?2", TASK_COLUMNS),
                params![id, assignee],
                task_from_row,
            )
            .optional()
    }

    /// Sets status and completion time in one statement, guarded by
    /// ownership. Returns the number of rows changed (0 or 1).
    pub fn set_status(&self, id: &str, assignee: &str, status: TaskStatus, completed_at: Option<DateTime<Utc>>) -> Result<usize> {
        self.conn.execute(UPDATE_STATUS, params![id, assignee, status, completed_at])
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        self.conn.execute(DELETE_TASK, params![id])
    }

    pub fn delete_by_assignee(&self, assignee: &str) -> Result<usize> {
        self.conn.execute(DELETE_BY_ASSIGNEE, params![assignee])
    }

    /// Per-assignee totals joined to the assignee's account. Groups whose
    /// user no longer exists are dropped by the join.
    pub fn completion_groups(&self) -> Result<Vec<CompletionGroup>> {
        let mut stmt = self.conn.prepare(COMPLETION_GROUPS)?;
        let groups = stmt
            .query_map([], |row| {
                Ok(CompletionGroup {
                    student_id: row.get(0)?,
                    student_name: row.get(1)?,
                    student_email: row.get(2)?,
                    total_tasks: row.get(3)?,
                    completed_tasks: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(groups)
    }

    pub fn counts_for(&self, assignee: &str) -> Result<TaskCounts> {
        self.conn.query_row(COUNTS_FOR_ASSIGNEE, params![assignee], |row| {
            Ok(TaskCounts::new(row.get(0)?, row.get(1)?))
        })
    }

    /// The `limit` most recently created tasks of `assignee`.
    pub fn recent_for(&self, assignee: &str, limit: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE assigned_to = ?1 {} LIMIT ?2",
            TASK_COLUMNS, NEWEST_FIRST
        ))?;
        let tasks = stmt.query_map(params![assignee, limit], task_from_row)?.collect::<Result<Vec<_>>>()?;

        Ok(tasks)
    }
}

fn task_from_row(row: &Row) -> Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        assigned_to: row.get(3)?,
        created_by: row.get(4)?,
        status: row.get(5)?,
        due_date: row.get(6)?,
        completed_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}
