use crate::libs::user::{NewUser, Role, User};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result, Row};
use std::collections::HashMap;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";
const INSERT_USER: &str = "INSERT INTO users (id, name, email, password_hash, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const DELETE_USER: &str = "DELETE FROM users WHERE id = ?1";

/// Identity store over the `users` table.
pub struct Users<'a> {
    conn: &'a Connection,
}

impl<'a> Users<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts an account with a fresh id. A duplicate email surfaces as a
    /// constraint violation.
    pub fn insert(&self, user: &NewUser, now: DateTime<Utc>) -> Result<User> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(INSERT_USER, params![id, user.name, user.email, user.password_hash, user.role, now])?;

        Ok(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: now,
        })
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        self.conn
            .query_row(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS), params![id], user_from_row)
            .optional()
    }

    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(&format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS), params![email], user_from_row)
            .optional()
    }

    /// The user with `id`, only if it is a student.
    pub fn get_student(&self, id: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1 AND role = ?2", USER_COLUMNS),
                params![id, Role::Student],
                user_from_row,
            )
            .optional()
    }

    /// All students, newest first.
    pub fn list_students(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM users WHERE role = ?1 ORDER BY created_at DESC, rowid DESC",
            USER_COLUMNS
        ))?;
        let users = stmt.query_map(params![Role::Student], user_from_row)?.collect::<Result<Vec<_>>>()?;

        Ok(users)
    }

    /// Looks up several users at once, keyed by id. Unknown ids are absent
    /// from the map.
    pub fn get_many(&self, ids: &[&str]) -> Result<HashMap<String, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = format!("SELECT {} FROM users WHERE id IN ({})", USER_COLUMNS, vec!["?"; ids.len()].join(", "));
        let mut stmt = self.conn.prepare(&sql)?;
        let users = stmt
            .query_map(params_from_iter(ids.iter()), user_from_row)?
            .map(|user| user.map(|u| (u.id.clone(), u)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(users)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        self.conn.execute(DELETE_USER, params![id])
    }
}

fn user_from_row(row: &Row) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}
