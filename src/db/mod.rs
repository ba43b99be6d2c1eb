//! Database layer for classdesk.
//!
//! A single SQLite file holds two tables, `users` and `tasks`, versioned by
//! [`migrations`]. Stores borrow an open connection and return
//! `rusqlite::Result`; the service layer decides what a missing row means.
//!
//! ## Usage
//!
//! ```rust
//! use classdesk::db::{db::Db, tasks::Tasks, users::Users};
//! use classdesk::libs::task::TaskScope;
//!
//! let db = Db::in_memory()?;
//! let students = Users::new(&db.conn).list_students()?;
//! let tasks = Tasks::new(&db.conn).fetch(&TaskScope::All)?;
//! assert!(students.is_empty() && tasks.is_empty());
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Connection opening and schema initialisation.
pub mod db;

/// Versioned schema changes.
pub mod migrations;

/// Task records, scoped listings and the aggregate queries behind the reports.
pub mod tasks;

/// Accounts: admins and students.
pub mod users;
