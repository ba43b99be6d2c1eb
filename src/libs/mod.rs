//! Core library modules for classdesk.
//!
//! ## Features
//!
//! - **Core Infrastructure**: Configuration, data storage, messaging, errors
//! - **Accounts**: Password hashing, bearer tokens, registration and login
//! - **Task Lifecycle**: Creation, scoped listing, status changes, deletion
//! - **Reporting**: Completion statistics, performance reports, export
//! - **Roster Import**: Spreadsheet parsing and per-row student creation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use classdesk::db::db::Db;
//! use classdesk::libs::{auth::Identity, lifecycle::TaskService, user::Role};
//!
//! let db = Db::in_memory()?;
//! let admin = Identity::new("admin-id", Role::Admin);
//! let stats = TaskService::new(&db.conn).completion_stats(&admin)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod accounts;
pub mod auth;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod export;
pub mod import;
pub mod lifecycle;
pub mod messages;
pub mod stats;
pub mod task;
pub mod user;
pub mod view;
