//! # Classdesk
//!
//! A small backend for running a class: admins keep the student roster,
//! assign tasks with due dates and follow completion; students see and
//! complete their own tasks.
//!
//! ## Features
//!
//! - **Accounts**: Bearer-token login, admin-only student registration
//! - **Roster Import**: Bulk student creation from xlsx, xls, ods or CSV
//! - **Task Lifecycle**: Assignment, scoped listing, completion, deletion
//! - **Reporting**: Per-student completion rates and performance reports
//! - **Data Export**: Completion table as CSV, JSON or Excel
//!
//! ## Usage
//!
//! ```rust,no_run
//! use classdesk::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod db;
pub mod libs;
