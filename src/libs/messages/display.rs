//! Display implementation for classdesk messages.
//!
//! Every user-facing string of the service is produced here, whether it ends
//! up in an HTTP error body, a CLI line or a log record.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === TASK MESSAGES ===
            Message::TaskCreated(id) => format!("Task {} created", id),
            Message::TaskDeleted => "Task deleted successfully".to_string(),
            Message::TaskNotFound => "Task not found".to_string(),
            Message::TaskStatusChanged(id, status) => format!("Task {} is now {}", id, status),
            Message::TitleRequired => "Title is required".to_string(),
            Message::DescriptionRequired => "Description is required".to_string(),
            Message::AssigneeRequired => "Assigned student is required".to_string(),
            Message::AssigneeNotStudent => "Assigned user must be an existing student".to_string(),
            Message::DueDateInvalid => "Due date must be an ISO 8601 date".to_string(),
            Message::InvalidStatus => "Status must be one of: pending, completed".to_string(),

            // === STUDENT MESSAGES ===
            Message::StudentNotFound => "Student not found".to_string(),
            Message::StudentDeleted => "Student and associated tasks deleted successfully".to_string(),
            Message::StudentDeletedWithTasks(id, count) => format!("Student {} deleted along with {} task(s)", id, count),
            Message::StudentRegistered => "Student registered successfully".to_string(),
            Message::EmailAlreadyRegistered => "Email already registered".to_string(),
            Message::EmailAlreadyExists => "Email already exists".to_string(),
            Message::NameRequired => "Name is required".to_string(),
            Message::EmailInvalid => "A valid email is required".to_string(),
            Message::PasswordRequired => "Password is required".to_string(),
            Message::PasswordTooShort(min) => format!("Password must be at least {} characters", min),

            // === IMPORT MESSAGES ===
            Message::FileProcessed => "File processed".to_string(),
            Message::NoFileUploaded => "Please upload an Excel file".to_string(),
            Message::SpreadsheetUnreadable(error) => format!("Unable to read spreadsheet: {}", error),
            Message::SpreadsheetEmpty => "Spreadsheet contains no worksheets".to_string(),
            Message::ImportFinished(ok, failed) => format!("Roster import finished: {} imported, {} failed", ok, failed),

            // === AUTH MESSAGES ===
            Message::InvalidCredentials => "Invalid credentials".to_string(),
            Message::PleaseAuthenticate => "Please authenticate".to_string(),
            Message::AdminOnly => "Access denied. Admin only.".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigParseError(error) => format!("Failed to parse configuration: {}", error),
            Message::JwtSecretMissing => "JWT_SECRET is not set; refusing to start without a signing secret".to_string(),
            Message::InvalidTokenTtl(value) => format!("Invalid token lifetime {:?}; use seconds or a 45m/24h/7d style value, at most 365d", value),
            Message::InvalidAddress(value) => format!("Invalid listen address {:?}", value),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All migrations completed successfully".to_string(),

            // === SERVER MESSAGES ===
            Message::ServerListening(addr) => format!("Listening on http://{}", addr),
            Message::DatabaseOpened(path) => format!("Database opened at {}", path),
            Message::ServerError => "Server error".to_string(),
            Message::MalformedBody(error) => format!("Malformed request body: {}", error),
            Message::ServerStopped => "Server stopped".to_string(),

            // === CLI MESSAGES ===
            Message::AdminCreated(email) => format!("Admin account {} created", email),
            Message::PromptAdminPassword => "Enter the admin password".to_string(),
            Message::StatsHeader => "Completion by student".to_string(),
            Message::NoStatistics => "No tasks have been assigned yet.".to_string(),
            Message::StatsExported(path) => format!("Statistics exported to {}", path),
        };
        write!(f, "{}", text)
    }
}
