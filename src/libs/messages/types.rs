#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // === TASK MESSAGES ===
    TaskCreated(String), // task id
    TaskDeleted,
    TaskNotFound,
    TaskStatusChanged(String, String), // task id, status
    TitleRequired,
    DescriptionRequired,
    AssigneeRequired,
    AssigneeNotStudent,
    DueDateInvalid,
    InvalidStatus,

    // === STUDENT MESSAGES ===
    StudentNotFound,
    StudentDeleted,
    StudentDeletedWithTasks(String, usize), // student id, removed tasks
    StudentRegistered,
    EmailAlreadyRegistered,
    EmailAlreadyExists,
    NameRequired,
    EmailInvalid,
    PasswordRequired,
    PasswordTooShort(usize),

    // === IMPORT MESSAGES ===
    FileProcessed,
    NoFileUploaded,
    SpreadsheetUnreadable(String),
    SpreadsheetEmpty,
    ImportFinished(usize, usize), // imported, failed

    // === AUTH MESSAGES ===
    InvalidCredentials,
    PleaseAuthenticate,
    AdminOnly,

    // === CONFIGURATION MESSAGES ===
    ConfigParseError(String),
    JwtSecretMissing,
    InvalidTokenTtl(String),
    InvalidAddress(String),

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,

    // === SERVER MESSAGES ===
    ServerListening(String),
    DatabaseOpened(String),
    ServerError,
    MalformedBody(String),
    ServerStopped,

    // === CLI MESSAGES ===
    AdminCreated(String),
    PromptAdminPassword,
    StatsHeader,
    NoStatistics,
    StatsExported(String),
}
