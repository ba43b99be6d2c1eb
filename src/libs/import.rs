//! Bulk student import from a spreadsheet upload.
//!
//! The first worksheet of an xlsx, xls or ods workbook is read with
//! `calamine`; anything that is not a workbook is read as CSV. The first row
//! names the columns (`name`, `email`, optional `password`, any order, case
//! ignored). Each data row is imported on its own: one bad row never undoes
//! the rows before it, it is reported in [`ImportResults::errors`] instead.
//!
//! Importing is two steps. [`prepare_roster`] validates rows and hashes
//! passwords without the store; [`import_students`] inserts the result.

use super::accounts::{is_duplicate, AccountService, NewAccount};
use super::auth::{hash_password, Identity};
use super::error::{ServiceError, ServiceResult};
use super::messages::Message;
use super::user::{is_valid_email, normalize_email, Role};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::Connection;
use serde::Serialize;
use std::io::Cursor;

/// Length of passwords generated for rows without one.
pub const GENERATED_PASSWORD_LEN: usize = 8;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &str = "\u{feff}";

/// One data row of the roster, cells trimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterRow {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedStudent {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportFailure {
    pub email: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResults {
    pub success: Vec<ImportedStudent>,
    pub errors: Vec<ImportFailure>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub results: ImportResults,
}

/// Reads the roster rows out of an uploaded file.
pub fn parse_roster(bytes: &[u8]) -> ServiceResult<Vec<RosterRow>> {
    let table = if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(CFB_MAGIC) {
        read_workbook(bytes)?
    } else {
        read_csv(bytes)?
    };

    let mut rows = table.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let column = |wanted: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(wanted));
    let (name_col, email_col, password_col) = (column("name"), column("email"), column("password"));

    let cell = |row: &[String], col: Option<usize>| -> String {
        col.and_then(|i| row.get(i)).map(|v| v.trim().to_string()).unwrap_or_default()
    };

    Ok(rows
        .filter(|row| row.iter().any(|v| !v.trim().is_empty()))
        .map(|row| {
            let password = cell(&row, password_col);
            RosterRow {
                name: cell(&row, name_col),
                email: cell(&row, email_col),
                password: (!password.is_empty()).then_some(password),
            }
        })
        .collect())
}

fn read_workbook(bytes: &[u8]) -> ServiceResult<Vec<Vec<String>>> {
    let unreadable = |e: calamine::Error| ServiceError::BadRequest(Message::SpreadsheetUnreadable(e.to_string()));

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(unreadable)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ServiceError::BadRequest(Message::SpreadsheetEmpty))?
        .map_err(unreadable)?;

    Ok(range.rows().map(|row| row.iter().map(cell_text).collect()).collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Numeric cells typed into a password column come back as floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn read_csv(bytes: &[u8]) -> ServiceResult<Vec<Vec<String>>> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
    };
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| ServiceError::BadRequest(Message::SpreadsheetUnreadable(e.to_string())))
        })
        .collect()
}

pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// A roster row after the checks that need no store.
#[derive(Debug, Clone)]
pub enum PreparedRow {
    Rejected(ImportFailure),
    /// `email` is the cell as uploaded; the account holds the normalized one.
    Ready { email: String, account: NewAccount },
}

/// Validates every row and hashes its password. Touches no store.
pub fn prepare_roster(caller: &Identity, rows: &[RosterRow]) -> ServiceResult<Vec<PreparedRow>> {
    caller.require_admin()?;

    Ok(rows.iter().map(prepare_row).collect())
}

fn prepare_row(row: &RosterRow) -> PreparedRow {
    let failure = |message: Message| {
        PreparedRow::Rejected(ImportFailure {
            email: row.email.clone(),
            error: message.to_string(),
        })
    };

    if row.name.is_empty() {
        return failure(Message::NameRequired);
    }
    let email = normalize_email(&row.email);
    if !is_valid_email(&email) {
        return failure(Message::EmailInvalid);
    }

    let password = row.password.clone().unwrap_or_else(generate_password);
    match hash_password(&password) {
        Ok(password_hash) => PreparedRow::Ready {
            email: row.email.clone(),
            account: NewAccount {
                name: row.name.clone(),
                email,
                password_hash,
            },
        },
        Err(e) => {
            tracing::error!(email = %email, "roster row failed: {}", e);
            failure(Message::ServerError)
        }
    }
}

/// Creates a student for each ready row, in order.
pub fn import_students(conn: &Connection, caller: &Identity, rows: Vec<PreparedRow>) -> ServiceResult<ImportResults> {
    caller.require_admin()?;

    let accounts = AccountService::new(conn);
    let mut results = ImportResults::default();

    for row in rows {
        let (email, account) = match row {
            PreparedRow::Rejected(failure) => {
                results.errors.push(failure);
                continue;
            }
            PreparedRow::Ready { email, account } => (email, account),
        };

        match accounts.insert(&account, Role::Student) {
            Ok(user) => results.success.push(ImportedStudent {
                name: user.name,
                email: user.email,
            }),
            Err(e) if is_duplicate(&e) => results.errors.push(ImportFailure {
                email,
                error: Message::EmailAlreadyExists.to_string(),
            }),
            Err(e) if e.is_internal() => {
                tracing::error!(email = %account.email, "roster row failed: {}", e);
                results.errors.push(ImportFailure {
                    email,
                    error: Message::ServerError.to_string(),
                });
            }
            Err(e) => results.errors.push(ImportFailure {
                email,
                error: e.to_string(),
            }),
        }
    }

    tracing::info!("{}", Message::ImportFinished(results.success.len(), results.errors.len()));
    Ok(results)
}
