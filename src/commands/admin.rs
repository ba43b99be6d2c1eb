use crate::db::db::Db;
use crate::libs::accounts::{AccountService, RegisterRequest};
use crate::libs::config::Config;
use crate::libs::error::ServiceError;
use crate::libs::messages::Message;
use crate::{msg_error_anyhow, msg_success};
use anyhow::Result;
use clap::Args;
use dialoguer::Password;

#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Display name of the admin
    #[arg(short, long)]
    name: String,

    /// Login email
    #[arg(short, long)]
    email: String,

    /// Password; prompted for when omitted
    #[arg(short, long)]
    password: Option<String>,
}

pub fn cmd(args: AdminArgs) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt(Message::PromptAdminPassword.to_string())
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?,
    };

    let db = Db::open(&Config::read_database()?)?;
    let request = RegisterRequest {
        name: Some(args.name),
        email: Some(args.email),
        password: Some(password),
    };

    let account = request.prepare().map_err(describe)?;
    let admin = AccountService::new(&db.conn).create_admin(&account).map_err(describe)?;
    msg_success!(Message::AdminCreated(admin.email));

    Ok(())
}

fn describe(error: ServiceError) -> anyhow::Error {
    match error {
        ServiceError::Validation(errors) => {
            let detail: Vec<String> = errors.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
            msg_error_anyhow!(detail.join("; "))
        }
        other => msg_error_anyhow!(other),
    }
}
