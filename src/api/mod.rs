//! HTTP interface.
//!
//! All routes live under `/api` and speak JSON. Handlers are thin: they pull
//! the caller out of the bearer token ([`extract::AuthUser`]), lock the
//! shared connection for the duration of their synchronous store work and
//! hand off to the service layer. Password hashing runs on the blocking
//! pool through [`blocking`], never under the lock. [`error::ApiError`] turns service errors
//! into status codes and bodies.
//!
//! | Method | Path | Who |
//! |---|---|---|
//! | POST | `/api/auth/login` | anyone |
//! | POST | `/api/auth/register` | admin |
//! | GET | `/api/auth/profile` | any user |
//! | POST | `/api/tasks` | admin |
//! | GET | `/api/tasks` | any user |
//! | PATCH | `/api/tasks/:id/status` | assignee |
//! | DELETE | `/api/tasks/:id` | admin |
//! | GET | `/api/tasks/stats` | admin |
//! | GET | `/api/users/students` | admin |
//! | POST | `/api/users/upload` | admin |
//! | DELETE | `/api/users/students/:id` | admin |
//! | GET | `/api/users/students/:id/performance` | admin |

use crate::db::db::Db;
use crate::libs::auth::TokenIssuer;
use crate::libs::config::Config;
use crate::libs::error::ServiceResult;
use crate::libs::messages::Message;
use anyhow::{Context, Result};
use axum::Router;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod extract;
pub mod tasks;
pub mod users;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(conn: Connection, tokens: TokenIssuer) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            tokens: Arc::new(tokens),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let db = Db::open(&config.database)?;
        tracing::info!("{}", Message::DatabaseOpened(config.database.display().to_string()));

        Ok(Self::new(db.conn, TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs)))
    }
}

/// Runs CPU-bound service work on tokio's blocking pool.
pub async fn blocking<T, F>(work: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth::routes())
        .nest("/tasks", tasks::routes())
        .nest("/users", users::routes());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    tracing::info!("{}", Message::ServerListening(listener.local_addr()?.to_string()));

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("{}", Message::ServerStopped);
    Ok(())
}
