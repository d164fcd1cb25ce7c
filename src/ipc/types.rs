use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The signed-in account for this process. Single-user, single-session:
/// there is exactly one of these at a time, held in memory.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub user: Option<SessionUser>,
}
