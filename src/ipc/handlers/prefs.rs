use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

const THEME_KEY: &str = "prefs.theme";
const DEFAULT_THEME: &str = "dark";

fn handle_theme_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match db::settings_get(conn, THEME_KEY) {
        Ok(value) => ok(
            &req.id,
            json!({ "theme": value.unwrap_or_else(|| DEFAULT_THEME.to_string()) }),
        ),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_theme_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let theme = match req.params.get("theme").and_then(|v| v.as_str()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing theme", None),
    };
    if theme != "light" && theme != "dark" {
        return err(&req.id, "bad_params", "theme must be light or dark", None);
    }
    match db::settings_set(conn, THEME_KEY, theme) {
        Ok(()) => ok(&req.id, json!({ "theme": theme })),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "prefs.themeGet" => Some(handle_theme_get(state, req)),
        "prefs.themeSet" => Some(handle_theme_set(state, req)),
        _ => None,
    }
}
