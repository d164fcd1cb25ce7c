use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster::{self, CourseFilter, SortKey, StatusFilter, ViewControls};
use crate::store::{RecordStore, SqliteStore};
use serde_json::json;

/// `All` doubles as the course sentinel on the wire because the selector
/// sends its literal option value; absent and empty mean the same thing.
fn parse_controls(params: &serde_json::Value) -> Result<ViewControls, String> {
    let search_query = params
        .get("search")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let status_filter = match params.get("status").and_then(|v| v.as_str()) {
        None => StatusFilter::All,
        Some(s) => StatusFilter::parse(s)
            .ok_or_else(|| "status must be one of: All, Present, Absent".to_string())?,
    };

    let course_filter = match params.get("course").and_then(|v| v.as_str()) {
        None => CourseFilter::All,
        Some(c) if c.is_empty() || c == "All" => CourseFilter::All,
        Some(c) => CourseFilter::Course(c.to_string()),
    };

    let sort_key = match params.get("sort").and_then(|v| v.as_str()) {
        None => SortKey::NameAsc,
        Some(s) => SortKey::parse(s)
            .ok_or_else(|| "sort must be one of: nameAsc, nameDesc, gradeDesc, gradeAsc".to_string())?,
    };

    Ok(ViewControls {
        search_query,
        status_filter,
        course_filter,
        sort_key,
    })
}

fn handle_roster_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(user) = state.user.as_ref() else {
        return err(&req.id, "no_session", "sign in first", None);
    };

    let controls = match parse_controls(&req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    let records = match SqliteStore::new(conn).list(&user.id) {
        Ok(v) => v,
        Err(e) => return err(&req.id, e.code, e.message, None),
    };

    let view = roster::derive_view(&records, &controls);
    let courses = roster::course_options(&records);

    ok(
        &req.id,
        json!({
            "students": view.visible,
            "matched": view.matched,
            "stats": view.stats,
            "courses": courses
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.view" => Some(handle_roster_view(state, req)),
        _ => None,
    }
}
