use crate::gateway::{self, GatewayError, RemoveOutcome, StudentInput};
use crate::ipc::error::{err, ok, validation};
use crate::ipc::types::{AppState, Request, SessionUser};
use crate::store::{RecordStore, SqliteStore};
use rusqlite::Connection;
use serde_json::json;

fn session<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<(&'a Connection, &'a SessionUser), serde_json::Value> {
    let Some(conn) = state.db.as_ref() else {
        return Err(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    let Some(user) = state.user.as_ref() else {
        return Err(err(&req.id, "no_session", "sign in first", None));
    };
    Ok((conn, user))
}

fn gateway_err(id: &str, e: GatewayError) -> serde_json::Value {
    match e {
        GatewayError::Validation(fields) => validation(id, &fields),
        GatewayError::NotFound => err(id, "not_found", "student not found", None),
        GatewayError::Store(e) => err(id, e.code, e.message, None),
    }
}

/// Missing or non-numeric grades flow through as NaN so the gateway reports
/// them on the `grade` field alongside any other invalid fields. Numeric
/// strings are coerced, matching what a form submits.
fn parse_grade(v: Option<&serde_json::Value>) -> f64 {
    match v {
        Some(v) => v
            .as_f64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            .unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

fn student_input(params: &serde_json::Value) -> StudentInput {
    StudentInput {
        name: params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        course: params
            .get("course")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        grade: parse_grade(params.get("grade")),
    }
}

fn required_student_id(params: &serde_json::Value) -> Result<String, &'static str> {
    params
        .get("studentId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or("missing studentId")
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, user) = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match SqliteStore::new(conn).list(&user.id) {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => err(&req.id, e.code, e.message, None),
    }
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, user) = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let input = student_input(&req.params);
    let mut store = SqliteStore::new(conn);
    match gateway::add(&mut store, &user.id, &input) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => gateway_err(&req.id, e),
    }
}

fn handle_students_edit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, user) = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student_id = match required_student_id(&req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let updates = student_input(&req.params);
    let mut store = SqliteStore::new(conn);
    match gateway::edit(&mut store, &user.id, &student_id, &updates) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => gateway_err(&req.id, e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, user) = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student_id = match required_student_id(&req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let mut store = SqliteStore::new(conn);
    match gateway::remove(&mut store, &user.id, &student_id) {
        Ok(outcome) => ok(
            &req.id,
            json!({ "removed": outcome == RemoveOutcome::Removed }),
        ),
        Err(e) => gateway_err(&req.id, e),
    }
}

fn handle_students_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, user) = match session(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student_id = match required_student_id(&req.params) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let mut store = SqliteStore::new(conn);
    match gateway::toggle_attendance(&mut store, &user.id, &student_id) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => gateway_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.add" => Some(handle_students_add(state, req)),
        "students.edit" => Some(handle_students_edit(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        "students.toggleAttendance" => Some(handle_students_toggle(state, req)),
        _ => None,
    }
}
