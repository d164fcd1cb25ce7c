use crate::auth::{self, AuthError};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request, SessionUser};
use serde_json::json;

fn auth_err(id: &str, e: AuthError) -> serde_json::Value {
    match e {
        AuthError::BadEmail => err(id, "bad_params", "enter a valid email address", None),
        AuthError::WeakPassword => err(
            id,
            "bad_params",
            format!(
                "password must be at least {} characters",
                auth::MIN_PASSWORD_CHARS
            ),
            None,
        ),
        AuthError::EmailTaken => err(id, "email_taken", "an account with this email exists", None),
        AuthError::InvalidCredentials => {
            err(id, "invalid_credentials", "invalid email or password", None)
        }
        AuthError::Db(message) => err(id, "db_query_failed", message, None),
    }
}

fn user_json(user: &SessionUser) -> serde_json::Value {
    json!({ "id": user.id, "email": user.email })
}

fn credentials(params: &serde_json::Value) -> (String, String) {
    let email = params
        .get("email")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let password = params
        .get("password")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    (email, password)
}

fn handle_sign_up(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (email, password) = credentials(&req.params);

    match auth::sign_up(conn, &email, &password) {
        Ok(account) => {
            let session = SessionUser {
                id: account.id,
                email: account.email,
            };
            let result = json!({ "user": user_json(&session) });
            state.user = Some(session);
            ok(&req.id, result)
        }
        Err(e) => auth_err(&req.id, e),
    }
}

fn handle_sign_in(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (email, password) = credentials(&req.params);

    match auth::sign_in(conn, &email, &password) {
        Ok(account) => {
            let session = SessionUser {
                id: account.id,
                email: account.email,
            };
            let result = json!({ "user": user_json(&session) });
            state.user = Some(session);
            ok(&req.id, result)
        }
        Err(e) => auth_err(&req.id, e),
    }
}

fn handle_sign_out(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.user = None;
    ok(&req.id, json!({ "ok": true }))
}

fn handle_current_user(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.user.as_ref() {
        Some(user) => ok(&req.id, json!({ "user": user_json(user) })),
        None => ok(&req.id, json!({ "user": null })),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.signUp" => Some(handle_sign_up(state, req)),
        "auth.signIn" => Some(handle_sign_in(state, req)),
        "auth.signOut" => Some(handle_sign_out(state, req)),
        "auth.currentUser" => Some(handle_current_user(state, req)),
        _ => None,
    }
}
