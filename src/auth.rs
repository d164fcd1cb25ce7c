use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    BadEmail,
    WeakPassword,
    EmailTaken,
    /// Unknown email and wrong password answer identically.
    InvalidCredentials,
    Db(String),
}

impl From<rusqlite::Error> for AuthError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Db(e.to_string())
    }
}

/// Trims and lowercases; accepts `local@domain` with both parts non-empty.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(email)
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

pub fn sign_up(conn: &Connection, email: &str, password: &str) -> Result<UserAccount, AuthError> {
    let Some(email) = normalize_email(email) else {
        return Err(AuthError::BadEmail);
    };
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::WeakPassword);
    }

    let existing: Option<String> = conn
        .query_row("SELECT id FROM users WHERE email = ?", [&email], |r| {
            r.get(0)
        })
        .optional()?;
    if existing.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let id = Uuid::new_v4().to_string();
    let salt = Uuid::new_v4().simple().to_string();
    let hash = hash_password(&salt, password);
    let created_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users(id, email, password_hash, password_salt, created_at)
         VALUES(?, ?, ?, ?, ?)",
        (&id, &email, &hash, &salt, &created_at),
    )?;

    Ok(UserAccount {
        id,
        email,
        created_at,
    })
}

pub fn sign_in(conn: &Connection, email: &str, password: &str) -> Result<UserAccount, AuthError> {
    let Some(email) = normalize_email(email) else {
        return Err(AuthError::InvalidCredentials);
    };

    let row: Option<(String, String, String, String)> = conn
        .query_row(
            "SELECT id, password_hash, password_salt, created_at FROM users WHERE email = ?",
            [&email],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .optional()?;
    let Some((id, stored_hash, salt, created_at)) = row else {
        return Err(AuthError::InvalidCredentials);
    };

    if hash_password(&salt, password) != stored_hash {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(UserAccount {
        id,
        email,
        created_at,
    })
}
