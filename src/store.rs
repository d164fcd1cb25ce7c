use crate::roster::StudentRecord;
use rusqlite::{Connection, OptionalExtension};

#[derive(Debug, Clone)]
pub struct StoreError {
    pub code: &'static str,
    pub message: String,
}

impl StoreError {
    fn query(e: rusqlite::Error) -> Self {
        Self {
            code: "db_query_failed",
            message: e.to_string(),
        }
    }

    fn insert(e: rusqlite::Error) -> Self {
        Self {
            code: "db_insert_failed",
            message: e.to_string(),
        }
    }

    fn update(e: rusqlite::Error) -> Self {
        Self {
            code: "db_update_failed",
            message: e.to_string(),
        }
    }

    fn delete(e: rusqlite::Error) -> Self {
        Self {
            code: "db_delete_failed",
            message: e.to_string(),
        }
    }
}

/// The one persistence seam. Every call is scoped to the owning user;
/// `list` returns most-recently-created-first.
pub trait RecordStore {
    fn list(&self, owner_id: &str) -> Result<Vec<StudentRecord>, StoreError>;
    fn get(&self, owner_id: &str, id: &str) -> Result<Option<StudentRecord>, StoreError>;
    fn create(&mut self, owner_id: &str, record: &StudentRecord) -> Result<(), StoreError>;
    fn update(&mut self, owner_id: &str, record: &StudentRecord) -> Result<(), StoreError>;
    /// Returns whether a record was actually removed.
    fn delete(&mut self, owner_id: &str, id: &str) -> Result<bool, StoreError>;
}

pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn map_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<StudentRecord> {
        Ok(StudentRecord {
            id: r.get(0)?,
            name: r.get(1)?,
            course: r.get(2)?,
            grade: r.get(3)?,
            is_present: r.get::<_, i64>(4)? != 0,
            created_at: r.get(5)?,
        })
    }
}

impl RecordStore for SqliteStore<'_> {
    fn list(&self, owner_id: &str) -> Result<Vec<StudentRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, course, grade, is_present, created_at
                 FROM students
                 WHERE user_id = ?
                 ORDER BY created_at DESC, rowid DESC",
            )
            .map_err(StoreError::query)?;
        stmt.query_map([owner_id], |r| Self::map_row(r))
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(StoreError::query)
    }

    fn get(&self, owner_id: &str, id: &str) -> Result<Option<StudentRecord>, StoreError> {
        self.conn
            .query_row(
                "SELECT id, name, course, grade, is_present, created_at
                 FROM students
                 WHERE user_id = ? AND id = ?",
                (owner_id, id),
                |r| Self::map_row(r),
            )
            .optional()
            .map_err(StoreError::query)
    }

    fn create(&mut self, owner_id: &str, record: &StudentRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO students(id, user_id, name, course, grade, is_present, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?)",
                (
                    &record.id,
                    owner_id,
                    &record.name,
                    &record.course,
                    record.grade,
                    record.is_present as i64,
                    &record.created_at,
                ),
            )
            .map_err(StoreError::insert)?;
        Ok(())
    }

    fn update(&mut self, owner_id: &str, record: &StudentRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "UPDATE students
                 SET name = ?, course = ?, grade = ?, is_present = ?
                 WHERE user_id = ? AND id = ?",
                (
                    &record.name,
                    &record.course,
                    record.grade,
                    record.is_present as i64,
                    owner_id,
                    &record.id,
                ),
            )
            .map_err(StoreError::update)?;
        Ok(())
    }

    fn delete(&mut self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM students WHERE user_id = ? AND id = ?",
                (owner_id, id),
            )
            .map_err(StoreError::delete)?;
        Ok(removed > 0)
    }
}

/// Non-persisted store with the same contract. Backs gateway unit tests and
/// keeps the seam honest: nothing above this trait may assume SQLite.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<(String, StudentRecord)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn list(&self, owner_id: &str) -> Result<Vec<StudentRecord>, StoreError> {
        let mut out: Vec<StudentRecord> = self
            .rows
            .iter()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, r)| r.clone())
            .collect();
        // Rows are appended in creation order.
        out.reverse();
        Ok(out)
    }

    fn get(&self, owner_id: &str, id: &str) -> Result<Option<StudentRecord>, StoreError> {
        Ok(self
            .rows
            .iter()
            .find(|(owner, r)| owner == owner_id && r.id == id)
            .map(|(_, r)| r.clone()))
    }

    fn create(&mut self, owner_id: &str, record: &StudentRecord) -> Result<(), StoreError> {
        self.rows.push((owner_id.to_string(), record.clone()));
        Ok(())
    }

    fn update(&mut self, owner_id: &str, record: &StudentRecord) -> Result<(), StoreError> {
        for (owner, r) in self.rows.iter_mut() {
            if owner == owner_id && r.id == record.id {
                *r = record.clone();
                break;
            }
        }
        Ok(())
    }

    fn delete(&mut self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        let before = self.rows.len();
        self.rows
            .retain(|(owner, r)| !(owner == owner_id && r.id == id));
        Ok(self.rows.len() != before)
    }
}
