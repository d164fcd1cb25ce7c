use crate::roster::StudentRecord;
use crate::store::{RecordStore, StoreError};
use uuid::Uuid;

/// This deployment uses percentage grades. The GPA 0.0-4.0 scale is the
/// other supported configuration of the record shape, but the two are never
/// mixed inside one workspace.
pub const GRADE_MIN: f64 = 0.0;
pub const GRADE_MAX: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct StudentInput {
    pub name: String,
    pub course: String,
    pub grade: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug)]
pub enum GatewayError {
    /// One entry per invalid field; nothing was persisted.
    Validation(Vec<FieldError>),
    NotFound,
    Store(StoreError),
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Remove is idempotent, but callers get to know which case they hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

fn validate(input: &StudentInput) -> Result<(String, String), Vec<FieldError>> {
    let name = input.name.trim();
    let course = input.course.trim();
    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError {
            field: "name",
            message: "Name is required",
        });
    }
    if course.is_empty() {
        errors.push(FieldError {
            field: "course",
            message: "Course is required",
        });
    }
    if !input.grade.is_finite() || !(GRADE_MIN..=GRADE_MAX).contains(&input.grade) {
        errors.push(FieldError {
            field: "grade",
            message: "Enter a grade between 0 and 100",
        });
    }
    if errors.is_empty() {
        Ok((name.to_string(), course.to_string()))
    } else {
        Err(errors)
    }
}

pub fn add(
    store: &mut dyn RecordStore,
    owner_id: &str,
    input: &StudentInput,
) -> Result<StudentRecord, GatewayError> {
    let (name, course) = validate(input).map_err(GatewayError::Validation)?;
    let record = StudentRecord {
        id: Uuid::new_v4().to_string(),
        name,
        course,
        grade: input.grade,
        is_present: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    store.create(owner_id, &record)?;
    Ok(record)
}

/// Replaces the three mutable fields; `id`, `is_present` and `created_at`
/// are preserved.
pub fn edit(
    store: &mut dyn RecordStore,
    owner_id: &str,
    id: &str,
    updates: &StudentInput,
) -> Result<StudentRecord, GatewayError> {
    let Some(existing) = store.get(owner_id, id)? else {
        return Err(GatewayError::NotFound);
    };
    let (name, course) = validate(updates).map_err(GatewayError::Validation)?;
    let updated = StudentRecord {
        name,
        course,
        grade: updates.grade,
        ..existing
    };
    store.update(owner_id, &updated)?;
    Ok(updated)
}

pub fn remove(
    store: &mut dyn RecordStore,
    owner_id: &str,
    id: &str,
) -> Result<RemoveOutcome, GatewayError> {
    if store.delete(owner_id, id)? {
        Ok(RemoveOutcome::Removed)
    } else {
        Ok(RemoveOutcome::NotFound)
    }
}

pub fn toggle_attendance(
    store: &mut dyn RecordStore,
    owner_id: &str,
    id: &str,
) -> Result<StudentRecord, GatewayError> {
    let Some(mut record) = store.get(owner_id, id)? else {
        return Err(GatewayError::NotFound);
    };
    record.is_present = !record.is_present;
    store.update(owner_id, &record)?;
    Ok(record)
}
