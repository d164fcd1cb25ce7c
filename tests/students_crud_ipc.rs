use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rosterd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rosterd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err_code(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
        .to_string()
}

#[test]
fn add_edit_toggle_delete_round_trip() {
    let workspace = temp_dir("rosterd-crud");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "auth.signUp",
        json!({ "email": "teacher@example.com", "password": "secret1" }),
    );

    // Add: whitespace is trimmed, attendance defaults to present, the
    // server assigns the id.
    let added = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.add",
        json!({ "name": " Carl ", "course": " CS ", "grade": 95 }),
    );
    let student = added.get("student").cloned().expect("student");
    let student_id = student
        .get("id")
        .and_then(|v| v.as_str())
        .expect("assigned id")
        .to_string();
    assert_eq!(student.get("name").and_then(|v| v.as_str()), Some("Carl"));
    assert_eq!(student.get("course").and_then(|v| v.as_str()), Some("CS"));
    assert_eq!(student.get("grade").and_then(|v| v.as_f64()), Some(95.0));
    assert_eq!(student.get("isPresent").and_then(|v| v.as_bool()), Some(true));

    // List includes the stored record verbatim, newest first.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.add",
        json!({ "name": "Dana", "course": "Math", "grade": 70 }),
    );
    let listed = request_ok(&mut stdin, &mut reader, "5", "students.list", json!({}));
    let students = listed
        .get("students")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("students array");
    assert_eq!(students.len(), 2);
    assert_eq!(
        students[0].get("name").and_then(|v| v.as_str()),
        Some("Dana")
    );
    assert_eq!(students[1], student);

    // Edit replaces name/course/grade and preserves id and attendance.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.toggleAttendance",
        json!({ "studentId": student_id }),
    );
    let edited = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.edit",
        json!({ "studentId": student_id, "name": "Carla", "course": "Physics", "grade": 88 }),
    );
    let edited = edited.get("student").cloned().expect("student");
    assert_eq!(
        edited.get("id").and_then(|v| v.as_str()),
        Some(student_id.as_str())
    );
    assert_eq!(edited.get("name").and_then(|v| v.as_str()), Some("Carla"));
    assert_eq!(
        edited.get("course").and_then(|v| v.as_str()),
        Some("Physics")
    );
    assert_eq!(edited.get("grade").and_then(|v| v.as_f64()), Some(88.0));
    assert_eq!(
        edited.get("isPresent").and_then(|v| v.as_bool()),
        Some(false)
    );

    // Toggle flips back on.
    let toggled = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.toggleAttendance",
        json!({ "studentId": student_id }),
    );
    assert_eq!(
        toggled
            .get("student")
            .and_then(|s| s.get("isPresent"))
            .and_then(|v| v.as_bool()),
        Some(true)
    );

    // Delete is idempotent: the outcome tells the two cases apart.
    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "students.delete",
        json!({ "studentId": student_id }),
    );
    assert_eq!(removed.get("removed").and_then(|v| v.as_bool()), Some(true));
    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "students.delete",
        json!({ "studentId": student_id }),
    );
    assert_eq!(
        removed.get("removed").and_then(|v| v.as_bool()),
        Some(false)
    );

    // Mutating a missing id reports not_found and changes nothing.
    assert_eq!(
        request_err_code(
            &mut stdin,
            &mut reader,
            "11",
            "students.toggleAttendance",
            json!({ "studentId": "no-such-id" }),
        ),
        "not_found"
    );
    assert_eq!(
        request_err_code(
            &mut stdin,
            &mut reader,
            "12",
            "students.edit",
            json!({ "studentId": "no-such-id", "name": "X", "course": "Y", "grade": 10 }),
        ),
        "not_found"
    );
    let listed = request_ok(&mut stdin, &mut reader, "13", "students.list", json!({}));
    assert_eq!(
        listed
            .get("students")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(1)
    );
}
