use super::*;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_classify() {
    assert_eq!(
        classify("[2024-01-01T00:00:00.000Z] [ERROR] Error in form submission: SMTP timeout"),
        LineClass::Error
    );
    assert_eq!(
        classify("[2024-01-01T00:00:00.000Z] [INFO] Email sent successfully"),
        LineClass::Success
    );
    assert_eq!(
        classify("[2024-01-01T00:00:00.000Z] [INFO] New form submission received"),
        LineClass::Info
    );
    // A failure whose reason mentions success is still a failure.
    assert_eq!(
        classify("[2024-01-01T00:00:00.000Z] [ERROR] message was not sent successfully"),
        LineClass::Error
    );
}

#[test]
fn test_missing_directory_has_no_logs() {
    let tmp = TempDir::new().unwrap();
    let files = load_log_files(&tmp.path().join("absent")).unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_load_sorts_newest_first_and_ignores_foreign_files() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "email_2024-01-02.log", "[t] [INFO] b\n");
    write(tmp.path(), "email_2023-12-31.log", "[t] [INFO] a\n");
    write(tmp.path(), "email_2024-02-10.log", "[t] [INFO] c\n");
    write(tmp.path(), "notes.txt", "ignored\n");
    fs::create_dir(tmp.path().join("email_archive")).unwrap();

    let names: Vec<String> = load_log_files(tmp.path())
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();

    assert_eq!(
        names,
        vec!["email_2024-02-10.log", "email_2024-01-02.log", "email_2023-12-31.log"]
    );
}

#[test]
fn test_load_drops_blank_lines() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "email_2024-01-01.log",
        "[t] [INFO] one\n\n   \n[t] [ERROR] two\n\t\n",
    );

    let files = load_log_files(tmp.path()).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].lines, vec!["[t] [INFO] one", "[t] [ERROR] two"]);
}

#[test]
fn test_render_empty_shows_placeholder() {
    let html = render(&[]).into_string();
    assert!(html.contains("<h1>Email Logs</h1>"));
    assert!(html.contains("<p>No logs found.</p>"));
    assert!(!html.contains(r#"class="log-file""#));
}

#[test]
fn test_render_lines_with_classes() {
    let files = vec![LogFile {
        name: "email_2024-01-01.log".to_string(),
        lines: vec![
            "[t] [INFO] New form submission received".to_string(),
            "[t] [INFO] Email sent successfully".to_string(),
            "[t] [ERROR] Error in form submission: Invalid email format".to_string(),
        ],
    }];

    let html = render(&files).into_string();

    assert!(html.contains(r#"<div class="log-date">email_2024-01-01.log</div>"#));
    assert!(html.contains(r#"<div class="log-entry INFO">[t] [INFO] New form submission received</div>"#));
    assert!(html.contains(r#"<div class="log-entry SUCCESS">[t] [INFO] Email sent successfully</div>"#));
    assert!(html.contains(
        r#"<div class="log-entry ERROR">[t] [ERROR] Error in form submission: Invalid email format</div>"#
    ));
    assert!(!html.contains("No logs found."));
}

#[test]
fn test_render_escapes_submitted_markup() {
    let files = vec![LogFile {
        name: "email_2024-01-01.log".to_string(),
        lines: vec!["[t] [INFO] Form data received - Name: <script>alert(1)</script>".to_string()],
    }];

    let html = render(&files).into_string();

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}

#[test]
fn test_render_log_dir_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "email_2024-01-01.log", "[t] [INFO] Email sent successfully\n");

    let first = render_log_dir(tmp.path()).unwrap();
    let second = render_log_dir(tmp.path()).unwrap();
    assert_eq!(first, second);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_an_error() {
    let tmp = TempDir::new().unwrap();
    // A regular file in place of the directory cannot be listed.
    let not_a_dir = tmp.path().join("logs");
    fs::write(&not_a_dir, "x").unwrap();

    assert!(render_log_dir(&not_a_dir).is_err());
}
