//! HTML rendering of the persisted audit log.

use crate::audit::FILE_PREFIX;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::io;
use std::path::Path;

const ERROR_MARKER: &str = "[ERROR]";
const SUCCESS_MARKER: &str = "sent successfully";

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
.log-entry { margin-bottom: 10px; }
.ERROR { color: red; }
.SUCCESS { color: green; }
.INFO { color: gray; }
.log-file { margin-bottom: 30px; }
.log-date { font-size: 1.2em; font-weight: bold; margin: 20px 0 10px 0; }
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Error,
    Success,
    Info,
}

impl LineClass {
    /// CSS class name for the rendered line.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineClass::Error => "ERROR",
            LineClass::Success => "SUCCESS",
            LineClass::Info => "INFO",
        }
    }
}

/// Error marker wins over the success marker.
pub fn classify(line: &str) -> LineClass {
    if line.contains(ERROR_MARKER) {
        LineClass::Error
    } else if line.contains(SUCCESS_MARKER) {
        LineClass::Success
    } else {
        LineClass::Info
    }
}

/// One day partition with its non-blank lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub name: String,
    pub lines: Vec<String>,
}

/// Reads every day partition in `dir`, most recent day first.
///
/// A directory that does not exist yet holds no logs. A file being appended to
/// concurrently may show a partial last line.
pub fn load_log_files(dir: &Path) -> io::Result<Vec<LogFile>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(FILE_PREFIX) && entry.file_type()?.is_file() {
            names.push(name);
        }
    }
    // ISO dates in the names make lexical order chronological.
    names.sort_unstable_by(|a, b| b.cmp(a));

    names
        .into_iter()
        .map(|name| -> io::Result<LogFile> {
            let raw = fs::read(dir.join(&name))?;
            let lines = String::from_utf8_lossy(&raw)
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect();
            Ok(LogFile { name, lines })
        })
        .collect()
}

pub fn render(files: &[LogFile]) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "Email Logs" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "Email Logs" }
                @if files.is_empty() {
                    p { "No logs found." }
                } @else {
                    @for file in files {
                        div.log-file {
                            div.log-date { (file.name) }
                            div.logs {
                                @for line in &file.lines {
                                    div class={ "log-entry " (classify(line).as_str()) } { (line) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Loads and renders the whole log directory as one HTML document.
pub fn render_log_dir(dir: &Path) -> io::Result<String> {
    let files = load_log_files(dir)?;
    Ok(render(&files).into_string())
}

#[cfg(test)]
mod tests;
