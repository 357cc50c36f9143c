//! Output pane
//!
//! A named diagnostic channel: every filebridge log event is appended to
//! `<log dir>/<pane name>.log` as a timestamped line. This is the only
//! operational record of what the service did for each request.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Target prefix of events captured by the pane
const CAPTURED_TARGET: &str = "filebridge";

/// Timestamped line sink, usable as a `tracing` layer
pub struct OutputPane {
    name: String,
    path: PathBuf,
    file: Mutex<File>,
}

impl OutputPane {
    /// Create (or reopen) the pane's log file
    pub fn create(name: &str, dir: &Path) -> std::io::Result<Self> {
        let path = dir.join(format!("{}.log", sanitize_pane_name(name)));
        std::fs::create_dir_all(dir)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            name: name.to_string(),
            path,
            file: Mutex::new(file),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Log file backing the pane
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `[YYYY-MM-DD HH:MM:SS] message`
    pub fn write_line(&self, message: &str) {
        let line = format!("[{}] {}\n", timestamp(), message);
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn sanitize_pane_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.trim().is_empty() {
        "filebridge".to_string()
    } else {
        cleaned
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for OutputPane {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(CAPTURED_TARGET) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut line = match *metadata.level() {
            Level::ERROR => format!("ERROR: {}", visitor.message),
            Level::WARN => format!("WARNING: {}", visitor.message),
            _ => visitor.message,
        };
        if !visitor.fields.is_empty() {
            line.push(' ');
            line.push_str(&visitor.fields.join(" "));
        }
        self.write_line(&line);
    }
}
