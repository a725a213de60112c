use crate::dashboard::DashboardEvent;
use crate::errors::PoolguardError;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_DISK_BUDGET_BYTES: u64 = 10 * 1024 * 1024;

/// Append-only JSONL log of dashboard events. One line per record; the log
/// directory is pruned oldest-first whenever the byte budget is exceeded.
#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes: 4096,
            budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
        }
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), PoolguardError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PoolguardError::Io(e.to_string()))?;
        }
        let truncated = truncate_json(event.payload.clone(), self.max_payload_bytes);
        let line = serde_json::to_string(&LogEvent {
            level: event.level,
            event_type: event.event_type,
            payload: truncated,
        })
        .map_err(|e| PoolguardError::Io(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PoolguardError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| PoolguardError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| PoolguardError::Io(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            let _ = prune_log_dir(parent, self.budget_bytes)?;
        }

        Ok(())
    }

    /// Records one dashboard event as a structured line.
    pub fn record(&self, event: DashboardEvent) -> Result<(), PoolguardError> {
        let (event_type, payload) = describe_event(event);
        self.append(&LogEvent {
            level: "info",
            event_type,
            payload,
        })
    }
}

fn describe_event(event: DashboardEvent) -> (&'static str, Value) {
    match event {
        DashboardEvent::TicketCreated { id } => ("ticket_created", json!({ "ticket_id": id })),
        DashboardEvent::CommentAdded { id } => ("comment_added", json!({ "ticket_id": id })),
        DashboardEvent::TicketClosed { id } => ("ticket_closed", json!({ "ticket_id": id })),
        DashboardEvent::AlertAcknowledged => ("alert_acknowledged", json!({})),
        DashboardEvent::MonitoringToggled { active } => {
            ("monitoring_toggled", json!({ "active": active }))
        }
    }
}

/// Deletes the oldest files in `dir` until the directory fits the budget.
/// Returns what was removed.
pub fn prune_log_dir(dir: &Path, budget_bytes: u64) -> Result<Vec<PathBuf>, PoolguardError> {
    let mut files = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| PoolguardError::Io(e.to_string()))?;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        if meta.is_file() {
            files.push((path, meta.len(), meta.modified().ok()));
        }
    }
    files.sort_by(|a, b| a.2.cmp(&b.2));

    let mut total = files.iter().map(|(_, len, _)| len).sum::<u64>();
    let mut deleted = Vec::new();
    for (path, len, _) in files {
        if total <= budget_bytes {
            break;
        }
        fs::remove_file(&path).map_err(|e| PoolguardError::Io(e.to_string()))?;
        total = total.saturating_sub(len);
        deleted.push(path);
    }
    Ok(deleted)
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut truncated = rendered;
    truncated.truncate(max_bytes.saturating_sub(3));
    Value::String(format!("{truncated}..."))
}
