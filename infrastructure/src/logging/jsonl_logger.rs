//! JSONL file writer for turn events.
//!
//! Each [`TurnEvent`] is serialized as a single JSON line with a `type`
//! field and `timestamp`, appended to the file via a buffered writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use toolgate_application::ports::turn_logger::{TurnEvent, TurnLogger};

/// JSONL turn logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlTurnLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTurnLogger {
    /// Create a new logger writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create turn log directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create turn log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TurnLogger for JsonlTurnLogger {
    fn log(&self, event: TurnEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // Build the record: merge payload with type + timestamp
        let record = if let serde_json::Value::Object(mut map) = event.payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(event.event_type.to_string()),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": event.payload,
            })
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // Flush per line for crash safety — JSONL is append-only
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlTurnLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_jsonl_logger_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.turns.jsonl");
        let logger = JsonlTurnLogger::new(&path).unwrap();

        logger.log(TurnEvent::new(
            "turn_started",
            serde_json::json!({
                "mode": "tool_required",
                "user_text": "what's the weather?"
            }),
        ));

        logger.log(TurnEvent::new(
            "tool_call",
            serde_json::json!({
                "tool": "local_weather",
                "round": 1
            }),
        ));

        drop(logger);

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("type").is_some());
            assert!(value.get("timestamp").is_some());
        }

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "turn_started");
        assert_eq!(first["mode"], "tool_required");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "tool_call");
        assert_eq!(second["tool"], "local_weather");
    }

    #[test]
    fn test_jsonl_logger_handles_non_object_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test2.turns.jsonl");
        let logger = JsonlTurnLogger::new(&path).unwrap();

        logger.log(TurnEvent::new(
            "simple_event",
            serde_json::json!("just a string"),
        ));

        drop(logger);

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(value["type"], "simple_event");
        assert_eq!(value["data"], "just a string");
    }
}
