//! Structured JSON logging used by the binding layer and its reference
//! collaborators.
//!
//! Events carry a `target` such as `room_nav::binding.sync` plus a flat map
//! of JSON fields. Sinks decide where the serialized line ends up.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

pub type LogFields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub ts_ms: u128,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "LogFields::is_empty", default)]
    pub fields: LogFields,
}

impl LogEvent {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ts_ms: current_ms(),
            level,
            target: target.into(),
            message: message.into(),
            fields: LogFields::new(),
        }
    }

    pub fn with_fields(
        level: LogLevel,
        target: impl Into<String>,
        message: impl Into<String>,
        fields: LogFields,
    ) -> Self {
        Self {
            fields,
            ..Self::new(level, target, message)
        }
    }

    /// Fetch a single field value by key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

fn current_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("log sink poisoned")]
    Poisoned,
}

pub trait LogSink: Send + Sync {
    fn log(&self, event: &LogEvent) -> LoggingResult<()>;
}

/// Cheap-to-clone handle over a shared sink with a minimum level filter.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    min_level: LogLevel,
}

impl Logger {
    pub fn new<S>(sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        Self {
            sink: Arc::new(sink),
            min_level: LogLevel::Trace,
        }
    }

    /// Drop every event below `level` before it reaches the sink.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) -> LoggingResult<()> {
        self.log_event(LogEvent::new(level, target, message))
    }

    pub fn log_with_fields(
        &self,
        level: LogLevel,
        target: &str,
        message: &str,
        fields: LogFields,
    ) -> LoggingResult<()> {
        self.log_event(LogEvent::with_fields(level, target, message, fields))
    }

    pub fn log_event(&self, event: LogEvent) -> LoggingResult<()> {
        if !self.enabled(event.level) {
            return Ok(());
        }
        self.sink.log(&event)
    }
}

/// Appends one JSON line per event, truncating the file once it would grow
/// past `max_bytes` (zero disables the cap).
pub struct FileSink {
    path: PathBuf,
    max_bytes: u64,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>, max_bytes: u64) -> LoggingResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            max_bytes,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write_line(&self, mut line: String) -> LoggingResult<()> {
        line.push('\n');
        let mut guard = self.writer.lock().map_err(|_| LoggingError::Poisoned)?;

        if self.should_rotate(guard.get_ref(), line.len() as u64)? {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?;
            *guard = BufWriter::new(file);
        }

        guard.write_all(line.as_bytes())?;
        guard.flush()?;
        Ok(())
    }

    fn should_rotate(&self, file: &File, incoming_len: u64) -> std::io::Result<bool> {
        if self.max_bytes == 0 {
            return Ok(false);
        }
        let current = file.metadata()?.len();
        Ok(current + incoming_len > self.max_bytes)
    }
}

impl LogSink for FileSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let line = serde_json::to_string(event)?;
        self.write_line(line)
    }
}

/// Keeps every event in memory; handy for diagnostics overlays and tests.
#[derive(Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Messages of the captured events, in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.message).collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let mut guard = self.events.lock().map_err(|_| LoggingError::Poisoned)?;
        guard.push(event.clone());
        Ok(())
    }
}

pub fn event_with_fields(
    level: LogLevel,
    target: &str,
    message: &str,
    fields: impl IntoIterator<Item = (String, Value)>,
) -> LogEvent {
    let map: LogFields = fields.into_iter().collect();
    LogEvent::with_fields(level, target, message, map)
}

pub fn json_kv(key: &str, value: impl Into<Value>) -> (String, Value) {
    (key.to_string(), value.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn min_level_filters_events() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone()).with_min_level(LogLevel::Info);
        logger.log(LogLevel::Debug, "room_nav::test", "dropped").unwrap();
        logger.log(LogLevel::Warn, "room_nav::test", "kept").unwrap();
        assert_eq!(sink.messages(), vec!["kept".to_string()]);
    }

    #[test]
    fn event_fields_serialize_flat() {
        let event = event_with_fields(
            LogLevel::Info,
            "room_nav::test",
            "focus_applied",
            [json_kv("node", json!("#/list/item2"))],
        );
        let line = serde_json::to_string(&event).unwrap();
        assert!(line.contains("\"level\":\"info\""));
        assert!(line.contains("\"node\":\"#/list/item2\""));
        assert_eq!(event.field("node"), Some(&json!("#/list/item2")));
    }

    #[test]
    fn empty_fields_are_skipped() {
        let event = LogEvent::new(LogLevel::Trace, "room_nav::test", "bare");
        let line = serde_json::to_string(&event).unwrap();
        assert!(!line.contains("fields"));
    }

    #[test]
    fn file_sink_rotates_when_capped() {
        let path = std::env::temp_dir().join(format!(
            "room_nav_log_{}_{}.jsonl",
            std::process::id(),
            current_ms()
        ));
        let sink = FileSink::new(&path, 200).unwrap();
        let logger = Logger::new(sink);
        for _ in 0..10 {
            logger
                .log(LogLevel::Info, "room_nav::test", "a fairly long message body")
                .unwrap();
        }
        let len = std::fs::metadata(&path).unwrap().len();
        assert!(len <= 200);
        let _ = std::fs::remove_file(&path);
    }
}
