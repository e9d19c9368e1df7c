//! Per-request JSON logging to date-partitioned files.
//!
//! Every inbound request is captured as a [`LogEntry`] and appended as one
//! JSON line to `<log_dir>/<YYYY-MM-DD>.log`, using the UTC calendar date so
//! file boundaries do not depend on the host timezone. The destination is the
//! [`LogSink`] trait so tests can substitute an in-memory sink and assert on
//! emitted entries without touching the filesystem.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Current time as an ISO-8601 UTC timestamp with millisecond precision.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One inbound request, serialized as a single JSON line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Request-arrival time, ISO-8601
    pub timestamp: String,
    /// HTTP method
    pub method: String,
    /// Request path including query string
    pub url: String,
    /// Originating client address
    pub client_address: String,
    /// User-Agent header, omitted when the client sent none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Parsed request body; `{}` when empty or unparseable
    pub body: Value,
}

/// Destination for request log entries.
///
/// Append failures must never fail the request: the middleware logs a
/// warning and continues.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> std::io::Result<()>;
}

/// Appends entries to `<dir>/<YYYY-MM-DD>.log`, one JSON object per line.
///
/// The directory is created on first append if absent. A mutex serializes
/// appends so concurrent requests never interleave partial lines.
pub struct FileSink {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    /// Log file path for the current UTC date.
    pub fn current_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", Utc::now().format("%Y-%m-%d")))
    }
}

#[async_trait]
impl LogSink for FileSink {
    async fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        // One write per entry, under the lock, so lines never interleave.
        let _guard = self.lock.lock().await;
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_path())
            .await?;
        file.write_all(&line).await?;
        Ok(())
    }
}

/// In-memory sink recording entries for test assertions.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries recorded so far.
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}

/// Parse a request body for logging, keyed on the Content-Type header.
///
/// JSON bodies are recorded as-is, URL-encoded forms as a string map.
/// Anything else, including malformed JSON, degrades to an empty object
/// rather than failing the request.
pub fn parse_body(content_type: Option<&str>, bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Object(Map::new());
    }

    match content_type {
        Some(ct) if ct.contains("json") => {
            serde_json::from_slice(bytes).unwrap_or_else(|_| Value::Object(Map::new()))
        }
        Some(ct) if ct.contains("x-www-form-urlencoded") => parse_form(bytes),
        _ => Value::Object(Map::new()),
    }
}

/// Decode an `application/x-www-form-urlencoded` body into a string map.
fn parse_form(bytes: &[u8]) -> Value {
    let text = String::from_utf8_lossy(bytes);
    let mut map = Map::new();

    for pair in text.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        let value = decode_component(value);
        map.insert(key, Value::String(value));
    }

    Value::Object(map)
}

fn decode_component(component: &str) -> String {
    // '+' means space in form encoding; percent-decode the rest.
    let component = component.replace('+', " ");
    match urlencoding::decode(&component) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(url: &str) -> LogEntry {
        LogEntry {
            timestamp: iso_timestamp(),
            method: "GET".to_string(),
            url: url.to_string(),
            client_address: "203.0.113.5".to_string(),
            user_agent: Some("probe-test/1.0".to_string()),
            body: json!({}),
        }
    }

    #[test]
    fn entry_serializes_camel_case_and_skips_absent_user_agent() {
        let mut e = entry("/ping");
        e.user_agent = None;
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["clientAddress"], "203.0.113.5");
        assert!(value.get("userAgent").is_none());
        assert_eq!(value["body"], json!({}));
    }

    #[test]
    fn json_body_is_recorded_as_is() {
        let body = parse_body(Some("application/json"), br#"{"a":1}"#);
        assert_eq!(body, json!({"a": 1}));
    }

    #[test]
    fn malformed_json_degrades_to_empty_object() {
        let body = parse_body(Some("application/json"), b"{not json");
        assert_eq!(body, json!({}));
    }

    #[test]
    fn form_body_becomes_string_map() {
        let body = parse_body(
            Some("application/x-www-form-urlencoded"),
            b"name=probe+check&count=2&note=a%26b",
        );
        assert_eq!(
            body,
            json!({"name": "probe check", "count": "2", "note": "a&b"})
        );
    }

    #[test]
    fn unknown_content_type_degrades_to_empty_object() {
        let body = parse_body(Some("text/plain"), b"hello");
        assert_eq!(body, json!({}));
        let body = parse_body(None, b"hello");
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn file_sink_appends_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("logs"));

        sink.append(&entry("/ping")).await.unwrap();
        sink.append(&entry("/health")).await.unwrap();

        let contents = std::fs::read_to_string(sink.current_path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first["url"], "/ping");
        assert_eq!(second["url"], "/health");
    }

    #[tokio::test]
    async fn file_sink_names_file_after_utc_date() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());

        sink.append(&entry("/ping")).await.unwrap();

        let expected = format!("{}.log", Utc::now().format("%Y-%m-%d"));
        assert!(dir.path().join(expected).exists());
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let sink = std::sync::Arc::new(FileSink::new(dir.path()));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let sink = sink.clone();
                tokio::spawn(async move { sink.append(&entry(&format!("/ping/{i}"))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let contents = std::fs::read_to_string(sink.current_path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 16);
        for line in lines {
            let parsed: Value = serde_json::from_str(line).unwrap();
            assert!(parsed["url"].as_str().unwrap().starts_with("/ping/"));
        }
    }

    #[tokio::test]
    async fn memory_sink_records_entries_in_order() {
        let sink = MemorySink::new();
        sink.append(&entry("/first")).await.unwrap();
        sink.append(&entry("/second")).await.unwrap();

        let entries = sink.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "/first");
        assert_eq!(entries[1].url, "/second");
    }
}
