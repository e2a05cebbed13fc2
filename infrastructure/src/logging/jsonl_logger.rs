//! JSONL file writer for agent transcripts.
//!
//! Each [`AgentMessage`] is serialized as a single JSON line with a `type`
//! and `timestamp` field. A finished request ends with one `summary` line.

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use toolweave_domain::{AgentMessage, AgentResponse};

/// Transcript writer that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record.
pub struct JsonlTranscriptWriter {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptWriter {
    /// Open `path` for appending, creating it (and parent directories).
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, message: &AgentMessage) -> io::Result<()> {
        self.write_record("message", message)
    }

    /// Write the full transcript of a response followed by its summary line.
    ///
    /// Returns the number of lines written.
    pub fn write_response(&self, response: &AgentResponse) -> io::Result<usize> {
        for message in &response.messages {
            self.append(message)?;
        }
        self.write_record(
            "summary",
            &json!({
                "outcome": response.outcome,
                "iterations": response.iterations,
                "answer": response.answer,
                "citations": response.citations,
                "metrics": response.metrics,
            }),
        )?;
        Ok(response.messages.len() + 1)
    }

    fn write_record<T: Serialize>(&self, kind: &str, payload: &T) -> io::Result<()> {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = match serde_json::to_value(payload)? {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        record.insert("type".to_string(), Value::String(kind.to_string()));
        record.insert("timestamp".to_string(), Value::String(timestamp));

        let line = serde_json::to_string(&Value::Object(record))?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line)?;
        writer.flush()
    }
}

impl Drop for JsonlTranscriptWriter {
    fn drop(&mut self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.flush();
    }
}
