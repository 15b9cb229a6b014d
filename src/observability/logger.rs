//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, `severity` second, remaining fields sorted by key
//! - Synchronous, unbuffered
//! - WARN and below to stdout, ERROR and FATAL to stderr

use std::fmt;
use std::io::{self, Write};

use serde_json::{Map, Value};

/// Log severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info,
    /// Recoverable or absorbed issues
    Warn,
    /// Operation failures
    Error,
    /// Unrecoverable, process exits
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured logger emitting one JSON object per event.
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = Self::render(severity, event, fields);
        if severity >= Severity::Error {
            let mut err = io::stderr();
            let _ = err.write_all(line.as_bytes());
            let _ = err.flush();
        } else {
            let mut out = io::stdout();
            let _ = out.write_all(line.as_bytes());
            let _ = out.flush();
        }
    }

    /// Render the event to its single-line JSON form.
    ///
    /// serde_json maps preserve insertion order, so `event` and `severity`
    /// lead and the remaining fields follow in sorted order.
    fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut object = Map::new();
        object.insert("event".to_string(), Value::String(event.to_string()));
        object.insert(
            "severity".to_string(),
            Value::String(severity.as_str().to_string()),
        );

        let mut sorted: Vec<_> = fields.to_vec();
        sorted.sort_by_key(|(key, _)| *key);
        for (key, value) in sorted {
            object.insert(key.to_string(), Value::String(value.to_string()));
        }

        let mut line = Value::Object(object).to_string();
        line.push('\n');
        line
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    pub fn fatal(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Fatal, event, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_rendered_line_is_valid_json() {
        let line = Logger::render(Severity::Info, "RESTORE_RUN_STARTED", &[("hostels", "2")]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "RESTORE_RUN_STARTED");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["hostels"], "2");
    }

    #[test]
    fn test_event_and_severity_lead() {
        let line = Logger::render(Severity::Warn, "X", &[("alpha", "1")]);
        let event_pos = line.find("\"event\"").unwrap();
        let severity_pos = line.find("\"severity\"").unwrap();
        let alpha_pos = line.find("\"alpha\"").unwrap();
        assert!(event_pos < severity_pos);
        assert!(severity_pos < alpha_pos);
    }

    #[test]
    fn test_fields_sorted_deterministically() {
        let a = Logger::render(Severity::Info, "X", &[("zebra", "1"), ("apple", "2")]);
        let b = Logger::render(Severity::Info, "X", &[("apple", "2"), ("zebra", "1")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_one_line_per_event() {
        let line = Logger::render(Severity::Info, "X", &[("message", "line1\nline2")]);
        assert_eq!(line.chars().filter(|c| *c == '\n').count(), 1);
        assert!(line.ends_with('\n'));
    }
}
