// Copyright (C) 2022-2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of tracing-gelf.
//
// tracing-gelf is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// tracing-gelf is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with tracing-gelf.  If
// not, see <http://www.gnu.org/licenses/>.
//! GELF document assembly.
//!
//! [`GelfEncoder`] maps a [`LogEvent`] onto the fields of a GELF [`GelfDocument`]:
//!
//! | field           | source                                                          |
//! |-----------------|-----------------------------------------------------------------|
//! | `version`       | always [`VERSION`]                                              |
//! | `host`          | [`hostname()`], unless overridden                               |
//! | `facility`      | always [`FACILITY`]                                             |
//! | `timestamp`     | the event's timestamp (epoch millis, as a number)               |
//! | `level`         | the event's syslog severity (as a number)                       |
//! | `full_message`  | the event's message, plus the stack trace under the inline policy |
//! | `short_message` | `full_message`, cut down by [`short_message()`]                 |
//! | `_thread`       | the event's thread name                                         |
//! | `file`, `line`, `_class`, `_method` | source location, else first frame (inline only) |
//! | `_throwable`, `_stackTrace` | the event's exception (structured policy only)      |
//!
//! Event fields follow, as additional fields. Keys are kept sorted, so identical events
//! produce byte-identical documents.

use crate::{
    error::Result,
    event::LogEvent,
    exception::{serialize, ExceptionPolicy},
    facility::{FACILITY, MAX_SHORT_MESSAGE_LENGTH, VERSION},
    hostname::{hostname, resolve_with},
    truncate::short_message,
};

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

/// Fields defined by GELF itself; anything else is an "additional" field & must begin with `_`
pub const STANDARD_FIELDS: &[&str] = &[
    "version",
    "host",
    "short_message",
    "full_message",
    "timestamp",
    "level",
    "facility",
    "line",
    "file",
];

/// Additional fields the encoder owns: `_id` is reserved by GELF, the rest carry the event's
/// thread, source location & exception and must be absent when those are
pub const RESERVED_FIELDS: &[&str] = &[
    "_id",
    "_thread",
    "_class",
    "_method",
    "_throwable",
    "_stackTrace",
];

/// Map `name` to a legal GELF additional field name.
///
/// Prepends `_` unless already present & replaces characters outside `[A-Za-z0-9_.-]` with `_`.
/// Returns [`None`] for the empty name & for the [`RESERVED_FIELDS`].
pub fn additional_field_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let mut field = String::with_capacity(name.len() + 1);
    if !name.starts_with('_') {
        field.push('_');
    }
    field.extend(name.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
            c
        } else {
            '_'
        }
    }));
    if RESERVED_FIELDS.contains(&field.as_str()) {
        None
    } else {
        Some(field)
    }
}

/// A single GELF message, as a JSON object.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GelfDocument(Map<String, Value>);

impl GelfDocument {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
    /// Add an additional field named after `name` (see [`additional_field_name`]).
    ///
    /// Existing fields are never overwritten; returns true if the field was added.
    pub fn add_field(&mut self, name: &str, value: Value) -> bool {
        match additional_field_name(name) {
            Some(field) if !self.0.contains_key(&field) => {
                self.0.insert(field, value);
                true
            }
            _ => false,
        }
    }
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
    pub fn to_bytes(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
    fn put(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }
    fn put_if_absent(&mut self, key: String, value: Value) {
        self.0.entry(key).or_insert(value);
    }
}

/// Turns [`LogEvent`]s into [`GelfDocument`]s.
///
/// Holds no mutable state; a single encoder may be shared freely between threads.
#[derive(Clone, Debug)]
pub struct GelfEncoder {
    policy: ExceptionPolicy,
    max_short_message_length: usize,
    host: Option<String>,
}

impl std::default::Default for GelfEncoder {
    fn default() -> Self {
        GelfEncoder {
            policy: ExceptionPolicy::default(),
            max_short_message_length: MAX_SHORT_MESSAGE_LENGTH,
            host: None,
        }
    }
}

pub struct GelfEncoderBuilder {
    imp: GelfEncoder,
}

impl GelfEncoderBuilder {
    pub fn policy(mut self, policy: ExceptionPolicy) -> Self {
        self.imp.policy = policy;
        self
    }
    pub fn max_short_message_length(mut self, max: usize) -> Self {
        self.imp.max_short_message_length = max;
        self
    }
    /// Use `hostname` in lieu of this host's name; the empty string means "Unknown host"
    pub fn hostname_as_string(mut self, hostname: String) -> Self {
        self.imp.host = Some(resolve_with(|| Ok(hostname)));
        self
    }
    pub fn build(self) -> GelfEncoder {
        self.imp
    }
}

impl GelfEncoder {
    pub fn new(policy: ExceptionPolicy) -> GelfEncoder {
        GelfEncoder {
            policy,
            ..Default::default()
        }
    }
    pub fn builder() -> GelfEncoderBuilder {
        GelfEncoderBuilder {
            imp: GelfEncoder::default(),
        }
    }
    pub fn policy(&self) -> ExceptionPolicy {
        self.policy
    }
    pub fn hostname(&self) -> &str {
        self.host.as_deref().unwrap_or_else(|| hostname())
    }
    /// Build the GELF document for `event`.
    ///
    /// This cannot fail: missing inputs are represented by missing fields.
    pub fn encode(&self, event: &LogEvent) -> GelfDocument {
        let mut doc = GelfDocument::default();
        doc.put("version", VERSION);
        doc.put("host", self.hostname());
        doc.put("timestamp", event.timestamp);
        doc.put("facility", FACILITY);
        doc.put("level", event.level as u8);
        doc.put("_thread", event.thread.as_str());

        if let Some(location) = &event.location {
            if let Some(file) = &location.file {
                doc.put("file", file.as_str());
            }
            if let Some(line) = location.line {
                doc.put("line", line);
            }
            if let Some(class_name) = &location.class_name {
                doc.put("_class", class_name.as_str());
            }
            if let Some(method_name) = &location.method_name {
                doc.put("_method", method_name.as_str());
            }
        }

        let mut full_message = event.message.clone();
        if let Some(throwable) = &event.throwable {
            let serialized = serialize(throwable, self.policy);
            if let Some(suffix) = serialized.full_message_suffix {
                full_message.push('\n');
                full_message.push_str(&suffix);
            }
            // The event's own source location, if any, takes precedence
            for (key, value) in serialized.fields {
                doc.put_if_absent(key, value);
            }
        }

        doc.put(
            "short_message",
            short_message(&full_message, self.max_short_message_length),
        );
        doc.put("full_message", full_message);

        for (name, value) in &event.fields {
            doc.add_field(name, value.clone());
        }

        doc
    }
    /// Build the GELF document for `event` & serialize it.
    pub fn format(&self, event: &LogEvent) -> Result<String> {
        self.encode(event).to_json()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::{
        event::SourceLocation,
        facility::Level,
        hostname::UNKNOWN_HOST,
        throwable::{StackFrame, Throwable},
    };

    use serde_json::json;

    const TIMESTAMP: i64 = 1_656_000_000_123;

    fn io_error() -> Throwable {
        Throwable::new("std::io::Error").with_frames(vec![
            StackFrame::new("my_app::server", "handle", Some("src/server.rs"), Some(160)),
            StackFrame::new("my_app::router", "dispatch", Some("src/router.rs"), Some(77)),
            StackFrame::new("my_app", "serve", Some("src/main.rs"), Some(195)),
            StackFrame::new("my_app", "main", Some("src/main.rs"), Some(63)),
        ])
    }

    fn event(message: &str) -> LogEvent {
        LogEvent::new(TIMESTAMP, Level::LOG_ERR, Some(message)).with_thread("main")
    }

    fn encoder(policy: ExceptionPolicy) -> GelfEncoder {
        GelfEncoder::builder()
            .policy(policy)
            .hostname_as_string("bree.local".to_string())
            .build()
    }

    const LOCATION_FIELDS: &[&str] = &["file", "line", "_class", "_method"];
    const STRUCTURED_FIELDS: &[&str] = &["_throwable", "_stackTrace"];

    #[test]
    fn mandatory_fields() {
        let doc = encoder(ExceptionPolicy::Inline).encode(&event("I'm the message!"));
        assert_eq!(doc.get("version"), Some(&json!("1.0")));
        assert_eq!(doc.get("host"), Some(&json!("bree.local")));
        assert_eq!(doc.get("facility"), Some(&json!("GELF")));
        assert_eq!(doc.get("timestamp").and_then(Value::as_i64), Some(TIMESTAMP));
        assert_eq!(doc.get("level").and_then(Value::as_u64), Some(3));
        assert_eq!(doc.get("_thread"), Some(&json!("main")));
        assert_eq!(doc.get("short_message"), Some(&json!("I'm the message!")));
        assert_eq!(doc.get("full_message"), Some(&json!("I'm the message!")));
        assert_eq!(doc.len(), 8);
        for key in LOCATION_FIELDS.iter().chain(STRUCTURED_FIELDS) {
            assert!(!doc.contains_key(key), "unexpected key {}", key);
        }
    }

    #[test]
    fn no_throwable_either_policy() {
        for policy in [ExceptionPolicy::Inline, ExceptionPolicy::Structured] {
            let doc = encoder(policy).encode(&event("I'm the message!"));
            for key in LOCATION_FIELDS.iter().chain(STRUCTURED_FIELDS) {
                assert!(!doc.contains_key(key), "unexpected key {} ({:?})", key, policy);
            }
        }
    }

    #[test]
    fn long_messages() {
        let msg = "a".repeat(300);
        let doc = encoder(ExceptionPolicy::Inline).encode(&event(&msg));
        let short = doc.get("short_message").and_then(Value::as_str).unwrap();
        let full = doc.get("full_message").and_then(Value::as_str).unwrap();
        assert_eq!(short.len(), 249);
        assert!(short.chars().all(|c| c == 'a'));
        assert_eq!(full.len(), 300);

        let doc = GelfEncoder::builder()
            .max_short_message_length(10)
            .build()
            .encode(&event("0123456789abc"));
        assert_eq!(doc.get("short_message"), Some(&json!("012345678")));
    }

    #[test]
    fn inline_throwable() {
        let t = io_error();
        let doc = encoder(ExceptionPolicy::Inline)
            .encode(&event("I'm the message!").with_throwable(t.clone()));
        let expected_full = format!("I'm the message!\n{}", t.render());
        assert_eq!(doc.get("full_message"), Some(&json!(expected_full)));
        assert_eq!(doc.get("short_message"), Some(&json!(expected_full)));
        assert_eq!(doc.get("file"), Some(&json!("src/server.rs")));
        assert_eq!(doc.get("line"), Some(&json!(160)));
        assert_eq!(doc.get("_class"), Some(&json!("my_app::server")));
        assert_eq!(doc.get("_method"), Some(&json!("handle")));
        for key in STRUCTURED_FIELDS {
            assert!(!doc.contains_key(key));
        }
    }

    #[test]
    fn inline_throwable_truncated() {
        // Short enough on its own; too long once the trace is appended
        let msg = "m".repeat(200);
        let t = io_error();
        let doc = encoder(ExceptionPolicy::Inline).encode(&event(&msg).with_throwable(t.clone()));
        let full = doc.get("full_message").and_then(Value::as_str).unwrap();
        let short = doc.get("short_message").and_then(Value::as_str).unwrap();
        assert_eq!(full, format!("{}\n{}", msg, t.render()));
        assert!(full.encode_utf16().count() > 250);
        assert_eq!(short.encode_utf16().count(), 249);
        assert!(full.starts_with(short));
        assert!(short.len() > msg.len() + 1);
        let head = format!("{}\nstd::io::Error\n\tat my_app::server.handle", msg);
        assert!(short.starts_with(&head));
    }

    #[test]
    fn inline_throwable_without_frames() {
        let t = Throwable::new("std::io::Error");
        let doc =
            encoder(ExceptionPolicy::Inline).encode(&event("I'm the message!").with_throwable(t));
        assert_eq!(doc.get("full_message"), Some(&json!("I'm the message!\nstd::io::Error\n")));
        for key in LOCATION_FIELDS {
            assert!(!doc.contains_key(key));
        }
    }

    #[test]
    fn structured_throwable() {
        let t = io_error();
        let doc = encoder(ExceptionPolicy::Structured)
            .encode(&event("I'm the message!").with_throwable(t.clone()));
        assert_eq!(doc.get("full_message"), Some(&json!("I'm the message!")));
        assert_eq!(doc.get("short_message"), Some(&json!("I'm the message!")));
        assert_eq!(
            doc.get("_throwable"),
            Some(&json!({"message": null, "className": "std::io::Error"}))
        );
        let trace = doc.get("_stackTrace").and_then(Value::as_array).unwrap();
        assert_eq!(trace.len(), 4);
        for (obj, frame) in trace.iter().zip(&t.frames) {
            assert_eq!(obj["class"], json!(frame.class_name));
            assert_eq!(obj["method"], json!(frame.method_name));
            assert_eq!(obj["line"], json!(frame.line_number));
            assert_eq!(obj["file"], json!(frame.file_name));
        }
        assert_eq!(trace[0]["file"], "src/server.rs");
        for key in LOCATION_FIELDS {
            assert!(!doc.contains_key(key));
        }
    }

    #[test]
    fn source_location_takes_precedence() {
        let location = SourceLocation::new("src/main.rs", 42).with_class_name("my_app::server");
        let doc = encoder(ExceptionPolicy::Inline).encode(
            &event("I'm the message!")
                .with_location(location.clone())
                .with_throwable(io_error()),
        );
        assert_eq!(doc.get("file"), Some(&json!("src/main.rs")));
        assert_eq!(doc.get("line"), Some(&json!(42)));
        assert_eq!(doc.get("_class"), Some(&json!("my_app::server")));
        // Not in the source location, so taken from the first frame
        assert_eq!(doc.get("_method"), Some(&json!("handle")));

        let doc = encoder(ExceptionPolicy::Structured)
            .encode(&event("I'm the message!").with_location(location));
        assert_eq!(doc.get("file"), Some(&json!("src/main.rs")));
        assert_eq!(doc.get("line"), Some(&json!(42)));
        assert!(!doc.contains_key("_method"));
        assert!(!doc.contains_key("_stackTrace"));
    }

    #[test]
    fn additional_fields() {
        assert_eq!(additional_field_name("user"), Some("_user".to_string()));
        assert_eq!(additional_field_name("_user"), Some("_user".to_string()));
        assert_eq!(additional_field_name("http.status"), Some("_http.status".to_string()));
        assert_eq!(additional_field_name("a b/c"), Some("_a_b_c".to_string()));
        assert_eq!(additional_field_name("id"), None);
        assert_eq!(additional_field_name("_id"), None);
        assert_eq!(additional_field_name(""), None);

        let doc = encoder(ExceptionPolicy::Inline).encode(
            &event("I'm the message!")
                .with_field("request_id", 17)
                .with_field("host", "spoofed")
                .with_field("thread", "spoofed")
                .with_field("_thread", "spoofed")
                .with_field("id", "reserved"),
        );
        assert_eq!(doc.get("_request_id"), Some(&json!(17)));
        assert_eq!(doc.get("host"), Some(&json!("bree.local")));
        assert_eq!(doc.get("_host"), Some(&json!("spoofed")));
        assert_eq!(doc.get("_thread"), Some(&json!("main")));
        assert!(!doc.contains_key("_id"));
        for (key, _) in doc.iter() {
            assert!(STANDARD_FIELDS.contains(&key.as_str()) || key.starts_with('_'));
        }
    }

    #[test]
    fn reserved_fields() {
        for name in ["class", "_method", "throwable", "stackTrace", "thread"] {
            assert_eq!(additional_field_name(name), None, "{}", name);
        }
        // Only a prefix or a substring; not reserved
        assert_eq!(additional_field_name("class_name"), Some("_class_name".to_string()));

        for policy in [ExceptionPolicy::Inline, ExceptionPolicy::Structured] {
            let doc = encoder(policy).encode(
                &LogEvent::new(1, Level::LOG_INFO, Some("m"))
                    .with_field("class", "Handler")
                    .with_field("method", "GET")
                    .with_field("throwable", "none")
                    .with_field("stackTrace", json!([]))
                    .with_field("path", "/"),
            );
            for key in LOCATION_FIELDS.iter().chain(STRUCTURED_FIELDS) {
                assert!(!doc.contains_key(key), "unexpected key {} ({:?})", key, policy);
            }
            assert_eq!(doc.get("_path"), Some(&json!("/")));
        }

        // The encoder's own values are untouched by colliding event fields
        let doc = encoder(ExceptionPolicy::Structured).encode(
            &event("I'm the message!")
                .with_throwable(io_error())
                .with_field("throwable", "spoofed")
                .with_field("method", "GET"),
        );
        assert_eq!(
            doc.get("_throwable").and_then(|t| t.get("className")),
            Some(&json!("std::io::Error"))
        );
        assert!(!doc.contains_key("_method"));
    }

    #[test]
    fn hostname() {
        assert_eq!(GelfEncoder::default().hostname(), crate::hostname::hostname());
        let doc = GelfEncoder::builder()
            .hostname_as_string(String::new())
            .build()
            .encode(&event("x"));
        assert_eq!(doc.get("host"), Some(&json!(UNKNOWN_HOST)));
    }

    #[test]
    fn idempotent() {
        let encoder = encoder(ExceptionPolicy::Structured);
        let e = event("I'm the message!")
            .with_throwable(io_error())
            .with_field("b", 2)
            .with_field("a", 1);
        let first = encoder.format(&e).unwrap();
        assert_eq!(first, encoder.format(&e).unwrap());
        assert_eq!(first.as_bytes(), &encoder.encode(&e).to_bytes().unwrap()[..]);

        let parsed: Value = serde_json::from_str(&first).unwrap();
        assert_eq!(parsed, encoder.encode(&e).into_value());
    }

    #[test]
    fn concurrent() {
        let encoder = std::sync::Arc::new(encoder(ExceptionPolicy::Inline));
        let e = std::sync::Arc::new(event("I'm the message!").with_throwable(io_error()));
        let expected = encoder.format(&e).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let encoder = encoder.clone();
                let e = e.clone();
                std::thread::spawn(move || encoder.format(&e).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }
}
