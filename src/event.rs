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
//! The log event handed to the encoder.

use crate::{facility::Level, throwable::Throwable};

use serde_json::Value;

use std::collections::BTreeMap;

/// Where in the source an event was emitted. Any part may be unknown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
}

impl SourceLocation {
    /// A location with just a file & line; the usual case for Rust code
    pub fn new(file: impl Into<String>, line: u32) -> SourceLocation {
        SourceLocation {
            file: Some(file.into()),
            line: Some(line),
            class_name: None,
            method_name: None,
        }
    }
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
    pub fn with_method_name(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = Some(method_name.into());
        self
    }
    pub fn is_empty(&self) -> bool {
        self.file.is_none()
            && self.line.is_none()
            && self.class_name.is_none()
            && self.method_name.is_none()
    }
}

/// A single, already-captured log event.
///
/// Everything the encoder needs is here: it never looks at the clock, the current thread or
/// anything else outside the event (the hostname excepted).
#[derive(Clone, Debug, PartialEq)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub level: Level,
    /// The rendered message; an event with no message renders as the empty string
    pub message: String,
    pub thread: String,
    pub location: Option<SourceLocation>,
    pub throwable: Option<Throwable>,
    /// Additional key/value pairs; emitted as GELF additional fields
    pub fields: BTreeMap<String, Value>,
}

impl LogEvent {
    pub fn new(timestamp: i64, level: Level, message: Option<&str>) -> LogEvent {
        LogEvent {
            timestamp,
            level,
            message: message.unwrap_or_default().to_string(),
            thread: String::new(),
            location: None,
            throwable: None,
            fields: BTreeMap::new(),
        }
    }
    pub fn with_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = thread.into();
        self
    }
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
    pub fn with_throwable(mut self, throwable: Throwable) -> Self {
        self.throwable = Some(throwable);
        self
    }
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn builder() {
        let event = LogEvent::new(1_656_000_000_000, Level::LOG_ERR, None)
            .with_thread("main")
            .with_location(SourceLocation::new("src/main.rs", 12).with_method_name("main"))
            .with_field("request_id", 7);
        assert_eq!(event.message, "");
        assert_eq!(event.thread, "main");
        assert_eq!(event.location.as_ref().and_then(|l| l.line), Some(12));
        assert!(event.location.as_ref().unwrap().class_name.is_none());
        assert!(event.throwable.is_none());
        assert_eq!(event.fields["request_id"], 7);

        assert!(SourceLocation::default().is_empty());
        assert!(!SourceLocation::new("a.rs", 1).is_empty());
    }
}
