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
//! Representing a [`Throwable`] in a GELF document.
//!
//! GELF has no notion of an exception, and layouts in the wild disagree on how to carry one.
//! [`ExceptionPolicy`] names the two conventions this crate supports:
//!
//! - [`Inline`](ExceptionPolicy::Inline): the rendered stack trace is appended to `full_message`
//!   and the first frame's location lands in `file`, `line`, `_class` & `_method`
//! - [`Structured`](ExceptionPolicy::Structured): `full_message` is left alone and the exception
//!   is carried in the additional fields `_throwable` & `_stackTrace`

use crate::throwable::{StackFrame, Throwable};

use serde_json::{json, Map, Value};

/// How exceptions are to be represented
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ExceptionPolicy {
    /// Append the rendered trace to `full_message`; report the first frame's location
    #[default]
    Inline,
    /// Emit `_throwable` & `_stackTrace` objects
    Structured,
}

/// The result of serializing a [`Throwable`] under some [`ExceptionPolicy`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SerializedThrowable {
    /// Text to be appended (after a newline) to the event's rendered message
    pub full_message_suffix: Option<String>,
    /// Fields to be merged into the document
    pub fields: Map<String, Value>,
}

/// Serialize `throwable` according to `policy`.
///
/// Under [`ExceptionPolicy::Inline`], a throwable with an empty stack trace yields the suffix
/// but no location fields.
pub fn serialize(throwable: &Throwable, policy: ExceptionPolicy) -> SerializedThrowable {
    match policy {
        ExceptionPolicy::Inline => {
            let mut fields = Map::new();
            if let Some(frame) = throwable.frames.first() {
                if let Some(file) = &frame.file_name {
                    fields.insert("file".to_string(), Value::from(file.as_str()));
                }
                if let Some(line) = frame.line_number {
                    fields.insert("line".to_string(), Value::from(line));
                }
                fields.insert("_class".to_string(), Value::from(frame.class_name.as_str()));
                fields.insert("_method".to_string(), Value::from(frame.method_name.as_str()));
            }
            SerializedThrowable {
                full_message_suffix: Some(throwable.render()),
                fields,
            }
        }
        ExceptionPolicy::Structured => {
            let mut fields = Map::new();
            fields.insert("_throwable".to_string(), throwable_object(throwable));
            fields.insert(
                "_stackTrace".to_string(),
                Value::Array(throwable.frames.iter().map(frame_object).collect()),
            );
            SerializedThrowable {
                full_message_suffix: None,
                fields,
            }
        }
    }
}

fn throwable_object(throwable: &Throwable) -> Value {
    let mut obj = json!({
        "message": throwable.message,
        "className": throwable.class_name,
    });
    if let (Some(cause), Value::Object(map)) = (&throwable.cause, &mut obj) {
        map.insert("cause".to_string(), throwable_object(cause));
    }
    obj
}

fn frame_object(frame: &StackFrame) -> Value {
    json!({
        "class": frame.class_name,
        "method": frame.method_name,
        "line": frame.line_number,
        "file": frame.file_name,
    })
}
