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
//! Primitives for mapping [`tracing`] entities to [`LogEvent`]s.
//!
//! [`TracingFormatter`] implementations capture a [`tracing`] [`Event`] as a [`LogEvent`]. This
//! module provides at this time only a single implementation: [`DefaultTracingFormatter`].
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html

use crate::{
    error::Error,
    event::{LogEvent, SourceLocation},
    facility::Level,
    throwable::{StackFrame, Throwable},
};

use serde_json::Value;

use std::collections::BTreeMap;

type StdResult<T, E> = std::result::Result<T, E>;

/// Capture [`tracing`] [`Event`]s as [`LogEvent`]s.
///
/// [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
///
/// The translation from [`tracing`] events to GELF messages occurs in three parts:
///
/// 1. capturing the Event as a [`LogEvent`]: timestamp, severity, message, thread, location,
///    exception & whatever other fields it carries
///
/// 2. encoding that [`LogEvent`] as a GELF document (see [`GelfEncoder`])
///
/// 3. handing the serialized document to a [`Transport`]
///
/// [`GelfEncoder`]: crate::gelf::GelfEncoder
/// [`Transport`]: crate::transport::Transport
///
/// Trait [`TracingFormatter`] formally defines step 1. Implementations may decline to produce a
/// [`LogEvent`] for a given [`Event`] by returning `Ok(None)`.
pub trait TracingFormatter<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    type Error: std::error::Error + Send + Sync + 'static;
    /// An event has occurred
    fn on_event(
        &self,
        event: &tracing::Event,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> StdResult<Option<LogEvent>, Self::Error>;
}

/// The [`TracingFormatter`] used by default.
///
/// - the "message" field becomes the message (an event without one has an empty message)
/// - the first field recorded as an [`std::error::Error`] becomes the exception, named after the
///   field; its [`source`](std::error::Error::source) chain becomes the chain of causes
/// - every other field becomes an additional field
/// - the severity is mapped by [`Level::from`], unless replaced via
///   [`with_level_mapping`](DefaultTracingFormatter::with_level_mapping)
///
/// The event's file, line & module path are reported only if asked for via
/// [`with_source_location`](DefaultTracingFormatter::with_source_location); similarly the
/// exception carries the emitting thread's stack only if asked for via
/// [`with_backtrace`](DefaultTracingFormatter::with_backtrace).
pub struct DefaultTracingFormatter {
    map_level: Box<dyn Fn(&tracing::Level) -> Level + Send + Sync>,
    source_location: bool,
    backtrace: bool,
}

impl std::default::Default for DefaultTracingFormatter {
    fn default() -> Self {
        DefaultTracingFormatter {
            map_level: Box::new(|level: &tracing::Level| Level::from(level)),
            source_location: false,
            backtrace: false,
        }
    }
}

impl DefaultTracingFormatter {
    pub fn with_level_mapping<F>(mut self, map_level: F) -> Self
    where
        F: Fn(&tracing::Level) -> Level + Send + Sync + 'static,
    {
        self.map_level = Box::new(map_level);
        self
    }
    pub fn with_source_location(mut self, source_location: bool) -> Self {
        self.source_location = source_location;
        self
    }
    pub fn with_backtrace(mut self, backtrace: bool) -> Self {
        self.backtrace = backtrace;
        self
    }
}

struct LogEventVisitor {
    message: Option<String>,
    throwable: Option<Throwable>,
    fields: BTreeMap<String, Value>,
}

impl LogEventVisitor {
    fn record_value(&mut self, field: &tracing::field::Field, value: Value) {
        // Fields added by tracing-log when bridging `log` records; the metadata carries the same
        // information once normalized
        #[cfg(feature = "tracing-log")]
        if field.name().starts_with("log.") {
            return;
        }
        self.fields.insert(field.name().to_string(), value);
    }
}

impl tracing::field::Visit for LogEventVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.record_value(field, Value::from(value));
        }
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.record_value(field, Value::from(value));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.record_value(field, Value::from(value));
    }
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        // Non-finite values become `null`
        self.record_value(field, Value::from(value));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.record_value(field, Value::from(value));
    }
    fn record_error(
        &mut self,
        field: &tracing::field::Field,
        value: &(dyn std::error::Error + 'static),
    ) {
        if self.throwable.is_none() {
            self.throwable = Some(Throwable::from_error(field.name(), value));
        } else {
            self.record_value(field, Value::from(value.to_string()));
        }
    }
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // The tracing macros `info!()`, `event!()` & the like all take care to "pre-format" the
        // `message` field so that `value` actually refers to a `std::fmt::Arguments` instance,
        // which will print to a debug format without enclosing double-quotes.
        let text = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.record_value(field, Value::from(text));
        }
    }
}

// The stack at the time `on_event()` runs begins with this crate, tracing's dispatch machinery &
// the standard library glue in between; only what follows is of interest.
const DISPATCH_PREFIXES: &[&str] = &[
    "tracing_gelf::",
    "tracing_core::",
    "tracing_subscriber::",
    "tracing_log::",
    "tracing::",
    "std::",
    "core::",
    "alloc::",
];

fn is_dispatch_frame(frame: &StackFrame) -> bool {
    let class_name = frame.class_name.trim_start_matches('<');
    DISPATCH_PREFIXES
        .iter()
        .any(|prefix| class_name.starts_with(prefix))
}

fn thread_name() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}

impl<S> TracingFormatter<S> for DefaultTracingFormatter
where
    S: tracing_core::subscriber::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    type Error = Error;
    fn on_event(
        &self,
        event: &tracing::Event,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> StdResult<Option<LogEvent>, Error> {
        // When the tracing-log feature is enabled, use normalized_metadata() to get file/line
        // info for events that originated from the `log` crate. For native tracing events,
        // normalized_metadata() returns None and we use the event's own metadata.
        #[cfg(feature = "tracing-log")]
        use tracing_log::NormalizeEvent;
        #[cfg(feature = "tracing-log")]
        let normalized_meta = event.normalized_metadata();
        #[cfg(feature = "tracing-log")]
        let meta = normalized_meta.as_ref().unwrap_or_else(|| event.metadata());
        #[cfg(not(feature = "tracing-log"))]
        let meta = event.metadata();

        let mut visitor = LogEventVisitor {
            message: None,
            throwable: None,
            fields: BTreeMap::new(),
        };
        event.record(&mut visitor);

        let mut log_event = LogEvent::new(
            chrono::Utc::now().timestamp_millis(),
            (*self.map_level)(meta.level()),
            visitor.message.as_deref(),
        )
        .with_thread(thread_name());
        log_event.fields = visitor.fields;

        if self.source_location {
            let location = SourceLocation {
                file: meta.file().map(String::from),
                line: meta.line(),
                class_name: meta.module_path().map(String::from),
                method_name: None,
            };
            if !location.is_empty() {
                log_event.location = Some(location);
            }
        }

        if let Some(mut throwable) = visitor.throwable {
            if self.backtrace {
                throwable.frames = Throwable::capture(throwable.class_name.as_str(), None)
                    .frames
                    .into_iter()
                    .skip_while(is_dispatch_frame)
                    .collect();
            }
            log_event.throwable = Some(throwable);
        }

        Ok(Some(log_event))
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn dispatch_frames() {
        let frames = vec![
            StackFrame::from_symbol(
                "tracing_gelf::tracing::DefaultTracingFormatter::on_event",
                None,
                None,
            ),
            StackFrame::from_symbol(
                "<tracing_subscriber::layer::layered::Layered<L,S> \
                 as tracing_core::subscriber::Subscriber>::event",
                None,
                None,
            ),
            StackFrame::from_symbol("std::thread::local::LocalKey<T>::with", None, None),
            StackFrame::from_symbol("tracing_core::event::Event::dispatch", None, None),
            StackFrame::from_symbol(
                "my_app::server::handle",
                Some("src/server.rs".to_string()),
                Some(12),
            ),
            StackFrame::from_symbol("std::rt::lang_start", None, None),
        ];
        let kept: Vec<StackFrame> = frames.into_iter().skip_while(is_dispatch_frame).collect();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].class_name, "my_app::server");
        assert_eq!(kept[0].method_name, "handle");
    }

    #[test]
    fn thread_names() {
        let name = std::thread::Builder::new()
            .name("worker-1".to_string())
            .spawn(thread_name)
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(name, "worker-1");

        let name = std::thread::Builder::new()
            .spawn(thread_name)
            .unwrap()
            .join()
            .unwrap();
        assert!(name.starts_with("ThreadId("));
    }
}
