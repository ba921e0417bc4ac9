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
//! A [`tracing-subscriber`] [`Layer`] implementation for formatting [`tracing`] [`Event`]s as
//! [GELF] documents
//!
//! [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//! [`tracing`]: https://docs.rs/tracing/0.1.35/tracing/index.html
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
//! [GELF]: https://go2docs.graylog.org/current/getting_in_log_data/gelf.html
//!
//! # Introduction
//!
//! The Graylog Extended Log Format is a JSON schema for log messages. A handful of fields are
//! fixed by the format (`version`, `host`, `short_message`, `full_message`, `timestamp`,
//! `level`, `facility`, `file` & `line`); everything else is an "additional" field & must be
//! named with a leading underscore.
//!
//! This crate concerns itself with producing those documents, not with delivering them: the
//! translation from a [`tracing`] [`Event`] to a GELF document happens in three parts:
//!
//! 1. capturing the [`Event`] as a [`LogEvent`](event::LogEvent) ([`tracing::TracingFormatter`])
//! 2. encoding that as a [`GelfDocument`](gelf::GelfDocument) ([`gelf::GelfEncoder`])
//! 3. handing the serialized document off to a [`Transport`](transport::Transport)
//!
//! The encoder may be used on its own, without [`tracing`]:
//!
//! ```rust
//! use tracing_gelf::{
//!     event::LogEvent,
//!     exception::ExceptionPolicy,
//!     facility::Level,
//!     gelf::GelfEncoder,
//!     throwable::{StackFrame, Throwable},
//! };
//!
//! let encoder = GelfEncoder::builder()
//!     .policy(ExceptionPolicy::Structured)
//!     .hostname_as_string("bree.local".to_string())
//!     .build();
//! let event = LogEvent::new(1656000000000, Level::LOG_ERR, Some("I'm the message!"))
//!     .with_thread("main")
//!     .with_throwable(Throwable::new("std::io::Error").with_frame(StackFrame::new(
//!         "my_app::server",
//!         "handle",
//!         Some("src/server.rs"),
//!         Some(160),
//!     )));
//!
//! let doc = encoder.encode(&event);
//! assert_eq!(doc.get("short_message").and_then(|v| v.as_str()), Some("I'm the message!"));
//! assert_eq!(doc.get("_stackTrace").unwrap()[0]["line"], 160);
//! ```
//!
//! # Exceptions
//!
//! GELF says nothing about exceptions, and layouts in the wild do one of two things: append the
//! stack trace to `full_message` (reporting the innermost frame's location in `file` & `line`),
//! or carry it in separate `_throwable` & `_stackTrace` fields. Neither is canonical, so the
//! choice is yours; see [`exception::ExceptionPolicy`].
//!
//! # Usage
//!
//! [`tracing-gelf`](crate)'s [`Layer`] comes with sane defaults:
//!
//! ```rust
//! use tracing::info;
//! use tracing_gelf::layer::Layer;
//! use tracing_subscriber::registry::Registry;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//!
//! // The default configuration is to inline exceptions into `full_message` and to
//! // write one document per line to stdout.
//! let subscriber = Registry::default().with(Layer::stdout());
//!
//! tracing::subscriber::with_default(subscriber, || {
//!     info!("Hello, world!");
//! });
//! ```
//!
//! Will produce something like this (keys are always sorted):
//!
//! ```text
//! {"_thread":"main","facility":"GELF","full_message":"Hello, world!","host":"bree","level":6,"short_message":"Hello, world!","timestamp":1656000000000,"version":"1.0"}
//! ```
//!
//! That said, the capture of [`tracing`] [`Event`]s, the encoding & the transport are
//! configurable:
//!
//! ```rust
//! use tracing::info;
//! use tracing_gelf::{
//!     exception::ExceptionPolicy,
//!     gelf::GelfEncoder,
//!     layer::Layer,
//!     tracing::DefaultTracingFormatter,
//!     transport::{Delimiter, WriterTransport},
//! };
//! use tracing_subscriber::registry::Registry;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//!
//! let subscriber = Registry::default().with(Layer::new(
//!     GelfEncoder::new(ExceptionPolicy::Structured),
//!     DefaultTracingFormatter::default().with_source_location(true),
//!     WriterTransport::new(std::io::stderr()).with_delimiter(Delimiter::Null),
//! ));
//!
//! tracing::subscriber::with_default(subscriber, || {
//!     info!("Hello, world!");
//! });
//! ```

pub mod error;
pub mod event;
pub mod exception;
pub mod facility;
pub mod gelf;
pub mod hostname;
pub mod layer;
pub mod throwable;
pub mod tracing;
pub mod transport;
pub mod truncate;
