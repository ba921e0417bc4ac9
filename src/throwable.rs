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
//! Exceptions, as far as a GELF document is concerned.
//!
//! A [`Throwable`] is a class (type) name, an optional message, an ordered list of
//! [`StackFrame`]s (innermost first) and, optionally, the [`Throwable`] that caused it. Rust has no
//! exceptions, of course; these are built from [`std::error::Error`] chains, from captured
//! backtraces, or by hand by host code that has richer information.

use std::fmt::Write;

type StdResult<T, E> = std::result::Result<T, E>;

/// The class name given to each link of an [`Error::source`] chain
///
/// [`Error::source`]: std::error::Error::source
pub const SOURCE_CLASS_NAME: &str = "source";

/// One frame of a stack trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    pub class_name: String,
    pub method_name: String,
    pub file_name: Option<String>,
    pub line_number: Option<u32>,
}

impl StackFrame {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        file_name: Option<&str>,
        line_number: Option<u32>,
    ) -> StackFrame {
        StackFrame {
            class_name: class_name.into(),
            method_name: method_name.into(),
            file_name: file_name.map(String::from),
            line_number,
        }
    }
    /// Build a frame from a path-qualified symbol like `my_crate::module::function`; everything
    /// up to the last `::` is taken to be the "class".
    pub fn from_symbol(symbol: &str, file_name: Option<String>, line_number: Option<u32>) -> Self {
        let (class_name, method_name) = symbol.rsplit_once("::").unwrap_or(("", symbol));
        StackFrame {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            file_name,
            line_number,
        }
    }
}

impl std::fmt::Display for StackFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        if !self.class_name.is_empty() {
            write!(f, "{}.", self.class_name)?;
        }
        match (&self.file_name, self.line_number) {
            (Some(file), Some(line)) => write!(f, "{}({}:{})", self.method_name, file, line),
            (Some(file), None) => write!(f, "{}({})", self.method_name, file),
            (None, _) => write!(f, "{}(Unknown Source)", self.method_name),
        }
    }
}

/// An exception attached to a log event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Throwable {
    pub class_name: String,
    pub message: Option<String>,
    pub frames: Vec<StackFrame>,
    pub cause: Option<Box<Throwable>>,
}

impl Throwable {
    pub fn new(class_name: impl Into<String>) -> Throwable {
        Throwable {
            class_name: class_name.into(),
            message: None,
            frames: Vec::new(),
            cause: None,
        }
    }
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
    pub fn with_frames(mut self, frames: Vec<StackFrame>) -> Self {
        self.frames = frames;
        self
    }
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }
    pub fn with_cause(mut self, cause: Throwable) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
    /// Build a [`Throwable`] named `class_name` from an error & its chain of sources.
    ///
    /// [`std::error::Error`] offers no type name at runtime, so each link of the source chain is
    /// named [`SOURCE_CLASS_NAME`]. None of the resulting throwables carry frames.
    pub fn from_error(
        class_name: impl Into<String>,
        err: &(dyn std::error::Error + 'static),
    ) -> Throwable {
        let mut sources = Vec::new();
        let mut next = err.source();
        while let Some(source) = next {
            sources.push(source.to_string());
            next = source.source();
        }
        let cause = sources.into_iter().rev().fold(None, |cause, message| {
            let mut link = Throwable::new(SOURCE_CLASS_NAME).with_message(message);
            link.cause = cause.map(Box::new);
            Some(link)
        });
        Throwable {
            class_name: class_name.into(),
            message: Some(err.to_string()),
            frames: Vec::new(),
            cause: cause.map(Box::new),
        }
    }
    /// Build a [`Throwable`] whose frames are the caller's current stack.
    ///
    /// Frames belonging to the unwinder & to this function are skipped. Symbols are demangled
    /// without their trailing hash; frames with no symbol at all are dropped.
    pub fn capture(class_name: impl Into<String>, message: Option<&str>) -> Throwable {
        let back = backtrace::Backtrace::new();
        let mut frames: Vec<StackFrame> = back
            .frames()
            .iter()
            .flat_map(|frame| frame.symbols())
            .filter_map(|sym| {
                sym.name().map(|name| {
                    StackFrame::from_symbol(
                        &format!("{:#}", name),
                        sym.filename().map(|p| p.display().to_string()),
                        sym.lineno(),
                    )
                })
            })
            .collect();
        // Everything up to & including this function is noise
        let first = frames
            .iter()
            .rposition(is_capture_frame)
            .map(|i| i + 1)
            .unwrap_or(0);
        Throwable {
            class_name: class_name.into(),
            message: message.map(String::from),
            frames: frames.split_off(first),
            cause: None,
        }
    }
    /// The first line of the rendered trace: `class` or `class: message`
    pub fn header(&self) -> String {
        match &self.message {
            Some(message) => format!("{}: {}", self.class_name, message),
            None => self.class_name.clone(),
        }
    }
    /// Render this throwable the way a conventional stack-trace printer would.
    ///
    /// ```text
    /// std::io::Error: disk on fire
    /// 	at my_app::server.handle(src/server.rs:160)
    /// 	at my_app.main(src/main.rs:63)
    /// Caused by: my_app::config::Error
    /// 	at my_app::config.load(src/config.rs:12)
    /// 	... 1 more
    /// ```
    ///
    /// Every line, the last included, is terminated by `\n`. Frames a cause shares with the
    /// trace that encloses it are elided.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a `String` cannot fail
        let _ = writeln!(out, "{}", self.header());
        for frame in &self.frames {
            let _ = writeln!(out, "\tat {}", frame);
        }
        let mut enclosing = &self.frames;
        let mut cause = self.cause.as_deref();
        while let Some(this) = cause {
            let _ = writeln!(out, "Caused by: {}", this.header());
            let in_common = this
                .frames
                .iter()
                .rev()
                .zip(enclosing.iter().rev())
                .take_while(|(a, b)| a == b)
                .count();
            for frame in &this.frames[..this.frames.len() - in_common] {
                let _ = writeln!(out, "\tat {}", frame);
            }
            if in_common != 0 {
                let _ = writeln!(out, "\t... {} more", in_common);
            }
            enclosing = &this.frames;
            cause = this.cause.as_deref();
        }
        out
    }
}

// Generic instantiations may demangle as `Throwable::capture::<T>`, which splits differently
fn is_capture_frame(frame: &StackFrame) -> bool {
    frame.class_name.contains("Throwable::capture")
        || (frame.class_name.ends_with("Throwable") && frame.method_name == "capture")
}
