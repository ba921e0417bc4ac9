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
//! Handing finished GELF documents off.
//!
//! Getting a document to a GELF receiver (over UDP, TCP, HTTP, or whatever) is the business of
//! the host application. This module defines the [`Transport`] trait through which the
//! [`Layer`](crate::layer::Layer) hands off each serialized document, as well as
//! [`WriterTransport`], which writes delimited documents to any [`std::io::Write`]
//! implementation.
//!
//! # Examples
//!
//! To write newline-delimited documents to stdout:
//!
//! ```rust
//! use tracing_gelf::transport::WriterTransport;
//! let transpo = WriterTransport::stdout();
//! ```
//!
//! To frame documents the way GELF receivers listening on a TCP stream expect:
//!
//! ```rust
//! use tracing_gelf::transport::{Delimiter, WriterTransport};
//! let transpo = WriterTransport::new(Vec::<u8>::new()).with_delimiter(Delimiter::Null);
//! ```

use crate::error::{Error, Result};

use backtrace::Backtrace;
use bytes::{BufMut, BytesMut};

use std::{io::Write, sync::Mutex};

/// Operations all transports must support.
pub trait Transport {
    /// Send one serialized GELF document on this transport; return the number of bytes of `buf`
    /// that were sent.
    fn send(&self, buf: &[u8]) -> Result<usize>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }
}

/// What follows each document on a byte stream
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Delimiter {
    /// `\n`; one JSON document per line
    #[default]
    Newline,
    /// `\0`; the framing used by GELF TCP inputs
    Null,
}

impl Delimiter {
    fn byte(self) -> u8 {
        match self {
            Delimiter::Newline => b'\n',
            Delimiter::Null => 0,
        }
    }
}

/// Writing delimited GELF documents to an [`std::io::Write`] implementation.
///
/// The writer sits behind a [`Mutex`] so that documents written from different threads are
/// never interleaved.
pub struct WriterTransport<W: Write + Send> {
    writer: Mutex<W>,
    delimiter: Delimiter,
}

impl<W: Write + Send> WriterTransport<W> {
    pub fn new(writer: W) -> WriterTransport<W> {
        WriterTransport {
            writer: Mutex::new(writer),
            delimiter: Delimiter::default(),
        }
    }
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }
    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        // A poisoned lock just means some other thread panicked mid-write; the writer itself
        // is still there.
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WriterTransport<std::io::Stdout> {
    pub fn stdout() -> WriterTransport<std::io::Stdout> {
        WriterTransport::new(std::io::stdout())
    }
}

impl<W: Write + Send> Transport for WriterTransport<W> {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        let mut frame = BytesMut::with_capacity(buf.len() + 1);
        frame.put_slice(buf);
        frame.put_u8(self.delimiter.byte());

        let mut writer = self.writer.lock().map_err(|_| Error::Transport {
            source: "writer lock poisoned".into(),
            back: Backtrace::new(),
        })?;
        writer
            .write_all(&frame)
            .and_then(|_| writer.flush())
            .map_err(|err| Error::Transport {
                source: Box::new(err),
                back: Backtrace::new(),
            })?;

        Ok(buf.len())
    }
}
