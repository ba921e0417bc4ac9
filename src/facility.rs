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
//! GELF constants & syslog severity defintions.
//!
//! GELF borrows its `level` field from syslog: [`Level`] replicates the names used in
//! `<syslog.h>`, and `level as u8` is the value that lands in a document. The facility, on the
//! other hand, is fixed: every document this crate produces names [`FACILITY`].

use crate::error::{Error, Result};

use backtrace::Backtrace;

type StdResult<T, E> = std::result::Result<T, E>;

/// The GELF version this crate speaks
pub const VERSION: &str = "1.0";

/// The value of the `facility` field in every document
pub const FACILITY: &str = "GELF";

/// Default cap on `short_message`, in UTF-16 code units
pub const MAX_SHORT_MESSAGE_LENGTH: usize = 250;

/// RFC [5424] defines eight severity levels for messages; GELF adopts the same scale. The
/// enumeration values duplicate the constants documented as per the `syslog()` manual [page] &
/// defined in `<syslog.h>`.
///
/// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
/// [page]: https://man7.org/linux/man-pages/man3/syslog.3.html
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// system is unusable
    LOG_EMERG,
    /// action must be take immediately
    LOG_ALERT,
    /// critical conditions
    LOG_CRIT,
    /// error conditions
    LOG_ERR,
    /// warning conditions
    LOG_WARNING,
    /// normal, but significant condition
    LOG_NOTICE,
    /// informational message
    LOG_INFO,
    /// debug-level message
    LOG_DEBUG,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Level::LOG_EMERG => "LOG_EMERG",
                Level::LOG_ALERT => "LOG_ALERT",
                Level::LOG_CRIT => "LOG_CRIT",
                Level::LOG_ERR => "LOG_ERR",
                Level::LOG_WARNING => "LOG_WARNING",
                Level::LOG_NOTICE => "LOG_NOTICE",
                Level::LOG_INFO => "LOG_INFO",
                Level::LOG_DEBUG => "LOG_DEBUG",
            }
        )
    }
}

impl std::convert::TryFrom<u8> for Level {
    type Error = Error;
    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(Level::LOG_EMERG),
            1 => Ok(Level::LOG_ALERT),
            2 => Ok(Level::LOG_CRIT),
            3 => Ok(Level::LOG_ERR),
            4 => Ok(Level::LOG_WARNING),
            5 => Ok(Level::LOG_NOTICE),
            6 => Ok(Level::LOG_INFO),
            7 => Ok(Level::LOG_DEBUG),
            _ => Err(Error::BadLevel {
                level,
                back: Backtrace::new(),
            }),
        }
    }
}

/// The default mapping from [`tracing`] levels to syslog severities
///
/// [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
impl std::convert::From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        match level {
            &tracing::Level::TRACE | &tracing::Level::DEBUG => Level::LOG_DEBUG,
            &tracing::Level::INFO => Level::LOG_INFO,
            &tracing::Level::WARN => Level::LOG_WARNING,
            &tracing::Level::ERROR => Level::LOG_ERR,
        }
    }
}
