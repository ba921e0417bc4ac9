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
//! Figuring out the GELF `host` field.
//!
//! The hostname is a best-effort diagnostic: failing to find one is never a reason to drop a log
//! event. It is looked-up at most once per process & cached thereafter.

use crate::error::{Error, Result};

use backtrace::Backtrace;

use std::sync::OnceLock;

/// The `host` value used when no hostname (or IP address) can be found
pub const UNKNOWN_HOST: &str = "Unknown host";

static HOSTNAME: OnceLock<String> = OnceLock::new();

/// The process-wide hostname.
///
/// The first caller pays for the lookup; concurrent first callers block on the [`OnceLock`]
/// until that single lookup completes, after which every caller gets the same `&'static str`.
/// A failed lookup caches [`UNKNOWN_HOST`].
pub fn hostname() -> &'static str {
    HOSTNAME.get_or_init(|| resolve_with(lookup))
}

/// Run `lookup`, substituting [`UNKNOWN_HOST`] if it fails or comes back empty.
pub fn resolve_with<F>(lookup: F) -> String
where
    F: FnOnce() -> Result<String>,
{
    match lookup() {
        Ok(name) if !name.is_empty() => name,
        _ => UNKNOWN_HOST.to_string(),
    }
}

/// Attempt to figure-out a name for this host.
///
/// First try [gethostname()]; if that fails (or hands back something that isn't UTF-8) fall back
/// to the textual form of this host's primary IP address.
///
/// [gethostname()]: https://man7.org/linux/man-pages/man2/gethostname.2.html
fn lookup() -> Result<String> {
    hostname::get()
        .map_err(|err| Error::NoHostname {
            source: Box::new(err),
            back: Backtrace::new(),
        })
        // `hostname::get()` returns an `OsString`, which may not be valid UTF-8
        .and_then(|hn| {
            hn.into_string().map_err(|hn| Error::NoHostname {
                source: format!("{:?} is not valid UTF-8", hn).into(),
                back: Backtrace::new(),
            })
        })
        .and_then(|hn| {
            if hn.is_empty() {
                Err(Error::NoHostname {
                    source: "gethostname() returned an empty name".into(),
                    back: Backtrace::new(),
                })
            } else {
                Ok(hn)
            }
        })
        .or_else(|_err| {
            local_ip_address::local_ip()
                .map(|ip| ip.to_string())
                .map_err(|err| Error::NoHostname {
                    source: Box::new(err),
                    back: Backtrace::new(),
                })
        })
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn fallback() {
        assert_eq!(
            resolve_with(|| Err(Error::NoHostname {
                source: "no network".into(),
                back: Backtrace::new(),
            })),
            UNKNOWN_HOST
        );
        assert_eq!(resolve_with(|| Ok(String::new())), UNKNOWN_HOST);
        assert_eq!(resolve_with(|| Ok("bree.local".to_string())), "bree.local");
    }

    #[test]
    fn cached() {
        let first = hostname();
        assert!(!first.is_empty());
        // Same allocation, not merely the same contents
        assert!(std::ptr::eq(first, hostname()));
    }

    #[test]
    fn concurrent_first_call() {
        let names: Vec<&'static str> = (0..8)
            .map(|_| std::thread::spawn(hostname))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();
        assert!(names.windows(2).all(|w| w[0] == w[1]));
    }
}
