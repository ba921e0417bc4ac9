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
//! Deriving a GELF `short_message` from a `full_message`.
//!
//! Lengths are measured in UTF-16 code units, which is how the GELF receivers this crate was
//! written against count characters. A message longer than the limit is cut to `limit - 1`
//! units, not `limit`.

/// Summarize `full` in at most `limit - 1` UTF-16 code units.
///
/// If `full` is no longer than `limit` it is returned unchanged. Otherwise the leading `limit - 1`
/// code units are kept; a character that would straddle the cut (i.e. a surrogate pair whose
/// high half lands on the last kept unit) is dropped whole.
pub fn short_message(full: &str, limit: usize) -> String {
    // Bail early for the common case of a short message
    if full.len() <= limit || full.encode_utf16().count() <= limit {
        return full.to_string();
    }

    let keep = limit.saturating_sub(1);
    let mut units = 0;
    let mut end = 0;
    for (idx, c) in full.char_indices() {
        if units + c.len_utf16() > keep {
            break;
        }
        units += c.len_utf16();
        end = idx + c.len_utf8();
    }
    full[..end].to_string()
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::facility::MAX_SHORT_MESSAGE_LENGTH;

    #[test]
    fn short_messages_are_untouched() {
        assert_eq!(short_message("", MAX_SHORT_MESSAGE_LENGTH), "");
        assert_eq!(
            short_message("I'm the message!", MAX_SHORT_MESSAGE_LENGTH),
            "I'm the message!"
        );
        let exactly = "b".repeat(250);
        assert_eq!(short_message(&exactly, MAX_SHORT_MESSAGE_LENGTH), exactly);
    }

    #[test]
    fn long_messages_lose_limit_minus_one() {
        let full = "a".repeat(300);
        let short = short_message(&full, MAX_SHORT_MESSAGE_LENGTH);
        assert_eq!(short.len(), 249);
        assert!(short.chars().all(|c| c == 'a'));
        assert_eq!(short, full[..249]);

        let full = "c".repeat(251);
        assert_eq!(short_message(&full, MAX_SHORT_MESSAGE_LENGTH).len(), 249);
    }

    #[test]
    fn counts_utf16_units_not_bytes() {
        // 200 characters, 600 bytes of UTF-8, 200 UTF-16 code units
        let full = "世".repeat(200);
        assert_eq!(short_message(&full, MAX_SHORT_MESSAGE_LENGTH), full);

        let full = "界".repeat(260);
        let short = short_message(&full, MAX_SHORT_MESSAGE_LENGTH);
        assert_eq!(short.chars().count(), 249);
    }

    #[test]
    fn surrogate_pairs() {
        // Each 🦀 is two UTF-16 code units; with a limit of 6, keep 5 units: two crabs & half
        // of a third, which is dropped.
        let full = "🦀".repeat(4);
        assert_eq!(short_message(&full, 6), "🦀🦀");
        assert_eq!(short_message(&full, 8), full);
    }

    #[test]
    fn degenerate_limits() {
        assert_eq!(short_message("abc", 0), "");
        assert_eq!(short_message("abc", 1), "");
        assert_eq!(short_message("abc", 2), "a");
        assert_eq!(short_message("", 0), "");
    }
}
