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

//! Write inline-policy GELF documents to stdout, one per line.

use tracing::{debug, error, info, trace, warn};
use tracing_gelf::{layer::Layer, tracing::DefaultTracingFormatter, transport::WriterTransport};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

#[derive(Debug)]
struct DiskOnFire(std::io::Error);

impl std::fmt::Display for DiskOnFire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "the disk is on fire")
    }
}

impl std::error::Error for DiskOnFire {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

pub fn main() {
    // Setup the real subsriber...
    let subscriber = Registry::default().with(Layer::<
        Registry,
        DefaultTracingFormatter,
        WriterTransport<std::io::Stdout>,
    >::stdout());
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("Hello, 世界!");
    debug!("Hello, 世界!");
    info!("Hello, 世界!");
    warn!(attempt = 3, "Hello, 世界!");
    error!("{}", "a".repeat(300));

    let err = DiskOnFire(std::io::Error::new(std::io::ErrorKind::Other, "smoke"));
    error!(error = &err as &(dyn std::error::Error + 'static), "I'm the message!");
}
