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

//! Write structured-policy GELF documents, with source locations & captured backtraces, to
//! stdout, framed as for a GELF TCP input.

use tracing::{error, info};
use tracing_gelf::{
    exception::ExceptionPolicy,
    gelf::GelfEncoder,
    layer::Layer,
    tracing::DefaultTracingFormatter,
    transport::{Delimiter, WriterTransport},
};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

fn fail() -> std::io::Result<()> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "/etc/gelf.conf"))
}

pub fn main() {
    let subscriber = Registry::default().with(Layer::new(
        GelfEncoder::new(ExceptionPolicy::Structured),
        DefaultTracingFormatter::default()
            .with_source_location(true)
            .with_backtrace(true),
        WriterTransport::stdout().with_delimiter(Delimiter::Null),
    ));
    let _guard = tracing::subscriber::set_default(subscriber);

    info!(user = "sp1ff", "Hello, 世界!");
    if let Err(err) = fail() {
        error!(error = &err as &(dyn std::error::Error + 'static), "couldn't read config");
    }
}
