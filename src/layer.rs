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
//! [tracing-gelf](crate) [`Layer`] implementations.
//!
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//!
//! A basic struct [`Layer`] is defined, generic over the means of capturing [`tracing`] events
//! ([`TracingFormatter`]) and of handing off the resulting documents ([`Transport`]). Consumers of
//! this crate are of course free to implement those traits for themselves.
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html

use crate::{
    error::{Error, Result},
    gelf::GelfEncoder,
    tracing::{DefaultTracingFormatter, TracingFormatter},
    transport::{Transport, WriterTransport},
};

use backtrace::Backtrace;
use tracing::Event;
use tracing_subscriber::layer::Context;

/// A [`tracing-subscriber`]-compliant [`Layer`] implementation that will encode [`Event`]s as
/// GELF documents & pass them to a [`Transport`].
///
/// [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
pub struct Layer<S, F: TracingFormatter<S>, T: Transport>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    encoder: GelfEncoder,
    tracing_formatter: F,
    transport: T,
    // I need the Subscriber implementation type as a type parameter to transmit it to the
    // TracingFormatter trait. 👇 gets the compiler to shut-up about unused type parameters.
    subscriber_type: std::marker::PhantomData<S>,
}

/// A [`Layer`] implementation with the following characteristics:
///
/// - Uses the default formatter for mapping from Tracing events to log events
/// - Uses the inline exception policy
/// - Writes the resulting documents, one per line, to stdout
///
/// May be used with any [`tracing_subscriber::Subscriber`] implementation that supports
/// [`LookupSpan`].
///
/// [`tracing_subscriber::Subscriber`]: https://docs.rs/tracing/latest/tracing/trait.Subscriber.html
/// [`LookupSpan`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/registry/trait.LookupSpan.html
impl<S> Layer<S, DefaultTracingFormatter, WriterTransport<std::io::Stdout>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    pub fn stdout() -> Self {
        Layer::with_transport(WriterTransport::stdout())
    }
}

impl<S, T: Transport> Layer<S, DefaultTracingFormatter, T>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    /// Construct a Layer that will hand documents to `transport`, with default encoding
    pub fn with_transport(transport: T) -> Self {
        Layer::new(
            GelfEncoder::default(),
            DefaultTracingFormatter::default(),
            transport,
        )
    }

    /// Construct a Layer that will hand documents encoded by `encoder` to `transport`
    pub fn with_transport_and_encoder(transport: T, encoder: GelfEncoder) -> Self {
        Layer::new(encoder, DefaultTracingFormatter::default(), transport)
    }
}

impl<S, F: TracingFormatter<S>, T: Transport> Layer<S, F, T>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    /// construct Layer with custom inners
    pub fn new(encoder: GelfEncoder, tracing_formatter: F, transport: T) -> Self {
        Layer {
            encoder,
            tracing_formatter,
            transport,
            subscriber_type: std::marker::PhantomData,
        }
    }

    fn handle_event(&self, event: &Event<'_>, ctx: Context<'_, S>) -> Result<()> {
        let log_event = match self.tracing_formatter.on_event(event, ctx) {
            Ok(Some(log_event)) => log_event,
            Ok(None) => return Ok(()),
            Err(err) => {
                return Err(Error::Format {
                    source: Box::new(err),
                    back: Backtrace::new(),
                })
            }
        };
        let buf = self.encoder.encode(&log_event).to_bytes()?;
        self.transport.send(&buf).map(|_| ())
    }
}

/// This is the Big Tuna-- the [`Layer`] implementation.
///
/// A failure at any stage is reported & then dropped: a broken formatter or transport must not
/// be able to break the application's logging overall.
///
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
impl<S, F, T> tracing_subscriber::layer::Layer<S> for Layer<S, F, T>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    F: TracingFormatter<S> + 'static,
    T: Transport + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.handle_event(event, ctx).unwrap_or_else(|err| {
            ::tracing::error!("tracing-gelf failed: {}", err);
        })
    }
}
