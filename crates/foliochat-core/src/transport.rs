//! Transport traits for the two exchange modes.
//!
//! The stream transport's item type encodes the failure asymmetry the
//! controller depends on: server-classified errors arrive as ordinary
//! [`StreamEvent::Error`] items and never trigger the fallback, while
//! network-level faults (and cooperative cancellation) surface as
//! [`TransportFault`] stream errors.

use std::pin::Pin;

use futures_util::Stream;
use tokio_util::sync::CancellationToken;

use foliochat_types::error::{ChatError, TransportFault};
use foliochat_types::event::{StreamEvent, SyncReply, TurnRequest};

/// Lazy, ordered sequence of decoded events for one streaming exchange.
pub type EventStream =
    Pin<Box<dyn Stream<Item = Result<StreamEvent, TransportFault>> + Send + 'static>>;

/// Opens one streaming exchange per turn.
pub trait StreamTransport: Send + Sync {
    /// Open the exchange and return its decoded event sequence.
    ///
    /// The stream ends naturally on clean end-of-body. Triggering
    /// `cancel` aborts the underlying read and yields
    /// [`TransportFault::Cancelled`].
    fn open(&self, request: TurnRequest, cancel: CancellationToken) -> EventStream;
}

/// Single-shot fallback exchange, used only after a stream-level fault.
pub trait SyncTransport: Send + Sync {
    /// Issue one bounded request and return the complete reply.
    fn send(
        &self,
        request: TurnRequest,
    ) -> impl std::future::Future<Output = Result<SyncReply, ChatError>> + Send;
}
