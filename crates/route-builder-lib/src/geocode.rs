//! Forward geocoding seam
//!
//! The map never talks to a geocoding service directly. It asks a
//! [`Geocoder`] for a [`PendingLookup`] and polls it from the UI loop until
//! the lookup settles with a [`GeocodeResult`].

use crate::geometry::GeoPoint;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Reasons a lookup can fail
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("service responded with status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("lookup dropped before it settled")]
    Cancelled,
}

/// `Ok(Some)` when a place matched, `Ok(None)` when nothing did
pub type GeocodeResult = Result<Option<GeoPoint>, GeocodeError>;

/// Resolves free-text place names to coordinates
pub trait Geocoder {
    /// Start resolving `query`. The returned handle settles exactly once.
    fn lookup(&self, query: &str) -> PendingLookup;
}

/// Handle to a lookup that may still be running
#[derive(Debug)]
pub struct PendingLookup {
    receiver: oneshot::Receiver<GeocodeResult>,
}

/// Sending half of a [`PendingLookup`], held by whoever runs the request
#[derive(Debug)]
pub struct LookupResolver {
    sender: oneshot::Sender<GeocodeResult>,
}

impl PendingLookup {
    pub fn channel() -> (LookupResolver, Self) {
        let (sender, receiver) = oneshot::channel();
        (LookupResolver { sender }, Self { receiver })
    }

    /// A lookup that has already settled
    pub fn ready(result: GeocodeResult) -> Self {
        let (resolver, pending) = Self::channel();
        resolver.resolve(result);
        pending
    }

    /// Take the result if the lookup has settled.
    ///
    /// Returns `None` while the request is still running. A resolver that was
    /// dropped without answering settles as [`GeocodeError::Cancelled`].
    pub fn try_take(&mut self) -> Option<GeocodeResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(GeocodeError::Cancelled)),
        }
    }
}

impl LookupResolver {
    pub fn resolve(self, result: GeocodeResult) {
        if self.sender.send(result).is_err() {
            tracing::debug!("Lookup result discarded, nobody is waiting for it");
        }
    }
}
