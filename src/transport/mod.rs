//! Transport layer: the capability every outgoing call goes through.
//!
//! * [`UreqTransport`] performs real network I/O.
//! * An enabled [`crate::InterceptionHook`] installs its own transport into
//!   the [`registry`], which then answers every call without touching the
//!   network.

#[cfg(feature = "metrics")]
pub(crate) mod metrics;
pub mod registry;
pub mod request;
pub mod response;
pub mod ureq_transport;

pub use request::{CallOptions, OutputFile, Request};
pub use response::Response;
pub use ureq_transport::{TransportConfig, UreqTransport};

use crate::Error;
use std::sync::Arc;

/// Trait implemented by anything that can answer a [`Request`].
pub trait Transport: Send + Sync + 'static {
    fn send(&self, req: &Request) -> Result<Response, Error>;

    /// Whether responses come from a handler rather than the network.
    fn intercepts(&self) -> bool {
        false
    }
}

pub type DynTransport = Arc<dyn Transport>;

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, req: &Request) -> Result<Response, Error> {
        (**self).send(req)
    }

    fn intercepts(&self) -> bool {
        (**self).intercepts()
    }
}
