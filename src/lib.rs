//! HTTP interaction recording and replay for tests.
//!
//! Calls made through a [`Handle`] go to the network by default. Enabling an
//! [`InterceptionHook`] reroutes every call to its request handler, which
//! can replay a canned response or forward and record through a
//! [`Recorder`]. The response is then returned, echoed to stdout or written
//! to an output file exactly as a network response would be.

pub mod delivery;
mod error;
pub mod handle;
pub mod handler;
pub mod hook;
pub mod transport;
mod util;

pub use delivery::{Destination, Transfer};
pub use error::{BoxError, Error, ErrorKind, Result, TransportErrorKind};
pub use handle::{Handle, TransferInfo};
pub use handler::{Interaction, Recorder, RequestHandler};
pub use hook::InterceptionHook;
pub use transport::{
    CallOptions, OutputFile, Request, Response, Transport, TransportConfig, UreqTransport,
};
