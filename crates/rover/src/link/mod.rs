//! Link — abstract interface to the transport collaborator.
//!
//! The controller only ever publishes through [`Link`]; inbound traffic
//! arrives on an mpsc channel fed by the link's receive task.
//! `udp.rs` provides the datagram implementation, `fake.rs` a test double.

pub mod message;
pub mod udp;
pub mod fake;

pub use message::Message;
pub use udp::UdpLink;
pub use fake::FakeLink;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Link closed")]
    Closed,
}

/// Outbound side of the transport.
///
/// Object-safe thanks to the `Pin<Box<…>>` return, so the runtime can hold an
/// `Arc<dyn Link>`.
pub trait Link: Send + Sync {
    fn publish<'a>(
        &'a self,
        message: &'a Message,
    ) -> Pin<Box<dyn Future<Output = Result<(), LinkError>> + Send + 'a>>;
}
