//! UDP — JSON datagrams over a broadcast-capable socket.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::conf::LinkConfig;
use super::{Link, LinkError, Message};

const MAX_DATAGRAM: usize = 64 * 1024;
const RECV_BACKOFF_BASE: Duration = Duration::from_millis(50);
const RECV_BACKOFF_MAX: Duration = Duration::from_secs(5);

/// Pause after `failures` consecutive receive errors: base * 2^(failures-1),
/// capped.
fn receive_backoff(failures: u32) -> Duration {
    RECV_BACKOFF_BASE
        .saturating_mul(1u32 << failures.saturating_sub(1).min(10))
        .min(RECV_BACKOFF_MAX)
}

/// A link that publishes every message to one (usually broadcast) address
/// and receives from the bound socket.
pub struct UdpLink {
    socket: Arc<UdpSocket>,
    publish_to: SocketAddr,
}

impl UdpLink {
    pub async fn bind(config: &LinkConfig) -> Result<Self, LinkError> {
        let publish_to: SocketAddr = config
            .publish_address
            .parse()
            .map_err(|_| LinkError::InvalidAddress(config.publish_address.clone()))?;

        let socket = UdpSocket::bind(&config.bind_address).await?;
        socket.set_broadcast(true)?;

        Ok(Self { socket: Arc::new(socket), publish_to })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, LinkError> {
        Ok(self.socket.local_addr()?)
    }

    /// Spawn the receive task. Datagrams that are not a valid [`Message`]
    /// are dropped; so are messages arriving while the channel is full.
    pub fn spawn_receiver(&self, tx: mpsc::Sender<Message>) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);
        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM];
            let mut failures: u32 = 0;
            loop {
                let (len, from) = match socket.recv_from(&mut buf).await {
                    Ok(received) => {
                        failures = 0;
                        received
                    }
                    Err(e) => {
                        failures = failures.saturating_add(1);
                        let delay = receive_backoff(failures);
                        error!("Link receive failed ({} in a row), retrying in {:?}: {}", failures, delay, e);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                };

                let message = match serde_json::from_slice::<Message>(&buf[..len]) {
                    Ok(message) => message,
                    Err(e) => {
                        debug!(%from, "Dropping undecodable datagram: {}", e);
                        continue;
                    }
                };

                match tx.try_send(message) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(message)) => {
                        warn!(%from, kind = message.kind(), "Inbound queue full, dropping message");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        debug!("Inbound queue closed, stopping link receiver");
                        break;
                    }
                }
            }
        })
    }
}

impl Link for UdpLink {
    fn publish<'a>(
        &'a self,
        message: &'a Message,
    ) -> Pin<Box<dyn Future<Output = Result<(), LinkError>> + Send + 'a>> {
        Box::pin(async move {
            let payload = serde_json::to_vec(message)?;
            self.socket.send_to(&payload, self.publish_to).await?;
            Ok(())
        })
    }
}
