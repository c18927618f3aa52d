//! Fake — in-memory test double for the link.
//!
//! [`FakeLink`] records every published message and can be told to fail,
//! which lets the control loop be exercised without sockets.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use super::{Link, LinkError, Message};

#[derive(Default)]
pub struct FakeLink {
    published: Mutex<Vec<Message>>,
    failing: AtomicBool,
}

impl FakeLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail with `LinkError::Closed`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of everything published so far.
    pub async fn published(&self) -> Vec<Message> {
        self.published.lock().await.clone()
    }

    /// Published velocity commands as `(linear, angular)` pairs.
    pub async fn velocities(&self) -> Vec<(f64, f64)> {
        self.published
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                Message::Velocity { linear, angular, .. } => Some((*linear, *angular)),
                _ => None,
            })
            .collect()
    }

    pub async fn count_kind(&self, kind: &str) -> usize {
        self.published.lock().await.iter().filter(|m| m.kind() == kind).count()
    }
}

impl Link for FakeLink {
    fn publish<'a>(
        &'a self,
        message: &'a Message,
    ) -> Pin<Box<dyn Future<Output = Result<(), LinkError>> + Send + 'a>> {
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(LinkError::Closed);
            }
            self.published.lock().await.push(message.clone());
            Ok(())
        })
    }
}
