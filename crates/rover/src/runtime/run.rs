//! Run — the single control task.
//!
//! Inbound messages, the control tick, the liveness tick and the kill-switch
//! deadline are all multiplexed in one `select!`, so the controller is only
//! ever touched from here.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::conf::RoverConfig;
use crate::control::Controller;
use crate::link::{Link, Message};

/// Drive `controller` until `shutdown` resolves, then publish a final stop.
pub async fn run<F>(
    mut controller: Controller,
    link: &dyn Link,
    mut inbound: mpsc::Receiver<Message>,
    config: &RoverConfig,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    let mut tick = interval(config.tick_interval());
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut status = interval(config.status_interval());
    status.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::pin!(shutdown);
    let mut inbound_open = true;

    info!(
        rover = controller.identity(),
        "Control loop running (tick {:?}, status {:?})",
        config.tick_interval(),
        config.status_interval()
    );

    loop {
        let deadline = controller.watchdog_deadline();

        let outgoing: Vec<Message> = tokio::select! {
            biased;

            _ = &mut shutdown => break,

            // the kill switch outranks inbound traffic
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                controller.expire_watchdog(Instant::now()).into_iter().collect()
            }

            received = inbound.recv(), if inbound_open => match received {
                Some(message) => {
                    debug!(kind = message.kind(), "Inbound message");
                    controller.handle(message, Instant::now())
                }
                None => {
                    warn!("Inbound channel closed, continuing without peer input");
                    inbound_open = false;
                    Vec::new()
                }
            },

            _ = tick.tick() => controller.tick(Instant::now()),

            _ = status.tick() => controller.status(),
        };

        publish_all(link, &outgoing).await;
    }

    info!(
        transitions_to_auto = controller.transitions_to_auto(),
        first_autonomous_at = ?controller.first_autonomous_at(),
        "Control loop stopping"
    );
    publish_all(link, &[controller.stop()]).await;
}

/// Publish in order. Failures are logged and the message dropped.
async fn publish_all(link: &dyn Link, messages: &[Message]) {
    for message in messages {
        if let Err(e) = link.publish(message).await {
            warn!("Failed to publish {} message: {}", message.kind(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    use crate::link::FakeLink;

    fn config() -> RoverConfig {
        RoverConfig { identity: Some("alpha".to_string()), ..RoverConfig::default() }
    }

    fn controller(config: &RoverConfig) -> Controller {
        Controller::new("alpha".to_string(), config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_kill_switch_fires_once_then_final_stop() {
        let config = config();
        let link = FakeLink::new();
        let (tx, rx) = mpsc::channel(16);

        tx.send(Message::Mode { rover: "alpha".to_string(), mode: 0 }).await.unwrap();
        tx.send(Message::Joystick { rover: "alpha".to_string(), linear: 0.2, angular: 0.1 })
            .await
            .unwrap();

        run(controller(&config), &link, rx, &config, sleep(Duration::from_secs(25))).await;

        let velocities = link.velocities().await;
        assert_eq!(velocities.len(), 4, "got {:?}", velocities);
        assert_eq!(velocities[0], (0.0, 0.0));
        assert!((velocities[1].0 - 0.3).abs() < 1e-12);
        assert!((velocities[1].1 - 0.8).abs() < 1e-12);
        // one kill-switch stop, then the shutdown stop
        assert_eq!(velocities[2], (0.0, 0.0));
        assert_eq!(velocities[3], (0.0, 0.0));
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_kill_switch_fires_before_inbound_at_deadline() {
        let config = config();
        let link = FakeLink::new();
        let (tx, rx) = mpsc::channel(16);

        tx.send(Message::Joystick { rover: "alpha".to_string(), linear: 0.2, angular: 0.1 })
            .await
            .unwrap();

        // a fresh joystick command lands exactly on the kill-switch deadline
        let late = tx.clone();
        let sender = tokio::spawn(async move {
            sleep(config_timeout()).await;
            late.send(Message::Joystick { rover: "alpha".to_string(), linear: 0.2, angular: 0.1 })
                .await
                .unwrap();
        });

        run(controller(&config), &link, rx, &config, sleep(Duration::from_secs(15))).await;
        sender.await.unwrap();

        let velocities = link.velocities().await;
        assert_eq!(velocities.len(), 4, "got {:?}", velocities);
        assert_eq!(velocities[1], (0.0, 0.0), "stop must precede the late command");
        assert!((velocities[2].0 - 0.3).abs() < 1e-12);
        assert_eq!(velocities[3], (0.0, 0.0));
        drop(tx);
    }

    fn config_timeout() -> Duration {
        RoverConfig::default().kill_switch_timeout()
    }

    #[tokio::test(start_paused = true)]
    async fn test_autonomous_ticks_keep_watchdog_fed() {
        let config = config();
        let link = FakeLink::new();
        let (tx, rx) = mpsc::channel(16);

        tx.send(Message::Mode { rover: "alpha".to_string(), mode: 2 }).await.unwrap();

        run(controller(&config), &link, rx, &config, sleep(Duration::from_secs(30))).await;

        let velocities = link.velocities().await;
        let (first, rest) = velocities.split_first().unwrap();
        let (last, cruising) = rest.split_last().unwrap();
        assert_eq!(*first, (0.0, 0.0));
        assert_eq!(*last, (0.0, 0.0));
        assert!(cruising.len() > 200);
        for (linear, angular) in cruising {
            assert!((linear - 0.075).abs() < 1e-12);
            assert_eq!(*angular, 0.0);
        }
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_announces_then_reports_online() {
        let config = config();
        let link = FakeLink::new();
        let (tx, rx) = mpsc::channel(16);

        // intervals fire at 0, 5, 10 and 15 seconds
        run(controller(&config), &link, rx, &config, sleep(Duration::from_millis(15_050))).await;

        assert_eq!(link.count_kind("announce").await, 1);
        assert_eq!(link.count_kind("status").await, 4);
        assert!(link.count_kind("pose").await > 100);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_failures_do_not_stop_the_loop() {
        let config = config();
        let link = FakeLink::new();
        link.set_failing(true);
        let (tx, rx) = mpsc::channel(16);

        tx.send(Message::Mode { rover: "alpha".to_string(), mode: 2 }).await.unwrap();
        run(controller(&config), &link, rx, &config, sleep(Duration::from_secs(2))).await;

        assert!(link.published().await.is_empty());
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_inbound_channel_keeps_ticking() {
        let config = config();
        let link = FakeLink::new();
        let (tx, rx) = mpsc::channel(16);
        drop(tx);

        run(controller(&config), &link, rx, &config, sleep(Duration::from_secs(1))).await;

        assert!(link.count_kind("state_machine").await >= 10);
        // only the shutdown stop
        assert_eq!(link.velocities().await, vec![(0.0, 0.0)]);
    }
}
