//! Boot — logging init, config load, identity resolution, link binding.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{host_identity, RoverConfig};
use crate::control::Controller;
use crate::link::{Message, UdpLink};

/// Inbound messages buffered between the link receiver and the control loop.
pub const INBOUND_CAPACITY: usize = 256;

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rover=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Everything the control loop needs, ready to run.
pub struct Booted {
    pub config: RoverConfig,
    pub controller: Controller,
    pub link: Arc<UdpLink>,
    pub inbound: mpsc::Receiver<Message>,
}

/// Pick the identity: command-line argument, then config, then host name.
pub fn resolve_identity(arg: Option<String>, config: &RoverConfig) -> String {
    match arg.or_else(|| config.identity.clone()) {
        Some(identity) => {
            info!("Welcome to the world of tomorrow {}! Mobility module started.", identity);
            identity
        }
        None => {
            let identity = host_identity();
            info!("No name selected. Default is: {}", identity);
            identity
        }
    }
}

/// Load and validate config, resolve this rover's identity, bind the link
/// and start its receive task.
pub async fn boot(identity_arg: Option<String>) -> Result<Booted, Box<dyn std::error::Error>> {
    info!("Starting rover mobility controller v{}", env!("CARGO_PKG_VERSION"));

    let mut config = RoverConfig::load()?;
    let identity = resolve_identity(identity_arg, &config);
    config.identity = Some(identity.clone());

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!(
        "Fleet size {}, interaction radius {}, tick {}ms, kill switch {}s",
        config.fleet_size,
        config.flocking.interaction_radius,
        config.tick_interval_ms,
        config.kill_switch_timeout_secs
    );
    info!(
        "Flocking weights: separation={} (within {}), cohesion={}, alignment={}",
        config.flocking.separation_weight,
        config.flocking.separation_distance,
        config.flocking.cohesion_weight,
        config.flocking.alignment_weight
    );

    let link = UdpLink::bind(&config.link).await.map_err(|e| {
        error!("Failed to bind link on {}: {}", config.link.bind_address, e);
        e
    })?;
    info!(
        "Link bound on {}, publishing to {}",
        link.local_addr()?, config.link.publish_address
    );

    let (tx, inbound) = mpsc::channel(INBOUND_CAPACITY);
    link.spawn_receiver(tx);

    let controller = Controller::new(identity, &config);

    Ok(Booted {
        config,
        controller,
        link: Arc::new(link),
        inbound,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_wins_over_config() {
        let config = RoverConfig { identity: Some("from_config".to_string()), ..Default::default() };
        assert_eq!(resolve_identity(Some("from_arg".to_string()), &config), "from_arg");
    }

    #[test]
    fn test_config_identity_used_without_argument() {
        let config = RoverConfig { identity: Some("from_config".to_string()), ..Default::default() };
        assert_eq!(resolve_identity(None, &config), "from_config");
    }

    #[test]
    fn test_falls_back_to_host_name() {
        let config = RoverConfig::default();
        assert_eq!(resolve_identity(None, &config), host_identity());
    }
}
