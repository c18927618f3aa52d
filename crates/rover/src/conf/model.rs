//! Model — RoverConfig and related structs.

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::flock::FlockingWeights;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverConfig {
    /// Name broadcast with this rover's pose; host name when unset.
    pub identity: Option<String>,
    pub fleet_size: usize,
    pub tick_interval_ms: u64,
    pub status_interval_secs: u64,
    pub kill_switch_timeout_secs: u64,
    pub flocking: FlockingConfig,
    pub control: ControlConfig,
    pub link: LinkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockingConfig {
    pub interaction_radius: f64,
    pub separation_distance: f64,
    pub separation_weight: f64,
    pub cohesion_weight: f64,
    pub alignment_weight: f64,
}

/// Gains for the heading controller and the actuation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub k_p: f64,
    pub cruise_speed: f64,
    pub linear_scale: f64,
    pub angular_scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub bind_address: String,
    pub publish_address: String,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            identity: None,
            fleet_size: 6,
            tick_interval_ms: 100,
            status_interval_secs: 5,
            kill_switch_timeout_secs: 10,
            flocking: FlockingConfig::default(),
            control: ControlConfig::default(),
            link: LinkConfig::default(),
        }
    }
}

impl Default for FlockingConfig {
    fn default() -> Self {
        let weights = FlockingWeights::default();
        Self {
            interaction_radius: 2.0,
            separation_distance: weights.separation_distance,
            separation_weight: weights.separation_weight,
            cohesion_weight: weights.cohesion_weight,
            alignment_weight: weights.alignment_weight,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            k_p: 0.1,
            cruise_speed: 0.05,
            linear_scale: 1.5,
            angular_scale: 8.0,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:47100".to_string(),
            publish_address: "255.255.255.255:47100".to_string(),
        }
    }
}

impl RoverConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    pub fn kill_switch_timeout(&self) -> Duration {
        Duration::from_secs(self.kill_switch_timeout_secs)
    }
}

impl FlockingConfig {
    pub fn weights(&self) -> FlockingWeights {
        FlockingWeights {
            separation_distance: self.separation_distance,
            separation_weight: self.separation_weight,
            cohesion_weight: self.cohesion_weight,
            alignment_weight: self.alignment_weight,
        }
    }

    /// Validate radii and weights
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("flocking.interaction_radius", self.interaction_radius),
            ("flocking.separation_distance", self.separation_distance),
            ("flocking.separation_weight", self.separation_weight),
            ("flocking.cohesion_weight", self.cohesion_weight),
            ("flocking.alignment_weight", self.alignment_weight),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        if self.separation_distance > self.interaction_radius {
            return Err(format!(
                "flocking.separation_distance ({}) must not exceed flocking.interaction_radius ({})",
                self.separation_distance, self.interaction_radius
            ));
        }
        Ok(())
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.k_p.is_finite() {
            return Err("control.k_p must be finite".to_string());
        }
        if !self.cruise_speed.is_finite() || self.cruise_speed < 0.0 {
            return Err("control.cruise_speed must be >= 0 (forward only)".to_string());
        }
        if !self.linear_scale.is_finite() || !self.angular_scale.is_finite() {
            return Err("control.linear_scale and control.angular_scale must be finite".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ─────────────────────────────────────────────────

    #[test]
    fn test_rover_config_defaults() {
        let cfg = RoverConfig::default();
        assert!(cfg.identity.is_none());
        assert_eq!(cfg.fleet_size, 6);
        assert_eq!(cfg.tick_interval(), Duration::from_millis(100));
        assert_eq!(cfg.status_interval(), Duration::from_secs(5));
        assert_eq!(cfg.kill_switch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_flocking_defaults_match_weights() {
        let cfg = FlockingConfig::default();
        assert_eq!(cfg.interaction_radius, 2.0);
        assert_eq!(cfg.weights(), FlockingWeights::default());
    }

    #[test]
    fn test_control_defaults() {
        let cfg = ControlConfig::default();
        assert_eq!(cfg.k_p, 0.1);
        assert_eq!(cfg.cruise_speed, 0.05);
        assert_eq!(cfg.linear_scale, 1.5);
        assert_eq!(cfg.angular_scale, 8.0);
    }

    // ── Validation ───────────────────────────────────────────────

    #[test]
    fn test_flocking_validate_rejects_negative_weight() {
        let cfg = FlockingConfig { cohesion_weight: -0.1, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("cohesion_weight"), "Error should mention cohesion_weight: {}", err);
    }

    #[test]
    fn test_flocking_validate_rejects_separation_beyond_interaction() {
        let cfg = FlockingConfig { separation_distance: 3.0, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("separation_distance"));
    }

    #[test]
    fn test_control_validate_rejects_reverse_cruise() {
        let cfg = ControlConfig { cruise_speed: -0.05, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    // ── Serialization ────────────────────────────────────────────

    #[test]
    fn test_deserialize_partial_toml() {
        let toml_str = r#"
            identity = "rover_03"
            fleet_size = 3

            [flocking]
            cohesion_weight = 0.25
        "#;
        let cfg: RoverConfig = toml::from_str(toml_str).expect("Should accept partial TOML");
        assert_eq!(cfg.identity.as_deref(), Some("rover_03"));
        assert_eq!(cfg.fleet_size, 3);
        assert_eq!(cfg.flocking.cohesion_weight, 0.25);
        assert_eq!(cfg.flocking.separation_weight, 0.5); // default
        assert_eq!(cfg.kill_switch_timeout_secs, 10); // default
    }

    #[test]
    fn test_config_toml_round_trip() {
        let cfg = RoverConfig { identity: Some("alpha".to_string()), ..Default::default() };
        let toml_str = toml::to_string(&cfg).expect("Should serialize to TOML");
        let back: RoverConfig = toml::from_str(&toml_str).expect("Should deserialize from TOML");
        assert_eq!(back.identity, cfg.identity);
        assert_eq!(back.link.publish_address, cfg.link.publish_address);
        assert_eq!(back.control.angular_scale, cfg.control.angular_scale);
    }
}
