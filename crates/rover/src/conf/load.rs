//! Load — config loading from file and environment variables.

use std::path::Path;
use std::fs::File;
use std::io::Read;

use super::model::RoverConfig;

/// Upper bounds on the timing fields; tokio's clock cannot represent
/// deadlines arbitrarily far in the future.
pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;
pub const MAX_STATUS_INTERVAL_SECS: u64 = 3_600;
pub const MAX_KILL_SWITCH_TIMEOUT_SECS: u64 = 3_600;

impl RoverConfig {
    /// Load configuration from file or defaults, then apply environment overrides.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("ROVER_CONFIG_FILE")
            .unwrap_or_else(|_| "/etc/rover/mobility.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: RoverConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Overlay `ROVER_*` environment variables. Unparseable numbers are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(identity) = std::env::var("ROVER_IDENTITY") {
            self.identity = Some(identity);
        }
        if let Some(size) = std::env::var("ROVER_FLEET_SIZE").ok().and_then(|s| s.parse().ok()) {
            self.fleet_size = size;
        }
        if let Some(secs) = std::env::var("ROVER_KILL_SWITCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.kill_switch_timeout_secs = secs;
        }
        if let Ok(bind) = std::env::var("ROVER_BIND_ADDRESS") {
            self.link.bind_address = bind;
        }
        if let Ok(publish) = std::env::var("ROVER_PUBLISH_ADDRESS") {
            self.link.publish_address = publish;
        }
    }

    /// Validate that configuration values are sane
    pub fn validate(&self) -> Result<(), String> {
        if self.fleet_size == 0 {
            return Err("fleet_size must be > 0".to_string());
        }
        if self.tick_interval_ms == 0 || self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(format!(
                "tick_interval_ms must be between 1 and {}, got {}",
                MAX_TICK_INTERVAL_MS, self.tick_interval_ms
            ));
        }
        if self.status_interval_secs == 0 || self.status_interval_secs > MAX_STATUS_INTERVAL_SECS {
            return Err(format!(
                "status_interval_secs must be between 1 and {}, got {}",
                MAX_STATUS_INTERVAL_SECS, self.status_interval_secs
            ));
        }
        if self.kill_switch_timeout_secs == 0
            || self.kill_switch_timeout_secs > MAX_KILL_SWITCH_TIMEOUT_SECS
        {
            return Err(format!(
                "kill_switch_timeout_secs must be between 1 and {}, got {}",
                MAX_KILL_SWITCH_TIMEOUT_SECS, self.kill_switch_timeout_secs
            ));
        }
        if let Some(identity) = &self.identity {
            validate_identity(identity)?;
        }
        if self.link.bind_address.is_empty() {
            return Err("link.bind_address must not be empty".to_string());
        }
        if self.link.publish_address.is_empty() {
            return Err("link.publish_address must not be empty".to_string());
        }
        self.flocking.validate()?;
        self.control.validate()?;
        Ok(())
    }
}

/// An identity is the first token of a pose broadcast, so it must be
/// non-empty and free of whitespace.
pub fn validate_identity(identity: &str) -> Result<(), String> {
    if identity.is_empty() {
        return Err("identity must not be empty".to_string());
    }
    if identity.chars().any(char::is_whitespace) {
        return Err(format!("identity {:?} must not contain whitespace", identity));
    }
    Ok(())
}

/// Host name used as the identity when none is configured.
pub fn host_identity() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        let name = name.trim().to_string();
        if !name.is_empty() {
            return name;
        }
    }
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "rover".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> RoverConfig {
        RoverConfig { identity: Some("alpha".to_string()), ..RoverConfig::default() }
    }

    #[test]
    fn test_validate_defaults_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_fleet_size() {
        let mut config = valid_config();
        config.fleet_size = 0;
        let result = config.validate();
        assert!(result.unwrap_err().contains("fleet_size"));
    }

    #[test]
    fn test_validate_zero_kill_switch_timeout() {
        let mut config = valid_config();
        config.kill_switch_timeout_secs = 0;
        assert!(config.validate().unwrap_err().contains("kill_switch_timeout"));
    }

    #[test]
    fn test_validate_rejects_oversized_kill_switch_timeout() {
        let mut config = valid_config();
        config.kill_switch_timeout_secs = u64::MAX;
        assert!(config.validate().unwrap_err().contains("kill_switch_timeout_secs"));

        config.kill_switch_timeout_secs = MAX_KILL_SWITCH_TIMEOUT_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_intervals() {
        let mut config = valid_config();
        config.tick_interval_ms = MAX_TICK_INTERVAL_MS + 1;
        assert!(config.validate().unwrap_err().contains("tick_interval_ms"));

        let mut config = valid_config();
        config.status_interval_secs = u64::MAX;
        assert!(config.validate().unwrap_err().contains("status_interval_secs"));
    }

    #[test]
    fn test_validate_identity_with_space() {
        let mut config = valid_config();
        config.identity = Some("rover one".to_string());
        assert!(config.validate().unwrap_err().contains("whitespace"));
    }

    #[test]
    fn test_validate_empty_publish_address() {
        let mut config = valid_config();
        config.link.publish_address = String::new();
        assert!(config.validate().unwrap_err().contains("publish_address"));
    }

    #[test]
    fn test_validate_delegates_to_flocking() {
        let mut config = valid_config();
        config.flocking.interaction_radius = -1.0;
        assert!(config.validate().unwrap_err().contains("interaction_radius"));
    }

    #[test]
    fn test_from_file_reads_toml() {
        let path = std::env::temp_dir().join(format!("rover-conf-{}.toml", std::process::id()));
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "fleet_size = 3\n[control]\nk_p = 0.3").unwrap();
        }
        let config = RoverConfig::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.fleet_size, 3);
        assert_eq!(config.control.k_p, 0.3);
        assert_eq!(config.control.cruise_speed, 0.05);
    }

    #[test]
    fn test_host_identity_not_empty() {
        assert!(!host_identity().is_empty());
    }
}
