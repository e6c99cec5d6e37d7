use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use tracing::{info, warn};

use crate::placement::{PlacementConfig, ZoneOverlapMode};

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub placement: PlacementSettings,
    pub reset: ResetSettings,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            placement: PlacementSettings::from_env(),
            reset: ResetSettings::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
    docs_enabled: bool,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "TABLETOP_TASKS_API_HOST";
    const PORT_VAR: &'static str = "TABLETOP_TASKS_API_PORT";
    const DOCS_VAR: &'static str = "TABLETOP_TASKS_ENABLE_DOCS";

    fn from_env() -> Self {
        let host_value =
            env_string(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    var = Self::HOST_VAR,
                    value = %host_value,
                    error = %err,
                    "could not parse host, using {}",
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = load_with_warning(
            Self::PORT_VAR,
            Self::DEFAULT_PORT,
            |value: u16| value != 0,
            "must not be 0",
        );

        let docs_enabled = env_string(Self::DOCS_VAR)
            .and_then(|raw| parse_bool(&raw, Self::DOCS_VAR))
            .unwrap_or(true);

        Self {
            bind_ip,
            display_host,
            port,
            docs_enabled,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether `/docs` and the OpenAPI document are served.
    pub fn docs_enabled(&self) -> bool {
        self.docs_enabled
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

/// Configuration of the zone placer.
#[derive(Clone, Debug)]
pub struct PlacementSettings {
    placement: PlacementConfig,
}

impl PlacementSettings {
    const MAX_ATTEMPTS_VAR: &'static str = "TABLETOP_TASKS_MAX_ZONE_ATTEMPTS";
    const OVERLAP_VAR: &'static str = "TABLETOP_TASKS_ZONE_OVERLAP";

    fn from_env() -> Self {
        let max_attempts = load_with_warning(
            Self::MAX_ATTEMPTS_VAR,
            PlacementConfig::DEFAULT_MAX_ATTEMPTS,
            |value: usize| value > 0,
            "must be greater than 0",
        );
        if max_attempts != PlacementConfig::DEFAULT_MAX_ATTEMPTS {
            info!(max_attempts, "using custom zone placement budget");
        }

        let overlap_mode = load_with_warning(
            Self::OVERLAP_VAR,
            ZoneOverlapMode::default(),
            |_| true,
            "must be 'center' or 'footprint'",
        );
        if overlap_mode != ZoneOverlapMode::default() {
            info!(mode = overlap_mode.as_str(), "using custom zone overlap test");
        }

        Self {
            placement: PlacementConfig::builder()
                .max_attempts(max_attempts)
                .overlap_mode(overlap_mode)
                .build(),
        }
    }

    /// Returns the configured PlacementConfig.
    pub fn placement_config(&self) -> PlacementConfig {
        self.placement
    }
}

/// Defaults for task resets.
#[derive(Clone, Debug, Default)]
pub struct ResetSettings {
    default_seed: Option<u64>,
}

impl ResetSettings {
    const SEED_VAR: &'static str = "TABLETOP_TASKS_DEFAULT_SEED";

    fn from_env() -> Self {
        let default_seed = env_string(Self::SEED_VAR).and_then(|raw| match raw.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(err) => {
                warn!(
                    var = Self::SEED_VAR,
                    value = %raw,
                    error = %err,
                    "could not parse seed, resets draw random seeds"
                );
                None
            }
        });
        Self { default_seed }
    }

    pub fn new(default_seed: Option<u64>) -> Self {
        Self { default_seed }
    }

    /// Seed for resets that do not request one; `None` draws from OS entropy.
    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(var = name, error = %err, "could not read variable, using default value");
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                var = var_name,
                value = other,
                "could not interpret value as boolean, using default value"
            );
            None
        }
    }
}

fn load_with_warning<T>(
    var_name: &str,
    default: T,
    validator: impl Fn(T) -> bool,
    invalid_hint: &str,
) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
    T::Err: Display,
{
    match env_string(var_name) {
        Some(raw) => parse_or_default(var_name, &raw, default, validator, invalid_hint),
        None => default,
    }
}

/// Parses `raw`, falling back to `default` with a warning when parsing or
/// validation fails.
fn parse_or_default<T>(
    var_name: &str,
    raw: &str,
    default: T,
    validator: impl Fn(T) -> bool,
    invalid_hint: &str,
) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
    T::Err: Display,
{
    match raw.parse::<T>() {
        Ok(value) if validator(value) => value,
        Ok(_) => {
            warn!(
                var = var_name,
                value = raw,
                "invalid value: {}, using {:?}",
                invalid_hint,
                default
            );
            default
        }
        Err(err) => {
            warn!(
                var = var_name,
                value = raw,
                error = %err,
                "could not parse value, using {:?}",
                default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_true_values() {
        assert_eq!(parse_bool("1", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("true", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("yes", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("y", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("on", "TEST_VAR"), Some(true));

        // Test case insensitivity
        assert_eq!(parse_bool("TRUE", "TEST_VAR"), Some(true));
        assert_eq!(parse_bool("ON", "TEST_VAR"), Some(true));

        // Test with whitespace
        assert_eq!(parse_bool(" true ", "TEST_VAR"), Some(true));
    }

    #[test]
    fn test_parse_bool_false_values() {
        assert_eq!(parse_bool("0", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("false", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("no", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("n", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool("off", "TEST_VAR"), Some(false));
        assert_eq!(parse_bool(" OFF ", "TEST_VAR"), Some(false));
    }

    #[test]
    fn test_parse_bool_invalid_values() {
        assert_eq!(parse_bool("invalid", "TEST_VAR"), None);
        assert_eq!(parse_bool("2", "TEST_VAR"), None);
        assert_eq!(parse_bool("", "TEST_VAR"), None);
    }

    #[test]
    fn test_attempt_budget_rejects_zero_and_garbage() {
        let positive = |value: usize| value > 0;
        assert_eq!(parse_or_default("TEST_VAR", "250", 100, positive, "> 0"), 250);
        assert_eq!(parse_or_default("TEST_VAR", "0", 100, positive, "> 0"), 100);
        assert_eq!(parse_or_default("TEST_VAR", "-3", 100, positive, "> 0"), 100);
        assert_eq!(parse_or_default("TEST_VAR", "many", 100, positive, "> 0"), 100);
    }

    #[test]
    fn test_overlap_mode_falls_back_to_center() {
        let any = |_: ZoneOverlapMode| true;
        assert_eq!(
            parse_or_default("TEST_VAR", "footprint", ZoneOverlapMode::CenterPoint, any, ""),
            ZoneOverlapMode::Footprint
        );
        assert_eq!(
            parse_or_default("TEST_VAR", "corners", ZoneOverlapMode::CenterPoint, any, ""),
            ZoneOverlapMode::CenterPoint
        );
    }

    #[test]
    fn test_missing_variables_use_defaults() {
        assert_eq!(
            load_with_warning("TABLETOP_TASKS_TEST_UNSET_VAR", 7u16, |_| true, ""),
            7
        );
        assert_eq!(env_string("TABLETOP_TASKS_TEST_UNSET_VAR"), None);
    }
}
