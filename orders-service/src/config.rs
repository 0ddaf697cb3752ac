//! Environment configuration for the Orders service.
//!
//! Mirrors `db_pool::env_utils`'s "parse with default, log the resolved
//! value" idiom (§2a); the pool and broker sub-configs are built by their
//! own crates (`DbConfig::for_service`, `BrokerConfig::from_env`) and are
//! not duplicated here.

use broker::BrokerConfig;
use db_pool::env_utils::parse_env_with_default;
use tracing::info;

/// Default outbox dispatcher batch size (§4.2).
pub const DEFAULT_BATCH_SIZE: i32 = 10;
/// Default outbox dispatcher poll interval, seconds (§4.2).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub service_port: u16,
    pub broker: BrokerConfig,
    pub outbox_batch_size: i32,
    pub outbox_poll_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let service_port = parse_env_with_default("SERVICE_PORT", 8080u16);
        let outbox_batch_size = parse_env_with_default("OUTBOX_BATCH_SIZE", DEFAULT_BATCH_SIZE);
        let outbox_poll_interval_secs =
            parse_env_with_default("OUTBOX_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS);

        let config = Self {
            service_port,
            broker: BrokerConfig::from_env(),
            outbox_batch_size,
            outbox_poll_interval_secs,
        };

        info!(
            service_port = config.service_port,
            outbox_batch_size = config.outbox_batch_size,
            outbox_poll_interval_secs = config.outbox_poll_interval_secs,
            "Orders service configuration resolved"
        );

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env_override() {
        std::env::remove_var("SERVICE_PORT");
        std::env::remove_var("OUTBOX_BATCH_SIZE");
        std::env::remove_var("OUTBOX_POLL_INTERVAL_SECS");

        let config = Config::from_env();
        assert_eq!(config.service_port, 8080);
        assert_eq!(config.outbox_batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.outbox_poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
    }
}
