//! Environment configuration for the Notification service.
//!
//! Unlike orders-service/payments-service, this binary has no separate HTTP
//! API surface — the WebSocket endpoint (plus `/health`/`/metrics`) is the
//! whole listener, so it binds `WS_HOST`/`WS_PORT` rather than `SERVICE_PORT`
//! (§6), matching `websocket-service/src/main.cpp`'s
//! `server->run(env_or("WS_HOST", ...), env_or("WS_PORT", ...))`.

use broker::BrokerConfig;
use db_pool::env_utils::parse_env_with_default;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub ws_host: String,
    pub ws_port: u16,
    pub broker: BrokerConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let ws_host = std::env::var("WS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let ws_port = parse_env_with_default("WS_PORT", 8080u16);

        let config = Self {
            ws_host,
            ws_port,
            broker: BrokerConfig::from_env(),
        };

        info!(
            ws_host = %config.ws_host,
            ws_port = config.ws_port,
            "Notification service configuration resolved"
        );

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env_override() {
        std::env::remove_var("WS_HOST");
        std::env::remove_var("WS_PORT");
        let config = Config::from_env();
        assert_eq!(config.ws_host, "0.0.0.0");
        assert_eq!(config.ws_port, 8080);
    }
}
