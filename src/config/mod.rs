use serde::Deserialize;
use std::env;

// Container for all client settings, loaded from the environment once at
// startup and carried inside the SyncContext.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub ws: WsConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub session_id: String,
    pub rust_log: String,
}

// Streaming channel settings: address, heartbeat cadence, reconnect policy.
#[derive(Debug, Clone, Deserialize)]
pub struct WsConfig {
    pub url: String,
    pub heartbeat_interval_secs: u64,
    pub reconnect_delay_secs: u64,
    pub max_reconnect_attempts: u32,
    pub connect_timeout_secs: u64,
}

// REST backend settings (snapshot + seat commit actions).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                session_id: env::var("SESSION_ID").unwrap_or_else(|_| "default".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "seat_sync=debug".to_string()),
            },
            ws: WsConfig {
                url: env::var("WS_URL").unwrap_or_else(|_| "ws://localhost:8080/ws".to_string()),
                heartbeat_interval_secs: env::var("WS_HEARTBEAT_INTERVAL_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("WS_HEARTBEAT_INTERVAL_SECS must be a valid number"),
                reconnect_delay_secs: env::var("WS_RECONNECT_DELAY_SECS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .expect("WS_RECONNECT_DELAY_SECS must be a valid number"),
                max_reconnect_attempts: env::var("WS_MAX_RECONNECT_ATTEMPTS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("WS_MAX_RECONNECT_ATTEMPTS must be a valid number"),
                connect_timeout_secs: env::var("WS_CONNECT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .expect("WS_CONNECT_TIMEOUT_SECS must be a valid number"),
            },
            api: ApiConfig {
                base_url: env::var("API_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
                request_timeout_secs: env::var("API_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("API_TIMEOUT_SECS must be a valid number"),
            },
        }
    }
}
