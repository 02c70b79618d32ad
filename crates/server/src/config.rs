//! Server configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use bridge_runtime::BridgeConfig;

pub const DEFAULT_ENGINE_ADDR: &str = "127.0.0.1:17171";

/// Configuration required to start the bridge server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bridge: BridgeConfig,
    pub engine_addr: String,
    pub card_oracle_path: Option<PathBuf>,
    pub logging: LogConfig,
    pub session_id: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            engine_addr: DEFAULT_ENGINE_ADDR.to_string(),
            card_oracle_path: None,
            logging: LogConfig::default(),
            session_id: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LogConfig {
    /// Also write logs to a per-session file.
    pub file: bool,
    /// Overrides the platform cache directory.
    pub dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables (in addition to the `BRIDGE_*` runtime ones):
    /// - `BRIDGE_ENGINE_ADDR` - Engine link address (default: 127.0.0.1:17171)
    /// - `BRIDGE_CARD_DB` - JSON card file for lookups (optional)
    /// - `BRIDGE_LOG_FILE` - Write a log file as well as stderr (default: false)
    /// - `BRIDGE_LOG_DIR` - Log directory (default: platform-specific)
    /// - `BRIDGE_SESSION_ID` - Session identifier for the log directory (default: timestamp)
    pub fn from_env() -> Self {
        let mut config = Self {
            bridge: BridgeConfig::from_env(),
            ..Self::default()
        };

        if let Ok(addr) = env::var("BRIDGE_ENGINE_ADDR") {
            let addr = addr.trim();
            if !addr.is_empty() {
                config.engine_addr = addr.to_string();
            }
        }

        config.card_oracle_path = env::var("BRIDGE_CARD_DB").ok().map(PathBuf::from);

        if let Some(enable) = read_env::<bool>("BRIDGE_LOG_FILE") {
            config.logging.file = enable;
        } else if env::var("BRIDGE_LOG_FILE").is_ok_and(|v| v.trim() == "1") {
            config.logging.file = true;
        }
        config.logging.dir = env::var("BRIDGE_LOG_DIR").ok().map(PathBuf::from);

        config.session_id = env::var("BRIDGE_SESSION_ID").ok();

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}
