//! Bridge runtime configuration structures and loaders.
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How decisions are answered when nobody calls a tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BridgeMode {
    /// Decisions wait for the agent. Mana payments with an obvious source
    /// are still settled on arrival when `auto_pay_mana` is set.
    #[default]
    Manual,
    /// Every decision is answered with its default after a short delay.
    Autopilot,
}

/// Default timeouts for the blocking operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeouts {
    pub wait: Duration,
    pub pass: Duration,
    pub drain: Duration,
    pub drain_min_chars: usize,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(15_000),
            pass: Duration::from_millis(30_000),
            drain: Duration::from_millis(10_000),
            drain_min_chars: 50,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    pub mode: BridgeMode,
    pub auto_pay_mana: bool,
    pub autopilot_delay: Duration,
    pub event_buffer: usize,
    pub timeouts: Timeouts,
    pub player_name: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mode: BridgeMode::Manual,
            auto_pay_mana: true,
            autopilot_delay: Duration::from_millis(500),
            event_buffer: 64,
            timeouts: Timeouts::default(),
            player_name: None,
        }
    }
}

impl BridgeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BRIDGE_MODE` - `manual` or `autopilot` (default: manual)
    /// - `BRIDGE_AUTO_PAY_MANA` - Settle obvious mana payments on arrival (default: true)
    /// - `BRIDGE_AUTOPILOT_DELAY_MS` - Delay before autopilot answers (default: 500)
    /// - `BRIDGE_EVENT_BUFFER` - Ingest channel capacity (default: 64)
    /// - `BRIDGE_WAIT_TIMEOUT_MS` - Default for wait_for_next (default: 15000)
    /// - `BRIDGE_PASS_TIMEOUT_MS` - Default for pass_priority (default: 30000)
    /// - `BRIDGE_DRAIN_TIMEOUT_MS` - Default for drain_until_event (default: 10000)
    /// - `BRIDGE_DRAIN_MIN_CHARS` - Default log growth for drain_until_event (default: 50)
    /// - `BRIDGE_PLAYER_NAME` - Display name of the bridge player (optional)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(mode) = read_env::<BridgeMode>("BRIDGE_MODE") {
            config.mode = mode;
        }
        if let Some(enable) = read_env_bool("BRIDGE_AUTO_PAY_MANA") {
            config.auto_pay_mana = enable;
        }
        if let Some(ms) = read_env::<u64>("BRIDGE_AUTOPILOT_DELAY_MS") {
            config.autopilot_delay = Duration::from_millis(ms);
        }
        if let Some(capacity) = read_env::<usize>("BRIDGE_EVENT_BUFFER") {
            config.event_buffer = capacity.max(1);
        }
        if let Some(ms) = read_env::<u64>("BRIDGE_WAIT_TIMEOUT_MS") {
            config.timeouts.wait = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("BRIDGE_PASS_TIMEOUT_MS") {
            config.timeouts.pass = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("BRIDGE_DRAIN_TIMEOUT_MS") {
            config.timeouts.drain = Duration::from_millis(ms);
        }
        if let Some(chars) = read_env::<usize>("BRIDGE_DRAIN_MIN_CHARS") {
            config.timeouts.drain_min_chars = chars;
        }
        config.player_name = env::var("BRIDGE_PLAYER_NAME").ok();

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}

/// Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
fn read_env_bool(key: &str) -> Option<bool> {
    parse_bool(&env::var(key).ok()?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tool_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.mode, BridgeMode::Manual);
        assert_eq!(config.timeouts.wait, Duration::from_secs(15));
        assert_eq!(config.timeouts.pass, Duration::from_secs(30));
        assert_eq!(config.timeouts.drain, Duration::from_secs(10));
        assert_eq!(config.timeouts.drain_min_chars, 50);
    }

    #[test]
    fn test_mode_parses_case_insensitively() {
        assert_eq!("AutoPilot".parse::<BridgeMode>().ok(), Some(BridgeMode::Autopilot));
        assert!("turbo".parse::<BridgeMode>().is_err());
    }

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool(" Yes "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
