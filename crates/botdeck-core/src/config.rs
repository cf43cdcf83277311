use std::{env, path::PathBuf, time::Duration};

/// Runtime configuration, read once from the environment at startup.
///
/// The bot token itself is NOT configured here: it is operator-entered state
/// that lives in the persisted aggregate.
#[derive(Clone, Debug)]
pub struct Config {
    /// Where the serialized aggregate lives.
    pub state_file: PathBuf,
    /// Telegram API base, overridable for tests and proxies.
    pub api_base: String,
    /// Transport-level timeout; the core enforces none of its own.
    pub http_timeout: Duration,
}

impl Config {
    pub fn load() -> Self {
        let state_file = env_path("BOTDECK_STATE_FILE")
            .unwrap_or_else(|| PathBuf::from("botdeck-state.json"));
        let api_base = env_str("BOTDECK_API_BASE")
            .unwrap_or_else(|| "https://api.telegram.org".to_string());
        let http_timeout = Duration::from_secs(env_u64("BOTDECK_HTTP_TIMEOUT_SECS").unwrap_or(10));
        Self {
            state_file,
            api_base,
            http_timeout,
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}
