use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use keybot_api::triage::Trigger;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub static_dir: PathBuf,
    pub db_path: PathBuf,
    pub hipchat_api: String,
    pub trigger: Trigger,
    pub store_timeout: Duration,
    pub notify_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port: u16 = var("KEYBOT_PORT", "7631")
            .parse()
            .context("KEYBOT_PORT must be a port number")?;

        let trigger: Trigger = var("KEYBOT_TRIGGER", "command")
            .parse()
            .map_err(|e: String| anyhow::anyhow!("KEYBOT_TRIGGER: {}", e))?;

        let store_timeout = millis(&var("KEYBOT_STORE_TIMEOUT_MS", "5000"), "KEYBOT_STORE_TIMEOUT_MS")?;
        let notify_timeout = millis(&var("KEYBOT_NOTIFY_TIMEOUT_MS", "10000"), "KEYBOT_NOTIFY_TIMEOUT_MS")?;

        Ok(Self {
            host: var("KEYBOT_HOST", "0.0.0.0"),
            port,
            base_url: var("KEYBOT_BASE_URL", &format!("http://localhost:{}", port)),
            static_dir: var("KEYBOT_STATIC_DIR", "./static").into(),
            db_path: var("KEYBOT_DB_PATH", "keybot.db").into(),
            hipchat_api: var("KEYBOT_HIPCHAT_API", "https://api.hipchat.com/v2"),
            trigger,
            store_timeout,
            notify_timeout,
        })
    }
}

fn millis(raw: &str, name: &str) -> Result<Duration> {
    let ms: u64 = raw
        .parse()
        .with_context(|| format!("{} must be a number of milliseconds", name))?;
    anyhow::ensure!(ms > 0, "{} must be greater than zero", name);
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 7631);
        assert_eq!(cfg.base_url, "http://localhost:7631");
        assert_eq!(cfg.trigger, Trigger::Command);
        assert_eq!(cfg.store_timeout, Duration::from_secs(5));
        assert_eq!(cfg.notify_timeout, Duration::from_secs(10));
        assert_eq!(cfg.db_path, PathBuf::from("keybot.db"));
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("KEYBOT_PORT", "8080"),
            ("KEYBOT_TRIGGER", "phrase"),
            ("KEYBOT_BASE_URL", "https://bot.example.com"),
            ("KEYBOT_NOTIFY_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.trigger, Trigger::Phrase);
        assert_eq!(cfg.base_url, "https://bot.example.com");
        assert_eq!(cfg.notify_timeout, Duration::from_millis(250));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("KEYBOT_PORT", "not-a-port")]).is_err());
        assert!(config(&[("KEYBOT_TRIGGER", "slash")]).is_err());
        assert!(config(&[("KEYBOT_STORE_TIMEOUT_MS", "0")]).is_err());
    }
}
