//! Configuration management for the bingo draw service
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual values, then the result is validated.

use crate::errors::{BingoResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sink: SinkConfig,
    pub timing: TimingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// Messaging endpoint that receives game events.
///
/// `request_timeout_secs` is a whole-request deadline set on the reqwest
/// client, on top of the transport's own defaults (default 10 s). A request
/// that runs past it is a failed delivery, logged and skipped like any other.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SinkConfig {
    pub url: String,
    pub token: String,
    pub channel: String,
    /// Per-request deadline for sink POSTs, in seconds
    pub request_timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8081/enviar-mensaje".to_string(),
            token: String::new(),
            channel: "bingo_revendedor_jugador".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl SinkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Keep the token out of logs
impl std::fmt::Debug for SinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkConfig")
            .field("url", &self.url)
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("channel", &self.channel)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Game clock settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Length of one countdown "minute"; shortened for demos and testing
    pub countdown_tick_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            countdown_tick_secs: 60,
        }
    }
}

impl TimingConfig {
    pub fn countdown_tick(&self) -> Duration {
        Duration::from_secs(self.countdown_tick_secs)
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> BingoResult<AppConfig> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Like [`load`](Self::load) with an explicit variable lookup
    pub fn load_with<F>(&self, lookup: F) -> BingoResult<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => AppConfig::default(),
        };

        apply_overrides(&mut config, lookup)?;
        validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> BingoResult<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into()
        })
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig, path: &str) -> BingoResult<()> {
        let toml_string = toml::to_string_pretty(config).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, toml_string).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into()
        })
    }
}

fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> BingoResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("BINGO_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| ConfigurationError::invalid_value("PORT", &port, "Invalid port number"))?;
    }

    if let Some(url) = lookup("SOCKET_URL") {
        config.sink.url = url;
    }
    if let Some(token) = lookup("SOCKET_TOKEN") {
        config.sink.token = token;
    }
    if let Some(channel) = lookup("SOCKET_CANAL") {
        config.sink.channel = channel;
    }

    if let Some(tick) = lookup("BINGO_COUNTDOWN_TICK_SECS") {
        config.timing.countdown_tick_secs = tick.parse().map_err(|_| {
            ConfigurationError::invalid_value(
                "BINGO_COUNTDOWN_TICK_SECS",
                &tick,
                "Invalid number of seconds",
            )
        })?;
    }

    Ok(())
}

fn validate(config: &AppConfig) -> BingoResult<()> {
    if config.server.port == 0 {
        let e = ConfigurationError::invalid_value("server.port", 0, "Port cannot be zero");
        return Err(e.into());
    }

    if config.sink.url.trim().is_empty() {
        return Err(ConfigurationError::MissingRequired("sink.url".to_string()).into());
    }

    if config.sink.channel.trim().is_empty() {
        return Err(ConfigurationError::MissingRequired("sink.channel".to_string()).into());
    }

    if config.timing.countdown_tick_secs == 0 {
        return Err(ConfigurationError::invalid_value(
            "timing.countdown_tick_secs",
            0,
            "Countdown tick cannot be zero",
        )
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.sink.channel, "bingo_revendedor_jugador");
        assert_eq!(config.timing.countdown_tick(), Duration::from_secs(60));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::new()
            .load_with(vars(&[
                ("PORT", "4100"),
                ("SOCKET_URL", "https://events.example/send"),
                ("SOCKET_TOKEN", "abc"),
                ("SOCKET_CANAL", "room"),
                ("BINGO_COUNTDOWN_TICK_SECS", "5"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 4100);
        assert_eq!(config.sink.url, "https://events.example/send");
        assert_eq!(config.sink.token, "abc");
        assert_eq!(config.sink.channel, "room");
        assert_eq!(config.timing.countdown_tick_secs, 5);
    }

    #[test]
    fn test_invalid_env_value() {
        let result = ConfigLoader::new().load_with(vars(&[("PORT", "http")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.sink.channel = " ".to_string();
        assert!(validate(&config).is_err());

        let mut config = AppConfig::default();
        config.timing.countdown_tick_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[sink]\nchannel = \"hall\"\n").unwrap();

        let config = ConfigLoader::new().with_path(file.path()).load_with(vars(&[])).unwrap();
        assert_eq!(config.sink.channel, "hall");
        assert_eq!(config.sink.request_timeout_secs, 10);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_save_and_load_config() -> BingoResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let mut original = AppConfig::default();
        original.timing.countdown_tick_secs = 2;

        let loader = ConfigLoader::new();
        loader.save(&original, path)?;
        let loaded = ConfigLoader::new().with_path(path).load_with(vars(&[]))?;

        assert_eq!(loaded, original);
        Ok(())
    }

    #[test]
    fn test_debug_redacts_token() {
        let sink = SinkConfig {
            token: "super-secret".to_string(),
            ..SinkConfig::default()
        };
        assert!(!format!("{:?}", sink).contains("super-secret"));
    }
}
