//! CLI utilities for binaries
//!
//! Handles settings loading from environment variables
//! for all binary executables.

use anyhow::{bail, Context, Result};
use pollsock::{MessageMode, MAX_PAYLOAD_CHUNK_SIZE};

/// A setting read from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Server address (ws:// or wss://)
    Address,
    /// Frame messages as text (`1` or `true`)
    TextMode,
    /// Upper bound for one sent chunk and one receive
    ChunkSize,
}

impl Setting {
    /// Get the default value for this setting
    pub fn default_value(&self) -> &'static str {
        match self {
            Setting::Address => "ws://127.0.0.1:9001",
            Setting::TextMode => "false",
            Setting::ChunkSize => "1024",
        }
    }

    /// Get the environment variable name for this setting
    pub fn env_var_name(&self) -> &'static str {
        match self {
            Setting::Address => "POLLSOCK_ADDRESS",
            Setting::TextMode => "POLLSOCK_TEXT_MODE",
            Setting::ChunkSize => "POLLSOCK_CHUNK_SIZE",
        }
    }
}

/// Connection settings of a probe binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub address: String,
    pub mode: MessageMode,
    pub max_chunk_size: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            address: Setting::Address.default_value().to_string(),
            mode: MessageMode::Binary,
            max_chunk_size: MAX_PAYLOAD_CHUNK_SIZE,
        }
    }
}

/// Load probe settings from the environment, falling back to defaults
///
/// Call `dotenv::dotenv()` first so values from `.env` are visible.
pub fn load_settings_from_env() -> Result<ProbeSettings> {
    settings_from_lookup(|name| std::env::var(name).ok())
}

/// Build settings from an arbitrary variable lookup
pub fn settings_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ProbeSettings> {
    let value = |setting: Setting| {
        lookup(setting.env_var_name()).unwrap_or_else(|| setting.default_value().to_string())
    };

    let address = value(Setting::Address);
    if address.trim().is_empty() {
        bail!("{} must not be empty", Setting::Address.env_var_name());
    }

    let mode = match value(Setting::TextMode).trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => MessageMode::Text,
        "0" | "false" | "no" | "" => MessageMode::Binary,
        other => bail!(
            "{} must be true or false, got {:?}",
            Setting::TextMode.env_var_name(),
            other
        ),
    };

    let max_chunk_size = value(Setting::ChunkSize)
        .trim()
        .parse::<usize>()
        .with_context(|| format!("{} must be a positive integer", Setting::ChunkSize.env_var_name()))?;

    Ok(ProbeSettings {
        address,
        mode,
        max_chunk_size,
    })
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_setting_env_vars() {
        assert_eq!(Setting::Address.env_var_name(), "POLLSOCK_ADDRESS");
        assert_eq!(Setting::TextMode.env_var_name(), "POLLSOCK_TEXT_MODE");
        assert_eq!(Setting::ChunkSize.env_var_name(), "POLLSOCK_CHUNK_SIZE");
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = settings_from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, ProbeSettings::default());
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from_lookup(lookup(&[
            ("POLLSOCK_ADDRESS", "wss://echo.example.com"),
            ("POLLSOCK_TEXT_MODE", "TRUE"),
            ("POLLSOCK_CHUNK_SIZE", "4096"),
        ]))
        .unwrap();

        assert_eq!(settings.address, "wss://echo.example.com");
        assert!(settings.mode.is_text());
        assert_eq!(settings.max_chunk_size, 4096);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(settings_from_lookup(lookup(&[("POLLSOCK_TEXT_MODE", "maybe")])).is_err());
        assert!(settings_from_lookup(lookup(&[("POLLSOCK_CHUNK_SIZE", "-1")])).is_err());
        assert!(settings_from_lookup(lookup(&[("POLLSOCK_ADDRESS", " ")])).is_err());
    }
}
