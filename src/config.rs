//! Environment-driven configuration

use crate::llm::GeminiSettings;
use crate::persona;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Mode::Production),
            "development" | "dev" | "" => Ok(Mode::Development),
            other => Err(format!("expected production or development, got {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub port: u16,
    /// Backing file for visitor registrations
    pub registry_path: PathBuf,
    /// Directory holding the built application shell
    pub shell_dir: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini: GeminiSettings,
    pub voice: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode_raw = lookup("APP_MODE").or_else(|| lookup("NODE_ENV"));
        let mode = match mode_raw {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                key: "APP_MODE",
                value: raw.clone(),
                reason,
            })?,
            None => {
                tracing::info!("APP_MODE not set, using default: development");
                Mode::Development
            }
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: "PORT",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => 3000,
        };

        let registry_path = lookup("REGISTRY_PATH")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| default_registry_path(mode), PathBuf::from);

        let shell_dir = lookup("SHELL_DIR").map_or_else(|| PathBuf::from("dist"), PathBuf::from);

        let defaults = GeminiSettings::default();
        let gemini = GeminiSettings {
            base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            chat_model: lookup("GEMINI_MODEL").unwrap_or(defaults.chat_model),
            speech_model: lookup("GEMINI_TTS_MODEL").unwrap_or(defaults.speech_model),
        };

        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        if gemini_api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set; replies will fail until a key is selected");
        }

        Ok(Self {
            mode,
            port,
            registry_path,
            shell_dir,
            gemini_api_key,
            gemini,
            voice: lookup("GEMINI_VOICE").unwrap_or_else(|| persona::DEFAULT_VOICE.to_string()),
        })
    }
}

/// Temp directory in production, working directory otherwise
fn default_registry_path(mode: Mode) -> PathBuf {
    match mode {
        Mode::Production => std::env::temp_dir().join("users.json"),
        Mode::Development => PathBuf::from("users.json"),
    }
}
