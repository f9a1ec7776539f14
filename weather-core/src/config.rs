use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{env, fs, path::PathBuf, time::Duration};

/// Placeholder value shipped in setup instructions; treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const DEFAULT_LANG: &str = "en";
const DEFAULT_PORT: u16 = 5000;

/// Fixed timeout applied to every outbound provider call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Optional on-disk configuration.
///
/// Example TOML (`config.toml` in the platform config directory):
/// ```toml
/// api_key = "..."
/// lang = "en"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    api_key: Option<String>,
    base_url: Option<String>,
    lang: Option<String>,
    port: Option<u16>,
}

/// Immutable process-wide configuration, built once at startup and passed
/// explicitly into the lookup. Environment variables override the config
/// file.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    /// Locale sent to the provider as the `lang` query parameter.
    pub lang: String,
    /// Port for the HTTP front-end; the stdio front-end ignores it.
    pub port: u16,
    pub timeout: Duration,
}

impl Config {
    /// Load config from disk and environment.
    ///
    /// A missing config file is fine (first run); a present but unparseable
    /// one is an error.
    pub fn load() -> Result<Self> {
        let file = FileConfig::load()?;
        Self::resolve(file, |key| env::var(key).ok())
    }

    fn resolve(file: FileConfig, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = var("OPENWEATHER_API_KEY")
            .or(file.api_key)
            .unwrap_or_default();

        let base_url = var("OPENWEATHER_BASE_URL")
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let lang = var("OPENWEATHER_LANG")
            .or(file.lang)
            .unwrap_or_else(|| DEFAULT_LANG.to_owned());

        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid PORT value: {raw}"))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            api_key,
            base_url,
            lang,
            port,
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// True iff a real API key is present (non-empty and not the placeholder).
    pub fn credential_configured(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-service", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

impl FileConfig {
    fn load() -> Result<Self> {
        let path = Config::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }
}
