use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_WEATHER_BASE_URL: &str = "http://api.wunderground.com";
pub const DEFAULT_ML_SERVICE_LOCATION: &str = "ussouthcentral";

/// Weather provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Scoring service settings. A missing `api_key` means scoring is not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub api_key: Option<String>,
    pub workspace_id: Option<String>,
    pub service_id: Option<String>,
    /// Azure region, e.g. "ussouthcentral".
    pub location: Option<String>,
    /// Overrides the region-derived base URL.
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [weather]
/// api_key = "..."
///
/// [scoring]
/// api_key = "..."
/// workspace_id = "..."
/// service_id = "..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Fully resolved scoring endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringEndpoint {
    pub base_url: String,
    pub workspace_id: String,
    pub service_id: String,
    pub api_key: String,
}

impl ScoringEndpoint {
    pub fn execute_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/services/{}/execute?api-version=2.0&details=true",
            self.base_url.trim_end_matches('/'),
            self.workspace_id,
            self.service_id,
        )
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet,
    /// then apply `FLIGHTDELAY_*` environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from an explicit path. A missing file yields the default config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "flight-delay", "delay-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override file values with whatever `lookup` returns for the `FLIGHTDELAY_*` names.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots: [(&str, &mut Option<String>); 7] = [
            ("FLIGHTDELAY_WEATHER_API_KEY", &mut self.weather.api_key),
            ("FLIGHTDELAY_WEATHER_BASE_URL", &mut self.weather.base_url),
            ("FLIGHTDELAY_ML_API_KEY", &mut self.scoring.api_key),
            ("FLIGHTDELAY_ML_WORKSPACE_ID", &mut self.scoring.workspace_id),
            ("FLIGHTDELAY_ML_SERVICE_ID", &mut self.scoring.service_id),
            ("FLIGHTDELAY_ML_SERVICE_LOCATION", &mut self.scoring.location),
            ("FLIGHTDELAY_ML_BASE_URL", &mut self.scoring.base_url),
        ];

        for (name, slot) in slots {
            if let Some(value) = lookup(name) {
                *slot = Some(value);
            }
        }
    }

    pub fn weather_api_key(&self) -> Option<&str> {
        non_blank(&self.weather.api_key)
    }

    pub fn weather_base_url(&self) -> &str {
        non_blank(&self.weather.base_url).unwrap_or(DEFAULT_WEATHER_BASE_URL)
    }

    pub fn is_scoring_configured(&self) -> bool {
        non_blank(&self.scoring.api_key).is_some()
    }

    /// Resolve the scoring endpoint. `Ok(None)` when no scoring key is set.
    pub fn scoring_endpoint(&self) -> Result<Option<ScoringEndpoint>> {
        let Some(api_key) = non_blank(&self.scoring.api_key) else {
            return Ok(None);
        };

        let workspace_id = non_blank(&self.scoring.workspace_id).ok_or_else(|| {
            anyhow!(
                "Scoring API key is set but workspace_id is missing.\n\
                 Hint: run `delay configure` or set FLIGHTDELAY_ML_WORKSPACE_ID."
            )
        })?;
        let service_id = non_blank(&self.scoring.service_id).ok_or_else(|| {
            anyhow!(
                "Scoring API key is set but service_id is missing.\n\
                 Hint: run `delay configure` or set FLIGHTDELAY_ML_SERVICE_ID."
            )
        })?;

        let base_url = match non_blank(&self.scoring.base_url) {
            Some(url) => url.to_string(),
            None => {
                let location =
                    non_blank(&self.scoring.location).unwrap_or(DEFAULT_ML_SERVICE_LOCATION);
                format!("https://{location}.services.azureml.net")
            }
        };

        Ok(Some(ScoringEndpoint {
            base_url,
            workspace_id: workspace_id.to_string(),
            service_id: service_id.to_string(),
            api_key: api_key.to_string(),
        }))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
