use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main engine configuration
///
/// Only genuinely configurable knobs live here. The readiness composite
/// bands and the wearable recovery display bands are domain constants in
/// [`crate::readiness`] and [`crate::reconcile`] respectively, not
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Wearable-to-slider auto-fill mapping
    pub autofill: AutoFillSettings,

    /// Wearable re-sync behavior
    pub sync: SyncSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Mapping from a 0-100 wearable recovery score to 1-5 slider values
///
/// The exact breakpoints are a product decision that was never pinned down
/// upstream; the defaults below track the wearable's own recovery bands.
/// They are deliberately injectable rather than hard-coded in the
/// reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoFillSettings {
    /// Recovery score at or above this maps to the high slider value
    pub high_recovery_min: u8,

    /// Recovery score at or above this (and below `high_recovery_min`)
    /// maps to the moderate slider value
    pub moderate_recovery_min: u8,

    /// Slider value for high recovery
    pub high_slider: u8,

    /// Slider value for moderate recovery
    pub moderate_slider: u8,

    /// Slider value for low recovery
    pub low_slider: u8,

    /// Wearable sleep score at or above this nudges the sleep slider up one
    pub sleep_boost_min: u8,

    /// Wearable sleep score below this nudges the sleep slider down one
    pub sleep_penalty_max: u8,
}

impl AutoFillSettings {
    /// Base slider value for a recovery score
    pub fn slider_for_recovery(&self, recovery_score: u8) -> u8 {
        if recovery_score >= self.high_recovery_min {
            self.high_slider
        } else if recovery_score >= self.moderate_recovery_min {
            self.moderate_slider
        } else {
            self.low_slider
        }
    }

    /// Sleep slider for a recovery score, refined by the wearable sleep score
    ///
    /// The nudge is clamped to the 1-5 scale here at the mapping layer;
    /// user-entered sliders are never clamped anywhere.
    pub fn sleep_slider(&self, recovery_score: u8, sleep_score: Option<u8>) -> u8 {
        let base = self.slider_for_recovery(recovery_score);
        let nudged = match sleep_score {
            Some(s) if s >= self.sleep_boost_min => base as i8 + 1,
            Some(s) if s < self.sleep_penalty_max => base as i8 - 1,
            _ => base as i8,
        };
        nudged.clamp(1, 5) as u8
    }

    /// Energy slider for a recovery score
    pub fn energy_slider(&self, recovery_score: u8) -> u8 {
        self.slider_for_recovery(recovery_score)
    }
}

impl Default for AutoFillSettings {
    fn default() -> Self {
        AutoFillSettings {
            high_recovery_min: 67,
            moderate_recovery_min: 34,
            high_slider: 4,
            moderate_slider: 3,
            low_slider: 2,
            sleep_boost_min: 80,
            sleep_penalty_max: 50,
        }
    }
}

/// Wearable re-sync behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Whether a re-sync may overwrite auto-filled sliders the user has
    /// already edited (`wearable+manual` days)
    ///
    /// Default is false: a manual override is sticky for that day.
    /// Provenance stays `wearable+manual` for the day either way.
    pub resync_overwrites_partial: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            resync_overwrites_partial: false,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let now = Utc::now();

        EngineConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            autofill: AutoFillSettings::default(),
            sync: SyncSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: EngineConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize configuration")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readyrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        match Self::load_from_file(Self::default_config_path()) {
            Ok(config) => config,
            Err(_) => Self::default(),
        }
    }
}
