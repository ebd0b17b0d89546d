// crates/config/src/loader.rs

use std::path::Path;

use barista_core::{BaristaError, BaristaResult};
use tracing::info;

use crate::validator::ConfigValidator;
use crate::BaristaConfig;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_file(path: &Path) -> BaristaResult<BaristaConfig> {
        let raw = std::fs::read_to_string(path).map_err(|e| config_error("read", path, e))?;
        toml::from_str(&raw).map_err(|e| config_error("parse", path, e))
    }

    pub fn save_to_file(path: &Path, config: &BaristaConfig) -> BaristaResult<()> {
        let rendered =
            toml::to_string_pretty(config).map_err(|e| config_error("serialize", path, e))?;
        std::fs::write(path, rendered).map_err(|e| config_error("write", path, e))
    }

    pub fn apply_env(config: &mut BaristaConfig) -> BaristaResult<()> {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(config: &mut BaristaConfig, lookup: F) -> BaristaResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(script) = lookup("BARISTA_SCRIPT") {
            config.app.script_path = Some(script.into());
        }
        if let Some(level) = lookup("BARISTA_LOG_LEVEL") {
            config.app.log_level = level;
        }
        if let Some(seed) = lookup("BARISTA_SEED") {
            config.dialogue.seed = Some(
                seed.parse()
                    .map_err(|_| BaristaError::Config(format!("Invalid seed '{}'", seed)))?,
            );
        }
        if let Some(threshold) = lookup("BARISTA_FUZZY_THRESHOLD") {
            config.nlu.fuzzy_threshold = threshold.parse().map_err(|_| {
                BaristaError::Config(format!("Invalid fuzzy threshold '{}'", threshold))
            })?;
        }

        Ok(())
    }

    pub fn load(path: &Path) -> BaristaResult<BaristaConfig> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::load_from_file(path)?
        } else {
            info!("No configuration at {}, using defaults", path.display());
            BaristaConfig::default()
        };

        Self::apply_env(&mut config)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}

fn config_error(action: &str, path: &Path, err: impl std::fmt::Display) -> BaristaError {
    BaristaError::Config(format!("Failed to {} {}: {}", action, path.display(), err))
}
