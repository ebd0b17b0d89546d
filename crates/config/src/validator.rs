// crates/config/src/validator.rs

use barista_core::{BaristaError, BaristaResult};
use tracing::warn;

use crate::script::ScriptConfig;
use crate::BaristaConfig;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &BaristaConfig) -> BaristaResult<()> {
        let threshold = config.nlu.fuzzy_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(BaristaError::Config(
                "Fuzzy threshold must be 0.0-1.0".to_string(),
            ));
        }

        if let Some(path) = &config.app.script_path {
            if !path.exists() {
                warn!("Dialogue script does not exist: {:?}", path);
            }
        }

        Ok(())
    }

    pub fn validate_script(script: &ScriptConfig, use_fallback: bool) -> BaristaResult<()> {
        if script.menu.coffee.is_empty() || script.menu.dessert.is_empty() {
            return Err(BaristaError::Config(
                "Menu needs at least one coffee and one dessert".to_string(),
            ));
        }

        if script.intents.is_empty() {
            return Err(BaristaError::Config("Script declares no intents".to_string()));
        }

        for (key, phrases) in &script.responses {
            if phrases.is_empty() {
                return Err(BaristaError::Config(format!(
                    "Response set '{}' is empty",
                    key
                )));
            }
        }

        for intent in &script.intents {
            if let Some((key, _)) = intent.responses.iter().find(|(_, p)| p.is_empty()) {
                return Err(BaristaError::Config(format!(
                    "Response set '{}' of intent '{}' is empty",
                    key, intent.name
                )));
            }
        }

        if use_fallback && !script.responses.contains_key(ScriptConfig::FALLBACK) {
            return Err(BaristaError::Config(
                "Fallback enabled but the script has no fallback responses".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut config = BaristaConfig::default();
        assert!(ConfigValidator::validate(&config).is_ok());

        config.nlu.fuzzy_threshold = 1.5;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn builtin_script_is_valid_with_fallback() {
        let script = ScriptConfig::builtin().unwrap();
        assert!(ConfigValidator::validate_script(&script, true).is_ok());
    }

    #[test]
    fn rejects_empty_response_sets() {
        let mut script = ScriptConfig::builtin().unwrap();
        script.responses.insert("closing".to_string(), Vec::new());
        assert!(ConfigValidator::validate_script(&script, false).is_err());

        let mut script = ScriptConfig::builtin().unwrap();
        script.responses.remove(ScriptConfig::FALLBACK);
        assert!(ConfigValidator::validate_script(&script, false).is_ok());
        assert!(ConfigValidator::validate_script(&script, true).is_err());
    }
}
