// crates/config/src/lib.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod loader;
pub mod script;
pub mod validator;

pub use loader::ConfigLoader;
pub use script::{IntentScript, MenuConfig, ScriptConfig};
pub use validator::ConfigValidator;

/// Engine configuration, read from `config/barista.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaristaConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub nlu: NluConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Dialogue script to load instead of the built-in one.
    #[serde(default)]
    pub script_path: Option<PathBuf>,
    /// When non-empty, these utterances are replayed instead of reading stdin.
    #[serde(default)]
    pub scripted_utterances: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluConfig {
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Fixed seed for response selection; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Speak a fallback phrase instead of reporting unmatched utterances.
    #[serde(default)]
    pub use_fallback: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_fuzzy_threshold() -> f64 {
    0.85
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            script_path: None,
            scripted_utterances: Vec::new(),
        }
    }
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}
