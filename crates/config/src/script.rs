// crates/config/src/script.rs

use std::collections::BTreeMap;
use std::path::Path;

use barista_core::{BaristaError, BaristaResult, Catalog, MenuItem};
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

const BUILTIN_SCRIPT: &str = include_str!("../../../config/coffee_shop.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub menu: MenuConfig,
    #[serde(default)]
    pub responses: BTreeMap<String, Vec<String>>,
    pub intents: Vec<IntentScript>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuConfig {
    pub coffee: Vec<MenuItem>,
    pub dessert: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentScript {
    pub name: String,
    pub templates: Vec<String>,
    #[serde(default)]
    pub responses: BTreeMap<String, Vec<String>>,
}

impl ScriptConfig {
    pub const FALLBACK: &'static str = "fallback";
    pub const UNAVAILABLE: &'static str = "unavailable";

    pub fn builtin() -> BaristaResult<Self> {
        serde_yaml::from_str(BUILTIN_SCRIPT)
            .map_err(|e| BaristaError::Config(format!("Failed to parse built-in script: {}", e)))
    }

    pub fn load(path: &Path) -> BaristaResult<Self> {
        load_document(path)
    }

    pub fn catalog(&self) -> BaristaResult<Catalog> {
        Catalog::new(self.menu.coffee.clone(), self.menu.dessert.clone())
    }

    pub fn intent(&self, name: &str) -> Option<&IntentScript> {
        self.intents.iter().find(|intent| intent.name == name)
    }
}

impl IntentScript {
    // Replaces `{coffee}` / `{dessert}` with the catalog's match pattern.
    pub fn expanded_templates(&self, catalog: &Catalog) -> BaristaResult<Vec<String>> {
        let placeholder = Regex::new(r"\{([a-z_]+)\}")
            .map_err(|e| BaristaError::Config(format!("Invalid placeholder pattern: {}", e)))?;

        self.templates
            .iter()
            .map(|template| {
                let mut result = String::new();
                let mut last = 0;

                for caps in placeholder.captures_iter(template) {
                    let (Some(whole), Some(category)) = (caps.get(0), caps.get(1)) else {
                        continue;
                    };
                    result.push_str(&template[last..whole.start()]);
                    result.push_str(&catalog.build_match_pattern(category.as_str())?);
                    last = whole.end();
                }

                result.push_str(&template[last..]);
                Ok(result)
            })
            .collect()
    }
}

fn load_document<T: DeserializeOwned>(path: &Path) -> BaristaResult<T> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| BaristaError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    if ext.eq_ignore_ascii_case("json") {
        serde_json::from_str(&contents)
            .map_err(|e| BaristaError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    } else {
        serde_yaml::from_str(&contents)
            .map_err(|e| BaristaError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}
