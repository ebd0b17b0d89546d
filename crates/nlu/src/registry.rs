// crates/nlu/src/registry.rs

use std::collections::HashSet;

use barista_core::{BaristaError, BaristaResult};
use tracing::debug;

use crate::template::Template;

#[derive(Debug, Clone)]
pub struct IntentTemplates {
    name: String,
    templates: Vec<Template>,
}

impl IntentTemplates {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }
}

#[derive(Debug)]
pub struct PatternRegistry<H> {
    intents: Vec<IntentTemplates>,
    handlers: Vec<H>,
    sources: HashSet<String>,
}

impl<H> Default for PatternRegistry<H> {
    fn default() -> Self {
        Self {
            intents: Vec::new(),
            handlers: Vec::new(),
            sources: HashSet::new(),
        }
    }
}

impl<H> PatternRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<I, S>(&mut self, name: impl Into<String>, templates: I, handler: H) -> BaristaResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        if self.intents.iter().any(|intent| intent.name == name) {
            return Err(BaristaError::DuplicateIntent(name));
        }

        let mut compiled = Vec::new();
        let mut batch = HashSet::new();
        for source in templates {
            let source = source.as_ref();
            if self.sources.contains(source) || !batch.insert(source.to_string()) {
                return Err(BaristaError::DuplicateTemplate(source.to_string()));
            }
            compiled.push(Template::parse(source)?);
        }

        if compiled.is_empty() {
            return Err(BaristaError::Template(format!(
                "intent '{}' has no templates",
                name
            )));
        }

        debug!("Registered intent {} with {} templates", name, compiled.len());

        self.sources.extend(batch);
        self.intents.push(IntentTemplates {
            name,
            templates: compiled,
        });
        self.handlers.push(handler);
        Ok(())
    }

    pub fn find_handler(&self, intent: &str) -> Option<&H> {
        self.intents
            .iter()
            .position(|candidate| candidate.name == intent)
            .and_then(|index| self.handlers.get(index))
    }

    pub fn intents(&self) -> &[IntentTemplates] {
        &self.intents
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}
