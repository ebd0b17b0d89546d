// src/engine.rs
use barista_config::ScriptConfig;
use barista_core::{
    BaristaError, BaristaResult, Catalog, MenuItem, OutputEvent, Slot,
};
use barista_nlu::{Classifier, PatternRegistry, SlotResolver};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::commands::UiCommand;
use crate::responses::{interpolate, PhraseSelector, ResponseBook};
use crate::session::{ConversationState, OrderDraft, Session, Transition};

pub type Handler = Box<dyn Fn(&mut HandlerContext<'_>) -> BaristaResult<()> + Send + Sync>;

pub struct HandlerContext<'a> {
    intent: &'a str,
    session: &'a mut Session,
    items: Vec<(Slot, &'a MenuItem)>,
    texts: Vec<(Slot, String)>,
    responses: &'a ResponseBook,
    selector: &'a mut Box<dyn PhraseSelector>,
    outputs: Vec<OutputEvent>,
}

impl<'a> HandlerContext<'a> {
    pub fn item(&self, slot: Slot) -> Option<&MenuItem> {
        self.items
            .iter()
            .find(|(candidate, _)| *candidate == slot)
            .map(|(_, item)| *item)
    }

    pub fn text(&self, slot: Slot) -> Option<&str> {
        self.texts
            .iter()
            .find(|(candidate, _)| *candidate == slot)
            .map(|(_, value)| value.as_str())
    }

    pub fn user_name(&self) -> Option<&str> {
        self.text(Slot::Name)
    }

    pub fn address(&self) -> Option<&str> {
        self.text(Slot::Location)
    }

    pub fn note(&self) -> Option<&str> {
        self.text(Slot::Note)
    }

    pub fn state(&self) -> ConversationState {
        self.session.state()
    }

    pub fn draft(&self) -> &OrderDraft {
        self.session.draft()
    }

    pub fn draft_mut(&mut self) -> &mut OrderDraft {
        self.session.draft_mut()
    }

    pub fn begin_order(&mut self) -> Transition {
        self.session.begin_order()
    }

    pub fn close(&mut self) -> Transition {
        self.session.close()
    }

    pub fn enter_user_details(&mut self) -> Transition {
        self.session.enter_user_details()
    }

    pub fn complete_if_ready(&mut self) -> Transition {
        self.session.complete_if_ready()
    }

    pub fn say(&mut self, key: &str) -> BaristaResult<()> {
        self.say_with(key, &[])
    }

    // captured slots take precedence over `extra`
    pub fn say_with(&mut self, key: &str, extra: &[(&str, &str)]) -> BaristaResult<()> {
        let responses = self.responses;
        let phrases = responses.phrases(self.intent, key).ok_or_else(|| {
            BaristaError::Config(format!(
                "No '{}' responses for intent '{}'",
                key, self.intent
            ))
        })?;

        let index = self.selector.select(phrases.len());
        let phrase = phrases.get(index).unwrap_or(&phrases[0]);

        let mut values = self
            .items
            .iter()
            .map(|(slot, item)| (slot.as_str(), item.name.as_str()))
            .chain(self.texts.iter().map(|(slot, value)| (slot.as_str(), value.as_str())))
            .collect::<Vec<_>>();
        values.extend_from_slice(extra);

        let text = interpolate(phrase, &values);
        self.outputs.push(OutputEvent::speech(text));
        Ok(())
    }

    pub fn emit(&mut self, command: UiCommand) -> BaristaResult<()> {
        let event = command.into_event()?;
        self.outputs.push(event);
        Ok(())
    }
}

/// Routes utterances to intent handlers and collects their output.
pub struct DialogueEngine {
    catalog: Catalog,
    registry: PatternRegistry<Handler>,
    classifier: Box<dyn Classifier>,
    responses: ResponseBook,
    selector: Mutex<Box<dyn PhraseSelector>>,
    use_fallback: bool,
}

impl DialogueEngine {
    pub fn new(
        catalog: Catalog,
        classifier: Box<dyn Classifier>,
        selector: Box<dyn PhraseSelector>,
    ) -> Self {
        Self {
            catalog,
            registry: PatternRegistry::new(),
            classifier,
            responses: ResponseBook::default(),
            selector: Mutex::new(selector),
            use_fallback: false,
        }
    }

    pub fn with_responses(mut self, responses: ResponseBook) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.use_fallback = enabled;
        self
    }

    pub fn register<I, S>(&mut self, name: &str, templates: I, handler: Handler) -> BaristaResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.register(name, templates, handler)
    }

    pub fn intent_count(&self) -> usize {
        self.registry.len()
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Handles one utterance to completion. The session is only updated when
    /// the handler succeeds.
    pub fn handle_utterance(&self, session: &mut Session, text: &str) -> BaristaResult<Vec<OutputEvent>> {
        // Step 1: Classify
        let Some(matched) = self.classifier.classify(text, self.registry.intents())? else {
            return self.unmatched(text);
        };

        let handler = self
            .registry
            .find_handler(&matched.intent)
            .ok_or_else(|| BaristaError::UnknownIntent(matched.intent.clone()))?;

        // Step 2: Canonicalize catalog slots
        let mut items = Vec::new();
        let mut texts = Vec::new();

        for capture in &matched.slots {
            let slot = capture.slot_name.parse::<Slot>()?;
            match slot.category() {
                Some(category) => {
                    match SlotResolver::resolve(&capture.raw_value, self.catalog.items(category)) {
                        Ok(item) => items.push((slot, item)),
                        Err(BaristaError::NoMatch { raw }) => {
                            warn!("'{}' is not on the {} menu", raw, category);
                            return Ok(vec![self.unavailable(&raw)]);
                        }
                        Err(e) => return Err(e),
                    }
                }
                None => texts.push((slot, capture.raw_value.trim().to_string())),
            }
        }

        debug!(
            "Session {} handling intent {} in state {:?}",
            session.id(),
            matched.intent,
            session.state()
        );

        // Step 3: Run the handler on a staged copy
        let mut staged = session.clone();
        let outputs = {
            let mut selector = self.selector.lock();
            let mut ctx = HandlerContext {
                intent: &matched.intent,
                session: &mut staged,
                items,
                texts,
                responses: &self.responses,
                selector: &mut *selector,
                outputs: Vec::new(),
            };
            handler(&mut ctx)?;
            ctx.outputs
        };

        *session = staged;
        Ok(outputs)
    }

    fn unmatched(&self, text: &str) -> BaristaResult<Vec<OutputEvent>> {
        if self.use_fallback {
            if let Some(phrases) = self.responses.shared(ScriptConfig::FALLBACK) {
                warn!("No intent matched '{}', using fallback", text);
                return Ok(vec![OutputEvent::speech(self.pick(phrases))]);
            }
        }
        Err(BaristaError::NoIntentMatched(text.to_string()))
    }

    fn unavailable(&self, raw: &str) -> OutputEvent {
        let text = match self.responses.shared(ScriptConfig::UNAVAILABLE) {
            Some(phrases) => interpolate(&self.pick(phrases), &[("ITEM", raw)]),
            None => format!("Sorry, {} is not on the menu", raw),
        };
        OutputEvent::speech(text)
    }

    fn pick(&self, phrases: &[String]) -> String {
        let index = self.selector.lock().select(phrases.len());
        phrases
            .get(index)
            .or_else(|| phrases.first())
            .cloned()
            .unwrap_or_default()
    }
}
