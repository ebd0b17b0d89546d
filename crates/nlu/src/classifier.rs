// crates/nlu/src/classifier.rs

use barista_core::{BaristaResult, IntentMatch};
use tracing::debug;

use crate::registry::IntentTemplates;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// Maps an utterance onto one of the registered intents.
pub trait Classifier: Send + Sync {
    /// `Ok(None)` when no intent matches.
    fn classify(&self, utterance: &str, intents: &[IntentTemplates]) -> BaristaResult<Option<IntentMatch>>;

    fn name(&self) -> &str;
}

/// Reference classifier that runs the compiled templates directly.
///
/// Among all matching templates the one covering the most literal text wins;
/// ties go to the intent registered first.
#[derive(Debug, Clone)]
pub struct TemplateClassifier {
    fuzzy_threshold: f64,
}

impl Default for TemplateClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl TemplateClassifier {
    pub fn new(fuzzy_threshold: f64) -> Self {
        Self { fuzzy_threshold }
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }
}

impl Classifier for TemplateClassifier {
    fn classify(&self, utterance: &str, intents: &[IntentTemplates]) -> BaristaResult<Option<IntentMatch>> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Ok(None);
        }

        let mut best: Option<(usize, &IntentTemplates, &str, crate::TemplateMatch)> = None;

        for intent in intents {
            for template in intent.templates() {
                if let Some(m) = template.captures(utterance, self.fuzzy_threshold) {
                    let better = best
                        .as_ref()
                        .map_or(true, |(score, ..)| m.literal_len > *score);
                    if better {
                        best = Some((m.literal_len, intent, template.source(), m));
                    }
                }
            }
        }

        let Some((score, intent, template, m)) = best else {
            debug!("No template matched '{}'", utterance);
            return Ok(None);
        };

        let total = utterance.chars().filter(|c| c.is_alphanumeric()).count().max(1);
        let confidence = (score as f32 / total as f32).min(1.0);

        debug!(
            "Matched intent {} via '{}' (confidence {:.2})",
            intent.name(),
            template,
            confidence
        );

        Ok(Some(IntentMatch {
            intent: intent.name().to_string(),
            template: template.to_string(),
            confidence,
            slots: m.slots,
        }))
    }

    fn name(&self) -> &str {
        "TemplateClassifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatternRegistry;

    fn registry() -> PatternRegistry<()> {
        let mut registry = PatternRegistry::new();
        registry
            .register("menu", ["What can I order here", "What(s| is) on the menu"], ())
            .unwrap();
        registry
            .register(
                "order_coffee",
                ["I would like a $(COFFEE cappuccino|latte|americano)"],
                (),
            )
            .unwrap();
        registry
            .register(
                "order_dessert",
                ["I would like a $(DESSERT cheesecake|brownie|apple pie) (please|)"],
                (),
            )
            .unwrap();
        registry.register("provide_detail", ["It(s| is) $(NAME)"], ()).unwrap();
        registry.register("provide_name", ["My name is $(NAME)"], ()).unwrap();
        registry
            .register("provide_note", ["My comment is $(NOTE* (.+))", "My $(NOTE* (.+))"], ())
            .unwrap();
        registry
    }

    #[test]
    fn picks_intent_by_slot_alternation() {
        let registry = registry();
        let classifier = TemplateClassifier::default();

        let coffee = classifier
            .classify("I would like a latte", registry.intents())
            .unwrap()
            .unwrap();
        assert_eq!(coffee.intent, "order_coffee");
        assert_eq!(coffee.slot("COFFEE"), Some("latte"));

        let dessert = classifier
            .classify("I would like a brownie please", registry.intents())
            .unwrap()
            .unwrap();
        assert_eq!(dessert.intent, "order_dessert");
        assert_eq!(dessert.slot("DESSERT"), Some("brownie"));
    }

    #[test]
    fn prefers_the_more_literal_template() {
        let registry = registry();
        let classifier = TemplateClassifier::default();

        // both note templates match; the one spelling out "My comment is" wins
        let m = classifier
            .classify("My comment is extra hot", registry.intents())
            .unwrap()
            .unwrap();
        assert_eq!(m.intent, "provide_note");
        assert_eq!(m.template, "My comment is $(NOTE* (.+))");
        assert_eq!(m.slot("NOTE"), Some("extra hot"));
    }

    #[test]
    fn returns_none_without_a_match() {
        let registry = registry();
        let classifier = TemplateClassifier::default();

        assert!(classifier
            .classify("Play some jazz", registry.intents())
            .unwrap()
            .is_none());
        assert!(classifier.classify("   ", registry.intents()).unwrap().is_none());
        // "It" and "s" only match as separate words
        assert!(classifier
            .classify("Itsy bitsy spider", registry.intents())
            .unwrap()
            .is_none());
    }

    #[test]
    fn confidence_reflects_literal_coverage() {
        let registry = registry();
        let classifier = TemplateClassifier::default();

        let menu = classifier
            .classify("What can I order here", registry.intents())
            .unwrap()
            .unwrap();
        assert_eq!(menu.confidence, 1.0);

        let name = classifier
            .classify("It is Alex", registry.intents())
            .unwrap()
            .unwrap();
        assert_eq!(name.intent, "provide_detail");
        assert!(name.confidence < 1.0);
    }
}
