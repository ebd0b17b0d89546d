// src/responses.rs
use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks one of several equally valid phrasings.
pub trait PhraseSelector: Send {
    /// Returns an index below `choices`; `choices` is never zero.
    fn select(&mut self, choices: usize) -> usize;
}

pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PhraseSelector for RandomSelector {
    fn select(&mut self, choices: usize) -> usize {
        self.rng.gen_range(0..choices)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPhrase;

impl PhraseSelector for FirstPhrase {
    fn select(&mut self, _choices: usize) -> usize {
        0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseBook {
    shared: BTreeMap<String, Vec<String>>,
    intents: HashMap<String, BTreeMap<String, Vec<String>>>,
}

impl ResponseBook {
    pub fn new(shared: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            shared,
            intents: HashMap::new(),
        }
    }

    pub fn insert_intent(&mut self, intent: impl Into<String>, sets: BTreeMap<String, Vec<String>>) {
        self.intents.insert(intent.into(), sets);
    }

    // Intent-specific phrases win over shared ones.
    pub fn phrases(&self, intent: &str, key: &str) -> Option<&[String]> {
        self.intents
            .get(intent)
            .and_then(|sets| sets.get(key))
            .or_else(|| self.shared.get(key))
            .filter(|phrases| !phrases.is_empty())
            .map(Vec::as_slice)
    }

    pub fn shared(&self, key: &str) -> Option<&[String]> {
        self.shared
            .get(key)
            .filter(|phrases| !phrases.is_empty())
            .map(Vec::as_slice)
    }
}

pub fn interpolate(phrase: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(phrase.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{}}}", key), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(key: &str, phrases: &[&str]) -> BTreeMap<String, Vec<String>> {
        BTreeMap::from([(
            key.to_string(),
            phrases.iter().map(|p| p.to_string()).collect(),
        )])
    }

    #[test]
    fn seeded_selection_is_reproducible() {
        let mut a = RandomSelector::seeded(11);
        let mut b = RandomSelector::seeded(11);

        let picks_a = (0..20).map(|_| a.select(6)).collect::<Vec<_>>();
        let picks_b = (0..20).map(|_| b.select(6)).collect::<Vec<_>>();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|pick| *pick < 6));
    }

    #[test]
    fn intent_sets_shadow_shared_sets() {
        let mut book = ResponseBook::new(sets("closing", &["Bye"]));
        book.insert_intent("finish_order", sets("closing", &["See you"]));

        assert_eq!(book.phrases("finish_order", "closing").unwrap(), ["See you"]);
        assert_eq!(book.phrases("provide_name", "closing").unwrap(), ["Bye"]);
        assert!(book.phrases("provide_name", "menu").is_none());
    }

    #[test]
    fn interpolates_placeholders() {
        assert_eq!(
            interpolate("Adding a {COFFEE} to your order", &[("COFFEE", "latte")]),
            "Adding a latte to your order"
        );
        assert_eq!(interpolate("Sure", &[("COFFEE", "latte")]), "Sure");
    }
}
