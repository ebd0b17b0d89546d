// crates/core/src/slot.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{BaristaError, Category};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "COFFEE")]
    Coffee,
    #[serde(rename = "DESSERT")]
    Dessert,
    #[serde(rename = "NAME")]
    Name,
    #[serde(rename = "LOC")]
    Location,
    #[serde(rename = "NOTE")]
    Note,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Coffee,
        Slot::Dessert,
        Slot::Name,
        Slot::Location,
        Slot::Note,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Coffee => "COFFEE",
            Slot::Dessert => "DESSERT",
            Slot::Name => "NAME",
            Slot::Location => "LOC",
            Slot::Note => "NOTE",
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            Slot::Coffee => Some(Category::Coffee),
            Slot::Dessert => Some(Category::Dessert),
            Slot::Name | Slot::Location | Slot::Note => None,
        }
    }

    // Free-text slots may be declared without a pattern, e.g. `$(NAME)`.
    pub fn is_free_text(&self) -> bool {
        self.category().is_none()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = BaristaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| BaristaError::UnknownSlot(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declared_slot_names() {
        assert_eq!("COFFEE".parse::<Slot>().unwrap(), Slot::Coffee);
        assert_eq!("LOC".parse::<Slot>().unwrap(), Slot::Location);
        assert!(matches!(
            "coffee".parse::<Slot>(),
            Err(BaristaError::UnknownSlot(_))
        ));
    }

    #[test]
    fn only_catalog_slots_have_categories() {
        assert_eq!(Slot::Dessert.category(), Some(Category::Dessert));
        assert!(Slot::Note.is_free_text());
        assert!(!Slot::Coffee.is_free_text());
    }
}
