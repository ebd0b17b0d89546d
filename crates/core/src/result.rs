// crates/core/src/result.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BaristaError {
    #[error("Unknown menu category: {0}")]
    UnknownCategory(String),

    #[error("Template already registered: {0}")]
    DuplicateTemplate(String),

    #[error("Intent already registered: {0}")]
    DuplicateIntent(String),

    #[error("Duplicate {category} item id '{id}'")]
    DuplicateItem { category: String, id: String },

    #[error("No menu item matches '{raw}'")]
    NoMatch { raw: String },

    #[error("No intent matched utterance '{0}'")]
    NoIntentMatched(String),

    #[error("Unknown intent: {0}")]
    UnknownIntent(String),

    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type BaristaResult<T> = Result<T, BaristaError>;
