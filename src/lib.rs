// src/lib.rs
pub mod app;
pub mod commands;
pub mod engine;
pub mod handlers;
pub mod responses;
pub mod session;

pub use app::BaristaApp;
pub use commands::UiCommand;
pub use engine::{DialogueEngine, Handler, HandlerContext};
pub use handlers::{build_engine, build_engine_with, known_intents};
pub use responses::{interpolate, FirstPhrase, PhraseSelector, RandomSelector, ResponseBook};
pub use session::{ConversationState, OrderDraft, Session, Transition};
