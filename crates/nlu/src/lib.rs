// crates/nlu/src/lib.rs
pub mod classifier;
pub mod registry;
pub mod resolver;
pub mod template;

pub use classifier::{Classifier, TemplateClassifier, DEFAULT_FUZZY_THRESHOLD};
pub use registry::{IntentTemplates, PatternRegistry};
pub use resolver::SlotResolver;
pub use template::{Template, TemplateMatch};
