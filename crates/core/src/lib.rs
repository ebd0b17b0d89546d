// crates/core/src/lib.rs
pub mod catalog;
pub mod events;
pub mod result;
pub mod slot;

pub use catalog::*;
pub use events::*;
pub use result::*;
pub use slot::*;
