//! HTTP handlers, one module per endpoint group.

pub mod chat;
pub mod debate;
pub mod generate;
pub mod grammar;
pub mod health;
pub mod pronunciation;

pub use chat::chat;
pub use debate::debate_topic;
pub use generate::generate_text;
pub use grammar::analyze_grammar;
pub use health::health_check;
pub use pronunciation::{analyze_pronunciation, generate_practice_text};
