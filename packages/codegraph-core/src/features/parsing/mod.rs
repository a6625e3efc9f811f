//! C4 — Universal Parser (§4.4).

mod extraction;
mod ports;
mod plugins;
pub mod engine;

pub use engine::{ParseProjectOutcome, ParseSummary, ParserEngine};
pub use ports::LanguagePlugin;
