//! Web page engines.

mod diffbot;
mod local;
pub mod parse;

pub use diffbot::DiffbotEngine;
pub use local::ScraperEngine;
