//! Document text, revisions and background parsing.

pub mod background;
mod model;

pub use background::{BackgroundParser, PARSE_TIMEOUT, ParseOutcome};
pub use model::{Document, Revision};
