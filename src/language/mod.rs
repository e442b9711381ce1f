//! Languages, parsers and file type detection.

pub mod filetypes;
pub mod parser;
pub mod parser_pool;
pub mod registry;

pub use filetypes::{FiletypeResolver, detect_from_extension};
pub use parser::{SourceParser, TreeSitterParser, parse_with_pool};
pub use parser_pool::{DocumentParserPool, ParserFactory};
pub use registry::{LanguageRegistry, RUST_LANGUAGE};
