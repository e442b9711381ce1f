//! Text index utilities.
//!
//! Selections arrive in the host view's native index space; trees are
//! addressed in UTF-8 bytes. This module maps between the two.

pub mod position;

pub use position::{IndexEncoding, TextMapper};
