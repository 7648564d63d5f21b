//! Image preprocessing ahead of text recognition.
//!
//! A fixed sequence of pixel-level transforms that improve recognition
//! accuracy without ever changing image dimensions.

pub mod pipeline;
pub mod steps;

pub use pipeline::preprocess;
