//! Structured extraction — prompt construction, the Gemini client, and
//! response cleanup/decoding.

pub mod gemini;
pub mod payload;
pub mod response;

pub use gemini::{ExtractionModel, GeminiClient};
