//! The message-to-record extraction pipeline.

pub mod processor;
pub mod types;
pub mod validate;

pub use processor::{Outcome, Processor};
pub use types::{CandidateRecord, InboundMessage, ValidatedRecord};
