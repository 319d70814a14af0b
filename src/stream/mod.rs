//! Chat response stream decoding
//!
//! - `decoder`: byte chunks to complete NDJSON lines
//! - `event`: lines to typed [`StreamEvent`]s

pub mod decoder;
pub mod event;

pub use decoder::NdjsonDecoder;
pub use event::{parse_event, StreamEvent};
