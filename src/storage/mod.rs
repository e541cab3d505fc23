//! File system storage operations
//!
//! JSON-lines snapshot reading and writing.

mod ndjson;

pub use ndjson::{NdjsonReader, NdjsonWriter};
