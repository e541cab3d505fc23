//! Core ETL (Extract, Transform, Load) abstractions
//!
//! Stages are composed from an [`Extractor`] that produces records, a
//! [`Transformer`] that reshapes them one at a time, and a [`Loader`] that
//! persists the batch.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::Transformer;
