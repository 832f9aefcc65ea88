//! # stride-schema
//!
//! JSON Schema support for Stride.
//!
//! - [`SchemaRegistry`]: schemas of the persisted entity types, generated from
//!   `stride-core` with schemars. The store validates interpretations against
//!   it before insert.
//! - [`analysis_schema`]: the request-time schema for one provider call,
//!   closed over exactly the active goal ids, plus [`AnalysisOutput`] for
//!   decoding a validated response.

mod analysis;
mod error;
mod registry;
mod structured;

pub use analysis::{AnalysisOutput, analysis_schema};
pub use error::SchemaError;
pub use registry::SchemaRegistry;
pub use structured::StructuredSchema;
