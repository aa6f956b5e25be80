//! Source emitters for ormgen.
//!
//! Renders a resolved schema into a Rust model module and a proto3 wire
//! schema. Rendering is pure: the caller decides where the text is written.

pub mod config;
pub mod errors;
pub mod model;
pub mod naming;
pub mod registry;
pub mod render;
pub mod wire_schema;

pub use config::GeneratorConfig;
pub use errors::{EmitError, Result};
pub use render::{GENERATED_MARKER, RenderedArtifacts, render};
