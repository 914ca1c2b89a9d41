//! XSD to Go source generator.
//!
//! The crate is split along the two halves of the pipeline: [`xsd`] turns a
//! schema document into a flat [`xsd::ProtoTree`] of named schema entities,
//! and [`generator`] lowers that tree into a single Go source file with
//! validation methods derived from the facet restrictions.

pub mod cli;
pub mod error;
pub mod generator;
pub mod xsd;

pub use error::Error;
pub use generator::CodeGenerator;
pub use xsd::parse_document;
