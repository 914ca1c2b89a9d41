//! The XSD parsing pipeline: a depth-first walk over the schema document
//! feeds start/end element events into a stack-based handler dispatcher,
//! which accumulates the flat [`ProtoTree`] the emitter consumes.

pub mod builtins;
mod facets;
pub mod parser;
pub mod proto;

pub use parser::Parser;
pub use proto::{
    trim_ns_prefix, Attribute, AttributeGroup, Bound, ComplexType, Element, Group, ProtoEntry,
    ProtoTree, Restriction, SimpleType,
};

use crate::cli::Language;
use crate::error::Error;

/// Converts a parsed schema document into a [`ProtoTree`].
///
/// Events are delivered in document order; the first handler error aborts
/// the stream and the partial tree is discarded.
pub fn parse_document(doc: &roxmltree::Document, lang: Language) -> Result<ProtoTree, Error> {
    let mut parser = Parser::new(lang);
    walk(&mut parser, doc.root_element())?;
    Ok(parser.into_tree())
}

fn walk(parser: &mut Parser, node: roxmltree::Node) -> Result<(), Error> {
    parser.start_element(node)?;
    for child in node.children().filter(|c| c.is_element()) {
        walk(parser, child)?;
    }
    parser.end_element(node.tag_name().name())
}
