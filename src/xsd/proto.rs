use std::collections::BTreeMap;

use super::builtins;
use crate::cli::Language;

/// A top-level schema entity, in document order.
///
/// Anonymous inline simple types never appear here; the parser projects
/// their base and restriction onto the enclosing element or attribute.
#[derive(Clone, Debug)]
pub enum ProtoEntry {
    SimpleType(SimpleType),
    ComplexType(ComplexType),
    Group(Group),
    AttributeGroup(AttributeGroup),
    Element(Element),
    Attribute(Attribute),
}

/// `simpleType` (XSD pt. 2): an atomic, list or union type, possibly
/// constrained by facets.
#[derive(Clone, Debug, Default)]
pub struct SimpleType {
    /// Empty while the type is anonymous.
    pub name: String,
    pub doc: String,
    /// Resolved base type: a target primitive or the name of another
    /// simple type.
    pub base: String,
    pub list: bool,
    pub union: bool,
    /// Union member name mapped to its resolved base, in member order.
    pub member_types: BTreeMap<String, String>,
    pub restriction: Restriction,
}

/// `complexType`: attributes plus content particles, flattened into the
/// ordered field lists the emitter walks.
#[derive(Clone, Debug, Default)]
pub struct ComplexType {
    pub name: String,
    pub doc: String,
    /// Set by `extension`; empty when the type inherits nothing.
    pub base: String,
    pub attributes: Vec<Attribute>,
    pub elements: Vec<Element>,
    pub groups: Vec<Group>,
    pub attribute_groups: Vec<AttributeGroup>,
}

/// `group`: a named model group definition, or a reference to one when it
/// occurs inside a complex type.
#[derive(Clone, Debug, Default)]
pub struct Group {
    pub name: String,
    pub doc: String,
    pub ref_: String,
    pub plural: bool,
    pub elements: Vec<Element>,
    pub groups: Vec<Group>,
}

/// `attributeGroup`: a named attribute collection, or a reference to one.
#[derive(Clone, Debug, Default)]
pub struct AttributeGroup {
    pub name: String,
    pub doc: String,
    pub ref_: String,
    pub attributes: Vec<Attribute>,
}

#[derive(Clone, Debug, Default)]
pub struct Element {
    pub name: String,
    pub doc: String,
    /// Resolved local base type (a target primitive or a named simple type).
    pub type_: String,
    /// The referenced name exactly as it appeared in the schema, namespace
    /// prefix included. Never rewritten after parsing.
    pub type_ref: String,
    pub optional: bool,
    pub plural: bool,
    pub restriction: Restriction,
}

#[derive(Clone, Debug, Default)]
pub struct Attribute {
    pub name: String,
    pub doc: String,
    /// Resolved local base type (a target primitive or a named simple type).
    pub type_: String,
    /// The referenced name exactly as it appeared in the schema, namespace
    /// prefix included. Never rewritten after parsing.
    pub type_ref: String,
    pub optional: bool,
    pub plural: bool,
    pub restriction: Restriction,
}

/// A numeric bound together with its exclusivity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub exclusive: bool,
}

/// The constraining facets collected under one `restriction` element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Restriction {
    pub enumeration: Vec<String>,
    pub pattern: Option<String>,
    pub length: Option<u64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    /// Recognized and stored, deliberately never enforced.
    pub total_digits: Option<u64>,
}

impl Restriction {
    /// Whether any enforceable rule is present. `total_digits` does not
    /// count: it is a placeholder.
    pub fn has_rules(&self) -> bool {
        !self.enumeration.is_empty()
            || self.pattern.is_some()
            || self.length.is_some()
            || self.min_length.is_some()
            || self.max_length.is_some()
            || self.min.is_some()
            || self.max.is_some()
    }
}

/// The flat, document-ordered collection of top-level schema entities the
/// parser produces and the emitter consumes.
#[derive(Clone, Debug, Default)]
pub struct ProtoTree {
    entries: Vec<ProtoEntry>,
}

impl ProtoTree {
    pub fn push(&mut self, entry: ProtoEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ProtoEntry] {
        &self.entries
    }

    /// Retrieves a named simple type definition. The namespace prefix of
    /// `name` is ignored; the empty name never matches (anonymous entries
    /// are not addressable).
    pub fn find_simple_type(&self, name: &str) -> Option<&SimpleType> {
        let name = trim_ns_prefix(name);
        if name.is_empty() {
            return None;
        }
        self.entries.iter().find_map(|entry| match entry {
            ProtoEntry::SimpleType(st) if st.name == name => Some(st),
            _ => None,
        })
    }

    /// Resolves a schema type reference to the target primitive or local
    /// name it denotes. Registry primitives map directly; named simple
    /// types resolve to their base; anything else is returned verbatim (the
    /// emitter's safety net may declare a placeholder for it later).
    pub fn value_type(&self, name: &str, lang: Language) -> String {
        let local = trim_ns_prefix(name);
        if let Some(primitive) = builtins::target_type(lang, local) {
            return primitive.to_owned();
        }
        self.base_of(local, lang)
    }

    /// Chases alias chains down to the primitive base at the leaf.
    pub fn base_of(&self, name: &str, lang: Language) -> String {
        let mut current = trim_ns_prefix(name).to_owned();
        let mut seen: Vec<String> = Vec::new();
        loop {
            if let Some(primitive) = builtins::target_type(lang, &current) {
                return primitive.to_owned();
            }
            // A cycle in the alias chain means the schema is broken; stop
            // rather than loop.
            if seen.contains(&current) {
                return current;
            }
            match self.find_simple_type(&current) {
                Some(st) if !st.base.is_empty() => {
                    seen.push(current);
                    current = trim_ns_prefix(&st.base).to_owned();
                }
                _ => return current,
            }
        }
    }
}

/// Strips the namespace prefix from a qualified name (`xs:string` becomes
/// `string`).
pub fn trim_ns_prefix(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}
