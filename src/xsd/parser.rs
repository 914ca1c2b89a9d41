use roxmltree::Node;

use super::proto::{
    trim_ns_prefix, Attribute, AttributeGroup, ComplexType, Element, Group, ProtoEntry, ProtoTree,
    SimpleType,
};
use crate::cli::Language;
use crate::error::Error;

/// The streaming schema parser.
///
/// One stack per open construct kind; facet and structural handlers always
/// address the innermost open entity of the kind they care about, which is
/// what makes inline anonymous definitions land on the right parent no
/// matter how deeply they nest.
pub struct Parser {
    lang: Language,
    simple_type: Vec<SimpleType>,
    complex_type: Vec<ComplexType>,
    element: Vec<Element>,
    attribute: Vec<Attribute>,
    group: Vec<Group>,
    attribute_group: Vec<AttributeGroup>,
    /// Local name of the construct enclosing the event being handled; only
    /// updated after the start handler ran.
    in_element: String,
    /// Name of the construct a named definition opened under. Cleared when
    /// its restriction scope closes.
    current_ele: String,
    in_union: bool,
    /// Depth of the simple type stack when the innermost union opened;
    /// entries above it belong to that union.
    union_floor: usize,
    tree: ProtoTree,
}

impl Parser {
    pub fn new(lang: Language) -> Self {
        Self {
            lang,
            simple_type: Vec::new(),
            complex_type: Vec::new(),
            element: Vec::new(),
            attribute: Vec::new(),
            group: Vec::new(),
            attribute_group: Vec::new(),
            in_element: String::new(),
            current_ele: String::new(),
            in_union: false,
            union_floor: 0,
            tree: ProtoTree::default(),
        }
    }

    pub fn into_tree(self) -> ProtoTree {
        self.tree
    }

    /// Dispatches a start event by local name. Unknown names are ignored;
    /// the first handler error terminates the stream.
    pub fn start_element(&mut self, node: Node) -> Result<(), Error> {
        let result = match node.tag_name().name() {
            "simpleType" => self.on_simple_type(node),
            "complexType" => self.on_complex_type(node),
            "element" => self.on_element(node),
            "attribute" => self.on_attribute(node),
            "group" => self.on_group(node),
            "attributeGroup" => self.on_attribute_group(node),
            "restriction" => self.on_restriction(node),
            "extension" => self.on_extension(node),
            "union" => self.on_union(node),
            "list" => self.on_list(node),
            "documentation" => self.on_documentation(node),
            "pattern" => self.on_pattern(node),
            "enumeration" => self.on_enumeration(node),
            "length" => self.on_length(node),
            "minLength" => self.on_min_length(node),
            "maxLength" => self.on_max_length(node),
            "minInclusive" => self.on_min_inclusive(node),
            "maxInclusive" => self.on_max_inclusive(node),
            "minExclusive" => self.on_min_exclusive(node),
            "maxExclusive" => self.on_max_exclusive(node),
            "totalDigits" => self.on_total_digits(node),
            // Recognized structure that carries no state of its own here;
            // includes and imports are not fetched.
            "schema" | "include" | "import" | "annotation" | "appinfo" | "simpleContent"
            | "complexContent" | "sequence" | "choice" | "all" => Ok(()),
            _ => Ok(()),
        };
        self.in_element = node.tag_name().name().to_owned();
        result
    }

    /// Dispatches an end event by local name.
    pub fn end_element(&mut self, local_name: &str) -> Result<(), Error> {
        match local_name {
            "simpleType" => self.end_simple_type(),
            "complexType" => self.end_complex_type(),
            "element" => self.end_element_decl(),
            "attribute" => self.end_attribute(),
            "group" => self.end_group(),
            "attributeGroup" => self.end_attribute_group(),
            "restriction" => self.end_restriction(),
            "union" => self.end_union(),
            _ => Ok(()),
        }
    }

    /// The innermost open simple type, target of every facet handler.
    pub(super) fn open_simple_type(&mut self) -> Option<&mut SimpleType> {
        self.simple_type.last_mut()
    }

    /// Name of the construct the innermost named definition opened under.
    pub fn current_construct(&self) -> &str {
        &self.current_ele
    }

    fn on_simple_type(&mut self, node: Node) -> Result<(), Error> {
        let mut st = SimpleType::default();
        if let Some(name) = node.attribute("name") {
            st.name = name.to_owned();
            self.current_ele = self.in_element.clone();
        }
        self.simple_type.push(st);
        Ok(())
    }

    fn end_simple_type(&mut self) -> Result<(), Error> {
        let anonymous = match self.simple_type.last() {
            Some(st) => st.name.is_empty(),
            None => return Ok(()),
        };
        // A union scope wins over any enclosing field: members stay on the
        // stack until EndUnion consumes them.
        if anonymous && !self.in_union {
            // Inline definition: project the base onto the enclosing field
            // and drop the simple type.
            if self.attribute.last().is_some() {
                let st = self.simple_type.pop().unwrap();
                self.attribute.last_mut().unwrap().type_ = st.base;
                return Ok(());
            }
            if self.element.last().is_some() {
                let st = self.simple_type.pop().unwrap();
                self.element.last_mut().unwrap().type_ = st.base;
                return Ok(());
            }
        }
        if !self.in_union {
            let st = self.simple_type.pop().unwrap();
            self.tree.push(ProtoEntry::SimpleType(st));
            self.current_ele.clear();
        }
        Ok(())
    }

    fn on_restriction(&mut self, node: Node) -> Result<(), Error> {
        if let Some(base) = node.attribute("base") {
            let value_type = self.tree.value_type(base, self.lang);
            if let Some(st) = self.simple_type.last_mut() {
                st.base = value_type;
            }
        }
        Ok(())
    }

    fn end_restriction(&mut self) -> Result<(), Error> {
        if self.simple_type.is_empty() {
            return Ok(());
        }
        // Inside a union the restricted simple type is a member; it must
        // not be projected onto a field open outside the union.
        if self.in_union {
            return Ok(());
        }
        if self.attribute.last().is_some() {
            let st = self.simple_type.pop().unwrap();
            let resolved = self.tree.value_type(&st.base, self.lang);
            let attribute = self.attribute.last_mut().unwrap();
            attribute.type_ = resolved;
            attribute.restriction = st.restriction;
            self.current_ele.clear();
            return Ok(());
        }
        if self.element.last().is_some() {
            let st = self.simple_type.pop().unwrap();
            let resolved = self.tree.value_type(&st.base, self.lang);
            let element = self.element.last_mut().unwrap();
            element.type_ = resolved;
            element.restriction = st.restriction;
            let patched = element.clone();
            self.current_ele.clear();
            // The enclosing complex type holds the element by value, so the
            // copy appended at start has to be refreshed.
            if let Some(ct) = self.complex_type.last_mut() {
                if let Some(slot) = ct.elements.last_mut() {
                    *slot = patched;
                }
            }
        }
        // A named simple type keeps its restriction until EndSimpleType
        // persists it.
        Ok(())
    }

    fn on_complex_type(&mut self, node: Node) -> Result<(), Error> {
        let mut ct = ComplexType::default();
        if let Some(name) = node.attribute("name") {
            ct.name = name.to_owned();
            self.current_ele = self.in_element.clone();
        }
        self.complex_type.push(ct);
        Ok(())
    }

    fn end_complex_type(&mut self) -> Result<(), Error> {
        let Some(mut ct) = self.complex_type.pop() else {
            return Ok(());
        };
        if ct.name.is_empty() {
            // Inline definition: it takes the enclosing element's name, and
            // the element's reference is pointed at it.
            if let Some(element) = self.element.last_mut() {
                ct.name = element.name.clone();
                if element.type_ref.is_empty() {
                    element.type_ref = ct.name.clone();
                }
            }
        }
        if !ct.name.is_empty() {
            self.tree.push(ProtoEntry::ComplexType(ct));
        }
        Ok(())
    }

    fn on_element(&mut self, node: Node) -> Result<(), Error> {
        let mut element = Element::default();
        if let Some(name) = node.attribute("name") {
            element.name = name.to_owned();
        }
        if let Some(reference) = node.attribute("ref") {
            element.name = trim_ns_prefix(reference).to_owned();
            element.type_ref = reference.to_owned();
            element.type_ = self.tree.value_type(reference, self.lang);
        }
        if let Some(type_) = node.attribute("type") {
            element.type_ref = type_.to_owned();
            element.type_ = self.tree.value_type(type_, self.lang);
        }
        if node.attribute("minOccurs") == Some("0") {
            element.optional = true;
        }
        if let Some(max) = node.attribute("maxOccurs") {
            element.plural = is_plural(max);
        }
        // Stored by value in the enclosing container right away; the stack
        // copy is the one later handlers mutate.
        if self.complex_type.last().is_some() {
            self.complex_type
                .last_mut()
                .unwrap()
                .elements
                .push(element.clone());
        } else if let Some(group) = self.group.last_mut() {
            group.elements.push(element.clone());
        }
        self.element.push(element);
        Ok(())
    }

    fn end_element_decl(&mut self) -> Result<(), Error> {
        let Some(element) = self.element.pop() else {
            return Ok(());
        };
        if self.complex_type.is_empty() && self.group.is_empty() && !element.name.is_empty() {
            self.tree.push(ProtoEntry::Element(element));
        }
        Ok(())
    }

    fn on_attribute(&mut self, node: Node) -> Result<(), Error> {
        let mut attribute = Attribute::default();
        if let Some(name) = node.attribute("name") {
            attribute.name = name.to_owned();
        }
        if let Some(reference) = node.attribute("ref") {
            attribute.name = trim_ns_prefix(reference).to_owned();
            attribute.type_ref = reference.to_owned();
            attribute.type_ = self.tree.value_type(reference, self.lang);
        }
        if let Some(type_) = node.attribute("type") {
            attribute.type_ref = type_.to_owned();
            attribute.type_ = self.tree.value_type(type_, self.lang);
        }
        if node.attribute("use") == Some("optional") {
            attribute.optional = true;
        }
        if let Some(max) = node.attribute("maxOccurs") {
            attribute.plural = is_plural(max);
        }
        self.attribute.push(attribute);
        Ok(())
    }

    fn end_attribute(&mut self) -> Result<(), Error> {
        let Some(attribute) = self.attribute.pop() else {
            return Ok(());
        };
        if let Some(ag) = self.attribute_group.last_mut() {
            ag.attributes.push(attribute);
        } else if let Some(ct) = self.complex_type.last_mut() {
            ct.attributes.push(attribute);
        } else if !attribute.name.is_empty() {
            self.tree.push(ProtoEntry::Attribute(attribute));
        }
        Ok(())
    }

    fn on_group(&mut self, node: Node) -> Result<(), Error> {
        let mut group = Group::default();
        if let Some(name) = node.attribute("name") {
            group.name = name.to_owned();
            self.current_ele = self.in_element.clone();
        }
        if let Some(reference) = node.attribute("ref") {
            group.ref_ = reference.to_owned();
            if group.name.is_empty() {
                group.name = trim_ns_prefix(reference).to_owned();
            }
        }
        if let Some(max) = node.attribute("maxOccurs") {
            group.plural = is_plural(max);
        }
        self.group.push(group);
        Ok(())
    }

    fn end_group(&mut self) -> Result<(), Error> {
        let Some(group) = self.group.pop() else {
            return Ok(());
        };
        if let Some(parent) = self.group.last_mut() {
            parent.groups.push(group);
        } else if let Some(ct) = self.complex_type.last_mut() {
            ct.groups.push(group);
        } else if !group.name.is_empty() {
            self.tree.push(ProtoEntry::Group(group));
        }
        Ok(())
    }

    fn on_attribute_group(&mut self, node: Node) -> Result<(), Error> {
        let mut ag = AttributeGroup::default();
        if let Some(name) = node.attribute("name") {
            ag.name = name.to_owned();
            self.current_ele = self.in_element.clone();
        }
        if let Some(reference) = node.attribute("ref") {
            ag.ref_ = reference.to_owned();
            if ag.name.is_empty() {
                ag.name = trim_ns_prefix(reference).to_owned();
            }
        }
        self.attribute_group.push(ag);
        Ok(())
    }

    fn end_attribute_group(&mut self) -> Result<(), Error> {
        let Some(ag) = self.attribute_group.pop() else {
            return Ok(());
        };
        if let Some(ct) = self.complex_type.last_mut() {
            ct.attribute_groups.push(ag);
        } else if !ag.name.is_empty() {
            self.tree.push(ProtoEntry::AttributeGroup(ag));
        }
        Ok(())
    }

    fn on_union(&mut self, node: Node) -> Result<(), Error> {
        self.in_union = true;
        self.union_floor = self.simple_type.len();
        let members: Vec<(String, String)> = node
            .attribute("memberTypes")
            .map(|list| {
                list.split_whitespace()
                    .map(|member| {
                        (
                            trim_ns_prefix(member).to_owned(),
                            self.tree.value_type(member, self.lang),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        if let Some(st) = self.simple_type.last_mut() {
            st.union = true;
            for (name, value) in members {
                st.member_types.insert(name, value);
            }
        }
        Ok(())
    }

    fn end_union(&mut self) -> Result<(), Error> {
        // The outer union context wins: everything stacked above the floor
        // is a member, named or not, and is consumed here instead of
        // reaching the proto tree.
        while self.simple_type.len() > self.union_floor {
            let member = self.simple_type.pop().unwrap();
            let key = if member.name.is_empty() {
                trim_ns_prefix(&member.base).to_owned()
            } else {
                member.name.clone()
            };
            if let Some(owner) = self.simple_type.last_mut() {
                if !key.is_empty() {
                    owner.member_types.insert(key, member.base);
                }
            }
        }
        self.in_union = false;
        Ok(())
    }

    fn on_list(&mut self, node: Node) -> Result<(), Error> {
        let item = node
            .attribute("itemType")
            .map(|item| self.tree.value_type(item, self.lang));
        if let Some(st) = self.simple_type.last_mut() {
            st.list = true;
            if let Some(item) = item {
                st.base = item;
            }
        }
        Ok(())
    }

    fn on_extension(&mut self, node: Node) -> Result<(), Error> {
        if let Some(base) = node.attribute("base") {
            let resolved = self.tree.value_type(base, self.lang);
            if let Some(ct) = self.complex_type.last_mut() {
                ct.base = resolved;
            }
        }
        Ok(())
    }

    fn on_documentation(&mut self, node: Node) -> Result<(), Error> {
        let text = node.text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Ok(());
        }
        let doc = text.to_owned();
        if let Some(st) = self.simple_type.last_mut() {
            st.doc = doc;
        } else if let Some(attribute) = self.attribute.last_mut() {
            attribute.doc = doc;
        } else if let Some(element) = self.element.last_mut() {
            element.doc = doc;
        } else if let Some(group) = self.group.last_mut() {
            group.doc = doc;
        } else if let Some(ag) = self.attribute_group.last_mut() {
            ag.doc = doc;
        } else if let Some(ct) = self.complex_type.last_mut() {
            ct.doc = doc;
        }
        Ok(())
    }
}

fn is_plural(max_occurs: &str) -> bool {
    max_occurs == "unbounded" || max_occurs.parse::<u64>().map_or(false, |n| n > 1)
}
