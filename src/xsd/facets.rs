//! Per-facet handlers. Every facet runs on start only and writes into the
//! restriction of the innermost open simple type; end events are no-ops
//! because application is deferred to the enclosing restriction scope. A
//! facet whose value does not parse is dropped silently, and a facet firing
//! with no simple type open is ignored.

use roxmltree::Node;

use super::parser::Parser;
use super::proto::Bound;
use crate::error::Error;

impl Parser {
    pub(super) fn on_pattern(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = node.attribute("value") {
            if let Some(st) = self.open_simple_type() {
                st.restriction.pattern = Some(value.to_owned());
            }
        }
        Ok(())
    }

    pub(super) fn on_enumeration(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = node.attribute("value") {
            if let Some(st) = self.open_simple_type() {
                st.restriction.enumeration.push(value.to_owned());
            }
        }
        Ok(())
    }

    pub(super) fn on_length(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = parse_value::<u64>(node) {
            if let Some(st) = self.open_simple_type() {
                st.restriction.length = Some(value);
            }
        }
        Ok(())
    }

    pub(super) fn on_min_length(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = parse_value::<u64>(node) {
            if let Some(st) = self.open_simple_type() {
                st.restriction.min_length = Some(value);
            }
        }
        Ok(())
    }

    pub(super) fn on_max_length(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = parse_value::<u64>(node) {
            if let Some(st) = self.open_simple_type() {
                st.restriction.max_length = Some(value);
            }
        }
        Ok(())
    }

    pub(super) fn on_min_inclusive(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = parse_value::<f64>(node) {
            if let Some(st) = self.open_simple_type() {
                st.restriction.min = Some(Bound {
                    value,
                    exclusive: false,
                });
            }
        }
        Ok(())
    }

    pub(super) fn on_max_inclusive(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = parse_value::<f64>(node) {
            if let Some(st) = self.open_simple_type() {
                st.restriction.max = Some(Bound {
                    value,
                    exclusive: false,
                });
            }
        }
        Ok(())
    }

    pub(super) fn on_min_exclusive(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = parse_value::<f64>(node) {
            if let Some(st) = self.open_simple_type() {
                st.restriction.min = Some(Bound {
                    value,
                    exclusive: true,
                });
            }
        }
        Ok(())
    }

    pub(super) fn on_max_exclusive(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = parse_value::<f64>(node) {
            if let Some(st) = self.open_simple_type() {
                st.restriction.max = Some(Bound {
                    value,
                    exclusive: true,
                });
            }
        }
        Ok(())
    }

    pub(super) fn on_total_digits(&mut self, node: Node) -> Result<(), Error> {
        if let Some(value) = parse_value::<u64>(node) {
            if let Some(st) = self.open_simple_type() {
                st.restriction.total_digits = Some(value);
            }
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(node: Node) -> Option<T> {
    node.attribute("value").and_then(|v| v.parse().ok())
}
