//! Declarative validator tags.
//!
//! The same restriction record that drives the generated `Validate` methods
//! is also serialized as a `validate:"…"` field tag, so downstream code can
//! enforce it through a reflective validator instead of the methods.

use crate::xsd::builtins;
use crate::xsd::proto::Restriction;

/// Formats the rule list for a field. Returns an empty string when the
/// restriction carries no rules or none of them apply to the base type.
///
/// `plural` fields get a leading `dive` so the rules apply to every item;
/// `optional` fields get `omitempty`. Enum rules are dropped entirely when
/// any value contains whitespace, because the tag grammar has no quoting.
pub fn build_validate_tag(base: &str, r: &Restriction, optional: bool, plural: bool) -> String {
    if !r.has_rules() {
        return String::new();
    }
    let mut rules: Vec<String> = Vec::new();
    if optional {
        rules.push("omitempty".to_owned());
    }
    if base == "string" {
        if let Some(length) = r.length {
            rules.push(format!("len={length}"));
        } else {
            if let Some(min) = r.min_length {
                rules.push(format!("min={min}"));
            }
            if let Some(max) = r.max_length {
                rules.push(format!("max={max}"));
            }
        }
        if let Some(pattern) = r.pattern.as_deref() {
            if !pattern.is_empty() {
                // The tag ends up inside a Go string literal, so a literal
                // backslash has to be doubled to survive the round trip
                // through the reflective tag reader.
                rules.push(format!("matches=^({})$", pattern.replace('\\', "\\\\")));
            }
        }
        if !r.enumeration.is_empty() && !has_whitespace(&r.enumeration) {
            rules.push(format!("oneof={}", r.enumeration.join(" ")));
        }
    }
    if builtins::is_go_numeric(base) {
        if let Some(min) = r.min {
            let op = if min.exclusive { "gt" } else { "gte" };
            rules.push(format!("{op}={}", go_float(min.value)));
        }
        if let Some(max) = r.max {
            let op = if max.exclusive { "lt" } else { "lte" };
            rules.push(format!("{op}={}", go_float(max.value)));
        }
    }
    if rules.is_empty() || (rules.len() == 1 && optional) {
        return String::new();
    }
    if plural {
        rules.insert(0, "dive".to_owned());
    }
    rules.join(",")
}

/// Shortest decimal rendering, matching Go's `%g` for the values facets
/// carry.
pub(super) fn go_float(value: f64) -> String {
    format!("{value}")
}

fn has_whitespace(values: &[String]) -> bool {
    values
        .iter()
        .any(|v| v.contains([' ', '\t', '\n', '\r']))
}
