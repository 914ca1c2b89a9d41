//! Identifier derivation for the emitted Go declarations.

use crate::xsd::builtins;

/// Canonical capitalization of a schema name: the name is split on the
/// characters XSD composes names with and the first rune of every word is
/// upper-cased. `crew-start.time` becomes `CrewStartTime`.
pub fn go_name(name: &str) -> String {
    name.split([':', '.', '-', '_'])
        .filter(|word| !word.is_empty())
        .map(first_upper)
        .collect()
}

/// Maps a resolved base onto the Go type used in a field position. Native
/// types pass through; named types are capitalized and referenced through a
/// pointer; an empty name degrades to `interface{}`.
pub fn go_field_type(name: &str) -> String {
    if builtins::is_go_native(name) {
        return name.to_owned();
    }
    let ident = go_name(name);
    if ident.is_empty() {
        "interface{}".to_owned()
    } else {
        format!("*{ident}")
    }
}

/// Lowers the first rune, mirroring the schema convention of lower-camel
/// type names (`TStateCode` becomes `tStateCode`).
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn first_upper(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_name_splits_on_schema_separators() {
        assert_eq!(go_name("crew-start.time"), "CrewStartTime");
        assert_eq!(go_name("xs:dateTime"), "XsDateTime");
        assert_eq!(go_name("tState_code"), "TStateCode");
        assert_eq!(go_name(""), "");
    }

    #[test]
    fn go_name_keeps_interior_capitalization() {
        assert_eq!(go_name("crewStartTime"), "CrewStartTime");
        assert_eq!(go_name("TSendingType"), "TSendingType");
    }

    #[test]
    fn go_field_type_passes_native_types_through() {
        assert_eq!(go_field_type("string"), "string");
        assert_eq!(go_field_type("[]byte"), "[]byte");
        assert_eq!(go_field_type("time.Time"), "time.Time");
    }

    #[test]
    fn go_field_type_points_at_named_types() {
        assert_eq!(go_field_type("tStateCode"), "*TStateCode");
        assert_eq!(go_field_type(""), "interface{}");
    }

    #[test]
    fn lower_first_reverses_capitalization() {
        assert_eq!(lower_first("TStateCode"), "tStateCode");
        assert_eq!(lower_first(""), "");
    }
}
