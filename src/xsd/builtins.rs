use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use crate::cli::Language;

lazy_static! {
    /// XSD built-in type names mapped to the Go type each one is emitted as.
    static ref GO_BUILD_IN: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("anyType", "string");
        m.insert("anySimpleType", "string");
        m.insert("anyURI", "string");
        m.insert("base64Binary", "[]byte");
        m.insert("boolean", "bool");
        m.insert("byte", "int8");
        m.insert("date", "time.Time");
        m.insert("dateTime", "time.Time");
        m.insert("decimal", "float64");
        m.insert("double", "float64");
        m.insert("duration", "string");
        m.insert("ENTITIES", "[]string");
        m.insert("ENTITY", "string");
        m.insert("float", "float32");
        m.insert("gDay", "time.Time");
        m.insert("gMonth", "time.Time");
        m.insert("gMonthDay", "time.Time");
        m.insert("gYear", "time.Time");
        m.insert("gYearMonth", "time.Time");
        m.insert("hexBinary", "[]byte");
        m.insert("ID", "string");
        m.insert("IDREF", "string");
        m.insert("IDREFS", "[]string");
        m.insert("int", "int");
        m.insert("integer", "int");
        m.insert("language", "string");
        m.insert("long", "int64");
        m.insert("Name", "string");
        m.insert("NCName", "string");
        m.insert("negativeInteger", "int");
        m.insert("NMTOKEN", "string");
        m.insert("NMTOKENS", "[]string");
        m.insert("nonNegativeInteger", "int");
        m.insert("nonPositiveInteger", "int");
        m.insert("normalizedString", "string");
        m.insert("NOTATION", "string");
        m.insert("positiveInteger", "int");
        m.insert("QName", "xml.Name");
        m.insert("short", "int16");
        m.insert("string", "string");
        m.insert("time", "time.Time");
        m.insert("token", "string");
        m.insert("unsignedByte", "uint8");
        m.insert("unsignedInt", "uint32");
        m.insert("unsignedLong", "uint64");
        m.insert("unsignedShort", "uint16");
        m
    };

    /// Type names that are native in emitted Go code and must never be
    /// capitalized, aliased or pointered-over by name derivation.
    static ref GO_NATIVE: HashSet<&'static str> = [
        "xml.Name",
        "byte",
        "[]byte",
        "bool",
        "[]bool",
        "complex64",
        "complex128",
        "float32",
        "float64",
        "int",
        "int8",
        "int16",
        "int32",
        "int64",
        "interface",
        "[]interface{}",
        "string",
        "[]string",
        "time.Time",
        "uint",
        "uint8",
        "uint16",
        "uint32",
        "uint64",
    ]
    .into_iter()
    .collect();

    /// Go types whose restriction rules are numeric comparisons.
    static ref GO_NUMERIC: HashSet<&'static str> = [
        "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32", "uint64",
        "float32", "float64",
    ]
    .into_iter()
    .collect();
}

/// Looks up the target primitive for an XSD built-in type name.
pub fn target_type(lang: Language, name: &str) -> Option<&'static str> {
    match lang {
        Language::Go => GO_BUILD_IN.get(name).copied(),
    }
}

pub fn is_go_native(name: &str) -> bool {
    GO_NATIVE.contains(name)
}

pub fn is_go_numeric(name: &str) -> bool {
    GO_NUMERIC.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_maps_core_primitives() {
        assert_eq!(target_type(Language::Go, "string"), Some("string"));
        assert_eq!(target_type(Language::Go, "dateTime"), Some("time.Time"));
        assert_eq!(target_type(Language::Go, "unsignedShort"), Some("uint16"));
        assert_eq!(target_type(Language::Go, "tStateCode"), None);
    }

    #[test]
    fn numeric_set_excludes_strings() {
        assert!(is_go_numeric("float64"));
        assert!(is_go_numeric("uint8"));
        assert!(!is_go_numeric("string"));
        assert!(!is_go_numeric("[]byte"));
    }
}
