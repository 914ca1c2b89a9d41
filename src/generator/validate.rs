//! Method-form validators.
//!
//! For every restricted named simple type, and for every complex type with
//! at least one restricted field, a Go `Validate() error` method is emitted
//! that enforces the same rules the declarative tags describe.

use super::CodeGenerator;
use crate::xsd::builtins;
use crate::xsd::proto::Restriction;

/// One complex-type field whose effective restriction has enforceable
/// rules, collected while the struct body is emitted.
pub(super) struct FieldCheck {
    /// Go field name, `Attr` suffix included for attributes.
    pub name: String,
    /// Resolved primitive base the rules are checked against.
    pub base: String,
    pub optional: bool,
    pub plural: bool,
    pub restriction: Restriction,
}

impl CodeGenerator<'_> {
    /// Emits a `Validate` method for a named simple type. Nothing is
    /// emitted when the restriction has no rules.
    pub(super) fn emit_simple_type_validator(
        &mut self,
        type_name: &str,
        base: &str,
        r: &Restriction,
    ) {
        if !r.has_rules() {
            return;
        }
        let checks = self.restriction_checks("v", base, type_name, r);
        if checks.is_empty() {
            return;
        }
        self.body.push_str("\nfunc (v ");
        self.body.push_str(type_name);
        self.body.push_str(") Validate() error {\n");
        self.body.push_str(&checks);
        self.body.push_str("\treturn nil\n}\n");
    }

    /// Emits a `Validate` method for a complex type. The receiver is a
    /// pointer and an empty receiver validates successfully. The first
    /// failing field aborts the walk.
    pub(super) fn emit_complex_type_validator(&mut self, type_name: &str, checks: &[FieldCheck]) {
        if checks.is_empty() {
            return;
        }
        self.import_fmt = true;
        let mut b = String::new();
        b.push_str("\nfunc (m *");
        b.push_str(type_name);
        b.push_str(") Validate() error {\n");
        b.push_str("\tif m == nil { return nil }\n");
        for check in checks {
            if check.plural {
                b.push_str(&format!("\tfor _, it := range m.{} {{\n", check.name));
                b.push_str(&self.restriction_checks("it", &check.base, &check.name, &check.restriction));
                b.push_str("\t}\n");
            } else if check.optional {
                b.push_str(&format!("\tif m.{} != nil {{\n", check.name));
                let expr = format!("*m.{}", check.name);
                b.push_str(&self.restriction_checks(&expr, &check.base, &check.name, &check.restriction));
                b.push_str("\t}\n");
            } else {
                let expr = format!("m.{}", check.name);
                b.push_str(&self.restriction_checks(&expr, &check.base, &check.name, &check.restriction));
            }
        }
        b.push_str("\treturn nil\n}\n");
        self.body.push_str(&b);
    }

    /// Generates the Go statements that enforce `r` against the expression
    /// `expr`, whose resolved primitive base is `base`. `subject` names the
    /// checked value in failure messages.
    fn restriction_checks(&mut self, expr: &str, base: &str, subject: &str, r: &Restriction) -> String {
        let mut b = String::new();
        if base == "string" {
            if let Some(length) = r.length {
                b.push_str(&format!(
                    "\tif len(string({expr})) != {length} {{ return fmt.Errorf(\"{subject} length must be exactly {length}\") }}\n"
                ));
            } else {
                if let Some(min) = r.min_length {
                    b.push_str(&format!(
                        "\tif len(string({expr})) < {min} {{ return fmt.Errorf(\"{subject} length must be >= {min}\") }}\n"
                    ));
                }
                if let Some(max) = r.max_length {
                    b.push_str(&format!(
                        "\tif len(string({expr})) > {max} {{ return fmt.Errorf(\"{subject} length must be <= {max}\") }}\n"
                    ));
                }
            }
            if let Some(pattern) = r.pattern.as_deref() {
                if !pattern.is_empty() {
                    self.import_regexp = true;
                    // The raw pattern is anchored here, at emission time;
                    // the generated code compiles it as-is.
                    let anchored = go_quote(&format!("^{pattern}$"));
                    b.push_str(&format!(
                        "\tif ok := regexp.MustCompile({anchored}).MatchString(string({expr})); !ok {{ return fmt.Errorf(\"{subject} does not match pattern: %q\", {anchored}) }}\n"
                    ));
                }
            }
            if !r.enumeration.is_empty() {
                b.push_str("\t{\n\t\tallowed := map[string]struct{}{\n");
                for value in &r.enumeration {
                    b.push_str(&format!("\t\t\t{}: {{}},\n", go_quote(value)));
                }
                b.push_str("\t\t}\n");
                b.push_str(&format!(
                    "\t\tif _, ok := allowed[string({expr})]; !ok {{ return fmt.Errorf(\"{subject} must be one of enum values\") }}\n\t}}\n"
                ));
            }
        }
        if builtins::is_go_numeric(base) && (r.min.is_some() || r.max.is_some()) {
            // Scoped so that several numeric fields in one method do not
            // collide on the coercion variable.
            b.push_str(&format!("\t{{\n\t\tvv := float64({expr})\n"));
            if let Some(min) = r.min {
                let value = super::tags::go_float(min.value);
                if min.exclusive {
                    b.push_str(&format!(
                        "\t\tif vv <= {value} {{ return fmt.Errorf(\"{subject} must be > {value}\") }}\n"
                    ));
                } else {
                    b.push_str(&format!(
                        "\t\tif vv < {value} {{ return fmt.Errorf(\"{subject} must be >= {value}\") }}\n"
                    ));
                }
            }
            if let Some(max) = r.max {
                let value = super::tags::go_float(max.value);
                if max.exclusive {
                    b.push_str(&format!(
                        "\t\tif vv >= {value} {{ return fmt.Errorf(\"{subject} must be < {value}\") }}\n"
                    ));
                } else {
                    b.push_str(&format!(
                        "\t\tif vv > {value} {{ return fmt.Errorf(\"{subject} must be <= {value}\") }}\n"
                    ));
                }
            }
            b.push_str("\t}\n");
        }
        if !b.is_empty() {
            self.import_fmt = true;
        }
        b
    }
}

/// Quotes a string as a Go interpreted string literal.
fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_quote_escapes_backslashes_and_quotes() {
        assert_eq!(go_quote(r"^\d{2}$"), r#""^\\d{2}$""#);
        assert_eq!(go_quote("say \"hi\""), r#""say \"hi\"""#);
        assert_eq!(go_quote("plain"), "\"plain\"");
    }
}
