//! End-to-end tests: schema text in, Go source text out.

use xsdgen::cli::Language;
use xsdgen::generator::CodeGenerator;
use xsdgen::xsd::parse_document;

fn generate(schema: &str, file: &str) -> String {
    generate_opts(schema, file, false)
}

fn generate_opts(schema: &str, file: &str, omit_xmlname: bool) -> String {
    let doc = roxmltree::Document::parse(schema).unwrap();
    let tree = parse_document(&doc, Language::Go).unwrap();
    let mut generator = CodeGenerator::new(Language::Go, "schema", file, omit_xmlname, &tree);
    generator.generate()
}

#[test]
fn state_code_enum_and_length() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="TStateCode">
                <xs:restriction base="xs:string">
                    <xs:length value="2"/>
                    <xs:enumeration value="AA"/>
                    <xs:enumeration value="BB"/>
                </xs:restriction>
            </xs:simpleType>
            <xs:complexType name="tCar">
                <xs:attribute name="state" type="TStateCode"/>
            </xs:complexType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(source.contains("type TStateCode string"));
    assert!(source.contains("func (v TStateCode) Validate() error"));
    assert!(source.contains("if len(string(v)) != 2"));
    assert!(source.contains("\"AA\": {},"));
    assert!(source.contains("\"BB\": {},"));
    // The field keeps the domain type and inherits the facet tag.
    assert!(source.contains("\tStateAttr\tTStateCode\t`xml:\"state,attr\" validate:\"len=2,oneof=AA BB\"`"));
}

#[test]
fn patterns_are_anchored_in_both_forms() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tDate">
                <xs:restriction base="xs:string">
                    <xs:pattern value="[0-9]{2}\.[0-9]{2}\.[0-9]{4}"/>
                </xs:restriction>
            </xs:simpleType>
            <xs:complexType name="tTrip">
                <xs:sequence>
                    <xs:element name="start" type="tDate"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#,
        "out.go",
    );
    // Tag form: anchored, backslashes doubled for the tag reader.
    assert!(source.contains(r"matches=^([0-9]{2}\\.[0-9]{2}\\.[0-9]{4})$"));
    // Method form: anchored raw pattern in a Go string literal.
    assert!(source.contains(r#"regexp.MustCompile("^[0-9]{2}\\.[0-9]{2}\\.[0-9]{4}$")"#));
    assert!(source.contains("\t\"regexp\"\n"));
    assert!(source.contains("\t\"fmt\"\n"));
}

#[test]
fn optional_attribute_with_inline_restriction() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="tDriver">
                <xs:attribute name="code" use="optional">
                    <xs:simpleType>
                        <xs:restriction base="xs:string">
                            <xs:minLength value="1"/>
                        </xs:restriction>
                    </xs:simpleType>
                </xs:attribute>
            </xs:complexType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(source.contains("\tCodeAttr\t*string\t`xml:\"code,attr\" validate:\"omitempty,min=1\"`"));
    assert!(source.contains("func (m *TDriver) Validate() error"));
    assert!(source.contains("if m == nil { return nil }"));
    // The optional field is only dereferenced behind a nil guard.
    assert!(source.contains("if m.CodeAttr != nil {"));
    assert!(source.contains("len(string(*m.CodeAttr)) < 1"));
}

#[test]
fn named_simple_types_survive_as_domain_types() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tDateTime">
                <xs:restriction base="xs:string">
                    <xs:pattern value="[0-9]{2}:[0-9]{2}"/>
                </xs:restriction>
            </xs:simpleType>
            <xs:complexType name="tDuty">
                <xs:sequence>
                    <xs:element name="crewStartTime" type="tDateTime"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(source.contains("type TDateTime string"));
    // Not degraded to a plain string field.
    assert!(source.contains("\tCrewStartTime\tTDateTime\t"));
    // The named type's restriction is projected onto the field tag.
    assert!(source.contains("validate:\"matches=^([0-9]{2}:[0-9]{2})$\""));
}

#[test]
fn numeric_bounds_respect_exclusivity() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tPercent">
                <xs:restriction base="xs:integer">
                    <xs:minExclusive value="0"/>
                    <xs:maxInclusive value="100"/>
                </xs:restriction>
            </xs:simpleType>
            <xs:complexType name="tLoad">
                <xs:sequence>
                    <xs:element name="load" type="tPercent"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(source.contains("type TPercent int"));
    assert!(source.contains("vv := float64(v)"));
    assert!(source.contains("if vv <= 0 { return fmt.Errorf(\"TPercent must be > 0\") }"));
    assert!(source.contains("if vv > 100 { return fmt.Errorf(\"TPercent must be <= 100\") }"));
    assert!(source.contains("validate:\"gt=0,lte=100\""));
}

#[test]
fn safety_net_is_scoped_to_the_common_output() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:complexType name="tWagon">
            <xs:sequence>
                <xs:element name="kind" type="tUnknown"/>
            </xs:sequence>
        </xs:complexType>
    </xs:schema>"#;

    let common = generate(schema, "commonTypes.go");
    assert!(common.contains("type TUnknown string"));

    let other = generate(schema, "wagon.go");
    assert!(!other.contains("type TUnknown string"));
    // The unresolved reference is left as-is.
    assert!(other.contains("*TUnknown"));
}

#[test]
fn sending_type_placeholders_in_train_operation_output() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:complexType name="tMessage">
            <xs:sequence>
                <xs:element name="sending" type="tSendingType"/>
            </xs:sequence>
        </xs:complexType>
    </xs:schema>"#;

    let source = generate(schema, "trainOperation.go");
    assert!(source.contains("type TSendingType int"));

    let other = generate(schema, "wagon.go");
    assert!(!other.contains("type TSendingType int"));
}

#[test]
fn optionality_and_plurality_wrapping() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="tCrew">
                <xs:sequence>
                    <xs:element name="lead" type="xs:string"/>
                    <xs:element name="backup" type="xs:string" minOccurs="0"/>
                    <xs:element name="member" type="xs:string" maxOccurs="unbounded"/>
                    <xs:element name="tag" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(source.contains("\tLead\tstring\t`xml:\"lead\"`"));
    assert!(source.contains("\tBackup\t*string\t`xml:\"backup,omitempty\"`"));
    assert!(source.contains("\tMember\t[]string\t`xml:\"member\"`"));
    // Plural and optional: a sequence only, never a pointer to one.
    assert!(source.contains("\tTag\t[]string\t`xml:\"tag,omitempty\"`"));
    assert!(!source.contains("*[]"));
}

#[test]
fn plural_fields_dive_into_their_items() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tCode">
                <xs:restriction base="xs:string">
                    <xs:minLength value="1"/>
                </xs:restriction>
            </xs:simpleType>
            <xs:complexType name="tBox">
                <xs:sequence>
                    <xs:element name="code" type="tCode" minOccurs="0" maxOccurs="unbounded"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(source.contains("validate:\"dive,omitempty,min=1\""));
    assert!(source.contains("for _, it := range m.Code {"));
    assert!(source.contains("len(string(it)) < 1"));
}

#[test]
fn whitespace_enums_lose_the_tag_but_keep_the_method() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tState">
                <xs:restriction base="xs:string">
                    <xs:enumeration value="OK"/>
                    <xs:enumeration value="NOT OK"/>
                </xs:restriction>
            </xs:simpleType>
            <xs:complexType name="tCheck">
                <xs:sequence>
                    <xs:element name="state" type="tState"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(!source.contains("oneof="));
    assert!(source.contains("\"NOT OK\": {},"));
    assert!(source.contains("func (v TState) Validate() error"));
}

#[test]
fn union_types_become_member_structs() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tCode">
                <xs:restriction base="xs:string"/>
            </xs:simpleType>
            <xs:simpleType name="tCodeOrNumber">
                <xs:union memberTypes="tCode xs:integer"/>
            </xs:simpleType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(source.contains("type TCodeOrNumber struct {"));
    assert!(source.contains("\tTCode\tstring\n"));
    assert!(source.contains("\tInteger\tint\n"));
}

#[test]
fn list_types_become_slices() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tNumbers">
                <xs:list itemType="xs:integer"/>
            </xs:simpleType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(source.contains("type TNumbers []int"));
}

#[test]
fn xmlname_annotation_follows_the_flag() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:complexType name="tDriver">
            <xs:attribute name="id" type="xs:string"/>
        </xs:complexType>
    </xs:schema>"#;

    let annotated = generate(schema, "out.go");
    assert!(annotated.contains("\tXMLName\txml.Name\t`xml:\"tDriver\"`"));
    assert!(annotated.contains("\t\"encoding/xml\"\n"));

    let bare = generate_opts(schema, "out.go", true);
    assert!(!bare.contains("XMLName"));
}

#[test]
fn header_package_and_conditional_imports() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tName">
                <xs:restriction base="xs:string"/>
            </xs:simpleType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(source.starts_with("// Code generated by xsdgen. DO NOT EDIT."));
    assert!(source.contains("\npackage schema\n"));
    // Nothing here needs any import.
    assert!(!source.contains("import ("));

    let timed = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tWhen">
                <xs:restriction base="xs:dateTime"/>
            </xs:simpleType>
        </xs:schema>"#,
        "out.go",
    );
    assert!(timed.contains("type TWhen time.Time"));
    assert!(timed.contains("\t\"time\"\n"));
}

#[test]
fn emission_is_idempotent() {
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:simpleType name="tCode">
            <xs:restriction base="xs:string">
                <xs:length value="2"/>
            </xs:restriction>
        </xs:simpleType>
        <xs:complexType name="tCar">
            <xs:sequence>
                <xs:element name="code" type="tCode" maxOccurs="unbounded"/>
            </xs:sequence>
        </xs:complexType>
    </xs:schema>"#;

    let doc = roxmltree::Document::parse(schema).unwrap();
    let tree = parse_document(&doc, Language::Go).unwrap();
    let mut generator = CodeGenerator::new(Language::Go, "schema", "commonTypes.go", false, &tree);
    let first = generator.generate();
    let second = generator.generate();
    assert_eq!(first, second);
}

#[test]
fn every_named_simple_type_is_declared_exactly_once() {
    let source = generate(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="tCode">
                <xs:restriction base="xs:string"/>
            </xs:simpleType>
            <xs:simpleType name="crew-start.time">
                <xs:restriction base="xs:string"/>
            </xs:simpleType>
            <xs:complexType name="tCar">
                <xs:sequence>
                    <xs:element name="code" type="tCode"/>
                    <xs:element name="start" type="crew-start.time"/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>"#,
        "out.go",
    );
    assert_eq!(source.matches("type TCode string").count(), 1);
    // Canonical capitalization: split on :._- and title-case each word.
    assert_eq!(source.matches("type CrewStartTime string").count(), 1);
}
