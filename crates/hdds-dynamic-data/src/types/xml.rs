// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML type file loader.
//!
//! Reads Connext-style `<types>` documents and registers every struct,
//! enum, union and typedef they declare into a [`TypeRegistry`].
//!
//! ```xml
//! <types>
//!   <module name="Geo">
//!     <struct name="Point">
//!       <member name="x" type="int32"/>
//!       <member name="tags" type="string" stringMaxLength="16" sequenceMaxLength="4"/>
//!     </struct>
//!   </module>
//! </types>
//! ```
//!
//! Types are registered under their scoped name (`Geo::Point`). References
//! through `nonBasicTypeName` are resolved from the innermost module scope
//! outwards, against types declared earlier in the document or already
//! present in the registry.

use crate::types::{
    EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKind,
    TypeRegistry, UnionCase, UnionDescriptor,
};
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading XML type files.
#[derive(Debug, Error)]
pub enum TypeLoadError {
    #[error("Failed to read type file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("No <types> element found")]
    MissingTypes,

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("Unresolved type reference '{0}'")]
    UnresolvedType(String),
}

type LoadResult<T> = std::result::Result<T, TypeLoadError>;

/// Loads XML type definitions into a registry.
pub struct XmlTypeLoader<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> XmlTypeLoader<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Load a type file. Returns the scoped names registered, in document order.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> LoadResult<Vec<String>> {
        let path = path.as_ref();
        log::debug!("[xml-types] loading {}", path.display());
        let content = fs::read_to_string(path)?;
        self.load_str(&content)
    }

    /// Load type definitions from an XML string.
    pub fn load_str(&self, xml: &str) -> LoadResult<Vec<String>> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();
        let types = if root.tag_name().name() == "types" {
            root
        } else {
            root.descendants()
                .find(|n| n.tag_name().name() == "types")
                .ok_or(TypeLoadError::MissingTypes)?
        };

        let mut loaded = Vec::new();
        let mut scope = Vec::new();
        self.load_scope(types, &mut scope, &mut loaded)?;
        log::debug!("[xml-types] registered {} types", loaded.len());
        Ok(loaded)
    }

    fn load_scope(
        &self,
        parent: Node<'_, '_>,
        scope: &mut Vec<String>,
        loaded: &mut Vec<String>,
    ) -> LoadResult<()> {
        for node in parent.children().filter(Node::is_element) {
            let desc = match node.tag_name().name() {
                "module" => {
                    scope.push(required(node, "name")?.to_string());
                    let result = self.load_scope(node, scope, loaded);
                    scope.pop();
                    result?;
                    continue;
                }
                "struct" => self.parse_struct(node, scope)?,
                "enum" => parse_enum(node, scope)?,
                "union" => self.parse_union(node, scope)?,
                "typedef" => {
                    let name = scoped_name(scope, required(node, "name")?);
                    let target = self.member_type(node, scope)?;
                    TypeDescriptor::alias(name, target)
                }
                other => {
                    log::warn!("[xml-types] ignoring unsupported element <{}>", other);
                    continue;
                }
            };
            let name = desc.name.clone();
            self.registry.register(Arc::new(desc));
            loaded.push(name);
        }
        Ok(())
    }

    fn parse_struct(&self, node: Node<'_, '_>, scope: &[String]) -> LoadResult<TypeDescriptor> {
        let name = scoped_name(scope, required(node, "name")?);
        let mut fields = Vec::new();
        for member in node.children().filter(Node::is_element) {
            if member.tag_name().name() != "member" {
                log::warn!(
                    "[xml-types] {}: ignoring <{}>",
                    name,
                    member.tag_name().name()
                );
                continue;
            }
            let mut field =
                FieldDescriptor::new(required(member, "name")?, self.member_type(member, scope)?);
            if flag(member, "key")? {
                field = field.key();
            }
            if flag(member, "optional")? {
                field = field.optional();
            }
            if let Some(id) = member.attribute("id") {
                field = field.with_id(parse_number(member, "id", id)?);
            }
            fields.push(field);
        }
        Ok(TypeDescriptor::struct_type(name, fields))
    }

    fn parse_union(&self, node: Node<'_, '_>, scope: &[String]) -> LoadResult<TypeDescriptor> {
        let name = scoped_name(scope, required(node, "name")?);
        let disc_node = node
            .children()
            .find(|n| n.tag_name().name() == "discriminator")
            .ok_or_else(|| TypeLoadError::MissingAttribute {
                element: "union".into(),
                attribute: "discriminator".into(),
            })?;
        let discriminator = self.member_type(disc_node, scope)?;

        let mut cases = Vec::new();
        let mut default_case = None;
        for case in node.children().filter(|n| n.tag_name().name() == "case") {
            let member = case
                .children()
                .find(|n| n.tag_name().name() == "member")
                .ok_or_else(|| TypeLoadError::MissingAttribute {
                    element: "case".into(),
                    attribute: "member".into(),
                })?;
            let case_name = required(member, "name")?;
            let case_type = self.member_type(member, scope)?;

            let mut labels = Vec::new();
            let mut is_default = false;
            for label in case
                .children()
                .filter(|n| n.tag_name().name() == "caseDiscriminator")
            {
                let value = required(label, "value")?;
                if value == "default" {
                    is_default = true;
                } else {
                    labels.push(parse_label(label, value, &discriminator)?);
                }
            }

            if is_default && labels.is_empty() {
                default_case = Some(UnionCase::new(case_name, labels, case_type));
            } else {
                cases.push(UnionCase::new(case_name, labels, case_type));
            }
        }

        let mut union_desc = UnionDescriptor::new(discriminator, cases);
        if let Some(default) = default_case {
            union_desc = union_desc.with_default(default);
        }
        Ok(TypeDescriptor::new(name, TypeKind::Union(union_desc)))
    }

    /// Type of a `<member>`, `<typedef>` or `<discriminator>`, with its
    /// sequence and array wrappers applied.
    fn member_type(&self, node: Node<'_, '_>, scope: &[String]) -> LoadResult<Arc<TypeDescriptor>> {
        let type_name = required(node, "type")?;
        let mut desc = match basic_kind(node, type_name)? {
            Some(kind) => Arc::new(TypeDescriptor::primitive(type_name, kind)),
            None => {
                let reference = if type_name == "nonBasic" {
                    required(node, "nonBasicTypeName")?
                } else {
                    type_name
                };
                self.lookup(scope, reference)
                    .ok_or_else(|| TypeLoadError::UnresolvedType(reference.to_string()))?
            }
        };

        if let Some(max) = node.attribute("sequenceMaxLength") {
            desc = if max.trim() == "-1" {
                Arc::new(TypeDescriptor::sequence(desc))
            } else {
                let max = parse_number(node, "sequenceMaxLength", max)?;
                Arc::new(TypeDescriptor::bounded_sequence(desc, max))
            };
        }

        if let Some(dims) = node.attribute("arrayDimensions") {
            let dimensions = dims
                .split(',')
                .map(|d| parse_number(node, "arrayDimensions", d))
                .collect::<LoadResult<Vec<usize>>>()?;
            desc = Arc::new(TypeDescriptor::array(desc, dimensions));
        }

        Ok(desc)
    }

    fn lookup(&self, scope: &[String], name: &str) -> Option<Arc<TypeDescriptor>> {
        let name = name.trim_start_matches("::");
        (0..=scope.len()).rev().find_map(|depth| {
            let candidate = if depth == 0 {
                name.to_string()
            } else {
                format!("{}::{}", scope[..depth].join("::"), name)
            };
            self.registry.get(&candidate)
        })
    }
}

fn parse_enum(node: Node<'_, '_>, scope: &[String]) -> LoadResult<TypeDescriptor> {
    let name = scoped_name(scope, required(node, "name")?);
    let mut variants = Vec::new();
    let mut next = 0i32;
    for e in node
        .children()
        .filter(|n| n.tag_name().name() == "enumerator")
    {
        let value = match e.attribute("value") {
            Some(v) => parse_number(e, "value", v)?,
            None => next,
        };
        variants.push(EnumVariant::new(required(e, "name")?, value));
        next = value.wrapping_add(1);
    }
    Ok(TypeDescriptor::new(
        name,
        TypeKind::Enum(EnumDescriptor::new(variants)),
    ))
}

fn basic_kind(node: Node<'_, '_>, type_name: &str) -> LoadResult<Option<PrimitiveKind>> {
    let max_length = node
        .attribute("stringMaxLength")
        .filter(|v| v.trim() != "-1")
        .map(|v| parse_number(node, "stringMaxLength", v))
        .transpose()?;

    let kind = match type_name {
        "boolean" => PrimitiveKind::Bool,
        "char8" | "char" => PrimitiveKind::Char,
        "char16" | "wchar" => PrimitiveKind::WChar,
        "octet" | "byte" | "uint8" => PrimitiveKind::U8,
        "int8" => PrimitiveKind::I8,
        "int16" | "short" => PrimitiveKind::I16,
        "uint16" | "unsignedShort" => PrimitiveKind::U16,
        "int32" | "long" => PrimitiveKind::I32,
        "uint32" | "unsignedLong" => PrimitiveKind::U32,
        "int64" | "longLong" => PrimitiveKind::I64,
        "uint64" | "unsignedLongLong" => PrimitiveKind::U64,
        "float32" | "float" => PrimitiveKind::F32,
        "float64" | "double" => PrimitiveKind::F64,
        "float128" | "longDouble" => PrimitiveKind::LongDouble,
        "string" => PrimitiveKind::String { max_length },
        "wstring" => PrimitiveKind::WString { max_length },
        _ => return Ok(None),
    };
    Ok(Some(kind))
}

fn parse_label(
    node: Node<'_, '_>,
    value: &str,
    discriminator: &TypeDescriptor,
) -> LoadResult<i64> {
    let value = value.trim();
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    match value {
        "true" => return Ok(1),
        "false" => return Ok(0),
        _ => {}
    }
    let enumerator = value.rsplit("::").next().unwrap_or(value);
    discriminator
        .enumeration()
        .and_then(|e| e.variant(enumerator))
        .map(|v| i64::from(v.value))
        .ok_or_else(|| invalid(node, "value", value))
}

fn scoped_name(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", scope.join("::"), name)
    }
}

fn required<'a>(node: Node<'a, '_>, attribute: &str) -> LoadResult<&'a str> {
    node.attribute(attribute)
        .ok_or_else(|| TypeLoadError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

fn flag(node: Node<'_, '_>, attribute: &str) -> LoadResult<bool> {
    match node.attribute(attribute) {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(invalid(node, attribute, other)),
    }
}

fn parse_number<T: std::str::FromStr>(
    node: Node<'_, '_>,
    attribute: &str,
    value: &str,
) -> LoadResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(node, attribute, value))
}

fn invalid(node: Node<'_, '_>, attribute: &str, value: &str) -> TypeLoadError {
    TypeLoadError::InvalidAttribute {
        element: node.tag_name().name().to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemberKind;
    use std::io::Write;

    const SHAPES: &str = r#"<?xml version="1.0"?>
<dds>
  <types>
    <module name="Geo">
      <enum name="Color">
        <enumerator name="RED"/>
        <enumerator name="GREEN"/>
        <enumerator name="BLUE" value="10"/>
      </enum>
      <typedef name="Meters" type="float64"/>
      <struct name="Shape">
        <member name="id" type="uint32" key="true"/>
        <member name="color" type="nonBasic" nonBasicTypeName="Color"/>
        <member name="size" type="nonBasic" nonBasicTypeName="Meters" optional="true"/>
        <member name="grid" type="int16" arrayDimensions="3,4"/>
        <member name="tags" type="string" stringMaxLength="8" sequenceMaxLength="5"/>
      </struct>
      <union name="Payload">
        <discriminator type="nonBasic" nonBasicTypeName="Color"/>
        <case>
          <caseDiscriminator value="RED"/>
          <caseDiscriminator value="GREEN"/>
          <member name="count" type="int32"/>
        </case>
        <case>
          <caseDiscriminator value="default"/>
          <member name="label" type="string"/>
        </case>
      </union>
    </module>
  </types>
</dds>"#;

    #[test]
    fn test_load_module_types() {
        let registry = TypeRegistry::new();
        let loaded = XmlTypeLoader::new(&registry)
            .load_str(SHAPES)
            .expect("load");
        assert_eq!(
            loaded,
            vec!["Geo::Color", "Geo::Meters", "Geo::Shape", "Geo::Payload"]
        );

        let shape = registry.get("Geo::Shape").expect("shape");
        let fields = shape.fields().expect("struct");
        assert_eq!(fields.len(), 5);
        assert!(fields[0].key);
        assert_eq!(fields[1].type_desc.member_kind(), MemberKind::Enum);
        assert!(fields[2].optional);
        assert_eq!(fields[2].type_desc.kind_tag(), MemberKind::Alias);
        assert_eq!(fields[2].type_desc.member_kind(), MemberKind::Float64);

        match &fields[3].type_desc.kind {
            TypeKind::Array(arr) => assert_eq!(arr.dimensions, vec![3, 4]),
            other => panic!("expected array, got {:?}", other),
        }
        match &fields[4].type_desc.kind {
            TypeKind::Sequence(seq) => {
                assert_eq!(seq.max_length, Some(5));
                assert!(matches!(
                    seq.element_type.kind,
                    TypeKind::Primitive(PrimitiveKind::String {
                        max_length: Some(8)
                    })
                ));
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_union_labels_from_enum() {
        let registry = TypeRegistry::new();
        XmlTypeLoader::new(&registry)
            .load_str(SHAPES)
            .expect("load");
        let payload = registry.get("Geo::Payload").expect("union");
        let u = payload.union_desc().expect("union desc");
        assert_eq!(u.cases[0].labels, vec![0, 1]);
        assert_eq!(u.case_by_discriminator(10).map(|c| c.name.as_str()), Some("label"));
    }

    #[test]
    fn test_unresolved_reference() {
        let registry = TypeRegistry::new();
        let xml = r#"<types><struct name="A">
            <member name="b" type="nonBasic" nonBasicTypeName="Missing"/>
        </struct></types>"#;
        let err = XmlTypeLoader::new(&registry)
            .load_str(xml)
            .expect_err("unresolved");
        assert!(matches!(err, TypeLoadError::UnresolvedType(ref n) if n == "Missing"));
    }

    #[test]
    fn test_invalid_attribute() {
        let registry = TypeRegistry::new();
        let xml = r#"<types><struct name="A">
            <member name="b" type="int32" arrayDimensions="3,x"/>
        </struct></types>"#;
        let err = XmlTypeLoader::new(&registry)
            .load_str(xml)
            .expect_err("invalid");
        assert!(matches!(err, TypeLoadError::InvalidAttribute { .. }));
        assert!(err.to_string().contains("arrayDimensions"));
    }

    #[test]
    fn test_missing_types_element() {
        let registry = TypeRegistry::new();
        let err = XmlTypeLoader::new(&registry)
            .load_str("<dds/>")
            .expect_err("no types");
        assert!(matches!(err, TypeLoadError::MissingTypes));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(SHAPES.as_bytes()).expect("write");

        let registry = TypeRegistry::new();
        let loaded = XmlTypeLoader::new(&registry)
            .load_file(file.path())
            .expect("load file");
        assert_eq!(loaded.len(), 4);
        assert!(registry.contains("Geo::Color"));
    }
}
