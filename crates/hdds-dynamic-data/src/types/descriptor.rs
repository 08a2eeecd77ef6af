// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use std::fmt;
use std::sync::Arc;

/// Size in bytes of an IDL `long double` (float128) on the wire.
pub const LONG_DOUBLE_SIZE: usize = 16;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    LongDouble,
    Char,
    WChar,
    String { max_length: Option<usize> },
    WString { max_length: Option<usize> },
}

impl PrimitiveKind {
    /// Get the size in bytes (None for strings).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::I8 | Self::Char => Some(1),
            Self::U16 | Self::I16 | Self::WChar => Some(2),
            Self::U32 | Self::I32 | Self::F32 => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::LongDouble => Some(LONG_DOUBLE_SIZE),
            Self::String { .. } | Self::WString { .. } => None,
        }
    }

    /// Get CDR alignment requirement.
    pub fn alignment(&self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 | Self::Char => 1,
            Self::U16 | Self::I16 | Self::WChar => 2,
            Self::U32 | Self::I32 | Self::F32 | Self::String { .. } | Self::WString { .. } => 4,
            Self::U64 | Self::I64 | Self::F64 | Self::LongDouble => 8,
        }
    }

    /// Tag of this primitive.
    pub fn member_kind(&self) -> MemberKind {
        match self {
            Self::Bool => MemberKind::Boolean,
            Self::U8 => MemberKind::UInt8,
            Self::U16 => MemberKind::UInt16,
            Self::U32 => MemberKind::UInt32,
            Self::U64 => MemberKind::UInt64,
            Self::I8 => MemberKind::Int8,
            Self::I16 => MemberKind::Int16,
            Self::I32 => MemberKind::Int32,
            Self::I64 => MemberKind::Int64,
            Self::F32 => MemberKind::Float32,
            Self::F64 => MemberKind::Float64,
            Self::LongDouble => MemberKind::Float128,
            Self::Char => MemberKind::Char8,
            Self::WChar => MemberKind::Char16,
            Self::String { .. } => MemberKind::String,
            Self::WString { .. } => MemberKind::WString,
        }
    }

    /// Maximum length for bounded strings.
    pub fn max_length(&self) -> Option<usize> {
        match self {
            Self::String { max_length } | Self::WString { max_length } => *max_length,
            _ => None,
        }
    }
}

/// Flat tag over every kind a member can have.
///
/// Reported kinds are alias-resolved, so `Alias` only shows up from
/// [`TypeDescriptor::kind_tag`] on an alias descriptor itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Float128,
    Char8,
    Char16,
    String,
    WString,
    Enum,
    Alias,
    Array,
    Sequence,
    Struct,
    Union,
}

impl MemberKind {
    /// True for array and sequence kinds.
    pub fn is_collection(self) -> bool {
        matches!(self, Self::Array | Self::Sequence)
    }

    /// True for struct, union, array and sequence kinds.
    pub fn is_complex(self) -> bool {
        matches!(
            self,
            Self::Struct | Self::Union | Self::Array | Self::Sequence
        )
    }

    /// IDL-style name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Float128 => "float128",
            Self::Char8 => "char8",
            Self::Char16 => "char16",
            Self::String => "string",
            Self::WString => "wstring",
            Self::Enum => "enum",
            Self::Alias => "alias",
            Self::Array => "array",
            Self::Sequence => "sequence",
            Self::Struct => "struct",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Struct with named fields.
    Struct(Vec<FieldDescriptor>),
    /// Sequence (dynamic length).
    Sequence(SequenceDescriptor),
    /// Array (fixed, possibly multi-dimensional).
    Array(ArrayDescriptor),
    /// Enumeration.
    Enum(EnumDescriptor),
    /// Union with discriminator.
    Union(UnionDescriptor),
    /// Typedef of another type.
    Alias(Arc<TypeDescriptor>),
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a primitive type descriptor.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeKind::Primitive(kind))
    }

    /// Create a struct type descriptor.
    pub fn struct_type(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(fields))
    }

    /// Create an alias (typedef) of `target`.
    pub fn alias(name: impl Into<String>, target: Arc<TypeDescriptor>) -> Self {
        Self::new(name, TypeKind::Alias(target))
    }

    /// Create an unbounded sequence of `element_type`.
    pub fn sequence(element_type: Arc<TypeDescriptor>) -> Self {
        Self::new(
            format!("sequence<{}>", element_type.name),
            TypeKind::Sequence(SequenceDescriptor::unbounded(element_type)),
        )
    }

    /// Create a bounded sequence of `element_type`.
    pub fn bounded_sequence(element_type: Arc<TypeDescriptor>, max_length: usize) -> Self {
        Self::new(
            format!("sequence<{}, {}>", element_type.name, max_length),
            TypeKind::Sequence(SequenceDescriptor::bounded(element_type, max_length)),
        )
    }

    /// Create an array of `element_type` with the given dimensions.
    pub fn array(element_type: Arc<TypeDescriptor>, dimensions: Vec<usize>) -> Self {
        let dims: String = dimensions.iter().map(|d| format!("[{}]", d)).collect();
        Self::new(
            format!("{}{}", element_type.name, dims),
            TypeKind::Array(ArrayDescriptor::new(element_type, dimensions)),
        )
    }

    /// Follow alias chains down to the underlying type.
    pub fn resolved(&self) -> &TypeDescriptor {
        let mut current = self;
        while let TypeKind::Alias(target) = &current.kind {
            current = target;
        }
        current
    }

    /// Kind tag of this descriptor, without resolving aliases.
    pub fn kind_tag(&self) -> MemberKind {
        match &self.kind {
            TypeKind::Primitive(p) => p.member_kind(),
            TypeKind::Struct(_) => MemberKind::Struct,
            TypeKind::Sequence(_) => MemberKind::Sequence,
            TypeKind::Array(_) => MemberKind::Array,
            TypeKind::Enum(_) => MemberKind::Enum,
            TypeKind::Union(_) => MemberKind::Union,
            TypeKind::Alias(_) => MemberKind::Alias,
        }
    }

    /// Alias-resolved kind tag. Never `Alias`.
    pub fn member_kind(&self) -> MemberKind {
        self.resolved().kind_tag()
    }

    /// Check if this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self.resolved().kind, TypeKind::Primitive(_))
    }

    /// Check if this is a struct type.
    pub fn is_struct(&self) -> bool {
        matches!(self.resolved().kind, TypeKind::Struct(_))
    }

    /// Check if this is an array or sequence type.
    pub fn is_collection(&self) -> bool {
        self.member_kind().is_collection()
    }

    /// Get fields if this is a struct.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.resolved().kind {
            TypeKind::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().position(|f| f.name == name)
    }

    /// Element type of an array or sequence.
    pub fn element_type(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.resolved().kind {
            TypeKind::Array(arr) => Some(&arr.element_type),
            TypeKind::Sequence(seq) => Some(&seq.element_type),
            _ => None,
        }
    }

    /// Get the enum descriptor if this is an enum.
    pub fn enumeration(&self) -> Option<&EnumDescriptor> {
        match &self.resolved().kind {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Get the union descriptor if this is a union.
    pub fn union_desc(&self) -> Option<&UnionDescriptor> {
        match &self.resolved().kind {
            TypeKind::Union(u) => Some(u),
            _ => None,
        }
    }
}

/// Field descriptor for struct members.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Field type.
    pub type_desc: Arc<TypeDescriptor>,
    /// Field ID (for extensible types).
    pub id: Option<u32>,
    /// Is optional (@optional annotation).
    pub optional: bool,
    /// Is part of the key (@key annotation).
    pub key: bool,
}

impl FieldDescriptor {
    /// Create a new field descriptor.
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc,
            id: None,
            optional: false,
            key: false,
        }
    }

    /// Set field ID.
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Mark as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark as key member.
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }
}

/// Sequence type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
    /// Maximum length (None = unbounded).
    pub max_length: Option<usize>,
}

impl SequenceDescriptor {
    /// Create unbounded sequence.
    pub fn unbounded(element_type: Arc<TypeDescriptor>) -> Self {
        Self {
            element_type,
            max_length: None,
        }
    }

    /// Create bounded sequence.
    pub fn bounded(element_type: Arc<TypeDescriptor>, max_length: usize) -> Self {
        Self {
            element_type,
            max_length: Some(max_length),
        }
    }
}

/// Array type descriptor.
///
/// Elements are stored flat in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
    /// Size of each dimension.
    pub dimensions: Vec<usize>,
}

impl ArrayDescriptor {
    /// Create array descriptor.
    pub fn new(element_type: Arc<TypeDescriptor>, dimensions: Vec<usize>) -> Self {
        Self {
            element_type,
            dimensions,
        }
    }

    /// Total number of elements, `None` if it does not fit in `usize`.
    pub fn len(&self) -> Option<usize> {
        self.dimensions
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// True if any dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    /// Enum variants, in declaration order.
    pub variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    /// Create enum descriptor.
    pub fn new(variants: Vec<EnumVariant>) -> Self {
        Self { variants }
    }

    /// Get variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Get variant by value.
    pub fn variant_by_value(&self, value: i32) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.value == value)
    }

    /// Ordinal a fresh sample starts with.
    pub fn default_value(&self) -> i32 {
        self.variants.first().map(|v| v.value).unwrap_or(0)
    }
}

/// Enum variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Variant value.
    pub value: i32,
}

impl EnumVariant {
    /// Create enum variant.
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Union type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionDescriptor {
    /// Discriminator type.
    pub discriminator: Arc<TypeDescriptor>,
    /// Union cases.
    pub cases: Vec<UnionCase>,
    /// Default case (if any).
    pub default_case: Option<Box<UnionCase>>,
}

impl UnionDescriptor {
    /// Create union descriptor.
    pub fn new(discriminator: Arc<TypeDescriptor>, cases: Vec<UnionCase>) -> Self {
        Self {
            discriminator,
            cases,
            default_case: None,
        }
    }

    /// Set default case.
    pub fn with_default(mut self, case: UnionCase) -> Self {
        self.default_case = Some(Box::new(case));
        self
    }

    /// Get case by discriminator value.
    pub fn case_by_discriminator(&self, value: i64) -> Option<&UnionCase> {
        self.cases
            .iter()
            .find(|c| c.labels.contains(&value))
            .or(self.default_case.as_deref())
    }

    /// Get a case by name with the discriminator value that selects it.
    pub fn case_by_name(&self, name: &str) -> Option<(&UnionCase, i64)> {
        if let Some(case) = self.cases.iter().find(|c| c.name == name) {
            let label = case
                .labels
                .first()
                .copied()
                .unwrap_or_else(|| self.default_label());
            return Some((case, label));
        }
        self.default_case
            .as_deref()
            .filter(|c| c.name == name)
            .map(|c| (c, self.default_label()))
    }

    /// Smallest non-negative discriminator not claimed by an explicit label.
    pub fn default_label(&self) -> i64 {
        let mut label = 0i64;
        while self.cases.iter().any(|c| c.labels.contains(&label)) {
            label += 1;
        }
        label
    }

    /// All cases including the default one.
    pub fn all_cases(&self) -> impl Iterator<Item = &UnionCase> {
        self.cases.iter().chain(self.default_case.as_deref())
    }
}

/// Union case.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionCase {
    /// Case name.
    pub name: String,
    /// Discriminator labels for this case.
    pub labels: Vec<i64>,
    /// Case type.
    pub type_desc: Arc<TypeDescriptor>,
}

impl UnionCase {
    /// Create union case.
    pub fn new(name: impl Into<String>, labels: Vec<i64>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            labels,
            type_desc,
        }
    }

    /// Create single-label case.
    pub fn single(name: impl Into<String>, label: i64, type_desc: Arc<TypeDescriptor>) -> Self {
        Self::new(name, vec![label], type_desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::primitive("", kind))
    }

    #[test]
    fn test_primitive_size() {
        assert_eq!(PrimitiveKind::Bool.size(), Some(1));
        assert_eq!(PrimitiveKind::WChar.size(), Some(2));
        assert_eq!(PrimitiveKind::U32.size(), Some(4));
        assert_eq!(PrimitiveKind::LongDouble.size(), Some(16));
        assert_eq!(PrimitiveKind::String { max_length: None }.size(), None);
    }

    #[test]
    fn test_primitive_alignment() {
        assert_eq!(PrimitiveKind::U8.alignment(), 1);
        assert_eq!(PrimitiveKind::U16.alignment(), 2);
        assert_eq!(PrimitiveKind::U32.alignment(), 4);
        assert_eq!(PrimitiveKind::F64.alignment(), 8);
        assert_eq!(PrimitiveKind::LongDouble.alignment(), 8);
    }

    #[test]
    fn test_type_descriptor_struct() {
        let fields = vec![
            FieldDescriptor::new("x", prim(PrimitiveKind::U32)).key(),
            FieldDescriptor::new("y", prim(PrimitiveKind::F64)).optional(),
        ];

        let desc = TypeDescriptor::struct_type("Point", fields);
        assert!(desc.is_struct());
        assert_eq!(desc.fields().map(|f| f.len()), Some(2));
        assert!(desc.field("x").is_some_and(|f| f.key));
        assert!(desc.field("y").is_some_and(|f| f.optional));
        assert!(desc.field("z").is_none());
        assert_eq!(desc.field_index("y"), Some(1));
    }

    #[test]
    fn test_alias_resolution() {
        let meters = Arc::new(TypeDescriptor::alias("Meters", prim(PrimitiveKind::F64)));
        let distance = TypeDescriptor::alias("Distance", meters);

        assert_eq!(distance.kind_tag(), MemberKind::Alias);
        assert_eq!(distance.member_kind(), MemberKind::Float64);
        assert!(distance.is_primitive());
    }

    #[test]
    fn test_array_len() {
        let arr = ArrayDescriptor::new(prim(PrimitiveKind::I32), vec![3, 4]);
        assert_eq!(arr.len(), Some(12));

        let huge = ArrayDescriptor::new(prim(PrimitiveKind::I32), vec![usize::MAX, 2]);
        assert_eq!(huge.len(), None);
    }

    #[test]
    fn test_enum_descriptor() {
        let variants = vec![
            EnumVariant::new("RED", 0),
            EnumVariant::new("GREEN", 1),
            EnumVariant::new("BLUE", 2),
        ];
        let enum_desc = EnumDescriptor::new(variants);

        assert_eq!(enum_desc.variant("GREEN").map(|v| v.value), Some(1));
        assert_eq!(
            enum_desc.variant_by_value(2).map(|v| &v.name as &str),
            Some("BLUE")
        );
        assert_eq!(enum_desc.default_value(), 0);
    }

    #[test]
    fn test_union_cases() {
        let union = UnionDescriptor::new(
            prim(PrimitiveKind::I32),
            vec![
                UnionCase::single("a", 0, prim(PrimitiveKind::I32)),
                UnionCase::new("b", vec![1, 2], prim(PrimitiveKind::F64)),
            ],
        )
        .with_default(UnionCase::new("other", vec![], prim(PrimitiveKind::U8)));

        assert_eq!(union.case_by_discriminator(2).map(|c| &c.name as &str), Some("b"));
        assert_eq!(
            union.case_by_discriminator(99).map(|c| &c.name as &str),
            Some("other")
        );
        assert_eq!(union.default_label(), 3);
        assert_eq!(union.case_by_name("other").map(|(_, l)| l), Some(3));
        assert_eq!(union.case_by_name("b").map(|(_, l)| l), Some(1));
    }
}
