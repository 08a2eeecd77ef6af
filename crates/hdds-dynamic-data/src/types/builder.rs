// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use crate::types::{
    EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKind,
    UnionCase, UnionDescriptor,
};
use std::sync::Arc;

fn primitive(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::primitive("", kind))
}

/// Builder for struct TypeDescriptor instances.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a primitive field.
    pub fn field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, primitive(kind)));
        self
    }

    /// Add a field with a type descriptor.
    pub fn field_with_type(
        mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.fields.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a fully specified field.
    pub fn member(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a key field.
    pub fn key_field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, primitive(kind)).key());
        self
    }

    /// Add an optional field.
    pub fn optional_field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, primitive(kind)).optional());
        self
    }

    /// Add an optional field of any type.
    pub fn optional_field_with_type(
        mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, type_desc).optional());
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String { max_length: None })
    }

    pub fn bounded_string_field(self, name: impl Into<String>, max_length: usize) -> Self {
        self.field(
            name,
            PrimitiveKind::String {
                max_length: Some(max_length),
            },
        )
    }

    /// Add a sequence field.
    pub fn sequence_field(self, name: impl Into<String>, element_kind: PrimitiveKind) -> Self {
        let seq = Arc::new(TypeDescriptor::sequence(primitive(element_kind)));
        self.field_with_type(name, seq)
    }

    /// Add a bounded sequence field.
    pub fn bounded_sequence_field(
        self,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
        max_length: usize,
    ) -> Self {
        let seq = Arc::new(TypeDescriptor::bounded_sequence(
            primitive(element_kind),
            max_length,
        ));
        self.field_with_type(name, seq)
    }

    /// Add a sequence field of any element type.
    pub fn sequence_field_of(
        self,
        name: impl Into<String>,
        element_type: Arc<TypeDescriptor>,
    ) -> Self {
        let seq = Arc::new(TypeDescriptor::sequence(element_type));
        self.field_with_type(name, seq)
    }

    /// Add a one-dimensional array field.
    pub fn array_field(
        self,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
        length: usize,
    ) -> Self {
        self.multi_array_field(name, primitive(element_kind), vec![length])
    }

    /// Add an array field of any element type and dimensions.
    pub fn multi_array_field(
        self,
        name: impl Into<String>,
        element_type: Arc<TypeDescriptor>,
        dimensions: Vec<usize>,
    ) -> Self {
        let arr = Arc::new(TypeDescriptor::array(element_type, dimensions));
        self.field_with_type(name, arr)
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::struct_type(self.name, self.fields)
    }
}

/// Builder for enum types.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    variants: Vec<EnumVariant>,
    next_value: i32,
}

impl EnumBuilder {
    /// Create a new enum builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            next_value: 0,
        }
    }

    /// Add a variant with auto-incrementing value.
    pub fn variant(mut self, name: impl Into<String>) -> Self {
        self.variants.push(EnumVariant::new(name, self.next_value));
        self.next_value = self.next_value.wrapping_add(1);
        self
    }

    /// Add a variant with explicit value.
    pub fn variant_value(mut self, name: impl Into<String>, value: i32) -> Self {
        self.variants.push(EnumVariant::new(name, value));
        self.next_value = value.wrapping_add(1);
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::new(
            self.name,
            TypeKind::Enum(EnumDescriptor::new(self.variants)),
        )
    }
}

/// Builder for union types.
#[derive(Debug)]
pub struct UnionBuilder {
    name: String,
    discriminator: Arc<TypeDescriptor>,
    cases: Vec<UnionCase>,
    default_case: Option<UnionCase>,
}

impl UnionBuilder {
    /// Create a new union builder with discriminator type.
    pub fn new(name: impl Into<String>, discriminator: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            discriminator,
            cases: Vec::new(),
            default_case: None,
        }
    }

    /// Create with i32 discriminator.
    pub fn with_i32_discriminator(name: impl Into<String>) -> Self {
        Self::new(name, primitive(PrimitiveKind::I32))
    }

    /// Add a case with single label.
    pub fn case(
        mut self,
        name: impl Into<String>,
        label: i64,
        type_desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.cases.push(UnionCase::single(name, label, type_desc));
        self
    }

    /// Add a case with multiple labels.
    pub fn case_labels(
        mut self,
        name: impl Into<String>,
        labels: Vec<i64>,
        type_desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.cases.push(UnionCase::new(name, labels, type_desc));
        self
    }

    /// Add a primitive case.
    pub fn primitive_case(self, name: impl Into<String>, label: i64, kind: PrimitiveKind) -> Self {
        self.case(name, label, primitive(kind))
    }

    /// Set default case.
    pub fn default_case(mut self, name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        self.default_case = Some(UnionCase::new(name, vec![], type_desc));
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        let mut union_desc = UnionDescriptor::new(self.discriminator, self.cases);
        if let Some(default) = self.default_case {
            union_desc = union_desc.with_default(default);
        }
        TypeDescriptor::new(self.name, TypeKind::Union(union_desc))
    }
}
