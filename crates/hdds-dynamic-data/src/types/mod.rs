// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptions: descriptors, builders, the registry and
//! the XML type loader.

mod builder;
mod descriptor;
mod registry;
#[cfg(feature = "type-loaders")]
mod xml;

pub use builder::{EnumBuilder, TypeDescriptorBuilder, UnionBuilder};
pub use descriptor::{
    ArrayDescriptor, EnumDescriptor, EnumVariant, FieldDescriptor, MemberKind, PrimitiveKind,
    SequenceDescriptor, TypeDescriptor, TypeKind, UnionCase, UnionDescriptor, LONG_DOUBLE_SIZE,
};
pub use registry::TypeRegistry;
#[cfg(feature = "type-loaders")]
pub use xml::{TypeLoadError, XmlTypeLoader};
