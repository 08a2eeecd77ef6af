// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicData access engine for DDS
//!
//! Read and write strongly-typed, nested samples whose schema is only
//! known at runtime. Members are addressed by name, index, multi-index or
//! path expression and resolved against a [`TypeDescriptor`].
//!
//! # Features
//!
//! - **TypeDescriptor**: runtime schema (primitives, structs, unions, arrays,
//!   sequences, enums, aliases, optional and key members)
//! - **DynamicData**: kind-dispatched get/set, typed and bulk accessors,
//!   slices, views and equality
//! - **Paths**: `"pose.position.x"`, `"grid[1][2]"`, `"grid[1,2]"`
//! - **Loans**: scoped in-place access to nested members
//! - **CDR**: little-endian encode/decode of samples
//! - **Type loaders**: XML type files and YAML access properties
//!   (`type-loaders` feature)
//!
//! # Example
//!
//! ```rust
//! use hdds_dynamic_data::{DynamicData, PrimitiveKind, TypeDescriptorBuilder, Value};
//! use std::sync::Arc;
//!
//! let position = Arc::new(TypeDescriptorBuilder::new("Vector3")
//!     .field("x", PrimitiveKind::F64)
//!     .field("y", PrimitiveKind::F64)
//!     .field("z", PrimitiveKind::F64)
//!     .build());
//! let pose = Arc::new(TypeDescriptorBuilder::new("Pose")
//!     .field_with_type("position", position)
//!     .bounded_sequence_field("covariance", PrimitiveKind::F64, 36)
//!     .build());
//!
//! let mut data = DynamicData::new(&pose);
//! data.set("position.x", 1.5).unwrap();
//! data.set("covariance[0]", 0.01).unwrap();
//!
//! assert_eq!(data.get("position.x").unwrap(), Value::F64(1.5));
//! assert_eq!(data.get_f64_values("covariance").unwrap(), vec![0.01]);
//! ```

pub mod config;
mod data;
pub mod error;
mod member;
mod native;
mod offset;
mod path;
pub mod types;
mod value;


pub use config::{ConfigError, DataProperty};
pub use data::{DynamicData, ElementsView, FieldsView, ItemsView, LoanedData};
pub use error::{DynamicDataError, Result};
pub use member::{member_info, MemberDescriptor, MemberId, MemberKey};
pub use offset::offset;
pub use path::{resolve, PathResolution};
pub use types::{
    ArrayDescriptor, EnumBuilder, EnumDescriptor, EnumVariant, FieldDescriptor, MemberKind,
    PrimitiveKind, SequenceDescriptor, TypeDescriptor, TypeDescriptorBuilder, TypeKind,
    TypeRegistry, UnionBuilder, UnionCase, UnionDescriptor,
};
#[cfg(feature = "type-loaders")]
pub use types::{TypeLoadError, XmlTypeLoader};
pub use value::{EnumMember, FromValue, LongDouble, Value};
