// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicData container for runtime data manipulation.
//!
//! A [`DynamicData`] pairs a type descriptor with a storage tree. Members
//! are addressed by name, 0-based index, multi-dimensional index or path
//! (`"a.b[2].c"`); every read and write dispatches on the alias-resolved
//! kind of the addressed member.

mod access;
mod accessors;
pub(crate) mod convert;
mod loan;
mod views;

pub use loan::LoanedData;
pub use views::{ElementsView, FieldsView, ItemsView};

use crate::config::DataProperty;
use crate::error::{DynamicDataError, Result};
use crate::member::{self, MemberDescriptor, MemberKey};
use crate::native::{self, cdr, Scalar, Storage};
use crate::path::PathResolution;
use crate::types::{MemberKind, TypeDescriptor, TypeKind};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Dynamic sample of a runtime-described type.
#[derive(Debug, Clone)]
pub struct DynamicData {
    pub(crate) desc: Arc<TypeDescriptor>,
    pub(crate) storage: Storage,
    pub(crate) prop: DataProperty,
}

impl DynamicData {
    /// Create a zero-initialized sample. Optional members start unset.
    pub fn new(desc: &Arc<TypeDescriptor>) -> Self {
        Self::with_property(desc, DataProperty::default())
    }

    /// Create a zero-initialized sample with explicit access properties.
    pub fn with_property(desc: &Arc<TypeDescriptor>, prop: DataProperty) -> Self {
        let storage = Storage::new(desc, &prop);
        Self::from_parts(desc.clone(), storage, prop)
    }

    /// Create a struct or union sample from a `name -> value` mapping.
    ///
    /// Every non-optional struct member must be present and no unknown
    /// names are accepted; unions take exactly one `case -> value` entry.
    pub fn from_map(desc: &Arc<TypeDescriptor>, map: BTreeMap<String, Value>) -> Result<Self> {
        match desc.member_kind() {
            MemberKind::Struct | MemberKind::Union => Self::from_value(desc, Value::Map(map)),
            other => Err(DynamicDataError::type_mismatch("struct or union", other.name())),
        }
    }

    /// Create a sample from any host value accepted by `set`: a mapping for
    /// aggregates, a list for collections, a sample of the same type.
    pub fn from_value(desc: &Arc<TypeDescriptor>, value: Value) -> Result<Self> {
        let prop = DataProperty::default();
        let storage = convert::value_to_storage(desc, value, &prop)?;
        Ok(Self::from_parts(desc.clone(), storage, prop))
    }

    /// Decode a sample from a CDR_LE buffer.
    pub fn from_cdr_buffer(desc: &Arc<TypeDescriptor>, bytes: &[u8]) -> Result<Self> {
        let prop = DataProperty::default();
        let storage = cdr::decode(desc, bytes, &prop)?;
        Ok(Self::from_parts(desc.clone(), storage, prop))
    }

    pub(crate) fn from_parts(desc: Arc<TypeDescriptor>, storage: Storage, prop: DataProperty) -> Self {
        Self {
            desc,
            storage,
            prop,
        }
    }

    /// Get the type descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.desc
    }

    /// Get the type name.
    pub fn type_name(&self) -> &str {
        &self.desc.name
    }

    /// Alias-resolved kind of the sample.
    pub fn kind(&self) -> MemberKind {
        self.desc.member_kind()
    }

    pub fn property(&self) -> &DataProperty {
        &self.prop
    }

    /// Replace the access properties. Existing storage is not touched.
    pub fn set_property(&mut self, prop: DataProperty) {
        self.prop = prop;
    }

    /// Number of members that are set: struct members present, 1 for a
    /// union with an active case, element count for collections.
    pub fn member_count(&self) -> usize {
        self.storage.member_count()
    }

    /// True if `key` addresses a member that is set in this sample.
    ///
    /// Unset optionals, inactive union cases and elements past the end of
    /// a sequence report `false`; so do keys unknown to the type.
    pub fn member_exists<'k>(&self, key: impl Into<MemberKey<'k>>) -> bool {
        let Ok(res) = self.resolve(&key.into()) else {
            return false;
        };
        match access::descend(&self.desc, &self.storage, &res.loans) {
            Ok(Some((parent, node))) => native::exists(parent, node, res.leaf),
            _ => false,
        }
    }

    /// True if `key` names a member declared by the type.
    pub fn member_exists_in_type<'k>(&self, key: impl Into<MemberKey<'k>>) -> bool {
        self.resolve(&key.into()).is_ok()
    }

    /// Describe the member addressed by `key`.
    pub fn member_info<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<MemberDescriptor> {
        let res = self.resolve(&key.into())?;
        member::describe(&res.leaf_parent_type, res.leaf)
    }

    /// Reset one member: optionals become unset, everything else returns
    /// to its zero value. Clearing an inactive union case is a no-op.
    pub fn clear_member<'k>(&mut self, key: impl Into<MemberKey<'k>>) -> Result<()> {
        let res = self.resolve(&key.into())?;
        let Self {
            ref desc,
            ref mut storage,
            ref prop,
        } = *self;
        match access::descend_existing_mut(desc, storage, &res.loans)? {
            Some((parent, node)) => node.clear_member(parent, res.leaf, prop),
            None => Ok(()),
        }
    }

    /// Reset every member to its initial state.
    pub fn clear_all_members(&mut self) -> Result<()> {
        self.storage.clear_all(&self.desc, &self.prop)
    }

    /// Active discriminator of a union sample.
    pub fn discriminator_value(&self) -> Result<i64> {
        match (&self.storage, self.desc.member_kind()) {
            (Storage::Union { discriminator, .. }, MemberKind::Union) => Ok(*discriminator),
            (_, kind) => Err(DynamicDataError::type_mismatch("union", kind.name())),
        }
    }

    /// Full recursive expansion into maps and lists.
    pub fn to_value(&self) -> Result<Value> {
        convert::expand(&self.desc, &self.storage)
    }

    /// True if this sample equals the sample built from `map`.
    ///
    /// A mapping that cannot build a sample of this type is never equal.
    pub fn eq_map(&self, map: &BTreeMap<String, Value>) -> bool {
        match convert::value_to_storage(&self.desc, Value::Map(map.clone()), &self.prop) {
            Ok(storage) => storage == self.storage,
            Err(e) => {
                log::debug!("[dynamic] '{}' not comparable to map: {}", self.desc.name, e);
                false
            }
        }
    }

    /// Encode the sample as a CDR_LE buffer.
    pub fn to_cdr_buffer(&self) -> Result<Vec<u8>> {
        cdr::encode(&self.desc, &self.storage)
    }

    /// Replace the sample contents with a decoded CDR_LE buffer.
    pub fn set_cdr_buffer(&mut self, bytes: &[u8]) -> Result<()> {
        if self.storage.contains_loan() {
            return Err(DynamicDataError::LoanOutstanding(self.desc.name.clone()));
        }
        self.storage = cdr::decode(&self.desc, bytes, &self.prop)?;
        Ok(())
    }

    pub(crate) fn resolve(&self, key: &MemberKey<'_>) -> Result<PathResolution> {
        crate::path::resolve_key(&self.desc, key, self.prop.max_path_depth)
    }
}

impl PartialEq for DynamicData {
    fn eq(&self, other: &Self) -> bool {
        self.desc.member_kind() == other.desc.member_kind()
            && convert::same_type(&self.desc, &other.desc)
            && self.member_count() == other.member_count()
            && self.storage == other.storage
    }
}

impl PartialEq<BTreeMap<String, Value>> for DynamicData {
    fn eq(&self, other: &BTreeMap<String, Value>) -> bool {
        self.eq_map(other)
    }
}

impl fmt::Display for DynamicData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            Rendered {
                desc: &self.desc,
                node: &self.storage,
            }
        )
    }
}

/// Display adapter over a storage node.
struct Rendered<'a> {
    desc: &'a TypeDescriptor,
    node: &'a Storage,
}

impl Rendered<'_> {
    fn scalar(&self, scalar: &Scalar, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match scalar {
            Scalar::Enum(ordinal) => match convert::enum_member(self.desc, *ordinal) {
                Ok(m) => f.write_str(&m.name),
                Err(_) => write!(f, "{}({})", self.desc.resolved().name, ordinal),
            },
            other => write!(f, "{}", convert::raw_value(other.clone())),
        }
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = self.desc.resolved();
        match (&resolved.kind, self.node) {
            (_, Storage::Loaned) => f.write_str("<loaned>"),
            (_, Storage::Scalar(s)) => self.scalar(s, f),
            (TypeKind::Struct(fields), Storage::Struct(slots)) => {
                if fields.is_empty() {
                    return write!(f, "{} {{}}", resolved.name);
                }
                write!(f, "{} {{", resolved.name)?;
                for (i, (field, slot)) in fields.iter().zip(slots).enumerate() {
                    f.write_str(if i > 0 { ", " } else { " " })?;
                    match slot {
                        Some(node) => write!(
                            f,
                            "{}: {}",
                            field.name,
                            Rendered {
                                desc: &field.type_desc,
                                node
                            }
                        )?,
                        None => write!(f, "{}: null", field.name)?,
                    }
                }
                f.write_str(" }")
            }
            (TypeKind::Union(u), Storage::Union {
                discriminator,
                value,
            }) => match (u.case_by_discriminator(*discriminator), value) {
                (Some(case), Some(node)) => write!(
                    f,
                    "{} {{ {}: {} }}",
                    resolved.name,
                    case.name,
                    Rendered {
                        desc: &case.type_desc,
                        node
                    }
                ),
                _ => write!(f, "{} {{}}", resolved.name),
            },
            (_, Storage::Primitives(values)) => {
                f.write_str("[")?;
                let element = resolved.element_type().map(|e| e.as_ref()).unwrap_or(resolved);
                for (i, s) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    Rendered {
                        desc: element,
                        node: self.node,
                    }
                    .scalar(&s, f)?;
                }
                f.write_str("]")
            }
            (_, Storage::Complex(items)) => {
                f.write_str("[")?;
                let element = resolved.element_type().map(|e| e.as_ref()).unwrap_or(resolved);
                for (i, node) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Rendered { desc: element, node })?;
                }
                f.write_str("]")
            }
            _ => write!(f, "<{}: mismatched storage>", resolved.name),
        }
    }
}
