// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Keyed reads and writes.
//!
//! Keys are resolved against the type first; the resulting steps are then
//! walked through the storage tree. Writes convert and validate the value
//! before touching storage, and slots that must be created on the way
//! (unset optionals, inactive union cases) are only installed once the
//! leaf write has succeeded.

use super::{convert, DynamicData, LoanedData};
use crate::config::DataProperty;
use crate::error::{DynamicDataError, Result};
use crate::member::{self, MemberId, MemberKey};
use crate::native::{self, PrimitiveVec, Scalar, Slot, SlotMut, Storage};
use crate::types::{TypeDescriptor, TypeKind};
use crate::value::Value;
use std::ops::Range;
use std::sync::Arc;

/// Walk `steps` from `node`. `None` when the walk crosses an unset optional
/// or an inactive union case.
pub(super) fn descend<'s>(
    desc: &'s Arc<TypeDescriptor>,
    node: &'s Storage,
    steps: &[MemberId],
) -> Result<Option<(&'s Arc<TypeDescriptor>, &'s Storage)>> {
    let mut desc = desc;
    let mut node = node;
    for &id in steps {
        let child = member::child_type(desc, id)?;
        match native::slot(desc, node, id)? {
            Slot::Node(next) => {
                desc = child;
                node = next;
            }
            Slot::Absent => return Ok(None),
            Slot::Element(_) => return Err(not_complex(child)),
        }
    }
    Ok(Some((desc, node)))
}

/// Mutable walk that never creates slots.
pub(super) fn descend_existing_mut<'s>(
    desc: &'s TypeDescriptor,
    node: &'s mut Storage,
    steps: &[MemberId],
) -> Result<Option<(&'s TypeDescriptor, &'s mut Storage)>> {
    let Some((&id, rest)) = steps.split_first() else {
        return Ok(Some((desc, node)));
    };
    let child = member::child_type(desc, id)?;
    match native::slot_mut(desc, node, id)? {
        SlotMut::Node(next) => descend_existing_mut(child, next, rest),
        SlotMut::Vacant(_) => Ok(None),
        SlotMut::Element { .. } => Err(not_complex(child)),
    }
}

/// Run `op` on the parent reached through `steps`.
///
/// Vacant slots on the way are filled with fresh defaults that are only
/// installed if `op` succeeds.
fn with_parent_mut<R, F>(
    desc: &TypeDescriptor,
    node: &mut Storage,
    steps: &[MemberId],
    prop: &DataProperty,
    op: F,
) -> Result<R>
where
    F: FnOnce(&TypeDescriptor, &mut Storage) -> Result<R>,
{
    let Some((&id, rest)) = steps.split_first() else {
        return op(desc, node);
    };
    let child = member::child_type(desc, id)?;
    if child.member_kind().is_complex() {
        if let Some(new_len) = required_len(desc, node, id, prop)? {
            let mut fresh = Storage::new(child, prop);
            let out = with_parent_mut(child, &mut fresh, rest, prop, op)?;
            grow_to(desc, node, new_len, prop)?;
            if let SlotMut::Node(slot) = native::slot_mut(desc, node, id)? {
                *slot = fresh;
            }
            return Ok(out);
        }
    }
    match native::slot_mut(desc, node, id)? {
        SlotMut::Node(next) => with_parent_mut(child, next, rest, prop, op),
        SlotMut::Vacant(vacant) => {
            let mut fresh = Storage::new(child, prop);
            let out = with_parent_mut(child, &mut fresh, rest, prop, op)?;
            vacant.install(fresh);
            Ok(out)
        }
        SlotMut::Element { .. } => Err(not_complex(child)),
    }
}

/// Check that a loan along `steps` can be taken, without mutating.
fn probe(desc: &TypeDescriptor, node: &Storage, steps: &[MemberId], prop: &DataProperty) -> Result<()> {
    let Some((&id, rest)) = steps.split_first() else {
        return Ok(());
    };
    let child = member::child_type(desc, id)?;
    match native::slot(desc, node, id)? {
        Slot::Node(next) => probe(child, next, rest, prop),
        Slot::Absent => probe(child, &Storage::new(child, prop), rest, prop),
        Slot::Element(_) => Err(not_complex(child)),
    }
}

/// Walk `steps`, installing defaults into vacant slots.
fn descend_activate<'s>(
    desc: &TypeDescriptor,
    node: &'s mut Storage,
    steps: &[MemberId],
    prop: &DataProperty,
) -> Result<&'s mut Storage> {
    let Some((&id, rest)) = steps.split_first() else {
        return Ok(node);
    };
    let child = member::child_type(desc, id)?;
    let next = match native::slot_mut(desc, node, id)? {
        SlotMut::Node(next) => next,
        SlotMut::Vacant(vacant) => vacant.install(Storage::new(child, prop)),
        SlotMut::Element { .. } => return Err(not_complex(child)),
    };
    descend_activate(child, next, rest, prop)
}

fn not_complex(desc: &TypeDescriptor) -> DynamicDataError {
    DynamicDataError::type_mismatch("struct, union or collection", desc.member_kind().name())
}

/// Read member `leaf` of `node`.
///
/// In raw mode enums come back as `I32` ordinals and aggregates are
/// rejected; typed getters use it.
fn read_leaf(
    parent: &TypeDescriptor,
    node: &Storage,
    leaf: MemberId,
    prop: &DataProperty,
    raw: bool,
) -> Result<Value> {
    let child = member::child_type(parent, leaf)?;
    let scalar = match native::slot(parent, node, leaf)? {
        Slot::Absent => return Ok(Value::Null),
        Slot::Element(s) => s,
        Slot::Node(Storage::Scalar(s)) => s.clone(),
        Slot::Node(_) if raw => {
            return Err(DynamicDataError::type_mismatch(
                "primitive",
                child.member_kind().name(),
            ))
        }
        Slot::Node(n) => return convert::node_value(child, n, prop),
    };
    match scalar {
        Scalar::Enum(ordinal) if !raw => {
            convert::resolve_enum(parent, leaf, ordinal).map(Value::Enum)
        }
        other => Ok(convert::raw_value(other)),
    }
}

/// Length a sequence parent must grow to so that `leaf` is a valid
/// element. `None` when `leaf` is already in range or `parent` is not a
/// sequence.
fn required_len(
    parent: &TypeDescriptor,
    node: &Storage,
    leaf: MemberId,
    prop: &DataProperty,
) -> Result<Option<usize>> {
    let TypeKind::Sequence(seq) = &parent.resolved().kind else {
        return Ok(None);
    };
    let Some(index) = usize::try_from(leaf.0).ok().and_then(|i| i.checked_sub(1)) else {
        return Ok(None);
    };
    let len = node.len().unwrap_or(0);
    if index < len {
        return Ok(None);
    }
    if !prop.auto_grow_sequences {
        return Err(DynamicDataError::IndexOutOfRange { index, bound: len });
    }
    let new_len = index + 1;
    if let Some(max) = seq.max_length.filter(|max| new_len > *max) {
        return Err(DynamicDataError::SequenceTooLong {
            length: new_len,
            max,
        });
    }
    Ok(Some(new_len))
}

fn grow_to(
    parent: &TypeDescriptor,
    node: &mut Storage,
    new_len: usize,
    prop: &DataProperty,
) -> Result<()> {
    let element = parent
        .element_type()
        .ok_or_else(|| DynamicDataError::type_mismatch("sequence", parent.member_kind().name()))?;
    log::debug!(
        "[dynamic] growing sequence '{}' from {} to {}",
        parent.name,
        node.len().unwrap_or(0),
        new_len
    );
    node.resize(element, new_len, prop)
}

/// Place converted storage into member `leaf` of `node`.
fn write_leaf(
    parent: &TypeDescriptor,
    node: &mut Storage,
    leaf: MemberId,
    new: Option<Storage>,
    prop: &DataProperty,
) -> Result<()> {
    let Some(new) = new else {
        return node.clear_member(parent, leaf, prop);
    };
    if let Some(new_len) = required_len(parent, node, leaf, prop)? {
        grow_to(parent, node, new_len, prop)?;
    }
    match native::slot_mut(parent, node, leaf)? {
        SlotMut::Node(slot) => {
            if slot.contains_loan() {
                return Err(DynamicDataError::LoanOutstanding(member::member_name(
                    parent, leaf,
                )));
            }
            *slot = new;
            Ok(())
        }
        SlotMut::Vacant(vacant) => {
            vacant.install(new);
            Ok(())
        }
        SlotMut::Element { values, index } => match new {
            Storage::Scalar(s) => values.set(index, s),
            _ => Err(DynamicDataError::type_mismatch(
                values.kind_name(),
                "aggregate",
            )),
        },
    }
}

impl DynamicData {
    /// Read the member addressed by `key`.
    ///
    /// Primitives come back as the matching [`Value`] variant, enums as
    /// [`Value::Enum`], unset optionals and inactive union cases as
    /// [`Value::Null`]. Structs, unions and collections come back as
    /// independent copies in [`Value::Data`], or as [`Value::List`] for
    /// collections when `expand_collections` is set.
    ///
    /// ```
    /// use hdds_dynamic_data::{DynamicData, PrimitiveKind, TypeDescriptorBuilder, Value};
    /// use std::sync::Arc;
    ///
    /// let desc = Arc::new(
    ///     TypeDescriptorBuilder::new("Sensor")
    ///         .field("id", PrimitiveKind::U32)
    ///         .sequence_field("readings", PrimitiveKind::F64)
    ///         .build(),
    /// );
    /// let mut data = DynamicData::new(&desc);
    /// data.set("id", 7u32).unwrap();
    /// data.set("readings[2]", 1.5).unwrap();
    ///
    /// assert_eq!(data.get("id").unwrap(), Value::U32(7));
    /// assert_eq!(data.get("readings[1]").unwrap(), Value::F64(0.0));
    /// ```
    pub fn get<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<Value> {
        self.read(&key.into(), false)
    }

    /// Read a primitive member without enum resolution.
    pub(crate) fn get_raw(&self, key: &MemberKey<'_>) -> Result<Value> {
        self.read(key, true)
    }

    fn read(&self, key: &MemberKey<'_>, raw: bool) -> Result<Value> {
        let res = self.resolve(key)?;
        match descend(&self.desc, &self.storage, &res.loans)? {
            Some((parent, node)) => read_leaf(parent, node, res.leaf, &self.prop, raw),
            None => Ok(Value::Null),
        }
    }

    /// Write the member addressed by `key`.
    ///
    /// `Value::Null` unsets an optional member. Writing through an unset
    /// optional or an inactive union case activates it; writing a union
    /// case selects it. A failed write leaves the sample unchanged.
    pub fn set<'k>(&mut self, key: impl Into<MemberKey<'k>>, value: impl Into<Value>) -> Result<()> {
        let res = self.resolve(&key.into())?;
        let value = value.into();
        let parent_type = &res.leaf_parent_type;
        let new = if value.is_null() {
            if !member::is_optional(parent_type, res.leaf) {
                return Err(DynamicDataError::NotOptional(member::member_name(
                    parent_type,
                    res.leaf,
                )));
            }
            None
        } else {
            let child = member::child_type(parent_type, res.leaf)?;
            Some(convert::value_to_storage(child, value, &self.prop)?)
        };

        let Self {
            ref desc,
            ref mut storage,
            ref prop,
        } = *self;
        with_parent_mut(desc, storage, &res.loans, prop, |parent, node| {
            write_leaf(parent, node, res.leaf, new, prop)
        })
    }

    /// Read a member and convert it to `T`.
    pub fn get_as<'k, T: crate::value::FromValue>(
        &self,
        key: impl Into<MemberKey<'k>>,
    ) -> Result<T> {
        T::from_value(self.get(key)?)
    }

    /// Locate the collection member addressed by `key`.
    pub(super) fn collection_at(
        &self,
        key: &MemberKey<'_>,
    ) -> Result<(&Arc<TypeDescriptor>, &Storage)> {
        let res = self.resolve(key)?;
        let Some((parent, node)) = descend(&self.desc, &self.storage, &res.loans)? else {
            return Err(DynamicDataError::type_mismatch("array or sequence", "null"));
        };
        let child = member::child_type(parent, res.leaf)?;
        match native::slot(parent, node, res.leaf)? {
            Slot::Node(n) if child.is_collection() => Ok((child, n)),
            Slot::Absent => Err(DynamicDataError::type_mismatch("array or sequence", "null")),
            _ => Err(DynamicDataError::type_mismatch(
                "array or sequence",
                child.member_kind().name(),
            )),
        }
    }

    /// Run `op` on the primitive vector of the collection at `key`, if it
    /// is already present. `Ok(None)` means the caller must take the
    /// generic path.
    pub(super) fn with_primitive_values<R>(
        &mut self,
        key: &MemberKey<'_>,
        op: impl FnOnce(&TypeDescriptor, &mut PrimitiveVec) -> Result<Option<R>>,
    ) -> Result<Option<R>> {
        let res = self.resolve(key)?;
        let Self {
            ref desc,
            ref mut storage,
            ..
        } = *self;
        let Some((parent, node)) = descend_existing_mut(desc, storage, &res.loans)? else {
            return Ok(None);
        };
        let child = member::child_type(parent, res.leaf)?;
        match native::slot_mut(parent, node, res.leaf)? {
            SlotMut::Node(Storage::Primitives(values)) => op(child, values),
            _ => Ok(None),
        }
    }

    /// Read every element of the collection at `key`.
    pub fn get_values<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<Vec<Value>> {
        let (desc, node) = self.collection_at(&key.into())?;
        convert::element_values(desc, node, &self.prop)
    }

    /// Replace the contents of the collection at `key`.
    ///
    /// Arrays require exactly their length; sequences accept up to their
    /// bound.
    pub fn set_values<'k>(&mut self, key: impl Into<MemberKey<'k>>, values: Vec<Value>) -> Result<()> {
        self.set(key, Value::List(values))
    }

    /// Copies of every element of a collection of structs, unions or
    /// collections.
    pub fn get_complex_values<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<Vec<DynamicData>> {
        let (desc, node) = self.collection_at(&key.into())?;
        let element = complex_element(desc)?;
        match node {
            Storage::Complex(items) => items
                .iter()
                .map(|item| {
                    if item.contains_loan() {
                        return Err(DynamicDataError::LoanOutstanding(element.name.clone()));
                    }
                    Ok(DynamicData::from_parts(
                        element.clone(),
                        item.clone(),
                        self.prop.clone(),
                    ))
                })
                .collect(),
            _ => Err(DynamicDataError::type_mismatch(
                "collection of complex elements",
                element.member_kind().name(),
            )),
        }
    }

    /// Replace a collection of structs, unions or collections.
    pub fn set_complex_values<'k>(
        &mut self,
        key: impl Into<MemberKey<'k>>,
        values: Vec<DynamicData>,
    ) -> Result<()> {
        let key = key.into();
        let res = self.resolve(&key)?;
        complex_element(member::child_type(&res.leaf_parent_type, res.leaf)?)?;
        self.set(key, Value::List(values.into_iter().map(Value::Data).collect()))
    }

    /// Append one element to a sequence sample.
    pub fn append(&mut self, value: impl Into<Value>) -> Result<()> {
        self.extend(std::iter::once(value.into()))
    }

    /// Append elements to a sequence sample. Nothing is appended unless
    /// every element converts and the result fits the bound.
    pub fn extend<I, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let TypeKind::Sequence(seq) = &self.desc.resolved().kind else {
            return Err(DynamicDataError::type_mismatch(
                "sequence",
                self.desc.member_kind().name(),
            ));
        };
        let converted = values
            .into_iter()
            .map(|v| convert::value_to_storage(&seq.element_type, v.into(), &self.prop))
            .collect::<Result<Vec<_>>>()?;
        let length = self.storage.len().unwrap_or(0) + converted.len();
        if let Some(max) = seq.max_length.filter(|max| length > *max) {
            return Err(DynamicDataError::SequenceTooLong { length, max });
        }

        match &mut self.storage {
            Storage::Primitives(values) => {
                values.reserve(converted.len());
                for item in converted {
                    match item {
                        Storage::Scalar(s) => values.push(s)?,
                        _ => {
                            return Err(DynamicDataError::type_mismatch(
                                values.kind_name(),
                                "aggregate",
                            ))
                        }
                    }
                }
                Ok(())
            }
            Storage::Complex(items) => {
                items.extend(converted);
                Ok(())
            }
            _ => Err(DynamicDataError::LoanOutstanding(self.desc.name.clone())),
        }
    }

    /// Elements `range` of a collection sample.
    pub fn get_slice(&self, range: Range<usize>) -> Result<Vec<Value>> {
        let len = self.collection_len()?;
        check_range(&range, len)?;
        range
            .map(|i| convert::element_value(&self.desc, &self.storage, i, &self.prop))
            .collect()
    }

    /// Overwrite elements `range` of a collection sample; `values` must
    /// have exactly `range.len()` entries.
    pub fn set_slice(&mut self, range: Range<usize>, values: Vec<Value>) -> Result<()> {
        let len = self.collection_len()?;
        check_range(&range, len)?;
        if values.len() != range.len() {
            return Err(DynamicDataError::type_mismatch(
                format!("{} values", range.len()),
                format!("{} values", values.len()),
            ));
        }
        let element = self
            .desc
            .element_type()
            .ok_or_else(|| DynamicDataError::type_mismatch("array or sequence", self.kind().name()))?;
        let converted = values
            .into_iter()
            .map(|v| convert::value_to_storage(element, v, &self.prop))
            .collect::<Result<Vec<_>>>()?;

        match &mut self.storage {
            Storage::Primitives(target) => {
                for (i, item) in range.zip(converted) {
                    match item {
                        Storage::Scalar(s) => target.set(i, s)?,
                        _ => {
                            return Err(DynamicDataError::type_mismatch(
                                target.kind_name(),
                                "aggregate",
                            ))
                        }
                    }
                }
                Ok(())
            }
            Storage::Complex(items) => {
                if items[range.clone()].iter().any(Storage::contains_loan) {
                    return Err(DynamicDataError::LoanOutstanding(self.desc.name.clone()));
                }
                for (slot, item) in items[range].iter_mut().zip(converted) {
                    *slot = item;
                }
                Ok(())
            }
            _ => Err(DynamicDataError::LoanOutstanding(self.desc.name.clone())),
        }
    }

    fn collection_len(&self) -> Result<usize> {
        if !self.desc.is_collection() {
            return Err(DynamicDataError::type_mismatch(
                "array or sequence",
                self.kind().name(),
            ));
        }
        self.storage
            .len()
            .ok_or_else(|| DynamicDataError::LoanOutstanding(self.desc.name.clone()))
    }

    /// Borrow a nested struct, union or collection for in-place access.
    ///
    /// The parent stays mutably borrowed until the loan is dropped or
    /// returned. Unset optionals and inactive union cases on the way are
    /// activated.
    pub fn loan_value<'k>(&mut self, key: impl Into<MemberKey<'k>>) -> Result<LoanedData<'_>> {
        let res = self.resolve(&key.into())?;
        let child = member::child_type(&res.leaf_parent_type, res.leaf)?.clone();
        if !child.member_kind().is_complex() {
            return Err(DynamicDataError::type_mismatch(
                "struct, union or collection",
                child.member_kind().name(),
            ));
        }
        let steps: Vec<MemberId> = res.steps().collect();
        probe(&self.desc, &self.storage, &steps, &self.prop)?;

        let Self {
            ref desc,
            ref mut storage,
            ref prop,
        } = *self;
        let slot = descend_activate(desc, storage, &steps, prop)?;
        Ok(LoanedData::take(slot, child, prop.clone()))
    }
}

fn complex_element(collection: &TypeDescriptor) -> Result<&Arc<TypeDescriptor>> {
    let element = collection.element_type().ok_or_else(|| {
        DynamicDataError::type_mismatch("array or sequence", collection.member_kind().name())
    })?;
    if element.member_kind().is_complex() {
        Ok(element)
    } else {
        Err(DynamicDataError::type_mismatch(
            "collection of complex elements",
            format!("collection of {}", element.member_kind().name()),
        ))
    }
}

fn check_range(range: &Range<usize>, len: usize) -> Result<()> {
    if range.start > range.end {
        return Err(DynamicDataError::IndexOutOfRange {
            index: range.start,
            bound: range.end,
        });
    }
    if range.end > len {
        return Err(DynamicDataError::IndexOutOfRange {
            index: range.end,
            bound: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::DataProperty;
    use crate::types::{
        EnumBuilder, PrimitiveKind, TypeDescriptor, TypeDescriptorBuilder, UnionBuilder,
    };
    use crate::{DynamicData, DynamicDataError, EnumMember, Value};
    use std::sync::Arc;

    fn joint() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptorBuilder::new("Joint")
                .field("angle", PrimitiveKind::F32)
                .optional_field("limit", PrimitiveKind::F32)
                .build(),
        )
    }

    fn robot() -> Arc<TypeDescriptor> {
        let joint = joint();
        let mode = Arc::new(EnumBuilder::new("Mode").variant("OFF").variant("ON").build());
        let command = Arc::new(
            UnionBuilder::with_i32_discriminator("Command")
                .primitive_case("speed", 1, PrimitiveKind::F64)
                .case("joint", 2, joint.clone())
                .build(),
        );
        Arc::new(
            TypeDescriptorBuilder::new("Robot")
                .field("id", PrimitiveKind::U16)
                .field_with_type("mode", mode)
                .bounded_sequence_field("flags", PrimitiveKind::Bool, 4)
                .sequence_field_of("joints", joint)
                .field_with_type("command", command)
                .build(),
        )
    }

    #[test]
    fn test_integer_and_float_coercion() {
        let mut data = DynamicData::new(&robot());
        data.set("id", 9i64).expect("widened integer");
        assert_eq!(data.get("id"), Ok(Value::U16(9)));
        assert!(matches!(
            data.set("id", -1i32),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
        data.set("joints[0].angle", 2i32).expect("integer into float");
        assert_eq!(data.get_f32("joints[0].angle"), Ok(2.0));
        assert_eq!(data.get_as::<f64>("joints[0].angle"), Ok(2.0));
    }

    #[test]
    fn test_enum_writes() {
        let mut data = DynamicData::new(&robot());
        data.set("mode", EnumMember::new("ON", 1)).expect("member");
        assert_eq!(data.get("mode"), Ok(Value::Enum(EnumMember::new("ON", 1))));
        data.set("mode", "OFF").expect("name");
        assert_eq!(data.get_i32("mode"), Ok(0));
        assert!(matches!(
            data.set("mode", "STANDBY"),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_intermediate_sequence_growth() {
        let mut data = DynamicData::new(&robot());
        data.set("joints[2].limit", 1.0f32).expect("grow through path");
        assert_eq!(data.get_complex_values("joints").map(|j| j.len()), Ok(3));
        assert_eq!(data.get("joints[0].limit"), Ok(Value::Null));
        assert_eq!(data.get_f32("joints[2].limit"), Ok(1.0));

        let mut strict = DynamicData::with_property(
            &robot(),
            DataProperty::default().auto_grow_sequences(false),
        );
        assert_eq!(
            strict.set("joints[0].angle", 1.0f32),
            Err(DynamicDataError::IndexOutOfRange { index: 0, bound: 0 })
        );
        assert_eq!(
            strict.set("flags[0]", true),
            Err(DynamicDataError::IndexOutOfRange { index: 0, bound: 0 })
        );
    }

    #[test]
    fn test_failed_nested_write_changes_nothing() {
        let mut data = DynamicData::new(&robot());
        data.set("command.speed", 3.0f64).expect("speed");
        let before = data.clone();

        // Activating the joint case would succeed, the leaf conversion fails.
        assert!(data.set("command.joint.angle", "fast").is_err());
        assert_eq!(data, before);
        assert_eq!(data.get("command.speed"), Ok(Value::F64(3.0)));

        assert!(data.set("joints[1].angle", "fast").is_err());
        assert_eq!(data.get_complex_values("joints").map(|j| j.len()), Ok(0));
    }

    #[test]
    fn test_bulk_values() {
        let mut data = DynamicData::new(&robot());
        data.set_values("flags", vec![Value::Bool(true), Value::Bool(false)])
            .expect("flags");
        assert_eq!(
            data.get_values("flags"),
            Ok(vec![Value::Bool(true), Value::Bool(false)])
        );
        assert_eq!(
            data.set_values("flags", vec![Value::Bool(true); 5]),
            Err(DynamicDataError::SequenceTooLong { length: 5, max: 4 })
        );
        assert!(matches!(
            data.get_complex_values("flags"),
            Err(DynamicDataError::TypeMismatch { .. })
        ));

        let mut joint = DynamicData::new(&joint());
        joint.set("angle", 0.5f32).expect("angle");
        data.set_complex_values("joints", vec![joint.clone(), joint])
            .expect("joints");
        assert_eq!(data.get_f32("joints[1].angle"), Ok(0.5));
    }

    #[test]
    fn test_sequence_sample_operations() {
        let seq = Arc::new(TypeDescriptor::bounded_sequence(
            Arc::new(TypeDescriptor::primitive("int8", PrimitiveKind::I8)),
            3,
        ));
        let mut data = DynamicData::new(&seq);
        data.append(1i8).expect("append");
        data.extend([2i8, 3]).expect("extend");
        assert_eq!(
            data.append(4i8),
            Err(DynamicDataError::SequenceTooLong { length: 4, max: 3 })
        );
        assert!(data.extend([300i32]).is_err());
        assert_eq!(data.get_slice(1..3), Ok(vec![Value::I8(2), Value::I8(3)]));
        assert!(data.get_slice(2..5).is_err());
        assert!(data.set_slice(0..2, vec![Value::I8(0)]).is_err());

        let mut robot = DynamicData::new(&robot());
        assert!(matches!(
            robot.append(1u16),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
    }
}
