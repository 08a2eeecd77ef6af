// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Iteration views over a sample.

use super::{convert, DynamicData};
use crate::error::{DynamicDataError, Result};
use crate::native::Storage;
use crate::types::{FieldDescriptor, TypeKind};
use crate::value::Value;
use std::iter::FusedIterator;
use std::ops::Range;
use std::slice;

/// Declared member names of a struct sample.
#[derive(Debug, Clone)]
pub struct FieldsView<'a> {
    all: &'a [FieldDescriptor],
    iter: slice::Iter<'a, FieldDescriptor>,
}

impl FieldsView<'_> {
    /// True if the type declares a member called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.all.iter().any(|f| f.name == name)
    }
}

impl<'a> Iterator for FieldsView<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.iter.next().map(|f| f.name.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl DoubleEndedIterator for FieldsView<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|f| f.name.as_str())
    }
}

impl ExactSizeIterator for FieldsView<'_> {}
impl FusedIterator for FieldsView<'_> {}

/// Resolved element values of a collection sample.
#[derive(Debug, Clone)]
pub struct ElementsView<'a> {
    data: &'a DynamicData,
    range: Range<usize>,
}

impl ElementsView<'_> {
    fn value(&self, index: usize) -> Result<Value> {
        convert::element_value(&self.data.desc, &self.data.storage, index, &self.data.prop)
    }
}

impl Iterator for ElementsView<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|i| self.value(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for ElementsView<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(|i| self.value(i))
    }
}

impl ExactSizeIterator for ElementsView<'_> {}
impl FusedIterator for ElementsView<'_> {}

/// `(name, value)` pairs of a struct sample; unset optionals yield `None`.
#[derive(Debug, Clone)]
pub struct ItemsView<'a> {
    data: &'a DynamicData,
    fields: &'a [FieldDescriptor],
    slots: &'a [Option<Storage>],
    range: Range<usize>,
}

impl<'a> ItemsView<'a> {
    /// True if the type declares a member called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    fn item(&self, index: usize) -> Result<(&'a str, Option<Value>)> {
        let field = &self.fields[index];
        let value = match &self.slots[index] {
            Some(node) => Some(convert::node_value(
                &field.type_desc,
                node,
                &self.data.prop,
            )?),
            None => None,
        };
        Ok((field.name.as_str(), value))
    }
}

impl<'a> Iterator for ItemsView<'a> {
    type Item = Result<(&'a str, Option<Value>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|i| self.item(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for ItemsView<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(|i| self.item(i))
    }
}

impl ExactSizeIterator for ItemsView<'_> {}
impl FusedIterator for ItemsView<'_> {}

impl DynamicData {
    /// Member names of a struct sample, in declaration order.
    pub fn fields(&self) -> Result<FieldsView<'_>> {
        let fields = self
            .desc
            .fields()
            .ok_or_else(|| DynamicDataError::type_mismatch("struct", self.kind().name()))?;
        Ok(FieldsView {
            all: fields,
            iter: fields.iter(),
        })
    }

    /// Element values of an array or sequence sample.
    pub fn elements(&self) -> Result<ElementsView<'_>> {
        if !self.desc.is_collection() {
            return Err(DynamicDataError::type_mismatch(
                "array or sequence",
                self.kind().name(),
            ));
        }
        let len = self
            .storage
            .len()
            .ok_or_else(|| DynamicDataError::LoanOutstanding(self.desc.name.clone()))?;
        Ok(ElementsView {
            data: self,
            range: 0..len,
        })
    }

    /// Member names and values of a struct sample, in declaration order.
    pub fn items(&self) -> Result<ItemsView<'_>> {
        match (&self.desc.resolved().kind, &self.storage) {
            (TypeKind::Struct(fields), Storage::Struct(slots)) => Ok(ItemsView {
                data: self,
                fields,
                slots,
                range: 0..fields.len().min(slots.len()),
            }),
            (_, Storage::Loaned) => Err(DynamicDataError::LoanOutstanding(self.desc.name.clone())),
            _ => Err(DynamicDataError::type_mismatch("struct", self.kind().name())),
        }
    }
}
