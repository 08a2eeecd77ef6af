// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed accessors, one set per primitive kind.

use super::{convert, DynamicData};
use crate::error::{DynamicDataError, Result};
use crate::member::MemberKey;
use crate::native::{PrimitiveVec, Storage};
use crate::value::{FromValue, LongDouble, Value};

impl DynamicData {
    /// Read every element of a primitive collection as `T`.
    ///
    /// `pick` returns the backing vector when its content kind is already
    /// `T`, which turns the read into a single slice copy.
    fn primitive_values<T: FromValue + Clone>(
        &self,
        key: &MemberKey<'_>,
        pick: impl FnOnce(&PrimitiveVec) -> Option<&[T]>,
    ) -> Result<Vec<T>> {
        let (desc, node) = self.collection_at(key)?;
        match node {
            Storage::Primitives(values) => match pick(values) {
                Some(same) => Ok(same.to_vec()),
                None => values
                    .iter()
                    .map(|s| T::from_value(convert::raw_value(s)))
                    .collect(),
            },
            _ => Err(DynamicDataError::type_mismatch(
                "collection of primitives",
                desc.element_type()
                    .map_or("collection", |e| e.member_kind().name()),
            )),
        }
    }
}

/// Accessors whose element kind carries no per-value constraint, so bulk
/// writes can copy straight into a matching vector.
macro_rules! numeric_accessors {
    ($($ty:ty, $variant:ident, $get:ident, $set:ident, $get_values:ident, $set_values:ident;)*) => {
        impl DynamicData {
            $(
                #[doc = concat!("Read a `", stringify!($ty), "` member.")]
                pub fn $get<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<$ty> {
                    <$ty>::from_value(self.get_raw(&key.into())?)
                }

                #[doc = concat!("Write a `", stringify!($ty), "` member.")]
                pub fn $set<'k>(&mut self, key: impl Into<MemberKey<'k>>, value: $ty) -> Result<()> {
                    self.set(key, Value::$variant(value))
                }

                #[doc = concat!("Read a collection member as `Vec<", stringify!($ty), ">`.")]
                pub fn $get_values<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<Vec<$ty>> {
                    self.primitive_values(&key.into(), |values| match values {
                        PrimitiveVec::$variant(v) => Some(v.as_slice()),
                        _ => None,
                    })
                }

                #[doc = concat!("Replace a collection member with `", stringify!($ty), "` values.")]
                pub fn $set_values<'k>(
                    &mut self,
                    key: impl Into<MemberKey<'k>>,
                    values: &[$ty],
                ) -> Result<()> {
                    let key = key.into();
                    let copied = self.with_primitive_values(&key, |desc, target| match target {
                        PrimitiveVec::$variant(v) => {
                            convert::check_collection_len(desc, values.len())?;
                            v.clear();
                            v.extend_from_slice(values);
                            Ok(Some(()))
                        }
                        _ => Ok(None),
                    })?;
                    match copied {
                        Some(()) => Ok(()),
                        None => self.set(
                            key,
                            Value::List(values.iter().cloned().map(Value::$variant).collect()),
                        ),
                    }
                }
            )*
        }
    };
}

/// Accessors for characters and strings. Bulk writes go through the
/// checked path so range and bound limits apply to every element.
macro_rules! text_accessors {
    ($($ty:ty, $arg:ty, $variant:ident, $get:ident, $set:ident, $get_values:ident, $set_values:ident;)*) => {
        impl DynamicData {
            $(
                #[doc = concat!("Read a `", stringify!($variant), "` member.")]
                pub fn $get<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<$ty> {
                    <$ty>::from_value(self.get_raw(&key.into())?)
                }

                #[doc = concat!("Write a `", stringify!($variant), "` member.")]
                pub fn $set<'k>(&mut self, key: impl Into<MemberKey<'k>>, value: $arg) -> Result<()> {
                    self.set(key, Value::$variant(value.into()))
                }

                #[doc = concat!("Read a `", stringify!($variant), "` collection member.")]
                pub fn $get_values<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<Vec<$ty>> {
                    self.primitive_values(&key.into(), |values| match values {
                        PrimitiveVec::$variant(v) => Some(v.as_slice()),
                        _ => None,
                    })
                }

                #[doc = concat!("Replace a `", stringify!($variant), "` collection member.")]
                pub fn $set_values<'k>(
                    &mut self,
                    key: impl Into<MemberKey<'k>>,
                    values: &[$ty],
                ) -> Result<()> {
                    self.set(
                        key,
                        Value::List(values.iter().cloned().map(Value::$variant).collect()),
                    )
                }
            )*
        }
    };
}

numeric_accessors! {
    bool, Bool, get_bool, set_bool, get_bool_values, set_bool_values;
    i8, I8, get_i8, set_i8, get_i8_values, set_i8_values;
    i16, I16, get_i16, set_i16, get_i16_values, set_i16_values;
    i32, I32, get_i32, set_i32, get_i32_values, set_i32_values;
    i64, I64, get_i64, set_i64, get_i64_values, set_i64_values;
    u8, U8, get_u8, set_u8, get_u8_values, set_u8_values;
    u16, U16, get_u16, set_u16, get_u16_values, set_u16_values;
    u32, U32, get_u32, set_u32, get_u32_values, set_u32_values;
    u64, U64, get_u64, set_u64, get_u64_values, set_u64_values;
    f32, F32, get_f32, set_f32, get_f32_values, set_f32_values;
    f64, F64, get_f64, set_f64, get_f64_values, set_f64_values;
    LongDouble, LongDouble, get_long_double, set_long_double, get_long_double_values, set_long_double_values;
}

text_accessors! {
    char, char, Char, get_char, set_char, get_char_values, set_char_values;
    char, char, WChar, get_wchar, set_wchar, get_wchar_values, set_wchar_values;
    String, &str, String, get_string, set_string, get_string_values, set_string_values;
    String, &str, WString, get_wstring, set_wstring, get_wstring_values, set_wstring_values;
}

#[cfg(test)]
mod tests {
    use crate::types::{EnumBuilder, PrimitiveKind, TypeDescriptor, TypeDescriptorBuilder};
    use crate::{DynamicData, DynamicDataError};
    use std::sync::Arc;

    fn sample() -> DynamicData {
        let color = Arc::new(EnumBuilder::new("Color").variant("RED").variant("GREEN").build());
        let desc = Arc::new(
            TypeDescriptorBuilder::new("Frame")
                .field("id", PrimitiveKind::U16)
                .field("tag", PrimitiveKind::Char)
                .string_field("label")
                .bounded_sequence_field("payload", PrimitiveKind::I32, 4)
                .array_field("rgb", PrimitiveKind::U8, 3)
                .sequence_field_of("colors", color)
                .bounded_sequence_field(
                    "names",
                    PrimitiveKind::String {
                        max_length: Some(3),
                    },
                    2,
                )
                .field_with_type(
                    "alias",
                    Arc::new(TypeDescriptor::alias(
                        "Count",
                        Arc::new(TypeDescriptor::primitive("int64", PrimitiveKind::I64)),
                    )),
                )
                .build(),
        );
        DynamicData::new(&desc)
    }

    #[test]
    fn test_scalar_accessors() {
        let mut data = sample();
        data.set_u16("id", 512).expect("id");
        data.set_char("tag", 'z').expect("tag");
        data.set_string("label", "cam").expect("label");
        data.set_i64("alias", -3).expect("alias");

        assert_eq!(data.get_u16("id"), Ok(512));
        assert_eq!(data.get_u32("id"), Ok(512));
        assert_eq!(data.get_char("tag"), Ok('z'));
        assert_eq!(data.get_string("label"), Ok("cam".to_string()));
        assert_eq!(data.get_i64("alias"), Ok(-3));
        assert!(data.get_u8("id").is_err());
        assert!(data.get_string("id").is_err());
    }

    #[test]
    fn test_bulk_fast_path() {
        let mut data = sample();
        data.set_i32_values("payload", &[1, 2, 3]).expect("payload");
        assert_eq!(data.get_i32_values("payload"), Ok(vec![1, 2, 3]));
        assert_eq!(data.get_i64_values("payload"), Ok(vec![1, 2, 3]));

        data.set_i32_values("payload", &[9]).expect("shrink");
        assert_eq!(data.get_i32_values("payload"), Ok(vec![9]));

        assert_eq!(
            data.set_i32_values("payload", &[0; 5]),
            Err(DynamicDataError::SequenceTooLong { length: 5, max: 4 })
        );
        assert_eq!(data.get_i32_values("payload"), Ok(vec![9]));
    }

    #[test]
    fn test_bulk_array_length_and_conversion() {
        let mut data = sample();
        data.set_u8_values("rgb", &[1, 2, 3]).expect("rgb");
        assert!(matches!(
            data.set_u8_values("rgb", &[1, 2]),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
        // Kind differs from the stored vector: per-element conversion.
        data.set_i64_values("rgb", &[4, 5, 6]).expect("converted");
        assert_eq!(data.get_u8_values("rgb"), Ok(vec![4, 5, 6]));
        assert!(data.set_i64_values("rgb", &[256, 0, 0]).is_err());
        assert_eq!(data.get_u8_values("rgb"), Ok(vec![4, 5, 6]));
    }

    #[test]
    fn test_enum_collection_reads_ordinals() {
        let mut data = sample();
        data.set_i32_values("colors", &[1, 0]).expect("ordinals");
        assert_eq!(data.get_i32_values("colors"), Ok(vec![1, 0]));
    }

    #[test]
    fn test_text_bulk_checks_every_element() {
        let mut data = sample();
        data.set_string_values("names", &["ab".into(), "c".into()])
            .expect("names");
        assert_eq!(
            data.set_string_values("names", &["abcd".into()]),
            Err(DynamicDataError::StringTooLong { length: 4, max: 3 })
        );
        assert_eq!(
            data.get_string_values("names"),
            Ok(vec!["ab".to_string(), "c".to_string()])
        );
    }
}
