// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value types exchanged with callers.

use crate::data::DynamicData;
use crate::error::{DynamicDataError, Result};
use crate::types::LONG_DOUBLE_SIZE;
use std::collections::BTreeMap;
use std::fmt;

/// Raw IEEE-754 binary128 bytes (little endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LongDouble(pub [u8; LONG_DOUBLE_SIZE]);

/// Enumerator resolved from a stored ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumMember {
    /// Enumerator name as declared in the type.
    pub name: String,
    /// Enumerator ordinal.
    pub ordinal: i32,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, ordinal: i32) -> Self {
        Self {
            name: name.into(),
            ordinal,
        }
    }
}

/// A dynamic value that can hold any DDS type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Primitives
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    LongDouble(LongDouble),
    Char(char),
    WChar(char),
    String(String),
    WString(String),

    // Composites
    Enum(EnumMember),
    /// Nested sample (struct, union or collection member).
    Data(DynamicData),
    /// Expanded collection.
    List(Vec<Value>),
    /// Name -> value mapping, used as an initializer for aggregates.
    Map(BTreeMap<String, Value>),

    /// Unset optional member.
    Null,
}

impl Value {
    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::U8(_) => "uint8",
            Self::U16(_) => "uint16",
            Self::U32(_) => "uint32",
            Self::U64(_) => "uint64",
            Self::I8(_) => "int8",
            Self::I16(_) => "int16",
            Self::I32(_) => "int32",
            Self::I64(_) => "int64",
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
            Self::LongDouble(_) => "float128",
            Self::Char(_) => "char8",
            Self::WChar(_) => "char16",
            Self::String(_) => "string",
            Self::WString(_) => "wstring",
            Self::Enum(_) => "enum",
            Self::Data(_) => "data",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Null => "null",
        }
    }

    /// Any integer variant widened to `i128`.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::U8(v) => Some(v.into()),
            Self::U16(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::U64(v) => Some(v.into()),
            Self::I8(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::I64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Any float or integer variant as `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v.into()),
            Self::F64(v) => Some(v),
            _ => self.as_integer().map(|v| v as f64),
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i32 (exact variant only).
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64 (exact variant only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) | Self::WString(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the resolved enumerator.
    pub fn as_enum(&self) -> Option<&EnumMember> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Try to get the nested sample.
    pub fn as_data(&self) -> Option<&DynamicData> {
        match self {
            Self::Data(d) => Some(d),
            _ => None,
        }
    }

    /// Try to get as list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get map entry.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Map(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::LongDouble(v) => {
                f.write_str("0x")?;
                for b in v.0.iter().rev() {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Self::Char(c) | Self::WChar(c) => write!(f, "'{}'", c.escape_default()),
            Self::String(s) | Self::WString(s) => write!(f, "\"{}\"", s.escape_default()),
            Self::Enum(e) => f.write_str(&e.name),
            Self::Data(d) => write!(f, "{}", d),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Map(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    f.write_str(if i > 0 { ", " } else { " " })?;
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str(if fields.is_empty() { "}" } else { " }" })
            }
            Self::Null => f.write_str("null"),
        }
    }
}

// Conversion traits
macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    LongDouble => LongDouble,
    char => Char,
    String => String,
    EnumMember => Enum,
    DynamicData => Data,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Self::Map(v)
    }
}

/// Conversion out of a [`Value`], with range checks for integers.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: &str, value: &Value) -> DynamicDataError {
    DynamicDataError::type_mismatch(expected, value.kind_name())
}

macro_rules! impl_from_value_int {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    let wide = value.as_integer().ok_or_else(|| mismatch($name, &value))?;
                    <$ty>::try_from(wide).map_err(|_| {
                        DynamicDataError::type_mismatch($name, format!("out-of-range {}", wide))
                    })
                }
            }
        )*
    };
}

impl_from_value_int! {
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint32",
    u64 => "uint64",
    i8 => "int8",
    i16 => "int16",
    i32 => "int32",
    i64 => "int64",
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        value.as_float().ok_or_else(|| mismatch("float64", &value))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F32(v) => Ok(v),
            other => other
                .as_float()
                .map(|v| v as f32)
                .ok_or_else(|| mismatch("float32", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch("boolean", &value))
    }
}

impl FromValue for char {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Char(c) | Value::WChar(c) => Ok(c),
            other => Err(mismatch("char", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) | Value::WString(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromValue for LongDouble {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::LongDouble(v) => Ok(v),
            other => Err(mismatch("float128", &other)),
        }
    }
}

impl FromValue for EnumMember {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Enum(e) => Ok(e),
            other => Err(mismatch("enum", &other)),
        }
    }
}

impl FromValue for DynamicData {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Data(d) => Ok(d),
            other => Err(mismatch("data", &other)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_values() {
        let v = Value::from(42u32);
        assert_eq!(v.as_integer(), Some(42));
        assert_eq!(v.as_i32(), None);

        let v = Value::from(std::f64::consts::PI);
        assert_eq!(v.as_f64(), Some(std::f64::consts::PI));

        let v = Value::from("hello");
        assert_eq!(v.as_str(), Some("hello"));
    }

    #[test]
    fn test_integer_range_checks() {
        assert_eq!(u8::from_value(Value::I32(200)).expect("fits"), 200);
        assert!(u8::from_value(Value::I32(256)).is_err());
        assert!(u32::from_value(Value::I8(-1)).is_err());
        assert_eq!(i64::from_value(Value::U32(7)).expect("fits"), 7);
        assert!(i32::from_value(Value::F64(1.0)).is_err());
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(f64::from_value(Value::I32(3)).expect("int"), 3.0);
        assert_eq!(f32::from_value(Value::F64(0.5)).expect("f64"), 0.5);
        assert!(f64::from_value(Value::from("x")).is_err());
    }

    #[test]
    fn test_list_and_option() {
        let v = Value::from(vec![1i32, 2, 3]);
        assert_eq!(v.as_list().map(<[Value]>::len), Some(3));
        assert_eq!(Vec::<i64>::from_value(v).expect("list"), vec![1, 2, 3]);

        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Option::<i32>::from_value(Value::Null).expect("null"), None);
    }

    #[test]
    fn test_map_value() {
        let v: Value = [("x", Value::from(10i32)), ("y", Value::from(20i32))]
            .into_iter()
            .collect();
        assert_eq!(v.get_field("x").and_then(Value::as_i32), Some(10));
        assert!(v.get_field("z").is_none());
        assert_eq!(v.to_string(), "{ x: 10, y: 20 }");
    }

    #[test]
    fn test_display() {
        let e = Value::Enum(EnumMember::new("GREEN", 1));
        assert_eq!(e.to_string(), "GREEN");
        assert_eq!(Value::from("a\"b").to_string(), "\"a\\\"b\"");
        assert_eq!(Value::from(vec![1u8, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
