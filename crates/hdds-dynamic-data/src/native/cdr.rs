// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Plain little-endian CDR encoding of sample storage.
//!
//! Buffers start with the `CDR_LE` encapsulation header `00 01 00 00`;
//! alignment is relative to the first body byte. Optional struct members
//! are preceded by a presence byte.

use super::storage::{default_scalar, PrimitiveVec, Scalar, Storage};
use crate::config::DataProperty;
use crate::error::{DynamicDataError, Result};
use crate::types::{PrimitiveKind, TypeDescriptor, TypeKind, LONG_DOUBLE_SIZE};
use crate::value::LongDouble;

const ENCAPSULATION_LE: [u8; 4] = [0x00, 0x01, 0x00, 0x00];
const ENCAPSULATION_BE: [u8; 2] = [0x00, 0x00];
const HEADER_LEN: usize = ENCAPSULATION_LE.len();
const LONG_DOUBLE_ALIGN: usize = 8;

fn cdr_error(msg: impl Into<String>) -> DynamicDataError {
    DynamicDataError::Cdr(msg.into())
}

/// Encode `storage` of type `desc`, header included.
pub(crate) fn encode(desc: &TypeDescriptor, storage: &Storage) -> Result<Vec<u8>> {
    let mut encoder = CdrEncoder::new();
    encoder.encode_node(desc, storage)?;
    Ok(encoder.into_bytes())
}

/// Decode a buffer produced by [`encode`] (or any CDR_LE peer).
pub(crate) fn decode(desc: &TypeDescriptor, bytes: &[u8], prop: &DataProperty) -> Result<Storage> {
    if bytes.len() < HEADER_LEN {
        return Err(cdr_error(format!(
            "buffer of {} bytes has no encapsulation header",
            bytes.len()
        )));
    }
    let (header, body) = bytes.split_at(HEADER_LEN);
    if header[..2] == ENCAPSULATION_BE {
        return Err(cdr_error("big-endian CDR is not supported"));
    }
    if header[..2] != ENCAPSULATION_LE[..2] {
        return Err(cdr_error(format!(
            "unknown encapsulation {:02x}{:02x}",
            header[0], header[1]
        )));
    }

    let mut decoder = CdrDecoder::new(body);
    let storage = decoder.decode_node(desc, prop)?;
    if decoder.remaining() > 0 {
        log::trace!(
            "[cdr] {} trailing bytes after '{}'",
            decoder.remaining(),
            desc.name
        );
    }
    Ok(storage)
}

struct CdrEncoder {
    buffer: Vec<u8>,
}

impl CdrEncoder {
    fn new() -> Self {
        let mut buffer = Vec::with_capacity(64);
        buffer.extend_from_slice(&ENCAPSULATION_LE);
        Self { buffer }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn align(&mut self, alignment: usize) {
        let pos = self.buffer.len() - HEADER_LEN;
        let padding = (alignment - (pos % alignment)) % alignment;
        self.buffer.extend(std::iter::repeat_n(0, padding));
    }

    fn put<const N: usize>(&mut self, bytes: [u8; N]) {
        self.align(N);
        self.buffer.extend_from_slice(&bytes);
    }

    fn put_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| cdr_error(format!("length {} overflows u32", len)))?;
        self.put(len.to_le_bytes());
        Ok(())
    }

    fn encode_node(&mut self, desc: &TypeDescriptor, node: &Storage) -> Result<()> {
        let resolved = desc.resolved();
        match (&resolved.kind, node) {
            (_, Storage::Loaned) => Err(cdr_error(format!("'{}' is on loan", desc.name))),
            (_, Storage::Scalar(s)) => self.write_scalar(s),
            (TypeKind::Struct(fields), Storage::Struct(slots)) => {
                for (field, slot) in fields.iter().zip(slots) {
                    if field.optional {
                        self.buffer.push(u8::from(slot.is_some()));
                    }
                    match slot {
                        Some(child) => self.encode_node(&field.type_desc, child)?,
                        None if field.optional => {}
                        None => {
                            return Err(cdr_error(format!("member '{}' is missing", field.name)))
                        }
                    }
                }
                Ok(())
            }
            (
                TypeKind::Union(u),
                Storage::Union {
                    discriminator,
                    value,
                },
            ) => {
                self.write_scalar(&discriminator_scalar(&u.discriminator, *discriminator)?)?;
                if let (Some(case), Some(v)) = (u.case_by_discriminator(*discriminator), value) {
                    self.encode_node(&case.type_desc, v)?;
                }
                Ok(())
            }
            (TypeKind::Sequence(seq), _) => {
                let len = node.len().unwrap_or(0);
                if let Some(max) = seq.max_length.filter(|max| len > *max) {
                    return Err(DynamicDataError::SequenceTooLong { length: len, max });
                }
                self.put_len(len)?;
                self.encode_elements(&seq.element_type, node)
            }
            (TypeKind::Array(arr), _) => {
                let expected = arr.len().unwrap_or(0);
                if node.len() != Some(expected) {
                    return Err(cdr_error(format!(
                        "array '{}' holds {:?} elements, expected {}",
                        desc.name,
                        node.len(),
                        expected
                    )));
                }
                self.encode_elements(&arr.element_type, node)
            }
            _ => Err(cdr_error(format!(
                "storage does not match type '{}'",
                desc.name
            ))),
        }
    }

    fn encode_elements(&mut self, element: &TypeDescriptor, node: &Storage) -> Result<()> {
        match node {
            Storage::Primitives(values) => values.iter().try_for_each(|s| self.write_scalar(&s)),
            Storage::Complex(items) => items
                .iter()
                .try_for_each(|item| self.encode_node(element, item)),
            _ => Err(cdr_error(format!("'{}' is not a collection", element.name))),
        }
    }

    fn write_scalar(&mut self, scalar: &Scalar) -> Result<()> {
        match scalar {
            Scalar::Bool(v) => self.buffer.push(u8::from(*v)),
            Scalar::I8(v) => self.put(v.to_le_bytes()),
            Scalar::I16(v) => self.put(v.to_le_bytes()),
            Scalar::I32(v) | Scalar::Enum(v) => self.put(v.to_le_bytes()),
            Scalar::I64(v) => self.put(v.to_le_bytes()),
            Scalar::U8(v) => self.buffer.push(*v),
            Scalar::U16(v) => self.put(v.to_le_bytes()),
            Scalar::U32(v) => self.put(v.to_le_bytes()),
            Scalar::U64(v) => self.put(v.to_le_bytes()),
            Scalar::F32(v) => self.put(v.to_le_bytes()),
            Scalar::F64(v) => self.put(v.to_le_bytes()),
            Scalar::LongDouble(v) => {
                self.align(LONG_DOUBLE_ALIGN);
                self.buffer.extend_from_slice(&v.0);
            }
            Scalar::Char(c) => {
                let byte = u8::try_from(*c)
                    .map_err(|_| cdr_error(format!("char8 '{}' out of range", c)))?;
                self.buffer.push(byte);
            }
            Scalar::WChar(c) => {
                let unit = u16::try_from(u32::from(*c))
                    .map_err(|_| cdr_error(format!("char16 '{}' out of range", c)))?;
                self.put(unit.to_le_bytes());
            }
            Scalar::String(s) => {
                self.put_len(s.len() + 1)?;
                self.buffer.extend_from_slice(s.as_bytes());
                self.buffer.push(0);
            }
            Scalar::WString(s) => {
                let units: Vec<u16> = s.encode_utf16().collect();
                self.put_len(units.len() + 1)?;
                for unit in units {
                    self.buffer.extend_from_slice(&unit.to_le_bytes());
                }
                self.buffer.extend_from_slice(&0u16.to_le_bytes());
            }
        }
        Ok(())
    }
}

struct CdrDecoder<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> CdrDecoder<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn align(&mut self, alignment: usize) {
        self.offset = (self.offset + alignment - 1) & !(alignment - 1);
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(count)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| {
                cdr_error(format!(
                    "buffer too small: need {} bytes, have {}",
                    count,
                    self.remaining()
                ))
            })?;
        let slice = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.align(N);
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_len(&mut self) -> Result<usize> {
        let len = u32::from_le_bytes(self.take()?);
        usize::try_from(len).map_err(|_| cdr_error(format!("length {} overflows usize", len)))
    }

    fn decode_node(&mut self, desc: &TypeDescriptor, prop: &DataProperty) -> Result<Storage> {
        let resolved = desc.resolved();
        match &resolved.kind {
            TypeKind::Primitive(p) => self.read_primitive(*p).map(Storage::Scalar),
            TypeKind::Enum(_) => Ok(Storage::Scalar(Scalar::Enum(i32::from_le_bytes(
                self.take()?,
            )))),
            TypeKind::Struct(fields) => {
                let mut slots = Vec::with_capacity(fields.len());
                for field in fields {
                    let present = !field.optional || self.take::<1>()?[0] != 0;
                    slots.push(if present {
                        Some(self.decode_node(&field.type_desc, prop)?)
                    } else {
                        None
                    });
                }
                Ok(Storage::Struct(slots))
            }
            TypeKind::Union(u) => {
                let discriminator = match self.decode_node(&u.discriminator, prop)? {
                    Storage::Scalar(s) => discriminator_label(&s)?,
                    _ => return Err(cdr_error("union discriminator is not a scalar")),
                };
                let value = match u.case_by_discriminator(discriminator) {
                    Some(case) => Some(Box::new(self.decode_node(&case.type_desc, prop)?)),
                    None => None,
                };
                Ok(Storage::Union {
                    discriminator,
                    value,
                })
            }
            TypeKind::Sequence(seq) => {
                let len = self.read_len()?;
                if let Some(max) = seq.max_length.filter(|max| len > *max) {
                    return Err(cdr_error(format!(
                        "sequence '{}' length {} exceeds bound {}",
                        desc.name, len, max
                    )));
                }
                self.decode_elements(&seq.element_type, len, prop)
            }
            TypeKind::Array(arr) => {
                self.decode_elements(&arr.element_type, arr.len().unwrap_or(0), prop)
            }
            TypeKind::Alias(_) => Err(cdr_error(format!("unresolved alias '{}'", desc.name))),
        }
    }

    fn decode_elements(
        &mut self,
        element: &TypeDescriptor,
        len: usize,
        prop: &DataProperty,
    ) -> Result<Storage> {
        // Capacity is capped by the bytes left in the buffer.
        let capacity = len.min(self.remaining());
        match default_scalar(element) {
            Some(fill) => {
                let mut values = PrimitiveVec::filled(&fill, 0);
                values.reserve(capacity);
                for _ in 0..len {
                    match self.decode_node(element, prop)? {
                        Storage::Scalar(s) => values.push(s)?,
                        _ => return Err(cdr_error("primitive element decoded as aggregate")),
                    }
                }
                Ok(Storage::Primitives(values))
            }
            None => {
                let mut items = Vec::with_capacity(capacity);
                for _ in 0..len {
                    items.push(self.decode_node(element, prop)?);
                }
                Ok(Storage::Complex(items))
            }
        }
    }

    fn read_primitive(&mut self, kind: PrimitiveKind) -> Result<Scalar> {
        Ok(match kind {
            PrimitiveKind::Bool => Scalar::Bool(self.take::<1>()?[0] != 0),
            PrimitiveKind::I8 => Scalar::I8(i8::from_le_bytes(self.take()?)),
            PrimitiveKind::I16 => Scalar::I16(i16::from_le_bytes(self.take()?)),
            PrimitiveKind::I32 => Scalar::I32(i32::from_le_bytes(self.take()?)),
            PrimitiveKind::I64 => Scalar::I64(i64::from_le_bytes(self.take()?)),
            PrimitiveKind::U8 => Scalar::U8(self.take::<1>()?[0]),
            PrimitiveKind::U16 => Scalar::U16(u16::from_le_bytes(self.take()?)),
            PrimitiveKind::U32 => Scalar::U32(u32::from_le_bytes(self.take()?)),
            PrimitiveKind::U64 => Scalar::U64(u64::from_le_bytes(self.take()?)),
            PrimitiveKind::F32 => Scalar::F32(f32::from_le_bytes(self.take()?)),
            PrimitiveKind::F64 => Scalar::F64(f64::from_le_bytes(self.take()?)),
            PrimitiveKind::LongDouble => {
                self.align(LONG_DOUBLE_ALIGN);
                let mut raw = [0u8; LONG_DOUBLE_SIZE];
                raw.copy_from_slice(self.read_bytes(LONG_DOUBLE_SIZE)?);
                Scalar::LongDouble(LongDouble(raw))
            }
            PrimitiveKind::Char => Scalar::Char(char::from(self.take::<1>()?[0])),
            PrimitiveKind::WChar => {
                let unit = u16::from_le_bytes(self.take()?);
                Scalar::WChar(
                    char::from_u32(u32::from(unit))
                        .ok_or_else(|| cdr_error(format!("invalid char16 {:#06x}", unit)))?,
                )
            }
            PrimitiveKind::String { max_length } => {
                let len = self.read_len()?;
                let bytes = self.read_bytes(len)?;
                let text = bytes.strip_suffix(&[0]).unwrap_or(bytes);
                let s = String::from_utf8(text.to_vec())
                    .map_err(|e| cdr_error(format!("invalid UTF-8 string: {}", e)))?;
                check_bound(s.len(), max_length)?;
                Scalar::String(s)
            }
            PrimitiveKind::WString { max_length } => {
                let len = self.read_len()?;
                let byte_len = len
                    .checked_mul(2)
                    .ok_or_else(|| cdr_error(format!("wstring length {} overflows", len)))?;
                let bytes = self.read_bytes(byte_len)?;
                let mut units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                if units.last() == Some(&0) {
                    units.pop();
                }
                check_bound(units.len(), max_length)?;
                Scalar::WString(
                    String::from_utf16(&units)
                        .map_err(|e| cdr_error(format!("invalid UTF-16 string: {}", e)))?,
                )
            }
        })
    }
}

fn check_bound(length: usize, max: Option<usize>) -> Result<()> {
    match max {
        Some(max) if length > max => Err(cdr_error(format!(
            "string length {} exceeds bound {}",
            length, max
        ))),
        _ => Ok(()),
    }
}

/// Wire scalar for a union label, typed after the discriminator.
fn discriminator_scalar(desc: &TypeDescriptor, label: i64) -> Result<Scalar> {
    let bad = || cdr_error(format!("discriminator {} does not fit '{}'", label, desc.name));

    macro_rules! narrow {
        ($variant:ident, $ty:ty) => {
            <$ty>::try_from(label).map(Scalar::$variant).map_err(|_| bad())
        };
    }

    match &desc.resolved().kind {
        TypeKind::Enum(_) => narrow!(Enum, i32),
        TypeKind::Primitive(p) => match p {
            PrimitiveKind::Bool => Ok(Scalar::Bool(label != 0)),
            PrimitiveKind::I8 => narrow!(I8, i8),
            PrimitiveKind::I16 => narrow!(I16, i16),
            PrimitiveKind::I32 => narrow!(I32, i32),
            PrimitiveKind::I64 => Ok(Scalar::I64(label)),
            PrimitiveKind::U8 => narrow!(U8, u8),
            PrimitiveKind::U16 => narrow!(U16, u16),
            PrimitiveKind::U32 => narrow!(U32, u32),
            PrimitiveKind::U64 => narrow!(U64, u64),
            PrimitiveKind::Char => u8::try_from(label)
                .map(|b| Scalar::Char(char::from(b)))
                .map_err(|_| bad()),
            PrimitiveKind::WChar => u16::try_from(label)
                .ok()
                .and_then(|unit| char::from_u32(u32::from(unit)))
                .map(Scalar::WChar)
                .ok_or_else(bad),
            _ => Err(bad()),
        },
        _ => Err(bad()),
    }
}

fn discriminator_label(scalar: &Scalar) -> Result<i64> {
    Ok(match scalar {
        Scalar::Bool(v) => i64::from(*v),
        Scalar::I8(v) => i64::from(*v),
        Scalar::I16(v) => i64::from(*v),
        Scalar::I32(v) | Scalar::Enum(v) => i64::from(*v),
        Scalar::I64(v) => *v,
        Scalar::U8(v) => i64::from(*v),
        Scalar::U16(v) => i64::from(*v),
        Scalar::U32(v) => i64::from(*v),
        Scalar::U64(v) => {
            i64::try_from(*v).map_err(|_| cdr_error(format!("discriminator {} overflows", v)))?
        }
        Scalar::Char(c) | Scalar::WChar(c) => i64::from(u32::from(*c)),
        other => {
            return Err(cdr_error(format!(
                "{} cannot be a union discriminator",
                other.kind_name()
            )))
        }
    })
}
