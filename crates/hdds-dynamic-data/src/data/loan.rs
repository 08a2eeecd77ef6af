// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scoped loans of nested members.

use super::{convert, DynamicData};
use crate::config::DataProperty;
use crate::native::Storage;
use crate::types::TypeDescriptor;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Exclusive view of a nested struct, union or collection member.
///
/// Obtained from [`DynamicData::loan_value`]. The member's storage moves
/// into the loan and is written back when the loan is dropped or
/// [returned](LoanedData::return_loan). While the loan lives the parent is
/// mutably borrowed:
///
/// ```compile_fail
/// use hdds_dynamic_data::{DynamicData, PrimitiveKind, TypeDescriptorBuilder};
/// use std::sync::Arc;
///
/// let inner = Arc::new(TypeDescriptorBuilder::new("Inner").field("v", PrimitiveKind::I32).build());
/// let desc = Arc::new(TypeDescriptorBuilder::new("Outer").field_with_type("inner", inner).build());
/// let mut data = DynamicData::new(&desc);
///
/// let loan = data.loan_value("inner").unwrap();
/// data.clear_all_members().unwrap();
/// drop(loan);
/// ```
///
/// ```
/// use hdds_dynamic_data::{DynamicData, PrimitiveKind, TypeDescriptorBuilder};
/// use std::sync::Arc;
///
/// let inner = Arc::new(TypeDescriptorBuilder::new("Inner").field("v", PrimitiveKind::I32).build());
/// let desc = Arc::new(TypeDescriptorBuilder::new("Outer").field_with_type("inner", inner).build());
/// let mut data = DynamicData::new(&desc);
///
/// let mut loan = data.loan_value("inner").unwrap();
/// loan.set("v", 5i32).unwrap();
/// loan.return_loan();
///
/// assert_eq!(data.get_i32("inner.v").unwrap(), 5);
/// ```
///
/// A loan that is leaked with [`std::mem::forget`] leaves the slot marked
/// as loaned; later access to it fails with
/// [`LoanOutstanding`](crate::DynamicDataError::LoanOutstanding).
#[derive(Debug)]
pub struct LoanedData<'a> {
    slot: &'a mut Storage,
    expected: Arc<TypeDescriptor>,
    data: DynamicData,
}

impl<'a> LoanedData<'a> {
    pub(crate) fn take(slot: &'a mut Storage, desc: Arc<TypeDescriptor>, prop: DataProperty) -> Self {
        let storage = mem::replace(slot, Storage::Loaned);
        log::trace!("[dynamic] loaned '{}'", desc.name);
        Self {
            slot,
            expected: desc.clone(),
            data: DynamicData::from_parts(desc, storage, prop),
        }
    }

    /// Write the member back into the parent and end the loan.
    pub fn return_loan(self) {}

    /// Independent copy of the loaned member.
    pub fn to_data(&self) -> DynamicData {
        self.data.clone()
    }
}

impl Deref for LoanedData<'_> {
    type Target = DynamicData;

    fn deref(&self) -> &DynamicData {
        &self.data
    }
}

impl DerefMut for LoanedData<'_> {
    fn deref_mut(&mut self) -> &mut DynamicData {
        &mut self.data
    }
}

impl Drop for LoanedData<'_> {
    fn drop(&mut self) {
        let storage = mem::replace(&mut self.data.storage, Storage::Loaned);
        *self.slot = if convert::same_type(&self.data.desc, &self.expected) {
            storage
        } else {
            log::warn!(
                "[dynamic] loan of '{}' came back as '{}', resetting member",
                self.expected.name,
                self.data.desc.name
            );
            Storage::new(&self.expected, &self.data.prop)
        };
        log::trace!("[dynamic] returned loan '{}'", self.expected.name);
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{PrimitiveKind, TypeDescriptor, TypeDescriptorBuilder, UnionBuilder};
    use crate::{DynamicData, DynamicDataError, Value};
    use std::sync::Arc;

    fn nested() -> Arc<TypeDescriptor> {
        let inner = Arc::new(
            TypeDescriptorBuilder::new("Inner")
                .field("v", PrimitiveKind::I32)
                .sequence_field("s", PrimitiveKind::U8)
                .build(),
        );
        Arc::new(
            TypeDescriptorBuilder::new("Outer")
                .field_with_type("inner", inner.clone())
                .optional_field_with_type("maybe", inner)
                .field("n", PrimitiveKind::U16)
                .build(),
        )
    }

    #[test]
    fn test_loan_writes_back_on_drop() {
        let mut data = DynamicData::new(&nested());
        {
            let mut loan = data.loan_value("inner").expect("loan");
            loan.set("v", 3i32).expect("v");
            loan.set("s[0]", 7u8).expect("s");
        }
        assert_eq!(data.get("inner.v"), Ok(Value::I32(3)));
        assert_eq!(data.get_u8_values("inner.s"), Ok(vec![7]));
    }

    #[test]
    fn test_loan_activates_optional() {
        let mut data = DynamicData::new(&nested());
        assert!(!data.member_exists("maybe"));
        let loan = data.loan_value("maybe").expect("loan");
        assert_eq!(loan.type_name(), "Inner");
        loan.return_loan();
        assert!(data.member_exists("maybe"));
    }

    #[test]
    fn test_loan_rejects_primitive() {
        let mut data = DynamicData::new(&nested());
        assert!(matches!(
            data.loan_value("n"),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_leaked_loan_is_detected() {
        let mut data = DynamicData::new(&nested());
        std::mem::forget(data.loan_value("inner").expect("loan"));

        assert!(matches!(
            data.get("inner.v"),
            Err(DynamicDataError::LoanOutstanding(_))
        ));
        assert!(matches!(
            data.clear_all_members(),
            Err(DynamicDataError::LoanOutstanding(_))
        ));
        assert!(matches!(
            data.set("inner.v", 1i32),
            Err(DynamicDataError::LoanOutstanding(_))
        ));
        assert!(data.to_cdr_buffer().is_err());
        // Unrelated members stay usable.
        data.set("n", 1u16).expect("n");
    }

    #[test]
    fn test_swapped_loan_content_is_reset() {
        let mut data = DynamicData::new(&nested());
        data.set("inner.v", 9i32).expect("v");
        {
            let mut loan = data.loan_value("inner").expect("loan");
            *loan = DynamicData::new(&nested());
        }
        assert_eq!(data.get("inner.v"), Ok(Value::I32(0)));
    }

    #[test]
    fn test_loan_union_case_selects_it() {
        let point = Arc::new(
            TypeDescriptorBuilder::new("P")
                .field("x", PrimitiveKind::F32)
                .build(),
        );
        let desc = Arc::new(
            UnionBuilder::with_i32_discriminator("U")
                .primitive_case("code", 1, PrimitiveKind::I32)
                .case("point", 2, point)
                .build(),
        );
        let mut data = DynamicData::new(&desc);
        {
            let mut loan = data.loan_value("point").expect("loan");
            loan.set("x", 2.5f32).expect("x");
        }
        assert_eq!(data.discriminator_value(), Ok(2));
        assert_eq!(data.get("point.x"), Ok(Value::F32(2.5)));
    }

    #[test]
    fn test_to_data_is_independent() {
        let mut data = DynamicData::new(&nested());
        let copy = {
            let mut loan = data.loan_value("inner").expect("loan");
            loan.set("v", 1i32).expect("v");
            let copy = loan.to_data();
            loan.set("v", 2i32).expect("v");
            copy
        };
        assert_eq!(copy.get("v"), Ok(Value::I32(1)));
        assert_eq!(data.get("inner.v"), Ok(Value::I32(2)));
    }
}
