// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process sample storage and its CDR codec.

pub(crate) mod cdr;
mod storage;

pub(crate) use storage::{
    default_scalar, exists, slot, slot_mut, PrimitiveVec, Scalar, Slot, SlotMut, Storage,
};
