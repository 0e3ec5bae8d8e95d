// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reference device types
//!
//! Small concrete devices built on the device layer:
//! - [`cpu`]: a processor that fetches its reset vector from its region
//! - [`dac`]: a sound DAC that waits for its CPU to start
//! - [`latch`]: an output latch with only a reset entry point
//!
//! Runtime state lives in the device token and inline configuration as
//! little-endian fields, accessed through the helpers below.

pub mod cpu;
pub mod dac;
pub mod latch;

use crate::core::device::{Device, StateId};

/// Read a little-endian u16 at `offset`, 0 if out of range
#[inline(always)]
pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    bytes
        .get(offset..offset + 2)
        .map_or(0, |b| u16::from_le_bytes([b[0], b[1]]))
}

/// Read a little-endian u32 at `offset`, 0 if out of range
#[inline(always)]
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    bytes
        .get(offset..offset + 4)
        .map_or(0, |b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Write a little-endian u32 at `offset`; out of range writes are dropped
#[inline(always)]
pub(crate) fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
    if let Some(slot) = bytes.get_mut(offset..offset + 4) {
        slot.copy_from_slice(&value.to_le_bytes());
    }
}

/// Narrow a set-info value to a register no wider than `max`
///
/// Out of range values are logged and rejected, leaving the register as is.
pub(crate) fn register_value(device: &Device, state: StateId, value: i64, max: u32) -> Option<u32> {
    match u32::try_from(value) {
        Ok(value) if value <= max => Some(value),
        _ => {
            log::warn!(
                "{}: ignoring value {} for state {:#x}, expected 0..={:#x}",
                device.tag(),
                value,
                state,
                max
            );
            None
        }
    }
}
