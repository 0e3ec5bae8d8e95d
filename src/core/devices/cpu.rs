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

//! Reference processor
//!
//! The CPU keeps its clock in inline configuration and its program counter in
//! the token. On start and on every reset it loads the program counter from
//! the reset vector, the first little-endian halfword of its region.
//!
//! ## Token Layout
//!
//! ```text
//! Offset | Size | Field
//! -------|------|------------------
//! 0x00   | 4    | program counter
//! 0x04   | 4    | reset vector
//! 0x08   | 4    | reset count
//! 0x0C   | 4    | reserved
//! ```

use super::{read_u16, read_u32, register_value, write_u32};
use crate::core::device::{
    devinfo, Device, DeviceClass, DeviceFct, DeviceInfo, DeviceInterface, DevicePeers,
    DeviceStart, DeviceType, StateId,
};
use crate::core::error::Result;
use crate::core::machine::config::param_u32;

/// Clock frequency in Hz (inline configuration)
pub const INT_CLOCK: StateId = devinfo::INT_DEVICE_SPECIFIC;
/// Current program counter
pub const INT_PC: StateId = devinfo::INT_DEVICE_SPECIFIC + 1;
/// Number of resets since start
pub const INT_RESET_COUNT: StateId = devinfo::INT_DEVICE_SPECIFIC + 2;
/// One-line register dump
pub const STR_REGISTERS: StateId = devinfo::STR_DEVICE_SPECIFIC;

const TOKEN_BYTES: usize = 16;
const CONFIG_BYTES: usize = 4;

const PC: usize = 0x00;
const VECTOR: usize = 0x04;
const RESETS: usize = 0x08;

const CLOCK: usize = 0x00;

/// Reference processor type
pub struct Cpu;

pub fn device_type() -> DeviceType {
    DeviceType::of::<Cpu>()
}

/// Apply description parameters (`clock`)
pub fn configure(device: &mut Device, params: &toml::Table) -> Result<()> {
    if let Some(clock) = param_u32(params, "clock", device.tag())? {
        write_u32(device.inline_config_mut(), CLOCK, clock);
    }
    Ok(())
}

/// Configured clock frequency in Hz
pub fn clock(device: &Device) -> u32 {
    read_u32(device.inline_config(), CLOCK)
}

/// Current program counter, 0 when not started
pub fn pc(device: &Device) -> u32 {
    device.token().map_or(0, |token| read_u32(token, PC))
}

fn start(device: &mut Device, _peers: &DevicePeers<'_>) -> Result<DeviceStart> {
    let vector = device.region().map_or(0, |region| read_u16(region, 0));
    if device.region().is_none() {
        log::warn!("CPU {}: no region, reset vector defaults to 0", device.tag());
    }

    if let Some(token) = device.token_mut() {
        write_u32(token, VECTOR, u32::from(vector));
        write_u32(token, PC, u32::from(vector));
    }

    log::debug!(
        "CPU {}: clock {} Hz, reset vector {:#06x}",
        device.tag(),
        clock(device),
        vector
    );
    Ok(DeviceStart::Ok)
}

fn reset(device: &mut Device) {
    if let Some(token) = device.token_mut() {
        let vector = read_u32(token, VECTOR);
        let resets = read_u32(token, RESETS).wrapping_add(1);
        write_u32(token, PC, vector);
        write_u32(token, RESETS, resets);
    }
}

fn stop(device: &mut Device) {
    log::debug!("CPU {}: halted at PC {:#06x}", device.tag(), pc(device));
}

fn set_info(device: &mut Device, state: StateId, info: &DeviceInfo) {
    if state != INT_PC {
        return;
    }

    let Some(value) = info.as_int() else {
        return;
    };
    let Some(value) = register_value(device, state, value, u32::MAX) else {
        return;
    };
    if let Some(token) = device.token_mut() {
        write_u32(token, PC, value);
    }
}

impl DeviceInterface for Cpu {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(TOKEN_BYTES as i64),
            devinfo::INT_INLINE_CONFIG_BYTES => info.set_int(CONFIG_BYTES as i64),
            devinfo::INT_CLASS => info.set_int(DeviceClass::CpuChip.as_raw()),

            devinfo::FCT_SET_INFO => info.set_fct(DeviceFct::SetInfo(set_info)),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(start)),
            devinfo::FCT_STOP => info.set_fct(DeviceFct::Stop(stop)),
            devinfo::FCT_RESET => info.set_fct(DeviceFct::Reset(reset)),

            devinfo::STR_NAME => info.set_str("Reference CPU"),
            devinfo::STR_FAMILY => info.set_str("Reference"),
            devinfo::STR_VERSION => info.set_str("1.0"),
            devinfo::STR_SOURCE_FILE => info.set_str(file!()),
            devinfo::STR_CREDITS => info.set_str("Copyright 2025 itsakeyfut"),
            _ => {}
        }
    }

    fn device_info(device: &Device, state: StateId, info: &mut DeviceInfo) {
        match state {
            INT_CLOCK => info.set_int(i64::from(clock(device))),
            INT_PC => info.set_int(i64::from(pc(device))),
            INT_RESET_COUNT => {
                let resets = device.token().map_or(0, |token| read_u32(token, RESETS));
                info.set_int(i64::from(resets));
            }
            STR_REGISTERS => info.set_str(&format!(
                "PC={:08X} VEC={:04X}",
                pc(device),
                device.token().map_or(0, |token| read_u32(token, VECTOR))
            )),
            _ => Self::type_info(state, info),
        }
    }
}
