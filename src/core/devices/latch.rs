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

//! 8-bit output latch (LEDs, coin counters)
//!
//! Declares only start and reset; it has no set-info or stop entry point.

use crate::core::device::{
    devinfo, Device, DeviceClass, DeviceFct, DeviceInfo, DeviceInterface, DevicePeers,
    DeviceStart, DeviceType, StateId,
};
use crate::core::error::Result;

/// Latched output value
pub const INT_OUTPUT: StateId = devinfo::INT_DEVICE_SPECIFIC;

/// Value driven on the outputs after reset
const RESET_VALUE: u8 = 0xFF;

pub struct Latch;

pub fn device_type() -> DeviceType {
    DeviceType::of::<Latch>()
}

pub fn output(device: &Device) -> u8 {
    device
        .token()
        .and_then(|token| token.first().copied())
        .unwrap_or(0)
}

fn start(device: &mut Device, _peers: &DevicePeers<'_>) -> Result<DeviceStart> {
    reset(device);
    Ok(DeviceStart::Ok)
}

fn reset(device: &mut Device) {
    if let Some(value) = device.token_mut().and_then(|token| token.first_mut()) {
        *value = RESET_VALUE;
    }
}

impl DeviceInterface for Latch {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(4),
            devinfo::INT_CLASS => info.set_int(DeviceClass::Other.as_raw()),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(start)),
            devinfo::FCT_RESET => info.set_fct(DeviceFct::Reset(reset)),
            devinfo::STR_NAME => info.set_str("Output Latch"),
            devinfo::STR_FAMILY => info.set_str("Latch"),
            devinfo::STR_VERSION => info.set_str("1.0"),
            devinfo::STR_SOURCE_FILE => info.set_str(file!()),
            _ => {}
        }
    }

    fn device_info(device: &Device, state: StateId, info: &mut DeviceInfo) {
        match state {
            INT_OUTPUT => info.set_int(i64::from(output(device))),
            _ => Self::type_info(state, info),
        }
    }
}
