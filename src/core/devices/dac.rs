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

//! Reference sound DAC
//!
//! The DAC is driven by a CPU named in its static configuration. The CPU tag
//! is resolved relative to the DAC's own tag, so `sound:dac` with `cpu =
//! "audiocpu"` looks for `sound:audiocpu`. Start is deferred until that CPU
//! has started.

use super::{cpu, read_u32, register_value, write_u32};
use crate::core::device::tag::inherit_tag;
use crate::core::device::{
    devinfo, Device, DeviceClass, DeviceFct, DeviceInfo, DeviceInterface, DevicePeers,
    DeviceStart, DeviceType, StateId,
};
use crate::core::error::{DeviceError, Result};
use crate::core::machine::config::{param_str, param_u32};

/// Output volume, 0-255 (inline configuration)
pub const INT_VOLUME: StateId = devinfo::INT_DEVICE_SPECIFIC;
/// Last sample written
pub const INT_SAMPLE: StateId = devinfo::INT_DEVICE_SPECIFIC + 1;
/// Static configuration ([`DacConfig`])
pub const PTR_CONFIG: StateId = devinfo::PTR_DEVICE_SPECIFIC;
/// Resolved tag of the driving CPU
pub const STR_CPU_TAG: StateId = devinfo::STR_DEVICE_SPECIFIC;

const DEFAULT_VOLUME: u32 = 0xFF;

const TOKEN_BYTES: usize = 4;
const CONFIG_BYTES: usize = 4;

const SAMPLE: usize = 0x00;
const VOLUME: usize = 0x00;

/// Static configuration of a DAC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DacConfig {
    /// Tag of the driving CPU, relative to the DAC's tag
    pub cpu: String,
}

impl Default for DacConfig {
    fn default() -> Self {
        Self {
            cpu: "maincpu".to_owned(),
        }
    }
}

/// Reference DAC type
pub struct Dac;

pub fn device_type() -> DeviceType {
    DeviceType::of::<Dac>()
}

/// Apply description parameters (`cpu`, `volume`)
pub fn configure(device: &mut Device, params: &toml::Table) -> Result<()> {
    let mut config = DacConfig::default();
    if let Some(cpu) = param_str(params, "cpu", device.tag())? {
        config.cpu = cpu.to_owned();
    }

    let volume = param_u32(params, "volume", device.tag())?.unwrap_or(DEFAULT_VOLUME);
    if volume > 0xFF {
        return Err(DeviceError::InvalidParameter {
            tag: device.tag().to_owned(),
            name: "volume".to_owned(),
            reason: format!("{} is out of range 0-255", volume),
        });
    }

    write_u32(device.inline_config_mut(), VOLUME, volume);
    device.set_static_config(config);
    Ok(())
}

/// Tag of the CPU driving this DAC
pub fn cpu_tag(device: &Device) -> String {
    let cpu = device
        .static_config::<DacConfig>()
        .map_or("maincpu", |config| config.cpu.as_str());
    inherit_tag(device.tag(), cpu)
}

pub fn volume(device: &Device) -> u32 {
    read_u32(device.inline_config(), VOLUME)
}

/// Last sample written, 0 when not started
pub fn sample(device: &Device) -> u32 {
    device.token().map_or(0, |token| read_u32(token, SAMPLE))
}

fn start(device: &mut Device, peers: &DevicePeers<'_>) -> Result<DeviceStart> {
    let cpu_tag = cpu_tag(device);

    let Some(cpu) = peers.find_by_tag(cpu::device_type(), &cpu_tag) else {
        return Err(DeviceError::StartFailed {
            tag: device.tag().to_owned(),
            reason: format!("CPU {} not found", cpu_tag),
        });
    };

    if !cpu.is_started() {
        return Ok(DeviceStart::Deferred);
    }

    log::debug!(
        "DAC {}: driven by {} at {} Hz",
        device.tag(),
        cpu_tag,
        cpu::clock(cpu)
    );
    Ok(DeviceStart::Ok)
}

fn reset(device: &mut Device) {
    if let Some(token) = device.token_mut() {
        write_u32(token, SAMPLE, 0);
    }
}

fn set_info(device: &mut Device, state: StateId, info: &DeviceInfo) {
    if state != INT_SAMPLE && state != INT_VOLUME {
        return;
    }
    let Some(value) = info.as_int() else {
        return;
    };
    let Some(value) = register_value(device, state, value, 0xFF) else {
        return;
    };

    if state == INT_SAMPLE {
        if let Some(token) = device.token_mut() {
            write_u32(token, SAMPLE, value);
        }
    } else {
        write_u32(device.inline_config_mut(), VOLUME, value);
    }
}

impl DeviceInterface for Dac {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(TOKEN_BYTES as i64),
            devinfo::INT_INLINE_CONFIG_BYTES => info.set_int(CONFIG_BYTES as i64),
            devinfo::INT_CLASS => info.set_int(DeviceClass::SoundChip.as_raw()),

            devinfo::FCT_SET_INFO => info.set_fct(DeviceFct::SetInfo(set_info)),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(start)),
            devinfo::FCT_RESET => info.set_fct(DeviceFct::Reset(reset)),

            devinfo::STR_NAME => info.set_str("DAC"),
            devinfo::STR_FAMILY => info.set_str("DAC"),
            devinfo::STR_VERSION => info.set_str("1.0"),
            devinfo::STR_SOURCE_FILE => info.set_str(file!()),
            devinfo::STR_CREDITS => info.set_str("Copyright 2025 itsakeyfut"),
            _ => {}
        }
    }

    fn device_info(device: &Device, state: StateId, info: &mut DeviceInfo) {
        match state {
            INT_VOLUME => info.set_int(i64::from(volume(device))),
            INT_SAMPLE => info.set_int(i64::from(sample(device))),
            PTR_CONFIG => {
                if let Some(config) = device.static_config_ptr() {
                    info.set_ptr(config.clone());
                }
            }
            STR_CPU_TAG => info.set_str(&cpu_tag(device)),
            _ => Self::type_info(state, info),
        }
    }
}
