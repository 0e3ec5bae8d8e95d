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

use super::super::*;
use crate::core::error::Result;
use crate::core::machine::{Machine, MachineConfig};
use std::cell::RefCell;

/// Shared event log attached to devices as static configuration
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `"<event> <tag>"` if the device carries a journal
    pub fn record(device: &Device, event: &str) {
        if let Some(journal) = device.static_config::<Journal>() {
            journal
                .0
                .borrow_mut()
                .push(format!("{} {}", event, device.tag()));
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|entry| entry.split(' ').next() == Some(event))
            .count()
    }
}

pub const GAUGE_TOKEN_BYTES: usize = 8;
pub const GAUGE_CONFIG_BYTES: usize = 3;
pub const GAUGE_VALUE: StateId = devinfo::INT_DEVICE_SPECIFIC;
pub const GAUGE_LABEL: StateId = devinfo::STR_DEVICE_SPECIFIC;

/// General-class device declaring every entry point
pub struct Gauge;

fn gauge_start(device: &mut Device, _peers: &DevicePeers<'_>) -> Result<DeviceStart> {
    Journal::record(device, "start");
    Ok(DeviceStart::Ok)
}

fn gauge_reset(device: &mut Device) {
    Journal::record(device, "reset");
    if let Some(token) = device.token_mut() {
        token.fill(0);
    }
}

fn gauge_stop(device: &mut Device) {
    Journal::record(device, "stop");
}

fn gauge_set_info(device: &mut Device, state: StateId, info: &DeviceInfo) {
    if let (GAUGE_VALUE, Some(value)) = (state, info.as_int()) {
        if let Some(token) = device.token_mut() {
            token.copy_from_slice(&value.to_le_bytes());
        }
    }
}

pub fn gauge_value(device: &Device) -> i64 {
    device
        .token()
        .and_then(|token| token.try_into().ok())
        .map_or(0, i64::from_le_bytes)
}

impl DeviceInterface for Gauge {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(GAUGE_TOKEN_BYTES as i64),
            devinfo::INT_INLINE_CONFIG_BYTES => info.set_int(GAUGE_CONFIG_BYTES as i64),
            devinfo::INT_CLASS => info.set_int(DeviceClass::General.as_raw()),
            devinfo::FCT_SET_INFO => info.set_fct(DeviceFct::SetInfo(gauge_set_info)),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(gauge_start)),
            devinfo::FCT_STOP => info.set_fct(DeviceFct::Stop(gauge_stop)),
            devinfo::FCT_RESET => info.set_fct(DeviceFct::Reset(gauge_reset)),
            devinfo::STR_NAME => info.set_str("Gauge"),
            devinfo::STR_FAMILY => info.set_str("Test"),
            _ => {}
        }
    }

    fn device_info(device: &Device, state: StateId, info: &mut DeviceInfo) {
        match state {
            GAUGE_VALUE => info.set_int(gauge_value(device)),
            GAUGE_LABEL => info.set_str(&format!("Gauge@{}", device.tag())),
            _ => Self::type_info(state, info),
        }
    }
}

/// Timer-class device with start and reset only
pub struct Ticker;

fn ticker_start(device: &mut Device, _peers: &DevicePeers<'_>) -> Result<DeviceStart> {
    Journal::record(device, "start");
    Ok(DeviceStart::Ok)
}

fn ticker_reset(device: &mut Device) {
    Journal::record(device, "reset");
}

impl DeviceInterface for Ticker {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(4),
            devinfo::INT_CLASS => info.set_int(DeviceClass::Timer.as_raw()),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(ticker_start)),
            devinfo::FCT_RESET => info.set_fct(DeviceFct::Reset(ticker_reset)),
            devinfo::STR_NAME => info.set_str("Ticker"),
            _ => {}
        }
    }
}

/// Static configuration of a [`Chained`] device
pub struct ChainLink {
    /// Tag of the device that has to start first
    pub after: Option<String>,
}

/// Device that defers its start until another device has started
pub struct Chained;

fn chained_start(device: &mut Device, peers: &DevicePeers<'_>) -> Result<DeviceStart> {
    let after = device
        .static_config::<ChainLink>()
        .and_then(|link| link.after.as_deref());

    match after {
        Some(tag) => match peers.find_by_tag(DeviceType::wildcard(), tag) {
            Some(dependency) if dependency.is_started() => Ok(DeviceStart::Ok),
            _ => Ok(DeviceStart::Deferred),
        },
        None => Ok(DeviceStart::Ok),
    }
}

impl DeviceInterface for Chained {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(4),
            devinfo::INT_CLASS => info.set_int(DeviceClass::Other.as_raw()),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(chained_start)),
            devinfo::STR_NAME => info.set_str("Chained"),
            _ => {}
        }
    }
}

/// Device declaring a zero-byte token
pub struct Tokenless;

impl DeviceInterface for Tokenless {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        match state {
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(ticker_start)),
            devinfo::STR_NAME => info.set_str("Tokenless"),
            _ => {}
        }
    }
}

/// Device without a start entry point
pub struct Inert;

impl DeviceInterface for Inert {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(4),
            devinfo::STR_NAME => info.set_str("Inert"),
            _ => {}
        }
    }
}

pub fn gauge() -> DeviceType {
    DeviceType::of::<Gauge>()
}

pub fn ticker() -> DeviceType {
    DeviceType::of::<Ticker>()
}

pub fn chained() -> DeviceType {
    DeviceType::of::<Chained>()
}

/// Machine configuration with the given devices, all sharing one journal
pub fn journaled_config(devices: &[(DeviceType, &str)]) -> (MachineConfig, Journal) {
    let journal = Journal::new();
    let mut config = MachineConfig::new("test");

    for &(device_type, tag) in devices {
        let device = config.devices.add(device_type, tag).unwrap();
        device.set_static_config(journal.clone());
    }

    (config, journal)
}

/// Machine with the given devices, all sharing one journal
pub fn journaled_machine(devices: &[(DeviceType, &str)]) -> (Machine, Journal) {
    let (config, journal) = journaled_config(devices);
    (Machine::new(config), journal)
}

/// Chain of `length` devices inserted in reverse dependency order
///
/// `link0` waits for `link1`, which waits for `link2`, and so on; only the
/// last link can start on the first sweep.
pub fn reverse_chain(length: usize) -> Machine {
    let mut config = MachineConfig::new("chain");

    for index in 0..length {
        let after = (index + 1 < length).then(|| format!("link{}", index + 1));
        let device = config
            .devices
            .add(chained(), &format!("link{}", index))
            .unwrap();
        device.set_static_config(ChainLink { after });
    }

    Machine::new(config)
}

/// Two devices each waiting for the other, optionally after an independent one
pub fn mutual_deferral(with_independent: bool) -> Machine {
    let mut config = MachineConfig::new("deadlock");

    if with_independent {
        config.devices.add(chained(), "solo").unwrap();
    }

    let first = config.devices.add(chained(), "first").unwrap();
    first.set_static_config(ChainLink {
        after: Some("second".to_owned()),
    });
    let second = config.devices.add(chained(), "second").unwrap();
    second.set_static_config(ChainLink {
        after: Some("first".to_owned()),
    });

    Machine::new(config)
}
