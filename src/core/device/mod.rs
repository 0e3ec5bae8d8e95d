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

//! Device interface layer
//!
//! This module lets a machine host any number of heterogeneous devices
//! (processors, sound chips, glue logic) through one uniform abstraction:
//!
//! - [`info`]: the per-type capability query protocol
//! - [`tag`]: hierarchical device addressing
//! - [`list`]: the device registry
//! - [`lifecycle`]: runtime state allocation and start/reset/stop
//! - [`scratch`]: rotating scratch buffers for string queries
//!
//! # Device Lifecycle
//!
//! ```text
//!  add()        start()               stop()
//! ──────► Unstarted ──────► Started ──────► Stopped
//!                            │   ▲
//!                            └───┘ reset()
//! ```
//!
//! Runtime fields (token, machine, region) exist only while a device is
//! `Started`.

pub mod info;
pub mod lifecycle;
pub mod list;
pub mod scratch;
pub mod tag;

#[cfg(test)]
mod tests;

pub use info::{
    devinfo, DeviceClass, DeviceFct, DeviceFunctions, DeviceInfo, DeviceInterface, DeviceStart,
    DeviceType, InfoPtr, InfoRange, StateId,
};
pub use lifecycle::{DevicePeers, StartupSummary};
pub use list::DeviceList;
pub use scratch::ScratchPool;

use crate::core::machine::MachineContext;
use info::SetInfoFn;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Lifecycle state of one device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Configured, no runtime state yet
    Unstarted,
    /// Runtime state allocated and start entry point succeeded
    Started,
    /// Torn down; runtime state released
    Stopped,
}

/// One configured device
///
/// Records are boxed by the [`DeviceList`] and never move once added.
pub struct Device {
    device_type: DeviceType,
    class: DeviceClass,
    tag: String,
    inline_config: Box<[u8]>,
    static_config: Option<InfoPtr>,
    set_info: Option<SetInfoFn>,

    state: DeviceState,
    token: Option<Box<[u8]>>,
    token_bytes: usize,
    machine: Option<Rc<MachineContext>>,
    region: Option<Rc<[u8]>>,
    region_bytes: usize,
}

impl Device {
    fn new(device_type: DeviceType, tag: &str) -> Self {
        let config_bytes = device_type.inline_config_bytes();

        Self {
            device_type,
            class: device_type.class(),
            tag: tag.to_owned(),
            inline_config: vec![0; config_bytes].into_boxed_slice(),
            static_config: None,
            set_info: device_type.set_info_fn(),
            state: DeviceState::Unstarted,
            token: None,
            token_bytes: 0,
            machine: None,
            region: None,
            region_bytes: 0,
        }
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.state == DeviceState::Started
    }

    /// Inline configuration bytes, sized by the device type
    pub fn inline_config(&self) -> &[u8] {
        &self.inline_config
    }

    pub fn inline_config_mut(&mut self) -> &mut [u8] {
        &mut self.inline_config
    }

    /// Attach a type-specific static configuration
    pub fn set_static_config<T: Any>(&mut self, config: T) {
        self.static_config = Some(Rc::new(config));
    }

    /// Static configuration, if one of type `T` is attached
    pub fn static_config<T: Any>(&self) -> Option<&T> {
        self.static_config.as_ref()?.downcast_ref::<T>()
    }

    /// Type-erased static configuration, for pointer queries
    pub fn static_config_ptr(&self) -> Option<&InfoPtr> {
        self.static_config.as_ref()
    }

    /// Runtime state block (only while started)
    pub fn token(&self) -> Option<&[u8]> {
        self.token.as_deref()
    }

    pub fn token_mut(&mut self) -> Option<&mut [u8]> {
        self.token.as_deref_mut()
    }

    pub fn token_bytes(&self) -> usize {
        self.token_bytes
    }

    /// Owning machine (set by attach, cleared by stop)
    pub fn machine(&self) -> Option<&Rc<MachineContext>> {
        self.machine.as_ref()
    }

    /// Memory region sharing this device's tag (only while started)
    pub fn region(&self) -> Option<&[u8]> {
        self.region.as_deref()
    }

    pub fn region_bytes(&self) -> usize {
        self.region_bytes
    }

    /// Query an integer value from this device
    pub fn get_info_int(&self, state: StateId) -> i64 {
        debug_assert!(InfoRange::Int.contains(state), "state {state:#x} is not an integer state");
        let mut info = DeviceInfo::for_state(state);
        self.device_type.query_device(self, state, &mut info);
        info.as_int().unwrap_or(0)
    }

    /// Query a pointer value from this device
    pub fn get_info_ptr(&self, state: StateId) -> Option<InfoPtr> {
        debug_assert!(InfoRange::Ptr.contains(state), "state {state:#x} is not a pointer state");
        let mut info = DeviceInfo::for_state(state);
        self.device_type.query_device(self, state, &mut info);
        info.as_ptr().cloned()
    }

    /// Query an entry point from this device
    pub fn get_info_fct(&self, state: StateId) -> Option<DeviceFct> {
        debug_assert!(InfoRange::Fct.contains(state), "state {state:#x} is not a function state");
        let mut info = DeviceInfo::for_state(state);
        self.device_type.query_device(self, state, &mut info);
        info.as_fct().cloned()
    }

    /// Query a string value from this device
    pub fn get_info_string(&self, state: StateId) -> String {
        debug_assert!(InfoRange::Str.contains(state), "state {state:#x} is not a string state");
        let mut info = DeviceInfo::for_state(state);
        self.device_type.query_device(self, state, &mut info);
        match info {
            DeviceInfo::Str(text) => text,
            _ => String::new(),
        }
    }

    /// Query a string value from this device into the next scratch buffer
    pub fn get_info_string_in<'p>(&self, state: StateId, pool: &'p mut ScratchPool) -> &'p str {
        debug_assert!(InfoRange::Str.contains(state), "state {state:#x} is not a string state");
        let buffer = pool.acquire();
        let mut info = DeviceInfo::Str(buffer.take_string());
        self.device_type.query_device(self, state, &mut info);
        if let DeviceInfo::Str(text) = info {
            buffer.restore_string(text);
        }
        buffer.as_str()
    }

    pub fn name(&self) -> String {
        self.get_info_string(devinfo::STR_NAME)
    }

    pub fn set_info_int(&mut self, state: StateId, value: i64) {
        debug_assert!(InfoRange::Int.contains(state), "state {state:#x} is not an integer state");
        self.set_info(state, &DeviceInfo::Int(value));
    }

    pub fn set_info_ptr(&mut self, state: StateId, value: InfoPtr) {
        debug_assert!(InfoRange::Ptr.contains(state), "state {state:#x} is not a pointer state");
        self.set_info(state, &DeviceInfo::Ptr(Some(value)));
    }

    pub fn set_info_fct(&mut self, state: StateId, value: DeviceFct) {
        debug_assert!(InfoRange::Fct.contains(state), "state {state:#x} is not a function state");
        self.set_info(state, &DeviceInfo::Fct(Some(value)));
    }

    pub fn set_info_string(&mut self, state: StateId, value: &str) {
        debug_assert!(InfoRange::Str.contains(state), "state {state:#x} is not a string state");
        self.set_info(state, &DeviceInfo::Str(value.to_owned()));
    }

    fn set_info(&mut self, state: StateId, info: &DeviceInfo) {
        debug_assert!(self.token.is_some(), "set_info on device {} that is not started", self.tag);

        let set_info = self.set_info;
        match set_info {
            Some(set_info) => set_info(self, state, info),
            None => log::warn!(
                "Device {} ({}) has no set_info; ignoring state {:#x}",
                self.tag,
                self.device_type.name(),
                state
            ),
        }
    }

    /// Snapshot of this device for listings
    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            tag: self.tag.clone(),
            name: self.name(),
            class: self.class,
            state: self.state,
            token_bytes: self.device_type.token_bytes(),
            inline_config_bytes: self.inline_config.len(),
            region_bytes: self.region_bytes,
            functions: self.device_type.functions().names(),
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("type", &self.device_type)
            .field("class", &self.class)
            .field("tag", &self.tag)
            .field("state", &self.state)
            .field("token_bytes", &self.token_bytes)
            .field("region_bytes", &self.region_bytes)
            .finish()
    }
}

/// Serializable description of one device
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSummary {
    pub tag: String,
    pub name: String,
    pub class: DeviceClass,
    pub state: DeviceState,
    pub token_bytes: usize,
    pub inline_config_bytes: usize,
    pub region_bytes: usize,
    pub functions: Vec<&'static str>,
}
