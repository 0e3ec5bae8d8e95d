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

//! Device information query protocol
//!
//! Every device type answers capability queries through a single trait,
//! [`DeviceInterface`]. The registry never knows a type's internal layout; it
//! only asks the type for numbered pieces of information ("states").
//!
//! ## State Ranges
//!
//! ```text
//! Range    | First   | Last    | Value
//! ---------|---------|---------|-------------------------------
//! INT      | 0x00000 | 0x0FFFF | i64
//! PTR      | 0x10000 | 0x1FFFF | shared type-erased handle
//! FCT      | 0x20000 | 0x2FFFF | entry point (DeviceFct)
//! STR      | 0x30000 | 0x3FFFF | string
//! ```
//!
//! Each range reserves its upper half (`*_DEVICE_SPECIFIC` and up) for states
//! defined by individual device types.
//!
//! ## Type-level vs. Instance-level
//!
//! [`DeviceInterface::type_info`] answers questions that do not need a live
//! device (token size, class, entry points, names). [`DeviceInterface::device_info`]
//! answers questions about one configured device and defaults to the type-level
//! answer.
//!
//! # Example
//!
//! ```
//! use devcore::core::device::info::{devinfo, DeviceClass, DeviceInfo, DeviceInterface, DeviceType, StateId};
//!
//! struct Beeper;
//!
//! impl DeviceInterface for Beeper {
//!     fn type_info(state: StateId, info: &mut DeviceInfo) {
//!         match state {
//!             devinfo::INT_TOKEN_BYTES => info.set_int(4),
//!             devinfo::INT_CLASS => info.set_int(DeviceClass::SoundChip.as_raw()),
//!             devinfo::STR_NAME => info.set_str("Beeper"),
//!             _ => {}
//!         }
//!     }
//! }
//!
//! let beeper = DeviceType::of::<Beeper>();
//! assert_eq!(beeper.token_bytes(), 4);
//! assert_eq!(beeper.class(), DeviceClass::SoundChip);
//! assert_eq!(beeper.name(), "Beeper");
//! ```

use super::lifecycle::DevicePeers;
use super::scratch::ScratchPool;
use super::Device;
use crate::core::error::Result;
use bitflags::bitflags;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Numeric identifier of one piece of device information
pub type StateId = u32;

/// Standard state identifiers
pub mod devinfo {
    use super::StateId;

    /// First integer state
    pub const INT_FIRST: StateId = 0x00000;
    /// Bytes of per-instance runtime state (token)
    pub const INT_TOKEN_BYTES: StateId = INT_FIRST;
    /// Bytes of inline configuration stored in the device record
    pub const INT_INLINE_CONFIG_BYTES: StateId = INT_FIRST + 1;
    /// Device class (see [`super::DeviceClass`])
    pub const INT_CLASS: StateId = INT_FIRST + 2;
    /// First integer state available to individual device types
    pub const INT_DEVICE_SPECIFIC: StateId = 0x08000;
    /// Last integer state
    pub const INT_LAST: StateId = 0x0FFFF;

    /// First pointer state
    pub const PTR_FIRST: StateId = 0x10000;
    /// First pointer state available to individual device types
    pub const PTR_DEVICE_SPECIFIC: StateId = 0x18000;
    /// Last pointer state
    pub const PTR_LAST: StateId = 0x1FFFF;

    /// First function state
    pub const FCT_FIRST: StateId = 0x20000;
    /// Set-info entry point
    pub const FCT_SET_INFO: StateId = FCT_FIRST;
    /// Start entry point
    pub const FCT_START: StateId = FCT_FIRST + 1;
    /// Stop entry point
    pub const FCT_STOP: StateId = FCT_FIRST + 2;
    /// Reset entry point
    pub const FCT_RESET: StateId = FCT_FIRST + 3;
    /// First function state available to individual device types
    pub const FCT_DEVICE_SPECIFIC: StateId = 0x28000;
    /// Last function state
    pub const FCT_LAST: StateId = 0x2FFFF;

    /// First string state
    pub const STR_FIRST: StateId = 0x30000;
    /// Name of the device
    pub const STR_NAME: StateId = STR_FIRST;
    /// Family of the device
    pub const STR_FAMILY: StateId = STR_FIRST + 1;
    /// Version of the device implementation
    pub const STR_VERSION: StateId = STR_FIRST + 2;
    /// Source file implementing the device
    pub const STR_SOURCE_FILE: StateId = STR_FIRST + 3;
    /// Credits for the implementation
    pub const STR_CREDITS: StateId = STR_FIRST + 4;
    /// First string state available to individual device types
    pub const STR_DEVICE_SPECIFIC: StateId = 0x38000;
    /// Last string state
    pub const STR_LAST: StateId = 0x3FFFF;
}

/// The four disjoint state ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoRange {
    Int,
    Ptr,
    Fct,
    Str,
}

impl InfoRange {
    /// Classify a state identifier
    pub fn of(state: StateId) -> Option<Self> {
        match state {
            devinfo::INT_FIRST..=devinfo::INT_LAST => Some(InfoRange::Int),
            devinfo::PTR_FIRST..=devinfo::PTR_LAST => Some(InfoRange::Ptr),
            devinfo::FCT_FIRST..=devinfo::FCT_LAST => Some(InfoRange::Fct),
            devinfo::STR_FIRST..=devinfo::STR_LAST => Some(InfoRange::Str),
            _ => None,
        }
    }

    /// Check whether a state identifier lies in this range
    pub fn contains(self, state: StateId) -> bool {
        Self::of(state) == Some(self)
    }
}

/// Shared, type-erased value returned through the pointer range
pub type InfoPtr = Rc<dyn Any>;

/// Set-info entry point: mutate a live device
pub type SetInfoFn = fn(device: &mut Device, state: StateId, info: &DeviceInfo);

/// Start entry point
///
/// Returns [`DeviceStart::Deferred`] when the device depends on something
/// that is not ready yet; it will be retried on the next startup sweep.
pub type StartFn = fn(device: &mut Device, peers: &DevicePeers<'_>) -> Result<DeviceStart>;

/// Stop entry point
pub type StopFn = fn(device: &mut Device);

/// Reset entry point
pub type ResetFn = fn(device: &mut Device);

/// Outcome of a start entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStart {
    /// The device is fully started
    Ok,
    /// The device is waiting on another device; retry later
    Deferred,
}

/// Entry point returned through the function range
#[derive(Clone)]
pub enum DeviceFct {
    SetInfo(SetInfoFn),
    Start(StartFn),
    Stop(StopFn),
    Reset(ResetFn),
    /// Device-specific entry point, downcast by the caller
    Custom(InfoPtr),
}

impl fmt::Debug for DeviceFct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            DeviceFct::SetInfo(_) => "SetInfo",
            DeviceFct::Start(_) => "Start",
            DeviceFct::Stop(_) => "Stop",
            DeviceFct::Reset(_) => "Reset",
            DeviceFct::Custom(_) => "Custom",
        };
        write!(f, "DeviceFct::{}", kind)
    }
}

/// In/out value slot for a single query
///
/// The accessor initializes the slot to the neutral value of the requested
/// range; the device type overwrites it if it knows the state.
#[derive(Debug, Clone)]
pub enum DeviceInfo {
    Int(i64),
    Ptr(Option<InfoPtr>),
    Fct(Option<DeviceFct>),
    Str(String),
}

impl DeviceInfo {
    /// Neutral slot for a state's range
    pub fn for_state(state: StateId) -> Self {
        match InfoRange::of(state) {
            Some(InfoRange::Ptr) => DeviceInfo::Ptr(None),
            Some(InfoRange::Fct) => DeviceInfo::Fct(None),
            Some(InfoRange::Str) => DeviceInfo::Str(String::new()),
            _ => DeviceInfo::Int(0),
        }
    }

    pub fn set_int(&mut self, value: i64) {
        *self = DeviceInfo::Int(value);
    }

    pub fn set_ptr(&mut self, value: InfoPtr) {
        *self = DeviceInfo::Ptr(Some(value));
    }

    pub fn set_fct(&mut self, value: DeviceFct) {
        *self = DeviceInfo::Fct(Some(value));
    }

    /// Store a string result, reusing the slot's buffer when possible
    pub fn set_str(&mut self, value: &str) {
        match self {
            DeviceInfo::Str(buffer) => {
                buffer.clear();
                buffer.push_str(value);
            }
            _ => *self = DeviceInfo::Str(value.to_owned()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            DeviceInfo::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_ptr(&self) -> Option<&InfoPtr> {
        match self {
            DeviceInfo::Ptr(value) => value.as_ref(),
            _ => None,
        }
    }

    pub fn as_fct(&self) -> Option<&DeviceFct> {
        match self {
            DeviceInfo::Fct(value) => value.as_ref(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DeviceInfo::Str(value) => Some(value),
            _ => None,
        }
    }

    fn into_int(self) -> i64 {
        self.as_int().unwrap_or(0)
    }

    fn into_ptr(self) -> Option<InfoPtr> {
        match self {
            DeviceInfo::Ptr(value) => value,
            _ => None,
        }
    }

    fn into_fct(self) -> Option<DeviceFct> {
        match self {
            DeviceInfo::Fct(value) => value,
            _ => None,
        }
    }

    fn into_string(self) -> String {
        match self {
            DeviceInfo::Str(value) => value,
            _ => String::new(),
        }
    }
}

/// Coarse device category shared by many types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    General,
    CpuChip,
    SoundChip,
    Timer,
    Video,
    Other,
}

impl DeviceClass {
    /// Decode the integer returned for [`devinfo::INT_CLASS`]
    pub fn from_raw(value: i64) -> Self {
        match value {
            0 => DeviceClass::General,
            1 => DeviceClass::CpuChip,
            2 => DeviceClass::SoundChip,
            3 => DeviceClass::Timer,
            4 => DeviceClass::Video,
            _ => DeviceClass::Other,
        }
    }

    /// Encode for [`devinfo::INT_CLASS`]
    pub fn as_raw(self) -> i64 {
        match self {
            DeviceClass::General => 0,
            DeviceClass::CpuChip => 1,
            DeviceClass::SoundChip => 2,
            DeviceClass::Timer => 3,
            DeviceClass::Video => 4,
            DeviceClass::Other => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceClass::General => "general",
            DeviceClass::CpuChip => "cpu",
            DeviceClass::SoundChip => "sound",
            DeviceClass::Timer => "timer",
            DeviceClass::Video => "video",
            DeviceClass::Other => "other",
        }
    }
}

bitflags! {
    /// Entry points a device type declares
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceFunctions: u8 {
        const SET_INFO = 1 << 0;
        const START = 1 << 1;
        const STOP = 1 << 2;
        const RESET = 1 << 3;
    }
}

impl DeviceFunctions {
    /// Lowercase names of the declared entry points, for listings
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names()
            .map(|(name, _)| match name {
                "SET_INFO" => "set_info",
                "START" => "start",
                "STOP" => "stop",
                _ => "reset",
            })
            .collect()
    }
}

/// Capability query implemented once per device type
///
/// Implementors are usually unit structs; the struct itself is never
/// instantiated, it only provides identity and the two query functions.
pub trait DeviceInterface: 'static {
    /// Answer a type-level query (no live device needed)
    fn type_info(state: StateId, info: &mut DeviceInfo);

    /// Answer a query about one configured device
    fn device_info(device: &Device, state: StateId, info: &mut DeviceInfo) {
        let _ = device;
        Self::type_info(state, info);
    }
}

/// Sentinel interface backing [`DeviceType::wildcard`]
struct Wildcard;

impl DeviceInterface for Wildcard {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        if state == devinfo::STR_NAME {
            info.set_str("*");
        }
    }
}

/// Identity and query handle for a kind of device
///
/// Two device types are equal exactly when they were built from the same
/// [`DeviceInterface`] implementation.
#[derive(Clone, Copy)]
pub struct DeviceType {
    id: TypeId,
    type_info: fn(StateId, &mut DeviceInfo),
    device_info: fn(&Device, StateId, &mut DeviceInfo),
}

impl DeviceType {
    /// Device type handle for an interface implementation
    pub fn of<T: DeviceInterface>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_info: T::type_info,
            device_info: T::device_info,
        }
    }

    /// Filter value matching every device type
    pub fn wildcard() -> Self {
        Self::of::<Wildcard>()
    }

    pub fn is_wildcard(&self) -> bool {
        self.id == TypeId::of::<Wildcard>()
    }

    /// Whether `other` passes this type used as a filter
    pub fn matches(&self, other: DeviceType) -> bool {
        self.is_wildcard() || *self == other
    }

    /// Query an integer value from the type
    pub fn get_info_int(&self, state: StateId) -> i64 {
        debug_assert!(InfoRange::Int.contains(state), "state {state:#x} is not an integer state");
        let mut info = DeviceInfo::for_state(state);
        (self.type_info)(state, &mut info);
        info.into_int()
    }

    /// Query a pointer value from the type
    pub fn get_info_ptr(&self, state: StateId) -> Option<InfoPtr> {
        debug_assert!(InfoRange::Ptr.contains(state), "state {state:#x} is not a pointer state");
        let mut info = DeviceInfo::for_state(state);
        (self.type_info)(state, &mut info);
        info.into_ptr()
    }

    /// Query an entry point from the type
    pub fn get_info_fct(&self, state: StateId) -> Option<DeviceFct> {
        debug_assert!(InfoRange::Fct.contains(state), "state {state:#x} is not a function state");
        let mut info = DeviceInfo::for_state(state);
        (self.type_info)(state, &mut info);
        info.into_fct()
    }

    /// Query a string value from the type
    pub fn get_info_string(&self, state: StateId) -> String {
        debug_assert!(InfoRange::Str.contains(state), "state {state:#x} is not a string state");
        let mut info = DeviceInfo::for_state(state);
        (self.type_info)(state, &mut info);
        info.into_string()
    }

    /// Query a string value into the next scratch buffer
    ///
    /// The returned slice borrows the pool, so it has to be copied before the
    /// pool is used again.
    pub fn get_info_string_in<'p>(&self, state: StateId, pool: &'p mut ScratchPool) -> &'p str {
        debug_assert!(InfoRange::Str.contains(state), "state {state:#x} is not a string state");
        let buffer = pool.acquire();
        let mut info = DeviceInfo::Str(buffer.take_string());
        (self.type_info)(state, &mut info);
        if let DeviceInfo::Str(text) = info {
            buffer.restore_string(text);
        }
        buffer.as_str()
    }

    /// Instance-level query dispatch, used by [`Device`] accessors
    pub(crate) fn query_device(&self, device: &Device, state: StateId, info: &mut DeviceInfo) {
        (self.device_info)(device, state, info);
    }

    pub fn name(&self) -> String {
        self.get_info_string(devinfo::STR_NAME)
    }

    pub fn class(&self) -> DeviceClass {
        DeviceClass::from_raw(self.get_info_int(devinfo::INT_CLASS))
    }

    pub fn token_bytes(&self) -> usize {
        usize::try_from(self.get_info_int(devinfo::INT_TOKEN_BYTES)).unwrap_or(0)
    }

    pub fn inline_config_bytes(&self) -> usize {
        usize::try_from(self.get_info_int(devinfo::INT_INLINE_CONFIG_BYTES)).unwrap_or(0)
    }

    pub fn set_info_fn(&self) -> Option<SetInfoFn> {
        match self.get_info_fct(devinfo::FCT_SET_INFO) {
            Some(DeviceFct::SetInfo(f)) => Some(f),
            _ => None,
        }
    }

    pub fn start_fn(&self) -> Option<StartFn> {
        match self.get_info_fct(devinfo::FCT_START) {
            Some(DeviceFct::Start(f)) => Some(f),
            _ => None,
        }
    }

    pub fn stop_fn(&self) -> Option<StopFn> {
        match self.get_info_fct(devinfo::FCT_STOP) {
            Some(DeviceFct::Stop(f)) => Some(f),
            _ => None,
        }
    }

    pub fn reset_fn(&self) -> Option<ResetFn> {
        match self.get_info_fct(devinfo::FCT_RESET) {
            Some(DeviceFct::Reset(f)) => Some(f),
            _ => None,
        }
    }

    /// Entry points this type declares
    pub fn functions(&self) -> DeviceFunctions {
        let mut functions = DeviceFunctions::empty();
        functions.set(DeviceFunctions::SET_INFO, self.set_info_fn().is_some());
        functions.set(DeviceFunctions::START, self.start_fn().is_some());
        functions.set(DeviceFunctions::STOP, self.stop_fn().is_some());
        functions.set(DeviceFunctions::RESET, self.reset_fn().is_some());
        functions
    }
}

impl PartialEq for DeviceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DeviceType {}

impl Hash for DeviceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceType").field(&self.name()).finish()
    }
}
