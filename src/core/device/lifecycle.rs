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

//! Live device management
//!
//! Allocates runtime state for every configured device and drives the
//! start/reset/stop state machine.
//!
//! # Startup
//!
//! Devices do not declare dependencies. Instead, start entry points may
//! return [`DeviceStart::Deferred`] when something they need (usually another
//! device) is not ready. Startup sweeps the list repeatedly, in insertion
//! order, until every device has started. A sweep that starts nothing new
//! means the remaining devices can never start, which is reported as a
//! circular dependency.

use super::info::{devinfo, DeviceClass, DeviceFct, DeviceStart, DeviceType, StartFn};
use super::{Device, DeviceState};
use crate::core::error::{DeviceError, Result};
use crate::core::machine::Machine;
use serde::Serialize;
use std::rc::Rc;

/// Read-only view of every device except the one being started
pub struct DevicePeers<'a> {
    before: &'a [Box<Device>],
    after: &'a [Box<Device>],
}

impl<'a> DevicePeers<'a> {
    /// Other devices in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &'a Device> + 'a {
        let before: &'a [Box<Device>] = self.before;
        let after: &'a [Box<Device>] = self.after;
        before.iter().chain(after).map(|device| device.as_ref())
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self, device_type: DeviceType) -> Option<&'a Device> {
        self.iter()
            .find(|device| device_type.matches(device.device_type()))
    }

    pub fn find_by_tag(&self, device_type: DeviceType, tag: &str) -> Option<&'a Device> {
        self.iter()
            .find(|device| device_type.matches(device.device_type()) && device.tag() == tag)
    }

    pub fn class_first(&self, class: DeviceClass) -> Option<&'a Device> {
        self.iter().find(|device| device.class() == class)
    }
}

/// Result of a successful startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartupSummary {
    /// Devices started
    pub devices: usize,
    /// Full sweeps needed to start them all
    pub sweeps: usize,
}

/// Point every device at its running machine
pub fn attach_machine(machine: &mut Machine) {
    let context = Rc::clone(machine.context());

    for device in machine.devices_mut().devices_mut() {
        device.machine = Some(Rc::clone(&context));
    }
}

/// Allocate runtime state and start every device
///
/// Registers [`reset`] and [`stop`] with the machine, so that they run on
/// machine reset and exit.
pub fn start(machine: &mut Machine) -> Result<StartupSummary> {
    machine.add_reset_callback(reset);
    machine.add_exit_callback(stop);

    let context = Rc::clone(machine.context());
    let devices = machine.devices_mut().devices_mut();
    let total = devices.len();
    let mut start_fns: Vec<StartFn> = Vec::with_capacity(total);

    for device in devices.iter_mut() {
        debug_assert_eq!(device.state, DeviceState::Unstarted, "device {} already started", device.tag);
        debug_assert!(
            device.machine.as_ref().is_some_and(|owner| Rc::ptr_eq(owner, &context)),
            "device {} is not attached to this machine",
            device.tag
        );

        // Queried directly on the type: the device has no token yet
        let token_bytes = device.device_type().token_bytes();
        if token_bytes == 0 {
            return Err(DeviceError::ZeroTokenLength {
                name: device.name(),
                tag: device.tag.clone(),
            });
        }

        match device.get_info_fct(devinfo::FCT_START) {
            Some(DeviceFct::Start(start_fn)) => start_fns.push(start_fn),
            _ => {
                return Err(DeviceError::MissingStartFunction {
                    name: device.name(),
                    tag: device.tag.clone(),
                })
            }
        }

        device.token = Some(vec![0; token_bytes].into_boxed_slice());
        device.token_bytes = token_bytes;
        device.machine = Some(Rc::clone(&context));
        device.region = context.region(&device.tag);
        device.region_bytes = device.region.as_ref().map_or(0, |region| region.len());

        log::debug!(
            "Allocated {} token bytes for {} (region: {} bytes)",
            token_bytes,
            device.tag,
            device.region_bytes
        );
    }

    let mut started = 0;
    let mut sweeps = 0;

    while started < total {
        let previous = started;
        started = 0;
        sweeps += 1;

        for (index, &start_fn) in start_fns.iter().enumerate() {
            let (before, rest) = devices.split_at_mut(index);
            let Some((device, after)) = rest.split_first_mut() else {
                break;
            };

            if !device.is_started() {
                let peers = DevicePeers {
                    before: &*before,
                    after: &*after,
                };

                if start_fn(device.as_mut(), &peers)? == DeviceStart::Ok {
                    device.state = DeviceState::Started;
                    log::debug!("Started {} on sweep {}", device.tag, sweeps);
                } else {
                    log::trace!("Start of {} deferred on sweep {}", device.tag, sweeps);
                }
            }

            started += usize::from(device.is_started());
        }

        if started == previous {
            return Err(DeviceError::CircularDependency {
                unstarted: total - started,
                total,
            });
        }
    }

    log::info!(
        "Started {} devices in {} sweep(s) on {}",
        total,
        sweeps,
        context.name()
    );

    Ok(StartupSummary {
        devices: total,
        sweeps,
    })
}

/// Reset every started device in insertion order
pub fn reset(machine: &mut Machine) {
    for device in machine.devices_mut().devices_mut() {
        if device.is_started() {
            reset_device(device);
        }
    }
}

/// Reset one device, if its type has a reset entry point
pub fn reset_device(device: &mut Device) {
    debug_assert!(device.token.is_some(), "reset of device {} that is not started", device.tag);

    if let Some(DeviceFct::Reset(reset_fn)) = device.get_info_fct(devinfo::FCT_RESET) {
        log::trace!("Resetting {}", device.tag);
        reset_fn(device);
    }
}

/// Stop every device and release its runtime state
///
/// Devices that are not started are skipped, so stopping twice is harmless.
pub fn stop(machine: &mut Machine) {
    for device in machine.devices_mut().devices_mut() {
        let was_started = device.is_started();
        if !was_started && device.token.is_none() {
            continue;
        }

        if was_started {
            if let Some(DeviceFct::Stop(stop_fn)) = device.get_info_fct(devinfo::FCT_STOP) {
                stop_fn(device);
            }
            device.state = DeviceState::Stopped;
        }

        device.token = None;
        device.token_bytes = 0;
        device.machine = None;
        device.region = None;
        device.region_bytes = 0;

        log::debug!("Stopped {}", device.tag);
    }
}
