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

//! Running machine
//!
//! The machine is the host side of the device layer: it owns the configured
//! device list, the memory regions devices resolve at start, and the reset and
//! exit hooks the device layer registers.

pub mod config;
pub mod listing;
mod region;

pub use config::{DeviceCatalog, MachineConfig, MachineDescription};
pub use listing::MachineListing;
pub use region::RegionTable;

use crate::core::device::lifecycle;
use crate::core::device::{DeviceList, StartupSummary};
use crate::core::error::{DeviceError, Result};
use std::rc::Rc;

/// Hook invoked by the machine on reset or exit
pub type MachineCallback = fn(&mut Machine);

/// Shared, device-independent part of a machine
///
/// Started devices hold a reference to it, so it never contains the device
/// list itself.
#[derive(Debug)]
pub struct MachineContext {
    name: String,
    regions: RegionTable,
}

impl MachineContext {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Region lookup used when devices start
    pub fn region(&self, tag: &str) -> Option<Rc<[u8]>> {
        self.regions.region(tag)
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }
}

/// A configured machine and its devices
///
/// # Example
///
/// ```
/// use devcore::core::machine::{Machine, MachineConfig};
/// use devcore::core::devices::latch;
///
/// let mut config = MachineConfig::new("demo");
/// config.devices.add(latch::device_type(), "leds").unwrap();
///
/// let mut machine = Machine::new(config);
/// let summary = machine.start().unwrap();
/// assert_eq!(summary.devices, 1);
///
/// machine.reset();
/// machine.exit();
/// ```
pub struct Machine {
    context: Rc<MachineContext>,
    devices: DeviceList,
    reset_callbacks: Vec<MachineCallback>,
    exit_callbacks: Vec<MachineCallback>,
    started: bool,
    running: bool,
}

impl Machine {
    /// Create a machine from its configuration
    pub fn new(config: MachineConfig) -> Self {
        let MachineConfig {
            name,
            devices,
            regions,
        } = config;

        Self {
            context: Rc::new(MachineContext { name, regions }),
            devices,
            reset_callbacks: Vec::new(),
            exit_callbacks: Vec::new(),
            started: false,
            running: false,
        }
    }

    pub fn name(&self) -> &str {
        self.context.name()
    }

    pub fn context(&self) -> &Rc<MachineContext> {
        &self.context
    }

    pub fn devices(&self) -> &DeviceList {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut DeviceList {
        &mut self.devices
    }

    pub fn region(&self, tag: &str) -> Option<Rc<[u8]>> {
        self.context.region(tag)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Register a hook run by [`Machine::reset`], in registration order
    pub fn add_reset_callback(&mut self, callback: MachineCallback) {
        self.reset_callbacks.push(callback);
    }

    /// Register a hook run by [`Machine::exit`], in reverse registration order
    pub fn add_exit_callback(&mut self, callback: MachineCallback) {
        self.exit_callbacks.push(callback);
    }

    /// Attach and start every device
    ///
    /// A machine starts at most once, even if the first attempt failed. A
    /// second call returns [`DeviceError::AlreadyStarted`] without touching
    /// any device.
    pub fn start(&mut self) -> Result<StartupSummary> {
        if self.started {
            return Err(DeviceError::AlreadyStarted(self.name().to_owned()));
        }
        self.started = true;
        log::info!("Starting machine {}", self.name());

        lifecycle::attach_machine(self);
        let summary = lifecycle::start(self)?;
        self.running = true;

        Ok(summary)
    }

    /// Run the reset hooks
    pub fn reset(&mut self) {
        log::info!("Resetting machine {}", self.name());

        let callbacks = self.reset_callbacks.clone();
        for callback in callbacks {
            callback(self);
        }
    }

    /// Run the exit hooks once, most recently registered first
    pub fn exit(&mut self) {
        log::info!("Shutting down machine {}", self.name());

        let callbacks = std::mem::take(&mut self.exit_callbacks);
        for callback in callbacks.into_iter().rev() {
            callback(self);
        }
        self.reset_callbacks.clear();
        self.running = false;
    }
}

#[cfg(test)]
mod tests;
