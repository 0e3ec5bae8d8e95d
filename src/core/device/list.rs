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

//! Device registry
//!
//! [`DeviceList`] owns every configured device in insertion order and keeps
//! two position indices next to it:
//!
//! ```text
//! devices:  [ cpu0 | dac | cpu1 | latch ]      global (insertion) order
//! by_type:  Cpu -> [0, 2]   Dac -> [1]   Latch -> [3]
//! by_class: CpuChip -> [0, 2]   SoundChip -> [1]   Other -> [3]
//! ```
//!
//! Type lookups accept [`DeviceType::wildcard`], which walks the global order.
//! Class lookups match one class exactly.

use super::info::{DeviceClass, DeviceType};
use super::Device;
use crate::core::error::{DeviceError, Result};
use std::collections::HashMap;

/// Ordered registry of device configurations
#[derive(Debug, Default)]
pub struct DeviceList {
    devices: Vec<Box<Device>>,
    by_type: HashMap<DeviceType, Vec<usize>>,
    by_class: HashMap<DeviceClass, Vec<usize>>,
}

impl DeviceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device to the end of the list
    ///
    /// The new device's inline configuration is zero-filled and sized by its
    /// type. Fails if a device with the same type and tag already exists; the
    /// list is left unchanged in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use devcore::core::device::DeviceList;
    /// use devcore::core::devices::cpu;
    ///
    /// let mut list = DeviceList::new();
    /// list.add(cpu::device_type(), "maincpu").unwrap();
    ///
    /// assert!(list.add(cpu::device_type(), "maincpu").is_err());
    /// assert_eq!(list.len(), 1);
    /// ```
    pub fn add(&mut self, device_type: DeviceType, tag: &str) -> Result<&mut Device> {
        if device_type.is_wildcard() {
            return Err(DeviceError::WildcardType);
        }

        if self.position(device_type, tag).is_some() {
            return Err(DeviceError::DuplicateDevice {
                device_type: device_type.name(),
                tag: tag.to_owned(),
            });
        }

        let device = Box::new(Device::new(device_type, tag));
        let index = self.devices.len();

        self.by_type.entry(device_type).or_default().push(index);
        self.by_class.entry(device.class()).or_default().push(index);
        self.devices.push(device);

        log::debug!(
            "Added device {} ({}) at position {}",
            tag,
            device_type.name(),
            index
        );

        Ok(self.devices[index].as_mut())
    }

    /// Remove the device with the given type and tag
    pub fn remove(&mut self, device_type: DeviceType, tag: &str) -> Result<()> {
        let index = self
            .position(device_type, tag)
            .ok_or_else(|| DeviceError::NonexistentDevice {
                device_type: device_type.name(),
                tag: tag.to_owned(),
            })?;

        self.devices.remove(index);
        self.rebuild_indices();

        log::debug!("Removed device {} ({})", tag, device_type.name());
        Ok(())
    }

    /// Global position of an exact (type, tag) match
    fn position(&self, device_type: DeviceType, tag: &str) -> Option<usize> {
        self.by_type
            .get(&device_type)?
            .iter()
            .copied()
            .find(|&index| self.devices[index].tag() == tag)
    }

    /// Global position of a device owned by this list
    fn position_of(&self, device: &Device) -> Option<usize> {
        self.devices
            .iter()
            .position(|candidate| std::ptr::eq(candidate.as_ref(), device))
    }

    fn rebuild_indices(&mut self) {
        self.by_type.clear();
        self.by_class.clear();

        for (index, device) in self.devices.iter().enumerate() {
            self.by_type.entry(device.device_type()).or_default().push(index);
            self.by_class.entry(device.class()).or_default().push(index);
        }
    }

    /// Devices matching a type filter, in global order
    fn matching(&self, device_type: DeviceType) -> Box<dyn Iterator<Item = &Device> + '_> {
        if device_type.is_wildcard() {
            Box::new(self.iter())
        } else {
            Box::new(self.indexed(self.by_type.get(&device_type)))
        }
    }

    fn indexed<'a>(
        &'a self,
        positions: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a Device> + 'a {
        positions
            .into_iter()
            .flatten()
            .map(move |&index| self.devices[index].as_ref())
    }

    /// First position in `positions` strictly after `index`
    fn following(&self, positions: Option<&Vec<usize>>, index: usize) -> Option<&Device> {
        let positions = positions?;
        let next = positions.partition_point(|&position| position <= index);
        positions.get(next).map(|&position| self.devices[position].as_ref())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// All devices in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Device> + '_ {
        self.devices.iter().map(|device| device.as_ref())
    }

    /// Device at a global position
    pub fn get(&self, index: usize) -> Option<&Device> {
        self.devices.get(index).map(|device| device.as_ref())
    }

    /// Mutable access to an exact (type, tag) match
    pub fn find_mut(&mut self, device_type: DeviceType, tag: &str) -> Option<&mut Device> {
        let index = if device_type.is_wildcard() {
            self.devices.iter().position(|device| device.tag() == tag)?
        } else {
            self.position(device_type, tag)?
        };
        Some(self.devices[index].as_mut())
    }

    pub(super) fn devices_mut(&mut self) -> &mut [Box<Device>] {
        &mut self.devices
    }

    // Type-based access

    /// Number of devices of a type (wildcard counts everything)
    pub fn count(&self, device_type: DeviceType) -> usize {
        if device_type.is_wildcard() {
            self.devices.len()
        } else {
            self.by_type.get(&device_type).map_or(0, Vec::len)
        }
    }

    /// Devices of a type in insertion order
    pub fn iter_type(&self, device_type: DeviceType) -> impl Iterator<Item = &Device> + '_ {
        self.matching(device_type)
    }

    pub fn first(&self, device_type: DeviceType) -> Option<&Device> {
        self.matching(device_type).next()
    }

    /// Device following `prev` among devices of a type
    ///
    /// With the wildcard this is simply the next device in insertion order.
    pub fn next(&self, prev: &Device, device_type: DeviceType) -> Option<&Device> {
        let index = self.position_of(prev)?;

        if device_type.is_wildcard() {
            self.get(index + 1)
        } else {
            self.following(self.by_type.get(&device_type), index)
        }
    }

    pub fn find_by_tag(&self, device_type: DeviceType, tag: &str) -> Option<&Device> {
        self.matching(device_type).find(|device| device.tag() == tag)
    }

    /// Position of a tag among devices of a type
    pub fn index_of(&self, device_type: DeviceType, tag: &str) -> Option<usize> {
        self.matching(device_type).position(|device| device.tag() == tag)
    }

    /// The `index`-th device of a type (zero-based)
    pub fn find_by_index(&self, device_type: DeviceType, index: usize) -> Option<&Device> {
        self.matching(device_type).nth(index)
    }

    // Class-based access

    pub fn class_count(&self, class: DeviceClass) -> usize {
        self.by_class.get(&class).map_or(0, Vec::len)
    }

    /// Devices of a class in insertion order
    pub fn iter_class(&self, class: DeviceClass) -> impl Iterator<Item = &Device> + '_ {
        self.indexed(self.by_class.get(&class))
    }

    pub fn class_first(&self, class: DeviceClass) -> Option<&Device> {
        self.iter_class(class).next()
    }

    pub fn class_next(&self, prev: &Device, class: DeviceClass) -> Option<&Device> {
        let index = self.position_of(prev)?;
        self.following(self.by_class.get(&class), index)
    }

    pub fn class_find_by_tag(&self, class: DeviceClass, tag: &str) -> Option<&Device> {
        self.iter_class(class).find(|device| device.tag() == tag)
    }

    pub fn class_index_of(&self, class: DeviceClass, tag: &str) -> Option<usize> {
        self.iter_class(class).position(|device| device.tag() == tag)
    }

    pub fn class_find_by_index(&self, class: DeviceClass, index: usize) -> Option<&Device> {
        self.iter_class(class).nth(index)
    }
}
