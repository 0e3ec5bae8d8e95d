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

//! Machine configuration
//!
//! A machine is described in TOML: a name, a set of memory regions and an
//! ordered list of devices. Device entries name their type through a
//! [`DeviceCatalog`]; any extra keys are handed to the type's configure
//! function, which writes them into the device's configuration.
//!
//! ```toml
//! name = "usgames"
//!
//! [[region]]
//! tag = "maincpu"
//! size = 0x10000
//! fill = 0xFF
//!
//! [[device]]
//! type = "cpu"
//! tag = "maincpu"
//! clock = 2000000
//!
//! [[device]]
//! type = "dac"
//! tag = "dac"
//! cpu = "maincpu"
//! ```

use super::region::RegionTable;
use crate::core::device::tag::build_tag;
use crate::core::device::{Device, DeviceList, DeviceType};
use crate::core::devices;
use crate::core::error::{DeviceError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything needed to build a [`super::Machine`]
#[derive(Debug, Default)]
pub struct MachineConfig {
    pub name: String,
    pub devices: DeviceList,
    pub regions: RegionTable,
}

impl MachineConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }
}

/// Writes description parameters into a freshly added device
pub type ConfigureFn = fn(device: &mut Device, params: &toml::Table) -> Result<()>;

#[derive(Clone, Copy)]
struct CatalogEntry {
    name: &'static str,
    device_type: DeviceType,
    configure: Option<ConfigureFn>,
}

/// Maps type names used in machine descriptions to device types
pub struct DeviceCatalog {
    entries: Vec<CatalogEntry>,
}

impl DeviceCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Catalog of the device types shipped with this crate
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register("cpu", devices::cpu::device_type(), Some(devices::cpu::configure));
        catalog.register("dac", devices::dac::device_type(), Some(devices::dac::configure));
        catalog.register("latch", devices::latch::device_type(), None);
        catalog
    }

    /// Register a type under a name, replacing any previous entry
    pub fn register(
        &mut self,
        name: &'static str,
        device_type: DeviceType,
        configure: Option<ConfigureFn>,
    ) {
        self.entries.retain(|entry| entry.name != name);
        self.entries.push(CatalogEntry {
            name,
            device_type,
            configure,
        });
    }

    pub fn lookup(&self, name: &str) -> Option<DeviceType> {
        self.entry(name).map(|entry| entry.device_type)
    }

    /// Registered type names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// One `[[region]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionDescription {
    pub tag: String,
    /// Region length; defaults to the file length, or 0
    #[serde(default)]
    pub size: Option<usize>,
    /// Byte used for padding and for regions without a file
    #[serde(default)]
    pub fill: u8,
    /// Image to load, relative to the description file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// One `[[device]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceDescription {
    #[serde(rename = "type")]
    pub type_name: String,
    pub tag: String,
    /// Tag of the owning device; the final tag becomes `parent:tag`
    #[serde(default)]
    pub parent: Option<String>,
    /// Type-specific parameters
    #[serde(flatten)]
    pub params: toml::Table,
}

/// Parsed machine description file
#[derive(Debug, Clone, Deserialize)]
pub struct MachineDescription {
    pub name: String,
    #[serde(default, rename = "region")]
    pub regions: Vec<RegionDescription>,
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceDescription>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl MachineDescription {
    /// Parse a description from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a description file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading machine description from {}", path.display());

        let text = fs::read_to_string(path)?;
        let mut description = Self::from_toml_str(&text)?;
        description.base_dir = path.parent().map(Path::to_path_buf);
        Ok(description)
    }

    /// Build the machine configuration: regions first, then devices in order
    pub fn build(&self, catalog: &DeviceCatalog) -> Result<MachineConfig> {
        let mut config = MachineConfig::new(&self.name);

        for region in &self.regions {
            let data = self.region_data(region)?;
            config.regions.add(&region.tag, data);
        }

        for description in &self.devices {
            let entry = catalog
                .entry(&description.type_name)
                .ok_or_else(|| DeviceError::UnknownDeviceType(description.type_name.clone()))?;

            let tag = match &description.parent {
                Some(parent) => {
                    let owner = config
                        .devices
                        .find_by_tag(DeviceType::wildcard(), parent)
                        .ok_or_else(|| DeviceError::NonexistentDevice {
                            device_type: "*".to_owned(),
                            tag: parent.clone(),
                        })?;
                    build_tag(Some(owner), &description.tag)
                }
                None => description.tag.clone(),
            };

            let device = config.devices.add(entry.device_type, &tag)?;
            match entry.configure {
                Some(configure) => configure(device, &description.params)?,
                None if !description.params.is_empty() => log::warn!(
                    "Device {} ({}) takes no parameters; ignoring {:?}",
                    tag,
                    entry.name,
                    description.params.keys().collect::<Vec<_>>()
                ),
                None => {}
            }
        }

        log::debug!(
            "Machine {}: {} regions, {} devices",
            self.name,
            config.regions.len(),
            config.devices.len()
        );

        Ok(config)
    }

    fn region_data(&self, region: &RegionDescription) -> Result<Vec<u8>> {
        let mut data = match &region.file {
            Some(file) => {
                let path = match &self.base_dir {
                    Some(base) => base.join(file),
                    None => file.clone(),
                };
                fs::read(&path)?
            }
            None => Vec::new(),
        };

        if let Some(size) = region.size {
            data.resize(size, region.fill);
        }
        Ok(data)
    }
}

/// Fetch an optional unsigned integer parameter
pub fn param_u32(params: &toml::Table, name: &str, tag: &str) -> Result<Option<u32>> {
    let Some(value) = params.get(name) else {
        return Ok(None);
    };

    value
        .as_integer()
        .and_then(|number| u32::try_from(number).ok())
        .map(Some)
        .ok_or_else(|| DeviceError::InvalidParameter {
            tag: tag.to_owned(),
            name: name.to_owned(),
            reason: format!("expected an unsigned 32-bit integer, got {}", value),
        })
}

/// Fetch an optional string parameter
pub fn param_str<'a>(params: &'a toml::Table, name: &str, tag: &str) -> Result<Option<&'a str>> {
    let Some(value) = params.get(name) else {
        return Ok(None);
    };

    value
        .as_str()
        .map(Some)
        .ok_or_else(|| DeviceError::InvalidParameter {
            tag: tag.to_owned(),
            name: name.to_owned(),
            reason: format!("expected a string, got {}", value),
        })
}
