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

//! Device listings for tooling

use super::Machine;
use crate::core::device::tag::{leaf_tag, TAG_SEPARATOR};
use crate::core::device::{devinfo, DeviceSummary, ScratchPool, StartupSummary};
use serde::Serialize;

/// Serializable snapshot of a machine and its devices
#[derive(Debug, Clone, Serialize)]
pub struct MachineListing {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup: Option<StartupSummary>,
    pub regions: Vec<RegionListing>,
    pub devices: Vec<DeviceSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionListing {
    pub tag: String,
    pub bytes: usize,
}

impl MachineListing {
    pub fn new(machine: &Machine, startup: Option<StartupSummary>) -> Self {
        let regions = machine.context().regions();

        Self {
            name: machine.name().to_owned(),
            startup,
            regions: regions
                .tags()
                .into_iter()
                .map(|tag| RegionListing {
                    tag: tag.to_owned(),
                    bytes: regions.region_bytes(tag),
                })
                .collect(),
            devices: machine.devices().iter().map(|device| device.summary()).collect(),
        }
    }
}

/// Render the device tree as text
///
/// Sub-devices are indented under their owner by tag depth:
///
/// ```text
/// Machine: usgames
///   maincpu          Reference CPU    cpu    started  [set_info start stop reset]
///     dac            DAC              sound  started  [set_info start reset]
/// ```
pub fn render_text(machine: &Machine, pool: &mut ScratchPool) -> String {
    let mut out = format!("Machine: {}\n", machine.name());

    for device in machine.devices().iter() {
        let depth = device.tag().matches(TAG_SEPARATOR).count() + 1;
        let label = format!("{:indent$}{}", "", leaf_tag(device.tag()), indent = depth * 2);
        let name = device.get_info_string_in(devinfo::STR_NAME, pool);

        out.push_str(&format!(
            "{:<20} {:<16} {:<6} {:<8} [{}]\n",
            label,
            name,
            device.class().name(),
            format!("{:?}", device.state()).to_lowercase(),
            device.device_type().functions().names().join(" ")
        ));
    }

    let regions = machine.context().regions();
    for tag in regions.tags() {
        out.push_str(&format!("Region {}: {} bytes\n", tag, regions.region_bytes(tag)));
    }

    out
}
