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

//! Memory region table
//!
//! Regions are named blocks of memory (ROM images, sample data) that a
//! machine makes available to its devices. A device is handed the region
//! whose tag equals its own tag when it starts.

use std::collections::HashMap;
use std::rc::Rc;

/// Tagged memory regions of one machine
///
/// # Example
///
/// ```
/// use devcore::core::machine::RegionTable;
///
/// let mut regions = RegionTable::new();
/// regions.add("maincpu", vec![0xEA; 0x100]);
///
/// assert_eq!(regions.region_bytes("maincpu"), 0x100);
/// assert!(regions.region("sound").is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct RegionTable {
    regions: HashMap<String, Rc<[u8]>>,
}

impl RegionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a region
    pub fn add(&mut self, tag: &str, data: impl Into<Rc<[u8]>>) {
        let data = data.into();
        log::debug!("Region {}: {} bytes", tag, data.len());
        if self.regions.insert(tag.to_owned(), data).is_some() {
            log::warn!("Region {} replaced", tag);
        }
    }

    /// Look up a region by tag
    pub fn region(&self, tag: &str) -> Option<Rc<[u8]>> {
        self.regions.get(tag).cloned()
    }

    /// Length of a region, 0 if absent
    pub fn region_bytes(&self, tag: &str) -> usize {
        self.regions.get(tag).map_or(0, |data| data.len())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region tags in sorted order
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.regions.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}
