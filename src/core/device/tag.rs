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

//! Hierarchical device tags
//!
//! Tags are colon-delimited paths such as `sound:dac`. Sub-devices are
//! addressed relative to the device that owns them.

use super::Device;

/// Separator between tag components
pub const TAG_SEPARATOR: char = ':';

/// Build a tag for a child of `device`
///
/// # Example
///
/// ```
/// use devcore::core::device::tag::build_tag;
///
/// assert_eq!(build_tag(None, "dac"), "dac");
/// ```
pub fn build_tag(device: Option<&Device>, tag: &str) -> String {
    match device {
        Some(parent) => format!("{}{}{}", parent.tag(), TAG_SEPARATOR, tag),
        None => tag.to_owned(),
    }
}

/// Build a tag that shares the device prefix of `source_tag`
///
/// # Example
///
/// ```
/// use devcore::core::device::tag::inherit_tag;
///
/// assert_eq!(inherit_tag("sound:fm", "dac"), "sound:dac");
/// assert_eq!(inherit_tag("dac", "pan"), "pan");
/// ```
pub fn inherit_tag(source_tag: &str, tag: &str) -> String {
    match source_tag.rfind(TAG_SEPARATOR) {
        Some(divider) => format!("{}{}", &source_tag[..=divider], tag),
        None => tag.to_owned(),
    }
}

/// Owner part of a tag (`"sound:dac"` -> `Some("sound")`)
pub fn parent_tag(tag: &str) -> Option<&str> {
    tag.rfind(TAG_SEPARATOR).map(|divider| &tag[..divider])
}

/// Last component of a tag (`"sound:dac"` -> `"dac"`)
pub fn leaf_tag(tag: &str) -> &str {
    match tag.rfind(TAG_SEPARATOR) {
        Some(divider) => &tag[divider + 1..],
        None => tag,
    }
}
