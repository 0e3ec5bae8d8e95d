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


//! Custom assertions for device layer testing

use devcore::core::device::{DeviceList, DeviceState, DeviceType};

/// Assert every device is in the given lifecycle state
#[allow(dead_code)]
pub fn assert_all_in_state(devices: &DeviceList, expected: DeviceState) {
    for device in devices.iter() {
        assert_eq!(
            device.state(),
            expected,
            "Device {} state mismatch: expected {:?}, got {:?}",
            device.tag(),
            expected,
            device.state()
        );
    }
}

/// Assert the devices of a type appear with exactly these tags, in order
#[allow(dead_code)]
pub fn assert_tags(devices: &DeviceList, device_type: DeviceType, expected: &[&str]) {
    let actual: Vec<&str> = devices.iter_type(device_type).map(|d| d.tag()).collect();
    assert_eq!(
        actual, expected,
        "Tag order mismatch for {:?}: expected {:?}, got {:?}",
        device_type, expected, actual
    );
}

/// Assert no device holds runtime state
#[allow(dead_code)]
pub fn assert_released(devices: &DeviceList) {
    for device in devices.iter() {
        assert!(
            device.token().is_none() && device.machine().is_none() && device.region().is_none(),
            "Device {} still holds runtime state",
            device.tag()
        );
    }
}
