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

/// Device layer error types
use thiserror::Error;

/// Result type for device layer operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Main error type for the device layer
///
/// Every registry and lifecycle failure is a configuration fault: it can only
/// be discovered at run time, but it never happens in a correctly assembled
/// machine. These are propagated up to a single abort path instead of being
/// retried. The remaining variants cover loading machine descriptions.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Attempted to add duplicate device: type={device_type} tag={tag}")]
    DuplicateDevice { device_type: String, tag: String },

    #[error("Attempted to remove non-existent device: type={device_type} tag={tag}")]
    NonexistentDevice { device_type: String, tag: String },

    #[error("Device {name} ({tag}) specifies a 0 token length")]
    ZeroTokenLength { name: String, tag: String },

    #[error("Device {name} ({tag}) has no start function")]
    MissingStartFunction { name: String, tag: String },

    #[error("Circular dependency in device startup; unable to start {unstarted}/{total} devices")]
    CircularDependency { unstarted: usize, total: usize },

    #[error("The wildcard device type cannot be registered")]
    WildcardType,

    #[error("Machine {0} has already been started")]
    AlreadyStarted(String),

    #[error("Device {tag} failed to start: {reason}")]
    StartFailed { tag: String, reason: String },

    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),

    #[error("Invalid parameter {name} for device {tag}: {reason}")]
    InvalidParameter {
        tag: String,
        name: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeviceError {
    /// Whether this error is an unrecoverable machine configuration fault
    ///
    /// Loading errors (`Io`, `Config`, `UnknownDeviceType`, `InvalidParameter`)
    /// are reported the same way by the CLI but originate outside the device
    /// layer itself.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DeviceError::UnknownDeviceType(_)
                | DeviceError::InvalidParameter { .. }
                | DeviceError::Config(_)
                | DeviceError::Io(_)
        )
    }
}
