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


//! Device layer components
//!
//! This module contains:
//! - Device interface layer (query protocol, registry, lifecycle)
//! - Reference device types
//! - Host machine and machine descriptions
//! - Error types

pub mod device;
pub mod devices;
pub mod error;
pub mod machine;

// Re-export commonly used types
pub use device::{Device, DeviceClass, DeviceInterface, DeviceList, DeviceType};
pub use error::{DeviceError, Result};
pub use machine::{DeviceCatalog, Machine, MachineConfig, MachineDescription};
