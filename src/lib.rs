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


//! Generic device interface layer for machine emulation
//!
//! This library lets a machine host heterogeneous devices (processors, sound
//! chips, glue logic) through one uniform abstraction: devices are described
//! by type and tag, queried through a numbered information protocol, and
//! started, reset and stopped by the lifecycle manager.
//!
//! # Example
//!
//! ```
//! use devcore::core::devices::{cpu, latch};
//! use devcore::core::machine::{Machine, MachineConfig};
//!
//! let mut config = MachineConfig::new("demo");
//! config.regions.add("maincpu", vec![0x00, 0x80]);
//! config.devices.add(cpu::device_type(), "maincpu").unwrap();
//! config.devices.add(latch::device_type(), "leds").unwrap();
//!
//! let mut machine = Machine::new(config);
//! machine.start().unwrap();
//!
//! let main = machine.devices().first(cpu::device_type()).unwrap();
//! assert_eq!(cpu::pc(main), 0x8000);
//!
//! machine.exit();
//! ```

pub mod core;
