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


//! Test fixtures for common machine scenarios

use devcore::core::machine::{DeviceCatalog, Machine, MachineDescription};
use std::io::Write;
use std::path::PathBuf;
use tempfile::{Builder, NamedTempFile};

/// Minimal machine: one CPU with a reset vector and a DAC it drives
#[allow(dead_code)]
pub const TWO_DEVICE_MACHINE: &str = r#"
name = "pair"

[[region]]
tag = "maincpu"
size = 16
fill = 0x40

[[device]]
type = "dac"
tag = "dac"
cpu = "maincpu"

[[device]]
type = "cpu"
tag = "maincpu"
clock = 4000000
"#;

/// Path of a machine description shipped with the crate
#[allow(dead_code)]
pub fn shipped_machine(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("machines")
        .join(name)
}

/// Write a machine description to a temporary `.toml` file
#[allow(dead_code)]
pub fn write_machine_file(text: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .prefix("machine")
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temporary machine file");
    file.write_all(text.as_bytes())
        .expect("Failed to write machine file");
    file
}

/// Parse and build a machine from description text with the builtin catalog
#[allow(dead_code)]
pub fn build_machine(text: &str) -> Machine {
    let description =
        MachineDescription::from_toml_str(text).expect("Failed to parse machine description");
    let config = description
        .build(&DeviceCatalog::builtin())
        .expect("Failed to build machine");
    Machine::new(config)
}
