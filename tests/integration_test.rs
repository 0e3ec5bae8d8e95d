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


mod common;

use common::assertions::{assert_all_in_state, assert_released, assert_tags};
use common::fixtures::{build_machine, shipped_machine, write_machine_file, TWO_DEVICE_MACHINE};
use devcore::core::device::{
    devinfo, Device, DeviceClass, DeviceFct, DeviceInfo, DeviceInterface, DevicePeers,
    DeviceStart, DeviceState, DeviceType, StateId,
};
use devcore::core::devices::{cpu, dac, latch};
use devcore::core::error::{DeviceError, Result};
use devcore::core::machine::{DeviceCatalog, Machine, MachineDescription, MachineListing};

#[test]
fn test_shipped_machine_lifecycle() -> Result<()> {
    let description = MachineDescription::load(shipped_machine("usgames.toml"))?;
    let config = description.build(&DeviceCatalog::builtin())?;
    let mut machine = Machine::new(config);

    let startup = machine.start()?;
    assert_eq!(startup.devices, 5);
    assert_eq!(startup.sweeps, 2);
    assert_all_in_state(machine.devices(), DeviceState::Started);

    let devices = machine.devices();
    assert_tags(devices, cpu::device_type(), &["maincpu", "sound:audiocpu"]);
    assert_tags(devices, latch::device_type(), &["sound", "leds"]);

    let main = devices.find_by_tag(cpu::device_type(), "maincpu").unwrap();
    assert_eq!(cpu::pc(main), 0xFFFF);
    assert_eq!(cpu::clock(main), 2_000_000);

    let dac = devices.class_first(DeviceClass::SoundChip).unwrap();
    assert_eq!(dac.tag(), "sound:dac");
    assert_eq!(dac.get_info_string(dac::STR_CPU_TAG), "sound:audiocpu");
    assert_eq!(dac::volume(dac), 192);

    machine.reset();
    machine.exit();
    assert_all_in_state(machine.devices(), DeviceState::Stopped);
    assert_released(machine.devices());
    Ok(())
}

#[test]
fn test_machine_file_round_trip_through_disk() -> Result<()> {
    let file = write_machine_file(TWO_DEVICE_MACHINE);

    let description = MachineDescription::load(file.path())?;
    let mut machine = Machine::new(description.build(&DeviceCatalog::builtin())?);
    machine.start()?;

    let main = machine.devices().first(cpu::device_type()).unwrap();
    assert_eq!(cpu::pc(main), 0x4040);
    Ok(())
}

#[test]
fn test_listing_after_resets() {
    let mut machine = build_machine(TWO_DEVICE_MACHINE);
    let startup = machine.start().unwrap();
    machine.reset();
    machine.reset();

    let listing = MachineListing::new(&machine, Some(startup));
    let json = serde_json::to_value(&listing).unwrap();

    assert_eq!(json["name"], "pair");
    assert_eq!(json["startup"]["sweeps"], 2);
    assert_eq!(json["devices"][0]["tag"], "dac");
    assert_eq!(json["devices"][0]["state"], "started");
    assert_eq!(json["devices"][1]["functions"][0], "set_info");

    let main = machine.devices().first(cpu::device_type()).unwrap();
    assert_eq!(main.get_info_int(cpu::INT_RESET_COUNT), 2);
    machine.exit();
}

#[test]
fn test_dac_without_cpu_fails_to_start() {
    let mut machine = build_machine(
        r#"
        name = "mute"
        [[device]]
        type = "dac"
        tag = "dac"
        cpu = "nowhere"
        "#,
    );

    let err = machine.start().unwrap_err();
    assert!(matches!(err, DeviceError::StartFailed { .. }));
    assert!(err.to_string().contains("nowhere"));

    machine.exit();
    assert_released(machine.devices());
}

/// Device type defined outside the crate: waits for every latch to start
struct Watchdog;

fn watchdog_start(_device: &mut Device, peers: &DevicePeers<'_>) -> Result<DeviceStart> {
    let ready = peers
        .iter()
        .filter(|peer| peer.device_type() == latch::device_type())
        .all(Device::is_started);
    Ok(if ready {
        DeviceStart::Ok
    } else {
        DeviceStart::Deferred
    })
}

impl DeviceInterface for Watchdog {
    fn type_info(state: StateId, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(2),
            devinfo::INT_CLASS => info.set_int(DeviceClass::Timer.as_raw()),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(watchdog_start)),
            devinfo::STR_NAME => info.set_str("Watchdog"),
            _ => {}
        }
    }
}

#[test]
fn test_catalog_accepts_external_types() {
    let mut catalog = DeviceCatalog::builtin();
    catalog.register("watchdog", DeviceType::of::<Watchdog>(), None);

    let description = MachineDescription::from_toml_str(
        r#"
        name = "guarded"
        [[device]]
        type = "watchdog"
        tag = "wdt"
        [[device]]
        type = "latch"
        tag = "leds"
        "#,
    )
    .unwrap();

    let mut machine = Machine::new(description.build(&catalog).unwrap());
    let startup = machine.start().unwrap();
    assert_eq!(startup.sweeps, 2);

    let wdt = machine.devices().class_first(DeviceClass::Timer).unwrap();
    assert_eq!(wdt.name(), "Watchdog");
    assert_eq!(wdt.token_bytes(), 2);
}

#[test]
fn test_unknown_type_is_not_fatal() {
    let description = MachineDescription::from_toml_str(
        r#"
        name = "future"
        [[device]]
        type = "watchdog"
        tag = "wdt"
        "#,
    )
    .unwrap();

    let err = description.build(&DeviceCatalog::builtin()).unwrap_err();
    assert!(matches!(err, DeviceError::UnknownDeviceType(_)));
    assert!(!err.is_fatal());
}
