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

//! Tests for machine hooks and lifecycle wiring

use super::*;
use crate::core::devices::{cpu, dac, latch};
use std::cell::RefCell;

thread_local! {
    static EVENTS: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

fn record(event: u8) {
    EVENTS.with(|events| events.borrow_mut().push(event));
}

fn take_events() -> Vec<u8> {
    EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
}

#[test]
fn test_machine_new() {
    let mut config = MachineConfig::new("usgames");
    config.regions.add("maincpu", vec![0u8; 8]);
    config.devices.add(latch::device_type(), "leds").unwrap();

    let machine = Machine::new(config);
    assert_eq!(machine.name(), "usgames");
    assert_eq!(machine.context().name(), "usgames");
    assert_eq!(machine.devices().len(), 1);
    assert_eq!(machine.region("maincpu").unwrap().len(), 8);
    assert!(machine.context().regions().region("missing").is_none());
    assert!(!machine.is_running());
}

#[test]
fn test_reset_hooks_run_in_registration_order() {
    take_events();
    let mut machine = Machine::new(MachineConfig::new("hooks"));
    machine.add_reset_callback(|_| record(1));
    machine.add_reset_callback(|_| record(2));
    machine.add_reset_callback(|_| record(3));

    machine.reset();
    machine.reset();
    assert_eq!(take_events(), vec![1, 2, 3, 1, 2, 3]);
}

#[test]
fn test_exit_hooks_run_in_reverse_order_once() {
    take_events();
    let mut machine = Machine::new(MachineConfig::new("hooks"));
    machine.add_exit_callback(|_| record(1));
    machine.add_exit_callback(|_| record(2));
    machine.add_reset_callback(|_| record(9));

    machine.exit();
    machine.exit();
    machine.reset();
    assert_eq!(take_events(), vec![2, 1]);
}

#[test]
fn test_start_and_exit() {
    let mut config = MachineConfig::new("usgames");
    config.regions.add("maincpu", vec![0x00, 0xC0]);
    config.devices.add(dac::device_type(), "dac").unwrap();
    config.devices.add(cpu::device_type(), "maincpu").unwrap();
    config.devices.add(latch::device_type(), "leds").unwrap();

    let mut machine = Machine::new(config);
    let summary = machine.start().unwrap();
    assert_eq!(summary, StartupSummary { devices: 3, sweeps: 2 });
    assert!(machine.is_running());

    let main = machine.devices().find_by_tag(cpu::device_type(), "maincpu").unwrap();
    assert_eq!(cpu::pc(main), 0xC000);
    assert!(Rc::ptr_eq(main.machine().unwrap(), machine.context()));

    machine.exit();
    assert!(!machine.is_running());
    assert!(machine.devices().iter().all(|device| device.token().is_none()));
}

#[test]
fn test_reset_after_start_resets_devices() {
    let mut config = MachineConfig::new("usgames");
    config.devices.add(cpu::device_type(), "maincpu").unwrap();

    let mut machine = Machine::new(config);
    machine.start().unwrap();
    machine.reset();
    machine.reset();

    let main = machine.devices().first(cpu::device_type()).unwrap();
    assert_eq!(main.get_info_int(cpu::INT_RESET_COUNT), 2);
}

#[test]
fn test_second_start_is_rejected() {
    let mut config = MachineConfig::new("usgames");
    config.regions.add("maincpu", vec![0x00, 0x80]);
    config.devices.add(cpu::device_type(), "maincpu").unwrap();

    let mut machine = Machine::new(config);
    machine.start().unwrap();
    machine
        .devices_mut()
        .find_mut(cpu::device_type(), "maincpu")
        .unwrap()
        .set_info_int(cpu::INT_PC, 0x4000);

    let err = machine.start().unwrap_err();
    assert!(matches!(err, DeviceError::AlreadyStarted(ref name) if name == "usgames"));
    assert!(machine.is_running());

    // Tokens are untouched and the reset hook is registered only once
    let main = machine.devices().first(cpu::device_type()).unwrap();
    assert_eq!(cpu::pc(main), 0x4000);
    machine.reset();
    let main = machine.devices().first(cpu::device_type()).unwrap();
    assert_eq!(main.get_info_int(cpu::INT_RESET_COUNT), 1);
}

#[test]
fn test_start_after_failed_start_is_rejected() {
    let mut config = MachineConfig::new("broken");
    config.devices.add(dac::device_type(), "dac").unwrap();

    let mut machine = Machine::new(config);
    assert!(matches!(machine.start(), Err(DeviceError::StartFailed { .. })));
    assert!(matches!(machine.start(), Err(DeviceError::AlreadyStarted(_))));
    assert!(!machine.is_running());
}
