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

use super::super::*;
use super::write_bios_program;
use tempfile::tempdir;

#[test]
fn test_system_step() {
    let mut system = System::new();
    write_bios_program(&mut system, &[0x0000_0000]);

    let initial_pc = system.pc();
    let cycles = system.step().unwrap();

    assert_eq!(system.pc(), initial_pc + 4);
    assert_eq!(system.cycles(), u64::from(cycles));
}

#[test]
fn test_system_step_n() {
    let mut system = System::new();
    system.step_n(10).unwrap();

    assert_eq!(system.pc(), 0xBFC00028);
    assert_eq!(system.cycles(), 20);
}

#[test]
fn test_run_frame_spends_budget_and_raises_vblank() {
    let config = EmulatorConfig {
        cycles_per_frame: 100,
        ..EmulatorConfig::default()
    };
    let mut system = System::with_config(&config);

    // 0xBFC00000: j 0xBFC00000 ; nop
    write_bios_program(&mut system, &[0x0BF0_0000, 0x0000_0000]);

    system.run_frame().unwrap();

    assert_eq!(system.cycles(), 100);
    assert_eq!(system.frame_count(), 1);
    assert_eq!(system.bus().interrupt().read_status() & 1, 1);
    assert!(system.pc() == 0xBFC00000 || system.pc() == 0xBFC00004);
}

#[test]
fn test_run_frames_counts_frames() {
    let config = EmulatorConfig {
        cycles_per_frame: 10,
        ..EmulatorConfig::default()
    };
    let mut system = System::with_config(&config);

    system.run_frames(3).unwrap();

    assert_eq!(system.frame_count(), 3);
    assert_eq!(system.cycles(), 30);
}

#[test]
fn test_tty_snoop_captures_putchar() {
    let mut system = System::new();
    write_bios_program(
        &mut system,
        &[
            0x2409_003C, // addiu $t1, $zero, 0x3C
            0x2404_0048, // addiu $a0, $zero, 'H'
            0x2408_00A0, // addiu $t0, $zero, 0xA0
            0x0100_0008, // jr $t0
            0x0000_0000, // nop
        ],
    );

    system.step_n(5).unwrap();
    assert_eq!(system.pc(), 0xA0);
    assert!(system.tty().pending().is_empty());

    system.step().unwrap();
    assert_eq!(system.tty().pending(), b"H");
}

#[test]
fn test_tracing_respects_limit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trace.log");

    let mut system = System::new();
    system.enable_tracing(&path, 3).unwrap();
    assert!(system.is_tracing());

    system.step_n(5).unwrap();
    assert_eq!(system.trace_count(), 3);

    system.disable_tracing();
    assert!(!system.is_tracing());
    assert_eq!(system.trace_count(), 0);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 3);
    assert!(contents.starts_with("PC=0xBFC00000"));
}
