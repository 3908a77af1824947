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

//! Property tests for the CPU core
//!
//! Each property runs short programs on a fresh CPU and compares the result
//! against a plain Rust model of the instruction.

mod common;

use common::fixtures::*;
use cw33300::core::cpu::{ExceptionCause, CPU};
use cw33300::core::memory::Bus;
use proptest::prelude::*;

const DATA: u32 = 0x8000_0100;

fn i_type(op: u32, rs: u8, rt: u8, imm: u16) -> u32 {
    (op << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | imm as u32
}

fn r_type(funct: u32, rs: u8, rt: u8, rd: u8) -> u32 {
    ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | funct
}

fn lw(rt: u8, offset: u16) -> u32 {
    i_type(0x23, 0, rt, offset)
}

fn or(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x25, rs, rt, rd)
}

fn run_program(program: &[u32], regs: &[(u8, u32)], steps: usize) -> (CPU, Bus) {
    let (mut cpu, mut bus) = create_cpu_with_program(program);
    for &(reg, value) in regs {
        cpu.set_reg(reg, value);
    }
    execute_n_instructions(&mut cpu, &mut bus, steps);
    (cpu, bus)
}

/// Reference model of DIV: (lo, hi)
fn model_div(n: i32, d: i32) -> (u32, u32) {
    match (n, d) {
        (n, 0) => (if n >= 0 { 0xFFFF_FFFF } else { 1 }, n as u32),
        (i32::MIN, -1) => (0x8000_0000, 0),
        (n, d) => ((n / d) as u32, (n % d) as u32),
    }
}

/// Fresh registers for the load delay properties, away from $zero
fn load_reg() -> impl Strategy<Value = u8> {
    8u8..=15
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// The instruction after a load reads the old value, the one after
    /// that reads the loaded value
    #[test]
    fn load_is_visible_after_one_instruction(
        reg in load_reg(),
        old in any::<u32>(),
        loaded in any::<u32>(),
    ) {
        let program = [lw(reg, 0x100), or(20, reg, 0), or(21, reg, 0)];
        let (mut cpu, mut bus) = create_cpu_with_program(&program);
        bus.write32(DATA, loaded).unwrap();
        cpu.set_reg(reg, old);

        execute_n_instructions(&mut cpu, &mut bus, 3);

        prop_assert_eq!(cpu.reg(20), old);
        prop_assert_eq!(cpu.reg(21), loaded);
    }

    /// A write to the load target in the delay slot discards the load
    #[test]
    fn delay_slot_write_discards_load(
        reg in load_reg(),
        loaded in any::<u32>(),
        imm in any::<u16>(),
    ) {
        let program = [lw(reg, 0x100), i_type(0x0D, 0, reg, imm), 0, 0];
        let (mut cpu, mut bus) = create_cpu_with_program(&program);
        bus.write32(DATA, loaded).unwrap();

        execute_n_instructions(&mut cpu, &mut bus, 4);

        prop_assert_eq!(cpu.reg(reg), imm as u32);
    }

    /// Register 0 reads as zero at every instruction boundary and arbitrary
    /// words never produce a host error
    #[test]
    fn zero_register_survives_any_program(words in prop::collection::vec(any::<u32>(), 1..24)) {
        let (mut cpu, mut bus) = create_cpu_with_program(&words);
        for _ in 0..words.len() + 2 {
            prop_assert!(cpu.step(&mut bus).is_ok());
            prop_assert_eq!(cpu.reg(0), 0);
        }
    }

    /// Exactly one instruction runs between a taken branch and its target
    #[test]
    fn taken_branch_runs_one_delay_slot(offset in 2i16..64) {
        // beq $zero, $zero, offset ; ori $t0, $zero, 1 ; ori $t1, $zero, 1
        let program = [
            i_type(0x04, 0, 0, offset as u16),
            i_type(0x0D, 0, 8, 1),
            i_type(0x0D, 0, 9, 1),
        ];
        let (cpu, _) = run_program(&program, &[], 2);

        prop_assert_eq!(cpu.reg(8), 1);
        prop_assert_eq!(cpu.reg(9), 0);
        prop_assert_eq!(cpu.pc(), PROGRAM_BASE + 4 + ((offset as u32) << 2));
    }

    /// DIV matches the model, including the non-trapping special cases
    #[test]
    fn div_matches_model(
        n in prop_oneof![Just(i32::MIN), Just(0), any::<i32>()],
        d in prop_oneof![Just(0), Just(-1), any::<i32>()],
    ) {
        let program = [r_type(0x1A, 8, 9, 0)];
        let (cpu, _) = run_program(&program, &[(8, n as u32), (9, d as u32)], 1);

        let (lo, hi) = model_div(n, d);
        prop_assert_eq!(cpu.lo(), lo);
        prop_assert_eq!(cpu.hi(), hi);
        prop_assert_eq!(cpu.pc(), PROGRAM_BASE + 4);
    }

    /// ADDI traps exactly when the signed sum overflows; ADDIU never traps
    #[test]
    fn addi_overflow_matches_checked_add(a in any::<i32>(), imm in any::<i16>()) {
        let addi = i_type(0x08, 8, 9, imm as u16);
        let (cpu, _) = run_program(&[addi], &[(8, a as u32), (9, 0xDEAD_BEEF)], 1);

        match a.checked_add(imm as i32) {
            Some(sum) => {
                prop_assert_eq!(cpu.reg(9), sum as u32);
                prop_assert_eq!(cpu.pc(), PROGRAM_BASE + 4);
            }
            None => {
                prop_assert_eq!(cpu.reg(9), 0xDEAD_BEEF);
                prop_assert_eq!(
                    cpu.cop0().cause().exception_code(),
                    ExceptionCause::Overflow as u32
                );
            }
        }

        let addiu = i_type(0x09, 8, 9, imm as u16);
        let (cpu, _) = run_program(&[addiu], &[(8, a as u32)], 1);
        prop_assert_eq!(cpu.reg(9), a.wrapping_add(imm as i32) as u32);
    }

    /// SUB traps exactly when the signed difference overflows
    #[test]
    fn sub_overflow_matches_checked_sub(a in any::<i32>(), b in any::<i32>()) {
        let sub = r_type(0x22, 8, 9, 10);
        let (cpu, _) = run_program(&[sub], &[(8, a as u32), (9, b as u32)], 1);

        match a.checked_sub(b) {
            Some(diff) => prop_assert_eq!(cpu.reg(10), diff as u32),
            None => {
                prop_assert_eq!(cpu.reg(10), 0);
                prop_assert_eq!(cpu.cop0().epc(), PROGRAM_BASE);
            }
        }
    }

    /// Misaligned word accesses fault with BadVaddr and touch nothing
    #[test]
    fn misaligned_word_access_faults(offset in 0u16..0x100, store in any::<bool>()) {
        let address = 0x200u16 + (offset & !0x3) + 1 + (offset % 3);
        let instruction = if store {
            i_type(0x2B, 0, 9, address)
        } else {
            i_type(0x23, 0, 9, address)
        };
        let (cpu, bus) = run_program(&[instruction], &[(9, 0xFFFF_FFFF)], 1);

        let expected = if store {
            ExceptionCause::AddressErrorStore
        } else {
            ExceptionCause::AddressErrorLoad
        };
        prop_assert_eq!(cpu.cop0().cause().exception_code(), expected as u32);
        prop_assert_eq!(cpu.cop0().bad_vaddr(), address as u32);
        prop_assert_eq!(bus.read32(address as u32 & !0x3).unwrap(), 0);
        prop_assert_eq!(cpu.reg(9), 0xFFFF_FFFF);
    }

    /// RAM is reachable through every segment and mirrored every 2MB
    #[test]
    fn ram_mirrors(offset in (0u32..0x0020_0000).prop_map(|o| o & !0x3), value in any::<u32>()) {
        let mut bus = Bus::new();
        bus.write32(offset, value).unwrap();

        for base in [0x0000_0000u32, 0x8000_0000, 0xA000_0000] {
            for mirror in 0..4u32 {
                prop_assert_eq!(bus.read32(base + mirror * 0x0020_0000 + offset).unwrap(), value);
            }
        }
    }
}
