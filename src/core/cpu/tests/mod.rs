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

//! CPU test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: CPU initialization, reset, register access, PC handling
//! - `load_delay`: Load delay slot behavior
//! - `branch_delay`: Branch delay slot behavior
//! - `exceptions`: Exception entry, vectors, interrupts
//! - `cop0`: COP0 coprocessor operations (MFC0, MTC0, RFE, LWC0/SWC0)
//! - `decode`: Instruction decoding
//! - `instructions`: Instruction semantics

mod instructions;

use super::*;

/// Test programs are placed in RAM here
pub(super) const PROGRAM_BASE: u32 = 0x8000_1000;

/// Data area used by load/store tests
pub(super) const DATA_BASE: u32 = 0x8000_0100;

/// General exception vector with SR.BEV set (the reset value)
pub(super) const BOOT_HANDLER: u32 = 0xBFC0_0180;

/// Place `program` at [`PROGRAM_BASE`] and point the CPU at it
pub(super) fn setup(program: &[u32]) -> (CPU, Bus) {
    setup_with(CPU::new(), program)
}

pub(super) fn setup_with(mut cpu: CPU, program: &[u32]) -> (CPU, Bus) {
    let mut bus = Bus::new();
    let bytes: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
    bus.write_ram_slice(PROGRAM_BASE, &bytes);
    cpu.set_entry_point(PROGRAM_BASE);
    (cpu, bus)
}

pub(super) fn run(cpu: &mut CPU, bus: &mut Bus, steps: usize) {
    for _ in 0..steps {
        cpu.step(bus).unwrap();
    }
}

/// Minimal MIPS encoder for hand-written test programs
#[allow(dead_code)]
pub(super) mod asm {
    fn r(funct: u32, rs: u8, rt: u8, rd: u8, shamt: u8) -> u32 {
        ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | ((shamt as u32) << 6) | funct
    }

    fn i(op: u32, rs: u8, rt: u8, imm: u16) -> u32 {
        (op << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | imm as u32
    }

    pub fn nop() -> u32 {
        0
    }

    pub fn sll(rd: u8, rt: u8, shamt: u8) -> u32 {
        r(0x00, 0, rt, rd, shamt)
    }
    pub fn srl(rd: u8, rt: u8, shamt: u8) -> u32 {
        r(0x02, 0, rt, rd, shamt)
    }
    pub fn sra(rd: u8, rt: u8, shamt: u8) -> u32 {
        r(0x03, 0, rt, rd, shamt)
    }
    pub fn sllv(rd: u8, rt: u8, rs: u8) -> u32 {
        r(0x04, rs, rt, rd, 0)
    }
    pub fn srav(rd: u8, rt: u8, rs: u8) -> u32 {
        r(0x07, rs, rt, rd, 0)
    }
    pub fn jr(rs: u8) -> u32 {
        r(0x08, rs, 0, 0, 0)
    }
    pub fn jalr(rd: u8, rs: u8) -> u32 {
        r(0x09, rs, 0, rd, 0)
    }
    pub fn syscall() -> u32 {
        0x0000_000C
    }
    pub fn brk() -> u32 {
        0x0000_000D
    }
    pub fn mfhi(rd: u8) -> u32 {
        r(0x10, 0, 0, rd, 0)
    }
    pub fn mflo(rd: u8) -> u32 {
        r(0x12, 0, 0, rd, 0)
    }
    pub fn mult(rs: u8, rt: u8) -> u32 {
        r(0x18, rs, rt, 0, 0)
    }
    pub fn multu(rs: u8, rt: u8) -> u32 {
        r(0x19, rs, rt, 0, 0)
    }
    pub fn div(rs: u8, rt: u8) -> u32 {
        r(0x1A, rs, rt, 0, 0)
    }
    pub fn divu(rs: u8, rt: u8) -> u32 {
        r(0x1B, rs, rt, 0, 0)
    }
    pub fn add(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x20, rs, rt, rd, 0)
    }
    pub fn addu(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x21, rs, rt, rd, 0)
    }
    pub fn sub(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x22, rs, rt, rd, 0)
    }
    pub fn subu(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x23, rs, rt, rd, 0)
    }
    pub fn and(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x24, rs, rt, rd, 0)
    }
    pub fn or(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x25, rs, rt, rd, 0)
    }
    pub fn xor(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x26, rs, rt, rd, 0)
    }
    pub fn nor(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x27, rs, rt, rd, 0)
    }
    pub fn slt(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x2A, rs, rt, rd, 0)
    }
    pub fn sltu(rd: u8, rs: u8, rt: u8) -> u32 {
        r(0x2B, rs, rt, rd, 0)
    }

    pub fn bltz(rs: u8, offset: i16) -> u32 {
        i(0x01, rs, 0x00, offset as u16)
    }
    pub fn bgez(rs: u8, offset: i16) -> u32 {
        i(0x01, rs, 0x01, offset as u16)
    }
    pub fn bltzal(rs: u8, offset: i16) -> u32 {
        i(0x01, rs, 0x10, offset as u16)
    }
    pub fn bgezal(rs: u8, offset: i16) -> u32 {
        i(0x01, rs, 0x11, offset as u16)
    }
    pub fn j(address: u32) -> u32 {
        (0x02 << 26) | ((address >> 2) & 0x03FF_FFFF)
    }
    pub fn jal(address: u32) -> u32 {
        (0x03 << 26) | ((address >> 2) & 0x03FF_FFFF)
    }
    pub fn beq(rs: u8, rt: u8, offset: i16) -> u32 {
        i(0x04, rs, rt, offset as u16)
    }
    pub fn bne(rs: u8, rt: u8, offset: i16) -> u32 {
        i(0x05, rs, rt, offset as u16)
    }
    pub fn blez(rs: u8, offset: i16) -> u32 {
        i(0x06, rs, 0, offset as u16)
    }
    pub fn bgtz(rs: u8, offset: i16) -> u32 {
        i(0x07, rs, 0, offset as u16)
    }
    pub fn addi(rt: u8, rs: u8, imm: i16) -> u32 {
        i(0x08, rs, rt, imm as u16)
    }
    pub fn addiu(rt: u8, rs: u8, imm: i16) -> u32 {
        i(0x09, rs, rt, imm as u16)
    }
    pub fn slti(rt: u8, rs: u8, imm: i16) -> u32 {
        i(0x0A, rs, rt, imm as u16)
    }
    pub fn sltiu(rt: u8, rs: u8, imm: i16) -> u32 {
        i(0x0B, rs, rt, imm as u16)
    }
    pub fn andi(rt: u8, rs: u8, imm: u16) -> u32 {
        i(0x0C, rs, rt, imm)
    }
    pub fn ori(rt: u8, rs: u8, imm: u16) -> u32 {
        i(0x0D, rs, rt, imm)
    }
    pub fn xori(rt: u8, rs: u8, imm: u16) -> u32 {
        i(0x0E, rs, rt, imm)
    }
    pub fn lui(rt: u8, imm: u16) -> u32 {
        i(0x0F, 0, rt, imm)
    }
    pub fn mfc0(rt: u8, rd: u8) -> u32 {
        i(0x10, 0x00, rt, (rd as u16) << 11)
    }
    pub fn mtc0(rt: u8, rd: u8) -> u32 {
        i(0x10, 0x04, rt, (rd as u16) << 11)
    }
    pub fn rfe() -> u32 {
        0x4200_0010
    }
    pub fn lb(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x20, base, rt, offset as u16)
    }
    pub fn lh(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x21, base, rt, offset as u16)
    }
    pub fn lwl(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x22, base, rt, offset as u16)
    }
    pub fn lw(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x23, base, rt, offset as u16)
    }
    pub fn lbu(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x24, base, rt, offset as u16)
    }
    pub fn lhu(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x25, base, rt, offset as u16)
    }
    pub fn lwr(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x26, base, rt, offset as u16)
    }
    pub fn sb(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x28, base, rt, offset as u16)
    }
    pub fn sh(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x29, base, rt, offset as u16)
    }
    pub fn swl(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x2A, base, rt, offset as u16)
    }
    pub fn sw(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x2B, base, rt, offset as u16)
    }
    pub fn swr(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x2E, base, rt, offset as u16)
    }
    pub fn lwc0(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x30, base, rt, offset as u16)
    }
    pub fn swc0(rt: u8, offset: i16, base: u8) -> u32 {
        i(0x38, base, rt, offset as u16)
    }
}
