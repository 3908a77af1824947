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

//! Instruction semantics

use super::*;

/// Run `program` with the given initial registers, one step per instruction
/// plus one trailing step so delayed loads land
fn exec(program: &[u32], regs: &[(u8, u32)]) -> (CPU, Bus) {
    let (mut cpu, mut bus) = setup(program);
    for &(reg, value) in regs {
        cpu.set_reg(reg, value);
    }
    run(&mut cpu, &mut bus, program.len() + 1);
    (cpu, bus)
}

#[test]
fn test_logical_ops() {
    let regs = [(8, 0xF0F0_1234), (9, 0x0FF0_FF00)];

    let (cpu, _) = exec(&[asm::and(10, 8, 9)], &regs);
    assert_eq!(cpu.reg(10), 0x00F0_1200);

    let (cpu, _) = exec(&[asm::or(10, 8, 9)], &regs);
    assert_eq!(cpu.reg(10), 0xFFF0_FF34);

    let (cpu, _) = exec(&[asm::xor(10, 8, 9)], &regs);
    assert_eq!(cpu.reg(10), 0xFF00_ED34);

    let (cpu, _) = exec(&[asm::nor(10, 8, 9)], &regs);
    assert_eq!(cpu.reg(10), 0x000F_00CB);
}

#[test]
fn test_logical_immediates_zero_extend() {
    let regs = [(8, 0xFFFF_FFFF)];

    let (cpu, _) = exec(&[asm::andi(10, 8, 0x8001)], &regs);
    assert_eq!(cpu.reg(10), 0x0000_8001);

    let (cpu, _) = exec(&[asm::ori(10, 0, 0x8000)], &regs);
    assert_eq!(cpu.reg(10), 0x0000_8000);

    let (cpu, _) = exec(&[asm::xori(10, 8, 0xFFFF)], &regs);
    assert_eq!(cpu.reg(10), 0xFFFF_0000);
}

#[test]
fn test_lui() {
    let (cpu, _) = exec(&[asm::lui(8, 0xBFC0)], &[(8, 0xFFFF)]);
    assert_eq!(cpu.reg(8), 0xBFC0_0000);
}

#[test]
fn test_addiu_sign_extends() {
    let (cpu, _) = exec(&[asm::addiu(10, 8, -1)], &[(8, 10)]);
    assert_eq!(cpu.reg(10), 9);
}

#[test]
fn test_set_less_than() {
    let regs = [(8, 0xFFFF_FFFF), (9, 1)];

    let (cpu, _) = exec(&[asm::slt(10, 8, 9), asm::sltu(11, 8, 9)], &regs);
    assert_eq!(cpu.reg(10), 1);
    assert_eq!(cpu.reg(11), 0);

    // The immediate is sign-extended for both, then compared unsigned for sltiu
    let (cpu, _) = exec(&[asm::slti(10, 9, -1), asm::sltiu(11, 9, -1)], &regs);
    assert_eq!(cpu.reg(10), 0);
    assert_eq!(cpu.reg(11), 1);
}

#[test]
fn test_shifts() {
    let regs = [(8, 0x8000_00F0), (9, 36)];

    let (cpu, _) = exec(&[asm::sll(10, 8, 4)], &regs);
    assert_eq!(cpu.reg(10), 0x0000_0F00);

    let (cpu, _) = exec(&[asm::srl(10, 8, 4)], &regs);
    assert_eq!(cpu.reg(10), 0x0800_000F);

    let (cpu, _) = exec(&[asm::sra(10, 8, 4)], &regs);
    assert_eq!(cpu.reg(10), 0xF800_000F);

    // Variable shifts use the low 5 bits only (36 & 0x1F = 4)
    let (cpu, _) = exec(&[asm::sllv(10, 8, 9)], &regs);
    assert_eq!(cpu.reg(10), 0x0000_0F00);

    let (cpu, _) = exec(&[asm::srav(10, 8, 9)], &regs);
    assert_eq!(cpu.reg(10), 0xF800_000F);
}

#[test]
fn test_mult_signed_and_unsigned() {
    let regs = [(8, 0xFFFF_FFFE), (9, 3)];

    let (cpu, _) = exec(&[asm::mult(8, 9), asm::mfhi(10), asm::mflo(11)], &regs);
    assert_eq!(cpu.reg(10), 0xFFFF_FFFF);
    assert_eq!(cpu.reg(11), 0xFFFF_FFFA);

    let (cpu, _) = exec(&[asm::multu(8, 9), asm::mfhi(10), asm::mflo(11)], &regs);
    assert_eq!(cpu.reg(10), 0x0000_0002);
    assert_eq!(cpu.reg(11), 0xFFFF_FFFA);
}

#[test]
fn test_div() {
    let (cpu, _) = exec(&[asm::div(8, 9)], &[(8, (-7i32) as u32), (9, 2)]);
    assert_eq!(cpu.lo(), (-3i32) as u32);
    assert_eq!(cpu.hi(), (-1i32) as u32);

    let (cpu, _) = exec(&[asm::divu(8, 9)], &[(8, 7), (9, 2)]);
    assert_eq!(cpu.lo(), 3);
    assert_eq!(cpu.hi(), 1);
}

#[test]
fn test_divide_by_zero_does_not_trap() {
    let (cpu, _) = exec(&[asm::div(8, 0)], &[(8, 5)]);
    assert_eq!(cpu.lo(), 0xFFFF_FFFF);
    assert_eq!(cpu.hi(), 5);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 8);

    let (cpu, _) = exec(&[asm::div(8, 0)], &[(8, (-5i32) as u32)]);
    assert_eq!(cpu.lo(), 1);

    let (cpu, _) = exec(&[asm::divu(8, 0)], &[(8, 9)]);
    assert_eq!(cpu.lo(), 0xFFFF_FFFF);
    assert_eq!(cpu.hi(), 9);
}

#[test]
fn test_div_min_by_minus_one() {
    let (cpu, _) = exec(&[asm::div(8, 9)], &[(8, 0x8000_0000), (9, 0xFFFF_FFFF)]);
    assert_eq!(cpu.lo(), 0x8000_0000);
    assert_eq!(cpu.hi(), 0);
}

#[test]
fn test_mthi_mtlo() {
    let (cpu, _) = exec(
        &[0x0100_0011, 0x0120_0013], // mthi $t0 ; mtlo $t1
        &[(8, 0x11), (9, 0x22)],
    );
    assert_eq!(cpu.hi(), 0x11);
    assert_eq!(cpu.lo(), 0x22);
}

#[test]
fn test_loads_extend() {
    let (mut cpu, mut bus) = setup(&[
        asm::lb(8, 0x100, 0),
        asm::lbu(9, 0x100, 0),
        asm::lh(10, 0x102, 0),
        asm::lhu(11, 0x102, 0),
        asm::nop(),
    ]);
    bus.write32(DATA_BASE, 0x8001_7F80).unwrap();

    run(&mut cpu, &mut bus, 5);

    assert_eq!(cpu.reg(8), 0xFFFF_FF80);
    assert_eq!(cpu.reg(9), 0x0000_0080);
    assert_eq!(cpu.reg(10), 0xFFFF_8001);
    assert_eq!(cpu.reg(11), 0x0000_8001);
}

#[test]
fn test_store_sizes() {
    let (_, bus) = exec(
        &[asm::sb(8, 0x100, 0), asm::sh(8, 0x102, 0), asm::sw(8, 0x104, 0)],
        &[(8, 0xAABB_CCDD)],
    );

    assert_eq!(bus.read32(DATA_BASE).unwrap(), 0xCCDD_00DD);
    assert_eq!(bus.read32(DATA_BASE + 4).unwrap(), 0xAABB_CCDD);
}

#[test]
fn test_swl_swr_unaligned_store() {
    let (_, bus) = exec(
        &[asm::swr(8, 0x101, 0), asm::swl(8, 0x104, 0)],
        &[(8, 0xAABB_CCDD)],
    );

    // Bytes DD CC BB AA starting at DATA_BASE + 1
    assert_eq!(bus.read32(DATA_BASE).unwrap(), 0xBBCC_DD00);
    assert_eq!(bus.read32(DATA_BASE + 4).unwrap(), 0x0000_00AA);
}

#[test]
fn test_store_in_kseg1_reaches_ram() {
    let (_, bus) = exec(
        &[asm::lui(9, 0xA000), asm::sw(8, 0x100, 9)],
        &[(8, 0x1357_9BDF)],
    );
    assert_eq!(bus.read32(0x8000_0100).unwrap(), 0x1357_9BDF);
    assert_eq!(bus.read32(0x0000_0100).unwrap(), 0x1357_9BDF);
}
