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

//! Hand-assembled test programs
//!
//! Every program ends in a `beq $zero, $zero, -1` spin so running extra
//! steps is harmless.

/// Source buffer of [`memcpy_words`]
#[allow(dead_code)]
pub const MEMCPY_SRC: u32 = 0x8002_0000;
/// Destination buffer of [`memcpy_words`]
#[allow(dead_code)]
pub const MEMCPY_DST: u32 = 0x8002_0100;

/// Copy 4 words from [`MEMCPY_SRC`] to [`MEMCPY_DST`]
///
/// Both delay slots are used: the pointer bumps sit right after the load
/// and right after the branch. 28 instructions until the spin.
#[allow(dead_code)]
pub fn memcpy_words() -> Vec<u32> {
    vec![
        0x3C048002, // LUI   $a0, 0x8002
        0x3C058002, // LUI   $a1, 0x8002
        0x34A50100, // ORI   $a1, $a1, 0x100
        0x24060004, // ADDIU $a2, $zero, 4
        0x8C880000, // loop: LW $t0, 0($a0)
        0x24840004, // ADDIU $a0, $a0, 4      ; load delay slot
        0xACA80000, // SW    $t0, 0($a1)
        0x24C6FFFF, // ADDIU $a2, $a2, -1
        0x14C0FFFB, // BNE   $a2, $zero, loop
        0x24A50004, // ADDIU $a1, $a1, 4      ; branch delay slot
        0x1000FFFF, // spin: BEQ $zero, $zero, spin
        0x00000000, // NOP
    ]
}

/// Leave fib(10) = 55 in `$v0`; 64 instructions until the spin
#[allow(dead_code)]
pub fn fibonacci() -> Vec<u32> {
    vec![
        0x24080000, // ADDIU $t0, $zero, 0
        0x24090001, // ADDIU $t1, $zero, 1
        0x240A000A, // ADDIU $t2, $zero, 10
        0x01095821, // loop: ADDU $t3, $t0, $t1
        0x01204025, // OR    $t0, $t1, $zero
        0x01604825, // OR    $t1, $t3, $zero
        0x254AFFFF, // ADDIU $t2, $t2, -1
        0x1540FFFB, // BNE   $t2, $zero, loop
        0x00000000, // NOP
        0x01001025, // OR    $v0, $t0, $zero
        0x1000FFFF, // spin: BEQ $zero, $zero, spin
        0x00000000, // NOP
    ]
}

/// General exception vector with SR.BEV clear
#[allow(dead_code)]
pub const RAM_HANDLER: u32 = 0x8000_0080;

/// Exception handler that skips the faulting instruction
///
/// Sets `$v1 = 0x99`, returns to EPC + 4 and pops the mode stack with the
/// RFE in the `jr` delay slot.
#[allow(dead_code)]
pub fn skip_handler() -> Vec<u32> {
    vec![
        0x401A7000, // MFC0  $k0, $14 (EPC)
        0x00000000, // NOP                    ; load delay slot
        0x275A0004, // ADDIU $k0, $k0, 4
        0x24030099, // ADDIU $v1, $zero, 0x99
        0x03400008, // JR    $k0
        0x42000010, // RFE                    ; branch delay slot
    ]
}

/// Raise a syscall and continue after it
///
/// Expects [`skip_handler`] at [`RAM_HANDLER`]. Sets `$v0 = 1` once the
/// handler has returned. 9 instructions until the spin.
#[allow(dead_code)]
pub fn syscall_and_return() -> Vec<u32> {
    vec![
        0x40806000, // MTC0  $zero, $12 (SR)  ; BEV=0, interrupts off
        0x0000000C, // SYSCALL
        0x24020001, // ADDIU $v0, $zero, 1
        0x1000FFFF, // spin: BEQ $zero, $zero, spin
        0x00000000, // NOP
    ]
}

/// Print "OK\n" through the kernel putchar hook, B(3Dh) style
///
/// Each call jumps to 0xB0 with `$t1 = 0x3D`. RAM there reads as NOPs, so
/// the "kernel" falls through to `jr $ra` stubs written by the caller at
/// 0xB0.
#[allow(dead_code)]
pub fn putchar_ok() -> Vec<u32> {
    let mut program = Vec::new();
    for chr in b"OK\n" {
        program.extend_from_slice(&[
            0x24040000 | *chr as u32, // ADDIU $a0, $zero, chr
            0x240800B0,               // ADDIU $t0, $zero, 0xB0
            0x0100F809,               // JALR  $ra, $t0
            0x2409003D,               // ADDIU $t1, $zero, 0x3D ; delay slot
        ]);
    }
    program.extend_from_slice(&[0x1000FFFF, 0x00000000]);
    program
}

/// Kernel function stub: return immediately
#[allow(dead_code)]
pub fn return_stub() -> Vec<u32> {
    vec![
        0x03E00008, // JR $ra
        0x00000000, // NOP
    ]
}
