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

//! Test fixtures for common test scenarios

use cw33300::core::cpu::CPU;
use cw33300::core::loader::PSXExecutable;
use cw33300::core::memory::Bus;
use cw33300::core::system::System;

/// RAM address test programs are loaded at
#[allow(dead_code)]
pub const PROGRAM_BASE: u32 = 0x8001_0000;

/// Create a CPU and bus with `program` at [`PROGRAM_BASE`], ready to run
#[allow(dead_code)]
pub fn create_cpu_with_program(program: &[u32]) -> (CPU, Bus) {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();
    load_test_program(&mut bus, PROGRAM_BASE, program);
    cpu.set_entry_point(PROGRAM_BASE);
    (cpu, bus)
}

/// Create a System running `program` from RAM, as if sideloaded
#[allow(dead_code)]
pub fn create_system_with_program(program: &[u32]) -> System {
    let mut system = System::new();
    system.install_exe(exe_from_program(program));
    system
}

/// Wrap `program` in a PSX-EXE image loading at [`PROGRAM_BASE`]
#[allow(dead_code)]
pub fn exe_from_program(program: &[u32]) -> PSXExecutable {
    let data: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
    PSXExecutable {
        pc: PROGRAM_BASE,
        gp: 0,
        load_address: PROGRAM_BASE,
        load_size: data.len() as u32,
        stack_base: 0x801F_FFF0,
        stack_offset: 0,
        data,
    }
}

/// Serialize `program` as a PSX-EXE file image
#[allow(dead_code)]
pub fn exe_file_bytes(program: &[u32]) -> Vec<u8> {
    let payload: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
    let mut data = vec![0u8; PSXExecutable::HEADER_SIZE];
    data[0..8].copy_from_slice(b"PS-X EXE");
    data[0x10..0x14].copy_from_slice(&PROGRAM_BASE.to_le_bytes());
    data[0x18..0x1C].copy_from_slice(&PROGRAM_BASE.to_le_bytes());
    data[0x1C..0x20].copy_from_slice(&(payload.len() as u32).to_le_bytes());
    data[0x30..0x34].copy_from_slice(&0x801F_FFF0u32.to_le_bytes());
    data.extend_from_slice(&payload);
    data
}

/// Load a test program into memory at specified address
#[allow(dead_code)]
pub fn load_test_program(bus: &mut Bus, start_addr: u32, program: &[u32]) {
    for (i, &instruction) in program.iter().enumerate() {
        let addr = start_addr + (i as u32 * 4);
        bus.write32(addr, instruction)
            .expect("Failed to write to memory");
    }
}

/// Execute N CPU instructions
#[allow(dead_code)]
pub fn execute_n_instructions(cpu: &mut CPU, bus: &mut Bus, n: usize) {
    for _ in 0..n {
        cpu.step(bus).expect("host-level error while stepping");
    }
}
