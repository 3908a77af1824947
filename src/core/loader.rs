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

//! PSX-EXE loading
//!
//! PSX-EXE files have a 2048-byte header followed by the executable image:
//!
//! ```text
//! 0x00-0x07: "PS-X EXE" magic
//! 0x10-0x13: Initial PC (entry point)
//! 0x14-0x17: Initial GP (global pointer)
//! 0x18-0x1B: Load address
//! 0x1C-0x1F: Load size
//! 0x30-0x33: Stack base
//! 0x34-0x37: Stack offset
//! 0x800+:    Executable data
//! ```
//!
//! Sideloading copies the image into RAM and points the CPU at the entry
//! point, the same hand-off the BIOS shell performs after reading an
//! executable from disc.
//!
//! # Example
//!
//! ```
//! use cw33300::core::loader::PSXExecutable;
//!
//! let mut exe_data = vec![0u8; 0x800];
//! exe_data[0..8].copy_from_slice(b"PS-X EXE");
//! exe_data[0x10..0x14].copy_from_slice(&0x8001_0000u32.to_le_bytes());
//!
//! let exe = PSXExecutable::load(&exe_data).unwrap();
//! assert_eq!(exe.pc, 0x8001_0000);
//! assert!(exe.data.is_empty());
//! ```

use super::cpu::{CPU, REG_FP, REG_GP, REG_SP};
use super::error::{EmulatorError, Result};
use super::memory::Bus;
use std::path::Path;

/// PSX-EXE executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PSXExecutable {
    /// Initial program counter (entry point)
    pub pc: u32,

    /// Initial global pointer (GP register, r28)
    pub gp: u32,

    /// Load address in RAM
    pub load_address: u32,

    /// Size of data to load
    pub load_size: u32,

    /// Stack base address, 0 = keep the current stack
    pub stack_base: u32,

    /// Stack offset from base
    pub stack_offset: u32,

    /// Executable data (code and initialized data)
    pub data: Vec<u8>,
}

impl PSXExecutable {
    /// PSX-EXE header size
    pub const HEADER_SIZE: usize = 0x800;

    const MAGIC: &'static [u8; 8] = b"PS-X EXE";

    /// Parse a PSX-EXE image
    ///
    /// # Errors
    ///
    /// `EmulatorError::LoaderError` if the header is truncated, the magic is
    /// wrong or the declared size runs past the end of the file.
    pub fn load(data: &[u8]) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(EmulatorError::LoaderError(
                "Invalid PSX-EXE: file too small".to_string(),
            ));
        }

        if &data[0..8] != Self::MAGIC {
            return Err(EmulatorError::LoaderError(
                "Invalid PSX-EXE: bad magic number".to_string(),
            ));
        }

        let pc = read_u32(data, 0x10);
        let gp = read_u32(data, 0x14);
        let load_address = read_u32(data, 0x18);
        let load_size = read_u32(data, 0x1C);
        let stack_base = read_u32(data, 0x30);
        let stack_offset = read_u32(data, 0x34);

        let data_start = Self::HEADER_SIZE;
        let data_end = data_start + load_size as usize;

        if data_end > data.len() {
            return Err(EmulatorError::LoaderError(format!(
                "Invalid PSX-EXE: load_size (0x{:X}) exceeds file size",
                load_size
            )));
        }

        log::info!(
            "PSX-EXE parsed: PC=0x{:08X}, GP=0x{:08X}, Load=0x{:08X}, Size=0x{:X}",
            pc,
            gp,
            load_address,
            load_size
        );

        Ok(Self {
            pc,
            gp,
            load_address,
            load_size,
            stack_base,
            stack_offset,
            data: data[data_start..data_end].to_vec(),
        })
    }

    /// Read and parse a PSX-EXE file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            EmulatorError::LoaderError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::load(&data)
    }

    /// Copy the image into RAM and hand control to its entry point
    ///
    /// Sets PC (dropping any in-flight load or branch) and `$gp`. When the
    /// header names a stack, `$sp` and `$fp` are set to base + offset.
    pub fn sideload(&self, cpu: &mut CPU, bus: &mut Bus) {
        bus.write_ram_slice(self.load_address, &self.data);

        cpu.set_entry_point(self.pc);
        cpu.set_reg(REG_GP, self.gp);

        if self.stack_base != 0 {
            let sp = self.stack_base.wrapping_add(self.stack_offset);
            cpu.set_reg(REG_SP, sp);
            cpu.set_reg(REG_FP, sp);
        }

        log::info!(
            "PSX-EXE sideloaded: {} bytes at 0x{:08X}, entry 0x{:08X}",
            self.data.len(),
            self.load_address,
            self.pc
        );
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_exe(pc: u32, load_address: u32, payload: &[u8], stack_base: u32) -> Vec<u8> {
        let mut data = vec![0u8; PSXExecutable::HEADER_SIZE];
        data[0..8].copy_from_slice(b"PS-X EXE");
        data[0x10..0x14].copy_from_slice(&pc.to_le_bytes());
        data[0x14..0x18].copy_from_slice(&0x8002_0000u32.to_le_bytes());
        data[0x18..0x1C].copy_from_slice(&load_address.to_le_bytes());
        data[0x1C..0x20].copy_from_slice(&(payload.len() as u32).to_le_bytes());
        data[0x30..0x34].copy_from_slice(&stack_base.to_le_bytes());
        data[0x34..0x38].copy_from_slice(&0x10u32.to_le_bytes());
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_psx_exe_loading() {
        let data = build_exe(0x8001_0000, 0x8001_0000, &[0xAA; 0x100], 0x801F_FF00);

        let exe = PSXExecutable::load(&data).unwrap();

        assert_eq!(exe.pc, 0x8001_0000);
        assert_eq!(exe.gp, 0x8002_0000);
        assert_eq!(exe.load_address, 0x8001_0000);
        assert_eq!(exe.load_size, 0x100);
        assert_eq!(exe.stack_base, 0x801F_FF00);
        assert_eq!(exe.stack_offset, 0x10);
        assert_eq!(exe.data.len(), 0x100);
    }

    #[test]
    fn test_psx_exe_invalid_magic() {
        let mut data = vec![0u8; 0x900];
        data[0..8].copy_from_slice(b"INVALID!");

        assert!(matches!(
            PSXExecutable::load(&data),
            Err(EmulatorError::LoaderError(_))
        ));
    }

    #[test]
    fn test_psx_exe_too_small() {
        let data = vec![0u8; 0x100];
        assert!(PSXExecutable::load(&data).is_err());
    }

    #[test]
    fn test_psx_exe_truncated_payload() {
        let mut data = build_exe(0x8001_0000, 0x8001_0000, &[0; 0x10], 0);
        data.truncate(PSXExecutable::HEADER_SIZE + 4);
        assert!(PSXExecutable::load(&data).is_err());
    }

    #[test]
    fn test_sideload_sets_registers_and_memory() {
        let payload = 0x2408_0005u32.to_le_bytes();
        let data = build_exe(0x8001_0000, 0x8001_0000, &payload, 0x801F_FF00);
        let exe = PSXExecutable::load(&data).unwrap();

        let mut cpu = CPU::new();
        let mut bus = Bus::new();
        exe.sideload(&mut cpu, &mut bus);

        assert_eq!(bus.read32(0x8001_0000).unwrap(), 0x2408_0005);
        assert_eq!(cpu.pc(), 0x8001_0000);
        assert_eq!(cpu.reg(REG_GP), 0x8002_0000);
        assert_eq!(cpu.reg(REG_SP), 0x801F_FF10);
        assert_eq!(cpu.reg(REG_FP), 0x801F_FF10);
    }

    #[test]
    fn test_sideload_without_stack_keeps_sp() {
        let data = build_exe(0x8001_0000, 0x8001_0000, &[], 0);
        let exe = PSXExecutable::load(&data).unwrap();

        let mut cpu = CPU::new();
        let mut bus = Bus::new();
        cpu.set_reg(REG_SP, 0x801F_FFF0);
        exe.sideload(&mut cpu, &mut bus);

        assert_eq!(cpu.reg(REG_SP), 0x801F_FFF0);
    }

    #[test]
    fn test_from_file_missing() {
        let result = PSXExecutable::from_file("/nonexistent/test.exe");
        assert!(matches!(result, Err(EmulatorError::LoaderError(_))));
    }
}
