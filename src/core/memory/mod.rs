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

//! Memory bus
//!
//! The Bus routes every CPU access to its backing store: main RAM, the
//! scratchpad, the BIOS ROM, the expansion regions, the cache control
//! register or one of the I/O register blocks.
//!
//! # Memory Map
//!
//! | Physical Address Range | Region       | Size   | Access |
//! |------------------------|--------------|--------|--------|
//! | 0x00000000-0x007FFFFF  | RAM          | 2MB    | R/W, mirrored 4x |
//! | 0x1F000000-0x1F7FFFFF  | Expansion 1  | 8MB    | R (open bus) |
//! | 0x1F800000-0x1F8003FF  | Scratchpad   | 1KB    | R/W    |
//! | 0x1F801000-0x1F801FFF  | I/O Ports    | 4KB    | R/W    |
//! | 0x1F802000-0x1F802FFF  | Expansion 2  | 4KB    | R (open bus) |
//! | 0x1FA00000-0x1FBFFFFF  | Expansion 3  | 2MB    | R (open bus) |
//! | 0x1FC00000-0x1FC7FFFF  | BIOS ROM     | 512KB  | R only |
//! | 0x1FFE0130             | Cache Control| 4B     | R/W    |
//!
//! Anything else reads as all ones and ignores writes.
//!
//! # Cache isolation
//!
//! While SR.IsC (bit 16) is set the CPU writes into its cache instead of
//! memory. Writes to RAM and BIOS are dropped; the scratchpad, the I/O ports
//! and the cache control register are unaffected.
//!
//! # Example
//!
//! ```
//! use cw33300::core::memory::Bus;
//!
//! let mut bus = Bus::new();
//!
//! // Write to RAM via KSEG0
//! bus.write32(0x80000000, 0x12345678).unwrap();
//!
//! // Read from same location via different segment (should mirror)
//! assert_eq!(bus.read32(0x00000000).unwrap(), 0x12345678);
//! assert_eq!(bus.read32(0xA0000000).unwrap(), 0x12345678);
//! ```

use crate::core::dma::DMA;
use crate::core::error::{EmulatorError, Result};
use crate::core::gpu::GPU;
use crate::core::interrupt::InterruptController;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

// Module declarations
mod io_device;
mod io_ports;
mod region;
#[cfg(test)]
mod tests;

// Re-exports
pub use io_device::IODevice;
pub use region::MemoryRegion;

/// Value seen on reads from unmapped or empty address space
pub const OPEN_BUS: u32 = 0xFFFF_FFFF;

/// Memory bus managing all memory accesses
pub struct Bus {
    /// Main RAM (2MB), physical 0x00000000-0x001FFFFF
    ram: Vec<u8>,

    /// Scratchpad (1KB data cache used as fast RAM)
    scratchpad: [u8; 1024],

    /// BIOS ROM (512KB), physical 0x1FC00000-0x1FC7FFFF
    bios: Vec<u8>,

    /// Cache Control register (0xFFFE0130)
    cache_control: u32,

    /// Mirror of SR.IsC, kept in sync by the CPU on SR writes
    cache_isolated: bool,

    /// Memory Control 1 (0x1F801000-0x1F801023)
    mem_control: [u32; 9],

    /// Memory Control 2, RAM_SIZE (0x1F801060)
    ram_size: u32,

    interrupt: InterruptController,
    dma: DMA,
    gpu: GPU,
}

/// Serializable contents of the bus for save states
///
/// The BIOS image is not part of the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct MemoryState {
    pub ram: Vec<u8>,
    pub scratchpad: Vec<u8>,
    pub cache_control: u32,
    pub mem_control: [u32; 9],
    pub ram_size: u32,
    pub interrupt: InterruptController,
    pub dma: DMA,
    pub gpu: GPU,
}

impl Bus {
    /// RAM size (2MB)
    pub const RAM_SIZE: usize = 2 * 1024 * 1024;

    /// BIOS size (512KB)
    pub const BIOS_SIZE: usize = 512 * 1024;

    /// Scratchpad size (1KB)
    pub const SCRATCHPAD_SIZE: usize = 1024;

    /// RAM window, the 2MB array repeats four times inside it
    pub(super) const RAM_START: u32 = 0x0000_0000;
    pub(super) const RAM_END: u32 = 0x007F_FFFF;

    pub(super) const EXP1_START: u32 = 0x1F00_0000;
    pub(super) const EXP1_END: u32 = 0x1F7F_FFFF;

    /// Expansion 1 ROM header (entry points checked by the BIOS)
    pub(super) const EXP1_HEADER_END: u32 = 0x1F00_00FF;

    pub(super) const SCRATCHPAD_START: u32 = 0x1F80_0000;
    pub(super) const SCRATCHPAD_END: u32 = 0x1F80_03FF;

    pub(super) const IO_START: u32 = 0x1F80_1000;
    pub(super) const IO_END: u32 = 0x1F80_1FFF;

    pub(super) const EXP2_START: u32 = 0x1F80_2000;
    pub(super) const EXP2_END: u32 = 0x1F80_2FFF;

    pub(super) const EXP3_START: u32 = 0x1FA0_0000;
    pub(super) const EXP3_END: u32 = 0x1FBF_FFFF;

    pub(super) const BIOS_START: u32 = 0x1FC0_0000;
    pub(super) const BIOS_END: u32 = 0x1FC7_FFFF;

    pub(super) const CACHE_CONTROL: u32 = 0x1FFE_0130;

    /// Create a new Bus instance
    ///
    /// RAM, scratchpad and BIOS start zeroed, so an empty BIOS executes as
    /// a stream of NOPs.
    ///
    /// # Example
    ///
    /// ```
    /// use cw33300::core::memory::Bus;
    ///
    /// let bus = Bus::new();
    /// assert!(!bus.is_cache_isolated());
    /// ```
    pub fn new() -> Self {
        Self {
            ram: vec![0u8; Self::RAM_SIZE],
            scratchpad: [0u8; Self::SCRATCHPAD_SIZE],
            bios: vec![0u8; Self::BIOS_SIZE],
            cache_control: 0,
            cache_isolated: false,
            mem_control: [0u32; 9],
            ram_size: 0,
            interrupt: InterruptController::new(),
            dma: DMA::new(),
            gpu: GPU::new(),
        }
    }

    /// Reset the bus to its power-on state
    ///
    /// Clears RAM, scratchpad, the control registers and the peripherals.
    /// The BIOS image is kept.
    ///
    /// # Example
    ///
    /// ```
    /// use cw33300::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x80000000, 0x12345678).unwrap();
    /// bus.reset();
    /// assert_eq!(bus.read32(0x80000000).unwrap(), 0x00000000);
    /// ```
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.scratchpad.fill(0);
        self.cache_control = 0;
        self.cache_isolated = false;
        self.mem_control = [0u32; 9];
        self.ram_size = 0;
        self.interrupt = InterruptController::new();
        self.dma.reset();
        self.gpu.reset();
    }

    /// Load BIOS from file
    ///
    /// The file must be exactly 512KB.
    ///
    /// # Errors
    ///
    /// - `EmulatorError::BiosNotFound` if the file cannot be opened
    /// - `EmulatorError::InvalidBiosSize` if the size is not 512KB
    /// - `EmulatorError::Io` if reading fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cw33300::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.load_bios("SCPH1001.BIN").unwrap();
    /// ```
    pub fn load_bios<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|_| EmulatorError::BiosNotFound(path.display().to_string()))?;

        let size = file.metadata()?.len() as usize;
        if size != Self::BIOS_SIZE {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: size,
            });
        }

        file.read_exact(&mut self.bios)?;
        log::info!("BIOS loaded from {}", path.display());

        Ok(())
    }

    /// Install a BIOS image from memory
    ///
    /// # Errors
    ///
    /// `EmulatorError::InvalidBiosSize` unless `data` is exactly 512KB.
    pub fn load_bios_bytes(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != Self::BIOS_SIZE {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: data.len(),
            });
        }
        self.bios.copy_from_slice(data);
        Ok(())
    }

    /// Copy `data` into RAM at `address`, ignoring cache isolation
    ///
    /// Used by the EXE loader. The address is translated and wraps within
    /// the 2MB array.
    pub fn write_ram_slice(&mut self, address: u32, data: &[u8]) {
        let base = self.translate_address(address) as usize;
        for (i, byte) in data.iter().enumerate() {
            self.ram[(base + i) & (Self::RAM_SIZE - 1)] = *byte;
        }
    }

    /// Set the cache isolation flag (mirror of SR bit 16)
    pub fn set_cache_isolated(&mut self, isolated: bool) {
        if self.cache_isolated != isolated {
            log::debug!(
                "Cache {}",
                if isolated { "isolated" } else { "no longer isolated" }
            );
        }
        self.cache_isolated = isolated;
    }

    pub fn is_cache_isolated(&self) -> bool {
        self.cache_isolated
    }

    /// Cache Control register value
    pub fn cache_control(&self) -> u32 {
        self.cache_control
    }

    pub fn interrupt(&self) -> &InterruptController {
        &self.interrupt
    }

    pub fn interrupt_mut(&mut self) -> &mut InterruptController {
        &mut self.interrupt
    }

    /// Raise interrupt requests in I_STAT
    pub fn request_interrupt(&mut self, interrupt: u16) {
        self.interrupt.request(interrupt);
    }

    pub fn gpu(&self) -> &GPU {
        &self.gpu
    }

    pub fn dma(&self) -> &DMA {
        &self.dma
    }

    /// Read 8-bit value from memory
    ///
    /// # Example
    ///
    /// ```
    /// use cw33300::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write8(0x80000000, 0x42).unwrap();
    /// assert_eq!(bus.read8(0x80000000).unwrap(), 0x42);
    /// ```
    pub fn read8(&self, vaddr: u32) -> Result<u8> {
        let paddr = self.translate_address(vaddr);

        match self.identify_region(vaddr) {
            MemoryRegion::RAM => Ok(self.ram[Self::ram_offset(paddr)]),
            MemoryRegion::Scratchpad => {
                Ok(self.scratchpad[(paddr - Self::SCRATCHPAD_START) as usize])
            }
            MemoryRegion::BIOS => Ok(self.bios[(paddr - Self::BIOS_START) as usize]),
            MemoryRegion::IO => self.read_io_port8(paddr),
            MemoryRegion::CacheControl => Ok(self.cache_control as u8),
            MemoryRegion::Expansion => Ok(Self::read_expansion(paddr) as u8),
            MemoryRegion::Unmapped => {
                log::debug!("Unmapped read8 at 0x{:08X}", vaddr);
                Ok(OPEN_BUS as u8)
            }
        }
    }

    /// Read 16-bit value from memory
    ///
    /// # Errors
    ///
    /// `EmulatorError::UnalignedAccess` if the address is not 2-byte aligned.
    ///
    /// # Example
    ///
    /// ```
    /// use cw33300::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write16(0x80000000, 0x1234).unwrap();
    /// assert_eq!(bus.read16(0x80000000).unwrap(), 0x1234);
    ///
    /// // Unaligned access fails
    /// assert!(bus.read16(0x80000001).is_err());
    /// ```
    pub fn read16(&self, vaddr: u32) -> Result<u16> {
        check_alignment(vaddr, 2)?;
        let paddr = self.translate_address(vaddr);

        match self.identify_region(vaddr) {
            MemoryRegion::RAM => Ok(read_u16(&self.ram, Self::ram_offset(paddr))),
            MemoryRegion::Scratchpad => Ok(read_u16(
                &self.scratchpad,
                (paddr - Self::SCRATCHPAD_START) as usize,
            )),
            MemoryRegion::BIOS => Ok(read_u16(&self.bios, (paddr - Self::BIOS_START) as usize)),
            MemoryRegion::IO => self.read_io_port16(paddr),
            MemoryRegion::CacheControl => Ok(self.cache_control as u16),
            MemoryRegion::Expansion => Ok(Self::read_expansion(paddr) as u16),
            MemoryRegion::Unmapped => {
                log::debug!("Unmapped read16 at 0x{:08X}", vaddr);
                Ok(OPEN_BUS as u16)
            }
        }
    }

    /// Read 32-bit value from memory
    ///
    /// # Errors
    ///
    /// `EmulatorError::UnalignedAccess` if the address is not 4-byte aligned.
    pub fn read32(&self, vaddr: u32) -> Result<u32> {
        check_alignment(vaddr, 4)?;
        let paddr = self.translate_address(vaddr);

        match self.identify_region(vaddr) {
            MemoryRegion::RAM => Ok(read_u32(&self.ram, Self::ram_offset(paddr))),
            MemoryRegion::Scratchpad => Ok(read_u32(
                &self.scratchpad,
                (paddr - Self::SCRATCHPAD_START) as usize,
            )),
            MemoryRegion::BIOS => Ok(read_u32(&self.bios, (paddr - Self::BIOS_START) as usize)),
            MemoryRegion::IO => self.read_io_port32(paddr),
            MemoryRegion::CacheControl => {
                log::trace!("Cache control read -> 0x{:08X}", self.cache_control);
                Ok(self.cache_control)
            }
            MemoryRegion::Expansion => Ok(Self::read_expansion(paddr)),
            MemoryRegion::Unmapped => {
                log::debug!("Unmapped read32 at 0x{:08X}", vaddr);
                Ok(OPEN_BUS)
            }
        }
    }

    /// Write 8-bit value to memory
    pub fn write8(&mut self, vaddr: u32, value: u8) -> Result<()> {
        let paddr = self.translate_address(vaddr);

        match self.identify_region(vaddr) {
            MemoryRegion::RAM => {
                if !self.drop_isolated_write(vaddr) {
                    self.ram[Self::ram_offset(paddr)] = value;
                }
                Ok(())
            }
            MemoryRegion::Scratchpad => {
                self.scratchpad[(paddr - Self::SCRATCHPAD_START) as usize] = value;
                Ok(())
            }
            MemoryRegion::IO => self.write_io_port8(paddr, value),
            region => {
                self.ignore_write(region, vaddr, value as u32);
                Ok(())
            }
        }
    }

    /// Write 16-bit value to memory
    ///
    /// # Errors
    ///
    /// `EmulatorError::UnalignedAccess` if the address is not 2-byte aligned.
    pub fn write16(&mut self, vaddr: u32, value: u16) -> Result<()> {
        check_alignment(vaddr, 2)?;
        let paddr = self.translate_address(vaddr);

        match self.identify_region(vaddr) {
            MemoryRegion::RAM => {
                if !self.drop_isolated_write(vaddr) {
                    write_bytes(&mut self.ram, Self::ram_offset(paddr), &value.to_le_bytes());
                }
                Ok(())
            }
            MemoryRegion::Scratchpad => {
                let offset = (paddr - Self::SCRATCHPAD_START) as usize;
                write_bytes(&mut self.scratchpad, offset, &value.to_le_bytes());
                Ok(())
            }
            MemoryRegion::IO => self.write_io_port16(paddr, value),
            region => {
                self.ignore_write(region, vaddr, value as u32);
                Ok(())
            }
        }
    }

    /// Write 32-bit value to memory
    ///
    /// # Errors
    ///
    /// `EmulatorError::UnalignedAccess` if the address is not 4-byte aligned.
    ///
    /// # Example
    ///
    /// ```
    /// use cw33300::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.set_cache_isolated(true);
    /// bus.write32(0x80000000, 0x12345678).unwrap();
    /// assert_eq!(bus.read32(0x80000000).unwrap(), 0);
    ///
    /// // The scratchpad is not behind the cache
    /// bus.write32(0x1F800000, 0x12345678).unwrap();
    /// assert_eq!(bus.read32(0x1F800000).unwrap(), 0x12345678);
    /// ```
    pub fn write32(&mut self, vaddr: u32, value: u32) -> Result<()> {
        check_alignment(vaddr, 4)?;
        let paddr = self.translate_address(vaddr);

        match self.identify_region(vaddr) {
            MemoryRegion::RAM => {
                if !self.drop_isolated_write(vaddr) {
                    write_bytes(&mut self.ram, Self::ram_offset(paddr), &value.to_le_bytes());
                }
                Ok(())
            }
            MemoryRegion::Scratchpad => {
                let offset = (paddr - Self::SCRATCHPAD_START) as usize;
                write_bytes(&mut self.scratchpad, offset, &value.to_le_bytes());
                Ok(())
            }
            MemoryRegion::IO => self.write_io_port32(paddr, value),
            MemoryRegion::CacheControl => {
                log::debug!("Cache control write: 0x{:08X}", value);
                self.cache_control = value;
                Ok(())
            }
            region => {
                self.ignore_write(region, vaddr, value);
                Ok(())
            }
        }
    }

    /// Capture RAM, scratchpad and peripheral registers
    pub fn snapshot(&self) -> MemoryState {
        MemoryState {
            ram: self.ram.clone(),
            scratchpad: self.scratchpad.to_vec(),
            cache_control: self.cache_control,
            mem_control: self.mem_control,
            ram_size: self.ram_size,
            interrupt: self.interrupt.clone(),
            dma: self.dma.clone(),
            gpu: self.gpu.clone(),
        }
    }

    /// Restore a captured state
    ///
    /// The cache isolation flag is not part of the state; the caller
    /// re-derives it from SR.
    ///
    /// # Errors
    ///
    /// `EmulatorError::SaveState` if the RAM or scratchpad sizes do not match.
    pub fn restore(&mut self, state: &MemoryState) -> Result<()> {
        if state.ram.len() != Self::RAM_SIZE || state.scratchpad.len() != Self::SCRATCHPAD_SIZE {
            return Err(EmulatorError::SaveState(format!(
                "memory size mismatch: ram={} scratchpad={}",
                state.ram.len(),
                state.scratchpad.len()
            )));
        }

        self.ram.copy_from_slice(&state.ram);
        self.scratchpad.copy_from_slice(&state.scratchpad);
        self.cache_control = state.cache_control;
        self.mem_control = state.mem_control;
        self.ram_size = state.ram_size;
        self.interrupt = state.interrupt.clone();
        self.dma = state.dma.clone();
        self.gpu = state.gpu.clone();
        Ok(())
    }

    #[inline(always)]
    fn ram_offset(paddr: u32) -> usize {
        paddr as usize & (Self::RAM_SIZE - 1)
    }

    /// Expansion regions have nothing attached
    ///
    /// The Expansion 1 header reads as zero so the BIOS sees no ROM entry
    /// points there.
    fn read_expansion(paddr: u32) -> u32 {
        if (Self::EXP1_START..=Self::EXP1_HEADER_END).contains(&paddr) {
            0
        } else {
            OPEN_BUS
        }
    }

    fn drop_isolated_write(&self, vaddr: u32) -> bool {
        if self.cache_isolated {
            log::trace!("Write to 0x{:08X} dropped (cache isolated)", vaddr);
        }
        self.cache_isolated
    }

    fn ignore_write(&self, region: MemoryRegion, vaddr: u32, value: u32) {
        log::trace!(
            "{:?} write at 0x{:08X} = 0x{:08X} (ignored)",
            region,
            vaddr,
            value
        );
    }

    /// Write directly to BIOS memory (test helper)
    ///
    /// # Panics
    ///
    /// Panics if offset + data.len() exceeds BIOS size
    #[cfg(test)]
    pub(crate) fn write_bios_for_test(&mut self, offset: usize, data: &[u8]) {
        let end = offset + data.len();
        assert!(
            end <= Self::BIOS_SIZE,
            "BIOS write out of bounds: offset={}, len={}",
            offset,
            data.len()
        );
        self.bios[offset..end].copy_from_slice(data);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

fn check_alignment(vaddr: u32, size: u8) -> Result<()> {
    if vaddr & (size as u32 - 1) != 0 {
        return Err(EmulatorError::UnalignedAccess {
            address: vaddr,
            size,
        });
    }
    Ok(())
}

#[inline(always)]
fn read_u16(mem: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([mem[offset], mem[offset + 1]])
}

#[inline(always)]
fn read_u32(mem: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        mem[offset],
        mem[offset + 1],
        mem[offset + 2],
        mem[offset + 3],
    ])
}

#[inline(always)]
fn write_bytes(mem: &mut [u8], offset: usize, bytes: &[u8]) {
    mem[offset..offset + bytes.len()].copy_from_slice(bytes);
}
