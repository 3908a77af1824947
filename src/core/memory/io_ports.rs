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

//! I/O port dispatch
//!
//! Accesses inside the I/O window are routed by physical address:
//!
//! - 0x1F801000-0x1F801023: Memory Control 1 (stored, no effect)
//! - 0x1F801060: RAM_SIZE (stored, no effect)
//! - 0x1F801070-0x1F801077: interrupt controller
//! - 0x1F801080-0x1F8010FF: DMA registers
//! - 0x1F801810-0x1F801817: GPU
//!
//! Other registers (timers, CD-ROM, SPU, pads) are not modeled: reads return
//! 0 and writes are dropped.

use super::{Bus, IODevice};
use crate::core::error::Result;

impl Bus {
    const MEM_CONTROL_START: u32 = 0x1F80_1000;
    const MEM_CONTROL_END: u32 = 0x1F80_1023;
    const RAM_SIZE_REG: u32 = 0x1F80_1060;

    pub(super) fn read_io_port8(&self, paddr: u32) -> Result<u8> {
        Ok(self.read_io(paddr, 1)? as u8)
    }

    pub(super) fn read_io_port16(&self, paddr: u32) -> Result<u16> {
        Ok(self.read_io(paddr, 2)? as u16)
    }

    pub(super) fn read_io_port32(&self, paddr: u32) -> Result<u32> {
        self.read_io(paddr, 4)
    }

    pub(super) fn write_io_port8(&mut self, paddr: u32, value: u8) -> Result<()> {
        self.write_io(paddr, value as u32, 1)
    }

    pub(super) fn write_io_port16(&mut self, paddr: u32, value: u16) -> Result<()> {
        self.write_io(paddr, value as u32, 2)
    }

    pub(super) fn write_io_port32(&mut self, paddr: u32, value: u32) -> Result<()> {
        self.write_io(paddr, value, 4)
    }

    fn read_io(&self, paddr: u32, size: u8) -> Result<u32> {
        if let Some(word) = self.read_control_register(paddr & !0x3) {
            return Ok(extract_lane(word, paddr, size));
        }

        let value = match self.io_device(paddr) {
            Some(device) => {
                let offset = paddr - device.address_range().0;
                match size {
                    1 => device.read_register8(offset)? as u32,
                    2 => device.read_register16(offset)? as u32,
                    _ => device.read_register(offset)?,
                }
            }
            None => {
                log::trace!("Unhandled I/O read{} at 0x{:08X}", size as u32 * 8, paddr);
                0
            }
        };

        log::trace!("I/O read{} 0x{:08X} -> 0x{:08X}", size as u32 * 8, paddr, value);
        Ok(value)
    }

    fn write_io(&mut self, paddr: u32, value: u32, size: u8) -> Result<()> {
        log::trace!("I/O write{} 0x{:08X} = 0x{:08X}", size as u32 * 8, paddr, value);

        if let Some(register) = self.control_register_mut(paddr & !0x3) {
            *register = merge_lane(*register, paddr, value, size);
            return Ok(());
        }

        match self.io_device_mut(paddr) {
            Some(device) => {
                let offset = paddr - device.address_range().0;
                match size {
                    1 => device.write_register8(offset, value as u8),
                    2 => device.write_register16(offset, value as u16),
                    _ => device.write_register(offset, value),
                }
            }
            None => {
                log::trace!(
                    "Unhandled I/O write{} at 0x{:08X} = 0x{:08X}",
                    size as u32 * 8,
                    paddr,
                    value
                );
                Ok(())
            }
        }
    }

    fn read_control_register(&self, paddr: u32) -> Option<u32> {
        match paddr {
            Self::MEM_CONTROL_START..=Self::MEM_CONTROL_END => {
                Some(self.mem_control[((paddr - Self::MEM_CONTROL_START) / 4) as usize])
            }
            Self::RAM_SIZE_REG => Some(self.ram_size),
            _ => None,
        }
    }

    fn control_register_mut(&mut self, paddr: u32) -> Option<&mut u32> {
        match paddr {
            Self::MEM_CONTROL_START..=Self::MEM_CONTROL_END => {
                Some(&mut self.mem_control[((paddr - Self::MEM_CONTROL_START) / 4) as usize])
            }
            Self::RAM_SIZE_REG => Some(&mut self.ram_size),
            _ => None,
        }
    }

    fn io_device(&self, paddr: u32) -> Option<&dyn IODevice> {
        let devices: [&dyn IODevice; 3] = [&self.interrupt, &self.dma, &self.gpu];
        devices.into_iter().find(|device| device.contains(paddr))
    }

    fn io_device_mut(&mut self, paddr: u32) -> Option<&mut dyn IODevice> {
        if self.interrupt.contains(paddr) {
            Some(&mut self.interrupt)
        } else if self.dma.contains(paddr) {
            Some(&mut self.dma)
        } else if self.gpu.contains(paddr) {
            Some(&mut self.gpu)
        } else {
            None
        }
    }
}

fn lane_mask(size: u8) -> u32 {
    match size {
        1 => 0xFF,
        2 => 0xFFFF,
        _ => 0xFFFF_FFFF,
    }
}

fn extract_lane(word: u32, paddr: u32, size: u8) -> u32 {
    (word >> ((paddr & 0x3) * 8)) & lane_mask(size)
}

fn merge_lane(word: u32, paddr: u32, value: u32, size: u8) -> u32 {
    let shift = (paddr & 0x3) * 8;
    let mask = lane_mask(size) << shift;
    (word & !mask) | ((value << shift) & mask)
}
