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

//! GPU register stub
//!
//! Only the two GPU ports are modeled:
//!
//! - **0x1F801810**: write GP0 (drawing commands), read GPUREAD
//! - **0x1F801814**: write GP1 (display control), read GPUSTAT
//!
//! GP0 words are counted and dropped. A few GP1 commands update GPUSTAT so
//! that status polling by the BIOS sees consistent values. GPUSTAT always
//! reports the GPU as ready for commands, VRAM reads and DMA blocks.

use crate::core::error::Result;
use crate::core::memory::IODevice;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// GPU port registers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct GPU {
    gpuread: u32,
    status: u32,
    gp0_count: u64,
    last_gp0: u32,
    last_gp1: u32,
}

impl GPU {
    /// Physical address of GP0 / GPUREAD
    pub const GP0: u32 = 0x1F80_1810;
    /// Physical address of GP1 / GPUSTAT
    pub const GP1: u32 = 0x1F80_1814;

    /// GPUSTAT after GP1(00h)
    const STATUS_RESET: u32 = 0x1480_2000;

    /// Bits 26-28: ready to receive command, send VRAM, receive DMA block
    const STATUS_READY: u32 = 0x1C00_0000;

    const STATUS_DISPLAY_DISABLED: u32 = 1 << 23;
    const STATUS_DMA_DIRECTION_SHIFT: u32 = 29;

    /// Create a GPU in its reset state
    ///
    /// ```
    /// use cw33300::core::gpu::GPU;
    ///
    /// let gpu = GPU::new();
    /// assert_eq!(gpu.status(), 0x1C802000);
    /// ```
    pub fn new() -> Self {
        Self {
            gpuread: 0,
            status: Self::STATUS_RESET | Self::STATUS_READY,
            gp0_count: 0,
            last_gp0: 0,
            last_gp1: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// GPUSTAT
    pub fn status(&self) -> u32 {
        self.status
    }

    /// GPUREAD (always the last latched value; VRAM is not modeled)
    pub fn read_gpuread(&self) -> u32 {
        self.gpuread
    }

    pub fn write_gp0(&mut self, value: u32) {
        log::trace!("GP0 0x{:08X} (command 0x{:02X})", value, value >> 24);
        self.gp0_count += 1;
        self.last_gp0 = value;
    }

    pub fn write_gp1(&mut self, value: u32) {
        let command = value >> 24;
        log::trace!("GP1 0x{:08X}", value);
        self.last_gp1 = value;

        match command {
            0x00 => {
                log::debug!("GPU reset");
                self.status = Self::STATUS_RESET | Self::STATUS_READY;
            }
            0x03 => {
                if value & 1 != 0 {
                    self.status |= Self::STATUS_DISPLAY_DISABLED;
                } else {
                    self.status &= !Self::STATUS_DISPLAY_DISABLED;
                }
            }
            0x04 => {
                self.status = (self.status & !(0x3 << Self::STATUS_DMA_DIRECTION_SHIFT))
                    | ((value & 0x3) << Self::STATUS_DMA_DIRECTION_SHIFT);
            }
            _ => {}
        }
    }

    /// Number of GP0 words received
    pub fn gp0_count(&self) -> u64 {
        self.gp0_count
    }

    pub fn last_gp0(&self) -> u32 {
        self.last_gp0
    }

    pub fn last_gp1(&self) -> u32 {
        self.last_gp1
    }
}

impl Default for GPU {
    fn default() -> Self {
        Self::new()
    }
}

impl IODevice for GPU {
    fn address_range(&self) -> (u32, u32) {
        (Self::GP0, Self::GP1 + 3)
    }

    fn read_register(&self, offset: u32) -> Result<u32> {
        Ok(match offset {
            0x0 => self.read_gpuread(),
            0x4 => self.status(),
            _ => 0xFFFF_FFFF,
        })
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        match offset {
            0x0 => self.write_gp0(value),
            0x4 => self.write_gp1(value),
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "GPU"
    }
}
