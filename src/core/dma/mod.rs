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

//! DMA (Direct Memory Access) register block
//!
//! The channel registers are stored and read back so the BIOS can program
//! them, but no transfer engine is attached: setting a channel's start bit
//! is logged and nothing moves.
//!
//! # DMA Channels
//!
//! | Channel | Device      | Base Address |
//! |---------|-------------|--------------|
//! | 0       | MDEC In     | 0x1F801080   |
//! | 1       | MDEC Out    | 0x1F801090   |
//! | 2       | GPU         | 0x1F8010A0   |
//! | 3       | CD-ROM      | 0x1F8010B0   |
//! | 4       | SPU         | 0x1F8010C0   |
//! | 5       | PIO         | 0x1F8010D0   |
//! | 6       | OTC         | 0x1F8010E0   |
//!
//! Each channel has MADR (+0x00), BCR (+0x04) and CHCR (+0x08).
//!
//! # Global Registers
//!
//! - **DPCR** (0x1F8010F0): channel priorities and enables, resets to 0x07654321
//! - **DICR** (0x1F8010F4): interrupt enables and flags
//!
//! # References
//!
//! - [PSX-SPX: DMA Controller](http://problemkaputt.de/psx-spx.htm#dmacontroller)

use crate::core::error::Result;
use crate::core::memory::IODevice;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// DMA register block with 7 channels
///
/// # Examples
///
/// ```
/// use cw33300::core::dma::DMA;
///
/// let dma = DMA::new();
/// assert_eq!(dma.read_control(), 0x07654321);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct DMA {
    channels: [DMAChannel; 7],

    /// DPCR (0x1F8010F0)
    control: u32,

    /// DICR (0x1F8010F4)
    interrupt: u32,
}

/// Single DMA channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct DMAChannel {
    /// MADR, 24-bit RAM address
    base_address: u32,

    /// BCR
    ///
    /// - Bits 0-15: Block size (words)
    /// - Bits 16-31: Block count
    block_control: u32,

    /// CHCR
    ///
    /// - Bit 0: Direction (0=to RAM, 1=from RAM)
    /// - Bit 1: Address step (0=forward, 1=backward)
    /// - Bits 9-10: Sync mode (0=immediate, 1=block, 2=linked-list)
    /// - Bit 24: Start/busy flag
    /// - Bit 28: Manual trigger
    channel_control: u32,
}

impl DMAChannel {
    pub fn madr(&self) -> u32 {
        self.base_address
    }

    pub fn bcr(&self) -> u32 {
        self.block_control
    }

    pub fn chcr(&self) -> u32 {
        self.channel_control
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        (self.channel_control & 0x0100_0000) != 0
    }

    #[inline(always)]
    pub fn direction(&self) -> u32 {
        self.channel_control & 1
    }

    #[inline(always)]
    pub fn sync_mode(&self) -> u32 {
        (self.channel_control >> 9) & 3
    }

    #[inline(always)]
    pub fn trigger(&self) -> bool {
        (self.channel_control & 0x1000_0000) != 0
    }

    fn write(&mut self, register: u32, value: u32) {
        match register {
            0x0 => self.base_address = value & 0x00FF_FFFF,
            // Linked-list mode has no block count
            0x4 => {
                self.block_control = if self.sync_mode() == 2 { 0 } else { value };
            }
            0x8 => self.channel_control = value,
            _ => {}
        }
    }

    fn read(&self, register: u32) -> u32 {
        match register {
            0x0 => self.base_address,
            0x4 => self.block_control,
            0x8 => self.channel_control,
            _ => 0,
        }
    }
}

impl DMA {
    /// First register of the block (channel 0 MADR)
    pub const BASE: u32 = 0x1F80_1080;
    /// Last byte of the block
    pub const END: u32 = 0x1F80_10FF;

    const DPCR_RESET: u32 = 0x0765_4321;

    /// DICR bits 0-5 and 15-23 are read/write
    const DICR_RW_MASK: u32 = 0x00FF_803F;
    /// DICR bits 24-30 are interrupt flags, cleared by writing 1
    const DICR_FLAGS: u32 = 0x7F00_0000;

    pub fn new() -> Self {
        Self {
            channels: [DMAChannel::default(); 7],
            control: Self::DPCR_RESET,
            interrupt: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Channel `index` (0-6)
    ///
    /// # Panics
    ///
    /// Panics if `index` is 7 or more.
    pub fn channel(&self, index: usize) -> &DMAChannel {
        &self.channels[index]
    }

    pub fn read_control(&self) -> u32 {
        self.control
    }

    pub fn write_control(&mut self, value: u32) {
        self.control = value;
    }

    /// DICR with the computed master flag in bit 31
    ///
    /// Bit 31 is set when bit 15 (force) is set, or when bit 23 (master
    /// enable) is set and some channel has both its enable (16-22) and its
    /// flag (24-30) set.
    pub fn read_interrupt(&self) -> u32 {
        let force = self.interrupt & (1 << 15) != 0;
        let master_enable = self.interrupt & (1 << 23) != 0;
        let enabled = (self.interrupt >> 16) & 0x7F;
        let flags = (self.interrupt >> 24) & 0x7F;

        let master = force || (master_enable && (enabled & flags) != 0);
        self.interrupt | ((master as u32) << 31)
    }

    pub fn write_interrupt(&mut self, value: u32) {
        let flags = (self.interrupt & Self::DICR_FLAGS) & !(value & Self::DICR_FLAGS);
        self.interrupt = (value & Self::DICR_RW_MASK) | flags;
    }
}

impl Default for DMA {
    fn default() -> Self {
        Self::new()
    }
}

impl IODevice for DMA {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE, Self::END)
    }

    fn read_register(&self, offset: u32) -> Result<u32> {
        let value = match offset {
            0x70 => self.read_control(),
            0x74 => self.read_interrupt(),
            0x00..=0x6F => self.channels[(offset >> 4) as usize].read(offset & 0xC),
            _ => 0,
        };
        Ok(value)
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        match offset {
            0x70 => self.write_control(value),
            0x74 => self.write_interrupt(value),
            0x00..=0x6F => {
                let index = (offset >> 4) as usize;
                let channel = &mut self.channels[index];
                channel.write(offset & 0xC, value);

                if offset & 0xC == 0x8 && channel.is_active() {
                    log::debug!(
                        "DMA{} start requested: madr=0x{:06X} bcr=0x{:08X} chcr=0x{:08X} (no transfer engine)",
                        index,
                        channel.madr(),
                        channel.bcr(),
                        channel.chcr()
                    );
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "DMA"
    }
}
