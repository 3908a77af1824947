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

//! Interrupt controller
//!
//! Collects interrupt requests from the peripherals and drives the single
//! hardware interrupt line of the CPU (CAUSE.IP2).
//!
//! ## Registers
//!
//! - **I_STAT** (0x1F801070): pending requests. Writing acknowledges: each
//!   bit written as 0 is cleared, bits written as 1 are kept.
//! - **I_MASK** (0x1F801074): 1 = request reaches the CPU.
//!
//! ## Interrupt Sources (Bit Positions)
//!
//! ```text
//! Bit  | Source
//! -----|-----------
//! 0    | VBLANK
//! 1    | GPU
//! 2    | CDROM
//! 3    | DMA
//! 4-6  | TIMER0-2
//! 7    | CONTROLLER / memory card
//! 8    | SIO
//! 9    | SPU
//! 10   | LIGHTPEN
//! ```

use crate::core::error::Result;
use crate::core::memory::IODevice;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Interrupt request bits
pub mod interrupts {
    pub const VBLANK: u16 = 1 << 0;
    pub const GPU: u16 = 1 << 1;
    pub const CDROM: u16 = 1 << 2;
    pub const DMA: u16 = 1 << 3;
    pub const TIMER0: u16 = 1 << 4;
    pub const TIMER1: u16 = 1 << 5;
    pub const TIMER2: u16 = 1 << 6;
    pub const CONTROLLER: u16 = 1 << 7;
    pub const SIO: u16 = 1 << 8;
    pub const SPU: u16 = 1 << 9;
    pub const LIGHTPEN: u16 = 1 << 10;

    /// Bits that exist in I_STAT / I_MASK
    pub const ALL: u16 = 0x07FF;
}

/// I_STAT / I_MASK pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct InterruptController {
    status: u16,
    mask: u16,
}

impl InterruptController {
    /// Physical address of I_STAT
    pub const I_STAT: u32 = 0x1F80_1070;
    /// Physical address of I_MASK
    pub const I_MASK: u32 = 0x1F80_1074;

    pub fn new() -> Self {
        Self::default()
    }

    /// Raise one or more interrupt requests
    pub fn request(&mut self, interrupt: u16) {
        self.status |= interrupt & interrupts::ALL;
        log::trace!(
            "IRQ requested: 0x{:04X}, status=0x{:04X}",
            interrupt,
            self.status
        );
    }

    /// Whether any unmasked request is pending (the CPU line level)
    pub fn is_pending(&self) -> bool {
        (self.status & self.mask) != 0
    }

    pub fn read_status(&self) -> u32 {
        self.status as u32
    }

    /// I_STAT write: AND-acknowledge
    pub fn write_status(&mut self, value: u32) {
        self.status &= value as u16;
        log::trace!("IRQ acknowledged, status=0x{:04X}", self.status);
    }

    pub fn read_mask(&self) -> u32 {
        self.mask as u32
    }

    pub fn write_mask(&mut self, value: u32) {
        self.mask = value as u16 & interrupts::ALL;
        log::debug!("IRQ mask set: 0x{:04X}", self.mask);
    }
}

impl IODevice for InterruptController {
    fn address_range(&self) -> (u32, u32) {
        (Self::I_STAT, Self::I_MASK + 3)
    }

    fn read_register(&self, offset: u32) -> Result<u32> {
        Ok(match offset {
            0x0 => self.read_status(),
            0x4 => self.read_mask(),
            _ => 0,
        })
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        match offset {
            0x0 => self.write_status(value),
            0x4 => self.write_mask(value),
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Interrupt Controller"
    }
}
