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

//! I/O device trait for memory-mapped peripherals
//!
//! Every register block behind the I/O window (`0x1F801000-0x1F802FFF`)
//! implements [`IODevice`]. The bus finds the owning device with
//! [`IODevice::contains`] and passes a device-relative offset.
//!
//! # Example
//!
//! ```
//! use cw33300::core::memory::IODevice;
//! use cw33300::core::error::Result;
//!
//! struct Latch {
//!     value: u32,
//! }
//!
//! impl IODevice for Latch {
//!     fn address_range(&self) -> (u32, u32) {
//!         (0x1F801F00, 0x1F801F03)
//!     }
//!
//!     fn read_register(&self, _offset: u32) -> Result<u32> {
//!         Ok(self.value)
//!     }
//!
//!     fn write_register(&mut self, _offset: u32, value: u32) -> Result<()> {
//!         self.value = value;
//!         Ok(())
//!     }
//! }
//!
//! let mut latch = Latch { value: 0 };
//! latch.write_register16(0x2, 0xBEEF).unwrap();
//! assert_eq!(latch.read_register(0).unwrap(), 0xBEEF_0000);
//! ```

use crate::core::error::Result;

/// Trait for memory-mapped I/O devices
///
/// Devices implement the 32-bit accessors. The 8-bit and 16-bit defaults
/// read the containing word and, for writes, do a read-modify-write of the
/// addressed lane. Devices whose registers have side effects on narrow
/// writes override them.
pub trait IODevice {
    /// Physical address range this device responds to, `(start, end)` inclusive
    fn address_range(&self) -> (u32, u32);

    /// Check if this device contains the given physical address
    fn contains(&self, addr: u32) -> bool {
        let (start, end) = self.address_range();
        addr >= start && addr <= end
    }

    /// Read a 32-bit register at `offset` from the start of the range
    fn read_register(&self, offset: u32) -> Result<u32>;

    /// Write a 32-bit register at `offset` from the start of the range
    fn write_register(&mut self, offset: u32, value: u32) -> Result<()>;

    fn read_register16(&self, offset: u32) -> Result<u16> {
        let value = self.read_register(offset & !0x03)?;
        let shift = (offset & 0x02) * 8;
        Ok(((value >> shift) & 0xFFFF) as u16)
    }

    fn write_register16(&mut self, offset: u32, value: u16) -> Result<()> {
        let aligned = offset & !0x03;
        let shift = (offset & 0x02) * 8;
        let mask = !(0xFFFFu32 << shift);
        let current = self.read_register(aligned)?;
        self.write_register(aligned, (current & mask) | ((value as u32) << shift))
    }

    fn read_register8(&self, offset: u32) -> Result<u8> {
        let value = self.read_register(offset & !0x03)?;
        let shift = (offset & 0x03) * 8;
        Ok(((value >> shift) & 0xFF) as u8)
    }

    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
        let aligned = offset & !0x03;
        let shift = (offset & 0x03) * 8;
        let mask = !(0xFFu32 << shift);
        let current = self.read_register(aligned)?;
        self.write_register(aligned, (current & mask) | ((value as u32) << shift))
    }

    /// Device name for logging
    fn name(&self) -> &str {
        "Unknown Device"
    }
}
