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

use super::super::{ExceptionCause, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    // === Store Instructions ===
    //
    // Stores go straight to the bus. With SR.IsC set the bus drops writes to
    // RAM and BIOS.

    /// SW: Store Word (32-bit)
    ///
    /// Format: sw rt, offset(rs)
    /// Operation: memory[rs + sign_extend(offset)] = rt
    ///
    /// # Returns
    ///
    /// Ok(()) on success, AddressErrorStore is raised on misalignment
    pub(crate) fn op_sw(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        if !self.check_alignment(addr, 4, ExceptionCause::AddressErrorStore) {
            return Ok(());
        }

        bus.write32(addr, self.reg(rt))?;
        Ok(())
    }

    /// SH: Store Halfword (low 16 bits of rt)
    ///
    /// Format: sh rt, offset(rs)
    pub(crate) fn op_sh(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        if !self.check_alignment(addr, 2, ExceptionCause::AddressErrorStore) {
            return Ok(());
        }

        bus.write16(addr, self.reg(rt) as u16)?;
        Ok(())
    }

    /// SB: Store Byte (low 8 bits of rt)
    ///
    /// Format: sb rt, offset(rs)
    pub(crate) fn op_sb(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        bus.write8(addr, self.reg(rt) as u8)?;
        Ok(())
    }

    /// SWL: Store Word Left
    ///
    /// Stores the high-order bytes of rt into the word containing `addr`.
    ///
    /// Format: swl rt, offset(rs)
    ///
    /// | addr & 3 | memory word                         |
    /// |----------|-------------------------------------|
    /// | 0        | (mem & 0xFFFFFF00) \| (rt >> 24)    |
    /// | 1        | (mem & 0xFFFF0000) \| (rt >> 16)    |
    /// | 2        | (mem & 0xFF000000) \| (rt >> 8)     |
    /// | 3        | rt                                  |
    pub(crate) fn op_swl(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        let aligned = addr & !0x3;
        let value = self.reg(rt);
        let mem = bus.read32(aligned)?;

        let merged = match addr & 0x3 {
            0 => (mem & 0xFFFF_FF00) | (value >> 24),
            1 => (mem & 0xFFFF_0000) | (value >> 16),
            2 => (mem & 0xFF00_0000) | (value >> 8),
            _ => value,
        };

        bus.write32(aligned, merged)?;
        Ok(())
    }

    /// SWR: Store Word Right
    ///
    /// Format: swr rt, offset(rs)
    ///
    /// | addr & 3 | memory word                         |
    /// |----------|-------------------------------------|
    /// | 0        | rt                                  |
    /// | 1        | (mem & 0x000000FF) \| (rt << 8)     |
    /// | 2        | (mem & 0x0000FFFF) \| (rt << 16)    |
    /// | 3        | (mem & 0x00FFFFFF) \| (rt << 24)    |
    pub(crate) fn op_swr(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        let aligned = addr & !0x3;
        let value = self.reg(rt);
        let mem = bus.read32(aligned)?;

        let merged = match addr & 0x3 {
            0 => value,
            1 => (mem & 0x0000_00FF) | (value << 8),
            2 => (mem & 0x0000_FFFF) | (value << 16),
            _ => (mem & 0x00FF_FFFF) | (value << 24),
        };

        bus.write32(aligned, merged)?;
        Ok(())
    }
}
