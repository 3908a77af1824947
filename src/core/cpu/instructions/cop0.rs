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

//! Coprocessor 0 (System Control) instructions
//!
//! Register moves go through [`COP0::read`](super::super::COP0::read) and
//! [`COP0::write`](super::super::COP0::write), never the raw fields.

use super::super::decode::ImmediateOp;
use super::super::cop0::COP0;
use super::super::{ExceptionCause, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

/// COP0 register number (instruction bits 11-15) from the immediate field
#[inline(always)]
fn cop0_rd(imm: u16) -> u8 {
    ((imm >> 11) & 0x1F) as u8
}

impl CPU {
    /// MFC0: Move From Coprocessor 0
    ///
    /// The value arrives through the load delay, like a memory load.
    ///
    /// Format: mfc0 rt, rd
    /// Operation: rt = COP0[rd]
    pub(in crate::core::cpu) fn op_mfc0(&mut self, rt: u8, imm: u16) -> Result<()> {
        let value = self.cop0.read(cop0_rd(imm));
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// MTC0: Move To Coprocessor 0
    ///
    /// Writing SR also updates the bus cache isolation flag (SR bit 16).
    ///
    /// Format: mtc0 rt, rd
    /// Operation: COP0[rd] = rt
    pub(in crate::core::cpu) fn op_mtc0(&mut self, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let rd = cop0_rd(imm);
        let value = self.reg(rt);

        self.cop0.write(rd, value);

        if rd == COP0::SR {
            bus.set_cache_isolated(self.cop0.sr().cache_isolated());
        }
        Ok(())
    }

    /// CFC0/CTC0/BC0F/BC0T/COP0 command
    ///
    /// COP0 on this CPU has no control registers, no condition line and no
    /// TLB, so these execute as no-ops.
    pub(in crate::core::cpu) fn op_cop0_nop(&mut self, op: ImmediateOp) -> Result<()> {
        log::trace!(
            "{:?} ignored at PC=0x{:08X} (0x{:08X})",
            op,
            self.regs.current_pc(),
            self.current_instruction
        );
        Ok(())
    }

    /// RFE: Return From Exception
    ///
    /// Pops the SR interrupt/kernel stack: bits 0-3 receive bits 2-5, bits
    /// 4-5 and everything above are unchanged. The return itself is the `jr`
    /// whose delay slot holds the RFE.
    pub(in crate::core::cpu) fn op_rfe(&mut self) -> Result<()> {
        self.cop0.return_from_exception();
        Ok(())
    }

    /// LWC0: Load Word to Coprocessor 0
    ///
    /// Format: lwc0 rt, offset(rs)
    /// Operation: COP0[rt] = memory[rs + sign_extend(offset)]
    pub(in crate::core::cpu) fn op_lwc0(
        &mut self,
        rs: u8,
        rt: u8,
        imm: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        if !self.check_alignment(addr, 4, ExceptionCause::AddressErrorLoad) {
            return Ok(());
        }

        let value = bus.read32(addr)?;
        self.cop0.write(rt, value);

        if rt == COP0::SR {
            bus.set_cache_isolated(self.cop0.sr().cache_isolated());
        }
        Ok(())
    }

    /// SWC0: Store Word from Coprocessor 0
    ///
    /// Format: swc0 rt, offset(rs)
    /// Operation: memory[rs + sign_extend(offset)] = COP0[rt]
    pub(in crate::core::cpu) fn op_swc0(
        &mut self,
        rs: u8,
        rt: u8,
        imm: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        if !self.check_alignment(addr, 4, ExceptionCause::AddressErrorStore) {
            return Ok(());
        }

        bus.write32(addr, self.cop0.read(rt))?;
        Ok(())
    }
}
