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

//! Exception and reset controller
//!
//! On exception entry the controller pushes the SR mode stack, records
//! ExcCode/BD in CAUSE and the restart address in EPC, then jumps to the
//! general vector selected by SR.BEV. Reset is handled separately and
//! always lands on 0xBFC00000.

use super::cop0::{ExceptionCause, COP0};
use super::CPU;

/// Exception vector table
///
/// | Vector  | BEV=0      | BEV=1      |
/// |---------|------------|------------|
/// | Reset   | 0xBFC00000 | 0xBFC00000 |
/// | UTLB    | 0x80000000 | 0xBFC00100 |
/// | Debug   | 0x80000040 | 0xBFC00140 |
/// | General | 0x80000080 | 0xBFC00180 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionVector {
    Reset,
    /// TLB miss (never raised, this CPU has no TLB)
    Utlb,
    /// Debug break (hardware breakpoints are not modeled)
    Debug,
    General,
}

impl ExceptionVector {
    /// Handler address for this vector
    ///
    /// # Arguments
    ///
    /// * `bev` - SR bit 22 (boot exception vectors)
    pub fn address(self, bev: bool) -> u32 {
        match (self, bev) {
            (ExceptionVector::Reset, _) => 0xBFC0_0000,
            (ExceptionVector::Utlb, false) => 0x8000_0000,
            (ExceptionVector::Utlb, true) => 0xBFC0_0100,
            (ExceptionVector::Debug, false) => 0x8000_0040,
            (ExceptionVector::Debug, true) => 0xBFC0_0140,
            (ExceptionVector::General, false) => 0x8000_0080,
            (ExceptionVector::General, true) => 0xBFC0_0180,
        }
    }
}

impl CPU {
    /// Reset CPU to initial state
    ///
    /// Clears the register file and both delay latches, sets PRID and SR to
    /// their power-on values and jumps to the reset vector.
    ///
    /// # Example
    /// ```
    /// use cw33300::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg(4, 1);
    /// cpu.reset();
    /// assert_eq!(cpu.reg(4), 0);
    /// assert_eq!(cpu.cop0().prid(), 0x00000002);
    /// ```
    pub fn reset(&mut self) {
        self.regs.reset();
        self.cop0.reset();
        self.in_delay_slot = false;
        self.current_instruction = 0;

        let vector = ExceptionVector::Reset.address(self.cop0.sr().boot_exception_vectors());
        self.regs.jump_to(vector);
    }

    /// Raise an exception for the executing instruction
    ///
    /// EPC receives the address of the faulting instruction, or of the branch
    /// before it (with CAUSE.BD set) when the fault happened in a delay slot.
    /// In that case the cancelled branch target is kept in TAR.
    pub fn exception(&mut self, cause: ExceptionCause) {
        let current_pc = self.regs.current_pc();
        let in_delay_slot = self.in_delay_slot;
        self.enter_exception(cause, current_pc, in_delay_slot);
    }

    /// Raise CoprocessorUnusable for coprocessor `n`, setting CAUSE.CE
    pub(super) fn coprocessor_unusable(&mut self, n: u8) {
        self.cop0.set_coprocessor_error(n);
        self.exception(ExceptionCause::CoprocessorUnusable);
    }

    /// Take an interrupt if one is pending, enabled and unmasked
    ///
    /// Runs between instructions. EPC is the next instruction to execute so
    /// the handler returns to it; if that instruction is a delay slot the
    /// branch is re-executed instead.
    ///
    /// # Returns
    ///
    /// true if an interrupt exception was taken
    pub fn check_interrupts(&mut self) -> bool {
        if !self.cop0.interrupt_active() {
            return false;
        }

        let next_pc = self.regs.pc();
        let in_delay_slot = self.regs.is_branch_pending();
        self.enter_exception(ExceptionCause::Interrupt, next_pc, in_delay_slot);
        true
    }

    /// Drive the hardware interrupt line (CAUSE.IP2)
    pub fn set_interrupt_line(&mut self, active: bool) {
        self.cop0.set_hardware_interrupt(active);
    }

    fn enter_exception(&mut self, cause: ExceptionCause, pc: u32, in_delay_slot: bool) {
        let bev = self.cop0.sr().boot_exception_vectors();

        let epc = if in_delay_slot {
            if let Some(target) = self.regs.cancel_delayed_jump() {
                self.cop0.set_tar(target);
            }
            pc.wrapping_sub(4)
        } else {
            pc
        };

        self.cop0.enter_exception(cause, epc, in_delay_slot);

        let handler = ExceptionVector::General.address(bev);

        match cause {
            ExceptionCause::Interrupt | ExceptionCause::Syscall => log::debug!(
                "EXCEPTION: cause={:?}, EPC=0x{:08X}, handler=0x{:08X}, in_delay={}",
                cause,
                epc,
                handler,
                in_delay_slot
            ),
            _ => log::warn!(
                "EXCEPTION: cause={:?}, EPC=0x{:08X}, handler=0x{:08X}, in_delay={}, instruction=0x{:08X}, SR=0x{:08X}",
                cause,
                epc,
                handler,
                in_delay_slot,
                self.current_instruction,
                self.cop0.read(COP0::SR)
            ),
        }

        self.regs.jump_to(handler);
    }
}
