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

//! Coprocessor 0 (System Control)
//!
//! COP0 owns the exception, interrupt and privilege state of the CPU.
//! Instruction code reaches it only through [`COP0::read`] and
//! [`COP0::write`], which apply the per-index masking rules. The exception
//! controller uses the crate-internal helpers further down.
//!
//! # Register map
//!
//! | Index | Name     | Access from MTC0          |
//! |-------|----------|---------------------------|
//! | 3     | BPC      | R/W                       |
//! | 5     | BDA      | R/W                       |
//! | 6     | TAR      | read only                 |
//! | 7     | DCIC     | R/W                       |
//! | 8     | BadVaddr | read only                 |
//! | 9     | BDAM     | R/W                       |
//! | 11    | BPCM     | R/W                       |
//! | 12    | SR       | R/W                       |
//! | 13    | CAUSE    | bits 8-9 writable         |
//! | 14    | EPC      | read only                 |
//! | 15    | PRID     | read only                 |

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Status register value after reset (CU0, BEV and the reserved bit 28 set)
pub const SR_RESET_VALUE: u32 = 0x1090_0000;

/// Processor ID of the CW33300
pub const PRID_VALUE: u32 = 0x0000_0002;

/// Status Register view
///
/// | Bits  | Field | Meaning                                        |
/// |-------|-------|------------------------------------------------|
/// | 0     | IEc   | interrupt enable (current)                     |
/// | 1     | KUc   | kernel/user mode (current)                     |
/// | 2-3   | IEp/KUp | previous                                     |
/// | 4-5   | IEo/KUo | old                                          |
/// | 8-15  | IM    | interrupt mask                                 |
/// | 16    | IsC   | isolate cache                                  |
/// | 22    | BEV   | boot exception vectors                         |
/// | 28-31 | CU0-3 | coprocessor usable                             |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRegister(pub u32);

impl StatusRegister {
    const IEC: u32 = 1 << 0;
    const MODE_MASK: u32 = 0x3F;
    const IM_SHIFT: u32 = 8;
    const ISC: u32 = 1 << 16;
    const BEV: u32 = 1 << 22;
    const CU_SHIFT: u32 = 28;

    /// Current interrupt enable
    #[inline]
    pub fn interrupt_enabled(self) -> bool {
        self.0 & Self::IEC != 0
    }

    /// Interrupt enable / kernel mode stack (bits 0-5)
    #[inline]
    pub fn mode_stack(self) -> u32 {
        self.0 & Self::MODE_MASK
    }

    /// Interrupt mask (bits 8-15)
    #[inline]
    pub fn interrupt_mask(self) -> u32 {
        (self.0 >> Self::IM_SHIFT) & 0xFF
    }

    /// Isolate cache bit
    #[inline]
    pub fn cache_isolated(self) -> bool {
        self.0 & Self::ISC != 0
    }

    /// Boot exception vector selection
    #[inline]
    pub fn boot_exception_vectors(self) -> bool {
        self.0 & Self::BEV != 0
    }

    /// Coprocessor usable bit for coprocessor `n` (0-3)
    #[inline]
    pub fn coprocessor_usable(self, n: u8) -> bool {
        self.0 & (1 << (Self::CU_SHIFT + (n as u32 & 0x3))) != 0
    }

    /// Push a new level onto the mode stack (exception entry)
    ///
    /// current -> previous -> old; the new current level is kernel mode with
    /// interrupts disabled.
    #[inline]
    pub fn pushed(self) -> Self {
        let mode = self.mode_stack();
        Self((self.0 & !Self::MODE_MASK) | ((mode << 2) & Self::MODE_MASK))
    }

    /// Pop one level off the mode stack (RFE)
    ///
    /// Only the low 4 bits change; the old level is kept.
    #[inline]
    pub fn popped(self) -> Self {
        let mode = self.mode_stack();
        Self((self.0 & !0x0F) | (mode >> 2))
    }
}

/// Cause Register view
///
/// | Bits  | Field   | Meaning                                   |
/// |-------|---------|-------------------------------------------|
/// | 2-6   | ExcCode | exception code                            |
/// | 8-9   | IP0-1   | software interrupt pending (writable)     |
/// | 10-15 | IP2-7   | hardware interrupt pending                |
/// | 28-29 | CE      | coprocessor number of a CpU exception     |
/// | 31    | BD      | exception taken in a branch delay slot    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CauseRegister(pub u32);

impl CauseRegister {
    const EXCODE_SHIFT: u32 = 2;
    const EXCODE_MASK: u32 = 0x1F << Self::EXCODE_SHIFT;
    const IP_SHIFT: u32 = 8;
    /// Software interrupt bits, the only ones MTC0 may change
    pub const SOFTWARE_MASK: u32 = 0x0000_0300;
    const HARDWARE_IRQ: u32 = 1 << 10;
    const CE_SHIFT: u32 = 28;
    const CE_MASK: u32 = 0x3 << Self::CE_SHIFT;
    const BD: u32 = 1 << 31;

    /// Exception code (bits 2-6)
    #[inline]
    pub fn exception_code(self) -> u32 {
        (self.0 & Self::EXCODE_MASK) >> Self::EXCODE_SHIFT
    }

    /// Pending interrupt bits (bits 8-15)
    #[inline]
    pub fn interrupt_pending(self) -> u32 {
        (self.0 >> Self::IP_SHIFT) & 0xFF
    }

    /// Coprocessor error field (bits 28-29)
    #[inline]
    pub fn coprocessor_error(self) -> u8 {
        ((self.0 & Self::CE_MASK) >> Self::CE_SHIFT) as u8
    }

    /// Branch delay flag
    #[inline]
    pub fn branch_delay(self) -> bool {
        self.0 & Self::BD != 0
    }

    #[inline]
    fn with_exception_code(self, code: u32) -> Self {
        Self((self.0 & !Self::EXCODE_MASK) | ((code << Self::EXCODE_SHIFT) & Self::EXCODE_MASK))
    }

    #[inline]
    fn with_branch_delay(self, bd: bool) -> Self {
        if bd {
            Self(self.0 | Self::BD)
        } else {
            Self(self.0 & !Self::BD)
        }
    }

    #[inline]
    fn with_coprocessor_error(self, n: u8) -> Self {
        Self((self.0 & !Self::CE_MASK) | (((n as u32) & 0x3) << Self::CE_SHIFT))
    }

    #[inline]
    fn with_hardware_interrupt(self, active: bool) -> Self {
        if active {
            Self(self.0 | Self::HARDWARE_IRQ)
        } else {
            Self(self.0 & !Self::HARDWARE_IRQ)
        }
    }
}

/// Coprocessor 0 register bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct COP0 {
    sr: u32,
    cause: u32,
    epc: u32,
    bad_vaddr: u32,
    tar: u32,
    prid: u32,

    /// Backing store for indices without dedicated semantics
    regs: [u32; 32],
}

impl COP0 {
    /// Breakpoint PC
    pub const BPC: u8 = 3;
    /// Breakpoint Data Address
    pub const BDA: u8 = 5;
    /// Target Address
    pub const TAR: u8 = 6;
    /// Breakpoint control
    pub const DCIC: u8 = 7;
    /// Bad Virtual Address
    pub const BADA: u8 = 8;
    /// Data Address Mask
    pub const BDAM: u8 = 9;
    /// PC Mask
    pub const BPCM: u8 = 11;
    /// Status Register
    pub const SR: u8 = 12;
    /// Cause Register
    pub const CAUSE: u8 = 13;
    /// Exception PC
    pub const EPC: u8 = 14;
    /// Processor ID
    pub const PRID: u8 = 15;

    /// Create a COP0 bank in its post-reset state
    pub fn new() -> Self {
        Self {
            sr: SR_RESET_VALUE,
            cause: 0,
            epc: 0,
            bad_vaddr: 0,
            tar: 0,
            prid: PRID_VALUE,
            regs: [0u32; 32],
        }
    }

    /// Reset COP0 registers to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a COP0 register by index (MFC0)
    pub fn read(&self, index: u8) -> u32 {
        match index & 0x1F {
            Self::TAR => self.tar,
            Self::BADA => self.bad_vaddr,
            Self::SR => self.sr,
            Self::CAUSE => self.cause,
            Self::EPC => self.epc,
            Self::PRID => self.prid,
            other => self.regs[other as usize],
        }
    }

    /// Write a COP0 register by index (MTC0)
    ///
    /// TAR, BadVaddr, EPC and PRID ignore the write. Only the software
    /// interrupt bits of CAUSE are writable.
    pub fn write(&mut self, index: u8, value: u32) {
        match index & 0x1F {
            Self::TAR | Self::BADA | Self::EPC | Self::PRID => {
                log::trace!("Ignored write to read-only COP0 r{}: 0x{:08X}", index, value);
            }
            Self::SR => self.sr = value,
            Self::CAUSE => {
                let mask = CauseRegister::SOFTWARE_MASK;
                self.cause = (self.cause & !mask) | (value & mask);
            }
            other => self.regs[other as usize] = value,
        }
    }

    /// Status register view
    #[inline]
    pub fn sr(&self) -> StatusRegister {
        StatusRegister(self.sr)
    }

    /// Cause register view
    #[inline]
    pub fn cause(&self) -> CauseRegister {
        CauseRegister(self.cause)
    }

    pub fn epc(&self) -> u32 {
        self.epc
    }

    pub fn bad_vaddr(&self) -> u32 {
        self.bad_vaddr
    }

    pub fn tar(&self) -> u32 {
        self.tar
    }

    pub fn prid(&self) -> u32 {
        self.prid
    }

    // Exception controller access

    pub(crate) fn set_bad_vaddr(&mut self, address: u32) {
        self.bad_vaddr = address;
    }

    pub(crate) fn set_tar(&mut self, target: u32) {
        self.tar = target;
    }

    pub(crate) fn set_coprocessor_error(&mut self, n: u8) {
        self.cause = self.cause().with_coprocessor_error(n).0;
    }

    /// Drive CAUSE.IP2, the line from the interrupt controller
    pub(crate) fn set_hardware_interrupt(&mut self, active: bool) {
        self.cause = self.cause().with_hardware_interrupt(active).0;
    }

    /// Record exception entry: push the mode stack, set ExcCode/BD and EPC
    pub(crate) fn enter_exception(&mut self, cause: ExceptionCause, epc: u32, branch_delay: bool) {
        self.sr = self.sr().pushed().0;
        self.cause = self
            .cause()
            .with_exception_code(cause as u32)
            .with_branch_delay(branch_delay)
            .0;
        self.epc = epc;
    }

    /// Pop the mode stack (RFE)
    pub(crate) fn return_from_exception(&mut self) {
        self.sr = self.sr().popped().0;
    }

    /// Pending and unmasked interrupt lines, if interrupts are enabled
    pub(crate) fn interrupt_active(&self) -> bool {
        let sr = self.sr();
        sr.interrupt_enabled() && (sr.interrupt_mask() & self.cause().interrupt_pending()) != 0
    }
}

impl Default for COP0 {
    fn default() -> Self {
        Self::new()
    }
}

/// Exception cause codes for MIPS R3000A
///
/// These correspond to the exception codes stored in the CAUSE register
/// when a CPU exception occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExceptionCause {
    /// Interrupt (external or software)
    Interrupt = 0,
    /// Address error on load or instruction fetch
    AddressErrorLoad = 4,
    /// Address error on store
    AddressErrorStore = 5,
    /// Syscall instruction executed
    Syscall = 8,
    /// Breakpoint instruction executed
    Breakpoint = 9,
    /// Reserved or illegal instruction
    ReservedInstruction = 10,
    /// Coprocessor unusable
    CoprocessorUnusable = 11,
    /// Arithmetic overflow
    Overflow = 12,
}
