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

//! CW33300 CPU core
//!
//! # Specifications
//! - Architecture: MIPS I (32-bit), R3000A-compatible
//! - Clock frequency: 33.8688 MHz
//! - No MMU/TLB; COP1 and COP3 absent, COP2 (GTE) not modeled here
//!
//! # Step order
//!
//! 1. Note whether a branch is latched (this instruction is a delay slot)
//! 2. Check PC alignment, fetch, record `current_pc`, advance PC by 4
//! 3. Decode and execute
//! 4. Commit the previous load, promote this one, force r0 to zero
//! 5. If this was a delay slot, move the latched target into PC

use crate::core::config::CpuConfig;
use crate::core::error::Result;
use crate::core::memory::Bus;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

// Module declarations
mod cop0;
mod decode;
mod disassembler;
mod exception;
mod instructions;
mod registers;
#[cfg(test)]
mod tests;
mod tracer;

// Re-exports
pub use cop0::{CauseRegister, ExceptionCause, StatusRegister, COP0, PRID_VALUE, SR_RESET_VALUE};
pub use decode::{decode, ImmediateOp, Instruction, JumpOp, RegisterOp};
pub use disassembler::Disassembler;
pub use exception::ExceptionVector;
pub use registers::{RegisterFile, REG_FP, REG_GP, REG_RA, REG_SP};
pub use tracer::CpuTracer;

/// Register names in ABI order, for dumps and the disassembler
pub const REGISTER_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra",
];

/// CPU (MIPS R3000A) emulation implementation
///
/// # Example
/// ```
/// use cw33300::core::cpu::CPU;
///
/// let mut cpu = CPU::new();
/// cpu.reset();
/// assert_eq!(cpu.reg(0), 0); // r0 is always 0
/// assert_eq!(cpu.pc(), 0xBFC00000);
/// ```
pub struct CPU {
    /// GPRs, PC, HI/LO and delay latches
    regs: RegisterFile,

    /// Coprocessor 0 (System Control Unit)
    cop0: COP0,

    /// Set while executing the instruction in a branch delay slot
    in_delay_slot: bool,

    /// Raw word of the executing instruction (for diagnostics)
    current_instruction: u32,

    cycles_per_instruction: u32,
    trap_reserved_instructions: bool,
}

/// Serializable snapshot of the CPU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct CpuState {
    pub registers: RegisterFile,
    pub cop0: COP0,
    pub current_instruction: u32,
}

impl CPU {
    /// Create a new CPU in its post-reset state
    ///
    /// - All general purpose registers: 0
    /// - PC: 0xBFC00000 (reset vector)
    /// - COP0 SR: 0x10900000
    /// - COP0 PRID: 0x00000002
    pub fn new() -> Self {
        Self::with_config(&CpuConfig::default())
    }

    /// Create a CPU using the given core settings
    pub fn with_config(config: &CpuConfig) -> Self {
        let mut cpu = Self {
            regs: RegisterFile::new(),
            cop0: COP0::new(),
            in_delay_slot: false,
            current_instruction: 0,
            cycles_per_instruction: config.cycles_per_instruction.max(1),
            trap_reserved_instructions: config.trap_reserved_instructions,
        };
        cpu.reset();
        cpu
    }

    /// Read from general purpose register
    ///
    /// r0 always returns 0.
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        self.regs.read_gpr(index)
    }

    /// Write to general purpose register
    ///
    /// A write to r0 lands in the register file and is cleared at the end of
    /// the step. Writing the destination of an in-flight load cancels it.
    ///
    /// # Example
    /// ```
    /// use cw33300::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg(1, 0x12345678);
    /// assert_eq!(cpu.reg(1), 0x12345678);
    ///
    /// cpu.set_reg(0, 0xDEADBEEF);
    /// assert_eq!(cpu.reg(0), 0);
    /// ```
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        self.regs.write_gpr(index, value);
    }

    /// Write to register with load delay
    ///
    /// The value becomes visible once the following instruction has
    /// executed.
    #[inline(always)]
    pub fn set_reg_delayed(&mut self, index: u8, value: u32) {
        self.regs.store_delayed_load(value, index);
    }

    /// Execute one instruction
    ///
    /// Emulated faults are delivered as MIPS exceptions, not as `Err`. An
    /// error is only returned for host-level failures.
    ///
    /// # Returns
    ///
    /// Approximate number of cycles consumed
    ///
    /// # Example
    ///
    /// ```
    /// use cw33300::core::cpu::CPU;
    /// use cw33300::core::memory::Bus;
    ///
    /// let mut cpu = CPU::new();
    /// let mut bus = Bus::new();
    ///
    /// // The empty BIOS reads as NOPs
    /// let cycles = cpu.step(&mut bus).unwrap();
    /// assert_eq!(cycles, 2);
    /// assert_eq!(cpu.pc(), 0xBFC00004);
    /// ```
    pub fn step(&mut self, bus: &mut Bus) -> Result<u32> {
        self.in_delay_slot = self.regs.is_branch_pending();

        let pc = self.regs.advance_pc();

        if pc & 0x3 != 0 {
            self.current_instruction = 0;
            self.cop0.set_bad_vaddr(pc);
            self.exception(ExceptionCause::AddressErrorLoad);
        } else {
            self.current_instruction = bus.read32(pc)?;
            let instruction = decode(self.current_instruction);
            self.execute(instruction, bus)?;
        }

        self.regs.finish_step();

        if self.in_delay_slot {
            self.regs.commit_delayed_jump();
        }
        self.in_delay_slot = false;

        Ok(self.cycles_per_instruction)
    }

    /// Whether the next instruction to execute sits in a branch delay slot
    pub fn in_delay_slot(&self) -> bool {
        self.regs.is_branch_pending()
    }

    /// Get current PC value (the next instruction to fetch)
    pub fn pc(&self) -> u32 {
        self.regs.pc()
    }

    /// Redirect execution to `address`, dropping any latched branch
    pub fn set_pc(&mut self, address: u32) {
        self.regs.jump_to(address);
    }

    /// Start executing at `address` with an empty pipeline
    ///
    /// Both the pending load and the latched branch are dropped. Used when
    /// control is handed to a sideloaded executable.
    pub fn set_entry_point(&mut self, address: u32) {
        self.regs.clear_latches();
        self.regs.jump_to(address);
    }

    /// Address of the most recently executed instruction
    pub fn current_pc(&self) -> u32 {
        self.regs.current_pc()
    }

    /// Raw word of the most recently executed instruction
    pub fn current_instruction(&self) -> u32 {
        self.current_instruction
    }

    pub fn hi(&self) -> u32 {
        self.regs.hi()
    }

    pub fn lo(&self) -> u32 {
        self.regs.lo()
    }

    /// Register file (read-only view)
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Coprocessor 0 (read-only view)
    pub fn cop0(&self) -> &COP0 {
        &self.cop0
    }

    /// Read a COP0 register through the MFC0 accessor
    pub fn cop0_reg(&self, index: u8) -> u32 {
        self.cop0.read(index)
    }

    /// Write a COP0 register through the MTC0 accessor
    ///
    /// Host code touching SR must keep the bus isolation flag in sync;
    /// [`System`](crate::core::system::System) does this for you.
    pub fn set_cop0_reg(&mut self, index: u8, value: u32) {
        self.cop0.write(index, value);
    }

    /// Cycles charged per instruction
    pub fn cycles_per_instruction(&self) -> u32 {
        self.cycles_per_instruction
    }

    /// Capture the CPU state for a save state
    pub fn snapshot(&self) -> CpuState {
        CpuState {
            registers: self.regs.clone(),
            cop0: self.cop0.clone(),
            current_instruction: self.current_instruction,
        }
    }

    /// Restore a previously captured state
    pub fn restore(&mut self, state: &CpuState) {
        self.regs = state.registers.clone();
        self.cop0 = state.cop0.clone();
        self.current_instruction = state.current_instruction;
        self.in_delay_slot = false;
    }

    /// Dump all CPU registers to the log
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cw33300::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// cpu.dump_registers();
    /// ```
    pub fn dump_registers(&self) {
        log::info!(
            "PC: 0x{:08X}  Current PC: 0x{:08X}  Instruction: 0x{:08X}",
            self.pc(),
            self.current_pc(),
            self.current_instruction
        );
        log::info!("HI: 0x{:08X}  LO: 0x{:08X}", self.hi(), self.lo());

        for row in 0..8u8 {
            let base = row * 4;
            log::info!(
                "{:>4}: 0x{:08X}  {:>4}: 0x{:08X}  {:>4}: 0x{:08X}  {:>4}: 0x{:08X}",
                REGISTER_NAMES[base as usize],
                self.reg(base),
                REGISTER_NAMES[base as usize + 1],
                self.reg(base + 1),
                REGISTER_NAMES[base as usize + 2],
                self.reg(base + 2),
                REGISTER_NAMES[base as usize + 3],
                self.reg(base + 3)
            );
        }

        if let Some((reg, value)) = self.regs.pending_load() {
            log::info!("Pending load: r{} <- 0x{:08X}", reg, value);
        }

        log::info!(
            "SR: 0x{:08X}  CAUSE: 0x{:08X}  EPC: 0x{:08X}  BADA: 0x{:08X}  PRID: 0x{:08X}",
            self.cop0.read(COP0::SR),
            self.cop0.read(COP0::CAUSE),
            self.cop0.epc(),
            self.cop0.bad_vaddr(),
            self.cop0.prid()
        );
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
