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

//! CPU register file
//!
//! Holds the 32 general purpose registers, the program counter pair, HI/LO
//! and the two delay-slot latches of the R3000A pipeline.
//!
//! # Load delay protocol
//!
//! A load started by instruction N lands in the register file at the end of
//! instruction N+1. Internally this is a two-stage latch:
//!
//! - `load` holds the load issued by the *previous* instruction. It is
//!   committed at the end of the current step unless the current
//!   instruction writes the same register (the newer write wins).
//! - `next_load` holds the load issued by the *current* instruction. It is
//!   promoted to `load` once the step finishes.
//!
//! At every instruction boundary at most one load is outstanding.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Register number of `$gp`
pub const REG_GP: u8 = 28;
/// Register number of `$sp`
pub const REG_SP: u8 = 29;
/// Register number of `$fp`
pub const REG_FP: u8 = 30;
/// Register number of `$ra`
pub const REG_RA: u8 = 31;

/// A load whose value is not yet visible in the register file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct LoadDelayLatch {
    pending: bool,
    dest_reg: u8,
    value: u32,
}

impl LoadDelayLatch {
    fn armed(dest_reg: u8, value: u32) -> Self {
        Self {
            pending: true,
            dest_reg,
            value,
        }
    }

    /// Destination register and value, if the latch holds a load
    pub fn get(&self) -> Option<(u8, u32)> {
        self.pending.then_some((self.dest_reg, self.value))
    }
}

/// A taken branch waiting for its delay slot to finish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct BranchDelayLatch {
    pending: bool,
    target: u32,
}

/// General purpose registers, PC, HI/LO and the delay-slot latches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct RegisterFile {
    /// r0-r31, r0 is rewritten to zero after every instruction
    gpr: [u32; 32],

    /// Fetch pointer, 4 bytes ahead of the executing instruction
    pc: u32,

    /// Address of the executing instruction
    current_pc: u32,

    hi: u32,
    lo: u32,

    load: LoadDelayLatch,
    next_load: LoadDelayLatch,
    branch: BranchDelayLatch,
}

impl RegisterFile {
    /// Create a register file with every register cleared
    pub fn new() -> Self {
        Self {
            gpr: [0u32; 32],
            pc: 0,
            current_pc: 0,
            hi: 0,
            lo: 0,
            load: LoadDelayLatch::default(),
            next_load: LoadDelayLatch::default(),
            branch: BranchDelayLatch::default(),
        }
    }

    /// Clear all registers and latches
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a general purpose register
    ///
    /// Register 0 always reads as zero.
    #[inline(always)]
    pub fn read_gpr(&self, index: u8) -> u32 {
        if index == 0 {
            0
        } else {
            self.gpr[index as usize & 0x1F]
        }
    }

    /// Write a general purpose register
    ///
    /// A write to r0 is accepted here and cleared by [`finish_step`].
    /// Writing the destination of the outstanding load cancels that load.
    ///
    /// [`finish_step`]: RegisterFile::finish_step
    #[inline(always)]
    pub fn write_gpr(&mut self, index: u8, value: u32) {
        let index = index & 0x1F;
        self.gpr[index as usize] = value;

        if self.load.pending && self.load.dest_reg == index {
            self.load.pending = false;
        }
    }

    /// Start a delayed load into `dest_reg`
    ///
    /// The value becomes visible after the next instruction completes. If the
    /// outstanding load targets the same register it is dropped.
    pub fn store_delayed_load(&mut self, value: u32, dest_reg: u8) {
        let dest_reg = dest_reg & 0x1F;

        if self.load.pending && self.load.dest_reg == dest_reg {
            self.load.pending = false;
        }

        self.next_load = LoadDelayLatch::armed(dest_reg, value);
    }

    /// Commit the outstanding load to its register right away
    pub fn consume_delayed_load(&mut self) {
        if let Some((reg, value)) = self.load.get() {
            self.gpr[reg as usize] = value;
            self.load.pending = false;
        }
    }

    /// Whether a load issued by the previous instruction is outstanding
    pub fn is_load_pending(&self) -> bool {
        self.load.pending
    }

    /// Value of the outstanding load if it targets `reg`
    ///
    /// Used by LWL/LWR, which merge against the in-flight value.
    pub fn pending_load_value(&self, reg: u8) -> Option<u32> {
        match self.load.get() {
            Some((dest, value)) if dest == reg & 0x1F => Some(value),
            _ => None,
        }
    }

    /// Outstanding load as (register, value)
    pub fn pending_load(&self) -> Option<(u8, u32)> {
        self.load.get()
    }

    /// Latch a taken branch; control transfers after the delay slot
    pub fn store_delayed_jump(&mut self, target: u32) {
        self.branch = BranchDelayLatch {
            pending: true,
            target,
        };
    }

    /// Move the latched branch target into PC
    ///
    /// Does nothing if the latch was cancelled (e.g. by an exception).
    pub fn commit_delayed_jump(&mut self) {
        if self.branch.pending {
            self.pc = self.branch.target;
            self.branch.pending = false;
        }
    }

    /// Drop the latched branch, returning its target
    pub fn cancel_delayed_jump(&mut self) -> Option<u32> {
        let target = self.branch.pending.then_some(self.branch.target);
        self.branch.pending = false;
        target
    }

    /// Whether a taken branch is waiting for its delay slot
    pub fn is_branch_pending(&self) -> bool {
        self.branch.pending
    }

    /// End-of-instruction bookkeeping
    ///
    /// Commits the load issued by the previous instruction, promotes the
    /// load issued by this one and forces r0 back to zero.
    pub fn finish_step(&mut self) {
        self.consume_delayed_load();
        self.load = std::mem::take(&mut self.next_load);
        self.gpr[0] = 0;
    }

    /// Fetch pointer
    #[inline(always)]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Overwrite the fetch pointer without touching the latches
    #[inline(always)]
    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    /// Redirect execution: set PC and drop any latched branch
    pub fn jump_to(&mut self, address: u32) {
        self.pc = address;
        self.branch.pending = false;
    }

    /// Drop every in-flight load and branch
    pub fn clear_latches(&mut self) {
        self.load = LoadDelayLatch::default();
        self.next_load = LoadDelayLatch::default();
        self.branch = BranchDelayLatch::default();
    }

    /// Address of the executing instruction
    #[inline(always)]
    pub fn current_pc(&self) -> u32 {
        self.current_pc
    }

    /// Record the address of the instruction being fetched and advance PC
    #[inline(always)]
    pub(super) fn advance_pc(&mut self) -> u32 {
        self.current_pc = self.pc;
        self.pc = self.pc.wrapping_add(4);
        self.current_pc
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    pub fn set_hi(&mut self, value: u32) {
        self.hi = value;
    }

    pub fn set_lo(&mut self, value: u32) {
        self.lo = value;
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
