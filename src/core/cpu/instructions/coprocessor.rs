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

//! COP1, COP2 and COP3 opcodes
//!
//! COP1 and COP3 do not exist on this CPU and always raise
//! CoprocessorUnusable. COP2 is the geometry engine, which this core does
//! not model: with SR.CU2 clear it faults like the others, with CU2 set the
//! instruction is reported and skipped.

use super::super::CPU;
use crate::core::error::Result;

const GTE: u8 = 2;

impl CPU {
    /// COPn register move or command
    pub(in crate::core::cpu) fn op_cop(&mut self, n: u8) -> Result<()> {
        self.coprocessor_access(n, "COP")
    }

    /// LWCn / SWCn
    pub(in crate::core::cpu) fn op_cop_transfer(&mut self, n: u8) -> Result<()> {
        self.coprocessor_access(n, "LWC/SWC")
    }

    fn coprocessor_access(&mut self, n: u8, kind: &str) -> Result<()> {
        if n == GTE && self.cop0.sr().coprocessor_usable(GTE) {
            log::warn!(
                "Unimplemented GTE {} instruction: 0x{:08X} at PC=0x{:08X}",
                kind,
                self.current_instruction,
                self.regs.current_pc()
            );
            return Ok(());
        }

        self.coprocessor_unusable(n);
        Ok(())
    }
}
