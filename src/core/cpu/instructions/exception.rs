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

//! Exception-triggering instructions

use super::super::ExceptionCause;
use super::CPU;
use crate::core::error::Result;

impl CPU {
    /// SYSCALL: System Call
    ///
    /// The BIOS reads the function number from $a0 (and the 20-bit code
    /// field from the instruction at EPC, if it cares).
    ///
    /// # Exception
    ///
    /// Always triggers ExceptionCause::Syscall
    pub(in crate::core::cpu) fn op_syscall(&mut self) -> Result<()> {
        self.exception(ExceptionCause::Syscall);
        Ok(())
    }

    /// BREAK: Breakpoint
    ///
    /// # Exception
    ///
    /// Always triggers ExceptionCause::Breakpoint
    pub(in crate::core::cpu) fn op_break(&mut self) -> Result<()> {
        self.exception(ExceptionCause::Breakpoint);
        Ok(())
    }
}
