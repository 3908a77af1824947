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

//! CPU execution tracer for debugging
//!
//! Writes one line per instruction to a file, before the instruction
//! executes:
//!
//! ```text
//! PC=0xBFC00000 [0x3C080013] lui r8, 0x0013                  | r1=00000000 r2=00000000 r3=00000000
//! ```

use super::{Disassembler, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CPU execution tracer
pub struct CpuTracer {
    enabled: bool,
    output: BufWriter<File>,

    /// Instructions traced so far
    count: usize,

    /// Stop after this many lines (0 = unlimited)
    limit: usize,

    /// Registers appended to each line
    watch: Vec<u8>,
}

impl CpuTracer {
    /// Create a tracer writing to `path`
    ///
    /// # Errors
    ///
    /// Returns `EmulatorError::Io` if the file cannot be created
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let output = BufWriter::new(File::create(path)?);
        Ok(Self {
            enabled: true,
            output,
            count: 0,
            limit: 0,
            watch: vec![1, 2, 3],
        })
    }

    /// Limit the number of traced instructions (0 = unlimited)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Choose which registers are printed (at most 8)
    pub fn with_registers(mut self, regs: &[u8]) -> Self {
        self.watch = regs.iter().take(8).map(|r| r & 0x1F).collect();
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the next call to [`trace`](Self::trace) writes a line
    pub fn is_enabled(&self) -> bool {
        self.enabled && (self.limit == 0 || self.count < self.limit)
    }

    /// Number of lines written
    pub fn count(&self) -> usize {
        self.count
    }

    /// Trace the instruction at the CPU's PC
    pub fn trace(&mut self, cpu: &CPU, bus: &Bus) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let pc = cpu.pc();
        // A misaligned PC faults on fetch; trace it without touching the bus
        let instruction = if pc & 0x3 == 0 { bus.read32(pc)? } else { 0 };
        let disasm = Disassembler::disassemble(instruction, pc);

        write!(
            self.output,
            "PC=0x{:08X} [0x{:08X}] {:30} |",
            pc, instruction, disasm
        )?;

        for &reg in &self.watch {
            write!(self.output, " r{}={:08X}", reg, cpu.reg(reg))?;
        }

        writeln!(self.output)?;
        self.count += 1;

        if self.limit != 0 && self.count == self.limit {
            log::info!("Trace limit of {} instructions reached", self.limit);
            self.output.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }
}
