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

//! System integration module
//!
//! Ties the CPU to the bus and runs it in frame-sized cycle budgets. Between
//! instructions the system:
//!
//! - snoops BIOS `putchar` calls for the kernel TTY
//! - sideloads a pending PSX-EXE once the BIOS reaches the shell
//! - mirrors the interrupt controller output into CAUSE.IP2 and lets the
//!   CPU take the interrupt
//! - writes the instruction trace if tracing is enabled

use super::config::{EmulatorConfig, DEFAULT_CYCLES_PER_FRAME};
use super::cpu::{CpuTracer, CPU};
use super::error::Result;
use super::interrupt::interrupts;
use super::kernel::KernelTty;
use super::loader::PSXExecutable;
use super::memory::Bus;
use super::save_state::SaveState;
use std::path::Path;

/// Address the BIOS jumps to when it hands over to the shell
pub const SHELL_ENTRY_POINT: u32 = 0x8003_0000;

#[cfg(test)]
mod tests;

/// PlayStation system: CPU, bus and the host-side hooks around them
///
/// # Example
///
/// ```
/// use cw33300::core::system::System;
///
/// let mut system = System::new();
/// system.reset();
/// assert_eq!(system.pc(), 0xBFC00000);
/// ```
pub struct System {
    cpu: CPU,
    bus: Bus,

    /// Kernel console output
    tty: KernelTty,

    /// Instruction tracer (None when tracing is off)
    tracer: Option<CpuTracer>,

    /// Executable waiting to be sideloaded
    exe: Option<PSXExecutable>,

    /// Set while `exe` still has to be copied in at the shell entry point
    exe_pending: bool,

    bios_loaded: bool,

    /// Cycles since reset
    cycles: u64,

    /// Frames completed since reset
    frame_count: u64,

    cycles_per_frame: u64,
}

impl System {
    /// Create a new system with default settings
    ///
    /// The BIOS is empty (reads as NOPs) until [`load_bios`](Self::load_bios)
    /// is called.
    pub fn new() -> Self {
        Self::with_config(&EmulatorConfig::default())
    }

    /// Create a system using the CPU and frame settings of `config`
    ///
    /// Paths in the configuration are not opened here; the host calls
    /// [`load_bios`](Self::load_bios) and friends.
    pub fn with_config(config: &EmulatorConfig) -> Self {
        let cycles_per_frame = if config.cycles_per_frame == 0 {
            DEFAULT_CYCLES_PER_FRAME
        } else {
            config.cycles_per_frame
        };

        Self {
            cpu: CPU::with_config(&config.cpu),
            bus: Bus::new(),
            tty: KernelTty::new(),
            tracer: None,
            exe: None,
            exe_pending: false,
            bios_loaded: false,
            cycles: 0,
            frame_count: 0,
            cycles_per_frame,
        }
    }

    /// Load a 512KB BIOS image
    ///
    /// # Errors
    ///
    /// Returns `BiosNotFound`, `InvalidBiosSize` or `Io` from the bus.
    pub fn load_bios<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.bus.load_bios(path)?;
        self.bios_loaded = true;
        Ok(())
    }

    /// Load a PSX-EXE
    ///
    /// With a BIOS loaded the executable is copied in when the BIOS reaches
    /// [`SHELL_ENTRY_POINT`]. Without one it is sideloaded right away.
    pub fn load_exe<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let exe = PSXExecutable::from_file(path)?;
        self.install_exe(exe);
        Ok(())
    }

    /// Same as [`load_exe`](Self::load_exe) for an already parsed image
    pub fn install_exe(&mut self, exe: PSXExecutable) {
        self.exe = Some(exe);
        self.arm_exe();
    }

    fn arm_exe(&mut self) {
        let Some(exe) = self.exe.as_ref() else {
            return;
        };

        if self.bios_loaded {
            log::info!(
                "PSX-EXE queued, waiting for the BIOS to reach 0x{:08X}",
                SHELL_ENTRY_POINT
            );
            self.exe_pending = true;
        } else {
            exe.sideload(&mut self.cpu, &mut self.bus);
            self.exe_pending = false;
        }
    }

    /// Reset the system
    ///
    /// The BIOS image stays loaded. A previously loaded executable is armed
    /// again.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.tty = KernelTty::new();
        self.cycles = 0;
        self.frame_count = 0;
        self.arm_exe();
        log::info!("System reset, PC=0x{:08X}", self.cpu.pc());
    }

    /// Execute one instruction (or take one interrupt)
    ///
    /// # Returns
    ///
    /// Number of cycles consumed
    ///
    /// # Errors
    ///
    /// Host-level failures only. The register state is dumped to the log
    /// before the error is returned.
    pub fn step(&mut self) -> Result<u32> {
        self.tty.snoop(&self.cpu);

        if self.exe_pending && self.cpu.pc() == SHELL_ENTRY_POINT {
            if let Some(exe) = self.exe.as_ref() {
                exe.sideload(&mut self.cpu, &mut self.bus);
            }
            self.exe_pending = false;
        }

        self.cpu
            .set_interrupt_line(self.bus.interrupt().is_pending());
        if self.cpu.check_interrupts() {
            log::trace!(
                "Interrupt taken, I_STAT=0x{:03X}",
                self.bus.interrupt().read_status()
            );
        }

        if let Some(tracer) = self.tracer.as_mut() {
            if let Err(e) = tracer.trace(&self.cpu, &self.bus) {
                log::warn!("Failed to write trace: {}", e);
            }
        }

        match self.cpu.step(&mut self.bus) {
            Ok(cycles) => {
                self.cycles += u64::from(cycles);
                Ok(cycles)
            }
            Err(e) => {
                log::error!("CPU step failed: {}", e);
                self.cpu.dump_registers();
                Err(e)
            }
        }
    }

    /// Execute `n` instructions
    ///
    /// # Example
    ///
    /// ```
    /// use cw33300::core::system::System;
    ///
    /// let mut system = System::new();
    /// system.step_n(100).unwrap();
    /// assert_eq!(system.pc(), 0xBFC00000 + 400);
    /// ```
    pub fn step_n(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// Execute one frame worth of cycles, then raise VBLANK
    ///
    /// The CPU runs at 33.8688 MHz, so a 60 Hz frame is 564,480 cycles by
    /// default.
    pub fn run_frame(&mut self) -> Result<()> {
        let target = self.cycles + self.cycles_per_frame;
        while self.cycles < target {
            self.step()?;
        }

        self.bus.request_interrupt(interrupts::VBLANK);
        self.frame_count += 1;

        if self.frame_count.is_multiple_of(60) {
            log::info!(
                "Frame {} complete ({} cycles, PC=0x{:08X})",
                self.frame_count,
                self.cycles,
                self.cpu.pc()
            );
        }
        Ok(())
    }

    /// Execute `frames` frames
    pub fn run_frames(&mut self, frames: u32) -> Result<()> {
        for _ in 0..frames {
            self.run_frame()?;
        }
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.flush()?;
        }
        Ok(())
    }

    /// Next instruction to execute
    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    /// Total cycles executed since reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Frames completed since reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn cycles_per_frame(&self) -> u64 {
        self.cycles_per_frame
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    /// Mutable CPU access
    ///
    /// Writing SR through this handle bypasses the bus isolation sync; use
    /// [`set_cop0_reg`](Self::set_cop0_reg) for that.
    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Kernel console captured so far
    pub fn tty(&self) -> &KernelTty {
        &self.tty
    }

    /// Whether an executable is still waiting for the shell entry point
    pub fn is_exe_pending(&self) -> bool {
        self.exe_pending
    }

    /// Write a COP0 register and keep the bus isolation flag in sync
    pub fn set_cop0_reg(&mut self, index: u8, value: u32) {
        self.cpu.set_cop0_reg(index, value);
        self.bus
            .set_cache_isolated(self.cpu.cop0().sr().cache_isolated());
    }

    /// Capture the current machine state
    pub fn save_state(&self, note: &str) -> SaveState {
        SaveState::capture(&self.cpu, &self.bus, self.frame_count, note)
    }

    /// Restore a captured machine state
    ///
    /// # Errors
    ///
    /// Returns `EmulatorError::SaveState` for a version or size mismatch.
    pub fn load_state(&mut self, state: &SaveState) -> Result<()> {
        state.apply(&mut self.cpu, &mut self.bus)?;
        self.frame_count = state.metadata.frame_count;
        self.exe_pending = false;
        log::info!(
            "Save state restored (frame {}, PC=0x{:08X})",
            self.frame_count,
            self.cpu.pc()
        );
        Ok(())
    }

    /// Enable CPU execution tracing
    ///
    /// # Arguments
    ///
    /// * `path` - Trace file to create
    /// * `limit` - Maximum number of instructions to trace (0 = unlimited)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cw33300::core::system::System;
    ///
    /// let mut system = System::new();
    /// system.enable_tracing("trace.log", 5000).unwrap();
    /// ```
    pub fn enable_tracing<P: AsRef<Path>>(&mut self, path: P, limit: usize) -> Result<()> {
        let path = path.as_ref();
        self.tracer = Some(CpuTracer::new(path)?.with_limit(limit));
        log::info!(
            "CPU tracing enabled: {} (limit: {})",
            path.display(),
            if limit == 0 {
                "unlimited".to_string()
            } else {
                limit.to_string()
            }
        );
        Ok(())
    }

    /// Disable tracing, flushing the trace file
    pub fn disable_tracing(&mut self) {
        if let Some(mut tracer) = self.tracer.take() {
            if let Err(e) = tracer.flush() {
                log::warn!("Failed to flush trace: {}", e);
            }
            log::info!(
                "CPU tracing disabled (traced {} instructions)",
                tracer.count()
            );
        }
    }

    pub fn is_tracing(&self) -> bool {
        self.tracer.is_some()
    }

    /// Number of instructions traced so far
    pub fn trace_count(&self) -> usize {
        self.tracer.as_ref().map_or(0, CpuTracer::count)
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}
