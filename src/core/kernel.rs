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

//! BIOS kernel hooks
//!
//! The BIOS kernel funnels its console output through `putchar`, reachable
//! as `A(3Ch)` (jump to 0xA0 with `$t1 = 0x3C`) and `B(3Dh)` (jump to 0xB0
//! with `$t1 = 0x3D`). The character is in `$a0`. Snooping those calls gives
//! us the boot messages without emulating a serial port.

use crate::core::cpu::CPU;

/// Physical addresses of the kernel function tables
const A_FUNCTIONS: u32 = 0xA0;
const B_FUNCTIONS: u32 = 0xB0;

const A_PUTCHAR: u32 = 0x3C;
const B_PUTCHAR: u32 = 0x3D;

const REG_A0: u8 = 4;
const REG_T1: u8 = 9;

/// Line-buffered kernel console
///
/// Completed lines go to the log under the `tty` target and are kept in a
/// transcript.
///
/// # Example
///
/// ```
/// use cw33300::core::kernel::KernelTty;
///
/// let mut tty = KernelTty::new();
/// for byte in b"Hello\n" {
///     tty.putchar(*byte);
/// }
/// assert_eq!(tty.transcript(), "Hello\n");
/// ```
#[derive(Debug, Default)]
pub struct KernelTty {
    line: Vec<u8>,
    transcript: String,
}

impl KernelTty {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the instruction about to run is a putchar entry point
    ///
    /// Must be called before the CPU steps, while `cpu.pc()` still names the
    /// instruction to execute.
    pub fn snoop(&mut self, cpu: &CPU) {
        let pc = cpu.pc() & 0x1FFF_FFFF;
        let function = cpu.reg(REG_T1);

        let is_putchar = (pc == A_FUNCTIONS && function == A_PUTCHAR)
            || (pc == B_FUNCTIONS && function == B_PUTCHAR);

        if is_putchar {
            self.putchar(cpu.reg(REG_A0) as u8);
        }
    }

    /// Append a character, flushing on `\n` or NUL
    pub fn putchar(&mut self, chr: u8) {
        if chr != b'\n' && chr != 0 {
            self.line.push(chr);
            return;
        }

        let text = String::from_utf8_lossy(&self.line).into_owned();
        log::info!(target: "tty", "{}", text);

        self.transcript.push_str(&text);
        self.transcript.push('\n');
        self.line.clear();
    }

    /// Everything flushed so far, one `\n`-terminated line per flush
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Characters received since the last flush
    pub fn pending(&self) -> &[u8] {
        &self.line
    }
}
