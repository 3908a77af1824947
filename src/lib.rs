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

//! CW33300 (MIPS R3000A) CPU core library
//!
//! This library emulates the CPU found in the PlayStation: the MIPS I
//! instruction set with its load and branch delay slots, the System Control
//! Coprocessor (COP0) and the memory bus the CPU sees.
//!
//! # Example
//!
//! ```
//! use cw33300::core::cpu::CPU;
//! use cw33300::core::memory::Bus;
//!
//! let mut cpu = CPU::new();
//! let mut bus = Bus::new();
//!
//! // lui $t0, 0x1234 at the reset vector would need a BIOS image;
//! // place it in RAM instead.
//! bus.write32(0x8000_0000, 0x3C08_1234).unwrap();
//! cpu.set_pc(0x8000_0000);
//! cpu.step(&mut bus).unwrap();
//! assert_eq!(cpu.reg(8), 0x1234_0000);
//! ```

pub mod core;
