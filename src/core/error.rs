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

/// Emulator error types
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Host-level error type
///
/// Faults of the emulated program (overflow, misaligned loads, syscalls, ...)
/// are never reported through this type. They are delivered to the emulated
/// kernel as MIPS exceptions by the CPU's exception controller.
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("BIOS file not found: {0}")]
    BiosNotFound(String),

    #[error("Invalid BIOS size: {got} bytes (expected {expected})")]
    InvalidBiosSize { expected: usize, got: usize },

    #[error("Unaligned memory access: {size}-byte access at 0x{address:08X}")]
    UnalignedAccess { address: u32, size: u8 },

    #[error("Invalid register index: {index} (valid range: 0-31)")]
    InvalidRegister { index: u8 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Loader error: {0}")]
    LoaderError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Save state error: {0}")]
    SaveState(String),
}
