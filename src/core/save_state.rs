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

//! Save states
//!
//! A save state holds the CPU (registers, delay latches, COP0) and the bus
//! contents (RAM, scratchpad, peripheral registers). The BIOS image is not
//! included and must be loaded separately before restoring.
//!
//! # Save State Format
//!
//! States are encoded with bincode's standard configuration. The version
//! number is checked on load; a mismatch is an error.
//!
//! # Example
//!
//! ```no_run
//! use cw33300::core::save_state::SaveState;
//! use cw33300::core::System;
//!
//! let mut system = System::new();
//! system.step_n(1000).unwrap();
//!
//! let state = system.save_state("before boot logo");
//! state.save_to_file("save.state").unwrap();
//!
//! let loaded = SaveState::load_from_file("save.state").unwrap();
//! system.load_state(&loaded).unwrap();
//! ```

use crate::core::cpu::{CpuState, CPU};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::{Bus, MemoryState};
use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Save state version for compatibility checking
///
/// Incremented whenever the encoded layout changes.
pub const SAVE_STATE_VERSION: u32 = 1;

/// Complete emulator save state
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct SaveState {
    /// Version number for compatibility checking
    pub version: u32,

    pub metadata: SaveStateMetadata,

    pub cpu: CpuState,

    pub memory: MemoryState,
}

/// Save state metadata
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct SaveStateMetadata {
    /// Timestamp when the save state was created
    #[bincode(with_serde)]
    pub timestamp: DateTime<Utc>,

    /// Frames run when the state was taken
    pub frame_count: u64,

    /// Free-form description
    pub note: String,
}

impl SaveState {
    /// Capture the CPU and bus
    pub fn capture(cpu: &CPU, bus: &Bus, frame_count: u64, note: &str) -> Self {
        Self {
            version: SAVE_STATE_VERSION,
            metadata: SaveStateMetadata {
                timestamp: Utc::now(),
                frame_count,
                note: note.to_string(),
            },
            cpu: cpu.snapshot(),
            memory: bus.snapshot(),
        }
    }

    /// Write this state back into `cpu` and `bus`
    ///
    /// The bus cache isolation flag is re-derived from the restored SR.
    pub fn apply(&self, cpu: &mut CPU, bus: &mut Bus) -> Result<()> {
        self.check_version()?;
        bus.restore(&self.memory)?;
        cpu.restore(&self.cpu);
        bus.set_cache_isolated(cpu.cop0().sr().cache_isolated());
        Ok(())
    }

    /// Encode to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::encode_to_vec(self, config::standard())
            .map_err(|e| EmulatorError::SaveState(format!("encode failed: {}", e)))
    }

    /// Decode from bytes, checking the version
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (state, _): (SaveState, usize) =
            bincode::decode_from_slice(bytes, config::standard())
                .map_err(|e| EmulatorError::SaveState(format!("decode failed: {}", e)))?;

        state.check_version()?;
        Ok(state)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::from_bytes(&buffer)
    }

    fn check_version(&self) -> Result<()> {
        if self.version != SAVE_STATE_VERSION {
            return Err(EmulatorError::SaveState(format!(
                "Incompatible save state version: expected {}, got {}",
                SAVE_STATE_VERSION, self.version
            )));
        }
        Ok(())
    }
}
