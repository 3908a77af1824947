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

//! Emulator configuration
//!
//! Settings are read from an optional TOML file. Every field has a default,
//! so an empty file (or no file at all) is a valid configuration.
//!
//! ```toml
//! bios = "SCPH1001.BIN"
//! frames = 120
//!
//! [cpu]
//! cycles_per_instruction = 2
//! trap_reserved_instructions = false
//!
//! [trace]
//! path = "trace.log"
//! limit = 10000
//! ```
//!
//! Precedence, lowest to highest: defaults, config file, environment
//! (`PSX_BIOS_PATH`, `PSX_EXE_PATH`), command-line flags.

use crate::core::error::{EmulatorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the BIOS path
pub const ENV_BIOS_PATH: &str = "PSX_BIOS_PATH";
/// Environment variable overriding the executable path
pub const ENV_EXE_PATH: &str = "PSX_EXE_PATH";

/// CPU clock rate (33.8688 MHz) divided by 60 frames per second
pub const DEFAULT_CYCLES_PER_FRAME: u64 = 564_480;

/// Top-level emulator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// BIOS image (512KB)
    pub bios: Option<PathBuf>,

    /// PSX-EXE to sideload once the BIOS reaches the shell
    pub exe: Option<PathBuf>,

    /// Number of frames to run before exiting
    pub frames: u32,

    /// CPU cycle budget per frame
    pub cycles_per_frame: u64,

    pub cpu: CpuConfig,

    pub trace: TraceConfig,
}

/// CPU core settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Approximate cost charged for every executed instruction
    pub cycles_per_instruction: u32,

    /// Raise ReservedInstruction for unknown encodings instead of
    /// logging them and continuing
    pub trap_reserved_instructions: bool,
}

/// Instruction trace settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Trace file; tracing is off when unset
    pub path: Option<PathBuf>,

    /// Stop tracing after this many instructions (0 = unlimited)
    pub limit: usize,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            bios: None,
            exe: None,
            frames: 60,
            cycles_per_frame: DEFAULT_CYCLES_PER_FRAME,
            cpu: CpuConfig::default(),
            trace: TraceConfig::default(),
        }
    }
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            cycles_per_instruction: 2,
            trap_reserved_instructions: false,
        }
    }
}

impl EmulatorConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EmulatorError::Config(e.to_string()))
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns `EmulatorError::Io` if the file cannot be read and
    /// `EmulatorError::Config` if it is not valid TOML for this schema.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply `PSX_BIOS_PATH` / `PSX_EXE_PATH` overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var_os(ENV_BIOS_PATH).map(PathBuf::from),
            std::env::var_os(ENV_EXE_PATH).map(PathBuf::from),
        );
    }

    /// Replace the BIOS/EXE paths with any values that are set
    pub fn apply_overrides(&mut self, bios: Option<PathBuf>, exe: Option<PathBuf>) {
        if bios.is_some() {
            self.bios = bios;
        }
        if exe.is_some() {
            self.exe = exe;
        }
    }

    /// Check values that would make the run loop misbehave
    pub fn validate(&self) -> Result<()> {
        if self.cpu.cycles_per_instruction == 0 {
            return Err(EmulatorError::Config(
                "cpu.cycles_per_instruction must be at least 1".to_string(),
            ));
        }
        if self.cycles_per_frame == 0 {
            return Err(EmulatorError::Config(
                "cycles_per_frame must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EmulatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EmulatorConfig::default());
        assert_eq!(config.frames, 60);
        assert_eq!(config.cycles_per_frame, 564_480);
        assert_eq!(config.cpu.cycles_per_instruction, 2);
        assert!(!config.cpu.trap_reserved_instructions);
    }

    #[test]
    fn test_partial_config() {
        let config = EmulatorConfig::from_toml_str(
            r#"
            bios = "bios/SCPH1001.BIN"

            [cpu]
            trap_reserved_instructions = true

            [trace]
            limit = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.bios, Some(PathBuf::from("bios/SCPH1001.BIN")));
        assert!(config.cpu.trap_reserved_instructions);
        assert_eq!(config.cpu.cycles_per_instruction, 2);
        assert_eq!(config.trace.limit, 500);
        assert_eq!(config.trace.path, None);
    }

    #[test]
    fn test_invalid_config() {
        let result = EmulatorConfig::from_toml_str("frames = \"many\"");
        assert!(matches!(result, Err(EmulatorError::Config(_))));
    }

    #[test]
    fn test_overrides_only_replace_set_values() {
        let mut config = EmulatorConfig {
            bios: Some(PathBuf::from("a.bin")),
            ..Default::default()
        };
        config.apply_overrides(None, Some(PathBuf::from("game.exe")));
        assert_eq!(config.bios, Some(PathBuf::from("a.bin")));
        assert_eq!(config.exe, Some(PathBuf::from("game.exe")));
    }

    #[test]
    fn test_validate_rejects_zero_cost() {
        let mut config = EmulatorConfig::default();
        config.cpu.cycles_per_instruction = 0;
        assert!(config.validate().is_err());
    }
}
