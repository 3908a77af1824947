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

//! System module tests
//!
//! Tests are grouped by the hook they exercise.

mod execution;

use super::*;

/// Write `words` into the BIOS starting at `0xBFC00000`
pub(super) fn write_bios_program(system: &mut System, words: &[u32]) {
    for (i, word) in words.iter().enumerate() {
        system
            .bus_mut()
            .write_bios_for_test(i * 4, &word.to_le_bytes());
    }
}

/// Create a 512KB BIOS file holding `words` at its start
pub(super) fn bios_file(dir: &std::path::Path, words: &[u32]) -> std::path::PathBuf {
    let mut image = vec![0u8; Bus::BIOS_SIZE];
    for (i, word) in words.iter().enumerate() {
        image[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
    let path = dir.join("bios.bin");
    std::fs::write(&path, image).unwrap();
    path
}
