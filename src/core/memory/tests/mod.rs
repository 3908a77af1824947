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

//! Bus tests
//!
//! - Address translation and segment mirroring
//! - Region classification and open-bus reads
//! - Access sizes, alignment and endianness
//! - Cache isolation write inhibit
//! - I/O dispatch to the peripheral stubs

use super::*;


fn bus_with_bios_word(offset: usize, word: u32) -> Bus {
    let mut bus = Bus::new();
    bus.write_bios_for_test(offset, &word.to_le_bytes());
    bus
}
