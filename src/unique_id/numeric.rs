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
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing sequence shared by all the callers of the
/// generator.
///
/// The counter wraps silently to `0` once `u64::MAX` is reached.
#[derive(Debug, Default)]
pub struct DefaultLongNumericGenerator {
    count: AtomicU64,
}

impl DefaultLongNumericGenerator {
    /// Start the sequence at the given value.
    pub fn new(initial_value: u64) -> Self {
        Self {
            count: AtomicU64::new(initial_value),
        }
    }

    /// Get the next number of the sequence.
    pub fn next_number(&self) -> u64 {
        // `fetch_add` wraps around on overflow.
        self.count.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}
