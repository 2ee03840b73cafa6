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
use rand::distr::{Alphanumeric, SampleString};

/// Random alphanumeric string generator.
///
/// Uses the thread local CSPRNG seeded from the operating system.
#[derive(Debug)]
pub struct DefaultRandomStringGenerator {
    length: usize,
}

impl DefaultRandomStringGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Length of the generated strings.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate the new random string.
    pub fn new_string(&self) -> String {
        Alphanumeric.sample_string(&mut rand::rng(), self.length)
    }
}
