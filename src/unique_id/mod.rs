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
//! # Unique ticket id generation
//!
//! Ticket ids are bearer credentials and must be both globally unique and
//! unpredictable. The generated ids have the form
//! `PREFIX-SEQUENCE-RANDOM[-SUFFIX]` where:
//!
//!   - `PREFIX` identifies the kind of the ticket (`TGT`, `ST`, ...),
//!   - `SEQUENCE` is a per-process monotonically increasing number,
//!   - `RANDOM` is a string of cryptographically random alphanumeric
//!     characters,
//!   - `SUFFIX` optionally identifies the cluster node issuing the ticket.
use std::fmt::Debug;

mod numeric;
mod random;

pub use numeric::DefaultLongNumericGenerator;
pub use random::DefaultRandomStringGenerator;

/// Minimal length of the random part of the id.
pub const MIN_RANDOM_LENGTH: usize = 32;

/// Default length of the random part of the id.
pub const DEFAULT_RANDOM_LENGTH: usize = 40;

/// Maximal number of decimal digits of the sequence part.
const MAX_SEQUENCE_LENGTH: usize = 20;

/// Ticket id generator.
pub trait UniqueTicketIdGenerator: Debug + Send + Sync {
    /// Generate a new ticket id with the given prefix.
    fn new_ticket_id(&self, prefix: &str) -> String;

    /// Minimal length of the ids generated for the prefix.
    fn min_id_length(&self, prefix: &str) -> usize;

    /// Maximal length of the ids generated for the prefix.
    fn max_id_length(&self, prefix: &str) -> usize;
}

/// Default ticket id generator.
#[derive(Debug)]
pub struct DefaultUniqueTicketIdGenerator {
    numeric: DefaultLongNumericGenerator,
    random: DefaultRandomStringGenerator,
    suffix: Option<String>,
}

impl DefaultUniqueTicketIdGenerator {
    /// Create the generator with the random part of the requested length and
    /// an optional suffix.
    ///
    /// The suffix is expected to be already validated (no whitespace, no
    /// dashes).
    pub fn new(random_length: usize, suffix: Option<String>) -> Self {
        Self {
            numeric: DefaultLongNumericGenerator::default(),
            random: DefaultRandomStringGenerator::new(random_length),
            suffix: suffix.filter(|x| !x.is_empty()),
        }
    }

    fn suffix_length(&self) -> usize {
        self.suffix.as_ref().map(|x| x.len() + 1).unwrap_or_default()
    }
}

impl Default for DefaultUniqueTicketIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_RANDOM_LENGTH, None)
    }
}

impl UniqueTicketIdGenerator for DefaultUniqueTicketIdGenerator {
    fn new_ticket_id(&self, prefix: &str) -> String {
        let sequence = self.numeric.next_number();
        let random = self.random.new_string();
        match &self.suffix {
            Some(suffix) => format!("{prefix}-{sequence}-{random}-{suffix}"),
            None => format!("{prefix}-{sequence}-{random}"),
        }
    }

    fn min_id_length(&self, prefix: &str) -> usize {
        // prefix, dash, at least one digit, dash, random part
        prefix.len() + 2 + 1 + self.random.length() + self.suffix_length()
    }

    fn max_id_length(&self, prefix: &str) -> usize {
        prefix.len() + 2 + MAX_SEQUENCE_LENGTH + self.random.length() + self.suffix_length()
    }
}
