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
//! # Ticket registry error
use thiserror::Error;

use crate::registry::backend::error::TicketDatabaseError;
use crate::ticket::TicketType;

/// Ticket registry error.
///
/// `NotFound`, `TypeMismatch`, `Duplicate` and `Conflict` are protocol
/// errors the callers are expected to handle. The rest are infrastructure
/// errors.
#[derive(Error, Debug)]
pub enum TicketRegistryError {
    /// SQL backend error.
    #[error(transparent)]
    Backend {
        /// The source of the error.
        source: TicketDatabaseError,
    },

    /// The chain of the granting tickets loops or is too long.
    #[error("ticket chain of {0} is broken")]
    BrokenChain(String),

    /// The ticket was modified since it has been read.
    #[error("ticket {0} was concurrently modified")]
    Conflict(String),

    /// The ticket with the same id already exists.
    #[error("ticket {0} already exists")]
    Duplicate(String),

    /// The ticket does not exist or is expired.
    #[error("ticket {0} not found")]
    NotFound(String),

    /// (de)serialization error.
    #[error(transparent)]
    Serde {
        /// The source of the error.
        #[from]
        source: serde_json::Error,
    },

    /// The ticket is of a different kind than requested.
    #[error("ticket {id} is a {actual} ticket while {expected} was requested")]
    TypeMismatch {
        /// Ticket id.
        id: String,
        /// Requested ticket kind.
        expected: TicketType,
        /// Actual ticket kind.
        actual: TicketType,
    },

    /// Unsupported driver.
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),
}

impl TicketRegistryError {
    /// Whether the error is caused by the registry infrastructure rather than
    /// by the ticket state.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Backend { .. } | Self::Serde { .. } | Self::UnsupportedDriver(..)
        )
    }
}

impl From<TicketDatabaseError> for TicketRegistryError {
    fn from(source: TicketDatabaseError) -> Self {
        match source {
            TicketDatabaseError::Serde { source } => Self::Serde { source },
            _ => Self::Backend { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_infrastructure() {
        assert!(!TicketRegistryError::NotFound("ST-1".into()).is_infrastructure());
        assert!(!TicketRegistryError::BrokenChain("PGT-1".into()).is_infrastructure());
        assert!(!TicketRegistryError::Conflict("ST-1".into()).is_infrastructure());
        assert!(!TicketRegistryError::Duplicate("ST-1".into()).is_infrastructure());
        assert!(
            !TicketRegistryError::TypeMismatch {
                id: "ST-1".into(),
                expected: TicketType::TicketGranting,
                actual: TicketType::Service
            }
            .is_infrastructure()
        );
        assert!(TicketRegistryError::UnsupportedDriver("foo".into()).is_infrastructure());
    }
}
