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
//! Ticket registry database backend error.
use thiserror::Error;

use crate::error::DatabaseError;

/// Database backend error for the database driver.
#[derive(Error, Debug)]
pub enum TicketDatabaseError {
    /// Database error.
    #[error(transparent)]
    Database {
        #[from]
        source: DatabaseError,
    },

    /// Unknown ticket kind stored in the database.
    #[error("unknown ticket type {0}")]
    InvalidTicketType(String),

    /// Ticket body (de)serialization error.
    #[error(transparent)]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    /// The version does not fit into the column.
    #[error("ticket version {0} is out of range")]
    VersionOutOfRange(String),
}
