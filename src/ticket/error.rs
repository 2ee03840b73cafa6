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
//! # Ticket factory error
use thiserror::Error;

/// Ticket factory error.
#[derive(Error, Debug)]
pub enum TicketFactoryError {
    /// The parent ticket can not issue the requested ticket.
    #[error("ticket {id} can not issue new tickets: {reason}")]
    InvalidParent {
        /// Id of the parent ticket.
        id: String,
        /// Reason.
        reason: String,
    },

    /// Invalid ticket configuration.
    #[error("invalid ticket configuration: {0}")]
    InvalidConfiguration(String),
}
