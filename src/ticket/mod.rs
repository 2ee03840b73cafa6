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
//! # Tickets
//!
//! Tickets form a tree rooted at the ticket-granting ticket (TGT):
//!
//!   - the TGT grants service tickets (ST),
//!   - a validated ST of a service allowed to proxy can be exchanged for a
//!     proxy-granting ticket (PGT) chained under the TGT,
//!   - the PGT grants proxy tickets (PT).
//!
//! Relations between the tickets are stored as ticket ids and resolved
//! through the ticket registry. Every ticket owns its
//! [expiration::ExpirationPolicy] and usage counters.

pub mod error;
pub mod expiration;
pub mod factory;
pub mod types;

pub use error::TicketFactoryError;
pub use expiration::ExpirationPolicy;
pub use factory::{DefaultTicketFactory, TicketRequest};
pub use types::*;
