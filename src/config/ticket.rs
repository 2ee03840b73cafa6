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
//! # Ticket configuration
//!
//! Expiration and id generation settings of the individual ticket kinds. All
//! durations are in seconds.
use serde::Deserialize;

/// Ticket-granting ticket configuration (`[tgt]`).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TicketGrantingTicketSection {
    /// Hard ceiling of the single sign-on session counted from its creation.
    pub max_time_to_live: i64,
    /// Idle timeout counted from the last use.
    pub time_to_kill: i64,
    /// Hard timeout used instead of the regular policy when the user asked to
    /// be remembered. When unset the "remember me" choice is ignored.
    pub remember_me_max_time_to_live: Option<i64>,
    /// Track only the most recent session per (normalized) service.
    pub only_track_most_recent_session: bool,
}

impl Default for TicketGrantingTicketSection {
    fn default() -> Self {
        Self {
            max_time_to_live: 28800,
            time_to_kill: 7200,
            remember_me_max_time_to_live: None,
            only_track_most_recent_session: false,
        }
    }
}

/// Service ticket configuration (`[st]`).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceTicketSection {
    /// Number of validations the ticket may be used for.
    pub number_of_uses: u32,
    /// Lifetime of the ticket counted from its creation.
    pub time_to_kill: i64,
}

impl Default for ServiceTicketSection {
    fn default() -> Self {
        Self {
            number_of_uses: 1,
            time_to_kill: 10,
        }
    }
}

/// Proxy-granting ticket configuration (`[pgt]`).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProxyGrantingTicketSection {
    /// Hard ceiling counted from the creation.
    pub max_time_to_live: i64,
    /// Idle timeout counted from the last use.
    pub time_to_kill: i64,
}

impl Default for ProxyGrantingTicketSection {
    fn default() -> Self {
        Self {
            max_time_to_live: 28800,
            time_to_kill: 7200,
        }
    }
}

/// Proxy ticket configuration (`[pt]`).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProxyTicketSection {
    pub number_of_uses: u32,
    pub time_to_kill: i64,
}

impl Default for ProxyTicketSection {
    fn default() -> Self {
        Self {
            number_of_uses: 1,
            time_to_kill: 10,
        }
    }
}

/// Transient session ticket configuration (`[tst]`).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TransientSessionTicketSection {
    pub time_to_kill: i64,
}

impl Default for TransientSessionTicketSection {
    fn default() -> Self {
        Self { time_to_kill: 300 }
    }
}

/// Ticket id generation (`[ticket_id]`).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TicketIdSection {
    /// Length of the random part of the ticket id. Must be at least 32.
    pub random_length: usize,
    /// Optional suffix identifying the cluster node issuing the ticket.
    pub suffix: Option<String>,
}

impl Default for TicketIdSection {
    fn default() -> Self {
        Self {
            random_length: 40,
            suffix: None,
        }
    }
}
