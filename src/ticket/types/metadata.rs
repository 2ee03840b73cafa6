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
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ticket::expiration::ExpirationPolicy;

/// State common to every ticket.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TicketMetadata {
    /// Ticket id.
    pub id: String,

    /// Time of the ticket creation.
    pub creation_time: DateTime<Utc>,

    /// Time of the last use.
    pub last_time_used: DateTime<Utc>,

    /// Time of the use preceding the last one.
    #[serde(default)]
    pub previous_time_used: Option<DateTime<Utc>>,

    /// Number of uses. Never decremented.
    #[serde(default)]
    pub count_of_uses: u32,

    /// Set once the ticket was explicitly expired.
    #[serde(default)]
    pub expired: bool,

    /// Expiration policy of the ticket.
    pub expiration_policy: ExpirationPolicy,

    /// Registry revision. Maintained by the ticket registry.
    #[serde(default)]
    pub version: u64,
}

impl TicketMetadata {
    pub fn new<S: Into<String>>(id: S, expiration_policy: ExpirationPolicy) -> Self {
        Self::new_at(id, expiration_policy, Utc::now())
    }

    /// Metadata of a ticket created at the given time.
    pub fn new_at<S: Into<String>>(
        id: S,
        expiration_policy: ExpirationPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            creation_time: now,
            last_time_used: now,
            previous_time_used: None,
            count_of_uses: 0,
            expired: false,
            expiration_policy,
            version: 0,
        }
    }

    /// Record the use of the ticket.
    pub fn update(&mut self, now: DateTime<Utc>) {
        self.previous_time_used = Some(self.last_time_used);
        self.last_time_used = now;
        self.count_of_uses = self.count_of_uses.saturating_add(1);
    }

    pub fn is_expired_at(&self, remember_me: bool, now: DateTime<Utc>) -> bool {
        self.expired || self.expiration_policy.is_expired(self, remember_me, now)
    }
}
