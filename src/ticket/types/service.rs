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

use crate::authentication::Service;
use crate::ticket::types::TicketMetadata;

/// Service ticket (and proxy ticket).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ServiceTicket {
    /// Common ticket state.
    pub meta: TicketMetadata,

    /// Service the ticket was issued for.
    pub service: Service,

    /// Ticket-granting (or proxy-granting) ticket the ticket was issued from.
    pub granting_ticket_id: String,

    /// Whether the ticket was issued from freshly presented credentials.
    #[serde(default)]
    pub from_new_login: bool,

    /// Set once a proxy-granting ticket was issued from this ticket.
    #[serde(default)]
    pub granted_ticket_already: bool,
}

impl ServiceTicket {
    /// Whether the ticket is expired at the given time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.meta.is_expired_at(false, now)
    }

    /// Whether the ticket may be validated by the service.
    pub fn is_valid_for(&self, service: &Service) -> bool {
        self.service.matches(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::types::tests::get_st;

    #[test]
    fn test_is_valid_for() {
        let st = get_st("ST-1", "TGT-1", "https://App.example.org/a?x=hello+world");
        assert!(st.is_valid_for(&Service::new("https://app.example.org/a?x=hello%20world")));
        assert!(!st.is_valid_for(&Service::new("https://other.example.org")));
    }
}
