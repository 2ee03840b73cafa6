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
use std::collections::{BTreeMap, BTreeSet};

use crate::authentication::{Authentication, Service};
use crate::ticket::types::TicketMetadata;

/// Ticket-granting ticket.
///
/// Represents the single sign-on session (or, when issued to a proxying
/// service, the proxy-granting ticket). Parent and child tickets are
/// referenced by their ids and resolved through the ticket registry.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TicketGrantingTicket {
    /// Common ticket state.
    pub meta: TicketMetadata,

    /// Authentication the ticket was issued for.
    pub authentication: Authentication,

    /// Service tickets granted from this ticket and the services they were
    /// granted for.
    #[serde(default)]
    pub services: BTreeMap<String, Service>,

    /// Proxy-granting tickets chained under this ticket.
    #[serde(default)]
    pub proxy_granting_tickets: BTreeMap<String, Service>,

    /// Ids of every ticket issued from this ticket.
    #[serde(default)]
    pub descendant_tickets: BTreeSet<String>,

    /// Parent ticket-granting ticket (for the proxy-granting tickets).
    #[serde(default)]
    pub granting_ticket_id: Option<String>,

    /// Service on whose behalf the proxy-granting ticket was issued.
    #[serde(default)]
    pub proxied_by: Option<Service>,
}

impl TicketGrantingTicket {
    pub fn new(meta: TicketMetadata, authentication: Authentication) -> Self {
        Self {
            meta,
            authentication,
            services: BTreeMap::new(),
            proxy_granting_tickets: BTreeMap::new(),
            descendant_tickets: BTreeSet::new(),
            granting_ticket_id: None,
            proxied_by: None,
        }
    }

    /// Whether the ticket is expired at the given time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.meta
            .is_expired_at(self.authentication.is_remember_me(), now)
    }

    /// Whether the ticket is the root of the session.
    pub fn is_root(&self) -> bool {
        self.granting_ticket_id.is_none()
    }

    /// Record the service ticket issued from this ticket.
    ///
    /// With `only_track_most_recent_session` the previously tracked tickets
    /// of the same (normalized) service are dropped from the `services`.
    /// They stay in the `descendant_tickets` so that they are still removed
    /// together with this ticket.
    pub fn track_service<S: Into<String>>(
        &mut self,
        id: S,
        service: Service,
        only_track_most_recent_session: bool,
    ) {
        let id = id.into();
        if only_track_most_recent_session {
            let normalized = service.normalized_id();
            self.services
                .retain(|_, tracked| tracked.normalized_id() != normalized);
        }
        self.descendant_tickets.insert(id.clone());
        self.services.insert(id, service);
    }

    /// Record the proxy-granting ticket chained under this ticket.
    pub fn add_proxy_granting_ticket<S: Into<String>>(&mut self, id: S, service: Service) {
        let id = id.into();
        self.descendant_tickets.insert(id.clone());
        self.proxy_granting_tickets.insert(id, service);
    }

    /// Ids of all the tickets issued from this ticket.
    pub fn child_ticket_ids(&self) -> Vec<String> {
        let mut ids: BTreeSet<&String> = self.descendant_tickets.iter().collect();
        ids.extend(self.services.keys());
        ids.extend(self.proxy_granting_tickets.keys());
        ids.into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::types::tests::get_tgt;

    #[test]
    fn test_track_services() {
        let mut tgt = get_tgt("TGT-1");
        assert!(tgt.is_root());
        tgt.track_service("ST-1", Service::new("http://host.com?test"), false);
        tgt.track_service("ST-2", Service::new("http://host.com;JSESSIONID=xxx"), false);
        assert_eq!(2, tgt.services.len());
        assert_eq!(2, tgt.descendant_tickets.len());
    }

    #[test]
    fn test_only_track_most_recent_session() {
        let mut tgt = get_tgt("TGT-1");
        tgt.track_service("ST-1", Service::new("http://host.com?test"), true);
        tgt.track_service("ST-2", Service::new("http://host.com;JSESSIONID=xxx"), true);
        tgt.track_service("ST-3", Service::new("http://host.com/webapp1"), true);
        tgt.track_service("ST-4", Service::new("http://host.com/webapp1?test=true"), true);
        assert_eq!(
            vec!["ST-2", "ST-4"],
            tgt.services.keys().map(String::as_str).collect::<Vec<_>>()
        );
        // still cascaded
        assert_eq!(4, tgt.child_ticket_ids().len());
    }

    #[test]
    fn test_child_ticket_ids() {
        let mut tgt = get_tgt("TGT-1");
        tgt.track_service("ST-1", Service::new("https://a.org"), false);
        tgt.add_proxy_granting_ticket("PGT-1", Service::new("https://a.org"));
        // legacy state without the descendants
        tgt.services
            .insert("ST-0".into(), Service::new("https://b.org"));
        assert_eq!(
            vec!["PGT-1".to_string(), "ST-0".into(), "ST-1".into()],
            tgt.child_ticket_ids()
        );
    }
}
