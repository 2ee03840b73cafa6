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
//! # Ticket types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

mod granting;
mod metadata;
mod service;
mod transient;

pub use granting::TicketGrantingTicket;
pub use metadata::TicketMetadata;
pub use service::ServiceTicket;
pub use transient::TransientSessionTicket;

/// Ticket-granting ticket id prefix.
pub const TICKET_GRANTING_TICKET_PREFIX: &str = "TGT";
/// Proxy-granting ticket id prefix.
pub const PROXY_GRANTING_TICKET_PREFIX: &str = "PGT";
/// Proxy-granting ticket IOU prefix.
pub const PROXY_GRANTING_TICKET_IOU_PREFIX: &str = "PGTIOU";
/// Service ticket id prefix.
pub const SERVICE_TICKET_PREFIX: &str = "ST";
/// Proxy ticket id prefix.
pub const PROXY_TICKET_PREFIX: &str = "PT";
/// Transient session ticket id prefix.
pub const TRANSIENT_SESSION_TICKET_PREFIX: &str = "TST";

/// Kind of the ticket.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TicketType {
    TicketGranting,
    ProxyGranting,
    Service,
    Proxy,
    TransientSession,
}

impl TicketType {
    /// Id prefix of the ticket kind.
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::TicketGranting => TICKET_GRANTING_TICKET_PREFIX,
            Self::ProxyGranting => PROXY_GRANTING_TICKET_PREFIX,
            Self::Service => SERVICE_TICKET_PREFIX,
            Self::Proxy => PROXY_TICKET_PREFIX,
            Self::TransientSession => TRANSIENT_SESSION_TICKET_PREFIX,
        }
    }

    /// Whether a ticket of the `other` kind may be returned when a ticket of
    /// this kind is requested.
    ///
    /// A proxy-granting ticket is a ticket-granting ticket and a proxy ticket
    /// is a service ticket.
    pub fn is_assignable_from(&self, other: TicketType) -> bool {
        matches!(
            (self, other),
            (Self::TicketGranting, Self::TicketGranting)
                | (Self::TicketGranting, Self::ProxyGranting)
                | (Self::ProxyGranting, Self::ProxyGranting)
                | (Self::Service, Self::Service)
                | (Self::Service, Self::Proxy)
                | (Self::Proxy, Self::Proxy)
                | (Self::TransientSession, Self::TransientSession)
        )
    }

    /// All the ticket kinds assignable to this kind.
    pub const fn assignable_types(&self) -> &'static [TicketType] {
        match self {
            Self::TicketGranting => &[Self::TicketGranting, Self::ProxyGranting],
            Self::ProxyGranting => &[Self::ProxyGranting],
            Self::Service => &[Self::Service, Self::Proxy],
            Self::Proxy => &[Self::Proxy],
            Self::TransientSession => &[Self::TransientSession],
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl TryFrom<&str> for TicketType {
    type Error = String;

    /// Get the ticket type by the id prefix.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            TICKET_GRANTING_TICKET_PREFIX => Ok(Self::TicketGranting),
            PROXY_GRANTING_TICKET_PREFIX => Ok(Self::ProxyGranting),
            SERVICE_TICKET_PREFIX => Ok(Self::Service),
            PROXY_TICKET_PREFIX => Ok(Self::Proxy),
            TRANSIENT_SESSION_TICKET_PREFIX => Ok(Self::TransientSession),
            other => Err(other.to_string()),
        }
    }
}

/// A ticket.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "ticket", rename_all = "snake_case")]
pub enum Ticket {
    /// Root of the single sign-on session.
    TicketGranting(TicketGrantingTicket),
    /// Ticket-granting ticket issued to a proxying service.
    ProxyGranting(TicketGrantingTicket),
    /// Single use ticket for a service.
    Service(ServiceTicket),
    /// Service ticket issued from a proxy-granting ticket.
    Proxy(ServiceTicket),
    /// Short living ticket holding the state of the delegated flows.
    TransientSession(TransientSessionTicket),
}

impl Ticket {
    pub fn ticket_type(&self) -> TicketType {
        match self {
            Self::TicketGranting(_) => TicketType::TicketGranting,
            Self::ProxyGranting(_) => TicketType::ProxyGranting,
            Self::Service(_) => TicketType::Service,
            Self::Proxy(_) => TicketType::Proxy,
            Self::TransientSession(_) => TicketType::TransientSession,
        }
    }

    pub fn meta(&self) -> &TicketMetadata {
        match self {
            Self::TicketGranting(t) | Self::ProxyGranting(t) => &t.meta,
            Self::Service(t) | Self::Proxy(t) => &t.meta,
            Self::TransientSession(t) => &t.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut TicketMetadata {
        match self {
            Self::TicketGranting(t) | Self::ProxyGranting(t) => &mut t.meta,
            Self::Service(t) | Self::Proxy(t) => &mut t.meta,
            Self::TransientSession(t) => &mut t.meta,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.meta().creation_time
    }

    pub fn count_of_uses(&self) -> u32 {
        self.meta().count_of_uses
    }

    /// Registry revision of the ticket.
    pub fn version(&self) -> u64 {
        self.meta().version
    }

    /// Id of the ticket-granting ticket this ticket was issued from.
    pub fn granting_ticket_id(&self) -> Option<&str> {
        match self {
            Self::TicketGranting(t) | Self::ProxyGranting(t) => t.granting_ticket_id.as_deref(),
            Self::Service(t) | Self::Proxy(t) => Some(t.granting_ticket_id.as_str()),
            Self::TransientSession(_) => None,
        }
    }

    /// Whether the ticket is expired now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the ticket is expired at the given time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::TicketGranting(t) | Self::ProxyGranting(t) => t.is_expired_at(now),
            Self::Service(t) | Self::Proxy(t) => t.is_expired_at(now),
            Self::TransientSession(t) => t.meta.is_expired_at(false, now),
        }
    }

    /// Expire the ticket irreversibly.
    pub fn mark_ticket_expired(&mut self) {
        self.meta_mut().expired = true;
    }

    /// Record the use of the ticket.
    pub fn update(&mut self, now: DateTime<Utc>) {
        self.meta_mut().update(now);
    }

    /// Ids of the tickets issued from this ticket.
    pub fn child_ticket_ids(&self) -> Vec<String> {
        match self {
            Self::TicketGranting(t) | Self::ProxyGranting(t) => t.child_ticket_ids(),
            _ => Vec::new(),
        }
    }

    pub fn as_granting(&self) -> Option<&TicketGrantingTicket> {
        match self {
            Self::TicketGranting(t) | Self::ProxyGranting(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_granting_mut(&mut self) -> Option<&mut TicketGrantingTicket> {
        match self {
            Self::TicketGranting(t) | Self::ProxyGranting(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceTicket> {
        match self {
            Self::Service(t) | Self::Proxy(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_service_mut(&mut self) -> Option<&mut ServiceTicket> {
        match self {
            Self::Service(t) | Self::Proxy(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_transient(&self) -> Option<&TransientSessionTicket> {
        match self {
            Self::TransientSession(t) => Some(t),
            _ => None,
        }
    }
}
