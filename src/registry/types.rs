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
//! Ticket registry types definitions.
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::warn;

use crate::registry::TicketRegistryError;
use crate::server::ServerState;
use crate::ticket::{Ticket, TicketGrantingTicket, TicketType};

/// Maximal number of the granting tickets in one chain.
pub const MAX_CHAIN_LENGTH: usize = 64;

/// Ticket registry interface.
#[async_trait]
pub trait TicketRegistryApi: Send + Sync + Clone {
    /// Store the new ticket.
    async fn add_ticket(
        &self,
        state: &ServerState,
        ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError>;

    /// Get the valid ticket of the expected kind.
    ///
    /// Expired tickets are reported as not found.
    async fn get_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
        ticket_type: TicketType,
    ) -> Result<Ticket, TicketRegistryError>;

    /// Get the stored ticket regardless of its kind and expiration.
    async fn find_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
    ) -> Result<Option<Ticket>, TicketRegistryError>;

    /// Persist the modified ticket.
    ///
    /// The ticket must carry the version it was read with.
    async fn update_ticket(
        &self,
        state: &ServerState,
        ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError>;

    /// Delete the ticket together with all the tickets issued from it.
    ///
    /// Returns the number of deleted tickets.
    async fn delete_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
    ) -> Result<usize, TicketRegistryError>;

    /// List all the stored tickets.
    async fn get_tickets(&self, state: &ServerState) -> Result<Vec<Ticket>, TicketRegistryError>;

    /// Number of the single sign-on sessions.
    async fn session_count(&self, state: &ServerState) -> Result<usize, TicketRegistryError>;

    /// Number of the service and proxy tickets.
    async fn service_ticket_count(&self, state: &ServerState)
    -> Result<usize, TicketRegistryError>;

    /// Get the granting tickets the ticket was issued from, its parent first
    /// and the root of the session last.
    ///
    /// Every ancestor must be a valid granting ticket. A chain looping back
    /// on itself or longer than [MAX_CHAIN_LENGTH] fails with
    /// [TicketRegistryError::BrokenChain].
    async fn get_ancestors(
        &self,
        state: &ServerState,
        ticket: &TicketGrantingTicket,
    ) -> Result<Vec<TicketGrantingTicket>, TicketRegistryError> {
        let mut seen: HashSet<String> = HashSet::from([ticket.meta.id.clone()]);
        let mut ancestors: Vec<TicketGrantingTicket> = Vec::new();
        let mut next = ticket.granting_ticket_id.clone();
        while let Some(id) = next {
            if !seen.insert(id.clone()) || seen.len() > MAX_CHAIN_LENGTH {
                warn!("Ticket chain of {} is broken at {}", ticket.meta.id, id);
                return Err(TicketRegistryError::BrokenChain(ticket.meta.id.clone()));
            }
            let parent = self
                .get_ticket(state, &id, TicketType::TicketGranting)
                .await?;
            let Some(granting) = parent.as_granting() else {
                return Err(TicketRegistryError::NotFound(id));
            };
            next = granting.granting_ticket_id.clone();
            ancestors.push(granting.clone());
        }
        Ok(ancestors)
    }

    /// Get the ticket-granting ticket at the root of the chain of the
    /// ticket. The root is its own root.
    async fn get_root(
        &self,
        state: &ServerState,
        ticket: &TicketGrantingTicket,
    ) -> Result<TicketGrantingTicket, TicketRegistryError> {
        Ok(self
            .get_ancestors(state, ticket)
            .await?
            .pop()
            .unwrap_or_else(|| ticket.clone()))
    }

    /// Remove the expired tickets.
    ///
    /// Single logout is performed for every expired granting ticket. Returns
    /// the number of deleted tickets.
    async fn clean(&self, state: &ServerState) -> Result<usize, TicketRegistryError>;
}
