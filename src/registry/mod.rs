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
//! # Ticket registry
//!
//! The ticket registry is the authoritative store of the tickets. Tickets
//! returned by the registry are snapshots: a modification only becomes
//! visible to others once written back with
//! [TicketRegistryApi::update_ticket].
//!
//! Updates of a single ticket are linearizable. Every stored ticket carries
//! a `version` which the backend driver compares and bumps atomically on
//! update, so of two writers that read the same revision only the first one
//! succeeds while the second one receives [TicketRegistryError::Conflict]
//! and must re-read the ticket.
//!
//! Relations between the tickets are kept as ticket ids. Deleting a ticket
//! walks the tree of the tickets issued from it and removes the descendants
//! before their parents.
//!
//! Following drivers are available:
//!
//!   - `memory` (default): process local concurrent map,
//!   - `sql`: the `ticket` table of the configured database.
//!
//! Expired tickets are reclaimed by [TicketRegistryApi::clean] which is
//! periodically invoked by the [cleaner].
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

pub mod backend;
pub mod cleaner;
pub mod error;
#[cfg(test)]
mod mock;
pub(crate) mod types;

use crate::config::Config;
use crate::logout::LogoutApi;
use crate::plugin_manager::PluginManager;
use crate::registry::backend::{MemoryBackend, SqlBackend, TicketRegistryBackend};
use crate::server::ServerState;
use crate::ticket::{Ticket, TicketType};

pub use error::TicketRegistryError;
#[cfg(test)]
pub use mock::MockTicketRegistryProvider;
pub use types::*;

/// Ticket registry provider.
#[derive(Clone, Debug)]
pub struct TicketRegistryProvider {
    /// Backend driver.
    backend_driver: Box<dyn TicketRegistryBackend>,
    /// Number of tickets the cleaner reads in one page.
    batch_size: usize,
}

impl TicketRegistryProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, TicketRegistryError> {
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_ticket_registry_backend(config.registry.driver.clone())
        {
            dyn_clone::clone_box(&**driver)
        } else {
            match config.registry.driver.as_str() {
                "memory" => Box::new(MemoryBackend::default()) as Box<dyn TicketRegistryBackend>,
                "sql" => Box::new(SqlBackend::default()),
                _ => {
                    return Err(TicketRegistryError::UnsupportedDriver(
                        config.registry.driver.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());
        Ok(Self {
            backend_driver,
            batch_size: config.registry.cleaner_batch_size.max(1),
        })
    }

    /// Collect the ticket with all its descendants, parents first.
    async fn collect_tree(
        &self,
        state: &ServerState,
        id: &str,
    ) -> Result<Vec<String>, TicketRegistryError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::from([id.to_string()]);
        let mut tree: Vec<String> = Vec::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(ticket) = self.backend_driver.get_ticket(state, &current).await? {
                queue.extend(ticket.child_ticket_ids());
                tree.push(current);
            }
        }
        Ok(tree)
    }
}

#[async_trait]
impl TicketRegistryApi for TicketRegistryProvider {
    /// Store the new ticket.
    #[tracing::instrument(level = "debug", skip(self, state, ticket), fields(id = ticket.id()))]
    async fn add_ticket(
        &self,
        state: &ServerState,
        ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError> {
        self.backend_driver.add_ticket(state, ticket).await
    }

    /// Get the valid ticket of the expected kind.
    ///
    /// An expired ticket is reported as not found. Expired service tickets
    /// are removed right away while the granting tickets are left to the
    /// cleaner which performs the single logout for them.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
        ticket_type: TicketType,
    ) -> Result<Ticket, TicketRegistryError> {
        let ticket = self
            .backend_driver
            .get_ticket(state, id)
            .await?
            .ok_or_else(|| TicketRegistryError::NotFound(id.to_string()))?;
        if !ticket_type.is_assignable_from(ticket.ticket_type()) {
            return Err(TicketRegistryError::TypeMismatch {
                id: id.to_string(),
                expected: ticket_type,
                actual: ticket.ticket_type(),
            });
        }
        if ticket.is_expired() {
            debug!("Ticket {} is expired", id);
            if ticket.as_granting().is_none()
                && let Err(err) = self.delete_ticket(state, id).await
            {
                warn!("Failed to remove the expired ticket {}: {}", id, err);
            }
            return Err(TicketRegistryError::NotFound(id.to_string()));
        }
        Ok(ticket)
    }

    /// Get the stored ticket.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn find_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
    ) -> Result<Option<Ticket>, TicketRegistryError> {
        self.backend_driver.get_ticket(state, id).await
    }

    /// Persist the modified ticket.
    #[tracing::instrument(level = "debug", skip(self, state, ticket), fields(id = ticket.id(), version = ticket.version()))]
    async fn update_ticket(
        &self,
        state: &ServerState,
        ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError> {
        self.backend_driver.update_ticket(state, ticket).await
    }

    /// Delete the ticket and all its descendants.
    ///
    /// Deleting an unknown ticket is not an error.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn delete_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
    ) -> Result<usize, TicketRegistryError> {
        let tree = self.collect_tree(state, id).await?;
        let mut count: usize = 0;
        for ticket_id in tree.iter().rev() {
            if self.backend_driver.delete_ticket(state, ticket_id).await? {
                count += 1;
            }
        }
        debug!("Deleted {} ticket(s) chained from {}", count, id);
        Ok(count)
    }

    async fn get_tickets(&self, state: &ServerState) -> Result<Vec<Ticket>, TicketRegistryError> {
        self.backend_driver.list_tickets(state).await
    }

    async fn session_count(&self, state: &ServerState) -> Result<usize, TicketRegistryError> {
        self.backend_driver
            .count_tickets(state, TicketType::TicketGranting)
            .await
    }

    async fn service_ticket_count(
        &self,
        state: &ServerState,
    ) -> Result<usize, TicketRegistryError> {
        self.backend_driver
            .count_tickets(state, TicketType::Service)
            .await
    }

    /// Remove the expired tickets.
    ///
    /// The registry is scanned in pages of the configured batch size.
    /// Failures of the single tickets, including the stored records that can
    /// not be decoded, are logged and do not stop the sweep.
    #[tracing::instrument(level = "info", skip(self, state))]
    async fn clean(&self, state: &ServerState) -> Result<usize, TicketRegistryError> {
        let now = Utc::now();
        let mut count: usize = 0;
        let mut marker: Option<String> = None;
        loop {
            let page = self
                .backend_driver
                .scan_tickets(state, marker.as_deref(), self.batch_size)
                .await?;
            for (id, reason) in &page.undecodable {
                warn!("Skipping the undecodable ticket {}: {}", id, reason);
            }
            for ticket in page.tickets.iter().filter(|ticket| ticket.is_expired_at(now)) {
                // Already removed together with an expired ancestor.
                let current = match self.backend_driver.get_ticket(state, ticket.id()).await {
                    Ok(Some(current)) => current,
                    Ok(None) => continue,
                    Err(err) => {
                        warn!("Failed to read the expired ticket {}: {}", ticket.id(), err);
                        continue;
                    }
                };
                if let Some(tgt) = current.as_granting()
                    && let Err(err) = state
                        .provider
                        .get_logout_provider()
                        .perform_logout(state, tgt)
                        .await
                {
                    warn!("Single logout of {} failed: {}", current.id(), err);
                }
                match self.delete_ticket(state, current.id()).await {
                    Ok(deleted) => count += deleted,
                    Err(err) => {
                        warn!("Failed to remove the expired ticket {}: {}", current.id(), err)
                    }
                }
            }
            tokio::task::yield_now().await;
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }
        if count > 0 {
            tracing::info!("Removed {} expired ticket(s)", count);
        }
        Ok(count)
    }
}
