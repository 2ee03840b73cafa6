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
//! In-memory ticket registry driver.
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::config::Config;
use crate::registry::TicketRegistryError;
use crate::registry::backend::{TicketPage, TicketRegistryBackend};
use crate::server::ServerState;
use crate::ticket::{Ticket, TicketType};

/// Process local ticket storage.
///
/// Clones share the same storage. Every map shard is individually locked so
/// the compare-and-swap of a single ticket never blocks operations on other
/// tickets.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    config: Config,
    tickets: Arc<DashMap<String, Ticket>>,
}

#[async_trait]
impl TicketRegistryBackend for MemoryBackend {
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    #[tracing::instrument(level = "trace", skip(self, _state, ticket), fields(id = ticket.id()))]
    async fn add_ticket(
        &self,
        _state: &ServerState,
        mut ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError> {
        match self.tickets.entry(ticket.id().to_string()) {
            Entry::Occupied(_) => Err(TicketRegistryError::Duplicate(ticket.id().to_string())),
            Entry::Vacant(entry) => {
                ticket.meta_mut().version = 1;
                entry.insert(ticket.clone());
                Ok(ticket)
            }
        }
    }

    #[tracing::instrument(level = "trace", skip(self, _state))]
    async fn get_ticket<'a>(
        &self,
        _state: &ServerState,
        id: &'a str,
    ) -> Result<Option<Ticket>, TicketRegistryError> {
        Ok(self.tickets.get(id).map(|entry| entry.value().clone()))
    }

    #[tracing::instrument(level = "trace", skip(self, _state, ticket), fields(id = ticket.id()))]
    async fn update_ticket(
        &self,
        _state: &ServerState,
        mut ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError> {
        let Some(mut current) = self.tickets.get_mut(ticket.id()) else {
            return Err(TicketRegistryError::NotFound(ticket.id().to_string()));
        };
        if current.version() != ticket.version() {
            return Err(TicketRegistryError::Conflict(ticket.id().to_string()));
        }
        ticket.meta_mut().version = current.version() + 1;
        *current = ticket.clone();
        Ok(ticket)
    }

    #[tracing::instrument(level = "trace", skip(self, _state))]
    async fn delete_ticket<'a>(
        &self,
        _state: &ServerState,
        id: &'a str,
    ) -> Result<bool, TicketRegistryError> {
        Ok(self.tickets.remove(id).is_some())
    }

    async fn list_tickets(&self, _state: &ServerState) -> Result<Vec<Ticket>, TicketRegistryError> {
        Ok(self
            .tickets
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    /// Only the ids of the page are held while walking the map, the tickets
    /// are cloned once the page is known.
    #[tracing::instrument(level = "trace", skip(self, _state))]
    async fn scan_tickets<'a>(
        &self,
        _state: &ServerState,
        marker: Option<&'a str>,
        limit: usize,
    ) -> Result<TicketPage, TicketRegistryError> {
        let limit = limit.max(1);
        // Max-heap of the smallest ids after the marker.
        let mut page_ids: BinaryHeap<String> = BinaryHeap::with_capacity(limit + 1);
        for entry in self.tickets.iter() {
            let id = entry.key();
            if marker.is_some_and(|marker| id.as_str() <= marker) {
                continue;
            }
            if page_ids.len() < limit {
                page_ids.push(id.clone());
            } else if page_ids.peek().is_some_and(|largest| id < largest) {
                page_ids.pop();
                page_ids.push(id.clone());
            }
        }
        let page_ids = page_ids.into_sorted_vec();
        let next_marker = if page_ids.len() == limit {
            page_ids.last().cloned()
        } else {
            None
        };
        Ok(TicketPage {
            tickets: page_ids
                .iter()
                .filter_map(|id| self.tickets.get(id).map(|entry| entry.value().clone()))
                .collect(),
            undecodable: Vec::new(),
            next_marker,
        })
    }

    async fn count_tickets(
        &self,
        _state: &ServerState,
        ticket_type: TicketType,
    ) -> Result<usize, TicketRegistryError> {
        Ok(self
            .tickets
            .iter()
            .filter(|entry| ticket_type.is_assignable_from(entry.value().ticket_type()))
            .count())
    }
}
