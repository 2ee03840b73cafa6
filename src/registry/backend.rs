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
//! Ticket registry: Backends.
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::config::Config;
use crate::registry::TicketRegistryError;
use crate::server::ServerState;
use crate::ticket::{Ticket, TicketType};

pub mod error;
pub mod memory;
pub mod sql;

pub use memory::MemoryBackend;
pub use sql::SqlBackend;

/// TicketRegistryBackend trait.
///
/// Backend driver interface expected by the ticket registry provider. The
/// driver stores single tickets, relations between the tickets are handled
/// by the provider.
///
/// Every stored ticket carries the registry `version`. Drivers must make
/// [TicketRegistryBackend::update_ticket] an atomic compare-and-swap on it.
#[async_trait]
pub trait TicketRegistryBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config.
    fn set_config(&mut self, config: Config);

    /// Store the new ticket.
    ///
    /// Fails with [TicketRegistryError::Duplicate] when the ticket with the
    /// same id already exists. Returns the stored ticket with the initial
    /// version.
    async fn add_ticket(
        &self,
        state: &ServerState,
        ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError>;

    /// Get the ticket by the id regardless of its expiration.
    async fn get_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
    ) -> Result<Option<Ticket>, TicketRegistryError>;

    /// Replace the stored ticket when its version matches.
    ///
    /// Fails with [TicketRegistryError::Conflict] when the stored version
    /// differs and with [TicketRegistryError::NotFound] when the ticket is
    /// gone. Returns the stored ticket with the new version.
    async fn update_ticket(
        &self,
        state: &ServerState,
        ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError>;

    /// Delete the single ticket. Returns whether the ticket existed.
    async fn delete_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
    ) -> Result<bool, TicketRegistryError>;

    /// List all the stored tickets.
    async fn list_tickets(&self, state: &ServerState) -> Result<Vec<Ticket>, TicketRegistryError>;

    /// Read at most `limit` tickets ordered by the id, starting after the
    /// `marker` id.
    ///
    /// Records that can not be decoded do not fail the page and are reported
    /// in [TicketPage::undecodable].
    async fn scan_tickets<'a>(
        &self,
        state: &ServerState,
        marker: Option<&'a str>,
        limit: usize,
    ) -> Result<TicketPage, TicketRegistryError>;

    /// Count the tickets assignable to the type.
    async fn count_tickets(
        &self,
        state: &ServerState,
        ticket_type: TicketType,
    ) -> Result<usize, TicketRegistryError>;
}

dyn_clone::clone_trait_object!(TicketRegistryBackend);

/// Page of the stored tickets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TicketPage {
    /// Decoded tickets ordered by the id.
    pub tickets: Vec<Ticket>,

    /// Ids of the records that could not be decoded together with the reason.
    pub undecodable: Vec<(String, String)>,

    /// Marker of the next page. `None` once the scan is complete.
    pub next_marker: Option<String>,
}
