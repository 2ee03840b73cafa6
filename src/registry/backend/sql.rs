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
//! SQL ticket registry driver.
//!
//! Tickets are stored as JSON documents in the `ticket` table. The kind, the
//! parent ticket-granting ticket and the registry version are kept in the
//! dedicated columns so that they can be filtered on.
use async_trait::async_trait;

use crate::config::Config;
use crate::db::entity::ticket as db_ticket;
use crate::error::DatabaseError;
use crate::registry::TicketRegistryError;
use crate::registry::backend::{TicketPage, TicketRegistryBackend};
use crate::registry::backend::error::TicketDatabaseError;
use crate::server::ServerState;
use crate::ticket::{Ticket, TicketType};

mod add;
mod delete;
mod get;
mod list;
mod update;

#[derive(Clone, Debug, Default)]
pub struct SqlBackend {
    pub config: Config,
}

#[async_trait]
impl TicketRegistryBackend for SqlBackend {
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    #[tracing::instrument(level = "debug", skip(self, state, ticket), fields(id = ticket.id()))]
    async fn add_ticket(
        &self,
        state: &ServerState,
        ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError> {
        let id = ticket.id().to_string();
        match add::add(&state.db, ticket).await {
            Ok(ticket) => Ok(ticket),
            Err(TicketDatabaseError::Database {
                source: DatabaseError::Conflict { .. },
            }) => Err(TicketRegistryError::Duplicate(id)),
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
    ) -> Result<Option<Ticket>, TicketRegistryError> {
        Ok(get::get(&state.db, id).await?)
    }

    #[tracing::instrument(level = "debug", skip(self, state, ticket), fields(id = ticket.id()))]
    async fn update_ticket(
        &self,
        state: &ServerState,
        ticket: Ticket,
    ) -> Result<Ticket, TicketRegistryError> {
        let id = ticket.id().to_string();
        if let Some(updated) = update::update(&state.db, ticket).await? {
            return Ok(updated);
        }
        if get::get(&state.db, &id).await?.is_some() {
            Err(TicketRegistryError::Conflict(id))
        } else {
            Err(TicketRegistryError::NotFound(id))
        }
    }

    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn delete_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
    ) -> Result<bool, TicketRegistryError> {
        Ok(delete::delete(&state.db, id).await?)
    }

    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn list_tickets(&self, state: &ServerState) -> Result<Vec<Ticket>, TicketRegistryError> {
        Ok(list::list(&state.db).await?)
    }

    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn scan_tickets<'a>(
        &self,
        state: &ServerState,
        marker: Option<&'a str>,
        limit: usize,
    ) -> Result<TicketPage, TicketRegistryError> {
        let limit = u64::try_from(limit.max(1)).unwrap_or(u64::MAX);
        Ok(list::scan(&state.db, marker, limit).await?)
    }

    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn count_tickets(
        &self,
        state: &ServerState,
        ticket_type: TicketType,
    ) -> Result<usize, TicketRegistryError> {
        Ok(list::count(&state.db, ticket_type).await?)
    }
}

impl TryFrom<db_ticket::Model> for Ticket {
    type Error = TicketDatabaseError;

    fn try_from(value: db_ticket::Model) -> Result<Self, Self::Error> {
        let ticket_type = TicketType::try_from(value.ticket_type.as_str())
            .map_err(TicketDatabaseError::InvalidTicketType)?;
        let mut ticket: Ticket = serde_json::from_str(&value.body)?;
        if ticket.ticket_type() != ticket_type {
            return Err(TicketDatabaseError::InvalidTicketType(value.ticket_type));
        }
        ticket.meta_mut().version = u64::try_from(value.version)
            .map_err(|_| TicketDatabaseError::VersionOutOfRange(value.version.to_string()))?;
        Ok(ticket)
    }
}

/// Registry version of the ticket as stored in the database.
fn db_version(ticket: &Ticket) -> Result<i64, TicketDatabaseError> {
    i64::try_from(ticket.version())
        .map_err(|_| TicketDatabaseError::VersionOutOfRange(ticket.version().to_string()))
}

#[cfg(test)]
mod tests {
    use crate::db::entity::ticket as db_ticket;
    use crate::ticket::Ticket;

    pub(super) fn get_ticket_mock(ticket: &Ticket, version: i64) -> db_ticket::Model {
        db_ticket::Model {
            id: ticket.id().into(),
            ticket_type: ticket.ticket_type().prefix().into(),
            granting_ticket_id: ticket.granting_ticket_id().map(Into::into),
            body: serde_json::to_string(ticket).unwrap(),
            creation_time: ticket.creation_time().naive_utc(),
            version,
        }
    }

    #[test]
    fn test_from_model() {
        let ticket = Ticket::TicketGranting(crate::ticket::types::tests::get_tgt("TGT-1"));
        let restored: Ticket = get_ticket_mock(&ticket, 3).try_into().unwrap();
        assert_eq!(3, restored.version());
        assert_eq!("TGT-1", restored.id());

        let mut broken = get_ticket_mock(&ticket, 1);
        broken.ticket_type = "ST".into();
        assert!(Ticket::try_from(broken).is_err());

        let mut broken = get_ticket_mock(&ticket, 1);
        broken.ticket_type = "FOO".into();
        assert!(Ticket::try_from(broken).is_err());

        assert!(Ticket::try_from(get_ticket_mock(&ticket, -1)).is_err());
    }
}
