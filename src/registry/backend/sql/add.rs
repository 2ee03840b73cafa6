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

use sea_orm::DatabaseConnection;
use sea_orm::entity::*;

use crate::db::entity::ticket as db_ticket;
use crate::error::DbContextExt;
use crate::registry::backend::error::TicketDatabaseError;
use crate::ticket::Ticket;

pub async fn add(db: &DatabaseConnection, mut ticket: Ticket) -> Result<Ticket, TicketDatabaseError> {
    ticket.meta_mut().version = 1;
    let entry = db_ticket::ActiveModel {
        id: Set(ticket.id().to_string()),
        ticket_type: Set(ticket.ticket_type().prefix().to_string()),
        granting_ticket_id: Set(ticket.granting_ticket_id().map(Into::into)),
        body: Set(serde_json::to_string(&ticket)?),
        creation_time: Set(ticket.creation_time().naive_utc()),
        version: Set(super::db_version(&ticket)?),
    };

    entry.insert(db).await.context("persisting the ticket")?;
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    use super::super::tests::get_ticket_mock;
    use super::*;
    use crate::ticket::types::tests::get_st;

    #[tokio::test]
    async fn test_add() {
        let ticket = Ticket::Service(get_st("ST-1", "TGT-1", "https://a.org"));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_ticket_mock(&ticket, 1)]])
            .into_connection();

        let stored = add(&db, ticket.clone()).await.unwrap();
        assert_eq!(1, stored.version());
        assert_eq!(ticket.id(), stored.id());

        for (l, r) in db.into_transaction_log().iter().zip([Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"INSERT INTO "ticket" ("id", "ticket_type", "granting_ticket_id", "body", "creation_time", "version") VALUES ($1, $2, $3, $4, $5, $6) RETURNING "id", "ticket_type", "granting_ticket_id", "body", "creation_time", "version""#,
            [],
        )]) {
            assert_eq!(
                l.statements().iter().map(|x| x.sql.clone()).collect::<Vec<_>>(),
                r.statements().iter().map(|x| x.sql.clone()).collect::<Vec<_>>()
            );
        }
    }
}
