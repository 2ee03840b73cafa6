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
use sea_orm::query::*;

use crate::db::entity::{prelude::Ticket as DbTicket, ticket as db_ticket};
use crate::error::DbContextExt;
use crate::registry::backend::TicketPage;
use crate::registry::backend::error::TicketDatabaseError;
use crate::ticket::{Ticket, TicketType};

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Ticket>, TicketDatabaseError> {
    let db_entities: Vec<db_ticket::Model> = DbTicket::find()
        .order_by_asc(db_ticket::Column::CreationTime)
        .all(db)
        .await
        .context("listing tickets")?;
    db_entities
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<Ticket>, _>>()
}

/// Read the page of the tickets ordered by the id.
///
/// Rows that can not be decoded are reported in the page instead of failing
/// it.
pub async fn scan(
    db: &DatabaseConnection,
    marker: Option<&str>,
    limit: u64,
) -> Result<TicketPage, TicketDatabaseError> {
    let mut cursor = DbTicket::find().cursor_by(db_ticket::Column::Id);
    cursor.first(limit);
    if let Some(marker) = marker {
        cursor.after(marker);
    }
    let db_entities: Vec<db_ticket::Model> = cursor.all(db).await.context("scanning tickets")?;
    let next_marker = if u64::try_from(db_entities.len()).unwrap_or(u64::MAX) >= limit {
        db_entities.last().map(|row| row.id.clone())
    } else {
        None
    };
    let mut page = TicketPage {
        next_marker,
        ..Default::default()
    };
    for row in db_entities {
        let id = row.id.clone();
        match Ticket::try_from(row) {
            Ok(ticket) => page.tickets.push(ticket),
            Err(err) => page.undecodable.push((id, err.to_string())),
        }
    }
    Ok(page)
}

pub async fn count(
    db: &DatabaseConnection,
    ticket_type: TicketType,
) -> Result<usize, TicketDatabaseError> {
    let count = DbTicket::find()
        .filter(
            db_ticket::Column::TicketType.is_in(
                ticket_type
                    .assignable_types()
                    .iter()
                    .map(|tt| tt.prefix()),
            ),
        )
        .count(db)
        .await
        .context("counting tickets")?;
    Ok(usize::try_from(count).unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, IntoMockRow, MockDatabase, Transaction, Value};
    use std::collections::BTreeMap;

    use super::super::tests::get_ticket_mock;
    use super::*;
    use crate::ticket::types::tests::{get_st, get_tgt};

    #[tokio::test]
    async fn test_list() {
        let tgt = Ticket::TicketGranting(get_tgt("TGT-1"));
        let st = Ticket::Service(get_st("ST-1", "TGT-1", "https://a.org"));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_ticket_mock(&tgt, 1), get_ticket_mock(&st, 2)]])
            .into_connection();

        let tickets = list(&db).await.unwrap();
        assert_eq!(
            vec!["TGT-1", "ST-1"],
            tickets.iter().map(|t| t.id()).collect::<Vec<_>>()
        );
        assert_eq!(Some("TGT-1"), tickets[1].granting_ticket_id());

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "ticket"."id", "ticket"."ticket_type", "ticket"."granting_ticket_id", "ticket"."body", "ticket"."creation_time", "ticket"."version" FROM "ticket" ORDER BY "ticket"."creation_time" ASC"#,
                []
            ),]
        );
    }

    #[tokio::test]
    async fn test_scan() {
        let st = Ticket::Service(get_st("ST-1", "TGT-1", "https://a.org"));
        let tgt = Ticket::TicketGranting(get_tgt("TGT-1"));
        let mut broken = get_ticket_mock(&tgt, 1);
        broken.id = "TGT-0".into();
        broken.body = "{broken".into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                get_ticket_mock(&st, 1),
                broken,
                get_ticket_mock(&tgt, 2),
            ]])
            .append_query_results([vec![get_ticket_mock(&tgt, 2)]])
            .into_connection();

        let page = scan(&db, Some("PGT-1"), 3).await.unwrap();
        assert_eq!(
            vec!["ST-1", "TGT-1"],
            page.tickets.iter().map(|t| t.id()).collect::<Vec<_>>()
        );
        assert_eq!(1, page.undecodable.len());
        assert_eq!("TGT-0", page.undecodable[0].0);
        assert_eq!(Some("TGT-1".to_string()), page.next_marker);

        // Short page ends the scan.
        let page = scan(&db, None, 3).await.unwrap();
        assert_eq!(1, page.tickets.len());
        assert!(page.next_marker.is_none());

        assert_eq!(
            db.into_transaction_log(),
            [
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"SELECT "ticket"."id", "ticket"."ticket_type", "ticket"."granting_ticket_id", "ticket"."body", "ticket"."creation_time", "ticket"."version" FROM "ticket" WHERE "ticket"."id" > $1 ORDER BY "ticket"."id" ASC LIMIT $2"#,
                    ["PGT-1".into(), 3u64.into()]
                ),
                Transaction::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    r#"SELECT "ticket"."id", "ticket"."ticket_type", "ticket"."granting_ticket_id", "ticket"."body", "ticket"."creation_time", "ticket"."version" FROM "ticket" ORDER BY "ticket"."id" ASC LIMIT $1"#,
                    [3u64.into()]
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                BTreeMap::from([("num_items", Into::<Value>::into(3i64))]).into_mock_row(),
            ]])
            .into_connection();

        assert_eq!(3, count(&db, TicketType::TicketGranting).await.unwrap());
        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT COUNT(*) AS num_items FROM (SELECT "ticket"."id", "ticket"."ticket_type", "ticket"."granting_ticket_id", "ticket"."body", "ticket"."creation_time", "ticket"."version" FROM "ticket" WHERE "ticket"."ticket_type" IN ($1, $2)) AS "sub_query""#,
                ["TGT".into(), "PGT".into()]
            ),]
        );
    }
}
