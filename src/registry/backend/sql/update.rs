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
use sea_orm::sea_query::Expr;

use crate::db::entity::{prelude::Ticket as DbTicket, ticket as db_ticket};
use crate::error::DbContextExt;
use crate::registry::backend::error::TicketDatabaseError;
use crate::ticket::Ticket;

/// Conditionally replace the ticket.
///
/// The row is only updated when its version still equals the version of the
/// passed ticket. Returns `None` when no row matched.
pub async fn update(
    db: &DatabaseConnection,
    mut ticket: Ticket,
) -> Result<Option<Ticket>, TicketDatabaseError> {
    let current_version = super::db_version(&ticket)?;
    ticket.meta_mut().version = ticket.version().saturating_add(1);
    let next_version = super::db_version(&ticket)?;

    let res = DbTicket::update_many()
        .col_expr(
            db_ticket::Column::Body,
            Expr::value(serde_json::to_string(&ticket)?),
        )
        .col_expr(db_ticket::Column::Version, Expr::value(next_version))
        .filter(db_ticket::Column::Id.eq(ticket.id()))
        .filter(db_ticket::Column::Version.eq(current_version))
        .exec(db)
        .await
        .context("updating the ticket")?;

    if res.rows_affected == 1 {
        Ok(Some(ticket))
    } else {
        Ok(None)
    }
}
