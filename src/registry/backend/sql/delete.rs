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

use crate::db::entity::prelude::Ticket as DbTicket;
use crate::error::DbContextExt;
use crate::registry::backend::error::TicketDatabaseError;

pub async fn delete<S: AsRef<str>>(
    db: &DatabaseConnection,
    id: S,
) -> Result<bool, TicketDatabaseError> {
    let res = DbTicket::delete_by_id(id.as_ref())
        .exec(db)
        .await
        .context("deleting the ticket")?;
    Ok(res.rows_affected > 0)
}
