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
//! Ticket lifecycle against the sql ticket registry.

use chrono::Utc;
use eyre::Result;
use sea_orm::{ActiveModelTrait, Set};

use cas_core::authentication::Service;
use cas_core::cas::{CasError, CentralAuthenticationServiceApi};
use cas_core::config::Config;
use cas_core::db::entity::ticket as db_ticket;
use cas_core::registry::TicketRegistryApi;

mod common;
use common::*;

#[tokio::test]
async fn test_login_and_validate() -> Result<()> {
    let (state, _) = get_sql_state(Config::default()).await?;
    let cas = state.provider.get_cas_provider();
    let tgt = cas
        .create_ticket_granting_ticket(&state, get_credentials("alice")?)
        .await?;
    let st = cas
        .grant_service_ticket(&state, &tgt.meta.id, &Service::new(APP), None)
        .await?;

    assert!(matches!(
        cas.validate_service_ticket(&state, &st.meta.id, &Service::new(BACKEND))
            .await,
        Err(CasError::InvalidTicket(..))
    ));
    let assertion = cas
        .validate_service_ticket(&state, &st.meta.id, &Service::new(APP))
        .await?;
    assert_eq!("alice", assertion.principal().id);
    assert!(matches!(
        cas.validate_service_ticket(&state, &st.meta.id, &Service::new(APP))
            .await,
        Err(CasError::InvalidTicket(..))
    ));
    Ok(())
}

#[tokio::test]
async fn test_logout_cascade() -> Result<()> {
    let (state, dispatcher) = get_sql_state(Config::default()).await?;
    let cas = state.provider.get_cas_provider();
    let registry = state.provider.get_ticket_registry_provider();
    let tgt = cas
        .create_ticket_granting_ticket(&state, get_credentials("alice")?)
        .await?;
    let st = cas
        .grant_service_ticket(&state, &tgt.meta.id, &Service::new(APP), None)
        .await?;
    let pgt = cas
        .create_proxy_granting_ticket(&state, &st.meta.id, get_credentials(PROXY_CALLBACK)?)
        .await?;
    let pt = cas
        .grant_proxy_ticket(&state, &pgt.ticket.meta.id, &Service::new(BACKEND))
        .await?;
    assert_eq!(1, registry.session_count(&state).await?);

    cas.destroy_ticket_granting_ticket(&state, &tgt.meta.id)
        .await?;
    assert!(dispatcher.sent().iter().any(|id| id == BACKEND));
    for id in [&tgt.meta.id, &st.meta.id, &pgt.ticket.meta.id, &pt.meta.id] {
        assert!(registry.find_ticket(&state, id).await?.is_none(), "{id} survived");
    }
    assert_eq!(0, registry.session_count(&state).await?);
    Ok(())
}

#[tokio::test]
async fn test_clean_skips_undecodable() -> Result<()> {
    let mut config = Config::default();
    config.registry.cleaner_batch_size = 2;
    let (state, _) = get_sql_state(config).await?;
    let cas = state.provider.get_cas_provider();
    let registry = state.provider.get_ticket_registry_provider();

    let mut sessions = Vec::new();
    for principal in ["alice", "bob", "carol", "dave", "eve"] {
        sessions.push(
            cas.create_ticket_granting_ticket(&state, get_credentials(principal)?)
                .await?
                .meta
                .id,
        );
    }
    for id in &sessions[1..] {
        let mut ticket = registry
            .find_ticket(&state, id)
            .await?
            .ok_or_else(|| eyre::eyre!("{id} is missing"))?;
        ticket.mark_ticket_expired();
        registry.update_ticket(&state, ticket).await?;
    }
    // Sorts before every generated id, so it lands in the first page.
    db_ticket::ActiveModel {
        id: Set("TGT-0-broken".into()),
        ticket_type: Set("TGT".into()),
        granting_ticket_id: Set(None),
        body: Set("{broken".into()),
        creation_time: Set(Utc::now().naive_utc()),
        version: Set(1),
    }
    .insert(&state.db)
    .await?;

    assert_eq!(4, registry.clean(&state).await?);
    assert!(registry.find_ticket(&state, &sessions[0]).await?.is_some());
    for id in &sessions[1..] {
        assert!(registry.find_ticket(&state, id).await?.is_none(), "{id} survived");
    }
    // The valid session and the broken record.
    assert_eq!(2, registry.session_count(&state).await?);
    Ok(())
}
