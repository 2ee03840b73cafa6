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
//! Concurrent modifications of the same ticket.

use eyre::Result;

use cas_core::authentication::Service;
use cas_core::cas::{CasError, CentralAuthenticationServiceApi};
use cas_core::config::Config;
use cas_core::ticket::TicketType;

mod common;
use common::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_grants() -> Result<()> {
    let mut config = Config::default();
    config.registry.update_retries = 100;
    let (state, _) = get_state(config).await?;
    let tgt = state
        .provider
        .get_cas_provider()
        .create_ticket_granting_ticket(&state, get_credentials("alice")?)
        .await?;

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let state = state.clone();
            let tgt_id = tgt.meta.id.clone();
            tokio::spawn(async move {
                state
                    .provider
                    .get_cas_provider()
                    .grant_service_ticket(&state, &tgt_id, &Service::new(APP), None)
                    .await
            })
        })
        .collect();
    let mut granted: u32 = 0;
    for task in tasks {
        if task.await?.is_ok() {
            granted += 1;
        }
    }
    assert_eq!(10, granted);

    let stored = state
        .provider
        .get_cas_provider()
        .get_ticket(&state, &tgt.meta.id, TicketType::TicketGranting)
        .await?;
    assert_eq!(granted, stored.count_of_uses());
    assert_eq!(
        granted,
        stored.as_granting().map(|t| t.services.len()).unwrap_or(0) as u32
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_validations() -> Result<()> {
    let (state, _) = get_state(Config::default()).await?;
    let cas = state.provider.get_cas_provider();
    let tgt = cas
        .create_ticket_granting_ticket(&state, get_credentials("alice")?)
        .await?;
    let st = cas
        .grant_service_ticket(&state, &tgt.meta.id, &Service::new(APP), None)
        .await?;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            let st_id = st.meta.id.clone();
            tokio::spawn(async move {
                state
                    .provider
                    .get_cas_provider()
                    .validate_service_ticket(&state, &st_id, &Service::new(APP))
                    .await
            })
        })
        .collect();
    let mut validated = 0;
    for task in tasks {
        match task.await? {
            Ok(_) => validated += 1,
            Err(CasError::InvalidTicket(..)) => {}
            Err(other) => return Err(other.into()),
        }
    }
    assert_eq!(1, validated);
    Ok(())
}
