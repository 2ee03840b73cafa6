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
//! # Ticket registry cleaner
//!
//! Periodic job reclaiming the expired tickets. It runs on its own task and
//! only talks to the registry through [TicketRegistryApi::clean] so the
//! foreground ticket operations are never blocked by it.
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

use crate::registry::TicketRegistryApi;
use crate::server::ServerState;

/// Run the registry cleaner until cancelled.
///
/// Does nothing when the cleaner is disabled in the configuration.
pub async fn run_cleaner(state: ServerState, cancel: CancellationToken) {
    let registry_config = &state.config.registry;
    if !registry_config.cleaner_enabled {
        info!("Ticket registry cleaner is disabled");
        return;
    }
    let start = time::Instant::now() + Duration::from_secs(registry_config.cleaner_start_delay);
    let mut interval = time::interval_at(
        start,
        Duration::from_secs(registry_config.cleaner_repeat_interval.max(1)),
    );
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    info!("Start the ticket registry cleaner");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                trace!("registry cleaner tick");
                match state.provider.get_ticket_registry_provider().clean(&state).await {
                    Ok(count) => trace!("registry cleaner removed {} ticket(s)", count),
                    Err(e) => error!("Error during the ticket registry cleanup: {}", e),
                }
            },
            () = cancel.cancelled() => {
                info!("Cancellation requested. Stopping the ticket registry cleaner.");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::config::Config;
    use crate::provider::Provider;
    use crate::registry::MockTicketRegistryProvider;
    use crate::tests::get_mocked_state_with_config;

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_cleaner_runs_periodically() {
        let mut registry_mock = MockTicketRegistryProvider::default();
        registry_mock
            .expect_clean()
            .times(2)
            .returning(|_| Ok(1));
        let mut config = Config::default();
        config.registry.cleaner_start_delay = 5;
        config.registry.cleaner_repeat_interval = 10;
        let state = get_mocked_state_with_config(
            config,
            Provider::mocked_builder()
                .ticket_registry(registry_mock)
                .build()
                .unwrap(),
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_cleaner(state, cancel.clone()));
        // First run after the start delay, second one after the interval.
        time::sleep(Duration::from_secs(16)).await;
        cancel.cancel();
        handle.await.unwrap();
        assert!(logs_contain("Stopping the ticket registry cleaner"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_cleaner_disabled() {
        let mut config = Config::default();
        config.registry.cleaner_enabled = false;
        let state = get_mocked_state_with_config(
            config,
            Provider::mocked_builder().build().unwrap(),
        );
        run_cleaner(state, CancellationToken::new()).await;
        assert!(logs_contain("Ticket registry cleaner is disabled"));
    }
}
