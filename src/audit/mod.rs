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
//! # Audit trail
//!
//! Every ticket operation publishes an [AuditEvent]. The sink is selected
//! with `[audit] driver`:
//!
//!   - `log` (default): structured `tracing` events,
//!   - `noop`: events are dropped.
//!
//! A failing sink aborts the audited operation unless
//! `ignore_audit_failures` is set.
use async_trait::async_trait;
use tracing::warn;

pub mod backend;
pub mod error;
#[cfg(test)]
mod mock;
pub(crate) mod types;

use crate::audit::backend::{AuditSinkBackend, LogBackend, NoopBackend};
use crate::config::Config;
use crate::plugin_manager::PluginManager;
use crate::server::ServerState;

pub use error::AuditError;
#[cfg(test)]
pub use mock::MockAuditProvider;
pub use types::*;

/// Audit provider.
#[derive(Clone, Debug)]
pub struct AuditProvider {
    /// Backend driver.
    backend_driver: Box<dyn AuditSinkBackend>,
    ignore_audit_failures: bool,
}

impl AuditProvider {
    pub fn new(config: &Config, plugin_manager: &PluginManager) -> Result<Self, AuditError> {
        let mut backend_driver =
            if let Some(driver) = plugin_manager.get_audit_backend(&config.audit.driver) {
                dyn_clone::clone_box(&**driver)
            } else {
                match config.audit.driver.as_str() {
                    "log" => Box::new(LogBackend::default()) as Box<dyn AuditSinkBackend>,
                    "noop" => Box::new(NoopBackend::default()),
                    _ => {
                        return Err(AuditError::UnsupportedDriver(config.audit.driver.clone()));
                    }
                }
            };
        backend_driver.set_config(config.clone());
        Ok(Self {
            backend_driver,
            ignore_audit_failures: config.audit.ignore_audit_failures,
        })
    }
}

#[async_trait]
impl AuditApi for AuditProvider {
    async fn record(&self, state: &ServerState, event: AuditEvent) -> Result<(), AuditError> {
        match self.backend_driver.record(state, &event).await {
            Err(err) if self.ignore_audit_failures => {
                warn!("Ignoring audit failure: {}", err);
                Ok(())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tracing_test::traced_test;

    use super::*;
    use crate::provider::Provider;
    use crate::tests::get_mocked_state;

    #[derive(Clone, Debug, Default)]
    struct FailingBackend {}

    #[async_trait]
    impl AuditSinkBackend for FailingBackend {
        fn set_config(&mut self, _config: Config) {}

        async fn record(&self, _state: &ServerState, event: &AuditEvent) -> Result<(), AuditError> {
            Err(AuditError::Sink {
                action: event.action.to_string(),
                reason: "disk full".into(),
            })
        }
    }

    fn get_provider(ignore_audit_failures: bool) -> AuditProvider {
        let mut plugin_manager = PluginManager::default();
        plugin_manager.register_audit_backend("failing", Arc::new(FailingBackend::default()));
        let mut config = Config::default();
        config.audit.driver = "failing".into();
        config.audit.ignore_audit_failures = ignore_audit_failures;
        AuditProvider::new(&config, &plugin_manager).unwrap()
    }

    #[test]
    fn test_unsupported_driver() {
        let mut config = Config::default();
        config.audit.driver = "syslog".into();
        assert!(matches!(
            AuditProvider::new(&config, &PluginManager::default()),
            Err(AuditError::UnsupportedDriver(..))
        ));
    }

    #[tokio::test]
    async fn test_failure_propagated() {
        let state = get_mocked_state(Provider::mocked_builder().build().unwrap());
        assert!(matches!(
            get_provider(false)
                .record(
                    &state,
                    AuditEvent::success(AuditAction::ServiceTicketValidated, "ST-1")
                )
                .await,
            Err(AuditError::Sink { .. })
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failure_ignored() {
        let state = get_mocked_state(Provider::mocked_builder().build().unwrap());
        get_provider(true)
            .record(
                &state,
                AuditEvent::success(AuditAction::ServiceTicketValidated, "ST-1"),
            )
            .await
            .unwrap();
        assert!(logs_contain("Ignoring audit failure"));
    }
}
