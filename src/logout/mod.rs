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
//! # Single logout
//!
//! When the single sign-on session ends every service which received a
//! ticket within the session is notified with the SAML2 `LogoutRequest`
//! carrying the id of the ticket issued to the service.
//!
//! Services reached through the proxy-granting tickets of the session are
//! notified as well. Notifications are best effort: a failure is recorded in
//! the returned [LogoutRequest] and does not stop the notification of the
//! remaining services.
//!
//! Following dispatchers are available:
//!
//!   - `http` (default): back-channel `POST` to the service URL,
//!   - `noop`: requests are built but not sent.
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

pub mod backend;
pub mod error;
pub mod message;
#[cfg(test)]
mod mock;
pub(crate) mod types;

use crate::authentication::Service;
use crate::config::Config;
use crate::logout::backend::{HttpBackend, LogoutDispatcherBackend, NoopBackend};
use crate::plugin_manager::PluginManager;
use crate::registry::TicketRegistryApi;
use crate::server::ServerState;
use crate::ticket::TicketGrantingTicket;

pub use error::LogoutError;
pub use message::build_logout_message;
#[cfg(test)]
pub use mock::MockLogoutProvider;
pub use types::*;

/// Single logout provider.
#[derive(Clone, Debug)]
pub struct LogoutProvider {
    /// Backend driver.
    backend_driver: Box<dyn LogoutDispatcherBackend>,
    single_logout_enabled: bool,
}

impl LogoutProvider {
    pub fn new(config: &Config, plugin_manager: &PluginManager) -> Result<Self, LogoutError> {
        let mut backend_driver =
            if let Some(driver) = plugin_manager.get_logout_backend(&config.logout.driver) {
                dyn_clone::clone_box(&**driver)
            } else {
                match config.logout.driver.as_str() {
                    "http" => Box::new(HttpBackend::default()) as Box<dyn LogoutDispatcherBackend>,
                    "noop" => Box::new(NoopBackend::default()),
                    _ => {
                        return Err(LogoutError::UnsupportedDriver(
                            config.logout.driver.clone(),
                        ));
                    }
                }
            };
        backend_driver.set_config(config.clone());
        Ok(Self {
            backend_driver,
            single_logout_enabled: config.logout.single_logout_enabled,
        })
    }

    /// Collect the services of the session.
    ///
    /// Pairs of the ticket id and the service, starting with the services of
    /// the ticket-granting ticket followed by the proxy-granting tickets (and
    /// the services they granted tickets for) level by level.
    async fn collect_services(
        &self,
        state: &ServerState,
        ticket: &TicketGrantingTicket,
    ) -> Vec<(String, Service)> {
        let mut services: Vec<(String, Service)> = ticket
            .services
            .iter()
            .map(|(id, service)| (id.clone(), service.clone()))
            .collect();
        let mut seen: HashSet<String> = HashSet::from([ticket.meta.id.clone()]);
        let mut queue: VecDeque<(String, Service)> = ticket
            .proxy_granting_tickets
            .iter()
            .map(|(id, service)| (id.clone(), service.clone()))
            .collect();

        while let Some((pgt_id, service)) = queue.pop_front() {
            if !seen.insert(pgt_id.clone()) {
                continue;
            }
            services.push((pgt_id.clone(), service));
            match state
                .provider
                .get_ticket_registry_provider()
                .find_ticket(state, &pgt_id)
                .await
            {
                Ok(Some(pgt)) => {
                    if let Some(pgt) = pgt.as_granting() {
                        services.extend(
                            pgt.services
                                .iter()
                                .map(|(id, service)| (id.clone(), service.clone())),
                        );
                        queue.extend(
                            pgt.proxy_granting_tickets
                                .iter()
                                .map(|(id, service)| (id.clone(), service.clone())),
                        );
                    }
                }
                Ok(None) => {
                    debug!("Proxy-granting ticket {} is already gone", pgt_id);
                }
                Err(err) => {
                    warn!("Failed to look up the proxy-granting ticket {}: {}", pgt_id, err);
                }
            }
        }
        services
    }
}

#[async_trait]
impl LogoutApi for LogoutProvider {
    #[tracing::instrument(level = "info", skip(self, state, ticket), fields(id = ticket.meta.id))]
    async fn perform_logout(
        &self,
        state: &ServerState,
        ticket: &TicketGrantingTicket,
    ) -> Result<Vec<LogoutRequest>, LogoutError> {
        if !self.single_logout_enabled {
            debug!("Single logout is disabled");
            return Ok(Vec::new());
        }
        let mut requests: Vec<LogoutRequest> = Vec::new();
        for (ticket_id, service) in self.collect_services(state, ticket).await {
            let mut request = LogoutRequest::new(ticket_id, service);
            let message = build_logout_message(&request, Utc::now());
            request.status = match self
                .backend_driver
                .dispatch(state, &request, &message)
                .await
            {
                Ok(status) => status,
                Err(err) => {
                    warn!(
                        "Logout notification of {} failed: {}",
                        request.service.id, err
                    );
                    LogoutRequestStatus::Failure
                }
            };
            requests.push(request);
        }
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use tracing_test::traced_test;

    use super::*;
    use crate::provider::Provider;
    use crate::registry::MockTicketRegistryProvider;
    use crate::tests::get_mocked_state;
    use crate::ticket::Ticket;
    use crate::ticket::types::tests::get_tgt;

    /// Dispatcher recording the messages, failing for the `fail` host.
    #[derive(Clone, Debug, Default)]
    struct RecordingBackend {
        sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl LogoutDispatcherBackend for RecordingBackend {
        fn set_config(&mut self, _config: Config) {}

        async fn dispatch(
            &self,
            _state: &ServerState,
            request: &LogoutRequest,
            message: &str,
        ) -> Result<LogoutRequestStatus, LogoutError> {
            if request.service.id.contains("fail") {
                return Err(LogoutError::InvalidUrl {
                    url: request.service.id.clone(),
                    reason: "test".into(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((request.ticket_id.clone(), message.to_string()));
            Ok(LogoutRequestStatus::Success)
        }
    }

    fn get_provider(backend: &RecordingBackend, enabled: bool) -> LogoutProvider {
        let mut plugin_manager = PluginManager::default();
        plugin_manager.register_logout_backend("recording", Arc::new(backend.clone()));
        let mut config = Config::default();
        config.logout.driver = "recording".into();
        config.logout.single_logout_enabled = enabled;
        LogoutProvider::new(&config, &plugin_manager).unwrap()
    }

    #[test]
    fn test_unsupported_driver() {
        let mut config = Config::default();
        config.logout.driver = "smtp".into();
        assert!(matches!(
            LogoutProvider::new(&config, &PluginManager::default()),
            Err(LogoutError::UnsupportedDriver(..))
        ));
        config.logout.driver = "noop".into();
        assert!(LogoutProvider::new(&config, &PluginManager::default()).is_ok());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_perform_logout() {
        let mut pgt = get_tgt("PGT-1");
        pgt.granting_ticket_id = Some("TGT-1".into());
        pgt.track_service("PT-1", Service::new("https://backend.example.org"), false);
        let mut registry_mock = MockTicketRegistryProvider::default();
        registry_mock
            .expect_find_ticket()
            .withf(|_, id: &'_ str| id == "PGT-1")
            .returning(move |_, _| Ok(Some(Ticket::ProxyGranting(pgt.clone()))));
        let state = get_mocked_state(
            Provider::mocked_builder()
                .ticket_registry(registry_mock)
                .build()
                .unwrap(),
        );

        let mut tgt = get_tgt("TGT-1");
        tgt.track_service("ST-1", Service::new("https://a.example.org"), false);
        tgt.track_service("ST-2", Service::new("https://fail.example.org"), false);
        tgt.add_proxy_granting_ticket("PGT-1", Service::new("https://proxy.example.org/cb"));

        let backend = RecordingBackend::default();
        let requests = get_provider(&backend, true)
            .perform_logout(&state, &tgt)
            .await
            .unwrap();

        assert_eq!(
            vec!["ST-1", "ST-2", "PGT-1", "PT-1"],
            requests
                .iter()
                .map(|r| r.ticket_id.as_str())
                .collect::<Vec<_>>()
        );
        assert_eq!(LogoutRequestStatus::Failure, requests[1].status);
        assert!(
            requests
                .iter()
                .filter(|r| r.ticket_id != "ST-2")
                .all(|r| r.status == LogoutRequestStatus::Success)
        );
        let sent = backend.sent.lock().unwrap();
        assert_eq!(3, sent.len());
        assert!(sent[0].1.contains("<samlp:SessionIndex>ST-1</samlp:SessionIndex>"));
        assert!(logs_contain("Logout notification of https://fail.example.org failed"));
    }

    #[tokio::test]
    async fn test_perform_logout_missing_pgt() {
        let mut registry_mock = MockTicketRegistryProvider::default();
        registry_mock
            .expect_find_ticket()
            .returning(|_, _| Ok(None));
        let state = get_mocked_state(
            Provider::mocked_builder()
                .ticket_registry(registry_mock)
                .build()
                .unwrap(),
        );
        let mut tgt = get_tgt("TGT-1");
        tgt.add_proxy_granting_ticket("PGT-1", Service::new("https://proxy.example.org/cb"));

        let backend = RecordingBackend::default();
        let requests = get_provider(&backend, true)
            .perform_logout(&state, &tgt)
            .await
            .unwrap();
        assert_eq!(1, requests.len());
        assert_eq!("PGT-1", requests[0].ticket_id);
    }

    #[tokio::test]
    async fn test_single_logout_disabled() {
        let state = get_mocked_state(Provider::mocked_builder().build().unwrap());
        let mut tgt = get_tgt("TGT-1");
        tgt.track_service("ST-1", Service::new("https://a.example.org"), false);

        let backend = RecordingBackend::default();
        let requests = get_provider(&backend, false)
            .perform_logout(&state, &tgt)
            .await
            .unwrap();
        assert!(requests.is_empty());
        assert!(backend.sent.lock().unwrap().is_empty());
    }
}
