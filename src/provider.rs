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
//! # Provider manager
//!
//! Provider manager provides access to the individual service providers. This
//! gives an easy interact for passing overall manager down to the individual
//! providers that might need to call other providers while also allowing an
//! easy injection of mocked providers.
use derive_builder::Builder;
use mockall_double::double;

use crate::audit::AuditApi;
#[double]
use crate::audit::AuditProvider;
use crate::cas::CentralAuthenticationServiceApi;
#[double]
use crate::cas::CasProvider;
use crate::config::Config;
use crate::error::CoreError;
use crate::logout::LogoutApi;
#[double]
use crate::logout::LogoutProvider;
use crate::plugin_manager::PluginManager;
use crate::registry::TicketRegistryApi;
#[double]
use crate::registry::TicketRegistryProvider;
use crate::services::ServiceRegistryApi;
#[double]
use crate::services::ServiceRegistryProvider;

/// Global provider manager.
#[derive(Builder, Clone)]
// It is necessary to use the owned pattern since otherwise builder invokes clone which immediately
// confuses mockall used in tests
#[builder(pattern = "owned")]
pub struct Provider {
    /// Configuration.
    pub config: Config,
    /// Audit provider.
    audit: AuditProvider,
    /// Central authentication service provider.
    cas: CasProvider,
    /// Logout provider.
    logout: LogoutProvider,
    /// Service registry provider.
    service_registry: ServiceRegistryProvider,
    /// Ticket registry provider.
    ticket_registry: TicketRegistryProvider,
}

impl Provider {
    pub fn new(cfg: Config, plugin_manager: PluginManager) -> Result<Self, CoreError> {
        let audit_provider = AuditProvider::new(&cfg, &plugin_manager)?;
        let cas_provider = CasProvider::new(&cfg, &plugin_manager)?;
        let logout_provider = LogoutProvider::new(&cfg, &plugin_manager)?;
        let service_registry_provider = ServiceRegistryProvider::new(&cfg, &plugin_manager)?;
        let ticket_registry_provider = TicketRegistryProvider::new(&cfg, &plugin_manager)?;

        Ok(Self {
            config: cfg,
            audit: audit_provider,
            cas: cas_provider,
            logout: logout_provider,
            service_registry: service_registry_provider,
            ticket_registry: ticket_registry_provider,
        })
    }

    /// Get the audit provider.
    pub fn get_audit_provider(&self) -> &impl AuditApi {
        &self.audit
    }

    /// Get the central authentication service provider.
    pub fn get_cas_provider(&self) -> &impl CentralAuthenticationServiceApi {
        &self.cas
    }

    /// Get the logout provider.
    pub fn get_logout_provider(&self) -> &impl LogoutApi {
        &self.logout
    }

    /// Get the service registry provider.
    pub fn get_service_registry_provider(&self) -> &impl ServiceRegistryApi {
        &self.service_registry
    }

    /// Get the ticket registry provider.
    pub fn get_ticket_registry_provider(&self) -> &impl TicketRegistryApi {
        &self.ticket_registry
    }
}

#[cfg(test)]
impl Provider {
    pub fn mocked_builder() -> ProviderBuilder {
        let config = Config::default();
        let audit_mock = crate::audit::MockAuditProvider::default();
        let cas_mock = crate::cas::MockCasProvider::default();
        let logout_mock = crate::logout::MockLogoutProvider::default();
        let service_registry_mock = crate::services::MockServiceRegistryProvider::default();
        let ticket_registry_mock = crate::registry::MockTicketRegistryProvider::default();

        ProviderBuilder::default()
            .config(config.clone())
            .audit(audit_mock)
            .cas(cas_mock)
            .logout(logout_mock)
            .service_registry(service_registry_mock)
            .ticket_registry(ticket_registry_mock)
    }
}
