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
//! # Service registry
//!
//! Services (the relying web applications) must be registered before
//! tickets are granted for them. A [RegisteredService] matches the service
//! identifiers with a regular expression and carries the policies applied
//! to the service:
//!
//!   - [AccessStrategy]: whether the service may use the single sign-on and
//!     which principal attributes are required,
//!   - [ProxyPolicy]: whether the service may obtain proxy-granting tickets,
//!   - [AttributeReleasePolicy]: which principal attributes are released on
//!     the ticket validation,
//!   - [UsernameAttributeProvider]: which identifier of the principal is
//!     presented to the service.
use async_trait::async_trait;
use validator::Validate;

pub mod backend;
pub mod error;
#[cfg(test)]
mod mock;
pub(crate) mod types;

use crate::authentication::Service;
use crate::config::Config;
use crate::plugin_manager::PluginManager;
use crate::server::ServerState;
use crate::services::backend::{MemoryBackend, ServiceRegistryBackend};

pub use error::ServiceRegistryError;
#[cfg(test)]
pub use mock::MockServiceRegistryProvider;
pub use types::*;

/// Service registry provider.
#[derive(Clone, Debug)]
pub struct ServiceRegistryProvider {
    /// Backend driver.
    backend_driver: Box<dyn ServiceRegistryBackend>,
}

impl ServiceRegistryProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, ServiceRegistryError> {
        let driver_name = &config.service_registry.driver;
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_service_registry_backend(driver_name)
        {
            dyn_clone::clone_box(&**driver)
        } else {
            match driver_name.as_str() {
                "memory" => match &config.service_registry.location {
                    Some(location) => Box::new(MemoryBackend::from_file(location)?)
                        as Box<dyn ServiceRegistryBackend>,
                    None => Box::new(MemoryBackend::default()),
                },
                _ => {
                    return Err(ServiceRegistryError::UnsupportedDriver(
                        driver_name.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());
        Ok(Self { backend_driver })
    }
}

#[async_trait]
impl ServiceRegistryApi for ServiceRegistryProvider {
    /// Find the registered service matching the service.
    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn find_service_by(
        &self,
        state: &ServerState,
        service: &Service,
    ) -> Result<Option<RegisteredService>, ServiceRegistryError> {
        Ok(self
            .list_services(state)
            .await?
            .into_iter()
            .find(|registered| registered.matches(service)))
    }

    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn find_service_by_id(
        &self,
        state: &ServerState,
        id: i64,
    ) -> Result<Option<RegisteredService>, ServiceRegistryError> {
        self.backend_driver.get_service(state, id).await
    }

    /// List registered services ordered by the `evaluation_order` and the
    /// id.
    async fn list_services(
        &self,
        state: &ServerState,
    ) -> Result<Vec<RegisteredService>, ServiceRegistryError> {
        let mut services = self.backend_driver.list_services(state).await?;
        services.sort_by_key(|service| (service.evaluation_order, service.id));
        Ok(services)
    }

    #[tracing::instrument(level = "info", skip(self, state, service), fields(id = service.id))]
    async fn save_service(
        &self,
        state: &ServerState,
        service: RegisteredService,
    ) -> Result<RegisteredService, ServiceRegistryError> {
        service.validate()?;
        self.backend_driver.save_service(state, service).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn delete_service(
        &self,
        state: &ServerState,
        id: i64,
    ) -> Result<bool, ServiceRegistryError> {
        self.backend_driver.delete_service(state, id).await
    }
}
