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
//! In-memory service registry driver.
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::config::Config;
use crate::server::ServerState;
use crate::services::backend::ServiceRegistryBackend;
use crate::services::{RegisteredService, ServiceRegistryError};

#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    config: Config,
    services: Arc<DashMap<i64, RegisteredService>>,
}

impl MemoryBackend {
    /// Registry preloaded from the JSON file holding the list of registered
    /// services.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ServiceRegistryError> {
        let data = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            ServiceRegistryError::Load {
                path: path.as_ref().display().to_string(),
                source,
            }
        })?;
        let services: Vec<RegisteredService> = serde_json::from_str(&data)?;
        let backend = Self::default();
        for service in services {
            service.validate()?;
            service.compile();
            backend.services.insert(service.id, service);
        }
        info!(
            "Loaded {} registered service(s) from {}",
            backend.services.len(),
            path.as_ref().display()
        );
        Ok(backend)
    }
}

#[async_trait]
impl ServiceRegistryBackend for MemoryBackend {
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    async fn get_service(
        &self,
        _state: &ServerState,
        id: i64,
    ) -> Result<Option<RegisteredService>, ServiceRegistryError> {
        Ok(self.services.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_services(
        &self,
        _state: &ServerState,
    ) -> Result<Vec<RegisteredService>, ServiceRegistryError> {
        Ok(self
            .services
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn save_service(
        &self,
        _state: &ServerState,
        service: RegisteredService,
    ) -> Result<RegisteredService, ServiceRegistryError> {
        service.compile();
        self.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn delete_service(
        &self,
        _state: &ServerState,
        id: i64,
    ) -> Result<bool, ServiceRegistryError> {
        Ok(self.services.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::authentication::Service;
    use crate::provider::Provider;
    use crate::services::types::tests::get_registered_service;
    use crate::tests::get_mocked_state;

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "name": "app", "service_id": "https://app\\.example\\.org/.*"}},
                {{"id": 2, "name": "all", "service_id": "https://.*", "evaluation_order": 100}}
            ]"#
        )
        .unwrap();
        let backend = MemoryBackend::from_file(file.path()).unwrap();
        assert_eq!(2, backend.services.len());
        assert_eq!(100, backend.services.get(&2).unwrap().evaluation_order);
        assert!(backend.services.iter().all(|entry| entry.value().is_compiled()));
    }

    #[tokio::test]
    async fn test_save_compiles_pattern() {
        let state = get_mocked_state(Provider::mocked_builder().build().unwrap());
        let backend = MemoryBackend::default();
        backend
            .save_service(&state, get_registered_service(1, "https://.*"))
            .await
            .unwrap();

        let listed = backend.list_services(&state).await.unwrap();
        assert!(listed[0].is_compiled());
        assert!(listed[0].matches(&Service::new("https://a.org")));
    }

    #[test]
    fn test_from_file_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 1, "name": "app", "service_id": "("}}]"#).unwrap();
        assert!(matches!(
            MemoryBackend::from_file(file.path()),
            Err(ServiceRegistryError::Validation { .. })
        ));
        assert!(matches!(
            MemoryBackend::from_file("/nonexistent/services.json"),
            Err(ServiceRegistryError::Load { .. })
        ));
    }
}
