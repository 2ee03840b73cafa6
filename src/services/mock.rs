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
//! Service registry - internal mocking tools.
use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;

use crate::authentication::Service;
use crate::config::Config;
use crate::plugin_manager::PluginManager;
use crate::server::ServerState;
use crate::services::{RegisteredService, ServiceRegistryApi, ServiceRegistryError};

#[cfg(test)]
mock! {
    pub ServiceRegistryProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, ServiceRegistryError>;
    }

    #[async_trait]
    impl ServiceRegistryApi for ServiceRegistryProvider {
        async fn find_service_by(
            &self,
            state: &ServerState,
            service: &Service,
        ) -> Result<Option<RegisteredService>, ServiceRegistryError>;

        async fn find_service_by_id(
            &self,
            state: &ServerState,
            id: i64,
        ) -> Result<Option<RegisteredService>, ServiceRegistryError>;

        async fn list_services(
            &self,
            state: &ServerState,
        ) -> Result<Vec<RegisteredService>, ServiceRegistryError>;

        async fn save_service(
            &self,
            state: &ServerState,
            service: RegisteredService,
        ) -> Result<RegisteredService, ServiceRegistryError>;

        async fn delete_service(
            &self,
            state: &ServerState,
            id: i64,
        ) -> Result<bool, ServiceRegistryError>;
    }

    impl Clone for ServiceRegistryProvider {
        fn clone(&self) -> Self;
    }
}
