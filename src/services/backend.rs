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
//! Service registry: Backends.
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::config::Config;
use crate::server::ServerState;
use crate::services::{RegisteredService, ServiceRegistryError};

pub mod memory;

pub use memory::MemoryBackend;

/// ServiceRegistryBackend trait.
///
/// Backend driver interface expected by the service registry provider.
#[async_trait]
pub trait ServiceRegistryBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config.
    fn set_config(&mut self, config: Config);

    /// Get the registered service.
    async fn get_service(
        &self,
        state: &ServerState,
        id: i64,
    ) -> Result<Option<RegisteredService>, ServiceRegistryError>;

    /// List all the registered services.
    async fn list_services(
        &self,
        state: &ServerState,
    ) -> Result<Vec<RegisteredService>, ServiceRegistryError>;

    /// Store the registered service replacing the one with the same id.
    async fn save_service(
        &self,
        state: &ServerState,
        service: RegisteredService,
    ) -> Result<RegisteredService, ServiceRegistryError>;

    /// Delete the registered service.
    async fn delete_service(
        &self,
        state: &ServerState,
        id: i64,
    ) -> Result<bool, ServiceRegistryError>;
}

dyn_clone::clone_trait_object!(ServiceRegistryBackend);
