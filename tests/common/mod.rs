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
//! Shared setup of the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use eyre::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::{Arc, Mutex};

use cas_core::authentication::{
    AuthenticationBuilder, AuthenticationResult, AuthenticationResultBuilder, Principal,
};
use cas_core::config::Config;
use cas_core::db_migration::Migrator;
use cas_core::logout::backend::LogoutDispatcherBackend;
use cas_core::logout::{LogoutError, LogoutRequest, LogoutRequestStatus};
use cas_core::plugin_manager::PluginManager;
use cas_core::provider::Provider;
use cas_core::server::{Server, ServerState};
use cas_core::services::{
    AttributeReleasePolicy, ProxyPolicy, RegisteredServiceBuilder, ServiceRegistryApi,
};

pub const APP: &str = "https://app.example.org";
pub const BACKEND: &str = "https://backend.example.org/api";
pub const PROXY_CALLBACK: &str = "https://app.example.org/proxy/callback";

/// Logout dispatcher remembering the notified services.
#[derive(Clone, Debug, Default)]
pub struct RecordingDispatcher {
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LogoutDispatcherBackend for RecordingDispatcher {
    fn set_config(&mut self, _config: Config) {}

    async fn dispatch(
        &self,
        _state: &ServerState,
        request: &LogoutRequest,
        _message: &str,
    ) -> Result<LogoutRequestStatus, LogoutError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.service.id.clone());
        }
        Ok(LogoutRequestStatus::Success)
    }
}

/// Build the server state with the in-memory ticket registry.
pub async fn get_state(config: Config) -> Result<(ServerState, RecordingDispatcher)> {
    get_state_with_db(config, DatabaseConnection::Disconnected).await
}

/// Build the server state with the sql ticket registry on the in-memory
/// SQLite database.
pub async fn get_sql_state(mut config: Config) -> Result<(ServerState, RecordingDispatcher)> {
    // every connection to `sqlite::memory:` opens a separate database
    let opt = ConnectOptions::new("sqlite::memory:")
        .max_connections(1)
        .sqlx_logging(false)
        .to_owned();
    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;
    config.registry.driver = "sql".into();
    get_state_with_db(config, db).await
}

async fn get_state_with_db(
    mut config: Config,
    db: DatabaseConnection,
) -> Result<(ServerState, RecordingDispatcher)> {
    let dispatcher = RecordingDispatcher::default();
    let mut plugin_manager = PluginManager::default();
    plugin_manager.register_logout_backend("recording", Arc::new(dispatcher.clone()));
    config.logout.driver = "recording".into();

    let provider = Provider::new(config.clone(), plugin_manager)?;
    let state = Arc::new(Server::new(config, db, provider));
    register_services(&state).await?;
    Ok((state, dispatcher))
}

async fn register_services(state: &ServerState) -> Result<()> {
    let services = state.provider.get_service_registry_provider();
    services
        .save_service(
            state,
            RegisteredServiceBuilder::default()
                .id(1)
                .name("app")
                .service_id(r"https://app\.example\.org(/.*)?")
                .proxy_policy(ProxyPolicy::RegexMatching {
                    pattern: r"https://app\.example\.org/proxy/.*".into(),
                })
                .attribute_release_policy(AttributeReleasePolicy::ReturnAll)
                .build()?,
        )
        .await?;
    services
        .save_service(
            state,
            RegisteredServiceBuilder::default()
                .id(2)
                .name("backend")
                .service_id(r"https://backend\.example\.org(/.*)?")
                .build()?,
        )
        .await?;
    Ok(())
}

/// Authentication of the principal with freshly presented credentials.
pub fn get_credentials(principal: &str) -> Result<AuthenticationResult> {
    Ok(AuthenticationResultBuilder::default()
        .authentication(
            AuthenticationBuilder::default()
                .principal(Principal::new(principal))
                .build()?,
        )
        .credential_provided(true)
        .build()?)
}
