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
//! # Server state
//!
//! Everything a ticket operation needs is reachable from the [ServerState]
//! passed down to the providers and their backend drivers.
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::CoreError;
use crate::provider::Provider;

// Placing the Server behind Arc is necessary to address DatabaseConnection
// not implementing Clone.
pub struct Server {
    /// Config file
    pub config: Config,
    /// Providers
    pub provider: Provider,
    /// Database connection. `Disconnected` unless the sql ticket registry is
    /// used.
    pub db: DatabaseConnection,

    /// Shutdown flag
    pub shutdown: bool,
}

pub type ServerState = Arc<Server>;

impl Server {
    pub fn new(cfg: Config, db: DatabaseConnection, provider: Provider) -> Self {
        Self {
            config: cfg,
            provider,
            db,
            shutdown: false,
        }
    }

    pub async fn terminate(&self) -> Result<(), CoreError> {
        info!("Terminating CAS");
        Ok(())
    }
}
