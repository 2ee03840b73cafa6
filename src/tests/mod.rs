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

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::provider::Provider;
use crate::server::{Server, ServerState};

pub(crate) fn get_mocked_state(provider: Provider) -> ServerState {
    get_mocked_state_with_config(Config::default(), provider)
}

pub(crate) fn get_mocked_state_with_config(config: Config, provider: Provider) -> ServerState {
    Arc::new(Server::new(
        config,
        DatabaseConnection::Disconnected,
        provider,
    ))
}
