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
//! Single logout - internal mocking tools.
use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;

use crate::config::Config;
use crate::logout::{LogoutApi, LogoutError, LogoutRequest};
use crate::plugin_manager::PluginManager;
use crate::server::ServerState;
use crate::ticket::TicketGrantingTicket;

#[cfg(test)]
mock! {
    pub LogoutProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, LogoutError>;
    }

    #[async_trait]
    impl LogoutApi for LogoutProvider {
        async fn perform_logout(
            &self,
            state: &ServerState,
            ticket: &TicketGrantingTicket,
        ) -> Result<Vec<LogoutRequest>, LogoutError>;
    }

    impl Clone for LogoutProvider {
        fn clone(&self) -> Self;
    }
}
