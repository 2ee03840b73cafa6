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
//! Ticket registry - internal mocking tools.
use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;

use crate::config::Config;
use crate::plugin_manager::PluginManager;
use crate::registry::{TicketRegistryApi, TicketRegistryError};
use crate::server::ServerState;
use crate::ticket::{Ticket, TicketType};

#[cfg(test)]
mock! {
    pub TicketRegistryProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, TicketRegistryError>;
    }

    #[async_trait]
    impl TicketRegistryApi for TicketRegistryProvider {
        async fn add_ticket(
            &self,
            state: &ServerState,
            ticket: Ticket,
        ) -> Result<Ticket, TicketRegistryError>;

        async fn get_ticket<'a>(
            &self,
            state: &ServerState,
            id: &'a str,
            ticket_type: TicketType,
        ) -> Result<Ticket, TicketRegistryError>;

        async fn find_ticket<'a>(
            &self,
            state: &ServerState,
            id: &'a str,
        ) -> Result<Option<Ticket>, TicketRegistryError>;

        async fn update_ticket(
            &self,
            state: &ServerState,
            ticket: Ticket,
        ) -> Result<Ticket, TicketRegistryError>;

        async fn delete_ticket<'a>(
            &self,
            state: &ServerState,
            id: &'a str,
        ) -> Result<usize, TicketRegistryError>;

        async fn get_tickets(&self, state: &ServerState) -> Result<Vec<Ticket>, TicketRegistryError>;

        async fn session_count(&self, state: &ServerState) -> Result<usize, TicketRegistryError>;

        async fn service_ticket_count(
            &self,
            state: &ServerState,
        ) -> Result<usize, TicketRegistryError>;

        async fn clean(&self, state: &ServerState) -> Result<usize, TicketRegistryError>;
    }

    impl Clone for TicketRegistryProvider {
        fn clone(&self) -> Self;
    }
}
