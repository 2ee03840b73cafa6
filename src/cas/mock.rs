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
//! Central authentication service - internal mocking tools.
use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;

use crate::authentication::{AuthenticationResult, Service};
use crate::cas::{Assertion, CasError, CentralAuthenticationServiceApi, ProxyGrantingTicketIssued};
use crate::config::Config;
use crate::logout::LogoutRequest;
use crate::plugin_manager::PluginManager;
use crate::server::ServerState;
use crate::ticket::{ServiceTicket, Ticket, TicketGrantingTicket, TicketType};

#[cfg(test)]
mock! {
    pub CasProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, CasError>;
    }

    #[async_trait]
    impl CentralAuthenticationServiceApi for CasProvider {
        async fn create_ticket_granting_ticket(
            &self,
            state: &ServerState,
            authentication_result: AuthenticationResult,
        ) -> Result<TicketGrantingTicket, CasError>;

        async fn get_ticket<'a>(
            &self,
            state: &ServerState,
            id: &'a str,
            ticket_type: TicketType,
        ) -> Result<Ticket, CasError>;

        async fn grant_service_ticket<'a>(
            &self,
            state: &ServerState,
            tgt_id: &'a str,
            service: &Service,
            authentication_result: Option<AuthenticationResult>,
        ) -> Result<ServiceTicket, CasError>;

        async fn grant_proxy_ticket<'a>(
            &self,
            state: &ServerState,
            pgt_id: &'a str,
            service: &Service,
        ) -> Result<ServiceTicket, CasError>;

        async fn validate_service_ticket<'a>(
            &self,
            state: &ServerState,
            st_id: &'a str,
            service: &Service,
        ) -> Result<Assertion, CasError>;

        async fn create_proxy_granting_ticket<'a>(
            &self,
            state: &ServerState,
            st_id: &'a str,
            authentication_result: AuthenticationResult,
        ) -> Result<ProxyGrantingTicketIssued, CasError>;

        async fn destroy_ticket_granting_ticket<'a>(
            &self,
            state: &ServerState,
            tgt_id: &'a str,
        ) -> Result<Vec<LogoutRequest>, CasError>;
    }

    impl Clone for CasProvider {
        fn clone(&self) -> Self;
    }
}
