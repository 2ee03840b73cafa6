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
//! Central authentication service types definitions.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::authentication::{Attributes, Authentication, AuthenticationResult, Principal, Service};
use crate::cas::CasError;
use crate::logout::LogoutRequest;
use crate::server::ServerState;
use crate::ticket::{ServiceTicket, Ticket, TicketGrantingTicket, TicketType};

/// Ticket lifecycle interface.
#[async_trait]
pub trait CentralAuthenticationServiceApi: Send + Sync + Clone {
    /// Start the single sign-on session.
    ///
    /// When the authentication was requested for a service the service must
    /// be registered and accessible.
    async fn create_ticket_granting_ticket(
        &self,
        state: &ServerState,
        authentication_result: AuthenticationResult,
    ) -> Result<TicketGrantingTicket, CasError>;

    /// Get the valid ticket of the kind.
    async fn get_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
        ticket_type: TicketType,
    ) -> Result<Ticket, CasError>;

    /// Grant the service ticket from the single sign-on session.
    ///
    /// `authentication_result` is present when the user presented the
    /// credentials with the request.
    async fn grant_service_ticket<'a>(
        &self,
        state: &ServerState,
        tgt_id: &'a str,
        service: &Service,
        authentication_result: Option<AuthenticationResult>,
    ) -> Result<ServiceTicket, CasError>;

    /// Grant the proxy ticket from the proxy-granting ticket.
    async fn grant_proxy_ticket<'a>(
        &self,
        state: &ServerState,
        pgt_id: &'a str,
        service: &Service,
    ) -> Result<ServiceTicket, CasError>;

    /// Validate (and consume) the service or proxy ticket.
    async fn validate_service_ticket<'a>(
        &self,
        state: &ServerState,
        st_id: &'a str,
        service: &Service,
    ) -> Result<Assertion, CasError>;

    /// Issue the proxy-granting ticket for the service of the service ticket.
    ///
    /// The principal of `authentication_result` is the proxy callback URL.
    async fn create_proxy_granting_ticket<'a>(
        &self,
        state: &ServerState,
        st_id: &'a str,
        authentication_result: AuthenticationResult,
    ) -> Result<ProxyGrantingTicketIssued, CasError>;

    /// End the single sign-on session.
    ///
    /// Notifies the services of the session and removes the ticket together
    /// with all its descendants. An unknown ticket results in no requests.
    async fn destroy_ticket_granting_ticket<'a>(
        &self,
        state: &ServerState,
        tgt_id: &'a str,
    ) -> Result<Vec<LogoutRequest>, CasError>;
}

/// Outcome of the successful ticket validation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Assertion {
    /// Authentication of the single sign-on session.
    pub primary_authentication: Authentication,

    /// Authentications of the ticket chain, root first. Contains more than
    /// one entry for the proxy tickets.
    pub chained_authentications: Vec<Authentication>,

    /// Service the ticket was validated for.
    pub service: Service,

    /// Whether the ticket was issued from freshly presented credentials.
    pub from_new_login: bool,

    /// Identifier of the principal presented to the service.
    pub username: String,

    /// Principal attributes released to the service.
    #[serde(default)]
    pub attributes: Attributes,

    /// Services the proxy ticket was obtained through, most recent first.
    #[serde(default)]
    pub proxies: Vec<Service>,
}

impl Assertion {
    /// The authenticated principal.
    pub fn principal(&self) -> &Principal {
        &self.primary_authentication.principal
    }

    pub fn is_proxied(&self) -> bool {
        !self.proxies.is_empty()
    }
}

/// Proxy-granting ticket handed over to the proxy callback.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyGrantingTicketIssued {
    pub ticket: TicketGrantingTicket,

    /// IOU returned to the proxying service in the validation response.
    pub iou: String,
}
