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
//! Single logout types definitions.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authentication::Service;
use crate::logout::LogoutError;
use crate::server::ServerState;
use crate::ticket::TicketGrantingTicket;

/// Single logout interface.
#[async_trait]
pub trait LogoutApi: Send + Sync + Clone {
    /// Notify every service of the single sign-on session that the session
    /// is over.
    ///
    /// Covers the services of the ticket-granting ticket and of all the
    /// proxy-granting tickets chained under it. Failures of the single
    /// notifications are recorded in the returned requests.
    async fn perform_logout(
        &self,
        state: &ServerState,
        ticket: &TicketGrantingTicket,
    ) -> Result<Vec<LogoutRequest>, LogoutError>;
}

/// Outcome of the logout notification.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum LogoutRequestStatus {
    /// Not sent (i.e. the dispatcher is disabled).
    #[default]
    NotAttempted,
    /// Delivered.
    Success,
    /// Delivery failed.
    Failure,
}

/// Back-channel logout notification of a single service.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LogoutRequest {
    /// Id of the logout message.
    pub id: String,

    /// Id of the ticket issued to the service (the session index).
    pub ticket_id: String,

    /// Notified service.
    pub service: Service,

    pub status: LogoutRequestStatus,
}

impl LogoutRequest {
    pub fn new<S: Into<String>>(ticket_id: S, service: Service) -> Self {
        Self {
            id: format!("LR-{}", Uuid::new_v4().simple()),
            ticket_id: ticket_id.into(),
            service,
            status: LogoutRequestStatus::default(),
        }
    }
}
