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
//! Audit types definitions.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::audit::AuditError;
use crate::server::ServerState;

/// Audit trail interface.
#[async_trait]
pub trait AuditApi: Send + Sync + Clone {
    /// Record the event.
    async fn record(&self, state: &ServerState, event: AuditEvent) -> Result<(), AuditError>;
}

/// Audited ticket operation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    TicketGrantingTicketCreated,
    TicketGrantingTicketDestroyed,
    ServiceTicketGranted,
    ProxyTicketGranted,
    ServiceTicketValidated,
    ProxyGrantingTicketCreated,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TicketGrantingTicketCreated => "TICKET_GRANTING_TICKET_CREATED",
            Self::TicketGrantingTicketDestroyed => "TICKET_GRANTING_TICKET_DESTROYED",
            Self::ServiceTicketGranted => "SERVICE_TICKET_GRANTED",
            Self::ProxyTicketGranted => "PROXY_TICKET_GRANTED",
            Self::ServiceTicketValidated => "SERVICE_TICKET_VALIDATED",
            Self::ProxyGrantingTicketCreated => "PROXY_GRANTING_TICKET_CREATED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the audited operation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    Success,
    Failure,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        })
    }
}

/// Audit trail record.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AuditEvent {
    pub action: AuditAction,

    pub outcome: AuditOutcome,

    /// Id of the acting principal when known.
    pub principal: Option<String>,

    /// Affected resource (ticket id, service).
    pub resource: String,

    /// Time of the event.
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new<S: Into<String>>(action: AuditAction, outcome: AuditOutcome, resource: S) -> Self {
        Self {
            action,
            outcome,
            principal: None,
            resource: resource.into(),
            at: Utc::now(),
        }
    }

    pub fn success<S: Into<String>>(action: AuditAction, resource: S) -> Self {
        Self::new(action, AuditOutcome::Success, resource)
    }

    pub fn failure<S: Into<String>>(action: AuditAction, resource: S) -> Self {
        Self::new(action, AuditOutcome::Failure, resource)
    }

    pub fn with_principal<S: Into<String>>(mut self, principal: S) -> Self {
        self.principal = Some(principal.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event() {
        let event = AuditEvent::success(AuditAction::ServiceTicketGranted, "ST-1")
            .with_principal("alice");
        assert_eq!(AuditOutcome::Success, event.outcome);
        assert_eq!(Some("alice"), event.principal.as_deref());
        assert_eq!(
            r#""SERVICE_TICKET_GRANTED""#,
            serde_json::to_string(&event.action).unwrap()
        );
        assert_eq!("FAILURE", AuditOutcome::Failure.to_string());
    }
}
