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
//! # Central authentication service error
use thiserror::Error;

use crate::audit::AuditError;
use crate::registry::TicketRegistryError;
use crate::services::ServiceRegistryError;
use crate::ticket::TicketFactoryError;

/// Central authentication service error.
#[derive(Error, Debug)]
pub enum CasError {
    /// The ticket does not exist, is expired, of an unexpected kind or not
    /// valid for the service.
    #[error("ticket {0} is not valid")]
    InvalidTicket(String),

    /// The service is not registered or the access is denied.
    #[error("service {0} is not authorized to use CAS")]
    UnauthorizedService(String),

    /// The service does not participate in the single sign-on.
    #[error("service {0} is not allowed to use the single sign-on session")]
    UnauthorizedSsoService(String),

    /// The service is not allowed to proxy.
    #[error("service {0} is not authorized to proxy")]
    UnauthorizedProxying(String),

    /// The presented authentication is for another principal than the one of
    /// the single sign-on session.
    #[error("principal {actual} does not match the principal {expected} of the session")]
    MixedPrincipal {
        /// Principal of the session.
        expected: String,
        /// Freshly authenticated principal.
        actual: String,
    },

    /// The ticket could not be created.
    #[error("ticket could not be created: {0}")]
    TicketCreation(String),

    /// Audit trail error.
    #[error(transparent)]
    Audit {
        /// The source of the error.
        #[from]
        source: AuditError,
    },

    /// Ticket registry error.
    #[error(transparent)]
    Registry {
        /// The source of the error.
        source: TicketRegistryError,
    },

    /// Service registry error.
    #[error(transparent)]
    ServiceRegistry {
        /// The source of the error.
        #[from]
        source: ServiceRegistryError,
    },

    /// Ticket factory error.
    #[error(transparent)]
    TicketFactory {
        /// The source of the error.
        source: TicketFactoryError,
    },
}

impl CasError {
    /// Whether the error is caused by a failing dependency rather than by
    /// the request.
    pub fn is_infrastructure(&self) -> bool {
        match self {
            Self::Registry { source } => source.is_infrastructure(),
            Self::Audit { .. } | Self::ServiceRegistry { .. } | Self::TicketFactory { .. } => true,
            _ => false,
        }
    }
}

impl From<TicketRegistryError> for CasError {
    fn from(source: TicketRegistryError) -> Self {
        match source {
            TicketRegistryError::NotFound(id) => Self::InvalidTicket(id),
            TicketRegistryError::BrokenChain(id) => Self::InvalidTicket(id),
            TicketRegistryError::TypeMismatch { id, .. } => Self::InvalidTicket(id),
            other => Self::Registry { source: other },
        }
    }
}

impl From<TicketFactoryError> for CasError {
    fn from(source: TicketFactoryError) -> Self {
        match source {
            TicketFactoryError::InvalidParent { id, .. } => Self::InvalidTicket(id),
            other => Self::TicketFactory { source: other },
        }
    }
}
