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
//! # Ticket factory
//!
//! Constructs the tickets of the correct kind with the configured id
//! generator and expiration policy. Granting a child ticket mutates the
//! (local copy of the) parent ticket, persisting the parent is up to the
//! caller.
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::authentication::{Authentication, Service};
use crate::config::Config;
use crate::ticket::error::TicketFactoryError;
use crate::ticket::expiration::ExpirationPolicy;
use crate::ticket::types::*;
use crate::unique_id::{
    DefaultUniqueTicketIdGenerator, MIN_RANDOM_LENGTH, UniqueTicketIdGenerator,
};

/// Request for a new ticket.
#[derive(Debug)]
pub enum TicketRequest<'a> {
    /// New single sign-on session.
    TicketGranting { authentication: Authentication },
    /// Service ticket issued from the ticket-granting ticket.
    Service {
        parent: &'a mut TicketGrantingTicket,
        service: Service,
        credential_provided: bool,
    },
    /// Proxy ticket issued from the proxy-granting ticket.
    Proxy {
        parent: &'a mut TicketGrantingTicket,
        service: Service,
    },
    /// Proxy-granting ticket issued from the service ticket.
    ProxyGranting {
        parent: &'a mut ServiceTicket,
        authentication: Authentication,
    },
    /// Transient session ticket.
    TransientSession {
        service: Option<Service>,
        properties: BTreeMap<String, String>,
    },
}

/// Default ticket factory.
#[derive(Clone, Debug)]
pub struct DefaultTicketFactory {
    /// Id generators per ticket kind.
    id_generators: HashMap<TicketType, Arc<dyn UniqueTicketIdGenerator>>,
    /// Generator of the proxy-granting ticket IOUs.
    iou_generator: Arc<dyn UniqueTicketIdGenerator>,
    /// Expiration policies per ticket kind.
    expiration_policies: HashMap<TicketType, ExpirationPolicy>,
    /// Track only the most recent session per service in the TGT.
    only_track_most_recent_session: bool,
}

impl DefaultTicketFactory {
    pub fn new(config: &Config) -> Result<Self, TicketFactoryError> {
        if config.ticket_id.random_length < MIN_RANDOM_LENGTH {
            return Err(TicketFactoryError::InvalidConfiguration(format!(
                "ticket id random part must be at least {MIN_RANDOM_LENGTH} characters long"
            )));
        }
        if let Some(suffix) = &config.ticket_id.suffix
            && suffix.contains(|c: char| c.is_whitespace() || c == '-')
        {
            return Err(TicketFactoryError::InvalidConfiguration(format!(
                "ticket id suffix `{suffix}` must not contain whitespaces or dashes"
            )));
        }
        for (name, value) in [
            ("tgt.max_time_to_live", config.tgt.max_time_to_live),
            ("tgt.time_to_kill", config.tgt.time_to_kill),
            ("st.time_to_kill", config.st.time_to_kill),
            ("pgt.max_time_to_live", config.pgt.max_time_to_live),
            ("pgt.time_to_kill", config.pgt.time_to_kill),
            ("pt.time_to_kill", config.pt.time_to_kill),
            ("tst.time_to_kill", config.tst.time_to_kill),
        ] {
            if value < 0 {
                return Err(TicketFactoryError::InvalidConfiguration(format!(
                    "{name} must not be negative"
                )));
            }
        }

        let generator: Arc<dyn UniqueTicketIdGenerator> = Arc::new(
            DefaultUniqueTicketIdGenerator::new(
                config.ticket_id.random_length,
                config.ticket_id.suffix.clone(),
            ),
        );

        let session_policy = ExpirationPolicy::TicketGrantingTicket {
            max_time_to_live_in_seconds: config.tgt.max_time_to_live,
            time_to_kill_in_seconds: config.tgt.time_to_kill,
        };
        let tgt_policy = match config.tgt.remember_me_max_time_to_live {
            Some(remember_me) => ExpirationPolicy::RememberMeDelegating {
                remember_me: Box::new(ExpirationPolicy::HardTimeout {
                    time_to_kill_in_seconds: remember_me,
                }),
                session: Box::new(session_policy),
            },
            None => session_policy,
        };

        let expiration_policies = HashMap::from([
            (TicketType::TicketGranting, tgt_policy),
            (
                TicketType::ProxyGranting,
                ExpirationPolicy::TicketGrantingTicket {
                    max_time_to_live_in_seconds: config.pgt.max_time_to_live,
                    time_to_kill_in_seconds: config.pgt.time_to_kill,
                },
            ),
            (
                TicketType::Service,
                ExpirationPolicy::MultiTimeUseOrTimeout {
                    number_of_uses: config.st.number_of_uses,
                    time_to_kill_in_seconds: config.st.time_to_kill,
                },
            ),
            (
                TicketType::Proxy,
                ExpirationPolicy::MultiTimeUseOrTimeout {
                    number_of_uses: config.pt.number_of_uses,
                    time_to_kill_in_seconds: config.pt.time_to_kill,
                },
            ),
            (
                TicketType::TransientSession,
                ExpirationPolicy::HardTimeout {
                    time_to_kill_in_seconds: config.tst.time_to_kill,
                },
            ),
        ]);

        Ok(Self {
            id_generators: [
                TicketType::TicketGranting,
                TicketType::ProxyGranting,
                TicketType::Service,
                TicketType::Proxy,
                TicketType::TransientSession,
            ]
            .into_iter()
            .map(|kind| (kind, generator.clone()))
            .collect(),
            iou_generator: generator,
            expiration_policies,
            only_track_most_recent_session: config.tgt.only_track_most_recent_session,
        })
    }

    /// Replace the id generator of the ticket kind.
    pub fn with_id_generator(
        mut self,
        ticket_type: TicketType,
        generator: Arc<dyn UniqueTicketIdGenerator>,
    ) -> Self {
        self.id_generators.insert(ticket_type, generator);
        self
    }

    /// Replace the expiration policy of the ticket kind.
    pub fn with_expiration_policy(
        mut self,
        ticket_type: TicketType,
        policy: ExpirationPolicy,
    ) -> Self {
        self.expiration_policies.insert(ticket_type, policy);
        self
    }

    /// Generate the new id for the ticket of the kind.
    pub fn new_ticket_id(&self, ticket_type: TicketType) -> String {
        match self.id_generators.get(&ticket_type) {
            Some(generator) => generator.new_ticket_id(ticket_type.prefix()),
            None => self.iou_generator.new_ticket_id(ticket_type.prefix()),
        }
    }

    /// Generate the proxy-granting ticket IOU handed over to the proxy
    /// callback together with the proxy-granting ticket.
    pub fn new_proxy_granting_ticket_iou(&self) -> String {
        self.iou_generator
            .new_ticket_id(PROXY_GRANTING_TICKET_IOU_PREFIX)
    }

    fn metadata(&self, ticket_type: TicketType) -> TicketMetadata {
        TicketMetadata::new(
            self.new_ticket_id(ticket_type),
            self.expiration_policies
                .get(&ticket_type)
                .cloned()
                .unwrap_or(ExpirationPolicy::HardTimeout {
                    time_to_kill_in_seconds: 0,
                }),
        )
    }

    /// Create the ticket described by the request.
    pub fn create(&self, request: TicketRequest<'_>) -> Result<Ticket, TicketFactoryError> {
        match request {
            TicketRequest::TicketGranting { authentication } => {
                Ok(self.create_ticket_granting_ticket(authentication))
            }
            TicketRequest::Service {
                parent,
                service,
                credential_provided,
            } => self.create_service_ticket(parent, &service, credential_provided),
            TicketRequest::Proxy { parent, service } => self.create_proxy_ticket(parent, &service),
            TicketRequest::ProxyGranting {
                parent,
                authentication,
            } => self.create_proxy_granting_ticket(parent, authentication),
            TicketRequest::TransientSession {
                service,
                properties,
            } => Ok(self.create_transient_session_ticket(service, properties)),
        }
    }

    /// Create the ticket-granting ticket for the authentication.
    pub fn create_ticket_granting_ticket(&self, authentication: Authentication) -> Ticket {
        Ticket::TicketGranting(TicketGrantingTicket::new(
            self.metadata(TicketType::TicketGranting),
            authentication,
        ))
    }

    /// Grant the service ticket from the ticket-granting ticket.
    ///
    /// The usage of the ticket-granting ticket is updated and the new ticket
    /// is recorded in its services.
    pub fn create_service_ticket(
        &self,
        tgt: &mut TicketGrantingTicket,
        service: &Service,
        credential_provided: bool,
    ) -> Result<Ticket, TicketFactoryError> {
        Ok(Ticket::Service(self.grant(
            tgt,
            TicketType::Service,
            service,
            credential_provided,
        )?))
    }

    /// Grant the proxy ticket from the proxy-granting ticket.
    pub fn create_proxy_ticket(
        &self,
        pgt: &mut TicketGrantingTicket,
        service: &Service,
    ) -> Result<Ticket, TicketFactoryError> {
        Ok(Ticket::Proxy(self.grant(
            pgt,
            TicketType::Proxy,
            service,
            false,
        )?))
    }

    fn grant(
        &self,
        parent: &mut TicketGrantingTicket,
        ticket_type: TicketType,
        service: &Service,
        credential_provided: bool,
    ) -> Result<ServiceTicket, TicketFactoryError> {
        let now = Utc::now();
        if parent.is_expired_at(now) {
            return Err(TicketFactoryError::InvalidParent {
                id: parent.meta.id.clone(),
                reason: "ticket is expired".into(),
            });
        }
        let from_new_login = credential_provided || parent.meta.count_of_uses == 0;
        let meta = self.metadata(ticket_type);
        parent.meta.update(now);
        parent.track_service(
            meta.id.clone(),
            service.clone(),
            self.only_track_most_recent_session,
        );
        debug!(
            "Granted {} {} from {}",
            ticket_type, meta.id, parent.meta.id
        );
        Ok(ServiceTicket {
            meta,
            service: service.clone(),
            granting_ticket_id: parent.meta.id.clone(),
            from_new_login,
            granted_ticket_already: false,
        })
    }

    /// Issue the proxy-granting ticket from the service ticket.
    ///
    /// The new ticket is chained under the ticket-granting ticket of the
    /// service ticket. The service ticket can issue only one proxy-granting
    /// ticket. Linking the new ticket into the parent ticket-granting ticket
    /// is up to the caller.
    pub fn create_proxy_granting_ticket(
        &self,
        st: &mut ServiceTicket,
        authentication: Authentication,
    ) -> Result<Ticket, TicketFactoryError> {
        if st.granted_ticket_already {
            return Err(TicketFactoryError::InvalidParent {
                id: st.meta.id.clone(),
                reason: "proxy-granting ticket was already issued".into(),
            });
        }
        if st.is_expired_at(Utc::now()) {
            return Err(TicketFactoryError::InvalidParent {
                id: st.meta.id.clone(),
                reason: "ticket is expired".into(),
            });
        }
        st.granted_ticket_already = true;
        let mut pgt =
            TicketGrantingTicket::new(self.metadata(TicketType::ProxyGranting), authentication);
        pgt.granting_ticket_id = Some(st.granting_ticket_id.clone());
        pgt.proxied_by = Some(st.service.clone());
        Ok(Ticket::ProxyGranting(pgt))
    }

    /// Create the transient session ticket.
    pub fn create_transient_session_ticket(
        &self,
        service: Option<Service>,
        properties: BTreeMap<String, String>,
    ) -> Ticket {
        Ticket::TransientSession(TransientSessionTicket {
            meta: self.metadata(TicketType::TransientSession),
            service,
            properties,
        })
    }
}
