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
//! # Central authentication service
//!
//! Orchestrates the ticket lifecycle on top of the ticket registry:
//!
//!   - a successful authentication starts the single sign-on session
//!     represented by the ticket-granting ticket (TGT),
//!   - service tickets (ST) are granted from the TGT for the registered
//!     services and consumed by their validation,
//!   - a service allowed to proxy exchanges its ST for a proxy-granting ticket
//!     (PGT) which grants proxy tickets (PT) for other services,
//!   - destroying the TGT notifies every service of the session and removes
//!     the whole ticket tree.
//!
//! Tickets read from the registry are snapshots. Modifying a ticket is a
//! read-modify-write cycle guarded by the ticket version: a concurrent
//! modification is detected by the registry, the work done in the attempt is
//! rolled back and the cycle is repeated at most `[registry] update_retries`
//! times.
//!
//! Every lifecycle operation publishes an [AuditEvent](crate::audit::AuditEvent).
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

pub mod error;
#[cfg(test)]
mod mock;
pub(crate) mod types;

use crate::audit::{AuditAction, AuditApi, AuditEvent, AuditOutcome};
use crate::authentication::{Authentication, AuthenticationResult, Principal, Service};
use crate::config::Config;
use crate::logout::{LogoutApi, LogoutRequest};
use crate::plugin_manager::PluginManager;
use crate::registry::{TicketRegistryApi, TicketRegistryError};
use crate::server::ServerState;
use crate::services::{RegisteredService, ServiceRegistryApi};
use crate::ticket::{
    DefaultTicketFactory, ServiceTicket, Ticket, TicketGrantingTicket, TicketType,
};

pub use error::CasError;
#[cfg(test)]
pub use mock::MockCasProvider;
pub use types::*;

/// Central authentication service provider.
#[derive(Clone, Debug)]
pub struct CasProvider {
    factory: DefaultTicketFactory,
    /// Maximal number of the read-modify-write attempts.
    update_retries: usize,
}

/// Granting tickets from the ticket up to the root.
struct TicketChain {
    /// Root first.
    authentications: Vec<Authentication>,
    /// Most recent first.
    proxies: Vec<Service>,
}

impl CasProvider {
    pub fn new(config: &Config, _plugin_manager: &PluginManager) -> Result<Self, CasError> {
        Ok(Self {
            factory: DefaultTicketFactory::new(config)?,
            update_retries: config.registry.update_retries.max(1),
        })
    }

    /// Publish the audit event of the operation and pass its result through.
    ///
    /// A failure to record the event of the failed operation does not hide
    /// the original error.
    async fn finish<T: Send>(
        &self,
        state: &ServerState,
        event: AuditEvent,
        result: Result<T, CasError>,
    ) -> Result<T, CasError> {
        let recorded = state
            .provider
            .get_audit_provider()
            .record(state, event)
            .await;
        match (result, recorded) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(audit_err)) => {
                warn!("Failed to record the audit event: {}", audit_err);
                Err(err)
            }
        }
    }

    /// Remove the ticket created within the abandoned attempt.
    async fn discard_ticket(&self, state: &ServerState, id: &str) {
        if let Err(err) = state
            .provider
            .get_ticket_registry_provider()
            .delete_ticket(state, id)
            .await
        {
            warn!("Failed to remove the abandoned ticket {}: {}", id, err);
        }
    }

    /// Find the registered service and check the access of the principal.
    async fn ensure_service_access(
        &self,
        state: &ServerState,
        service: &Service,
        principal: &Principal,
    ) -> Result<RegisteredService, CasError> {
        let Some(registered) = state
            .provider
            .get_service_registry_provider()
            .find_service_by(state, service)
            .await?
        else {
            warn!("Service {} is not registered", service.id);
            return Err(CasError::UnauthorizedService(service.id.clone()));
        };
        if !registered.access_strategy.is_service_access_allowed() {
            warn!("Service {} is disabled", service.id);
            return Err(CasError::UnauthorizedService(service.id.clone()));
        }
        if !registered
            .access_strategy
            .does_principal_have_required_attributes(&principal.attributes)
        {
            warn!(
                "Principal {} lacks the attributes required by {}",
                principal.id, service.id
            );
            return Err(CasError::UnauthorizedService(service.id.clone()));
        }
        Ok(registered)
    }

    /// Check that the service may obtain the proxy-granting ticket delivered
    /// to the callback.
    async fn ensure_proxy_allowed(
        &self,
        state: &ServerState,
        service: &Service,
        callback: &Service,
    ) -> Result<(), CasError> {
        let registered = state
            .provider
            .get_service_registry_provider()
            .find_service_by(state, service)
            .await?
            .filter(|rs| rs.access_strategy.is_service_access_allowed())
            .ok_or_else(|| CasError::UnauthorizedService(service.id.clone()))?;
        if !registered.proxy_policy.is_allowed_to_proxy()
            || !registered.proxy_policy.is_allowed_proxy_callback_url(callback)
        {
            warn!(
                "Service {} is not allowed to proxy through {}",
                service.id, callback.id
            );
            return Err(CasError::UnauthorizedProxying(service.id.clone()));
        }
        Ok(())
    }

    /// Walk the granting tickets from the ticket up to the root of the
    /// session.
    async fn resolve_chain(
        &self,
        state: &ServerState,
        leaf: &TicketGrantingTicket,
    ) -> Result<TicketChain, CasError> {
        let ancestors = state
            .provider
            .get_ticket_registry_provider()
            .get_ancestors(state, leaf)
            .await?;
        let mut authentications = vec![leaf.authentication.clone()];
        let mut proxies: Vec<Service> = leaf.proxied_by.iter().cloned().collect();
        for granting in ancestors {
            authentications.push(granting.authentication);
            proxies.extend(granting.proxied_by);
        }
        authentications.reverse();
        Ok(TicketChain {
            authentications,
            proxies,
        })
    }

    /// Check whether the ticket may be granted from the parent.
    async fn ensure_grant_allowed(
        &self,
        state: &ServerState,
        parent: &TicketGrantingTicket,
        parent_type: TicketType,
        service: &Service,
        authentication_result: Option<&AuthenticationResult>,
    ) -> Result<(), CasError> {
        if parent_type == TicketType::ProxyGranting {
            let chain = self.resolve_chain(state, parent).await?;
            let Some(root) = chain.authentications.first() else {
                return Err(CasError::InvalidTicket(parent.meta.id.clone()));
            };
            self.ensure_service_access(state, service, &root.principal)
                .await?;
            let Some(proxied_by) = &parent.proxied_by else {
                return Err(CasError::UnauthorizedProxying(service.id.clone()));
            };
            let allowed = state
                .provider
                .get_service_registry_provider()
                .find_service_by(state, proxied_by)
                .await?
                .is_some_and(|rs| {
                    rs.access_strategy.is_service_access_allowed()
                        && rs.proxy_policy.is_allowed_to_proxy()
                });
            if !allowed {
                return Err(CasError::UnauthorizedProxying(proxied_by.id.clone()));
            }
            return Ok(());
        }

        let principal = &parent.authentication.principal;
        let registered = self
            .ensure_service_access(state, service, principal)
            .await?;
        let credential_provided = match authentication_result {
            Some(result) => {
                let actual = &result.authentication.principal.id;
                if *actual != principal.id {
                    return Err(CasError::MixedPrincipal {
                        expected: principal.id.clone(),
                        actual: actual.clone(),
                    });
                }
                result.credential_provided
            }
            None => false,
        };
        if parent.meta.count_of_uses > 0
            && !credential_provided
            && !registered.access_strategy.is_service_access_allowed_for_sso()
        {
            warn!(
                "Service {} requires the credentials to be presented",
                service.id
            );
            return Err(CasError::UnauthorizedSsoService(service.id.clone()));
        }
        Ok(())
    }

    async fn start_session(
        &self,
        state: &ServerState,
        authentication_result: &AuthenticationResult,
    ) -> Result<TicketGrantingTicket, CasError> {
        if let Some(service) = &authentication_result.service {
            self.ensure_service_access(
                state,
                service,
                &authentication_result.authentication.principal,
            )
            .await?;
        }
        let registry = state.provider.get_ticket_registry_provider();
        let mut duplicate_retried = false;
        loop {
            let ticket = self
                .factory
                .create_ticket_granting_ticket(authentication_result.authentication.clone());
            match registry.add_ticket(state, ticket).await {
                Ok(Ticket::TicketGranting(tgt)) => return Ok(tgt),
                Ok(other) => return Err(CasError::TicketCreation(other.id().to_string())),
                Err(TicketRegistryError::Duplicate(id)) if !duplicate_retried => {
                    warn!("Generated ticket id {} is already used, retrying", id);
                    duplicate_retried = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Grant the service (or proxy) ticket from the granting ticket.
    async fn issue_ticket(
        &self,
        state: &ServerState,
        parent_id: &str,
        parent_type: TicketType,
        service: &Service,
        authentication_result: Option<&AuthenticationResult>,
    ) -> Result<ServiceTicket, CasError> {
        let registry = state.provider.get_ticket_registry_provider();
        let credential_provided = authentication_result.is_some_and(|res| res.credential_provided);
        let mut duplicate_retried = false;
        let mut attempt = 0;
        while attempt < self.update_retries {
            let mut parent = registry.get_ticket(state, parent_id, parent_type).await?;
            let Some(granting) = parent.as_granting_mut() else {
                return Err(CasError::InvalidTicket(parent_id.to_string()));
            };
            self.ensure_grant_allowed(state, granting, parent_type, service, authentication_result)
                .await?;
            let ticket = match parent_type {
                TicketType::ProxyGranting => self.factory.create_proxy_ticket(granting, service)?,
                _ => self
                    .factory
                    .create_service_ticket(granting, service, credential_provided)?,
            };
            let Some(issued) = ticket.as_service().cloned() else {
                return Err(CasError::TicketCreation(ticket.id().to_string()));
            };

            match registry.add_ticket(state, ticket).await {
                Ok(_) => {}
                Err(TicketRegistryError::Duplicate(id)) if !duplicate_retried => {
                    warn!("Generated ticket id {} is already used, retrying", id);
                    duplicate_retried = true;
                    continue;
                }
                Err(err) => return Err(err.into()),
            }

            attempt += 1;
            match registry.update_ticket(state, parent).await {
                Ok(_) => return Ok(issued),
                Err(TicketRegistryError::Conflict(_)) => {
                    debug!(
                        "Ticket {} was concurrently modified (attempt {})",
                        parent_id, attempt
                    );
                    self.discard_ticket(state, &issued.meta.id).await;
                    tokio::task::yield_now().await;
                }
                Err(err) => {
                    self.discard_ticket(state, &issued.meta.id).await;
                    return Err(err.into());
                }
            }
        }
        Err(CasError::TicketCreation(format!(
            "ticket {parent_id} was concurrently modified {attempt} times"
        )))
    }

    async fn validate(
        &self,
        state: &ServerState,
        st_id: &str,
        service: &Service,
    ) -> Result<Assertion, CasError> {
        let registry = state.provider.get_ticket_registry_provider();
        let mut attempt = 0;
        let consumed = loop {
            attempt += 1;
            let mut ticket = registry
                .get_ticket(state, st_id, TicketType::Service)
                .await?;
            let Some(st) = ticket.as_service() else {
                return Err(CasError::InvalidTicket(st_id.to_string()));
            };
            if !st.is_valid_for(service) {
                warn!(
                    "Ticket {} was issued for {} and not for {}",
                    st_id, st.service.id, service.id
                );
                return Err(CasError::InvalidTicket(st_id.to_string()));
            }
            ticket.update(Utc::now());
            match registry.update_ticket(state, ticket).await {
                Ok(stored) => break stored,
                Err(TicketRegistryError::Conflict(_)) if attempt < self.update_retries => {
                    debug!("Ticket {} was concurrently used", st_id);
                    tokio::task::yield_now().await;
                }
                Err(TicketRegistryError::Conflict(_)) => {
                    return Err(CasError::InvalidTicket(st_id.to_string()));
                }
                Err(err) => return Err(err.into()),
            }
        };
        if consumed.is_expired() {
            self.discard_ticket(state, st_id).await;
        }
        let Some(st) = consumed.as_service() else {
            return Err(CasError::InvalidTicket(st_id.to_string()));
        };

        let as_invalid = |err: CasError| match err {
            CasError::InvalidTicket(_) => CasError::InvalidTicket(st_id.to_string()),
            other => other,
        };
        let granting_ticket = registry
            .get_ticket(state, &st.granting_ticket_id, TicketType::TicketGranting)
            .await
            .map_err(|err| as_invalid(err.into()))?;
        let Some(granting) = granting_ticket.as_granting() else {
            return Err(CasError::InvalidTicket(st_id.to_string()));
        };
        let chain = self
            .resolve_chain(state, granting)
            .await
            .map_err(as_invalid)?;
        let Some(primary) = chain.authentications.first().cloned() else {
            return Err(CasError::InvalidTicket(st_id.to_string()));
        };

        let registered = self
            .ensure_service_access(state, service, &primary.principal)
            .await?;
        let attributes = registered
            .attribute_release_policy
            .release(&primary.principal);
        let username = registered
            .username_attribute_provider
            .resolve_username(&primary.principal, service);

        Ok(Assertion {
            primary_authentication: primary,
            chained_authentications: chain.authentications,
            service: service.clone(),
            from_new_login: st.from_new_login,
            username,
            attributes,
            proxies: chain.proxies,
        })
    }

    /// Record the proxy-granting ticket in its parent ticket-granting ticket.
    async fn link_proxy_granting_ticket(
        &self,
        state: &ServerState,
        parent_id: &str,
        pgt_id: &str,
        proxied_by: &Service,
    ) -> Result<(), CasError> {
        let registry = state.provider.get_ticket_registry_provider();
        for attempt in 1..=self.update_retries {
            let mut parent = registry
                .get_ticket(state, parent_id, TicketType::TicketGranting)
                .await?;
            let Some(granting) = parent.as_granting_mut() else {
                return Err(CasError::InvalidTicket(parent_id.to_string()));
            };
            granting.add_proxy_granting_ticket(pgt_id, proxied_by.clone());
            match registry.update_ticket(state, parent).await {
                Ok(_) => return Ok(()),
                Err(TicketRegistryError::Conflict(_)) => {
                    debug!(
                        "Ticket {} was concurrently modified (attempt {})",
                        parent_id, attempt
                    );
                    tokio::task::yield_now().await;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(CasError::TicketCreation(format!(
            "ticket {parent_id} was concurrently modified"
        )))
    }

    async fn issue_proxy_granting_ticket(
        &self,
        state: &ServerState,
        st_id: &str,
        authentication_result: AuthenticationResult,
    ) -> Result<ProxyGrantingTicketIssued, CasError> {
        let registry = state.provider.get_ticket_registry_provider();
        let callback = Service::new(authentication_result.authentication.principal.id.clone());
        let mut duplicate_retried = false;
        let mut attempt = 0;
        let ticket = loop {
            let mut ticket = registry
                .get_ticket(state, st_id, TicketType::Service)
                .await?;
            let Some(st) = ticket.as_service_mut() else {
                return Err(CasError::InvalidTicket(st_id.to_string()));
            };
            self.ensure_proxy_allowed(state, &st.service, &callback)
                .await?;
            if st.granted_ticket_already {
                return Err(CasError::TicketCreation(format!(
                    "proxy-granting ticket was already issued for {st_id}"
                )));
            }
            let pgt = self
                .factory
                .create_proxy_granting_ticket(st, authentication_result.authentication.clone())?;
            let pgt_id = pgt.id().to_string();

            match registry.add_ticket(state, pgt.clone()).await {
                Ok(_) => {}
                Err(TicketRegistryError::Duplicate(id)) if !duplicate_retried => {
                    warn!("Generated ticket id {} is already used, retrying", id);
                    duplicate_retried = true;
                    continue;
                }
                Err(err) => return Err(err.into()),
            }

            attempt += 1;
            match registry.update_ticket(state, ticket).await {
                Ok(_) => break pgt,
                Err(TicketRegistryError::Conflict(_)) if attempt < self.update_retries => {
                    debug!("Ticket {} was concurrently modified", st_id);
                    self.discard_ticket(state, &pgt_id).await;
                    tokio::task::yield_now().await;
                }
                Err(err) => {
                    self.discard_ticket(state, &pgt_id).await;
                    return Err(match err {
                        TicketRegistryError::Conflict(_) => CasError::TicketCreation(format!(
                            "ticket {st_id} was concurrently modified"
                        )),
                        other => other.into(),
                    });
                }
            }
        };

        let Some(pgt) = ticket.as_granting().cloned() else {
            return Err(CasError::TicketCreation(ticket.id().to_string()));
        };
        let (Some(parent_id), Some(proxied_by)) = (&pgt.granting_ticket_id, &pgt.proxied_by)
        else {
            self.discard_ticket(state, &pgt.meta.id).await;
            return Err(CasError::TicketCreation(pgt.meta.id.clone()));
        };
        if let Err(err) = self
            .link_proxy_granting_ticket(state, parent_id, &pgt.meta.id, proxied_by)
            .await
        {
            self.discard_ticket(state, &pgt.meta.id).await;
            return Err(err);
        }
        Ok(ProxyGrantingTicketIssued {
            iou: self.factory.new_proxy_granting_ticket_iou(),
            ticket: pgt,
        })
    }

    async fn destroy(
        &self,
        state: &ServerState,
        tgt_id: &str,
    ) -> Result<Vec<LogoutRequest>, CasError> {
        let registry = state.provider.get_ticket_registry_provider();
        let Some(ticket) = registry.find_ticket(state, tgt_id).await? else {
            debug!("Ticket {} is already gone", tgt_id);
            return Ok(Vec::new());
        };
        let Some(tgt) = ticket.as_granting() else {
            warn!("Ticket {} is not a ticket-granting ticket", tgt_id);
            return Ok(Vec::new());
        };
        let requests = match state
            .provider
            .get_logout_provider()
            .perform_logout(state, tgt)
            .await
        {
            Ok(requests) => requests,
            Err(err) => {
                warn!("Single logout of {} failed: {}", tgt_id, err);
                Vec::new()
            }
        };
        let deleted = registry.delete_ticket(state, tgt_id).await?;
        info!(
            "Destroyed the session {} of {} ({} tickets removed)",
            tgt_id, tgt.authentication.principal.id, deleted
        );
        Ok(requests)
    }
}

fn audit_event<T, S: Into<String>>(
    action: AuditAction,
    resource: S,
    result: &Result<T, CasError>,
) -> AuditEvent {
    let outcome = if result.is_ok() {
        AuditOutcome::Success
    } else {
        AuditOutcome::Failure
    };
    AuditEvent::new(action, outcome, resource)
}

#[async_trait]
impl CentralAuthenticationServiceApi for CasProvider {
    #[tracing::instrument(level = "info", skip(self, state, authentication_result))]
    async fn create_ticket_granting_ticket(
        &self,
        state: &ServerState,
        authentication_result: AuthenticationResult,
    ) -> Result<TicketGrantingTicket, CasError> {
        let principal = authentication_result.authentication.principal.id.clone();
        let result = self.start_session(state, &authentication_result).await;
        let resource = match &result {
            Ok(tgt) => tgt.meta.id.clone(),
            Err(_) => principal.clone(),
        };
        let event = audit_event(AuditAction::TicketGrantingTicketCreated, resource, &result)
            .with_principal(principal);
        self.finish(state, event, result).await
    }

    #[tracing::instrument(level = "debug", skip(self, state))]
    async fn get_ticket<'a>(
        &self,
        state: &ServerState,
        id: &'a str,
        ticket_type: TicketType,
    ) -> Result<Ticket, CasError> {
        Ok(state
            .provider
            .get_ticket_registry_provider()
            .get_ticket(state, id, ticket_type)
            .await?)
    }

    #[tracing::instrument(level = "info", skip(self, state, authentication_result))]
    async fn grant_service_ticket<'a>(
        &self,
        state: &ServerState,
        tgt_id: &'a str,
        service: &Service,
        authentication_result: Option<AuthenticationResult>,
    ) -> Result<ServiceTicket, CasError> {
        let result = self
            .issue_ticket(
                state,
                tgt_id,
                TicketType::TicketGranting,
                service,
                authentication_result.as_ref(),
            )
            .await;
        let resource = match &result {
            Ok(st) => format!("{} for {}", st.meta.id, service.id),
            Err(_) => format!("{} for {}", tgt_id, service.id),
        };
        let mut event = audit_event(AuditAction::ServiceTicketGranted, resource, &result);
        if let Some(authentication_result) = &authentication_result {
            event = event.with_principal(authentication_result.authentication.principal.id.clone());
        }
        self.finish(state, event, result).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn grant_proxy_ticket<'a>(
        &self,
        state: &ServerState,
        pgt_id: &'a str,
        service: &Service,
    ) -> Result<ServiceTicket, CasError> {
        let result = self
            .issue_ticket(state, pgt_id, TicketType::ProxyGranting, service, None)
            .await;
        let resource = match &result {
            Ok(pt) => format!("{} for {}", pt.meta.id, service.id),
            Err(_) => format!("{} for {}", pgt_id, service.id),
        };
        let event = audit_event(AuditAction::ProxyTicketGranted, resource, &result);
        self.finish(state, event, result).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn validate_service_ticket<'a>(
        &self,
        state: &ServerState,
        st_id: &'a str,
        service: &Service,
    ) -> Result<Assertion, CasError> {
        let result = self.validate(state, st_id, service).await;
        let mut event = audit_event(
            AuditAction::ServiceTicketValidated,
            format!("{} for {}", st_id, service.id),
            &result,
        );
        if let Ok(assertion) = &result {
            event = event.with_principal(assertion.principal().id.clone());
        }
        self.finish(state, event, result).await
    }

    #[tracing::instrument(level = "info", skip(self, state, authentication_result))]
    async fn create_proxy_granting_ticket<'a>(
        &self,
        state: &ServerState,
        st_id: &'a str,
        authentication_result: AuthenticationResult,
    ) -> Result<ProxyGrantingTicketIssued, CasError> {
        let principal = authentication_result.authentication.principal.id.clone();
        let result = self
            .issue_proxy_granting_ticket(state, st_id, authentication_result)
            .await;
        let resource = match &result {
            Ok(issued) => format!("{} from {}", issued.ticket.meta.id, st_id),
            Err(_) => st_id.to_string(),
        };
        let event = audit_event(AuditAction::ProxyGrantingTicketCreated, resource, &result)
            .with_principal(principal);
        self.finish(state, event, result).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn destroy_ticket_granting_ticket<'a>(
        &self,
        state: &ServerState,
        tgt_id: &'a str,
    ) -> Result<Vec<LogoutRequest>, CasError> {
        let result = self.destroy(state, tgt_id).await;
        let event = audit_event(AuditAction::TicketGrantingTicketDestroyed, tgt_id, &result);
        self.finish(state, event, result).await
    }
}
