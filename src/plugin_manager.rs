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
//! # Plugin manager
//!
//! Every provider delegates the storage or the delivery to a backend driver
//! selected by name in the configuration. Besides the drivers shipped with
//! the crate, custom drivers implementing the backend trait may be
//! registered under a name of choice before the providers are constructed.
//!
//! The [PluginManager] is responsible for picking the proper backend driver for
//! the provider.
use std::collections::HashMap;
use std::sync::Arc;

use crate::audit::backend::AuditSinkBackend;
use crate::logout::backend::LogoutDispatcherBackend;
use crate::registry::backend::TicketRegistryBackend;
use crate::services::backend::ServiceRegistryBackend;

/// Plugin manager allowing to pass custom backend plugins implementing required
/// trait during the server start.
#[derive(Clone, Default)]
pub struct PluginManager {
    /// Audit sink plugins.
    audit_backends: HashMap<String, Arc<dyn AuditSinkBackend>>,
    /// Logout dispatcher plugins.
    logout_backends: HashMap<String, Arc<dyn LogoutDispatcherBackend>>,
    /// Service registry backend plugins.
    service_registry_backends: HashMap<String, Arc<dyn ServiceRegistryBackend>>,
    /// Ticket registry backend plugins.
    ticket_registry_backends: HashMap<String, Arc<dyn TicketRegistryBackend>>,
}

impl PluginManager {
    /// Register audit sink backend.
    pub fn register_audit_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Arc<dyn AuditSinkBackend>,
    ) {
        self.audit_backends.insert(name.as_ref().to_string(), plugin);
    }

    /// Register logout dispatcher backend.
    pub fn register_logout_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Arc<dyn LogoutDispatcherBackend>,
    ) {
        self.logout_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Register service registry backend.
    pub fn register_service_registry_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Arc<dyn ServiceRegistryBackend>,
    ) {
        self.service_registry_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Register ticket registry backend.
    pub fn register_ticket_registry_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Arc<dyn TicketRegistryBackend>,
    ) {
        self.ticket_registry_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Get registered audit sink backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_audit_backend<S: AsRef<str>>(&self, name: S) -> Option<&Arc<dyn AuditSinkBackend>> {
        self.audit_backends.get(name.as_ref())
    }

    /// Get registered logout dispatcher backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_logout_backend<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Option<&Arc<dyn LogoutDispatcherBackend>> {
        self.logout_backends.get(name.as_ref())
    }

    /// Get registered service registry backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_service_registry_backend<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Option<&Arc<dyn ServiceRegistryBackend>> {
        self.service_registry_backends.get(name.as_ref())
    }

    /// Get registered ticket registry backend.
    #[allow(clippy::borrowed_box)]
    pub fn get_ticket_registry_backend<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Option<&Arc<dyn TicketRegistryBackend>> {
        self.ticket_registry_backends.get(name.as_ref())
    }
}
