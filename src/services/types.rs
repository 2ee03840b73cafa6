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
//! Service registry types definitions.
use async_trait::async_trait;
use derive_builder::Builder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use validator::{Validate, ValidationError};

mod policy;

pub use policy::*;
use policy::compile_pattern;

use crate::authentication::Service;
use crate::error::BuilderError;
use crate::server::ServerState;
use crate::services::ServiceRegistryError;

/// Service registry interface.
#[async_trait]
pub trait ServiceRegistryApi: Send + Sync + Clone {
    /// Find the registered service matching the service.
    ///
    /// Registered services are evaluated by their `evaluation_order` and the
    /// first match wins.
    async fn find_service_by(
        &self,
        state: &ServerState,
        service: &Service,
    ) -> Result<Option<RegisteredService>, ServiceRegistryError>;

    /// Get the registered service by the id.
    async fn find_service_by_id(
        &self,
        state: &ServerState,
        id: i64,
    ) -> Result<Option<RegisteredService>, ServiceRegistryError>;

    /// List registered services in their evaluation order.
    async fn list_services(
        &self,
        state: &ServerState,
    ) -> Result<Vec<RegisteredService>, ServiceRegistryError>;

    /// Register or replace the service.
    async fn save_service(
        &self,
        state: &ServerState,
        service: RegisteredService,
    ) -> Result<RegisteredService, ServiceRegistryError>;

    /// Unregister the service.
    async fn delete_service(
        &self,
        state: &ServerState,
        id: i64,
    ) -> Result<bool, ServiceRegistryError>;
}

/// Service registered to use the single sign-on.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(into))]
pub struct RegisteredService {
    /// Unique numeric id.
    pub id: i64,

    /// Human readable name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Pattern the service identifier must fully match (case-insensitive).
    #[validate(custom(function = "validate_service_pattern"))]
    pub service_id: String,

    #[builder(default)]
    #[serde(default)]
    pub description: Option<String>,

    /// Registered services with the lower order are evaluated first.
    #[builder(default)]
    #[serde(default)]
    pub evaluation_order: i32,

    #[builder(default)]
    #[serde(default)]
    pub access_strategy: AccessStrategy,

    #[builder(default)]
    #[serde(default)]
    pub proxy_policy: ProxyPolicy,

    #[builder(default)]
    #[serde(default)]
    pub attribute_release_policy: AttributeReleasePolicy,

    #[builder(default)]
    #[serde(default)]
    pub username_attribute_provider: UsernameAttributeProvider,

    #[builder(setter(skip))]
    #[serde(skip)]
    compiled_service_id: CompiledPattern,
}

/// `service_id` compiled on the first use together with its source.
///
/// Shared by the clones of the registered service.
#[derive(Clone, Debug, Default)]
struct CompiledPattern(OnceLock<(String, Option<Regex>)>);

impl PartialEq for CompiledPattern {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl RegisteredService {
    /// Whether the service is covered by this registration.
    pub fn matches(&self, service: &Service) -> bool {
        match self.compile() {
            (source, regex) if *source == self.service_id => {
                regex.as_ref().is_some_and(|re| re.is_match(&service.id))
            }
            // `service_id` changed after the pattern has been compiled.
            _ => compile_pattern(&self.service_id).is_some_and(|re| re.is_match(&service.id)),
        }
    }

    /// Compile the `service_id` pattern unless already done.
    pub(crate) fn compile(&self) -> &(String, Option<Regex>) {
        self.compiled_service_id
            .0
            .get_or_init(|| (self.service_id.clone(), compile_pattern(&self.service_id)))
    }

    /// Whether the `service_id` pattern is already compiled.
    pub(crate) fn is_compiled(&self) -> bool {
        self.compiled_service_id.0.get().is_some()
    }
}

fn validate_service_pattern(pattern: &str) -> Result<(), ValidationError> {
    if pattern.is_empty() || regex::Regex::new(pattern).is_err() {
        let mut err = ValidationError::new("invalid_service_id");
        err.message = Some("Service id must be a valid regular expression".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn get_registered_service(id: i64, pattern: &str) -> RegisteredService {
        RegisteredServiceBuilder::default()
            .id(id)
            .name(format!("service-{id}"))
            .service_id(pattern)
            .build()
            .unwrap()
    }

    #[test]
    fn test_matches() {
        let rs = get_registered_service(1, r"https://app\.example\.org(/.*)?");
        assert!(rs.matches(&Service::new("https://app.example.org")));
        assert!(rs.matches(&Service::new("https://APP.example.org/login?x=1")));
        assert!(!rs.matches(&Service::new("https://app.example.org.evil.com")));
        assert!(!rs.matches(&Service::new("http://app.example.org")));
    }

    #[test]
    fn test_compiled_pattern() {
        let mut rs = get_registered_service(1, r"https://app\.example\.org(/.*)?");
        assert!(!rs.is_compiled());
        rs.compile();
        // Clones reuse the compiled pattern.
        let copy = rs.clone();
        assert!(copy.is_compiled());
        assert!(copy.matches(&Service::new("https://app.example.org/x")));
        assert_eq!(rs, copy);

        // Changed pattern is not served from the stale cache.
        rs.service_id = r"https://other\.example\.org".into();
        assert!(!rs.matches(&Service::new("https://app.example.org/x")));
        assert!(rs.matches(&Service::new("https://other.example.org")));

        // The cache is not serialized.
        let restored: RegisteredService =
            serde_json::from_str(&serde_json::to_string(&copy).unwrap()).unwrap();
        assert!(!restored.is_compiled());
        assert!(restored.matches(&Service::new("https://app.example.org")));
    }

    #[test]
    fn test_validate() {
        assert!(get_registered_service(1, "https://.*").validate().is_ok());
        assert!(get_registered_service(1, "(").validate().is_err());
        assert!(get_registered_service(1, "").validate().is_err());
        let mut rs = get_registered_service(1, "https://.*");
        rs.name = String::new();
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_deserialize() {
        let rs: RegisteredService = serde_json::from_str(
            r#"{
                "id": 3,
                "name": "app",
                "service_id": "https://app\\.example\\.org/.*",
                "evaluation_order": 10,
                "proxy_policy": {"type": "regex_matching", "pattern": "https://.*"},
                "attribute_release_policy": {"type": "return_all"}
            }"#,
        )
        .unwrap();
        assert_eq!(10, rs.evaluation_order);
        assert!(rs.proxy_policy.is_allowed_to_proxy());
        assert_eq!(AttributeReleasePolicy::ReturnAll, rs.attribute_release_policy);
        assert!(rs.access_strategy.enabled);
        assert_eq!(UsernameAttributeProvider::Default, rs.username_attribute_provider);
    }
}
