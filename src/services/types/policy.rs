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
//! Policies of the registered services.
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;
use uuid::Uuid;

use crate::authentication::{Attributes, Principal, Service};

/// Compile the pattern matching the whole input case-insensitively.
///
/// Invalid patterns are reported and never match.
pub(crate) fn compile_pattern(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .build()
        .inspect_err(|err| warn!("Invalid service pattern {}: {}", pattern, err))
        .ok()
}

/// Access strategy of the registered service.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct AccessStrategy {
    /// Whether the service may be granted tickets at all.
    pub enabled: bool,

    /// Whether the service participates in the single sign-on. When disabled
    /// every service ticket requires fresh credentials.
    pub sso_enabled: bool,

    /// Attributes the principal must have. Values are patterns, one of which
    /// must match a value of the principal attribute. An empty list only
    /// requires the attribute presence.
    pub required_attributes: Attributes,

    /// Require all the attributes instead of any of them.
    pub require_all_attributes: bool,

    /// Where the user is sent when the access is denied.
    pub unauthorized_redirect_url: Option<Url>,
}

impl Default for AccessStrategy {
    fn default() -> Self {
        Self {
            enabled: true,
            sso_enabled: true,
            required_attributes: Attributes::new(),
            require_all_attributes: true,
            unauthorized_redirect_url: None,
        }
    }
}

impl AccessStrategy {
    pub fn is_service_access_allowed(&self) -> bool {
        self.enabled
    }

    pub fn is_service_access_allowed_for_sso(&self) -> bool {
        self.sso_enabled
    }

    /// Check the principal attributes against the required ones.
    pub fn does_principal_have_required_attributes(&self, attributes: &Attributes) -> bool {
        if self.required_attributes.is_empty() {
            return true;
        }
        let mut checks = self
            .required_attributes
            .iter()
            .map(|(name, patterns)| match attributes.get(name) {
                None => false,
                Some(values) if patterns.is_empty() => !values.is_empty(),
                Some(values) => patterns.iter().filter_map(|p| compile_pattern(p)).any(|re| {
                    values.iter().any(|value| re.is_match(value))
                }),
            });
        if self.require_all_attributes {
            checks.all(|x| x)
        } else {
            checks.any(|x| x)
        }
    }
}

/// Proxy policy of the registered service.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProxyPolicy {
    /// The service is not allowed to proxy.
    #[default]
    Refuse,

    /// The service may proxy with a callback URL matching the pattern.
    RegexMatching {
        /// Pattern of the allowed proxy callback URLs.
        pattern: String,
    },
}

impl ProxyPolicy {
    pub fn is_allowed_to_proxy(&self) -> bool {
        !matches!(self, Self::Refuse)
    }

    /// Whether the proxy callback URL is allowed.
    pub fn is_allowed_proxy_callback_url(&self, callback: &Service) -> bool {
        match self {
            Self::Refuse => false,
            Self::RegexMatching { pattern } => {
                compile_pattern(pattern).is_some_and(|re| re.is_match(&callback.id))
            }
        }
    }
}

/// Which principal attributes are released to the service on validation.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeReleasePolicy {
    /// Release nothing.
    #[default]
    DenyAll,

    /// Release all principal attributes.
    ReturnAll,

    /// Release only the listed attributes.
    ReturnAllowed {
        /// Names of the released attributes.
        allowed: Vec<String>,
    },
}

impl AttributeReleasePolicy {
    /// Filter the principal attributes.
    pub fn release(&self, principal: &Principal) -> Attributes {
        match self {
            Self::DenyAll => Attributes::new(),
            Self::ReturnAll => principal.attributes.clone(),
            Self::ReturnAllowed { allowed } => principal
                .attributes
                .iter()
                .filter(|(name, _)| allowed.contains(name))
                .map(|(name, values)| (name.clone(), values.clone()))
                .collect(),
        }
    }
}

/// How the principal identifier presented to the service is determined.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UsernameAttributeProvider {
    /// The principal id.
    #[default]
    Default,

    /// First value of the principal attribute, falling back to the principal
    /// id when the attribute is missing.
    PrincipalAttribute {
        /// Attribute name.
        attribute: String,
    },

    /// Opaque identifier stable per principal and service.
    Anonymous,
}

impl UsernameAttributeProvider {
    pub fn resolve_username(&self, principal: &Principal, service: &Service) -> String {
        match self {
            Self::Default => principal.id.clone(),
            Self::PrincipalAttribute { attribute } => principal
                .attributes
                .get(attribute)
                .and_then(|values| values.first())
                .cloned()
                .unwrap_or_else(|| principal.id.clone()),
            Self::Anonymous => Uuid::new_v5(
                &Uuid::NAMESPACE_URL,
                format!("{}!{}", service.normalized_id(), principal.id).as_bytes(),
            )
            .simple()
            .to_string(),
        }
    }
}
