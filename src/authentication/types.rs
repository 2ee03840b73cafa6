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
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::authentication::Service;
use crate::error::BuilderError;

/// Authentication attribute set when the user asked to be remembered.
pub const REMEMBER_ME_ATTRIBUTE: &str = "rememberMe";

/// Multi-valued attributes.
pub type Attributes = BTreeMap<String, Vec<String>>;

/// Authenticated subject.
#[derive(Builder, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(into))]
pub struct Principal {
    /// Principal identifier (i.e. the username).
    pub id: String,

    /// Attributes resolved for the principal.
    #[builder(default)]
    #[serde(default)]
    pub attributes: Attributes,
}

impl Principal {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
        }
    }
}

/// Result of a successful primary authentication.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(into))]
pub struct Authentication {
    /// Authenticated principal.
    pub principal: Principal,

    /// Time of the authentication.
    #[builder(default = "Utc::now()")]
    pub authentication_date: DateTime<Utc>,

    /// Attributes describing the authentication event (method, remember me,
    /// ...).
    #[builder(default)]
    #[serde(default)]
    pub attributes: Attributes,

    /// Names of the authentication handlers which successfully verified the
    /// credentials.
    #[builder(default)]
    #[serde(default)]
    pub successes: Vec<String>,
}

impl Authentication {
    /// Whether the user asked to be remembered.
    pub fn is_remember_me(&self) -> bool {
        self.attributes
            .get(REMEMBER_ME_ATTRIBUTE)
            .is_some_and(|vals| vals.iter().any(|x| x.eq_ignore_ascii_case("true")))
    }
}

/// Authentication result passed to the ticket operations.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct AuthenticationResult {
    /// The authentication.
    pub authentication: Authentication,

    /// Service the authentication was requested for.
    #[builder(default)]
    pub service: Option<Service>,

    /// Whether the credentials were presented with this request (as opposed
    /// to the single sign-on session being reused).
    #[builder(default)]
    pub credential_provided: bool,
}
