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
//! Service (the relying web application) requesting tickets.
use serde::{Deserialize, Serialize};

/// A web application requesting authentication.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Service {
    /// Service identifier (the URL the ticket is issued for).
    pub id: String,

    /// URL as originally requested.
    pub original_url: String,
}

impl Service {
    pub fn new<S: Into<String>>(id: S) -> Self {
        let id = id.into();
        Self {
            original_url: id.clone(),
            id,
        }
    }

    /// Whether the other service denotes the same service.
    ///
    /// Identifiers are compared case-insensitively after URL decoding.
    pub fn matches(&self, other: &Service) -> bool {
        matches_service_ids(&self.id, &other.id)
    }

    /// Identifier with the query string and the `;jsessionid` path parameter
    /// removed, lowercased.
    pub fn normalized_id(&self) -> String {
        let end = self.id.find(['?', ';']).unwrap_or(self.id.len());
        self.id[..end].to_lowercase()
    }
}

/// Compare two service identifiers.
///
/// Both sides are URL decoded (`+` is treated as an encoded space) and
/// compared ignoring the case. An identifier that is not a valid encoding is
/// compared verbatim.
pub fn matches_service_ids(left: &str, right: &str) -> bool {
    left == right || decode_service_id(left).to_lowercase() == decode_service_id(right).to_lowercase()
}

fn decode_service_id(id: &str) -> String {
    let id = id.replace('+', " ");
    match urlencoding::decode(&id) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => id,
    }
}
