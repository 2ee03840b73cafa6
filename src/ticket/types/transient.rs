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
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::authentication::Service;
use crate::ticket::types::TicketMetadata;

/// Transient session ticket.
///
/// Keeps the state of the delegated authentication flows between the
/// redirects.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TransientSessionTicket {
    /// Common ticket state.
    pub meta: TicketMetadata,

    /// Service the flow was started for.
    #[serde(default)]
    pub service: Option<Service>,

    /// Flow properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}
