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
use serde::Deserialize;

use crate::config::common::default_true;

/// Single logout configuration (`[logout]`).
#[derive(Debug, Deserialize, Clone)]
pub struct LogoutSection {
    /// Logout dispatcher driver (`http` or `noop`).
    #[serde(default = "default_logout_driver")]
    pub driver: String,

    /// Whether the services are notified when the session ends.
    #[serde(default = "default_true")]
    pub single_logout_enabled: bool,

    /// Timeout (in seconds) of a single back-channel notification.
    #[serde(default = "default_logout_timeout")]
    pub timeout: u64,
}

fn default_logout_driver() -> String {
    "http".into()
}

fn default_logout_timeout() -> u64 {
    5
}

impl Default for LogoutSection {
    fn default() -> Self {
        Self {
            driver: default_logout_driver(),
            single_logout_enabled: true,
            timeout: default_logout_timeout(),
        }
    }
}

/// Audit configuration (`[audit]`).
#[derive(Debug, Deserialize, Clone)]
pub struct AuditSection {
    /// Audit sink driver (`log` or `noop`).
    #[serde(default = "default_audit_driver")]
    pub driver: String,

    /// Continue the operation when the audit record can not be written.
    #[serde(default)]
    pub ignore_audit_failures: bool,
}

fn default_audit_driver() -> String {
    "log".into()
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            driver: default_audit_driver(),
            ignore_audit_failures: false,
        }
    }
}
