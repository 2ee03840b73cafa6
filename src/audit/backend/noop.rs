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
use async_trait::async_trait;

use crate::audit::backend::AuditSinkBackend;
use crate::audit::{AuditError, AuditEvent};
use crate::config::Config;
use crate::server::ServerState;

#[derive(Clone, Debug, Default)]
pub struct NoopBackend {}

#[async_trait]
impl AuditSinkBackend for NoopBackend {
    fn set_config(&mut self, _config: Config) {}

    async fn record(&self, _state: &ServerState, _event: &AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }
}
