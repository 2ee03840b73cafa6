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
//! Dispatcher dropping the logout messages.
use async_trait::async_trait;

use crate::config::Config;
use crate::logout::backend::LogoutDispatcherBackend;
use crate::logout::{LogoutError, LogoutRequest, LogoutRequestStatus};
use crate::server::ServerState;

#[derive(Clone, Debug, Default)]
pub struct NoopBackend {}

#[async_trait]
impl LogoutDispatcherBackend for NoopBackend {
    fn set_config(&mut self, _config: Config) {}

    #[tracing::instrument(level = "debug", skip(self, _state, request, _message), fields(ticket_id = request.ticket_id))]
    async fn dispatch(
        &self,
        _state: &ServerState,
        request: &LogoutRequest,
        _message: &str,
    ) -> Result<LogoutRequestStatus, LogoutError> {
        Ok(LogoutRequestStatus::NotAttempted)
    }
}
