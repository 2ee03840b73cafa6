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
//! Back-channel logout over HTTP.
//!
//! The message is `POST`ed as the `logoutRequest` form parameter to the
//! original URL of the service.
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::logout::backend::LogoutDispatcherBackend;
use crate::logout::{LogoutError, LogoutRequest, LogoutRequestStatus};
use crate::server::ServerState;

/// Name of the form parameter carrying the logout message.
pub const LOGOUT_PARAMETER: &str = "logoutRequest";

#[derive(Clone, Debug, Default)]
pub struct HttpBackend {
    client: Client,
}

/// Parse the logout URL of the service.
///
/// Only the `http` and `https` URLs are notified.
pub(crate) fn logout_url(service_url: &str) -> Result<Url, LogoutError> {
    let url = Url::parse(service_url).map_err(|err| LogoutError::InvalidUrl {
        url: service_url.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LogoutError::InvalidUrl {
            url: service_url.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

#[async_trait]
impl LogoutDispatcherBackend for HttpBackend {
    fn set_config(&mut self, config: Config) {
        match Client::builder()
            .timeout(Duration::from_secs(config.logout.timeout))
            .build()
        {
            Ok(client) => self.client = client,
            Err(err) => warn!("Failed to configure the logout HTTP client: {}", err),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, _state, request, message), fields(ticket_id = request.ticket_id))]
    async fn dispatch(
        &self,
        _state: &ServerState,
        request: &LogoutRequest,
        message: &str,
    ) -> Result<LogoutRequestStatus, LogoutError> {
        let url = logout_url(&request.service.original_url)?;
        debug!("Sending logout request to {}", url);
        self.client
            .post(url.clone())
            .form(&[(LOGOUT_PARAMETER, message)])
            .send()
            .await
            .and_then(|rsp| rsp.error_for_status())
            .map_err(|source| LogoutError::Dispatch {
                url: url.to_string(),
                source,
            })?;
        Ok(LogoutRequestStatus::Success)
    }
}
