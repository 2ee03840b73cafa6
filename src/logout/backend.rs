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
//! Single logout: Dispatchers.
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::config::Config;
use crate::logout::{LogoutError, LogoutRequest, LogoutRequestStatus};
use crate::server::ServerState;

pub mod http;
pub mod noop;

pub use http::HttpBackend;
pub use noop::NoopBackend;

/// LogoutDispatcherBackend trait.
///
/// Delivers the logout message of a single service.
#[async_trait]
pub trait LogoutDispatcherBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config.
    fn set_config(&mut self, config: Config);

    /// Deliver the message.
    async fn dispatch(
        &self,
        state: &ServerState,
        request: &LogoutRequest,
        message: &str,
    ) -> Result<LogoutRequestStatus, LogoutError>;
}

dyn_clone::clone_trait_object!(LogoutDispatcherBackend);
