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
//! # Single logout error
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogoutError {
    /// The logout message could not be delivered.
    #[error("logout request to {url} failed")]
    Dispatch {
        /// Logout URL.
        url: String,
        /// The source of the error.
        source: reqwest::Error,
    },

    /// The service URL can not be used for the back-channel logout.
    #[error("invalid logout url {url}: {reason}")]
    InvalidUrl {
        /// Logout URL.
        url: String,
        /// Reason.
        reason: String,
    },

    /// Unsupported driver.
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),
}
