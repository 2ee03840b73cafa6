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
//! # Authentication
//!
//! Result of the primary authentication handed over to the ticket lifecycle.
//! Credential verification itself happens outside of this crate: the ticket
//! core only receives the authenticated [Principal] wrapped into the
//! [Authentication] and the [AuthenticationResult].

mod service;
mod types;

pub use service::*;
pub use types::*;
