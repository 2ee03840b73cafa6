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
//! # CAS ticket core
//!
//! Ticket-granting and validation lifecycle of a Central Authentication
//! Service (CAS) single sign-on server.
//!
//! A successful primary authentication produces a Ticket-Granting Ticket
//! (TGT) representing the single sign-on session. Applications ("services")
//! obtain Service Tickets (ST) from it and validate them exactly once in
//! exchange for an assertion about the authenticated principal. A service
//! allowed to proxy may exchange a validated ST for a Proxy-Granting Ticket
//! (PGT), which in turn grants Proxy Tickets (PT) for other services. All of
//! the tickets form a tree rooted at the TGT and destroying the root
//! invalidates the whole tree, notifying every participating service
//! (single logout).
//!
//! The crate is organized around providers, each backed by a pluggable
//! backend driver:
//!
//!   - [registry] stores the tickets and enforces the per-ticket
//!     compare-and-swap update contract,
//!   - [services] keeps the registered services with their access, proxy and
//!     attribute release policies,
//!   - [logout] performs back-channel single logout,
//!   - [audit] records the audit trail,
//!   - [cas] orchestrates the ticket lifecycle on top of all of them.
//!
//! The [provider::Provider] gives access to all of them and is passed around
//! inside of the [server::ServerState].

pub mod audit;
pub mod authentication;
pub mod cas;
pub mod config;
pub mod db;
pub mod db_migration;
pub mod error;
pub mod logout;
pub mod plugin_manager;
pub mod provider;
pub mod registry;
pub mod server;
pub mod services;
pub mod ticket;
pub mod unique_id;

#[cfg(test)]
mod tests;
