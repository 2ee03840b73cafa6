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
//! # CAS configuration
//!
//! Parsing of the INI configuration file.
use config::{File, FileFormat};
use eyre::{Report, WrapErr};
use serde::Deserialize;
use std::path::PathBuf;

mod common;
mod database;
mod logout;
mod registry;
mod ticket;

pub use common::DefaultSection;
pub use database::DatabaseSection;
pub use logout::{AuditSection, LogoutSection};
pub use registry::{RegistrySection, ServiceRegistrySection};
pub use ticket::*;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Global configuration options
    #[serde(rename = "DEFAULT")]
    pub default: Option<DefaultSection>,

    /// Audit trail.
    #[serde(default)]
    pub audit: AuditSection,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseSection,

    /// Single logout.
    #[serde(default)]
    pub logout: LogoutSection,

    /// Proxy-granting tickets.
    #[serde(default)]
    pub pgt: ProxyGrantingTicketSection,

    /// Proxy tickets.
    #[serde(default)]
    pub pt: ProxyTicketSection,

    /// Ticket registry.
    #[serde(default)]
    pub registry: RegistrySection,

    /// Registered services.
    #[serde(default)]
    pub service_registry: ServiceRegistrySection,

    /// Service tickets.
    #[serde(default)]
    pub st: ServiceTicketSection,

    /// Ticket-granting tickets.
    #[serde(default)]
    pub tgt: TicketGrantingTicketSection,

    /// Ticket id generation.
    #[serde(default)]
    pub ticket_id: TicketIdSection,

    /// Transient session tickets.
    #[serde(default)]
    pub tst: TransientSessionTicketSection,
}

impl Config {
    pub fn new(path: PathBuf) -> Result<Self, Report> {
        let mut builder = config::Config::builder();

        if std::path::Path::new(&path).is_file() {
            builder = builder.add_source(File::from(path).format(FileFormat::Ini));
        }

        builder.try_into()
    }
}

impl TryFrom<config::ConfigBuilder<config::builder::DefaultState>> for Config {
    type Error = Report;
    fn try_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, Self::Error> {
        let mut builder = builder;
        builder = builder
            .set_default("registry.driver", "memory")?
            .set_default("service_registry.driver", "memory")?
            .set_default("logout.driver", "http")?
            .set_default("audit.driver", "log")?;

        builder
            .build()
            .wrap_err("Failed to read configuration file")?
            .try_deserialize()
            .wrap_err("Failed to parse configuration file")
    }
}
