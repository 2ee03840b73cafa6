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
use std::path::PathBuf;

use crate::config::common::{default_memory_driver, default_true};

/// Ticket registry configuration (`[registry]`).
#[derive(Debug, Deserialize, Clone)]
pub struct RegistrySection {
    /// Backend driver (`memory` or `sql`).
    #[serde(default = "default_memory_driver")]
    pub driver: String,

    /// Number of attempts of the optimistic update of a parent ticket before
    /// giving up.
    #[serde(default = "default_update_retries")]
    pub update_retries: usize,

    /// Whether the periodic registry cleaner is running.
    #[serde(default = "default_true")]
    pub cleaner_enabled: bool,

    /// Delay (in seconds) before the first cleaner run.
    #[serde(default = "default_cleaner_start_delay")]
    pub cleaner_start_delay: u64,

    /// Interval (in seconds) between the cleaner runs.
    #[serde(default = "default_cleaner_repeat_interval")]
    pub cleaner_repeat_interval: u64,

    /// Maximal number of expired tickets removed in a single batch.
    #[serde(default = "default_cleaner_batch_size")]
    pub cleaner_batch_size: usize,
}

fn default_update_retries() -> usize {
    5
}

fn default_cleaner_start_delay() -> u64 {
    20
}

fn default_cleaner_repeat_interval() -> u64 {
    120
}

fn default_cleaner_batch_size() -> usize {
    500
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            driver: default_memory_driver(),
            update_retries: default_update_retries(),
            cleaner_enabled: true,
            cleaner_start_delay: default_cleaner_start_delay(),
            cleaner_repeat_interval: default_cleaner_repeat_interval(),
            cleaner_batch_size: default_cleaner_batch_size(),
        }
    }
}

/// Service registry configuration (`[service_registry]`).
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceRegistrySection {
    /// Backend driver.
    #[serde(default = "default_memory_driver")]
    pub driver: String,

    /// JSON file with the registered services loaded on start.
    pub location: Option<PathBuf>,
}

impl Default for ServiceRegistrySection {
    fn default() -> Self {
        Self {
            driver: default_memory_driver(),
            location: None,
        }
    }
}
