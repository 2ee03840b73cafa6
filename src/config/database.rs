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
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Database configuration.
///
/// Only required when the `sql` ticket registry driver is used.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct DatabaseSection {
    /// Database URL.
    pub connection: Option<SecretString>,
}

impl DatabaseSection {
    /// Database URL without the python style driver suffix
    /// (`mysql+pymysql://` becomes `mysql://`).
    pub fn get_connection(&self) -> Option<SecretString> {
        let connection = self.connection.as_ref()?;
        let val = connection.expose_secret();
        if val.contains("+") {
            return Some(
                Regex::new(r"(?<type>\w+)\+(\w+)://")
                    .map(|re| SecretString::from(re.replace(val, "${type}://").to_string()))
                    .unwrap_or(connection.clone()),
            );
        }
        Some(connection.clone())
    }
}
