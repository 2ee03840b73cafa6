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
//! # Error
//!
//! Diverse errors that can occur during the ticket processing.
use sea_orm::SqlErr;
use thiserror::Error;

use crate::audit::error::AuditError;
use crate::cas::error::CasError;
use crate::logout::error::LogoutError;
use crate::registry::error::TicketRegistryError;
use crate::services::error::ServiceRegistryError;
use crate::ticket::error::TicketFactoryError;

/// Top level error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Audit provider error.
    #[error(transparent)]
    Audit {
        /// The source of the error.
        #[from]
        source: AuditError,
    },

    /// Central authentication service error.
    #[error(transparent)]
    Cas {
        /// The source of the error.
        #[from]
        source: CasError,
    },

    #[error(transparent)]
    IO {
        #[from]
        source: std::io::Error,
    },

    /// Json serialization error.
    #[error("json serde error: {}", source)]
    JsonError {
        /// The source of the error.
        #[from]
        source: serde_json::Error,
    },

    /// Logout provider error.
    #[error(transparent)]
    Logout {
        /// The source of the error.
        #[from]
        source: LogoutError,
    },

    /// Service registry error.
    #[error(transparent)]
    ServiceRegistry {
        /// The source of the error.
        #[from]
        source: ServiceRegistryError,
    },

    /// Ticket factory error.
    #[error(transparent)]
    TicketFactory {
        /// The source of the error.
        #[from]
        source: TicketFactoryError,
    },

    /// Ticket registry error.
    #[error(transparent)]
    TicketRegistry {
        /// The source of the error.
        #[from]
        source: TicketRegistryError,
    },
}

/// Builder error.
///
/// A wrapper error used by the `derive_builder` generated builders.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Uninitialized field.
    #[error("{0}")]
    UninitializedField(String),
    /// Custom validation error.
    #[error("{0}")]
    Validation(String),
}

impl From<String> for BuilderError {
    fn from(s: String) -> Self {
        Self::Validation(s)
    }
}

impl From<derive_builder::UninitializedFieldError> for BuilderError {
    fn from(ufe: derive_builder::UninitializedFieldError) -> Self {
        Self::UninitializedField(ufe.to_string())
    }
}

/// Database error with the context of the operation.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Conflict.
    #[error("{message} while {context}")]
    Conflict {
        /// The error message.
        message: String,
        /// The error context.
        context: String,
    },

    /// SqlError.
    #[error("{message} while {context}")]
    Sql {
        /// The error message.
        message: String,
        /// The error context.
        context: String,
    },

    /// Database error.
    #[error("database error while {context}")]
    Database {
        /// The source of the error.
        source: sea_orm::DbErr,
        /// The error context.
        context: String,
    },
}

/// Convert the DB error into the [DatabaseError] with the context
/// information.
pub fn db_err(e: sea_orm::DbErr, context: &str) -> DatabaseError {
    e.sql_err().map_or_else(
        || DatabaseError::Database {
            source: e,
            context: context.to_string(),
        },
        |err| match err {
            SqlErr::UniqueConstraintViolation(descr) => DatabaseError::Conflict {
                message: descr.to_string(),
                context: context.to_string(),
            },
            SqlErr::ForeignKeyConstraintViolation(descr) => DatabaseError::Conflict {
                message: descr.to_string(),
                context: context.to_string(),
            },
            other => DatabaseError::Sql {
                message: other.to_string(),
                context: context.to_string(),
            },
        },
    )
}

/// Attach the operation context to the database errors.
pub trait DbContextExt<T> {
    /// Convert the [sea_orm::DbErr] into the [DatabaseError] describing what
    /// was being done.
    fn context(self, context: &str) -> Result<T, DatabaseError>;
}

impl<T> DbContextExt<T> for Result<T, sea_orm::DbErr> {
    fn context(self, context: &str) -> Result<T, DatabaseError> {
        self.map_err(|e| db_err(e, context))
    }
}
