//! # Error Handling
//!
//! Every failure this crate can produce is a [`DataTablesError`]. There are
//! two very different places where one can surface:
//!
//! - **Construction time**: building a [`ColumnDt`](crate::ColumnDt) from an
//!   unknown search method or null-order tag. These errors go straight back
//!   to the caller; no request pipeline is involved.
//! - **Request time**: anything raised while a [`DataTables`](crate::DataTables)
//!   request runs (bad paging length, unparseable numeric operand, database
//!   failure...). The orchestrator catches these and turns them into the
//!   `error` field of the DataTables response, which is what the widget
//!   expects to display.
//!
//! The `Display` text of an error is exactly the message placed in that
//! `error` field.
//!
//! When an error is returned through Axum directly (for example when column
//! construction fails inside a handler), [`IntoResponse`] maps it to an HTTP
//! status and logs database details with `tracing` instead of sending them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// Error type shared by column construction and the request pipeline
#[derive(Debug)]
pub enum DataTablesError {
    /// A parameter failed validation: unknown tag at column construction,
    /// malformed request parameter, invalid paging length, bad sort direction.
    InvalidParameter {
        /// User-facing error message
        message: String,
    },

    /// A search value could not be turned into a predicate for its column.
    SearchValue {
        /// Zero-based index of the column, `None` for the global search box
        column: Option<usize>,
        /// User-facing error message
        message: String,
    },

    /// The underlying query failed to execute.
    Database(DbErr),
}

impl DataTablesError {
    /// Create an invalid parameter error
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(DataTablesError::invalid_parameter("Invalid order direction: up"));
    /// ```
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a search value error for a column (or the global search box)
    pub fn search_value(column: Option<usize>, message: impl Into<String>) -> Self {
        Self::SearchValue {
            column,
            message: message.into(),
        }
    }

    /// Attach a column index to a search value error raised without one
    #[must_use]
    pub(crate) fn for_column(self, index: usize) -> Self {
        match self {
            Self::SearchValue { column: None, message } => Self::SearchValue {
                column: Some(index),
                message,
            },
            other => other,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidParameter { .. } | Self::SearchValue { .. } => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database(internal) => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            _ => {
                tracing::debug!(error = %self, status = %self.status_code(), "DataTables error");
            }
        }
    }
}

impl fmt::Display for DataTablesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { message } | Self::SearchValue { message, .. } => {
                f.write_str(message)
            }
            Self::Database(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DataTablesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbErr> for DataTablesError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}

/// Error body for errors returned outside of a DataTables response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for DataTablesError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let error = match &self {
            Self::Database(_) => "A database error occurred".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
