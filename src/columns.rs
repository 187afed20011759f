use sea_orm::sea_query::{NullOrdering, SimpleExpr};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use crate::{errors::DataTablesError, filtering::SearchMethod};

/// Placement of NULL values when sorting on a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum NullOrder {
    #[serde(rename = "nullsfirst", alias = "first")]
    First,
    #[serde(rename = "nullslast", alias = "last")]
    Last,
}

impl NullOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "nullsfirst",
            Self::Last => "nullslast",
        }
    }
}

impl From<NullOrder> for NullOrdering {
    fn from(order: NullOrder) -> Self {
        match order {
            NullOrder::First => Self::First,
            NullOrder::Last => Self::Last,
        }
    }
}

impl fmt::Display for NullOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NullOrder {
    type Err = DataTablesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nullsfirst" | "first" => Ok(Self::First),
            "nullslast" | "last" => Ok(Self::Last),
            _ => Err(DataTablesError::invalid_parameter(format!(
                "{s} is not an allowed value for nulls_order."
            ))),
        }
    }
}

/// Column behaviour as it appears in configuration files.
///
/// ```json
/// { "data": "Address", "search_method": "yadcf_multi_select", "nulls_order": "nullslast" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ColumnOptions {
    /// Key of the column in each output row; defaults to the column position
    pub data: Option<String>,
    pub search_method: SearchMethod,
    pub nulls_order: Option<NullOrder>,
    /// Include the column in the global search box
    pub global_search: bool,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            data: None,
            search_method: SearchMethod::StringContains,
            nulls_order: None,
            global_search: true,
        }
    }
}

/// One DataTables column bound to a queryable expression.
///
/// The expression can be a plain column, a column of a joined table or any
/// computed expression; it is projected, filtered and sorted as-is.
///
/// ```rust,ignore
/// let columns = vec![
///     ColumnDt::new(Expr::col((user::Entity, user::Column::Id)))
///         .with_search_method(SearchMethod::Numeric),
///     ColumnDt::new(Expr::col((user::Entity, user::Column::Name))).with_data("Username"),
///     ColumnDt::new(Expr::col((address::Entity, address::Column::Description)))
///         .with_nulls_order(NullOrder::Last),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDt {
    expr: SimpleExpr,
    data: Option<String>,
    search_method: SearchMethod,
    nulls_order: Option<NullOrder>,
    global_search: bool,
}

impl ColumnDt {
    /// Column with default behaviour: substring search, included in the
    /// global search, keyed by position, no explicit null ordering
    pub fn new(expr: impl Into<SimpleExpr>) -> Self {
        Self::from_options(expr, ColumnOptions::default())
    }

    pub fn from_options(expr: impl Into<SimpleExpr>, options: ColumnOptions) -> Self {
        Self {
            expr: expr.into(),
            data: options.data,
            search_method: options.search_method,
            nulls_order: options.nulls_order,
            global_search: options.global_search,
        }
    }

    /// Build a column from string tags, as received from untyped sources.
    ///
    /// # Errors
    ///
    /// Returns [`DataTablesError::InvalidParameter`] for an unknown search
    /// method or null-order tag.
    pub fn from_tags(
        expr: impl Into<SimpleExpr>,
        search_method: &str,
        nulls_order: Option<&str>,
    ) -> Result<Self, DataTablesError> {
        let nulls_order = nulls_order.map(str::parse).transpose()?;
        let search_method = search_method.parse()?;

        Ok(Self::from_options(
            expr,
            ColumnOptions {
                search_method,
                nulls_order,
                ..ColumnOptions::default()
            },
        ))
    }

    #[must_use]
    pub fn with_data(self, data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_search_method(self, search_method: SearchMethod) -> Self {
        Self { search_method, ..self }
    }

    #[must_use]
    pub fn with_nulls_order(self, nulls_order: NullOrder) -> Self {
        Self {
            nulls_order: Some(nulls_order),
            ..self
        }
    }

    #[must_use]
    pub fn with_global_search(self, global_search: bool) -> Self {
        Self { global_search, ..self }
    }

    #[must_use]
    pub const fn expr(&self) -> &SimpleExpr {
        &self.expr
    }

    #[must_use]
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    #[must_use]
    pub const fn search_method(&self) -> SearchMethod {
        self.search_method
    }

    #[must_use]
    pub const fn nulls_order(&self) -> Option<NullOrder> {
        self.nulls_order
    }

    #[must_use]
    pub const fn global_search(&self) -> bool {
        self.global_search
    }

    /// Key of this column in output rows: `data` if set, else its position
    #[must_use]
    pub fn output_key(&self, index: usize) -> String {
        self.data.clone().unwrap_or_else(|| index.to_string())
    }
}
