//! # Filtering, Sorting & Paging
//!
//! Translates the per-request state of a DataTables widget into refinements
//! of a Sea-ORM [`SelectStatement`](sea_orm::sea_query::SelectStatement).
//!
//! ## Main Components
//!
//! - **[`SearchMethod`]**: registry of the ways a column search value becomes a predicate
//! - **[`SearchContext`]**: dialect differences between `SQLite`, `PostgreSQL` and `MySQL`
//! - **[`clean_regex`]**: sanitiser for free-text regex searches
//! - **[`apply_sorting`]**: multi-column `ORDER BY` with per-column null placement
//! - **[`apply_paging`]**: `LIMIT`/`OFFSET` from `start`/`length`
//!
//! ## Column Search Values
//!
//! ```text
//! numeric               >=10        20        <1.5
//! date                  <1970-01-03
//! yadcf_multi_select    Avenue|Road
//! yadcf_range_number    10-yadcf_delim-15     10-yadcf_delim-     -yadcf_delim-15
//! yadcf_range_date      1970-01-03-yadcf_delim-1970-01-13
//! ```

pub mod conditions;
pub mod pagination;
pub mod regex;
pub mod search_methods;
pub mod sort;

pub use conditions::{ComparisonOperator, DateOperand, SearchContext};
pub use pagination::apply_paging;
pub use regex::clean_regex;
pub use search_methods::{SearchMethod, SideChannel};
pub use sort::{SortExpression, apply_sort_expressions, apply_sorting, build_sort_expressions};
