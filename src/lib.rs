//! # sea-orm-datatables
//!
//! Server-side processing for [DataTables](https://datatables.net) tables on
//! top of Sea-ORM. A request from the widget (paging, global search,
//! per-column searches, multi-column sort) is turned into refinements of a
//! caller-supplied query, and the results are shaped into the response the
//! widget expects, including side-channel data for yadcf column filters.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sea_orm_datatables::{ColumnDt, DataTables, NullOrder, SearchMethod};
//!
//! let columns = vec![
//!     ColumnDt::new(Expr::col((user::Entity, user::Column::Id)))
//!         .with_search_method(SearchMethod::Numeric),
//!     ColumnDt::new(Expr::col((user::Entity, user::Column::Name))),
//!     ColumnDt::new(Expr::col((user::Entity, user::Column::Birthday)))
//!         .with_search_method(SearchMethod::YadcfRangeDate)
//!         .with_nulls_order(NullOrder::Last),
//! ];
//!
//! let output = DataTables::from_select(params, user::Entity::find(), columns)
//!     .run(&db)
//!     .await;
//! ```
//!
//! Both the 1.10+ parameter format (`draw`, `columns[i][search][value]`, ...)
//! and the legacy Hungarian-notation format (`sEcho`, `sSearch_i`, ...) are
//! accepted; the response uses the keys of the format the request came in.

pub mod columns;
pub mod config;
pub mod datatables;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod output;
pub mod routes;

pub use columns::{ColumnDt, ColumnOptions, NullOrder};
pub use config::DataTablesConfig;
pub use datatables::{DataTables, QueryState};
pub use errors::DataTablesError;
pub use filtering::{SearchMethod, clean_regex};
pub use models::{ParameterScheme, RawParams, RequestParameters};
pub use output::{DataTablesOutput, Row, YadcfData};
