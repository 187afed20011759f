//! Axum glue. A handler takes the widget parameters from
//! `Query<HashMap<String, String>>` (or `Form` for POST tables) and returns
//! the [`DataTablesOutput`] directly:
//!
//! ```rust,ignore
//! async fn list_users(
//!     State(db): State<DatabaseConnection>,
//!     Query(params): Query<HashMap<String, String>>,
//! ) -> DataTablesOutput {
//!     DataTables::from_select(params, user::Entity::find(), user_columns())
//!         .run(&db)
//!         .await
//! }
//! ```

use axum::{
    Json,
    response::{IntoResponse, Response},
};

use crate::output::DataTablesOutput;

/// Always `200 OK`: a failed request is reported through the `error` field,
/// which is where the widget looks for it.
impl IntoResponse for DataTablesOutput {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
