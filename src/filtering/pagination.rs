use sea_orm::sea_query::SelectStatement;

use crate::{errors::DataTablesError, models::Paging};

/// Page length the widget sends for "show all rows"
pub const UNLIMITED_LENGTH: i64 = -1;

/// Restrict `query` to the requested page.
///
/// `length == -1` disables the limit; `start` still applies as an offset.
///
/// # Errors
///
/// Returns [`DataTablesError::InvalidParameter`] for any other negative length.
pub fn apply_paging(query: &mut SelectStatement, paging: Paging) -> Result<(), DataTablesError> {
    match paging.length {
        UNLIMITED_LENGTH => {}
        length => {
            let limit = u64::try_from(length).map_err(|_| {
                DataTablesError::invalid_parameter(
                    "Length should be a positive integer or -1 to disable",
                )
            })?;
            query.limit(limit);
        }
    }

    if paging.start > 0 {
        query.offset(paging.start);
    }

    Ok(())
}
