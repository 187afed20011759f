use sea_orm::sea_query::{NullOrdering, Order, SelectStatement, SimpleExpr};

use crate::{columns::ColumnDt, errors::DataTablesError, models::SortSpec};

/// One resolved `ORDER BY` term
#[derive(Debug, Clone, PartialEq)]
pub struct SortExpression {
    pub expr: SimpleExpr,
    pub order: Order,
    pub nulls: Option<NullOrdering>,
}

/// Resolve the requested sort specs against the declared columns, keeping
/// their priority order.
///
/// # Errors
///
/// Returns [`DataTablesError::InvalidParameter`] when a spec points past the
/// last declared column.
pub fn build_sort_expressions(
    columns: &[ColumnDt],
    specs: &[SortSpec],
) -> Result<Vec<SortExpression>, DataTablesError> {
    specs
        .iter()
        .map(|spec| {
            let column = columns.get(spec.column).ok_or_else(|| {
                DataTablesError::invalid_parameter(format!(
                    "Invalid sort column {}, only {} columns are defined",
                    spec.column,
                    columns.len()
                ))
            })?;

            Ok(SortExpression {
                expr: column.expr().clone(),
                order: spec.direction.into(),
                nulls: column.nulls_order().map(Into::into),
            })
        })
        .collect()
}

/// Append the requested ordering to `query`
///
/// # Errors
///
/// See [`build_sort_expressions`].
pub fn apply_sorting(
    query: &mut SelectStatement,
    columns: &[ColumnDt],
    specs: &[SortSpec],
) -> Result<(), DataTablesError> {
    apply_sort_expressions(query, &build_sort_expressions(columns, specs)?);
    Ok(())
}

/// Append already resolved sort expressions to `query`, primary key first
pub fn apply_sort_expressions(query: &mut SelectStatement, sorts: &[SortExpression]) {
    for sort in sorts {
        let expr = sort.expr.clone();
        match sort.nulls.clone() {
            Some(nulls) => {
                query.order_by_expr_with_nulls(expr, sort.order.clone(), nulls);
            }
            None => {
                query.order_by_expr(expr, sort.order.clone());
            }
        }
    }
}
