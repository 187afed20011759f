//! # Request Orchestration
//!
//! [`DataTables`] runs one widget request against a base query:
//!
//! 1. count the unfiltered rows
//! 2. build per-column predicates and the combined global-search predicate
//! 3. resolve the requested sort order
//! 4. compute yadcf side-channel data (slider ranges, option lists)
//! 5. apply all predicates and count the filtered rows
//! 6. sort, page, execute and reshape rows to the declared output keys
//!
//! Any failure aborts the remaining steps and becomes the `error` field of
//! the response, alongside the counts computed so far.
//!
//! ```rust,ignore
//! async fn users(
//!     State(db): State<DatabaseConnection>,
//!     Query(params): Query<HashMap<String, String>>,
//! ) -> DataTablesOutput {
//!     let query = user::Entity::find()
//!         .join(JoinType::LeftJoin, user::Relation::Address.def());
//!     let columns = vec![
//!         ColumnDt::new(Expr::col((user::Entity, user::Column::Id))),
//!         ColumnDt::new(Expr::col((user::Entity, user::Column::Name))),
//!         ColumnDt::new(Expr::col((address::Entity, address::Column::Description)))
//!             .with_search_method(SearchMethod::YadcfSelect),
//!     ];
//!     DataTables::from_select(params, query, columns).run(&db).await
//! }
//! ```

use sea_orm::{
    ConnectionTrait, EntityTrait, FromQueryResult, JsonValue, QueryResult, QueryTrait, Select,
    sea_query::{Alias, Condition, Expr, Func, Order, Query, SelectStatement, SimpleExpr},
};
use std::collections::BTreeMap;

use crate::{
    columns::ColumnDt,
    config::DataTablesConfig,
    errors::DataTablesError,
    filtering::{
        SearchContext, SideChannel, SortExpression, apply_paging, apply_sort_expressions,
        build_sort_expressions, clean_regex,
    },
    models::{ParameterScheme, RawParams, RequestParameters},
    output::{DataTablesOutput, Row, YadcfData},
};

const COUNT_ALIAS: &str = "num_items";
const VALUE_ALIAS: &str = "dt_value";
const MIN_ALIAS: &str = "dt_min";
const MAX_ALIAS: &str = "dt_max";

/// Accumulated state of one request.
///
/// Filled step by step by [`DataTables::try_run`]; when a step fails, the
/// fields it did not reach keep their initial value.
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    pub records_total: u64,
    pub records_filtered: u64,
    /// Per-column predicate, `None` for columns without an active search
    pub column_filters: Vec<Option<SimpleExpr>>,
    /// OR of the global search predicates over the eligible columns
    pub global_filter: Option<Condition>,
    pub sorts: Vec<SortExpression>,
    pub yadcf_data: BTreeMap<usize, YadcfData>,
}

impl QueryState {
    /// AND of every active filter, optionally leaving out one column's own
    fn conjunction(&self, skip_column: Option<usize>) -> Vec<Condition> {
        self.column_filters
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != skip_column)
            .filter_map(|(_, filter)| filter.clone())
            .map(|filter| Condition::all().add(filter))
            .chain(self.global_filter.clone())
            .collect()
    }
}

/// Server-side processing for one DataTables request
#[derive(Debug, Clone)]
pub struct DataTables {
    params: RawParams,
    query: SelectStatement,
    columns: Vec<ColumnDt>,
    config: DataTablesConfig,
}

impl DataTables {
    /// `query` provides FROM, JOIN and any fixed WHERE clauses; its own
    /// projection is replaced by the column expressions.
    #[must_use]
    pub fn new(params: RawParams, query: SelectStatement, columns: Vec<ColumnDt>) -> Self {
        let mut query = query;
        query.clear_selects();

        Self {
            params,
            query,
            columns,
            config: DataTablesConfig::default(),
        }
    }

    /// Use a Sea-ORM entity query as the base query
    #[must_use]
    pub fn from_select<E>(params: RawParams, select: Select<E>, columns: Vec<ColumnDt>) -> Self
    where
        E: EntityTrait,
    {
        Self::new(params, select.into_query(), columns)
    }

    #[must_use]
    pub fn with_config(self, config: DataTablesConfig) -> Self {
        Self { config, ..self }
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDt] {
        &self.columns
    }

    /// Run the request and shape the response, turning any failure into the
    /// response's `error` field.
    pub async fn run<C>(&self, db: &C) -> DataTablesOutput
    where
        C: ConnectionTrait,
    {
        let draw = RequestParameters::draw_token(&self.params);
        let scheme = ParameterScheme::detect(&self.params);
        let mut state = QueryState::default();

        let (data, error) = match self.try_run(db, &mut state).await {
            Ok(rows) => (Some(rows), None),
            Err(err) => {
                tracing::warn!(
                    draw = %draw,
                    error = %err,
                    records_total = state.records_total,
                    records_filtered = state.records_filtered,
                    "DataTables request failed"
                );
                state.yadcf_data.clear();
                (None, Some(err.to_string()))
            }
        };

        DataTablesOutput {
            scheme,
            draw,
            records_total: state.records_total,
            records_filtered: state.records_filtered,
            data,
            error,
            yadcf_data: state.yadcf_data,
        }
    }

    /// Run the request, stopping at the first failure.
    ///
    /// `state` records the progress made, including on failure.
    ///
    /// # Errors
    ///
    /// Returns the first parameter, search value or database error met.
    pub async fn try_run<C>(
        &self,
        db: &C,
        state: &mut QueryState,
    ) -> Result<Vec<Row>, DataTablesError>
    where
        C: ConnectionTrait,
    {
        let ctx = SearchContext::new(db.get_database_backend());

        state.records_total = self.count(db, &[]).await?;
        tracing::debug!(records_total = state.records_total, "Counted rows");

        let params = RequestParameters::parse(&self.params, self.columns.len(), &self.config)?;

        state.column_filters = self.column_filters(&ctx, &params)?;
        state.global_filter = self.global_filter(&ctx, &params)?;
        state.sorts = build_sort_expressions(&self.columns, &params.order)?;

        self.side_channels(db, &ctx, state).await?;

        let filters = state.conjunction(None);
        state.records_filtered = self.count(db, &filters).await?;
        tracing::debug!(
            draw = %params.draw,
            records_filtered = state.records_filtered,
            filters = filters.len(),
            "Counted filtered rows"
        );

        let mut query = self.query.clone();
        for (index, column) in self.columns.iter().enumerate() {
            query.expr_as(column.expr().clone(), Alias::new(column_alias(index)));
        }
        apply_conditions(&mut query, filters);
        apply_sort_expressions(&mut query, &state.sorts);
        apply_paging(&mut query, params.paging)?;

        let results = db.query_all(db.get_database_backend().build(&query)).await?;
        tracing::debug!(draw = %params.draw, rows = results.len(), "Fetched page");

        results.iter().map(|result| self.reshape(result)).collect()
    }

    fn column_filters(
        &self,
        ctx: &SearchContext,
        params: &RequestParameters,
    ) -> Result<Vec<Option<SimpleExpr>>, DataTablesError> {
        self.columns
            .iter()
            .zip(&params.columns)
            .enumerate()
            .map(|(index, (column, search))| {
                if search.value.is_empty() {
                    return Ok(None);
                }
                tracing::debug!(
                    column = index,
                    search_method = %column.search_method(),
                    value = %search.value,
                    "Column search"
                );
                column
                    .search_method()
                    .build_predicate(ctx, column.expr().clone(), &search.value)
                    .map_err(|err| err.for_column(index))
            })
            .collect()
    }

    fn global_filter(
        &self,
        ctx: &SearchContext,
        params: &RequestParameters,
    ) -> Result<Option<Condition>, DataTablesError> {
        let value = params.search.value.as_str();
        if value.is_empty() {
            return Ok(None);
        }

        let use_regex = params.search.regex && self.config.allow_regex_searches;
        let pattern = if use_regex { clean_regex(value) } else { value.to_string() };
        tracing::debug!(value, regex = use_regex, "Global search");

        let eligible = self
            .columns
            .iter()
            .zip(&params.columns)
            .filter(|(column, search)| column.global_search() && search.searchable);

        let mut any = Condition::any();
        let mut matched = false;
        for (column, _) in eligible {
            let text = ctx.cast_to_text(column.expr().clone());
            let predicate = if use_regex {
                ctx.regex_match(text, &pattern)?
            } else {
                ctx.contains(text, &pattern)
            };
            any = any.add(predicate);
            matched = true;
        }

        Ok(matched.then_some(any))
    }

    async fn side_channels<C>(
        &self,
        db: &C,
        ctx: &SearchContext,
        state: &mut QueryState,
    ) -> Result<(), DataTablesError>
    where
        C: ConnectionTrait,
    {
        for (index, column) in self.columns.iter().enumerate() {
            let Some(channel) = column.search_method().side_channel() else {
                continue;
            };

            let mut query = self.query.clone();
            apply_conditions(&mut query, state.conjunction(Some(index)));

            let data = match channel {
                SideChannel::Range => {
                    let min = ctx.cast_to_float(Func::min(column.expr().clone()).into());
                    let max = ctx.cast_to_float(Func::max(column.expr().clone()).into());
                    query
                        .expr_as(min, Alias::new(MIN_ALIAS))
                        .expr_as(max, Alias::new(MAX_ALIAS));
                    let row = db.query_one(db.get_database_backend().build(&query)).await?;
                    let (min, max) = match row {
                        Some(row) => (
                            row.try_get::<Option<f64>>("", MIN_ALIAS)?,
                            row.try_get::<Option<f64>>("", MAX_ALIAS)?,
                        ),
                        None => (None, None),
                    };
                    YadcfData::Range(
                        min.map(|min| to_whole(min.floor())),
                        max.map(|max| to_whole(max.ceil())),
                    )
                }
                SideChannel::Options => {
                    query
                        .distinct()
                        .expr_as(column.expr().clone(), Alias::new(VALUE_ALIAS))
                        .order_by(Alias::new(VALUE_ALIAS), Order::Asc);
                    let rows = db.query_all(db.get_database_backend().build(&query)).await?;
                    let values = rows
                        .iter()
                        .map(|row| take_field(row, VALUE_ALIAS))
                        .collect::<Result<Vec<_>, DataTablesError>>()?;
                    YadcfData::Options(values)
                }
            };

            tracing::debug!(column = index, ?data, "Computed yadcf data");
            state.yadcf_data.insert(index, data);
        }

        Ok(())
    }

    /// `SELECT COUNT(*)` over the base query projected on the first column
    async fn count<C>(&self, db: &C, filters: &[Condition]) -> Result<u64, DataTablesError>
    where
        C: ConnectionTrait,
    {
        let projection = self
            .columns
            .first()
            .map_or_else(|| Expr::value(1), |column| column.expr().clone());

        let mut inner = self.query.clone();
        inner.expr_as(projection, Alias::new(column_alias(0)));
        apply_conditions(&mut inner, filters.to_vec());

        let query = Query::select()
            .expr_as(Expr::cust("COUNT(*)"), Alias::new(COUNT_ALIAS))
            .from_subquery(inner, Alias::new("dt_count"))
            .to_owned();

        let count = match db.query_one(db.get_database_backend().build(&query)).await? {
            Some(row) => row.try_get::<i64>("", COUNT_ALIAS)?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn reshape(&self, result: &QueryResult) -> Result<Row, DataTablesError> {
        let mut values = match JsonValue::from_query_result(result, "")? {
            JsonValue::Object(values) => values,
            _ => serde_json::Map::new(),
        };

        Ok(self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let value = values.remove(&column_alias(index)).unwrap_or(JsonValue::Null);
                (column.output_key(index), value)
            })
            .collect())
    }
}

fn column_alias(index: usize) -> String {
    format!("dt_{index}")
}

fn apply_conditions(query: &mut SelectStatement, conditions: Vec<Condition>) {
    for condition in conditions {
        query.cond_where(condition);
    }
}

fn take_field(result: &QueryResult, field: &str) -> Result<JsonValue, DataTablesError> {
    Ok(match JsonValue::from_query_result(result, "")? {
        JsonValue::Object(mut values) => values.remove(field).unwrap_or(JsonValue::Null),
        _ => JsonValue::Null,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn to_whole(value: f64) -> i64 {
    value as i64
}
