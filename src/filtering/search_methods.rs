//! The search-method registry: one [`SearchMethod`] variant per way of
//! turning a column search value into a predicate.

use sea_orm::sea_query::{Expr, SimpleExpr};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use super::conditions::{
    MULTI_SELECT_DELIMITER, SearchContext, parse_date_or_now, parse_date_strict, parse_number,
    parse_query_value, range_condition, split_range,
};
use crate::errors::DataTablesError;

/// How the per-column search value of a column is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// Never filter on this column
    None,
    /// Case-insensitive substring match
    #[default]
    StringContains,
    /// Case-insensitive pattern, wildcards supplied by the caller
    Ilike,
    /// Case-sensitive pattern, wildcards supplied by the caller
    Like,
    /// `[operator]number`, e.g. `>=10`
    Numeric,
    /// `[operator]date`, e.g. `<1970-01-03`
    Date,
    YadcfText,
    YadcfAutocomplete,
    YadcfSelect,
    /// `a|b|c`, matches any of the listed values exactly
    YadcfMultiSelect,
    /// `<from>-yadcf_delim-<to>`, inclusive
    YadcfRangeNumber,
    /// Same as [`SearchMethod::YadcfRangeNumber`], plus a min/max side channel
    YadcfRangeNumberSlider,
    /// `<from>-yadcf_delim-<to>` with dates, inclusive
    YadcfRangeDate,
}

/// Auxiliary data a search method asks the orchestrator to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideChannel {
    /// `floor(min)` and `ceil(max)` of the column
    Range,
    /// Distinct values of the column
    Options,
}

impl SearchMethod {
    pub const ALL: [Self; 13] = [
        Self::None,
        Self::StringContains,
        Self::Ilike,
        Self::Like,
        Self::Numeric,
        Self::Date,
        Self::YadcfText,
        Self::YadcfAutocomplete,
        Self::YadcfSelect,
        Self::YadcfMultiSelect,
        Self::YadcfRangeNumber,
        Self::YadcfRangeNumberSlider,
        Self::YadcfRangeDate,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::StringContains => "string_contains",
            Self::Ilike => "ilike",
            Self::Like => "like",
            Self::Numeric => "numeric",
            Self::Date => "date",
            Self::YadcfText => "yadcf_text",
            Self::YadcfAutocomplete => "yadcf_autocomplete",
            Self::YadcfSelect => "yadcf_select",
            Self::YadcfMultiSelect => "yadcf_multi_select",
            Self::YadcfRangeNumber => "yadcf_range_number",
            Self::YadcfRangeNumberSlider => "yadcf_range_number_slider",
            Self::YadcfRangeDate => "yadcf_range_date",
        }
    }

    /// Side-channel data this method needs for its client-side widget
    #[must_use]
    pub const fn side_channel(self) -> Option<SideChannel> {
        match self {
            Self::YadcfRangeNumberSlider => Some(SideChannel::Range),
            Self::YadcfSelect | Self::YadcfMultiSelect | Self::YadcfAutocomplete => {
                Some(SideChannel::Options)
            }
            _ => None,
        }
    }

    /// Build the predicate for `value` against `expr`.
    ///
    /// Returns `Ok(None)` when the method never filters.
    ///
    /// # Errors
    ///
    /// Returns [`DataTablesError::SearchValue`] when the value does not fit
    /// the method's grammar (bad operator, non-numeric operand, malformed range).
    pub fn build_predicate(
        self,
        ctx: &SearchContext,
        expr: SimpleExpr,
        value: &str,
    ) -> Result<Option<SimpleExpr>, DataTablesError> {
        let predicate = match self {
            Self::None => return Ok(None),
            Self::StringContains | Self::YadcfText | Self::YadcfSelect => ctx.contains(expr, value),
            Self::Ilike => ctx.ilike(expr, value),
            Self::Like => ctx.like(expr, value),
            Self::Numeric => {
                let (operator, operand) = parse_query_value(value)?;
                operator.apply(expr, parse_number(operand)?)
            }
            Self::Date => {
                let (operator, operand) = parse_query_value(value)?;
                operator.apply(expr, parse_date_or_now(operand))
            }
            Self::YadcfAutocomplete => Expr::expr(expr).eq(value),
            Self::YadcfMultiSelect => {
                let options: Vec<String> = value
                    .split(MULTI_SELECT_DELIMITER)
                    .map(str::to_owned)
                    .collect();
                tracing::debug!(?options, "yadcf_multi_select");
                Expr::expr(ctx.cast_to_text(expr)).is_in(options)
            }
            Self::YadcfRangeNumber | Self::YadcfRangeNumberSlider => {
                let (from, to) = split_range(value)?;
                let from = optional(from, parse_number)?;
                let to = optional(to, parse_number)?;
                tracing::debug!(?from, ?to, "yadcf_range_number");
                range_condition(expr, from, to)
            }
            Self::YadcfRangeDate => {
                let (from, to) = split_range(value)?;
                let from = optional(from, parse_date_strict)?;
                let to = optional(to, parse_date_strict)?;
                tracing::debug!(?from, ?to, "yadcf_range_date");
                range_condition(expr, from, to)
            }
        };

        Ok(Some(predicate))
    }
}

/// Parse a range bound, treating the empty string as "unbounded"
fn optional<T>(
    value: &str,
    parse: impl Fn(&str) -> Result<T, DataTablesError>,
) -> Result<Option<T>, DataTablesError> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse(value).map(Some)
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMethod {
    type Err = DataTablesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| {
                DataTablesError::invalid_parameter(format!(
                    "{s} is not an allowed value for search_method."
                ))
            })
    }
}
