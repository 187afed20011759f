use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{
    DatabaseBackend,
    sea_query::{Alias, Expr, Func, SimpleExpr, extension::postgres::PgExpr},
};
use std::{fmt, str::FromStr};

use crate::errors::DataTablesError;

/// Separator between the two bounds of a yadcf range value
pub const RANGE_DELIMITER: &str = "-yadcf_delim-";

/// Separator between the options of a yadcf multi-select value
pub const MULTI_SELECT_DELIMITER: char = '|';

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Comparison prefix of a numeric or date search value (`>=10`, `<1970-01-03`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ComparisonOperator {
    pub const ALL: [Self; 5] = [Self::Eq, Self::Gt, Self::Gte, Self::Lt, Self::Lte];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    /// Compare `expr` against `value` with this operator
    pub fn apply<V>(self, expr: SimpleExpr, value: V) -> SimpleExpr
    where
        V: Into<SimpleExpr>,
    {
        let column = Expr::expr(expr);
        match self {
            Self::Eq => column.eq(value),
            Self::Gt => column.gt(value),
            Self::Gte => column.gte(value),
            Self::Lt => column.lt(value),
            Self::Lte => column.lte(value),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = DataTablesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|op| op.as_str() == s).ok_or_else(|| {
            let allowed: Vec<&str> = Self::ALL.iter().map(|op| op.as_str()).collect();
            DataTablesError::search_value(
                None,
                format!(
                    "Numeric query should start with operator, choose from {}",
                    allowed.join(", ")
                ),
            )
        })
    }
}

/// Split `>=value` into its operator and operand.
///
/// The operator is the leading run of `<`, `>` and `=` characters; an empty
/// run means equality. Only the five operators of [`ComparisonOperator`] are
/// accepted, so `<>` or `==` are errors.
pub fn parse_query_value(combined: &str) -> Result<(ComparisonOperator, &str), DataTablesError> {
    let operand = combined.trim_start_matches(['<', '>', '=']);
    let prefix = &combined[..combined.len() - operand.len()];

    let operator = if prefix.is_empty() {
        ComparisonOperator::Eq
    } else {
        prefix.parse()?
    };

    Ok((operator, operand.trim()))
}

/// Parse a numeric operand; an empty operand means zero
pub fn parse_number(value: &str) -> Result<f64, DataTablesError> {
    if value.is_empty() {
        return Ok(0.0);
    }
    value.trim().parse::<f64>().map_err(|_| {
        DataTablesError::search_value(None, format!("could not convert string to float: '{value}'"))
    })
}

/// A parsed date operand.
///
/// Date-only input binds as a `DATE` so it matches day values stored as
/// text (SQLite), input with a time binds as a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOperand {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl DateOperand {
    /// The operand as a timestamp, midnight for date-only input
    #[must_use]
    pub fn naive_datetime(self) -> NaiveDateTime {
        match self {
            Self::Date(date) => date.and_time(NaiveTime::MIN),
            Self::DateTime(datetime) => datetime,
        }
    }
}

impl From<DateOperand> for SimpleExpr {
    fn from(operand: DateOperand) -> Self {
        match operand {
            DateOperand::Date(date) => Self::Value(date.into()),
            DateOperand::DateTime(datetime) => Self::Value(datetime.into()),
        }
    }
}

/// Best-effort date parser accepting the usual ISO, US and European layouts.
///
/// Values with a UTC offset keep their wall-clock time.
#[must_use]
pub fn parse_date_lenient(value: &str) -> Option<DateOperand> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(DateOperand::DateTime(datetime.naive_local()));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(DateOperand::DateTime)
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .map(DateOperand::Date)
        })
}

/// Parse a date operand.
///
/// An unparseable date silently becomes the current local time. This mirrors
/// long-standing behaviour that existing tables rely on, but it is almost
/// certainly not what a user typing garbage expects.
#[must_use]
pub fn parse_date_or_now(value: &str) -> DateOperand {
    parse_date_lenient(value).unwrap_or_else(|| {
        tracing::warn!(value, "Unparseable date search value, using current time");
        DateOperand::DateTime(Local::now().naive_local())
    })
}

/// Parse one bound of a date range; an unparseable bound is an error
pub fn parse_date_strict(value: &str) -> Result<DateOperand, DataTablesError> {
    parse_date_lenient(value).ok_or_else(|| {
        DataTablesError::search_value(None, format!("Unknown date format: '{value}'"))
    })
}

/// Split a yadcf range value into its `from` and `to` parts
pub fn split_range(value: &str) -> Result<(&str, &str), DataTablesError> {
    match value.split_once(RANGE_DELIMITER) {
        Some((from, to)) if !to.contains(RANGE_DELIMITER) => Ok((from.trim(), to.trim())),
        _ => Err(DataTablesError::search_value(
            None,
            format!("Range search value should have the form <from>{RANGE_DELIMITER}<to>"),
        )),
    }
}

/// Inclusive range predicate; a missing bound leaves that side open
pub fn range_condition<V>(expr: SimpleExpr, from: Option<V>, to: Option<V>) -> SimpleExpr
where
    V: Into<SimpleExpr>,
{
    let column = Expr::expr(expr);
    match (from, to) {
        (Some(from), Some(to)) => column.between(from, to),
        (Some(from), None) => column.gte(from),
        (None, Some(to)) => column.lte(to),
        (None, None) => column.is_not_null(),
    }
}

/// Engine-specific predicate building.
///
/// The three engines Sea-ORM talks to disagree on case-insensitive matching,
/// the name of the text type and regex support; everything dialect dependent
/// goes through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchContext {
    backend: DatabaseBackend,
}

impl SearchContext {
    #[must_use]
    pub const fn new(backend: DatabaseBackend) -> Self {
        Self { backend }
    }

    #[must_use]
    pub const fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    /// Case-insensitive pattern match, caller supplies the wildcards
    #[must_use]
    pub fn ilike(&self, expr: SimpleExpr, pattern: &str) -> SimpleExpr {
        match self.backend {
            DatabaseBackend::Postgres => Expr::expr(expr).ilike(pattern),
            _ => Expr::expr(Func::upper(expr)).like(pattern.to_uppercase()),
        }
    }

    /// Case-sensitive pattern match, caller supplies the wildcards
    #[must_use]
    pub fn like(&self, expr: SimpleExpr, pattern: &str) -> SimpleExpr {
        Expr::expr(expr).like(pattern)
    }

    /// Case-insensitive substring match
    #[must_use]
    pub fn contains(&self, expr: SimpleExpr, value: &str) -> SimpleExpr {
        self.ilike(expr, &format!("%{value}%"))
    }

    #[must_use]
    pub fn cast_to_text(&self, expr: SimpleExpr) -> SimpleExpr {
        let type_name = match self.backend {
            DatabaseBackend::MySql => "CHAR",
            _ => "TEXT",
        };
        Expr::expr(expr).cast_as(Alias::new(type_name))
    }

    /// Cast to the engine's double precision type, used to read aggregates
    /// of integer and decimal columns alike
    #[must_use]
    pub fn cast_to_float(&self, expr: SimpleExpr) -> SimpleExpr {
        let type_name = match self.backend {
            DatabaseBackend::Postgres => "DOUBLE PRECISION",
            DatabaseBackend::MySql => "DOUBLE",
            DatabaseBackend::Sqlite => "REAL",
        };
        Expr::expr(expr).cast_as(Alias::new(type_name))
    }

    /// The engine's regex match operator. `SQLite` ships without a `REGEXP`
    /// implementation, so it has none.
    #[must_use]
    pub const fn regex_operator(&self) -> Option<&'static str> {
        match self.backend {
            DatabaseBackend::Postgres => Some("~"),
            DatabaseBackend::MySql => Some("REGEXP"),
            DatabaseBackend::Sqlite => None,
        }
    }

    /// `expr <regex-op> pattern`
    pub fn regex_match(&self, expr: SimpleExpr, pattern: &str) -> Result<SimpleExpr, DataTablesError> {
        let operator = self.regex_operator().ok_or_else(|| {
            DataTablesError::search_value(
                None,
                format!("Regex searches are not supported by the {:?} backend", self.backend),
            )
        })?;

        Ok(Expr::cust_with_exprs(
            format!("$1 {operator} $2"),
            [expr, SimpleExpr::Value(pattern.to_owned().into())],
        ))
    }
}
