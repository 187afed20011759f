use sea_orm::sea_query::Order;
use std::{collections::HashMap, fmt, str::FromStr};

use crate::{config::DataTablesConfig, errors::DataTablesError};

/// Raw request parameters as sent by the widget (query string or form body)
pub type RawParams = HashMap<String, String>;

/// DataTables wire format. 1.10+ uses `draw`/`columns[i][...]`, older
/// versions use Hungarian-notation keys such as `sEcho` and `sSearch_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterScheme {
    #[default]
    Modern,
    Legacy,
}

impl ParameterScheme {
    /// Legacy requests are recognised by their `sEcho` parameter
    #[must_use]
    pub fn detect(raw: &RawParams) -> Self {
        if raw.contains_key("sEcho") {
            Self::Legacy
        } else {
            Self::Modern
        }
    }

    fn draw(self) -> &'static str {
        match self {
            Self::Modern => "draw",
            Self::Legacy => "sEcho",
        }
    }

    fn start(self) -> &'static str {
        match self {
            Self::Modern => "start",
            Self::Legacy => "iDisplayStart",
        }
    }

    fn length(self) -> &'static str {
        match self {
            Self::Modern => "length",
            Self::Legacy => "iDisplayLength",
        }
    }

    fn search_value(self) -> &'static str {
        match self {
            Self::Modern => "search[value]",
            Self::Legacy => "sSearch",
        }
    }

    fn search_regex(self) -> &'static str {
        match self {
            Self::Modern => "search[regex]",
            Self::Legacy => "bRegex",
        }
    }

    fn column_search_value(self, i: usize) -> String {
        match self {
            Self::Modern => format!("columns[{i}][search][value]"),
            Self::Legacy => format!("sSearch_{i}"),
        }
    }

    fn column_search_regex(self, i: usize) -> String {
        match self {
            Self::Modern => format!("columns[{i}][search][regex]"),
            Self::Legacy => format!("bRegex_{i}"),
        }
    }

    fn column_searchable(self, i: usize) -> String {
        match self {
            Self::Modern => format!("columns[{i}][searchable]"),
            Self::Legacy => format!("bSearchable_{i}"),
        }
    }

    fn order_column(self, j: usize) -> String {
        match self {
            Self::Modern => format!("order[{j}][column]"),
            Self::Legacy => format!("iSortCol_{j}"),
        }
    }

    fn order_dir(self, j: usize) -> String {
        match self {
            Self::Modern => format!("order[{j}][dir]"),
            Self::Legacy => format!("sSortDir_{j}"),
        }
    }
}

/// Paging window. `length == -1` means "everything"; other negative lengths
/// are carried through and rejected when paging is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub start: u64,
    pub length: i64,
}

/// Text typed in a search box plus the widget's regex flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParameters {
    pub value: String,
    pub regex: bool,
}

/// Per-column search state sent by the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSearch {
    pub value: String,
    pub regex: bool,
    /// `false` when the widget marks the column as not searchable; such a
    /// column is left out of the global search
    pub searchable: bool,
}

impl Default for ColumnSearch {
    fn default() -> Self {
        Self {
            value: String::new(),
            regex: false,
            searchable: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = DataTablesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(DataTablesError::invalid_parameter(format!(
                "Invalid order direction: {s}, should be asc or desc"
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

/// One entry of the requested multi-column sort, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: usize,
    pub direction: SortDirection,
}

/// Typed view over the widget's flat parameter map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    pub scheme: ParameterScheme,
    pub draw: String,
    pub paging: Paging,
    pub search: SearchParameters,
    /// One entry per declared column, in column order
    pub columns: Vec<ColumnSearch>,
    pub order: Vec<SortSpec>,
}

impl RequestParameters {
    /// Echo token of the request, `1` when absent. Never fails, so it is
    /// available even for requests whose other parameters are broken.
    #[must_use]
    pub fn draw_token(raw: &RawParams) -> String {
        let scheme = ParameterScheme::detect(raw);
        raw.get(scheme.draw())
            .map(|draw| draw.trim())
            .filter(|draw| !draw.is_empty())
            .unwrap_or("1")
            .to_string()
    }

    /// Parse the raw parameters for a table with `column_count` columns.
    ///
    /// # Errors
    ///
    /// Returns [`DataTablesError::InvalidParameter`] for non-integer paging or
    /// sort indices, an unknown sort direction, or an over-long search value.
    pub fn parse(
        raw: &RawParams,
        column_count: usize,
        config: &DataTablesConfig,
    ) -> Result<Self, DataTablesError> {
        let scheme = ParameterScheme::detect(raw);
        let text = |key: &str| -> Result<String, DataTablesError> {
            let value = raw.get(key).cloned().unwrap_or_default();
            if value.chars().count() > config.max_search_value_length {
                return Err(DataTablesError::invalid_parameter(format!(
                    "Search value exceeds the maximum length of {} characters",
                    config.max_search_value_length
                )));
            }
            Ok(value)
        };

        let start = match non_empty(raw, scheme.start()) {
            Some(start) => start.parse::<u64>().map_err(|_| {
                DataTablesError::invalid_parameter(format!(
                    "Start should be a non-negative integer, got '{start}'"
                ))
            })?,
            None => 0,
        };

        let length = match non_empty(raw, scheme.length()) {
            Some(length) => length.parse::<i64>().map_err(|_| {
                DataTablesError::invalid_parameter(format!(
                    "Length should be an integer, got '{length}'"
                ))
            })?,
            None => config.default_page_length,
        };

        let search = SearchParameters {
            value: text(scheme.search_value())?,
            regex: flag(raw, scheme.search_regex(), false),
        };

        let columns = (0..column_count)
            .map(|i| {
                Ok(ColumnSearch {
                    value: text(&scheme.column_search_value(i))?,
                    regex: flag(raw, &scheme.column_search_regex(i), false),
                    searchable: flag(raw, &scheme.column_searchable(i), true),
                })
            })
            .collect::<Result<Vec<_>, DataTablesError>>()?;

        let mut order = Vec::new();
        while let Some(column) = non_empty(raw, &scheme.order_column(order.len())) {
            let column = column.parse::<usize>().map_err(|_| {
                DataTablesError::invalid_parameter(format!("Invalid sort column: '{column}'"))
            })?;
            let direction = match non_empty(raw, &scheme.order_dir(order.len())) {
                Some(dir) => dir.parse()?,
                None => SortDirection::Asc,
            };
            order.push(SortSpec { column, direction });
        }

        Ok(Self {
            scheme,
            draw: Self::draw_token(raw),
            paging: Paging { start, length },
            search,
            columns,
            order,
        })
    }
}

fn non_empty<'a>(raw: &'a RawParams, key: &str) -> Option<&'a str> {
    raw.get(key).map(|value| value.trim()).filter(|value| !value.is_empty())
}

fn flag(raw: &RawParams, key: &str, default: bool) -> bool {
    match non_empty(raw, key) {
        Some(value) => value.eq_ignore_ascii_case("true"),
        None => default,
    }
}
