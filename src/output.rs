use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::models::ParameterScheme;

/// One output row, keyed by each column's output key
pub type Row = Map<String, Value>;

/// Side-channel data for a yadcf filter widget, sent as `yadcf_data_<i>`
#[derive(Debug, Clone, PartialEq)]
pub enum YadcfData {
    /// `floor(min)` and `ceil(max)` of a slider column; `null` on an empty set
    Range(Option<i64>, Option<i64>),
    /// Distinct values of a select, multi-select or autocomplete column
    Options(Vec<Value>),
}

impl Serialize for YadcfData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Range(min, max) => (min, max).serialize(serializer),
            Self::Options(values) => values.serialize(serializer),
        }
    }
}

/// The response a DataTables widget expects.
///
/// Counts are sent as strings. `data` and `error` are mutually exclusive:
/// a failed request carries the error message, the counts computed before
/// the failure and no rows.
///
/// ```json
/// {"draw": "1", "recordsTotal": "50", "recordsFiltered": "50", "data": [...]}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataTablesOutput {
    pub scheme: ParameterScheme,
    pub draw: String,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Option<Vec<Row>>,
    pub error: Option<String>,
    /// Keyed by column index
    pub yadcf_data: BTreeMap<usize, YadcfData>,
}

impl DataTablesOutput {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Rows of a successful response, empty on failure
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        self.data.as_deref().unwrap_or_default()
    }

    /// The response as a JSON object
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    const fn keys(&self) -> [&'static str; 4] {
        match self.scheme {
            ParameterScheme::Modern => ["draw", "recordsTotal", "recordsFiltered", "data"],
            ParameterScheme::Legacy => ["sEcho", "iTotalRecords", "iTotalDisplayRecords", "aaData"],
        }
    }
}

impl Serialize for DataTablesOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let [draw, total, filtered, data] = self.keys();

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(draw, &self.draw)?;
        map.serialize_entry(total, &self.records_total.to_string())?;
        map.serialize_entry(filtered, &self.records_filtered.to_string())?;

        match (&self.error, &self.data) {
            (Some(error), _) => map.serialize_entry("error", error)?,
            (None, Some(rows)) => map.serialize_entry(data, rows)?,
            (None, None) => map.serialize_entry(data, &[] as &[Row])?,
        }

        if self.error.is_none() {
            for (index, yadcf) in &self.yadcf_data {
                map.serialize_entry(&format!("yadcf_data_{index}"), yadcf)?;
            }
        }

        map.end()
    }
}
