use serde::Deserialize;
use utoipa::ToSchema;

/// Longest search value accepted from the widget
pub const MAX_SEARCH_VALUE_LENGTH: usize = 10_000;

/// Page length used when the request carries no `length` parameter
pub const DEFAULT_PAGE_LENGTH: i64 = 10;

/// Per-table settings for [`DataTables`](crate::DataTables).
///
/// Can be deserialized from any serde source, so it is usually loaded
/// together with the rest of the application configuration:
///
/// ```json
/// { "allow_regex_searches": true, "max_search_value_length": 256 }
/// ```
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(default)]
pub struct DataTablesConfig {
    /// Honour `search[regex]=true` from the widget. Off by default because
    /// regex evaluation is engine specific and can be expensive.
    pub allow_regex_searches: bool,
    /// Search values longer than this are rejected as invalid parameters.
    pub max_search_value_length: usize,
    /// Page length used when the request omits `length`.
    pub default_page_length: i64,
}

impl Default for DataTablesConfig {
    fn default() -> Self {
        Self {
            allow_regex_searches: false,
            max_search_value_length: MAX_SEARCH_VALUE_LENGTH,
            default_page_length: DEFAULT_PAGE_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DataTablesConfig::default();
        assert!(!config.allow_regex_searches);
        assert_eq!(config.max_search_value_length, 10_000);
        assert_eq!(config.default_page_length, 10);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: DataTablesConfig =
            serde_json::from_str(r#"{"allow_regex_searches": true}"#).unwrap();
        assert!(config.allow_regex_searches);
        assert_eq!(config.max_search_value_length, MAX_SEARCH_VALUE_LENGTH);
        assert_eq!(config.default_page_length, DEFAULT_PAGE_LENGTH);
    }
}
