mod common;

use common::{
    address_description, dt_params, set, setup_test_db, user_columns, user_id, user_name,
    users_with_addresses,
};
use sea_orm_datatables::{ColumnDt, DataTables, DataTablesConfig, SearchMethod};

#[tokio::test]
async fn test_global_search_matches_any_column() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(3);
    set(&mut params, "search[value]", "Avenue");

    let output = DataTables::from_select(params, users_with_addresses(), user_columns())
        .run(&db)
        .await;

    assert!(!output.is_error(), "{:?}", output.error);
    assert_eq!(output.records_total, 50);
    assert_eq!(output.records_filtered, 17);
    assert!(output.rows().iter().all(|row| row["2"] == "Avenue"));
}

#[tokio::test]
async fn test_global_search_is_case_insensitive() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(3);
    set(&mut params, "search[value]", "user 1");

    let output = DataTables::from_select(params, users_with_addresses(), user_columns())
        .run(&db)
        .await;

    // User 10 to User 19
    assert_eq!(output.records_filtered, 10);
}

#[tokio::test]
async fn test_global_search_casts_numbers_to_text() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(1);
    set(&mut params, "search[value]", "4");

    let output = DataTables::from_select(params, users_with_addresses(), vec![ColumnDt::new(user_id())])
        .run(&db)
        .await;

    // 4, 14, 24, 34, 40-49
    assert_eq!(output.records_filtered, 14);
}

#[tokio::test]
async fn test_request_can_exclude_column_from_global_search() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(3);
    set(&mut params, "search[value]", "Avenue");
    set(&mut params, "columns[2][searchable]", "false");

    let output = DataTables::from_select(params, users_with_addresses(), user_columns())
        .run(&db)
        .await;

    assert_eq!(output.records_filtered, 0);
}

#[tokio::test]
async fn test_column_can_opt_out_of_global_search() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(3);
    set(&mut params, "search[value]", "Avenue");
    let columns = vec![
        ColumnDt::new(user_id()),
        ColumnDt::new(user_name()),
        ColumnDt::new(address_description()).with_global_search(false),
    ];

    let output = DataTables::from_select(params, users_with_addresses(), columns)
        .run(&db)
        .await;

    assert_eq!(output.records_filtered, 0);
}

#[tokio::test]
async fn test_no_eligible_column_means_no_global_filter() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(1);
    set(&mut params, "search[value]", "Avenue");
    let columns = vec![ColumnDt::new(address_description()).with_global_search(false)];

    let output = DataTables::from_select(params, users_with_addresses(), columns)
        .run(&db)
        .await;

    assert_eq!(output.records_filtered, 50);
}

#[tokio::test]
async fn test_global_and_column_searches_combine() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(3);
    set(&mut params, "search[value]", "Road");
    set(&mut params, "columns[0][search][value]", ">40");
    let columns = vec![
        ColumnDt::new(user_id()).with_search_method(SearchMethod::Numeric),
        ColumnDt::new(user_name()),
        ColumnDt::new(address_description()),
    ];

    let output = DataTables::from_select(params, users_with_addresses(), columns)
        .run(&db)
        .await;

    // Road users 42, 45 and 48
    assert_eq!(output.records_filtered, 3);
}

#[tokio::test]
async fn test_regex_flag_ignored_unless_allowed() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(3);
    set(&mut params, "search[value]", "Road|Avenue");
    set(&mut params, "search[regex]", "true");

    let output = DataTables::from_select(params, users_with_addresses(), user_columns())
        .run(&db)
        .await;

    // Plain substring search for the literal text
    assert!(!output.is_error(), "{:?}", output.error);
    assert_eq!(output.records_filtered, 0);
}

#[tokio::test]
async fn test_regex_search_unsupported_on_sqlite() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(3);
    set(&mut params, "search[value]", "Road|Avenue");
    set(&mut params, "search[regex]", "true");
    let config = DataTablesConfig {
        allow_regex_searches: true,
        ..DataTablesConfig::default()
    };

    let output = DataTables::from_select(params, users_with_addresses(), user_columns())
        .with_config(config)
        .run(&db)
        .await;

    assert!(output.error.unwrap().contains("not supported"));
    assert!(output.data.is_none());
    assert_eq!(output.records_total, 50);
}

#[tokio::test]
async fn test_overlong_search_value_rejected() {
    let db = setup_test_db().await.unwrap();
    let mut params = dt_params(3);
    set(&mut params, "search[value]", "Avenue Avenue");
    let config = DataTablesConfig {
        max_search_value_length: 8,
        ..DataTablesConfig::default()
    };

    let output = DataTables::from_select(params, users_with_addresses(), user_columns())
        .with_config(config)
        .run(&db)
        .await;

    assert!(output.error.unwrap().contains("maximum length of 8"));
}
