use chrono::{Duration, NaiveDate};
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, JoinType,
    QuerySelect, RelationTrait, Select,
    sea_query::{Expr, SimpleExpr},
};
use sea_orm_datatables::{ColumnDt, RawParams};
use sea_orm_migration::prelude::*;

pub mod address_entity;
pub mod user_entity;

pub const ADDRESSES: [&str; 3] = ["Street", "Avenue", "Road"];
pub const USER_COUNT: i32 = 50;

// Helper function to get database URL from environment or default to SQLite
fn get_test_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

/// Show pipeline logs with `RUST_LOG=sea_orm_datatables=debug cargo test`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn cleanup_test_tables(db: &DatabaseConnection) {
    let _ = db.execute_unprepared("DROP TABLE IF EXISTS users").await;
    let _ = db.execute_unprepared("DROP TABLE IF EXISTS addresses").await;
    let _ = db.execute_unprepared("DROP TABLE IF EXISTS seaql_migrations").await;
}

/// Fresh database with 3 addresses and 50 users.
///
/// User `i` (1-based) lives at `ADDRESSES[(i - 1) % 3]`, is called
/// `User {i:02}` and was born on 1970-01-02 plus `10 * (i - 1)` days.
#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let database_url = get_test_database_url();
    let db = Database::connect(&database_url).await?;

    if !database_url.starts_with("sqlite::memory:") {
        cleanup_test_tables(&db).await;
    }

    Migrator::up(&db, None).await?;
    populate(&db).await?;

    Ok(db)
}

async fn populate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let addresses = ADDRESSES.iter().map(|description| address_entity::ActiveModel {
        description: Set((*description).to_string()),
        ..Default::default()
    });
    address_entity::Entity::insert_many(addresses).exec(db).await?;

    let first_birthday = NaiveDate::from_ymd_opt(1970, 1, 2).expect("valid date");
    let users = (1..=USER_COUNT).map(|i| user_entity::ActiveModel {
        name: Set(format!("User {i:02}")),
        birthday: Set(Some(first_birthday + Duration::days(10 * i64::from(i - 1)))),
        address_id: Set(Some((i - 1) % 3 + 1)),
        ..Default::default()
    });
    user_entity::Entity::insert_many(users).exec(db).await?;

    Ok(())
}

/// Users without an address, for null ordering
#[allow(dead_code)]
pub async fn add_homeless_users(db: &DatabaseConnection) -> Result<(), DbErr> {
    let users = ["000_User", "zzz_User"].map(|name| user_entity::ActiveModel {
        name: Set(name.to_string()),
        birthday: Set(None),
        address_id: Set(None),
        ..Default::default()
    });
    user_entity::Entity::insert_many(users).exec(db).await?;
    Ok(())
}

/// Users left joined with their address
#[allow(dead_code)]
pub fn users_with_addresses() -> Select<user_entity::Entity> {
    user_entity::Entity::find().join(JoinType::LeftJoin, user_entity::Relation::Address.def())
}

#[allow(dead_code)]
pub fn user_id() -> SimpleExpr {
    Expr::col((user_entity::Entity, user_entity::Column::Id)).into()
}

#[allow(dead_code)]
pub fn user_name() -> SimpleExpr {
    Expr::col((user_entity::Entity, user_entity::Column::Name)).into()
}

#[allow(dead_code)]
pub fn user_birthday() -> SimpleExpr {
    Expr::col((user_entity::Entity, user_entity::Column::Birthday)).into()
}

#[allow(dead_code)]
pub fn address_id() -> SimpleExpr {
    Expr::col((address_entity::Entity, address_entity::Column::Id)).into()
}

#[allow(dead_code)]
pub fn address_description() -> SimpleExpr {
    Expr::col((address_entity::Entity, address_entity::Column::Description)).into()
}

/// id, name, address description
#[allow(dead_code)]
pub fn user_columns() -> Vec<ColumnDt> {
    vec![
        ColumnDt::new(user_id()),
        ColumnDt::new(user_name()),
        ColumnDt::new(address_description()),
    ]
}

/// The parameters the widget sends for a first page of 10 rows, without any
/// search or ordering
#[allow(dead_code)]
pub fn dt_params(columns: usize) -> RawParams {
    let mut params = RawParams::new();
    set(&mut params, "draw", "1");
    set(&mut params, "start", "0");
    set(&mut params, "length", "10");
    set(&mut params, "search[value]", "");
    set(&mut params, "search[regex]", "false");

    for i in 0..columns {
        set(&mut params, &format!("columns[{i}][data]"), &i.to_string());
        set(&mut params, &format!("columns[{i}][name]"), "");
        set(&mut params, &format!("columns[{i}][searchable]"), "true");
        set(&mut params, &format!("columns[{i}][orderable]"), "true");
        set(&mut params, &format!("columns[{i}][search][value]"), "");
        set(&mut params, &format!("columns[{i}][search][regex]"), "false");
    }

    params
}

#[allow(dead_code)]
pub fn set(params: &mut RawParams, key: &str, value: &str) {
    params.insert(key.to_string(), value.to_string());
}

#[allow(dead_code)]
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateAddressesAndUsers)]
    }
}

pub struct CreateAddressesAndUsers;

#[async_trait::async_trait]
impl MigrationName for CreateAddressesAndUsers {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_addresses_and_users"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateAddressesAndUsers {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addresses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Addresses::Description).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Birthday).date().null())
                    .col(ColumnDef::new(Users::AddressId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Users::Table, Users::AddressId)
                            .to(Addresses::Table, Addresses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    Description,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Birthday,
    AddressId,
}
