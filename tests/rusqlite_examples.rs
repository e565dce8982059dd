use sqlite_helper::{
    normalize, request::to_json, DatabaseConfig, HelperError, Item, Location, OpenOptions,
    QuotePolicy, Response, SelectConfig, SqlValue, SqliteDriver, SqliteHelper, TableSpec,
};
use tempfile::TempDir;

fn people_table() -> TableSpec {
    TableSpec::new("people")
        .with_field("id", "INTEGER PRIMARY KEY AUTOINCREMENT")
        .with_field("name", "varchar NOT NULL")
        .with_field("age", "int")
        .with_field("sex", "varchar")
}

fn person(name: &str, age: i64, sex: &str) -> Item {
    Item::new()
        .with_value("name", name)
        .with_value("age", age)
        .with_value("sex", sex)
}

// Helper function to create a helper over a temporary directory
fn create_temp_helper() -> (SqliteHelper<SqliteDriver>, TempDir) {
    let dir = TempDir::new().unwrap();
    let helper = SqliteHelper::new(SqliteDriver::new(dir.path()), "test.db", "1.0", "users", -1);
    (helper, dir)
}

#[tokio::test]
async fn test_basic_operations() {
    let (helper, dir) = create_temp_helper();

    helper.create_table(&people_table()).await.unwrap();
    assert!(dir.path().join("test.db").exists());

    let inserted = helper
        .insert_items(
            "people",
            &[person("张三", 26, "男"), person("李四", 22, "女"), person("mike", 22, "男")],
        )
        .await
        .unwrap();
    assert_eq!(inserted.rows_affected(), 3);

    let young = helper
        .select_items(
            "people",
            &SelectConfig::new()
                .with_columns(["name", "age"])
                .with_condition(Item::new().with_value("age", 22)),
        )
        .await
        .unwrap();
    assert_eq!(young.len(), 2);
    assert!(young.iter().all(|row| row["age"] == SqlValue::Integer(22)));
    assert!(young.iter().all(|row| !row.contains_key("sex")));

    let updated = helper
        .update_item(
            "people",
            &Item::new().with_value("age", 23),
            Some(&Item::new().with_value("name", "mike")),
        )
        .await
        .unwrap();
    assert_eq!(updated.rows_affected(), 1);

    let mike = helper
        .select_items(
            "people",
            &SelectConfig::new().with_condition(Item::new().with_value("name", "mike")),
        )
        .await
        .unwrap();
    assert_eq!(mike[0]["age"], SqlValue::Integer(23));

    let deleted = helper
        .delete_item("people", Some(&Item::new().with_value("sex", "男")))
        .await
        .unwrap();
    assert_eq!(deleted.rows_affected(), 2);

    let rest = helper.select_items("people", &SelectConfig::new()).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0]["name"], SqlValue::Text("李四".into()));

    helper.drop_table("people").await.unwrap();
    let err = helper.select_items("people", &SelectConfig::new()).await.unwrap_err();
    assert!(matches!(err, HelperError::Driver(_)));

    assert_eq!(
        helper.close().await.unwrap().message(),
        Some(normalize::DATABASE_CLOSED)
    );
}

#[tokio::test]
async fn test_paging_is_cumulative() {
    let (helper, _dir) = create_temp_helper();
    helper.create_table(&people_table()).await.unwrap();
    let items: Vec<Item> = (0..12).map(|i| person(&format!("p{i}"), i, "x")).collect();
    helper.insert_items("people", &items).await.unwrap();

    let first = helper
        .select_items("people", &SelectConfig::new().with_page(1, 5))
        .await
        .unwrap();
    assert_eq!(first.len(), 5);

    // limit 10 offset 5 reaches past the second page
    let second = helper
        .select_items("people", &SelectConfig::new().with_page(2, 5))
        .await
        .unwrap();
    assert_eq!(second.len(), 7);
    assert_eq!(second[0]["name"], SqlValue::Text("p5".into()));
}

#[tokio::test]
async fn test_batch_is_all_or_nothing() {
    let (helper, _dir) = create_temp_helper();
    helper.create_table(&people_table()).await.unwrap();

    let broken = [
        person("ok", 1, "x"),
        Item::new().with_value("age", 2).with_value("sex", "x"),
    ];
    let err = helper.insert_items("people", &broken).await.unwrap_err();
    assert!(err.to_string().contains("NOT NULL"));

    let rows = helper.select_items("people", &SelectConfig::new()).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_escaped_quotes_round_trip() {
    let (helper, _dir) = create_temp_helper();
    let helper = helper.with_quote_policy(QuotePolicy::Escaped);
    helper.create_table(&people_table()).await.unwrap();
    helper
        .insert_items("people", &[person("O'Brien", 40, "x")])
        .await
        .unwrap();

    let rows = helper
        .select_items(
            "people",
            &SelectConfig::new().with_condition(Item::new().with_value("name", "O'Brien")),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_raw_quotes_break_the_statement() {
    let (helper, _dir) = create_temp_helper();
    helper.create_table(&people_table()).await.unwrap();
    let err = helper
        .insert_items("people", &[person("O'Brien", 40, "x")])
        .await
        .unwrap_err();
    assert!(matches!(err, HelperError::Driver(_)));
}

#[tokio::test]
async fn test_read_only_and_seeded_databases() {
    let dir = TempDir::new().unwrap();
    let driver = SqliteDriver::new(dir.path());

    let writer = SqliteHelper::new(driver.clone(), "seed.db", "1.0", "seed", -1);
    writer.create_table(&people_table()).await.unwrap();
    writer.insert_items("people", &[person("mike", 22, "男")]).await.unwrap();
    writer.close().await.unwrap();

    let copy = SqliteHelper::with_options(
        driver.clone(),
        OpenOptions::new("copy.db").with_create_from_location("seed.db"),
    );
    let rows = copy.select_items("people", &SelectConfig::new()).await.unwrap();
    assert_eq!(rows.len(), 1);
    copy.close().await.unwrap();

    let reader = SqliteHelper::with_options(driver.clone(), OpenOptions::new("copy.db").read_only());
    assert_eq!(
        reader.select_items("people", &SelectConfig::new()).await.unwrap().len(),
        1
    );
    let err = reader
        .delete_item("people", None)
        .await
        .unwrap_err();
    assert!(matches!(err, HelperError::Driver(_)));
}

#[tokio::test]
async fn test_delete_database() {
    let (helper, dir) = create_temp_helper();
    helper.create_table(&people_table()).await.unwrap();
    helper.close().await.unwrap();

    let driver = SqliteDriver::new(dir.path());
    let done = SqliteHelper::delete(&driver, "test.db").await.unwrap();
    assert_eq!(done.message(), Some("Database test.db DELETED"));
    assert!(!dir.path().join("test.db").exists());

    let err = SqliteHelper::delete(&driver, "test.db").await.unwrap_err();
    assert!(matches!(err, HelperError::Driver(_)));
}

#[tokio::test]
async fn test_in_memory_database() {
    let helper = SqliteHelper::from_config(
        SqliteDriver::new("."),
        DatabaseConfig::new(sqlite_helper::sqlite::IN_MEMORY, "1.0", "mem", -1),
    );
    helper.create_table(&TableSpec::new("kv").with_field("k", "TEXT")).await.unwrap();
    helper.insert_items("kv", &[Item::new().with_value("k", "v")]).await.unwrap();
    let rows = helper.select_items("kv", &SelectConfig::new()).await.unwrap();
    assert_eq!(rows[0]["k"], SqlValue::Text("v".into()));
}

#[tokio::test]
async fn test_delete_database_in_location() {
    let dir = TempDir::new().unwrap();
    let driver = SqliteDriver::new(dir.path());
    let options = OpenOptions::new("docs.db").with_location(Location::Documents);

    let helper = SqliteHelper::with_options(driver.clone(), options.clone());
    helper.create_table(&people_table()).await.unwrap();
    helper.close().await.unwrap();
    let file = dir.path().join("Documents").join("docs.db");
    assert!(file.exists());

    let done = SqliteHelper::delete_config(&driver, helper.config()).await.unwrap();
    assert_eq!(done.message(), Some("Database docs.db DELETED"));
    assert!(!file.exists());

    // the name alone resolves to the base directory, where nothing exists
    let err = SqliteHelper::delete(&driver, "docs.db").await.unwrap_err();
    assert!(matches!(err, HelperError::Driver(_)));
}

#[tokio::test]
async fn test_rows_keep_column_order_in_json() {
    let (helper, _dir) = create_temp_helper();
    let table = TableSpec::new("wide")
        .with_field("a1", "int")
        .with_field("b2", "int")
        .with_field("c3", "int")
        .with_field("d4", "int")
        .with_field("e5", "int");
    helper.create_table(&table).await.unwrap();
    let item = Item::new()
        .with_value("e5", 5)
        .with_value("c3", 3)
        .with_value("a1", 1)
        .with_value("d4", 4)
        .with_value("b2", 2);
    helper.insert_items("wide", &[item]).await.unwrap();

    let rows = helper.select_items("wide", &SelectConfig::new()).await.unwrap();
    assert_eq!(
        rows[0].columns().collect::<Vec<_>>(),
        vec!["a1", "b2", "c3", "d4", "e5"]
    );
    assert_eq!(
        to_json(&Ok(Response::Rows(rows))).to_string(),
        r#"{"res":[{"a1":1,"b2":2,"c3":3,"d4":4,"e5":5}]}"#
    );

    let rows = helper
        .select_items("wide", &SelectConfig::new().with_columns(["e5", "a1", "c3"]))
        .await
        .unwrap();
    assert_eq!(
        to_json(&Ok(Response::Rows(rows))).to_string(),
        r#"{"res":[{"e5":5,"a1":1,"c3":3}]}"#
    );
}

#[tokio::test]
async fn test_seed_with_bundle_marker() {
    let dir = TempDir::new().unwrap();
    let driver = SqliteDriver::new(dir.path());

    let writer = SqliteHelper::new(driver.clone(), "seed.db", "1.0", "seed", -1);
    writer.create_table(&people_table()).await.unwrap();
    writer.insert_items("people", &[person("mike", 22, "男")]).await.unwrap();
    writer.close().await.unwrap();

    let copy = SqliteHelper::with_options(
        driver.clone(),
        OpenOptions::new("copy.db").with_create_from_location("~seed.db"),
    );
    let rows = copy.select_items("people", &SelectConfig::new()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], SqlValue::Text("mike".into()));
    assert!(dir.path().join("copy.db").exists());
}

#[tokio::test]
async fn test_blob_and_infinite_values_round_trip() {
    let (helper, _dir) = create_temp_helper();
    let table = TableSpec::new("raw")
        .with_field("data", "BLOB")
        .with_field("big", "TEXT");
    helper.create_table(&table).await.unwrap();
    let bytes = vec![0x00, 0xff, 0x27, 0x80];
    helper
        .insert_items(
            "raw",
            &[Item::new()
                .with_value("data", bytes.clone())
                .with_value("big", f64::INFINITY)],
        )
        .await
        .unwrap();

    let rows = helper.select_items("raw", &SelectConfig::new()).await.unwrap();
    assert_eq!(rows[0]["data"], SqlValue::Blob(bytes));
    assert_eq!(rows[0]["big"], SqlValue::Text("Infinity".into()));
}
