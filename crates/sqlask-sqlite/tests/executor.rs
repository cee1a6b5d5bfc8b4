//! SQLite executor against the seeded demo database

use sqlask_core::{ExecutorError, Normalizer, QueryExecutor, Schema};
use sqlask_sqlite::SqliteExecutor;

fn seeded() -> SqliteExecutor {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    executor.init_schema().unwrap();
    executor.seed_demo_data().unwrap();
    executor
}

#[test]
fn seed_fills_every_table_once() {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    executor.init_schema().unwrap();

    assert_eq!(executor.seed_demo_data().unwrap(), 80);
    assert_eq!(executor.seed_demo_data().unwrap(), 0);

    for table in ["customers", "products", "employees", "sales"] {
        let rows = executor.query(&format!("SELECT COUNT(*) AS n FROM {table}")).unwrap();
        assert_eq!(rows[0].get("n"), Some(&serde_json::json!(20)), "table {table}");
    }
}

#[test]
fn tables_match_prompt_schema() {
    let executor = seeded();

    for table in &Schema::sales().tables {
        let rows = executor
            .query(&format!("SELECT name FROM pragma_table_info('{}')", table.name))
            .unwrap();
        let actual: Vec<String> = rows
            .iter()
            .filter_map(|r| r.get("name").and_then(|v| v.as_str()).map(String::from))
            .collect();
        let expected: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
        assert_eq!(actual, expected, "columns of {}", table.name);
    }
}

#[test]
fn seeded_sales_are_consistent() {
    let executor = seeded();

    let rows = executor
        .query(
            "SELECT COUNT(*) AS mismatched FROM sales s JOIN customers c ON c.id = s.customer_id \
             WHERE s.city <> c.city OR s.quantity NOT BETWEEN 1 AND 5",
        )
        .unwrap();
    assert_eq!(rows[0].get("mismatched"), Some(&serde_json::json!(0)));
}

#[tokio::test]
async fn executes_normalized_query_read_only() {
    let executor = seeded();
    executor.enforce_read_only().unwrap();

    let query = Normalizer::new().normalize(
        "SELECT name, city FROM customers ORDER BY id",
        "Who is the first customer?",
    );
    let rows = executor.execute(&query).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["name", "city"]);
    assert_eq!(rows[0].get("name"), Some(&serde_json::json!("Hans Johannesen")));
}

#[tokio::test]
async fn date_rewrites_run_on_sqlite() {
    let executor = seeded();

    let query = Normalizer::new().normalize(
        "SELECT COUNT(*) AS count FROM customers WHERE created_at >= NOW() - INTERVAL 30 DAY",
        "Welche Kunden wurden in den letzten 30 Tagen hinzugefügt?",
    );
    let rows = executor.execute(&query).await.unwrap();
    assert_eq!(rows[0].get("count"), Some(&serde_json::json!(20)));

    let query = Normalizer::new().normalize(
        "SELECT * FROM sales WHERE sale_date = CURDATE()",
        "Welche Produkte wurden heute verkauft?",
    );
    assert!(executor.execute(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_column_error_is_verbatim() {
    let executor = seeded();

    let query = Normalizer::new().normalize("SELECT shoe_size FROM customers", "");
    let err = executor.execute(&query).await.unwrap_err();

    match err {
        ExecutorError::Database(message) => assert!(message.contains("no such column: shoe_size")),
        other => panic!("unexpected error: {other:?}"),
    }
}
