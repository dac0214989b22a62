// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use nl_sql_engine::{
    db::{Database, SqliteDatabase},
    schema::{
        CONTEXT_HEADER, ColumnDescriptor, EMPTY_SCHEMA_PLACEHOLDER, TableSchema,
        describe_columns, introspect
    }
};

async fn seeded(statements: &[&str]) -> SqliteDatabase {
    let db = SqliteDatabase::in_memory().unwrap();
    let mut conn = db.connect().await.unwrap();
    for sql in statements {
        conn.execute(sql).await.unwrap();
    }
    drop(conn);
    db
}

#[test]
fn test_context_single_table() {
    let mut schema = TableSchema::default();
    schema.insert(
        "USERS",
        vec![
            ColumnDescriptor::new("ID", "int"),
            ColumnDescriptor::new("NAME", "varchar"),
            ColumnDescriptor::new("COUNTRY", "varchar")
        ]
    );
    let context = schema.to_context();
    assert!(context.starts_with(CONTEXT_HEADER));
    assert!(context.contains("Table USERS: ID (int), NAME (varchar), COUNTRY (varchar)"));
}

#[test]
fn test_context_preserves_table_order() {
    let mut schema = TableSchema::default();
    schema.insert("zeta", vec![ColumnDescriptor::new("id", "int")]);
    schema.insert("alpha", vec![ColumnDescriptor::new("id", "int")]);
    let context = schema.to_context();
    let zeta = context.find("Table zeta").unwrap();
    let alpha = context.find("Table alpha").unwrap();
    assert!(zeta < alpha);
}

#[test]
fn test_context_empty_schema_is_not_blank() {
    let context = TableSchema::default().to_context();
    assert!(context.contains(EMPTY_SCHEMA_PLACEHOLDER));
    assert!(!context.contains("Table "));
}

#[test]
fn test_context_keeps_identifier_case() {
    let mut schema = TableSchema::default();
    schema.insert("OrderItems", vec![ColumnDescriptor::new("UnitPrice", "decimal(10,2)")]);
    assert!(schema
        .to_context()
        .contains("Table OrderItems: UnitPrice (decimal(10,2))"));
}

#[test]
fn test_describe_columns() {
    let columns = vec![
        ColumnDescriptor::new("id", "int"),
        ColumnDescriptor::new("email", "text")
    ];
    assert_eq!(describe_columns(&columns), "id (int), email (text)");
}

#[test]
fn test_column_descriptor_serializes_type() {
    let json = serde_json::to_string(&ColumnDescriptor::new("id", "int")).unwrap();
    assert!(json.contains("\"type\":\"int\""));
    assert!(json.contains("\"nullable\":true"));
}

#[test]
fn test_table_schema_accessors() {
    let mut schema = TableSchema::default();
    assert!(schema.is_empty());
    schema.insert("users", vec![ColumnDescriptor::new("id", "int")]);
    assert_eq!(schema.len(), 1);
    assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["users"]);
    assert_eq!(schema.columns("users").unwrap().len(), 1);
    assert!(schema.columns("orders").is_none());
}

#[tokio::test]
async fn test_introspect_sqlite() {
    let db = seeded(&[
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, country TEXT DEFAULT 'US')",
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER, total REAL)"
    ])
    .await;
    let mut conn = db.connect().await.unwrap();
    let schema = introspect(conn.as_mut()).await.unwrap();

    assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["orders", "users"]);
    let users = schema.columns("users").unwrap();
    let names: Vec<&str> = users.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "country"]);

    assert!(users[0].is_key);
    assert_eq!(users[0].extra, "auto_increment");
    assert!(!users[1].nullable);
    assert!(!users[1].is_key);
    assert_eq!(users[2].default.as_deref(), Some("'US'"));
    assert!(users[2].nullable);
}

#[tokio::test]
async fn test_introspect_empty_database() {
    let db = seeded(&[]).await;
    let mut conn = db.connect().await.unwrap();
    let schema = introspect(conn.as_mut()).await.unwrap();
    assert!(schema.is_empty());
}

#[tokio::test]
async fn test_introspect_single_column_table() {
    let db = seeded(&["CREATE TABLE audit (entry TEXT)"]).await;
    let mut conn = db.connect().await.unwrap();
    let schema = introspect(conn.as_mut()).await.unwrap();
    assert!(schema.to_context().contains("Table audit: entry (TEXT)"));
}

#[tokio::test]
async fn test_introspect_composite_key_has_no_auto_increment() {
    let db = seeded(&[
        "CREATE TABLE memberships (user_id INTEGER, group_id INTEGER, PRIMARY KEY (user_id, group_id))"
    ])
    .await;
    let mut conn = db.connect().await.unwrap();
    let schema = introspect(conn.as_mut()).await.unwrap();
    let columns = schema.columns("memberships").unwrap();
    assert!(columns.iter().all(|c| c.is_key));
    assert!(columns.iter().all(|c| c.extra.is_empty()));
}
