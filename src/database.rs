//! SQLite execution collaborator.
//!
//! Owns the fixed two-table retail schema and executes whatever string the
//! tool layer admits, verbatim. Malformed SQL and constraint violations
//! surface as `AssistantError::Database`; admission policy lives in
//! `guardrails`, not here.

use crate::error::Result;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// DDL for the two tables the assistant can query. Also served to the model
/// through the `schema` tool.
pub const SCHEMA_DDL: &str = "CREATE TABLE products (
id integer PRIMARY KEY AUTOINCREMENT NOT NULL,
name text NOT NULL,
category text NOT NULL,
price real NOT NULL,
stock integer DEFAULT 0 NOT NULL,
created_at text DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE sales (
id integer PRIMARY KEY AUTOINCREMENT NOT NULL,
product_id integer NOT NULL,
quantity integer NOT NULL,
total_amount real NOT NULL,
sale_date text DEFAULT CURRENT_TIMESTAMP,
customer_name text NOT NULL,
region text NOT NULL,
FOREIGN KEY (product_id) REFERENCES products (id) ON UPDATE no action ON DELETE no action
);";

const DEMO_PRODUCTS: &[(&str, &str, f64, i64)] = &[
    ("Laptop Pro 15", "Electronics", 1299.99, 25),
    ("Wireless Mouse", "Electronics", 29.99, 150),
    ("Office Chair", "Furniture", 199.99, 45),
    ("Coffee Maker", "Appliances", 89.99, 30),
    ("Notebook Set", "Office Supplies", 12.99, 200),
    ("Desk Lamp", "Furniture", 45.99, 75),
    ("Bluetooth Headphones", "Electronics", 79.99, 60),
    ("Stapler", "Office Supplies", 8.99, 100),
    ("Monitor 24\"", "Electronics", 249.99, 40),
    ("Filing Cabinet", "Furniture", 159.99, 20),
];

// (product_id, quantity, total_amount, customer_name, region)
const DEMO_SALES: &[(i64, i64, f64, &str, &str)] = &[
    (1, 2, 2599.98, "John Smith", "North America"),
    (2, 5, 149.95, "Sarah Johnson", "Europe"),
    (3, 1, 199.99, "Mike Davis", "North America"),
    (1, 1, 1299.99, "Emily Chen", "Asia"),
    (4, 3, 269.97, "David Wilson", "Europe"),
    (6, 4, 183.96, "Lisa Anderson", "North America"),
    (7, 2, 159.98, "Tom Brown", "Asia"),
    (5, 10, 129.90, "Rachel Green", "Europe"),
    (9, 1, 249.99, "James Taylor", "North America"),
    (8, 15, 134.85, "Anna Martinez", "South America"),
];

/// Result of an executed statement, in the shape handed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, serde_json::Value>>,
    pub row_count: usize,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Apply the fixed schema unless the tables already exist.
    pub fn init_schema(&self) -> Result<()> {
        let existing: i64 = self.conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'products'",
            [],
            |row| row.get(0),
        )?;
        if existing == 0 {
            self.conn.execute_batch(SCHEMA_DDL)?;
            info!("Applied products/sales schema");
        }
        Ok(())
    }

    /// Insert the demo rows. Skipped when products already has data.
    pub fn seed_demo_data(&self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM products", [], |row| row.get(0))?;
        if count > 0 {
            info!("Products table already populated, skipping seed");
            return Ok(());
        }

        for (name, category, price, stock) in DEMO_PRODUCTS {
            self.conn.execute(
                "INSERT INTO products (name, category, price, stock) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, category, price, stock],
            )?;
        }
        for (product_id, quantity, total_amount, customer_name, region) in DEMO_SALES {
            self.conn.execute(
                "INSERT INTO sales (product_id, quantity, total_amount, customer_name, region) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![product_id, quantity, total_amount, customer_name, region],
            )?;
        }

        info!(
            "Seeded {} products and {} sales",
            DEMO_PRODUCTS.len(),
            DEMO_SALES.len()
        );
        Ok(())
    }

    /// Execute a raw statement verbatim. Statements that produce columns
    /// return their rows as JSON maps; others return an empty row set.
    pub fn run(&self, sql: &str) -> Result<QueryOutput> {
        let mut stmt = self.conn.prepare(sql)?;

        if stmt.column_count() == 0 {
            stmt.execute([])?;
            return Ok(QueryOutput {
                columns: Vec::new(),
                rows: Vec::new(),
                row_count: 0,
            });
        }

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = Vec::new();
        let mut raw_rows = stmt.query([])?;
        while let Some(row) = raw_rows.next()? {
            let mut row_map = HashMap::new();
            for (idx, column) in columns.iter().enumerate() {
                row_map.insert(column.clone(), value_ref_to_json(row.get_ref(idx)?));
            }
            rows.push(row_map);
        }

        let row_count = rows.len();
        Ok(QueryOutput {
            columns,
            rows,
            row_count,
        })
    }
}

fn value_ref_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::Number(serde_json::Number::from(i)),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("blob({} bytes)", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Database {
        let db = Database::in_memory().unwrap();
        db.init_schema().unwrap();
        db.seed_demo_data().unwrap();
        db
    }

    #[test]
    fn seed_populates_both_tables() {
        let db = seeded();
        let products = db.run("SELECT count(*) AS n FROM products").unwrap();
        assert_eq!(products.rows[0]["n"], serde_json::json!(10));
        let sales = db.run("SELECT count(*) AS n FROM sales").unwrap();
        assert_eq!(sales.rows[0]["n"], serde_json::json!(10));
    }

    #[test]
    fn seed_is_not_reapplied() {
        let db = seeded();
        db.seed_demo_data().unwrap();
        let products = db.run("SELECT count(*) AS n FROM products").unwrap();
        assert_eq!(products.rows[0]["n"], serde_json::json!(10));
    }

    #[test]
    fn run_converts_sqlite_values_to_json() {
        let db = seeded();
        let output = db
            .run("SELECT name, price, stock FROM products WHERE id = 1")
            .unwrap();
        assert_eq!(output.row_count, 1);
        assert_eq!(output.rows[0]["name"], serde_json::json!("Laptop Pro 15"));
        assert_eq!(output.rows[0]["price"], serde_json::json!(1299.99));
        assert_eq!(output.rows[0]["stock"], serde_json::json!(25));
    }

    #[test]
    fn run_surfaces_malformed_sql_as_database_error() {
        let db = seeded();
        assert!(db.run("SELEC nope").is_err());
    }
}
