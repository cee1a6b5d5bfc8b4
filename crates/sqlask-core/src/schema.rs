//! Schema description shared by the prompt builder and the intent guard

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: &[(&str, &str)]) -> Self {
        Self {
            name: name.into(),
            columns: columns
                .iter()
                .map(|(name, data_type)| Column {
                    name: name.to_string(),
                    data_type: data_type.to_string(),
                })
                .collect(),
        }
    }
}

/// Ordered set of tables the oracle is allowed to query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// The sales demo dataset: sales, customers, products, employees
    pub fn sales() -> Self {
        Self::new(vec![
            Table::new(
                "sales",
                &[
                    ("id", "INTEGER"),
                    ("customer_id", "INTEGER"),
                    ("product_id", "INTEGER"),
                    ("employee_id", "INTEGER"),
                    ("quantity", "INTEGER"),
                    ("total_amount", "REAL"),
                    ("sale_date", "DATE"),
                    ("city", "TEXT"),
                ],
            ),
            Table::new(
                "customers",
                &[
                    ("id", "INTEGER"),
                    ("name", "TEXT"),
                    ("email", "TEXT"),
                    ("city", "TEXT"),
                    ("country", "TEXT"),
                    ("created_at", "DATETIME"),
                ],
            ),
            Table::new(
                "products",
                &[
                    ("id", "INTEGER"),
                    ("name", "TEXT"),
                    ("category", "TEXT"),
                    ("price", "REAL"),
                    ("stock", "INTEGER"),
                    ("created_at", "DATETIME"),
                ],
            ),
            Table::new(
                "employees",
                &[
                    ("id", "INTEGER"),
                    ("name", "TEXT"),
                    ("region", "TEXT"),
                    ("hire_date", "DATETIME"),
                ],
            ),
        ])
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Literal schema text embedded in the system prompt
    pub fn describe(&self) -> String {
        let mut text = String::new();
        for table in &self.tables {
            text.push_str(&format!("Table: {}\n", table.name));
            for column in &table.columns {
                text.push_str(&format!("  - {} {}\n", column.name, column.data_type));
            }
        }
        text
    }

    /// One `select * from <table>` per table, lower-cased.
    ///
    /// These are the catch-all statements the oracle falls back to when it
    /// cannot resolve a filter from the utterance.
    pub fn generic_queries(&self) -> Vec<String> {
        self.tables
            .iter()
            .map(|t| format!("select * from {}", t.name.to_lowercase()))
            .collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::sales()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_schema_tables() {
        let schema = Schema::sales();
        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["sales", "customers", "products", "employees"]);
        assert_eq!(schema.table("Customers").map(|t| t.columns.len()), Some(6));
    }

    #[test]
    fn test_describe_lists_columns_with_types() {
        let text = Schema::sales().describe();
        assert!(text.contains("Table: sales\n"));
        assert!(text.contains("  - total_amount REAL\n"));
        assert!(text.contains("Table: employees\n  - id INTEGER\n  - name TEXT\n"));
    }

    #[test]
    fn test_generic_queries_follow_schema() {
        let schema = Schema::new(vec![Table::new("Orders", &[("id", "INTEGER")])]);
        assert_eq!(schema.generic_queries(), vec!["select * from orders"]);

        assert_eq!(Schema::sales().generic_queries().len(), 4);
    }
}
