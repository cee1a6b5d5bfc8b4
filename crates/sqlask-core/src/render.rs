//! Row sets and their HTML rendering
//!
//! Cell values are HTML-escaped. Unescaped output would let a stored value
//! such as `<script>` reach the browser as markup.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub const EMPTY_RESULT_HTML: &str = "<p>No results found.</p>";

/// Rendered in a cell whose row lacks the column
pub const MISSING_CELL: &str = "—";

const TABLE_OPEN: &str =
    r#"<table border="1" cellpadding="5" cellspacing="0" style="border-collapse: collapse;">"#;

/// One result row; columns keep the order the executor produced them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column`, replacing an existing value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub type ResultSet = Vec<Row>;

/// Render `rows` as an HTML table.
///
/// Headers come from the first row; later rows are laid out in that order
/// and a missing column shows [`MISSING_CELL`].
pub fn render_html(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return EMPTY_RESULT_HTML.to_string();
    };
    let columns: Vec<&str> = first.columns().collect();

    let mut html = String::from(TABLE_OPEN);
    html.push_str("<thead><tr>");
    for column in &columns {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("</tr></thead><tbody>");

    for row in rows {
        html.push_str("<tr>");
        for column in &columns {
            let cell = match row.get(column) {
                Some(value) => escape(&display_value(value)),
                None => MISSING_CELL.to_string(),
            };
            html.push_str(&format!("<td>{}</td>", cell));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
