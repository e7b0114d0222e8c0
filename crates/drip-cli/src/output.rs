// crates/drip-cli/src/output.rs
//
// Output formatting utilities for the Drip CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
///
/// u128 amounts are emitted as JSON numbers, which serde_json handles natively.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Print `data` as JSON or as the given table rows.
pub fn emit<T: Serialize, R: Tabled>(format: OutputFormat, data: &T, rows: &[R]) {
    match format {
        OutputFormat::Json => println!("{}", format_json(data)),
        OutputFormat::Table => println!("{}", format_table(rows)),
    }
}

/// Two-column row used by key/value views.
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl FieldRow {
    pub fn new(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
