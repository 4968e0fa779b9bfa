//! Results Grid Module
//!
//! Renders a materialized result set for the terminal as an aligned text
//! grid, or exports it as CSV, JSON, or Markdown.

use crate::core::db::QueryResult;
use crate::core::{BatchError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How tabular outcomes are written to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
    #[serde(alias = "md")]
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(BatchError::Output(format!(
                "Unsupported output format: '{}'. Supported formats: table, csv, json, markdown",
                s
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
        };
        f.write_str(name)
    }
}

/// Limits how many rows the text grid displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub max_rows: Option<usize>,
}

impl Viewport {
    pub fn unbounded() -> Self {
        Viewport { max_rows: None }
    }

    pub fn new(max_rows: usize) -> Self {
        Viewport {
            max_rows: Some(max_rows),
        }
    }

    pub fn visible_rows<'a>(&self, rows: &'a [Vec<String>]) -> &'a [Vec<String>] {
        match self.max_rows {
            Some(max) => &rows[..max.min(rows.len())],
            None => rows,
        }
    }
}

/// A result set prepared for display.
#[derive(Debug, Clone)]
pub struct ResultsGrid<'a> {
    pub headers: &'a [String],
    pub rows: &'a [Vec<String>],
    pub viewport: Viewport,
}

impl<'a> ResultsGrid<'a> {
    pub fn new(result: &'a QueryResult) -> Self {
        ResultsGrid {
            headers: &result.columns,
            rows: &result.rows,
            viewport: Viewport::unbounded(),
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Writes the grid in `format`. Only the `table` format honors the viewport.
    pub fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.render()),
            OutputFormat::Csv => Ok(self.export_to_csv()),
            OutputFormat::Json => self.export_to_json(),
            OutputFormat::Markdown => Ok(self.export_to_markdown()),
        }
    }

    /// Renders an aligned grid with a header underline.
    ///
    /// When the viewport hides rows, a `[shown of total rows]` footer follows.
    pub fn render(&self) -> String {
        let visible = self.viewport.visible_rows(self.rows);
        let headers: Vec<Cow<str>> = self.headers.iter().map(|h| escape_line_breaks(h)).collect();
        let cells: Vec<Vec<Cow<str>>> = visible
            .iter()
            .map(|row| row.iter().map(|c| escape_line_breaks(c)).collect())
            .collect();
        let widths = column_widths(&headers, &cells);

        let mut output = String::new();
        push_line(&mut output, &headers, &widths, " | ");
        let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        output.push_str(&underline.join("-+-"));
        output.push('\n');
        for row in &cells {
            push_line(&mut output, row, &widths, " | ");
        }
        if visible.len() < self.rows.len() {
            output.push_str(&format!("[{} of {} rows]\n", visible.len(), self.rows.len()));
        }
        output
    }

    fn export_to_csv(&self) -> String {
        let mut output = String::new();
        let header: Vec<String> = self.headers.iter().map(|h| csv_field(h)).collect();
        output.push_str(&header.join(","));
        output.push('\n');
        for row in self.rows {
            let fields: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
            output.push_str(&fields.join(","));
            output.push('\n');
        }
        output
    }

    /// One object per row, keys in column order. Repeated column names get a
    /// numeric suffix (`id`, `id_2`) so no value is dropped.
    fn export_to_json(&self) -> Result<String> {
        let keys = unique_keys(self.headers);
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in self.rows {
            let mut row_map = Map::with_capacity(keys.len());
            for (key, cell) in keys.iter().zip(row) {
                row_map.insert(key.clone(), Value::String(cell.clone()));
            }
            rows.push(Value::Object(row_map));
        }
        let mut json = serde_json::to_string(&rows)?;
        json.push('\n');
        Ok(json)
    }

    fn export_to_markdown(&self) -> String {
        let mut output = String::new();
        let headers: Vec<String> = self.headers.iter().map(|h| markdown_cell(h)).collect();
        output.push_str(&format!("| {} |\n", headers.join(" | ")));
        let underline: Vec<String> = self
            .headers
            .iter()
            .map(|h| "-".repeat(h.chars().count().max(3)))
            .collect();
        output.push_str(&format!("| {} |\n", underline.join(" | ")));
        for row in self.rows {
            let cells: Vec<String> = row.iter().map(|c| markdown_cell(c)).collect();
            output.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        output
    }
}

fn column_widths(headers: &[Cow<str>], rows: &[Vec<Cow<str>>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    widths
}

fn push_line(output: &mut String, cells: &[Cow<str>], widths: &[usize], separator: &str) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    output.push_str(padded.join(separator).trim_end());
    output.push('\n');
}

/// Keeps a cell on one line of the grid.
fn escape_line_breaks(value: &str) -> Cow<str> {
    if value.contains(['\n', '\r']) {
        Cow::Owned(value.replace('\r', "\\r").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(value)
    }
}

fn markdown_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
}

fn unique_keys(headers: &[String]) -> Vec<String> {
    let original: HashSet<&str> = headers.iter().map(String::as_str).collect();
    let mut used: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut keys = Vec::with_capacity(headers.len());
    for header in headers {
        let mut key = header.clone();
        let mut suffix = 2;
        while used.contains(&key) || (key != *header && original.contains(key.as_str())) {
            key = format!("{}_{}", header, suffix);
            suffix += 1;
        }
        used.insert(key.clone());
        keys.push(key);
    }
    keys
}

fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
