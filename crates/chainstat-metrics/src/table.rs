//! Tabular metric output.
//!
//! A [`MetricsTable`] holds one row per graph over a fixed, ordered column
//! list. Cells are loosely typed ([`Cell`]) so that counts stay integers,
//! undefined metrics stay null, and normalized output can be written back
//! into the same shape.
//!
//! [`z_normalize`] standardizes numeric columns across rows and ranks the
//! rows by one column.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeStruct, Serializer};

use crate::error::MetricsError;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One table value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Null,
    Text(String),
}

impl Cell {
    /// Integer cell from a count, saturating at `i64::MAX`.
    #[must_use]
    pub fn count(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }

    /// Float cell, or null for `None`.
    #[must_use]
    pub fn optional(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Float)
    }

    /// Numeric value of the cell, if it has one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Null | Self::Text(_) => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Self::Null => f.write_str("-"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// MetricsTable
// ---------------------------------------------------------------------------

/// One named row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// Rows of cells over a fixed column list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl MetricsTable {
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with nulls; extra cells are dropped.
    pub fn push_row(&mut self, name: impl Into<String>, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Null);
        self.rows.push(Row {
            name: name.into(),
            cells,
        });
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    #[must_use]
    pub fn row(&self, name: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// Cell at (`name`, `column`).
    #[must_use]
    pub fn value(&self, name: &str, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.row(name).and_then(|row| row.cells.get(col))
    }

    /// `(row name, cell)` pairs of one column in row order.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::UnknownColumn`] if `column` is not in the table.
    pub fn column(&self, column: &str) -> Result<Vec<(&str, &Cell)>, MetricsError> {
        let col = self.require_column(column)?;
        Ok(self
            .rows
            .iter()
            .map(|row| (row.name.as_str(), &row.cells[col]))
            .collect())
    }

    /// A copy with rows sorted descending by `column`.
    ///
    /// Non-numeric cells sort last; ties are ordered by row name.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::UnknownColumn`] if `column` is not in the table.
    pub fn sorted_by(&self, column: &str) -> Result<Self, MetricsError> {
        let mut sorted = self.clone();
        sorted.sort_rows(column)?;
        Ok(sorted)
    }

    fn sort_rows(&mut self, column: &str) -> Result<(), MetricsError> {
        let col = self.require_column(column)?;
        self.rows.sort_by(|a, b| {
            descending_nulls_last(a.cells[col].as_f64(), b.cells[col].as_f64())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(())
    }

    fn require_column(&self, column: &str) -> Result<usize, MetricsError> {
        self.column_index(column)
            .ok_or_else(|| MetricsError::UnknownColumn(column.to_string()))
    }
}

fn descending_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

struct RowView<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 1))?;
        map.serialize_entry("name", &self.row.name)?;
        for (column, cell) in self.columns.iter().zip(&self.row.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

impl Serialize for MetricsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowView<'_>> = self
            .rows
            .iter()
            .map(|row| RowView {
                columns: &self.columns,
                row,
            })
            .collect();
        let mut table = serializer.serialize_struct("MetricsTable", 2)?;
        table.serialize_field("columns", &self.columns)?;
        table.serialize_field("rows", &rows)?;
        table.end()
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Z-score every numeric column not listed in `exclude`, then sort rows
/// descending by `sort_by`.
///
/// Statistics use the sample standard deviation (ddof = 1) over the non-null
/// cells of each column; null cells stay null. A column with fewer than two
/// values, or with zero spread, normalizes to `0.0`. Columns holding any text
/// pass through unchanged, as do excluded columns.
///
/// # Errors
///
/// Returns [`MetricsError::UnknownColumn`] if `sort_by` is not a column.
pub fn z_normalize(
    table: &MetricsTable,
    sort_by: &str,
    exclude: &[&str],
) -> Result<MetricsTable, MetricsError> {
    table.require_column(sort_by)?;

    let mut normalized = table.clone();
    for (col, name) in table.columns.iter().enumerate() {
        if exclude.contains(&name.as_str()) {
            continue;
        }
        if table.rows.iter().any(|row| row.cells[col].is_text()) {
            continue;
        }

        let values: Vec<f64> = table
            .rows
            .iter()
            .filter_map(|row| row.cells[col].as_f64())
            .collect();
        let stats = ColumnStats::of(&values);

        for row in &mut normalized.rows {
            if let Some(value) = row.cells[col].as_f64() {
                row.cells[col] = Cell::Float(stats.z_score(value));
            }
        }
    }

    normalized.sort_rows(sort_by)?;
    Ok(normalized)
}

/// Mean and sample standard deviation of a column; `None` spread means the
/// column normalizes to zero.
struct ColumnStats {
    mean: f64,
    std_dev: Option<f64>,
}

impl ColumnStats {
    #[allow(clippy::cast_precision_loss)]
    fn of(values: &[f64]) -> Self {
        if values.len() < 2 {
            return Self {
                mean: 0.0,
                std_dev: None,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();
        Self {
            mean,
            std_dev: (std_dev > 0.0 && std_dev.is_finite()).then_some(std_dev),
        }
    }

    fn z_score(&self, value: f64) -> f64 {
        self.std_dev.map_or(0.0, |sd| (value - self.mean) / sd)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetricsTable {
        let mut table = MetricsTable::new(["nodes", "density", "reciprocity"]);
        table.push_row("b", vec![Cell::Int(10), Cell::Float(0.5), Cell::Null]);
        table.push_row("a", vec![Cell::Int(20), Cell::Float(0.5), Cell::Float(0.2)]);
        table.push_row("c", vec![Cell::Int(30), Cell::Float(0.5), Cell::Float(0.4)]);
        table
    }

    #[test]
    fn lookup_by_name_and_column() {
        let table = sample();
        assert_eq!(table.value("a", "nodes"), Some(&Cell::Int(20)));
        assert_eq!(table.value("a", "missing"), None);
        assert_eq!(table.value("zz", "nodes"), None);
        assert_eq!(table.column_index("reciprocity"), Some(2));
    }

    #[test]
    fn short_rows_are_padded() {
        let mut table = MetricsTable::new(["x", "y"]);
        table.push_row("r", vec![Cell::Int(1)]);
        assert_eq!(table.rows()[0].cells, vec![Cell::Int(1), Cell::Null]);
    }

    #[test]
    fn z_scores_use_sample_std() {
        let normalized = z_normalize(&sample(), "nodes", &[]).expect("normalize");
        // nodes: mean 20, sample std 10.
        assert_eq!(normalized.value("c", "nodes"), Some(&Cell::Float(1.0)));
        assert_eq!(normalized.value("a", "nodes"), Some(&Cell::Float(0.0)));
        assert_eq!(normalized.value("b", "nodes"), Some(&Cell::Float(-1.0)));
    }

    #[test]
    fn constant_column_normalizes_to_zero() {
        let normalized = z_normalize(&sample(), "nodes", &[]).expect("normalize");
        for row in normalized.rows() {
            assert_eq!(row.cells[1], Cell::Float(0.0));
        }
    }

    #[test]
    fn nulls_are_skipped_and_preserved() {
        let normalized = z_normalize(&sample(), "nodes", &[]).expect("normalize");
        assert_eq!(normalized.value("b", "reciprocity"), Some(&Cell::Null));
        let a = normalized.value("a", "reciprocity").and_then(Cell::as_f64).expect("a");
        let c = normalized.value("c", "reciprocity").and_then(Cell::as_f64).expect("c");
        assert!((a + c).abs() < 1e-12);
        assert!(c > 0.0);
    }

    #[test]
    fn single_value_column_is_zero_filled() {
        let mut table = MetricsTable::new(["x"]);
        table.push_row("only", vec![Cell::Float(3.5)]);
        let normalized = z_normalize(&table, "x", &[]).expect("normalize");
        assert_eq!(normalized.value("only", "x"), Some(&Cell::Float(0.0)));
    }

    #[test]
    fn excluded_columns_pass_through() {
        let normalized = z_normalize(&sample(), "nodes", &["nodes"]).expect("normalize");
        assert_eq!(normalized.value("c", "nodes"), Some(&Cell::Int(30)));
    }

    #[test]
    fn rows_sort_descending_with_nulls_last() {
        let normalized = z_normalize(&sample(), "reciprocity", &[]).expect("normalize");
        let order: Vec<&str> = normalized.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn ties_sort_by_name() {
        let sorted = sample().sorted_by("density").expect("sort");
        let order: Vec<&str> = sorted.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_sort_column_is_an_error() {
        let err = z_normalize(&sample(), "bogus", &[]).expect_err("unknown column");
        assert_eq!(err, MetricsError::UnknownColumn("bogus".into()));
    }

    #[test]
    fn text_columns_pass_through() {
        let mut table = MetricsTable::new(["label", "x"]);
        table.push_row("r1", vec![Cell::Text("alpha".into()), Cell::Int(1)]);
        table.push_row("r2", vec![Cell::Text("beta".into()), Cell::Int(3)]);
        let normalized = z_normalize(&table, "x", &[]).expect("normalize");
        assert_eq!(normalized.value("r1", "label"), Some(&Cell::Text("alpha".into())));
    }

    #[test]
    fn serializes_rows_as_records() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["columns"][0], "nodes");
        assert_eq!(json["rows"][0]["name"], "b");
        assert_eq!(json["rows"][0]["nodes"], 10);
        assert!(json["rows"][0]["reciprocity"].is_null());
    }

    #[test]
    fn display_honors_precision() {
        assert_eq!(format!("{:.3}", Cell::Float(0.123_456)), "0.123");
        assert_eq!(format!("{}", Cell::Null), "-");
        assert_eq!(format!("{}", Cell::count(7)), "7");
    }
}
