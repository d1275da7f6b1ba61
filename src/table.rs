use std::collections::BTreeMap;
use tracing::warn;

use crate::constants::{is_derived_column, DERIVED_COLUMNS, NUMERIC_COLUMNS, TEXT_COLUMNS};
use crate::engine::{DerivedMetrics, RowResult};
use crate::error::{RowComputationError, StructuralError};
use crate::prospect::Prospect;

/// A single column of the input table.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Number(Vec<f64>),
    /// Numeric column with gaps; a gap is a malformed value for its row
    Nullable(Vec<Option<f64>>),
    Text(Vec<String>),
    /// Text column with gaps; a gap in `name` or `position` flags the row
    NullableText(Vec<Option<String>>),
}

/// One loosely typed input value, as read from a dataframe.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Column {
    /// Infer a column type from loosely typed cells.
    ///
    /// Any text makes the column textual; numbers inside it are kept as
    /// their decimal form and NaN is a gap. Otherwise the column is numeric,
    /// nullable when it has gaps.
    pub fn from_cells(cells: Vec<Cell>) -> Column {
        if cells.iter().any(|c| matches!(c, Cell::Text(_))) {
            let values = cells
                .into_iter()
                .map(|c| match c {
                    Cell::Text(s) => Some(s),
                    Cell::Number(x) if x.is_finite() => Some(x.to_string()),
                    Cell::Number(_) | Cell::Null => None,
                })
                .collect();
            return Column::NullableText(values);
        }
        if cells.iter().any(|c| matches!(c, Cell::Null)) {
            let values = cells
                .into_iter()
                .map(|c| match c {
                    Cell::Number(x) => Some(x),
                    _ => None,
                })
                .collect();
            return Column::Nullable(values);
        }
        Column::Number(
            cells
                .into_iter()
                .map(|c| match c {
                    Cell::Number(x) => x,
                    _ => f64::NAN,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Number(v) => v.len(),
            Column::Nullable(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::NullableText(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Number(_) | Column::Nullable(_))
    }

    /// Numeric value at `row`, with gaps and non-finite numbers as `None`.
    pub fn number(&self, row: usize) -> Option<f64> {
        let value = match self {
            Column::Number(v) => v.get(row).copied(),
            Column::Nullable(v) => v.get(row).copied().flatten(),
            Column::Text(_) | Column::NullableText(_) => None,
        };
        value.filter(|x| x.is_finite())
    }

    /// Text value at `row`; `None` for gaps and numeric columns.
    pub fn text(&self, row: usize) -> Option<&str> {
        match self {
            Column::Text(v) => v.get(row).map(String::as_str),
            Column::NullableText(v) => v.get(row).and_then(|s| s.as_deref()),
            _ => None,
        }
    }

    fn numbers(&self) -> Option<Vec<f64>> {
        match self {
            Column::Number(v) => Some(v.clone()),
            Column::Nullable(v) => Some(v.iter().map(|x| x.unwrap_or(f64::NAN)).collect()),
            Column::Text(_) | Column::NullableText(_) if self.is_empty() => Some(Vec::new()),
            Column::Text(_) | Column::NullableText(_) => None,
        }
    }

    /// Text values with gaps as empty strings. A numeric column holding no
    /// finite value at all is a text column whose every cell is missing.
    fn texts(&self) -> Option<Vec<String>> {
        match self {
            Column::Text(v) => Some(v.clone()),
            Column::NullableText(v) => Some(v.iter().map(|s| s.clone().unwrap_or_default()).collect()),
            Column::Number(v) if v.iter().all(|x| !x.is_finite()) => Some(vec![String::new(); v.len()]),
            Column::Nullable(v) if v.iter().all(|x| !x.is_some_and(f64::is_finite)) => {
                Some(vec![String::new(); v.len()])
            }
            _ => None,
        }
    }
}

/// Structurally validated input table.
///
/// Holds the typed prospect rows alongside every input column so that
/// columns the engine does not use are carried through to the output.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTable {
    columns: BTreeMap<String, Column>,
    rows: Vec<Prospect>,
}

impl RawTable {
    /// Validate a column map.
    ///
    /// Columns named like derived metrics are dropped, since they are
    /// always recomputed.
    pub fn new(mut columns: BTreeMap<String, Column>) -> Result<Self, StructuralError> {
        for name in DERIVED_COLUMNS {
            if columns.remove(name).is_some() {
                warn!(column = name, "ignoring derived column in input; it will be recomputed");
            }
        }

        let mut texts: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for name in TEXT_COLUMNS {
            let column = columns
                .get(name)
                .ok_or_else(|| StructuralError::MissingColumn(name.to_string()))?;
            let values = column.texts().ok_or_else(|| StructuralError::WrongType {
                column: name.to_string(),
                expected: "text",
            })?;
            texts.insert(name, values);
        }

        let mut numbers: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for name in NUMERIC_COLUMNS {
            let column = columns
                .get(name)
                .ok_or_else(|| StructuralError::MissingColumn(name.to_string()))?;
            let values = column.numbers().ok_or_else(|| StructuralError::WrongType {
                column: name.to_string(),
                expected: "numeric",
            })?;
            numbers.insert(name, values);
        }

        let len = texts["name"].len();
        for (name, column) in &columns {
            if column.len() != len {
                return Err(StructuralError::LengthMismatch {
                    column: name.clone(),
                    expected: len,
                    actual: column.len(),
                });
            }
        }

        let rows = (0..len)
            .map(|i| Prospect {
                name: texts["name"][i].clone(),
                position: texts["position"][i].clone(),
                age: numbers["age"][i],
                points: numbers["points"][i],
                fga: numbers["fga"][i],
                fta: numbers["fta"][i],
                assists: numbers["assists"][i],
                turnovers: numbers["turnovers"][i],
                rebounds: numbers["rebounds"][i],
                games: numbers["games"][i],
                fg_pct: numbers["fg_pct"][i],
                three_pt_pct: numbers["three_pt_pct"][i],
                ft_pct: numbers["ft_pct"][i],
            })
            .collect();

        Ok(RawTable { columns, rows })
    }

    /// Build a table holding exactly the required raw columns.
    pub fn from_prospects(prospects: &[Prospect]) -> Self {
        let mut columns = BTreeMap::new();
        columns.insert(
            "name".to_string(),
            Column::Text(prospects.iter().map(|p| p.name.clone()).collect()),
        );
        columns.insert(
            "position".to_string(),
            Column::Text(prospects.iter().map(|p| p.position.clone()).collect()),
        );
        for name in NUMERIC_COLUMNS {
            let values = prospects.iter().map(|p| p.stat(name).unwrap_or(f64::NAN)).collect();
            columns.insert(name.to_string(), Column::Number(values));
        }

        RawTable {
            columns,
            rows: prospects.to_vec(),
        }
    }

    /// Add a pass-through column. Replaces any existing extra column of that name.
    pub fn with_extra_column(mut self, name: &str, column: Column) -> Result<Self, StructuralError> {
        if TEXT_COLUMNS.contains(&name) || NUMERIC_COLUMNS.contains(&name) || is_derived_column(name) {
            return Err(StructuralError::ReservedColumn(name.to_string()));
        }
        if column.len() != self.rows.len() {
            return Err(StructuralError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows.len(),
                actual: column.len(),
            });
        }
        self.columns.insert(name.to_string(), column);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Prospect] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> &BTreeMap<String, Column> {
        &self.columns
    }
}

/// Input table plus the engine's per-row results, in input order.
#[derive(Clone, Debug, PartialEq)]
pub struct AugmentedTable {
    raw: RawTable,
    results: Vec<RowResult>,
}

impl AugmentedTable {
    pub(crate) fn new(raw: RawTable, results: Vec<RowResult>) -> Self {
        debug_assert_eq!(raw.len(), results.len());
        AugmentedTable { raw, results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn raw(&self) -> &RawTable {
        &self.raw
    }

    pub fn prospect(&self, row: usize) -> Option<&Prospect> {
        self.raw.rows.get(row)
    }

    pub fn metrics(&self, row: usize) -> Option<&DerivedMetrics> {
        self.results.get(row).map(|r| &r.metrics)
    }

    pub fn errors(&self, row: usize) -> &[RowComputationError] {
        self.results.get(row).map(|r| r.errors.as_slice()).unwrap_or(&[])
    }

    /// Whether the row is well formed and counts towards aggregates.
    pub fn is_valid(&self, row: usize) -> bool {
        self.results.get(row).is_some_and(|r| !r.is_malformed())
    }

    /// Indices of well-formed rows.
    pub fn valid_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.is_valid(i))
    }

    pub fn flagged_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_malformed()).count()
    }

    /// Names of every numeric column: raw, pass-through and derived.
    pub fn numeric_columns(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .raw
            .columns
            .iter()
            .filter(|(_, c)| c.is_numeric())
            .map(|(name, _)| name.clone())
            .collect();
        names.extend(DERIVED_COLUMNS.iter().map(|s| s.to_string()));
        names
    }

    pub fn has_numeric_column(&self, name: &str) -> bool {
        is_derived_column(name) || self.raw.column(name).is_some_and(|c| c.is_numeric())
    }

    /// Numeric value of `column` at `row`; `None` for nulls and unknown columns.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        if is_derived_column(column) {
            return self.metrics(row).and_then(|m| m.get(column));
        }
        if let Some(v) = self.prospect(row).and_then(|p| p.stat(column)) {
            return Some(v).filter(|x| x.is_finite());
        }
        self.raw.column(column).and_then(|c| c.number(row))
    }

    /// Human-readable flags for each row, empty for clean rows.
    pub fn flags(&self) -> Vec<Vec<String>> {
        self.results
            .iter()
            .map(|r| r.errors.iter().map(|e| e.to_string()).collect())
            .collect()
    }

    /// Output columns: every input column plus the derived ones.
    pub fn to_columns(&self) -> BTreeMap<String, Column> {
        let mut columns = self.raw.columns.clone();
        for name in DERIVED_COLUMNS {
            let values = self.results.iter().map(|r| r.metrics.get(name)).collect();
            columns.insert(name.to_string(), Column::Nullable(values));
        }
        columns
    }
}

#[cfg(test)]
pub(crate) fn sample_columns() -> BTreeMap<String, Column> {
    let mut columns = BTreeMap::new();
    let text = |v: &[&str]| Column::Text(v.iter().map(|s| s.to_string()).collect());
    columns.insert("name".to_string(), text(&["Ace", "Bo", "Cy"]));
    columns.insert("position".to_string(), text(&["PG", "C", "SF"]));
    columns.insert("age".to_string(), Column::Number(vec![19.0, 21.0, 18.5]));
    columns.insert("points".to_string(), Column::Number(vec![20.0, 300.0, 0.0]));
    columns.insert("fga".to_string(), Column::Number(vec![15.0, 220.0, 0.0]));
    columns.insert("fta".to_string(), Column::Number(vec![5.0, 60.0, 0.0]));
    columns.insert("assists".to_string(), Column::Number(vec![5.0, 40.0, 1.0]));
    columns.insert("turnovers".to_string(), Column::Number(vec![2.0, 0.0, 1.0]));
    columns.insert("rebounds".to_string(), Column::Number(vec![8.0, 250.0, 2.0]));
    columns.insert("games".to_string(), Column::Number(vec![1.0, 30.0, 3.0]));
    columns.insert("fg_pct".to_string(), Column::Number(vec![0.45, 0.52, 0.0]));
    columns.insert("three_pt_pct".to_string(), Column::Number(vec![0.35, 0.20, 0.0]));
    columns.insert("ft_pct".to_string(), Column::Number(vec![0.80, 0.65, 0.0]));
    columns
}
