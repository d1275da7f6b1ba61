use statrs::statistics::{Data, Median, Statistics};
use std::collections::BTreeMap;

use crate::error::ViewError;
use crate::position::Position;
use crate::table::AugmentedTable;

/// Columns scanned for outliers when the caller does not name any.
pub const DEFAULT_OUTLIER_COLUMNS: [&str; 5] = [
    "per_game_efficiency",
    "true_shooting_pct",
    "usage_rate",
    "three_pt_pct",
    "assist_to_turnover",
];

/// Pass-through column holding each prospect's school
pub const COLLEGE_COLUMN: &str = "college";

/// How many schools `TableSummary::top_colleges` lists
pub const TOP_COLLEGES: usize = 10;

/// Requested outlier columns, or the defaults when none were named.
pub fn outlier_columns(requested: Option<Vec<String>>) -> Vec<String> {
    requested.unwrap_or_else(|| DEFAULT_OUTLIER_COLUMNS.iter().map(|s| s.to_string()).collect())
}

/// Descriptive statistics for one numeric column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation, `None` with fewer than two values
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Aggregate view over the well-formed rows of a table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSummary {
    pub columns: BTreeMap<String, ColumnSummary>,
    pub position_counts: BTreeMap<String, usize>,
    /// Counts per position group (Guards, Wings, Forwards, Bigs)
    pub group_counts: BTreeMap<String, usize>,
    /// Most common schools, most frequent first, ties by name. Empty
    /// without a `college` column.
    pub top_colleges: Vec<(String, usize)>,
    pub valid_rows: usize,
    pub flagged_rows: usize,
}

/// Summarise a set of values; `None` if there are none.
pub fn column_summary(values: &[f64]) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }

    let std_dev = if values.len() > 1 {
        Some(Statistics::std_dev(values.iter()))
    } else {
        None
    };

    Some(ColumnSummary {
        count: values.len(),
        mean: Statistics::mean(values.iter()),
        median: Data::new(values.to_vec()).median(),
        std_dev,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Non-null values of `column` over the well-formed rows.
fn valid_values(table: &AugmentedTable, column: &str) -> Vec<(usize, f64)> {
    table
        .valid_rows()
        .filter_map(|row| table.value(row, column).map(|v| (row, v)))
        .collect()
}

/// Summary statistics for every numeric column, skipping flagged rows and nulls.
pub fn summarize(table: &AugmentedTable) -> TableSummary {
    let mut columns = BTreeMap::new();
    for name in table.numeric_columns() {
        let values: Vec<f64> = valid_values(table, &name).into_iter().map(|(_, v)| v).collect();
        if let Some(summary) = column_summary(&values) {
            columns.insert(name, summary);
        }
    }

    let positions: Vec<Position> = table
        .valid_rows()
        .filter_map(|row| table.prospect(row).and_then(|p| p.parsed_position()))
        .collect();

    let mut position_counts = BTreeMap::new();
    let mut group_counts = BTreeMap::new();
    for position in positions {
        *position_counts.entry(position.to_string()).or_insert(0) += 1;
        *group_counts.entry(position.group().to_string()).or_insert(0) += 1;
    }

    let flagged_rows = table.flagged_count();
    TableSummary {
        columns,
        position_counts,
        group_counts,
        top_colleges: top_colleges(table),
        valid_rows: table.len() - flagged_rows,
        flagged_rows,
    }
}

fn top_colleges(table: &AugmentedTable) -> Vec<(String, usize)> {
    let Some(column) = table.raw().column(COLLEGE_COLUMN) else {
        return Vec::new();
    };

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in table.valid_rows() {
        if let Some(college) = column.text(row) {
            *counts.entry(college).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<(String, usize)> =
        counts.into_iter().map(|(name, n)| (name.to_string(), n)).collect();
    // BTreeMap order plus a stable sort breaks ties by name
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_COLLEGES);
    counts
}

/// Quantile `p` of sorted values by linear interpolation between closest
/// ranks, the estimator pandas uses by default.
pub fn linear_quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// A row lying outside the Tukey fences of at least one column.
#[derive(Clone, Debug, PartialEq)]
pub struct Outlier {
    pub row: usize,
    pub name: String,
    /// `High <column>` or `Low <column>`, in the order the columns were given
    pub reasons: Vec<String>,
}

/// Find rows outside `[Q1 - k*IQR, Q3 + k*IQR]` for any of `columns`.
///
/// Only well-formed rows with a non-null value take part. Results are in row order.
pub fn find_outliers(
    table: &AugmentedTable,
    columns: &[&str],
    iqr_multiplier: f64,
) -> Result<Vec<Outlier>, ViewError> {
    let mut reasons: BTreeMap<usize, Vec<String>> = BTreeMap::new();

    for &column in columns {
        if !table.has_numeric_column(column) {
            return Err(ViewError::UnknownColumn(column.to_string()));
        }

        let values = valid_values(table, column);
        let mut sorted: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
        sorted.sort_by(f64::total_cmp);
        let (Some(q1), Some(q3)) = (linear_quantile(&sorted, 0.25), linear_quantile(&sorted, 0.75))
        else {
            continue;
        };
        let iqr = q3 - q1;
        let lower = q1 - iqr_multiplier * iqr;
        let upper = q3 + iqr_multiplier * iqr;

        for (row, value) in values {
            if value > upper {
                reasons.entry(row).or_default().push(format!("High {}", column));
            } else if value < lower {
                reasons.entry(row).or_default().push(format!("Low {}", column));
            }
        }
    }

    Ok(reasons
        .into_iter()
        .map(|(row, reasons)| Outlier {
            row,
            name: table.prospect(row).map(|p| p.name.clone()).unwrap_or_default(),
            reasons,
        })
        .collect())
}
