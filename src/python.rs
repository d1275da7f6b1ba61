//! Python bindings for the dashboard process.

use pyo3::exceptions::{PyIOError, PyIndexError, PyKeyError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3::ToPyObject;
use std::collections::{BTreeMap, HashMap};
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::constants::{raw_columns, AVG_TEMPO, DERIVED_COLUMNS};
use crate::demo::demo_table as build_demo_table;
use crate::engine::MetricEngine;
use crate::error::{
    ConfigError, DemoError, ErrorKind, RowComputationError, StructuralError, ViewError,
};
use crate::metrics;
use crate::position::parse_positions;
use crate::summary::{find_outliers, outlier_columns, summarize};
use crate::table::{AugmentedTable, Cell, Column};
use crate::view::{most_similar, sort_indices, ProspectFilter};

fn new_err(kind: ErrorKind, message: String) -> PyErr {
    match kind {
        ErrorKind::MissingKey => PyKeyError::new_err(message),
        ErrorKind::InvalidValue => PyValueError::new_err(message),
        ErrorKind::OutOfRange => PyIndexError::new_err(message),
        ErrorKind::Io => PyIOError::new_err(message),
    }
}

impl From<StructuralError> for PyErr {
    fn from(err: StructuralError) -> PyErr {
        new_err(err.kind(), err.to_string())
    }
}

impl From<RowComputationError> for PyErr {
    fn from(err: RowComputationError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<ConfigError> for PyErr {
    fn from(err: ConfigError) -> PyErr {
        new_err(err.kind(), err.to_string())
    }
}

impl From<ViewError> for PyErr {
    fn from(err: ViewError) -> PyErr {
        new_err(err.kind(), err.to_string())
    }
}

impl From<DemoError> for PyErr {
    fn from(err: DemoError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// One list element from `DataFrame.to_dict("list")`. Missing values arrive
/// as `None` or float `nan`, including inside text columns.
struct InputCell(Cell);

impl<'py> FromPyObject<'py> for InputCell {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        if ob.is_none() {
            return Ok(InputCell(Cell::Null));
        }
        if let Ok(s) = ob.extract::<String>() {
            return Ok(InputCell(Cell::Text(s)));
        }
        if let Ok(x) = ob.extract::<f64>() {
            return Ok(InputCell(Cell::Number(x)));
        }
        Err(PyTypeError::new_err(format!(
            "unsupported cell type `{}`",
            ob.get_type().name()?
        )))
    }
}

fn column_to_py(py: Python<'_>, column: &Column) -> PyObject {
    match column {
        Column::Number(v) => v.to_object(py),
        Column::Nullable(v) => v.to_object(py),
        Column::Text(v) => v.to_object(py),
        Column::NullableText(v) => v.to_object(py),
    }
}

fn columns_to_dict<'py>(
    py: Python<'py>,
    columns: &BTreeMap<String, Column>,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for (name, column) in columns {
        dict.set_item(name, column_to_py(py, column))?;
    }
    Ok(dict)
}

/// Prospect table with derived metrics, as returned by `compute_metrics`.
#[pyclass(name = "MetricTable")]
pub struct PyMetricTable {
    inner: AugmentedTable,
    config: EngineConfig,
}

#[pymethods]
impl PyMetricTable {
    /// All input columns plus the derived ones, as a dict of lists.
    pub fn columns<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        columns_to_dict(py, &self.inner.to_columns())
    }

    /// Per-row problem descriptions; empty lists for clean rows.
    pub fn flags(&self) -> Vec<Vec<String>> {
        self.inner.flags()
    }

    /// Whether each row is well formed.
    pub fn valid(&self) -> Vec<bool> {
        (0..self.inner.len()).map(|i| self.inner.is_valid(i)).collect()
    }

    /// Summary statistics over well-formed rows.
    pub fn summary<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let summary = summarize(&self.inner);

        let columns = PyDict::new_bound(py);
        for (name, s) in &summary.columns {
            let stats = PyDict::new_bound(py);
            stats.set_item("count", s.count)?;
            stats.set_item("mean", s.mean)?;
            stats.set_item("median", s.median)?;
            stats.set_item("std", s.std_dev)?;
            stats.set_item("min", s.min)?;
            stats.set_item("max", s.max)?;
            columns.set_item(name, stats)?;
        }

        let dict = PyDict::new_bound(py);
        dict.set_item("columns", columns)?;
        dict.set_item("position_counts", summary.position_counts.to_object(py))?;
        dict.set_item("group_counts", summary.group_counts.to_object(py))?;
        dict.set_item("top_colleges", summary.top_colleges.to_object(py))?;
        dict.set_item("valid_rows", summary.valid_rows)?;
        dict.set_item("flagged_rows", summary.flagged_rows)?;
        Ok(dict)
    }

    /// Outlier rows as `(row, name, reasons)` tuples.
    #[pyo3(signature = (columns = None, iqr_multiplier = None))]
    pub fn outliers(
        &self,
        columns: Option<Vec<String>>,
        iqr_multiplier: Option<f64>,
    ) -> PyResult<Vec<(usize, String, Vec<String>)>> {
        let names = outlier_columns(columns);
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let k = self.config.iqr_multiplier(iqr_multiplier)?;

        Ok(find_outliers(&self.inner, &names, k)?
            .into_iter()
            .map(|o| (o.row, o.name, o.reasons))
            .collect())
    }

    /// Indices of rows matching every given criterion.
    #[pyo3(signature = (
        positions = None,
        age_range = None,
        min_ppg = None,
        min_rpg = None,
        min_apg = None,
        min_three_pt_pct = None,
        colleges = None,
        search = None
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn filter(
        &self,
        positions: Option<Vec<String>>,
        age_range: Option<(f64, f64)>,
        min_ppg: Option<f64>,
        min_rpg: Option<f64>,
        min_apg: Option<f64>,
        min_three_pt_pct: Option<f64>,
        colleges: Option<Vec<String>>,
        search: Option<String>,
    ) -> PyResult<Vec<usize>> {
        let positions = parse_positions(&positions.unwrap_or_default())?;

        let filter = ProspectFilter {
            positions,
            age_range,
            min_points_per_game: min_ppg,
            min_rebounds_per_game: min_rpg,
            min_assists_per_game: min_apg,
            min_three_pt_pct,
            colleges: colleges.unwrap_or_default(),
            search,
        };
        Ok(filter.apply(&self.inner))
    }

    /// Row indices ordered by a numeric column, nulls last.
    #[pyo3(signature = (column, ascending = true))]
    pub fn sort(&self, column: &str, ascending: bool) -> PyResult<Vec<usize>> {
        Ok(sort_indices(&self.inner, column, ascending)?)
    }

    /// The `n` most similar well-formed rows as `(row, score)` pairs.
    #[pyo3(signature = (row, n = 5))]
    pub fn most_similar(&self, row: usize, n: usize) -> PyResult<Vec<(usize, f64)>> {
        Ok(most_similar(&self.inner, row, n, &self.config.similarity)?)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "MetricTable({} rows, {} flagged)",
            self.inner.len(),
            self.inner.flagged_count()
        )
    }
}

/// Derive metrics for a dict-of-lists table.
///
/// `config` is an optional TOML string overriding engine constants.
#[pyfunction]
#[pyo3(signature = (columns, config = None))]
fn compute_metrics(
    columns: HashMap<String, Vec<InputCell>>,
    config: Option<&str>,
) -> PyResult<PyMetricTable> {
    let config = match config {
        Some(toml) => EngineConfig::from_toml_str(toml)?,
        None => EngineConfig::default(),
    };
    let columns: BTreeMap<String, Column> = columns
        .into_iter()
        .map(|(name, cells)| (name, Column::from_cells(cells.into_iter().map(|c| c.0).collect())))
        .collect();

    let engine = MetricEngine::new(config.clone());
    let inner = engine.compute_columns(columns)?;
    Ok(PyMetricTable { inner, config })
}

/// Deterministic demo board as a dict of lists.
#[pyfunction]
#[pyo3(signature = (seed = None))]
fn demo_table(py: Python<'_>, seed: Option<u64>) -> PyResult<Bound<'_, PyDict>> {
    let table = build_demo_table(seed)?;
    columns_to_dict(py, table.columns())
}

#[pyfunction(name = "true_shooting_pct")]
fn py_true_shooting_pct(points: f64, fga: f64, fta: f64) -> Option<f64> {
    metrics::true_shooting_pct(points, fga, fta)
}

#[pyfunction(name = "assist_to_turnover")]
fn py_assist_to_turnover(assists: f64, turnovers: f64) -> Option<f64> {
    metrics::assist_to_turnover(assists, turnovers)
}

#[pyfunction(name = "usage_rate")]
#[pyo3(signature = (fga, fta, turnovers, games, team_possessions = AVG_TEMPO))]
fn py_usage_rate(fga: f64, fta: f64, turnovers: f64, games: f64, team_possessions: f64) -> Option<f64> {
    metrics::usage_rate(fga, fta, turnovers, games, team_possessions)
}

#[pyfunction(name = "per_game_efficiency")]
fn py_per_game_efficiency(points: f64, rebounds: f64, assists: f64, games: f64) -> Option<f64> {
    metrics::per_game_efficiency(points, rebounds, assists, games)
}

#[pyfunction(name = "age_adjusted_production")]
fn py_age_adjusted_production(per_game_efficiency: f64, age: f64) -> f64 {
    metrics::age_adjusted_production(per_game_efficiency, age)
}

#[pyfunction(name = "shooting_consistency")]
fn py_shooting_consistency(fg_pct: f64, three_pt_pct: f64, ft_pct: f64) -> f64 {
    metrics::shooting_consistency(fg_pct, three_pt_pct, ft_pct)
}

/// Install a stderr `tracing` subscriber. Returns `False` if one was already set.
#[pyfunction]
#[pyo3(signature = (level = "info"))]
fn init_logging(level: &str) -> PyResult<bool> {
    let filter = EnvFilter::try_new(level)
        .map_err(|e| PyValueError::new_err(format!("invalid log filter `{}`: {}", level, e)))?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok())
}

/// Python module definition
#[pymodule]
fn prospect_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Classes
    m.add_class::<PyMetricTable>()?;

    // Batch
    m.add_function(wrap_pyfunction!(compute_metrics, m)?)?;
    m.add_function(wrap_pyfunction!(demo_table, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;

    // Single-value metrics
    m.add_function(wrap_pyfunction!(py_true_shooting_pct, m)?)?;
    m.add_function(wrap_pyfunction!(py_assist_to_turnover, m)?)?;
    m.add_function(wrap_pyfunction!(py_usage_rate, m)?)?;
    m.add_function(wrap_pyfunction!(py_per_game_efficiency, m)?)?;
    m.add_function(wrap_pyfunction!(py_age_adjusted_production, m)?)?;
    m.add_function(wrap_pyfunction!(py_shooting_consistency, m)?)?;

    // Constants
    m.add("RAW_COLUMNS", raw_columns())?;
    m.add("DERIVED_COLUMNS", DERIVED_COLUMNS.to_vec())?;
    m.add("AVG_TEMPO", AVG_TEMPO)?;

    Ok(())
}
