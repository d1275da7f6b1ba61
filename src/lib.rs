//! Prospect Core - metric engine for the draft prospect dashboard.
//!
//! This library derives shooting, playmaking and production metrics from raw
//! per-prospect season lines, with optional Python bindings via PyO3
//! (`python` feature).

pub mod config;
pub mod constants;
pub mod demo;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod position;
pub mod prospect;
pub mod summary;
pub mod table;
pub mod view;

#[cfg(feature = "python")]
mod python;

pub use config::{EngineConfig, SimilarityWeights};
pub use constants::{raw_columns, AVG_TEMPO, DERIVED_COLUMNS, NUMERIC_COLUMNS, TEXT_COLUMNS};
pub use demo::{demo_prospects, demo_table};
pub use engine::{compute_metrics, derive_row, DerivedMetrics, MetricEngine, RowResult};
pub use error::{ConfigError, DemoError, ErrorKind, RowComputationError, StructuralError, ViewError};
pub use metrics::{
    age_adjusted_production, assist_to_turnover, per_game_efficiency, shooting_consistency,
    true_shooting_pct, usage_rate,
};
pub use position::{parse_positions, Position};
pub use prospect::Prospect;
pub use summary::{
    column_summary, find_outliers, linear_quantile, outlier_columns, summarize, ColumnSummary,
    Outlier, TableSummary,
};
pub use table::{AugmentedTable, Cell, Column, RawTable};
pub use view::{most_similar, similarity, sort_indices, ProspectFilter};
