use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{RowComputationError, StructuralError};
use crate::metrics::{
    age_adjusted_production_with_pivot, assist_to_turnover, per_game_efficiency,
    shooting_consistency, true_shooting_pct, usage_rate,
};
use crate::prospect::Prospect;
use crate::table::{AugmentedTable, Column, RawTable};

/// Derived columns for one prospect. `None` is a null cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedMetrics {
    pub true_shooting_pct: Option<f64>,
    pub assist_to_turnover: Option<f64>,
    pub usage_rate: Option<f64>,
    pub per_game_efficiency: Option<f64>,
    pub age_adjusted_production: Option<f64>,
    pub shooting_consistency: Option<f64>,
}

impl DerivedMetrics {
    /// Value of a derived column by name; `None` for nulls and unknown names.
    pub fn get(&self, column: &str) -> Option<f64> {
        match column {
            "true_shooting_pct" => self.true_shooting_pct,
            "assist_to_turnover" => self.assist_to_turnover,
            "usage_rate" => self.usage_rate,
            "per_game_efficiency" => self.per_game_efficiency,
            "age_adjusted_production" => self.age_adjusted_production,
            "shooting_consistency" => self.shooting_consistency,
            _ => None,
        }
    }
}

/// Outcome of deriving one row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowResult {
    pub metrics: DerivedMetrics,
    pub errors: Vec<RowComputationError>,
}

impl RowResult {
    pub fn is_malformed(&self) -> bool {
        self.errors.iter().any(|e| e.is_malformed())
    }
}

fn guarded(
    value: Option<f64>,
    metric: &'static str,
    errors: &mut Vec<RowComputationError>,
) -> Option<f64> {
    if value.is_none() {
        errors.push(RowComputationError::DivisionGuard { metric });
    }
    value
}

/// Derive every metric for a single prospect.
///
/// A malformed row gets all-null metrics and the list of problems. A
/// well-formed row only nulls the metrics whose denominator is zero.
pub fn derive_row(prospect: &Prospect, config: &EngineConfig) -> RowResult {
    let issues = prospect.validate(config.max_age);
    if !issues.is_empty() {
        return RowResult {
            metrics: DerivedMetrics::default(),
            errors: issues,
        };
    }

    let p = prospect;
    let mut errors = Vec::new();

    let ts = guarded(
        true_shooting_pct(p.points, p.fga, p.fta),
        "true_shooting_pct",
        &mut errors,
    );
    let ast_to = guarded(
        assist_to_turnover(p.assists, p.turnovers),
        "assist_to_turnover",
        &mut errors,
    );
    let usg = guarded(
        usage_rate(p.fga, p.fta, p.turnovers, p.games, config.team_possessions),
        "usage_rate",
        &mut errors,
    );
    let pge = guarded(
        per_game_efficiency(p.points, p.rebounds, p.assists, p.games),
        "per_game_efficiency",
        &mut errors,
    );
    let aap = pge.map(|e| age_adjusted_production_with_pivot(e, p.age, config.age_pivot));
    if aap.is_none() {
        errors.push(RowComputationError::DivisionGuard {
            metric: "age_adjusted_production",
        });
    }

    RowResult {
        metrics: DerivedMetrics {
            true_shooting_pct: ts,
            assist_to_turnover: ast_to,
            usage_rate: usg,
            per_game_efficiency: pge,
            age_adjusted_production: aap,
            shooting_consistency: Some(shooting_consistency(p.fg_pct, p.three_pt_pct, p.ft_pct)),
        },
        errors,
    }
}

/// Batch metric engine.
///
/// Stateless apart from its configuration: the same table always produces the
/// same output, so callers may cache results at any granularity.
#[derive(Clone, Debug, Default)]
pub struct MetricEngine {
    config: EngineConfig,
}

impl MetricEngine {
    pub fn new(config: EngineConfig) -> Self {
        MetricEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Derive metrics for every row of a validated table.
    ///
    /// Rows are independent and processed in parallel; output order matches
    /// input order.
    pub fn compute(&self, table: RawTable) -> AugmentedTable {
        let results: Vec<RowResult> = table
            .rows()
            .par_iter()
            .map(|p| derive_row(p, &self.config))
            .collect();

        for (p, result) in table.rows().iter().zip(&results) {
            if result.is_malformed() {
                debug!(prospect = %p.name, errors = ?result.errors, "row flagged; derived fields set to null");
            }
        }

        let augmented = AugmentedTable::new(table, results);
        info!(
            rows = augmented.len(),
            flagged = augmented.flagged_count(),
            "computed prospect metrics"
        );
        augmented
    }

    /// Validate a column map and derive metrics for it.
    pub fn compute_columns(
        &self,
        columns: BTreeMap<String, Column>,
    ) -> Result<AugmentedTable, StructuralError> {
        let table = RawTable::new(columns)?;
        Ok(self.compute(table))
    }
}

/// Derive metrics with the default configuration.
pub fn compute_metrics(columns: BTreeMap<String, Column>) -> Result<AugmentedTable, StructuralError> {
    MetricEngine::default().compute_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DERIVED_COLUMNS;
    use crate::prospect::sample_prospect;
    use crate::table::sample_columns;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_reference_row() {
        let result = derive_row(&sample_prospect(), &EngineConfig::default());
        let m = &result.metrics;

        assert!(result.errors.is_empty());
        assert!(close(m.true_shooting_pct, 20.0 / (2.0 * (15.0 + 2.2))));
        assert!(close(m.assist_to_turnover, 2.5));
        assert!(close(m.per_game_efficiency, 33.0));
        assert!(close(m.age_adjusted_production, 33.0));
        assert!(close(m.shooting_consistency, 0.126));
        assert!(close(m.usage_rate, 100.0 * 19.2 / 67.7));
    }

    #[test]
    fn test_no_shots_only_nulls_true_shooting() {
        let mut p = sample_prospect();
        p.fga = 0.0;
        p.fta = 0.0;
        p.points = 0.0;
        let result = derive_row(&p, &EngineConfig::default());

        assert_eq!(result.metrics.true_shooting_pct, None);
        assert!(close(result.metrics.assist_to_turnover, 2.5));
        assert!(close(result.metrics.per_game_efficiency, 13.0));
        assert!(!result.is_malformed());
        assert_eq!(
            result.errors,
            vec![RowComputationError::DivisionGuard {
                metric: "true_shooting_pct"
            }]
        );
    }

    #[test]
    fn test_zero_games_nulls_per_game_metrics() {
        let mut p = sample_prospect();
        p.games = 0.0;
        let m = derive_row(&p, &EngineConfig::default()).metrics;

        assert_eq!(m.per_game_efficiency, None);
        assert_eq!(m.age_adjusted_production, None);
        assert_eq!(m.usage_rate, None);
        assert!(m.true_shooting_pct.is_some());
    }

    #[test]
    fn test_malformed_row_is_all_null() {
        let mut p = sample_prospect();
        p.three_pt_pct = 1.5;
        let result = derive_row(&p, &EngineConfig::default());

        assert!(result.is_malformed());
        assert_eq!(result.metrics, DerivedMetrics::default());
    }

    #[test]
    fn test_older_prospect_penalised() {
        let mut p = sample_prospect();
        p.age = 23.0;
        let m = derive_row(&p, &EngineConfig::default()).metrics;
        assert!(close(m.age_adjusted_production, -99.0));
    }

    #[test]
    fn test_custom_pivot_and_tempo() {
        let config = EngineConfig {
            age_pivot: 22.0,
            team_possessions: 100.0,
            ..EngineConfig::default()
        };
        let m = derive_row(&sample_prospect(), &config).metrics;
        assert!(close(m.age_adjusted_production, 99.0));
        assert!(close(m.usage_rate, 19.2));
    }

    #[test]
    fn test_batch_keeps_rows_and_flags() {
        let table = compute_metrics(sample_columns()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.flagged_count(), 0);

        // Bo has no turnovers, Cy has no shots
        assert_eq!(table.metrics(1).unwrap().assist_to_turnover, None);
        assert_eq!(table.metrics(2).unwrap().true_shooting_pct, None);
        assert!(close(table.metrics(1).unwrap().per_game_efficiency, 590.0 / 30.0));
        assert_eq!(table.prospect(2).unwrap().name, "Cy");
    }

    #[test]
    fn test_bad_row_does_not_abort_batch() {
        let mut columns = sample_columns();
        columns.insert("games".to_string(), Column::Number(vec![1.0, -30.0, 3.0]));
        let table = compute_metrics(columns).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.is_valid(0));
        assert!(!table.is_valid(1));
        assert!(table.is_valid(2));
        assert_eq!(table.metrics(1).unwrap(), &DerivedMetrics::default());
        assert_eq!(table.valid_rows().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(table.flags()[1], vec!["games is negative (-30)".to_string()]);
    }

    #[test]
    fn test_null_position_flags_only_that_row() {
        let mut columns = sample_columns();
        columns.insert(
            "position".to_string(),
            Column::NullableText(vec![Some("PG".to_string()), None, Some("SF".to_string())]),
        );
        let table = compute_metrics(columns).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.valid_rows().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(table.metrics(1).unwrap(), &DerivedMetrics::default());
        assert_eq!(table.flags()[1], vec!["position is missing".to_string()]);
        assert!(close(table.metrics(0).unwrap().assist_to_turnover, 2.5));
    }

    #[test]
    fn test_output_columns() {
        let mut columns = sample_columns();
        columns.insert(
            "college".to_string(),
            Column::Text(vec!["Duke".into(), "UCLA".into(), "Kansas".into()]),
        );
        let out = compute_metrics(columns.clone()).unwrap().to_columns();

        for name in DERIVED_COLUMNS {
            assert_eq!(out[name].len(), 3);
        }
        // Raw and pass-through columns are untouched
        for (name, column) in &columns {
            assert_eq!(&out[name], column);
        }
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let first = compute_metrics(sample_columns()).unwrap();
        let second = compute_metrics(first.to_columns()).unwrap();

        assert_eq!(first.to_columns(), second.to_columns());
    }

    #[test]
    fn test_structural_error_is_fatal() {
        let mut columns = sample_columns();
        columns.remove("position");
        assert!(compute_metrics(columns).is_err());
    }
}
