/// Weight applied to free-throw attempts when estimating shooting possessions
pub const FTA_POSSESSION_WEIGHT: f64 = 0.44;

/// National average tempo (possessions per game)
pub const AVG_TEMPO: f64 = 67.7;

/// Age at which age-adjusted production is neutral
pub const AGE_PIVOT: f64 = 20.0;

/// Upper sanity bound on a prospect's age
pub const MAX_AGE: f64 = 40.0;

/// Tukey fence multiplier for outlier detection
pub const OUTLIER_IQR_MULTIPLIER: f64 = 1.5;

/// Positions a prospect can be listed at
pub const POSITIONS: [&str; 5] = ["PG", "SG", "SF", "PF", "C"];

/// Text columns every input table must carry
pub const TEXT_COLUMNS: [&str; 2] = ["name", "position"];

/// Numeric columns every input table must carry
pub const NUMERIC_COLUMNS: [&str; 11] = [
    "age",
    "points",
    "fga",
    "fta",
    "assists",
    "turnovers",
    "rebounds",
    "games",
    "fg_pct",
    "three_pt_pct",
    "ft_pct",
];

/// Columns appended by the metric engine, in output order
pub const DERIVED_COLUMNS: [&str; 6] = [
    "true_shooting_pct",
    "assist_to_turnover",
    "usage_rate",
    "per_game_efficiency",
    "age_adjusted_production",
    "shooting_consistency",
];

/// All required raw columns (text first)
pub fn raw_columns() -> Vec<&'static str> {
    TEXT_COLUMNS.iter().chain(NUMERIC_COLUMNS.iter()).copied().collect()
}

/// Whether a column name is one the engine derives
pub fn is_derived_column(name: &str) -> bool {
    DERIVED_COLUMNS.contains(&name)
}
