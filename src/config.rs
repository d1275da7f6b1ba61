use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{AGE_PIVOT, AVG_TEMPO, MAX_AGE, OUTLIER_IQR_MULTIPLIER};
use crate::error::ConfigError;

/// Weights for player-to-player similarity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub three_pt_pct: f64,
    pub age: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        SimilarityWeights {
            points: 0.3,
            rebounds: 0.2,
            assists: 0.2,
            three_pt_pct: 0.15,
            age: 0.15,
        }
    }
}

impl SimilarityWeights {
    pub fn total(&self) -> f64 {
        self.points + self.rebounds + self.assists + self.three_pt_pct + self.age
    }
}

/// Tunable constants for the metric engine.
///
/// Every field is optional in TOML; missing fields take the defaults, which
/// reproduce the reference formulas exactly.
///
/// ```toml
/// team_possessions = 70.0
/// outlier_iqr_multiplier = 2.0
///
/// [similarity]
/// points = 0.5
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Team possessions per game used as the usage-rate denominator
    pub team_possessions: f64,

    /// Age at which age-adjusted production is zero
    pub age_pivot: f64,

    /// Ages above this are treated as data errors
    pub max_age: f64,

    pub outlier_iqr_multiplier: f64,

    pub similarity: SimilarityWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            team_possessions: AVG_TEMPO,
            age_pivot: AGE_PIVOT,
            max_age: MAX_AGE,
            outlier_iqr_multiplier: OUTLIER_IQR_MULTIPLIER,
            similarity: SimilarityWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML config.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Outlier fence multiplier for one call: the requested one if given,
    /// otherwise the configured one.
    pub fn iqr_multiplier(&self, requested: Option<f64>) -> Result<f64, ConfigError> {
        match requested {
            Some(k) => check_iqr_multiplier(k),
            None => Ok(self.outlier_iqr_multiplier),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.team_possessions.is_finite() && self.team_possessions > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "team_possessions must be positive, got {}",
                self.team_possessions
            )));
        }
        if !(self.max_age.is_finite() && self.max_age > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_age must be positive, got {}",
                self.max_age
            )));
        }
        if !self.age_pivot.is_finite() {
            return Err(ConfigError::Invalid("age_pivot must be finite".to_string()));
        }
        check_iqr_multiplier(self.outlier_iqr_multiplier)?;

        let w = &self.similarity;
        let weights = [w.points, w.rebounds, w.assists, w.three_pt_pct, w.age];
        if weights.iter().any(|x| !x.is_finite() || *x < 0.0) {
            return Err(ConfigError::Invalid(
                "similarity weights must be finite and non-negative".to_string(),
            ));
        }
        if w.total() <= 0.0 {
            return Err(ConfigError::Invalid(
                "similarity weights must not all be zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_iqr_multiplier(k: f64) -> Result<f64, ConfigError> {
    if k.is_finite() && k >= 0.0 {
        Ok(k)
    } else {
        Err(ConfigError::Invalid(format!(
            "outlier_iqr_multiplier must be non-negative, got {}",
            k
        )))
    }
}
