use std::fmt;

use crate::error::RowComputationError;
use crate::position::Position;

/// One draft-eligible player's raw season line.
///
/// Counting stats are season totals. Percentages are fractions in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct Prospect {
    pub name: String,
    /// Position as it appeared in the source table
    pub position: String,
    pub age: f64,
    pub points: f64,
    pub fga: f64,
    pub fta: f64,
    pub assists: f64,
    pub turnovers: f64,
    pub rebounds: f64,
    pub games: f64,
    pub fg_pct: f64,
    pub three_pt_pct: f64,
    pub ft_pct: f64,
}

impl Prospect {
    /// Parsed position, if the listed one is recognised.
    pub fn parsed_position(&self) -> Option<Position> {
        self.position.parse().ok()
    }

    fn counts(&self) -> [(&'static str, f64); 7] {
        [
            ("points", self.points),
            ("fga", self.fga),
            ("fta", self.fta),
            ("assists", self.assists),
            ("turnovers", self.turnovers),
            ("rebounds", self.rebounds),
            ("games", self.games),
        ]
    }

    fn percentages(&self) -> [(&'static str, f64); 3] {
        [
            ("fg_pct", self.fg_pct),
            ("three_pt_pct", self.three_pt_pct),
            ("ft_pct", self.ft_pct),
        ]
    }

    /// Check the row against the input invariants.
    ///
    /// Returns every problem found, empty when the row is well formed.
    pub fn validate(&self, max_age: f64) -> Vec<RowComputationError> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push(RowComputationError::MissingText { field: "name" });
        }

        if self.position.trim().is_empty() {
            issues.push(RowComputationError::MissingText { field: "position" });
        } else if let Err(e) = self.position.parse::<Position>() {
            issues.push(e);
        }

        if !self.age.is_finite() {
            issues.push(RowComputationError::NonFinite { field: "age" });
        } else if self.age <= 0.0 || self.age > max_age {
            issues.push(RowComputationError::AgeOutOfRange {
                value: self.age,
                max: max_age,
            });
        }

        for (field, value) in self.counts() {
            if !value.is_finite() {
                issues.push(RowComputationError::NonFinite { field });
            } else if value < 0.0 {
                issues.push(RowComputationError::Negative { field, value });
            }
        }

        for (field, value) in self.percentages() {
            if !value.is_finite() {
                issues.push(RowComputationError::NonFinite { field });
            } else if !(0.0..=1.0).contains(&value) {
                issues.push(RowComputationError::PercentageOutOfRange { field, value });
            }
        }

        issues
    }

    /// Look up a raw numeric field by its column name.
    pub fn stat(&self, column: &str) -> Option<f64> {
        let value = match column {
            "age" => self.age,
            "points" => self.points,
            "fga" => self.fga,
            "fta" => self.fta,
            "assists" => self.assists,
            "turnovers" => self.turnovers,
            "rebounds" => self.rebounds,
            "games" => self.games,
            "fg_pct" => self.fg_pct,
            "three_pt_pct" => self.three_pt_pct,
            "ft_pct" => self.ft_pct,
            _ => return None,
        };
        Some(value)
    }

    pub fn points_per_game(&self) -> Option<f64> {
        per_game(self.points, self.games)
    }

    pub fn rebounds_per_game(&self) -> Option<f64> {
        per_game(self.rebounds, self.games)
    }

    pub fn assists_per_game(&self) -> Option<f64> {
        per_game(self.assists, self.games)
    }
}

fn per_game(total: f64, games: f64) -> Option<f64> {
    if games > 0.0 {
        Some(total / games)
    } else {
        None
    }
}

impl fmt::Display for Prospect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.position, self.age)
    }
}

#[cfg(test)]
pub(crate) fn sample_prospect() -> Prospect {
    Prospect {
        name: "Sample".to_string(),
        position: "SF".to_string(),
        age: 19.0,
        points: 20.0,
        fga: 15.0,
        fta: 5.0,
        assists: 5.0,
        turnovers: 2.0,
        rebounds: 8.0,
        games: 1.0,
        fg_pct: 0.45,
        three_pt_pct: 0.35,
        ft_pct: 0.80,
    }
}
