use std::cmp::Ordering;

use crate::config::SimilarityWeights;
use crate::error::ViewError;
use crate::position::Position;
use crate::prospect::Prospect;
use crate::summary::COLLEGE_COLUMN;
use crate::table::AugmentedTable;

/// Read-only row filter for the prospect board.
///
/// Unset criteria match everything. A stat threshold only matches rows where
/// the stat is defined.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProspectFilter {
    pub positions: Vec<Position>,
    /// Inclusive (min, max)
    pub age_range: Option<(f64, f64)>,
    pub min_points_per_game: Option<f64>,
    pub min_rebounds_per_game: Option<f64>,
    pub min_assists_per_game: Option<f64>,
    pub min_three_pt_pct: Option<f64>,
    /// Exact school names; rows without a college never match
    pub colleges: Vec<String>,
    /// Case-insensitive substring of name, college or position
    pub search: Option<String>,
}

fn at_least(value: Option<f64>, min: Option<f64>) -> bool {
    match min {
        None => true,
        Some(min) => value.is_some_and(|v| v >= min),
    }
}

impl ProspectFilter {
    /// Whether a prospect passes, given its value in the `college` column
    /// (`None` when the table has no such column or the cell is empty).
    pub fn matches(&self, p: &Prospect, college: Option<&str>) -> bool {
        if !self.positions.is_empty() {
            match p.parsed_position() {
                Some(pos) if self.positions.contains(&pos) => {}
                _ => return false,
            }
        }

        if let Some((min, max)) = self.age_range {
            if !(p.age >= min && p.age <= max) {
                return false;
            }
        }

        if !at_least(p.points_per_game(), self.min_points_per_game)
            || !at_least(p.rebounds_per_game(), self.min_rebounds_per_game)
            || !at_least(p.assists_per_game(), self.min_assists_per_game)
            || !at_least(Some(p.three_pt_pct).filter(|v| v.is_finite()), self.min_three_pt_pct)
        {
            return false;
        }

        if !self.colleges.is_empty() {
            match college {
                Some(c) if self.colleges.iter().any(|wanted| wanted == c) => {}
                _ => return false,
            }
        }

        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = p.name.to_lowercase().contains(&term)
                || college.is_some_and(|c| c.to_lowercase().contains(&term))
                || p.position.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        true
    }

    /// Indices of matching rows, in table order.
    pub fn apply(&self, table: &AugmentedTable) -> Vec<usize> {
        let colleges = table.raw().column(COLLEGE_COLUMN);
        table
            .raw()
            .rows()
            .iter()
            .enumerate()
            .filter(|(i, p)| self.matches(p, colleges.and_then(|c| c.text(*i))))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Row indices ordered by a numeric column. Nulls sort last either way; ties
/// keep table order.
pub fn sort_indices(
    table: &AugmentedTable,
    column: &str,
    ascending: bool,
) -> Result<Vec<usize>, ViewError> {
    if !table.has_numeric_column(column) {
        return Err(ViewError::UnknownColumn(column.to_string()));
    }

    let mut keyed: Vec<(usize, Option<f64>)> =
        (0..table.len()).map(|i| (i, table.value(i, column))).collect();

    keyed.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(b).unwrap_or(Ordering::Equal);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    Ok(keyed.into_iter().map(|(i, _)| i).collect())
}

/// Weighted similarity between two prospects, in [0, 1].
///
/// Each stat's difference is scaled by a fixed spread and floored at zero.
/// Stats undefined for either player are skipped.
pub fn similarity(a: &Prospect, b: &Prospect, weights: &SimilarityWeights) -> f64 {
    let stats = [
        (a.points_per_game(), b.points_per_game(), 30.0, weights.points),
        (a.rebounds_per_game(), b.rebounds_per_game(), 15.0, weights.rebounds),
        (a.assists_per_game(), b.assists_per_game(), 10.0, weights.assists),
        (Some(a.three_pt_pct), Some(b.three_pt_pct), 0.5, weights.three_pt_pct),
        (Some(a.age), Some(b.age), 5.0, weights.age),
    ];

    let mut score = 0.0;
    let mut total_weight = 0.0;
    for (x, y, spread, weight) in stats {
        let (Some(x), Some(y)) = (x, y) else {
            continue;
        };
        let diff = (x - y).abs() / spread;
        score += (1.0 - diff).max(0.0) * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        score / total_weight
    } else {
        0.0
    }
}

/// The `n` well-formed rows most similar to `row`, best first.
pub fn most_similar(
    table: &AugmentedTable,
    row: usize,
    n: usize,
    weights: &SimilarityWeights,
) -> Result<Vec<(usize, f64)>, ViewError> {
    let target = table.prospect(row).ok_or(ViewError::RowOutOfRange {
        row,
        len: table.len(),
    })?;

    let mut scored: Vec<(usize, f64)> = table
        .valid_rows()
        .filter(|&i| i != row)
        .filter_map(|i| table.prospect(i).map(|p| (i, similarity(target, p, weights))))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(n);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_table;
    use crate::engine::{compute_metrics, MetricEngine};
    use crate::prospect::sample_prospect;
    use crate::table::{sample_columns, Column};

    #[test]
    fn test_filter_positions_and_search() {
        let table = compute_metrics(sample_columns()).unwrap();

        let filter = ProspectFilter {
            positions: vec![Position::PG, Position::SF],
            ..Default::default()
        };
        assert_eq!(filter.apply(&table), vec![0, 2]);

        let filter = ProspectFilter {
            search: Some("  bO ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&table), vec![1]);

        assert_eq!(ProspectFilter::default().apply(&table), vec![0, 1, 2]);
    }

    #[test]
    fn test_search_and_filter_by_college() {
        let board = MetricEngine::default().compute(demo_table(Some(42)).unwrap());
        let filter = ProspectFilter {
            search: Some("duke".to_string()),
            ..Default::default()
        };
        let hits = filter.apply(&board);
        assert_eq!(hits.first(), Some(&0));

        let mut columns = sample_columns();
        columns.insert(
            "college".to_string(),
            Column::Text(vec!["Duke".into(), "UCLA".into(), "Duke".into()]),
        );
        let table = compute_metrics(columns).unwrap();

        let filter = ProspectFilter {
            colleges: vec!["Duke".to_string()],
            ..Default::default()
        };
        assert_eq!(filter.apply(&table), vec![0, 2]);

        let filter = ProspectFilter {
            search: Some("ucl".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&table), vec![1]);

        // No college column: a college filter matches nothing
        let plain = compute_metrics(sample_columns()).unwrap();
        let filter = ProspectFilter {
            colleges: vec!["Duke".to_string()],
            ..Default::default()
        };
        assert!(filter.apply(&plain).is_empty());
    }

    #[test]
    fn test_filter_thresholds() {
        let table = compute_metrics(sample_columns()).unwrap();

        let filter = ProspectFilter {
            min_points_per_game: Some(10.0),
            age_range: Some((18.0, 20.0)),
            ..Default::default()
        };
        assert_eq!(filter.apply(&table), vec![0]);

        let filter = ProspectFilter {
            min_three_pt_pct: Some(0.3),
            ..Default::default()
        };
        assert_eq!(filter.apply(&table), vec![0]);
    }

    #[test]
    fn test_sort_nulls_last() {
        let table = compute_metrics(sample_columns()).unwrap();

        // Cy's true shooting is null
        let asc = sort_indices(&table, "true_shooting_pct", true).unwrap();
        assert_eq!(asc[2], 2);
        let desc = sort_indices(&table, "true_shooting_pct", false).unwrap();
        assert_eq!(desc[2], 2);
        assert_eq!(asc[0], desc[1]);

        let by_age = sort_indices(&table, "age", true).unwrap();
        assert_eq!(by_age, vec![2, 0, 1]);

        assert!(sort_indices(&table, "college", true).is_err());
    }

    #[test]
    fn test_similarity_bounds() {
        let weights = SimilarityWeights::default();
        let p = sample_prospect();
        assert!((similarity(&p, &p, &weights) - 1.0).abs() < 1e-12);

        let mut far = sample_prospect();
        far.points = 200.0;
        far.rebounds = 100.0;
        far.assists = 100.0;
        far.three_pt_pct = 1.0;
        far.age = 30.0;
        assert_eq!(similarity(&p, &far, &weights), 0.0);
    }

    #[test]
    fn test_most_similar() {
        let table = compute_metrics(sample_columns()).unwrap();
        let weights = SimilarityWeights::default();

        let similar = most_similar(&table, 0, 1, &weights).unwrap();
        assert_eq!(similar.len(), 1);
        assert_ne!(similar[0].0, 0);

        assert_eq!(
            most_similar(&table, 7, 1, &weights).unwrap_err(),
            ViewError::RowOutOfRange { row: 7, len: 3 }
        );
    }
}
