use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use statrs::distribution::Normal;

use crate::constants::FTA_POSSESSION_WEIGHT;
use crate::error::DemoError;
use crate::position::Position;
use crate::prospect::Prospect;
use crate::summary::COLLEGE_COLUMN;
use crate::table::{Column, RawTable};

/// Number of prospects on the demo board
pub const DEMO_SIZE: usize = 60;

/// Free-throw attempts per field-goal attempt in generated lines
const FT_RATE: f64 = 0.3;

const COLLEGES: [&str; 6] = ["Duke", "Kentucky", "UNC", "Kansas", "UCLA", "Arizona"];

/// Per-game line used to build season totals.
struct PerGame {
    games: f64,
    ppg: f64,
    rpg: f64,
    apg: f64,
    topg: f64,
    fg_pct: f64,
    three_pt_pct: f64,
    ft_pct: f64,
    ts_pct: f64,
}

impl PerGame {
    /// Season totals whose true shooting reproduces `ts_pct`.
    fn into_prospect(self, name: &str, position: Position, age: f64) -> Prospect {
        let points = (self.ppg * self.games).round();
        let shots = points / (2.0 * self.ts_pct);
        let fga = (shots / (1.0 + FTA_POSSESSION_WEIGHT * FT_RATE)).round();
        let fta = (fga * FT_RATE).round();

        Prospect {
            name: name.to_string(),
            position: position.to_string(),
            age,
            points,
            fga,
            fta,
            assists: (self.apg * self.games).round(),
            turnovers: (self.topg * self.games).round(),
            rebounds: (self.rpg * self.games).round(),
            games: self.games,
            fg_pct: self.fg_pct,
            three_pt_pct: self.three_pt_pct,
            ft_pct: self.ft_pct,
        }
    }
}

fn headliners() -> Vec<(Prospect, &'static str)> {
    #[rustfmt::skip]
    let lines = [
        ("Cooper Flagg", Position::PF, "Duke", 18.0, 16.5, 8.2, 4.1, 2.2, 0.478, 0.352, 0.765, 0.589),
        ("Ace Bailey", Position::SF, "Rutgers", 18.0, 15.8, 6.1, 2.3, 2.0, 0.445, 0.385, 0.825, 0.612),
        ("Dylan Harper", Position::SG, "Rutgers", 19.0, 19.2, 4.8, 4.6, 2.7, 0.512, 0.345, 0.792, 0.595),
        ("VJ Edgecombe", Position::SG, "Baylor", 19.0, 12.1, 4.9, 2.8, 2.1, 0.432, 0.298, 0.712, 0.501),
        ("Boogie Fland", Position::PG, "Arkansas", 18.0, 14.6, 3.2, 5.1, 2.4, 0.465, 0.368, 0.856, 0.578),
    ];

    lines
        .into_iter()
        .map(|(name, position, college, age, ppg, rpg, apg, topg, fg, three, ft, ts)| {
            let line = PerGame {
                games: 32.0,
                ppg,
                rpg,
                apg,
                topg,
                fg_pct: fg,
                three_pt_pct: three,
                ft_pct: ft,
                ts_pct: ts,
            };
            (line.into_prospect(name, position, age), college)
        })
        .collect()
}

fn sample_normal<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> Result<f64, DemoError> {
    let dist = Normal::new(mean, std_dev).map_err(|e| DemoError::Distribution(e.to_string()))?;
    Ok(dist.sample(rng))
}

/// Generate the demo board.
///
/// Five headline prospects with real-looking lines, then generated ones. The
/// same seed always yields the same board; `None` draws from entropy.
pub fn demo_prospects(seed: Option<u64>) -> Result<Vec<(Prospect, &'static str)>, DemoError> {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut board = headliners();

    for i in board.len() + 1..=DEMO_SIZE {
        let position = Position::ALL[rng.gen_range(0..Position::ALL.len())];
        let college = COLLEGES[rng.gen_range(0..COLLEGES.len())];

        let line = PerGame {
            games: sample_normal(&mut rng, 30.0, 3.0)?.round().clamp(20.0, 38.0),
            ppg: sample_normal(&mut rng, 12.0, 4.0)?.max(1.0),
            rpg: sample_normal(&mut rng, 5.0, 2.0)?.max(0.5),
            apg: sample_normal(&mut rng, 3.0, 2.0)?.max(0.3),
            topg: sample_normal(&mut rng, 2.2, 0.7)?.max(0.3),
            fg_pct: sample_normal(&mut rng, 0.45, 0.08)?.clamp(0.0, 1.0),
            three_pt_pct: sample_normal(&mut rng, 0.35, 0.10)?.clamp(0.0, 1.0),
            ft_pct: sample_normal(&mut rng, 0.75, 0.12)?.clamp(0.0, 1.0),
            ts_pct: sample_normal(&mut rng, 0.55, 0.08)?.clamp(0.40, 0.70),
        };
        let age = sample_normal(&mut rng, 19.0, 1.2)?.clamp(17.0, 23.0);

        board.push((line.into_prospect(&format!("Prospect {}", i), position, age), college));
    }

    Ok(board)
}

/// The demo board as a table, with a pass-through `college` column.
pub fn demo_table(seed: Option<u64>) -> Result<RawTable, DemoError> {
    let board = demo_prospects(seed)?;
    let prospects: Vec<Prospect> = board.iter().map(|(p, _)| p.clone()).collect();
    let colleges = Column::Text(board.iter().map(|(_, c)| c.to_string()).collect());

    let table = RawTable::from_prospects(&prospects).with_extra_column(COLLEGE_COLUMN, colleges)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MetricEngine;

    #[test]
    fn test_demo_size_and_headliners() {
        let table = demo_table(Some(42)).unwrap();
        assert_eq!(table.len(), DEMO_SIZE);
        assert_eq!(table.rows()[0].name, "Cooper Flagg");
        assert_eq!(table.rows()[5].name, "Prospect 6");
        assert_eq!(table.rows()[59].name, "Prospect 60");
        assert!(table.column("college").is_some());
    }

    #[test]
    fn test_demo_deterministic() {
        assert_eq!(demo_table(Some(7)).unwrap(), demo_table(Some(7)).unwrap());
        let (a, b) = (demo_table(Some(7)).unwrap(), demo_table(Some(8)).unwrap());
        assert_ne!(a.rows()[10], b.rows()[10]);
    }

    #[test]
    fn test_demo_rows_are_valid() {
        let table = MetricEngine::default().compute(demo_table(Some(1)).unwrap());
        assert_eq!(table.flagged_count(), 0);
        for row in 0..table.len() {
            let m = table.metrics(row).unwrap();
            assert!(m.true_shooting_pct.is_some());
            assert!(m.per_game_efficiency.is_some());
            assert!(m.assist_to_turnover.is_some());
        }
    }

    #[test]
    fn test_bad_distribution_is_reported() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            sample_normal(&mut rng, 0.0, -1.0),
            Err(DemoError::Distribution(_))
        ));
        assert!(sample_normal(&mut rng, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_headliner_true_shooting_close_to_source() {
        let table = MetricEngine::default().compute(demo_table(Some(1)).unwrap());
        let ts = table.metrics(0).unwrap().true_shooting_pct.unwrap();
        assert!((ts - 0.589).abs() < 0.01, "got {}", ts);
    }
}
