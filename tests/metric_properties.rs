use proptest::prelude::*;
use prospect_core::{
    compute_metrics, derive_row, EngineConfig, MetricEngine, Prospect, RawTable, DERIVED_COLUMNS,
};

fn count() -> impl Strategy<Value = f64> {
    prop_oneof![1 => Just(0.0), 4 => 0.0..600.0f64]
}

fn pct() -> impl Strategy<Value = f64> {
    prop_oneof![1 => Just(0.0), 1 => Just(1.0), 4 => 0.0..=1.0f64]
}

prop_compose! {
    fn prospect()(
        position in prop::sample::select(vec!["PG", "SG", "SF", "PF", "C"]),
        age in 0.5..=40.0f64,
        points in count(),
        fga in count(),
        fta in count(),
        assists in count(),
        turnovers in count(),
        rebounds in count(),
        games in prop_oneof![1 => Just(0.0), 4 => 1.0..40.0f64],
        fg_pct in pct(),
        three_pt_pct in pct(),
        ft_pct in pct(),
    ) -> Prospect {
        Prospect {
            name: "P".to_string(),
            position: position.to_string(),
            age, points, fga, fta, assists, turnovers, rebounds, games,
            fg_pct, three_pt_pct, ft_pct,
        }
    }
}

proptest! {
    #[test]
    fn true_shooting_null_iff_no_shots(p in prospect()) {
        let m = derive_row(&p, &EngineConfig::default()).metrics;
        let shots = p.fga + 0.44 * p.fta;
        if shots == 0.0 {
            prop_assert!(m.true_shooting_pct.is_none());
        } else {
            let expected = p.points / (2.0 * shots);
            prop_assert!((m.true_shooting_pct.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn assist_to_turnover_exact(p in prospect()) {
        let m = derive_row(&p, &EngineConfig::default()).metrics;
        if p.turnovers > 0.0 {
            prop_assert_eq!(m.assist_to_turnover, Some(p.assists / p.turnovers));
        } else {
            prop_assert!(m.assist_to_turnover.is_none());
        }
    }

    #[test]
    fn per_game_null_iff_no_games(p in prospect()) {
        let m = derive_row(&p, &EngineConfig::default()).metrics;
        prop_assert_eq!(m.per_game_efficiency.is_none(), p.games == 0.0);
        prop_assert_eq!(m.usage_rate.is_none(), p.games == 0.0);
    }

    #[test]
    fn age_adjustment_unclamped(p in prospect()) {
        let m = derive_row(&p, &EngineConfig::default()).metrics;
        if let Some(pge) = m.per_game_efficiency {
            let aap = m.age_adjusted_production.unwrap();
            prop_assert!((aap - pge * (20.0 - p.age)).abs() < 1e-9);
            if p.age > 20.0 && pge > 0.0 {
                prop_assert!(aap < 0.0);
            }
        } else {
            prop_assert!(m.age_adjusted_production.is_none());
        }
    }

    #[test]
    fn consistency_in_unit_interval(p in prospect()) {
        let m = derive_row(&p, &EngineConfig::default()).metrics;
        let sc = m.shooting_consistency.unwrap();
        prop_assert!((0.0..=1.0).contains(&sc));
    }

    #[test]
    fn batch_preserves_rows_and_is_idempotent(rows in prop::collection::vec(prospect(), 0..40)) {
        let table = RawTable::from_prospects(&rows);
        let first = MetricEngine::default().compute(table);
        prop_assert_eq!(first.len(), rows.len());

        let second = compute_metrics(first.to_columns()).unwrap();
        prop_assert_eq!(second.len(), rows.len());
        for row in 0..rows.len() {
            prop_assert_eq!(first.metrics(row), second.metrics(row));
            prop_assert_eq!(first.prospect(row), Some(&rows[row]));
        }
    }
}

#[test]
fn reference_example_row() {
    let p = Prospect {
        name: "Example".to_string(),
        position: "SG".to_string(),
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
    };
    let table = MetricEngine::default().compute(RawTable::from_prospects(&[p]));
    let columns = table.to_columns();

    let value = |name: &str| match &columns[name] {
        prospect_core::Column::Nullable(v) => v[0],
        other => panic!("unexpected column type {:?}", other),
    };

    assert!((value("true_shooting_pct").unwrap() - 0.581395).abs() < 1e-6);
    assert_eq!(value("assist_to_turnover"), Some(2.5));
    assert_eq!(value("per_game_efficiency"), Some(33.0));
    assert_eq!(value("age_adjusted_production"), Some(33.0));
    assert!((value("shooting_consistency").unwrap() - 0.126).abs() < 1e-12);
    for name in DERIVED_COLUMNS {
        assert!(columns.contains_key(name));
    }
}

#[test]
fn guard_path_keeps_rest_of_row() {
    let p = Prospect {
        name: "NoShots".to_string(),
        position: "C".to_string(),
        age: 21.0,
        points: 0.0,
        fga: 0.0,
        fta: 0.0,
        assists: 3.0,
        turnovers: 1.0,
        rebounds: 9.0,
        games: 3.0,
        fg_pct: 0.0,
        three_pt_pct: 0.0,
        ft_pct: 0.0,
    };
    let m = derive_row(&p, &EngineConfig::default()).metrics;
    assert_eq!(m.true_shooting_pct, None);
    assert_eq!(m.assist_to_turnover, Some(3.0));
    assert_eq!(m.per_game_efficiency, Some(4.0));
    assert_eq!(m.age_adjusted_production, Some(-4.0));
    assert_eq!(m.shooting_consistency, Some(0.0));
}
