use crate::constants::{AGE_PIVOT, FTA_POSSESSION_WEIGHT};

/// True shooting percentage.
///
/// `points / (2 * (fga + 0.44 * fta))`, or `None` when the player has no
/// shooting possessions.
pub fn true_shooting_pct(points: f64, fga: f64, fta: f64) -> Option<f64> {
    let shots = fga + FTA_POSSESSION_WEIGHT * fta;
    if shots == 0.0 {
        return None;
    }
    Some(points / (2.0 * shots))
}

/// Assists per turnover; `None` when the player has no turnovers.
pub fn assist_to_turnover(assists: f64, turnovers: f64) -> Option<f64> {
    if turnovers == 0.0 {
        return None;
    }
    Some(assists / turnovers)
}

/// Share of team possessions a player finishes, as a percentage.
///
/// A possession is finished by a field-goal attempt, a trip to the line
/// (weighted 0.44 per attempt) or a turnover. Counts are season totals, so they
/// are spread over `games` before dividing by `team_possessions` per game.
pub fn usage_rate(fga: f64, fta: f64, turnovers: f64, games: f64, team_possessions: f64) -> Option<f64> {
    if games == 0.0 || team_possessions <= 0.0 {
        return None;
    }
    let used = fga + FTA_POSSESSION_WEIGHT * fta + turnovers;
    Some(100.0 * used / (games * team_possessions))
}

/// Combined points, rebounds and assists per game; `None` for zero games.
pub fn per_game_efficiency(points: f64, rebounds: f64, assists: f64, games: f64) -> Option<f64> {
    if games == 0.0 {
        return None;
    }
    Some((points + rebounds + assists) / games)
}

/// Production scaled by years below the pivot age of 20.
///
/// Prospects older than the pivot get a negative value. Not clamped.
pub fn age_adjusted_production(per_game_efficiency: f64, age: f64) -> f64 {
    age_adjusted_production_with_pivot(per_game_efficiency, age, AGE_PIVOT)
}

pub fn age_adjusted_production_with_pivot(per_game_efficiency: f64, age: f64, pivot: f64) -> f64 {
    per_game_efficiency * (pivot - age)
}

/// Product of field-goal, three-point and free-throw percentages.
pub fn shooting_consistency(fg_pct: f64, three_pt_pct: f64, ft_pct: f64) -> f64 {
    fg_pct * three_pt_pct * ft_pct
}
