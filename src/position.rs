use std::fmt;
use std::str::FromStr;

use crate::error::RowComputationError;

/// Listed playing position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    pub const ALL: [Position; 5] = [Position::PG, Position::SG, Position::SF, Position::PF, Position::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::C => "C",
        }
    }

    /// Coarse grouping used by the dashboard's position breakdowns.
    pub fn group(&self) -> &'static str {
        match self {
            Position::PG | Position::SG => "Guards",
            Position::SF => "Wings",
            Position::PF => "Forwards",
            Position::C => "Bigs",
        }
    }
}

impl FromStr for Position {
    type Err = RowComputationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PG" => Ok(Position::PG),
            "SG" => Ok(Position::SG),
            "SF" => Ok(Position::SF),
            "PF" => Ok(Position::PF),
            "C" => Ok(Position::C),
            _ => Err(RowComputationError::UnknownPosition(s.to_string())),
        }
    }
}

/// Parse a list of position names, failing on the first unknown one.
pub fn parse_positions<S: AsRef<str>>(names: &[S]) -> Result<Vec<Position>, RowComputationError> {
    names.iter().map(|s| s.as_ref().parse()).collect()
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
