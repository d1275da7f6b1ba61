use thiserror::Error;

/// Broad class of a failure, used to pick the exception raised to Python.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A named column or key does not exist
    MissingKey,
    /// A value has the wrong type or is out of range
    InvalidValue,
    /// A row index is past the end of the table
    OutOfRange,
    Io,
}

/// Input table problems that make the whole batch unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("column `{column}` has the wrong type: expected {expected}")]
    WrongType {
        column: String,
        expected: &'static str,
    },

    #[error("column `{column}` has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column name `{0}` is reserved")]
    ReservedColumn(String),
}

/// Why a single row's derived value is null.
///
/// `DivisionGuard` nulls only the affected metric; every other variant marks the
/// row malformed, which nulls all of its derived fields and drops it from aggregates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowComputationError {
    #[error("{metric} undefined: zero denominator")]
    DivisionGuard { metric: &'static str },

    #[error("{field} is negative ({value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} is outside [0, 1] ({value})")]
    PercentageOutOfRange { field: &'static str, value: f64 },

    #[error("age {value} is outside (0, {max}]")]
    AgeOutOfRange { value: f64, max: f64 },

    #[error("{field} is missing or not finite")]
    NonFinite { field: &'static str },

    #[error("{field} is missing")]
    MissingText { field: &'static str },

    #[error("unknown position `{0}`")]
    UnknownPosition(String),
}

impl RowComputationError {
    /// Whether this error excludes the row from aggregate statistics
    pub fn is_malformed(&self) -> bool {
        !matches!(self, RowComputationError::DivisionGuard { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl StructuralError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StructuralError::MissingColumn(_) => ErrorKind::MissingKey,
            _ => ErrorKind::InvalidValue,
        }
    }
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Io { .. } => ErrorKind::Io,
            _ => ErrorKind::InvalidValue,
        }
    }
}

/// Errors from the read-only view helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("row {row} out of range for table of {len} rows")]
    RowOutOfRange { row: usize, len: usize },
}

impl ViewError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ViewError::UnknownColumn(_) => ErrorKind::MissingKey,
            ViewError::RowOutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }
}

/// Failures building the demo board.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DemoError {
    #[error("invalid demo distribution: {0}")]
    Distribution(String),

    #[error(transparent)]
    Table(#[from] StructuralError),
}
