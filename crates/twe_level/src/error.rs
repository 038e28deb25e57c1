use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a map failure, for callers that only branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapErrorKind {
    Io,
    Parse,
    Schema,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write map {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("map {path} failed validation: {violation}")]
    Schema {
        path: PathBuf,
        violation: SchemaViolation,
    },
}

impl MapError {
    pub fn kind(&self) -> MapErrorKind {
        match self {
            Self::Read { .. } | Self::Write { .. } => MapErrorKind::Io,
            Self::Parse { .. } => MapErrorKind::Parse,
            Self::Schema { .. } => MapErrorKind::Schema,
        }
    }

    pub fn violation(&self) -> Option<&SchemaViolation> {
        match self {
            Self::Schema { violation, .. } => Some(violation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("expected {expected} rows, found {found}")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({x}, {y}) holds invalid tile code {value}")]
    InvalidCode { x: usize, y: usize, value: String },
    #[error("start_pos ({x}, {y}) lies outside {width}x{height}")]
    StartOutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
    #[error("cell ({x}, {y}) lies outside {width}x{height}")]
    CellOutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Error)]
pub enum TileTableError {
    #[error("failed to read tile table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tile table {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("tile code 0 is reserved for empty cells")]
    ReservedCode,
    #[error("duplicate tile code {0}")]
    DuplicateCode(u32),
    #[error("tile code {0} has an empty asset id")]
    EmptyAsset(u32),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure to build a level: either the injected config or the first map.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
}

impl LevelError {
    pub fn map_error(&self) -> Option<&MapError> {
        match self {
            Self::Map(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}
