use thiserror::Error;

/// A shot record that breaks the thrown-stone invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Malformed record: no thrown stone")]
    NoThrownStone,

    #[error("Malformed record: {count} thrown stone candidates")]
    MultipleThrownStones { count: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Target inference requested for an Unknown classification")]
    UnknownClassification,

    #[error("Target stone missing from record: {stone_id}")]
    MissingTargetStone { stone_id: String },

    #[error("No target stone identified for a {0} shot")]
    NoTargetStone(&'static str),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Which piece of geometry was unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryPart {
    ReleasePosition,
    ThrownStone,
    FinalPosition,
}

impl std::fmt::Display for GeometryPart {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GeometryPart::ReleasePosition => write!(f, "release position"),
            GeometryPart::ThrownStone => write!(f, "thrown stone"),
            GeometryPart::FinalPosition => write!(f, "thrown stone final position"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccuracyError {
    #[error("Missing geometry: {0}")]
    MissingGeometry(GeometryPart),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown threshold profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ConfigError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            ConfigError::Io(_) => true,
            ConfigError::UnknownProfile(_) => true,
            ConfigError::Json(_) | ConfigError::Yaml(_) => false,
            ConfigError::InvalidParameter { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
