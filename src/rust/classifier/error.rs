use std::fmt;
use std::io;

/// Represents the different types of errors that can occur inside the online learner.
#[derive(Debug)]
pub enum LearnerError {
    /// The example could not be parsed, or cannot be learned from
    MalformedExample(String),
    /// Reading or writing a model snapshot failed
    Io(io::Error),
    /// The snapshot was read but its contents do not match its checksum
    CorruptSnapshot(String),
    /// The model state could not be encoded or decoded
    Encoding(String),
    /// The learner was configured with values it cannot work with
    InvalidConfig(String),
}

impl fmt::Display for LearnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedExample(msg) => write!(f, "Malformed example: {}", msg),
            Self::Io(err) => write!(f, "Snapshot I/O error: {}", err),
            Self::CorruptSnapshot(msg) => write!(f, "Corrupt snapshot: {}", msg),
            Self::Encoding(msg) => write!(f, "Snapshot encoding error: {}", msg),
            Self::InvalidConfig(msg) => write!(f, "Invalid learner configuration: {}", msg),
        }
    }
}

impl std::error::Error for LearnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LearnerError {
    fn from(err: io::Error) -> Self {
        LearnerError::Io(err)
    }
}

impl From<bincode::Error> for LearnerError {
    fn from(err: bincode::Error) -> Self {
        LearnerError::Encoding(err.to_string())
    }
}

impl LearnerError {
    /// Whether the error came from snapshot storage rather than from the example or config.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Io(_) | Self::CorruptSnapshot(_) | Self::Encoding(_))
    }
}
