use std::fmt;

use ff_energy::SequenceError;
use ff_structure::StructureError;

#[derive(Debug, PartialEq)]
pub enum SuboptError {
    Sequence(SequenceError),
    Structure(StructureError),
    /// Malformed hard constraints.
    Constraint(String),
    /// A model setting that the folding recursions do not implement.
    Unsupported(String),
    /// No admissible structure exists under the given constraints.
    NoStructure,
    /// The structure exists, but the model does not allow it.
    Inadmissible(String),
    Cancelled,
}

impl fmt::Display for SuboptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuboptError::Sequence(e) => write!(f, "{}", e),
            SuboptError::Structure(e) => write!(f, "{}", e),
            SuboptError::Constraint(msg) => write!(f, "Invalid constraint: {}", msg),
            SuboptError::Unsupported(msg) => write!(f, "Unsupported model setting: {}", msg),
            SuboptError::NoStructure => write!(f, "No structure satisfies the constraints."),
            SuboptError::Inadmissible(msg) => write!(f, "Inadmissible structure: {}", msg),
            SuboptError::Cancelled => write!(f, "Enumeration cancelled."),
        }
    }
}

impl std::error::Error for SuboptError {}

impl From<SequenceError> for SuboptError {
    fn from(e: SequenceError) -> Self {
        SuboptError::Sequence(e)
    }
}

impl From<StructureError> for SuboptError {
    fn from(e: StructureError) -> Self {
        SuboptError::Structure(e)
    }
}
