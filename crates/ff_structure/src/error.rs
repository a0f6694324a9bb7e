use std::fmt;

#[derive(Debug, PartialEq)]
pub enum StructureError {
    UnmatchedOpen(usize),                // '(' at this position was never closed
    UnmatchedClose(usize),               // ')' at this position has no matching '('
    InvalidToken(String, String, usize), // token, source and position
    InvalidQuadruplex(usize),            // malformed run of '+' starting here
    LengthMismatch(usize, usize),        // (found, expected)
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::UnmatchedOpen(i) => {
                write!(f, "Unmatched '(' at position {}", i)
            }
            StructureError::UnmatchedClose(i) => {
                write!(f, "Unmatched ')' at position {}", i)
            }
            StructureError::InvalidToken(tok, src, i) => {
                write!(f, "Invalid {} in {} at position {}", tok, src, i)
            }
            StructureError::InvalidQuadruplex(i) => {
                write!(f, "Invalid quadruplex annotation starting at position {}", i)
            }
            StructureError::LengthMismatch(found, expected) => {
                write!(f, "Structure length {} does not match sequence length {}", found, expected)
            }
        }
    }
}

impl std::error::Error for StructureError {}

