use std::ops::{Deref, DerefMut};
use std::convert::TryFrom;
use crate::StructureError;
use crate::{DotBracket, DotBracketVec};

/// 0-based pairing partners. Quadruplex positions count as unpaired here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTable(pub Vec<Option<usize>>);

impl PairTable {
    /// All base pairs (i, j) with i < j, in 5'->3' order of i.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.iter()
            .enumerate()
            .filter_map(|(i, &j)| j.filter(|&j| j > i).map(|j| (i, j)))
    }
}

impl Deref for PairTable {
    type Target = [Option<usize>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PairTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&str> for PairTable {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        PairTable::try_from(&DotBracketVec::try_from(s)?)
    }
}

impl TryFrom<&DotBracketVec> for PairTable {
    type Error = StructureError;

    fn try_from(db: &DotBracketVec) -> Result<Self, Self::Error> {
        let mut stack: Vec<usize> = Vec::new();
        let mut table = vec![None; db.len()];

        for (i, dot) in db.iter().enumerate() {
            match dot {
                DotBracket::Open => stack.push(i),
                DotBracket::Close => {
                    let j = stack.pop().ok_or(StructureError::UnmatchedClose(i))?;
                    table[i] = Some(j);
                    table[j] = Some(i);
                }
                DotBracket::Unpaired | DotBracket::Quad => {}
                DotBracket::Break => {
                    return Err(StructureError::InvalidToken(
                        "strand break".into(), "pair table".into(), i));
                }
            }
        }

        if let Some(i) = stack.pop() {
            return Err(StructureError::UnmatchedOpen(i));
        }

        Ok(PairTable(table))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pair_table() {
        let pt = PairTable::try_from("((..))").unwrap();
        assert_eq!(pt.len(), 6);
        assert_eq!(pt[0], Some(5));
        assert_eq!(pt[1], Some(4));
        assert_eq!(pt[2], None);
        assert_eq!(pt[3], None);
        assert_eq!(pt[4], Some(1));
        assert_eq!(pt[5], Some(0));
        assert_eq!(pt.pairs().collect::<Vec<_>>(), vec![(0, 5), (1, 4)]);
    }

    #[test]
    fn test_quadruplex_marks_are_unpaired() {
        let pt = PairTable::try_from("(++.++.++.++)").unwrap();
        assert_eq!(pt[0], Some(12));
        assert!(pt[1..12].iter().all(|p| p.is_none()));
    }

    #[test]
    fn test_unmatched_open() {
        let err = PairTable::try_from("(()").unwrap_err();
        assert_eq!(format!("{}", err), "Unmatched '(' at position 0");
    }

    #[test]
    fn test_unmatched_close() {
        let err = PairTable::try_from("())").unwrap_err();
        assert_eq!(format!("{}", err), "Unmatched ')' at position 2");
    }

    #[test]
    fn test_invalid_token() {
        let err = PairTable::try_from("(x)").unwrap_err();
        assert_eq!(format!("{}", err), "Invalid x in dot-bracket at position 1");
        let err = PairTable::try_from("(&)").unwrap_err();
        assert_eq!(format!("{}", err), "Invalid strand break in pair table at position 1");
    }
}
