use std::fmt;
use std::ops::Deref;

use log::warn;
use colored::*;
use serde::{Serialize, Deserialize};


#[derive(Debug, PartialEq)]
pub enum SequenceError {
    Plain(String),
    InvalidChar(char),
    Separator(char),
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::Plain(s) => {
                write!(f, "ERROR: {}", s)
            }
            SequenceError::InvalidChar(c) => {
                write!(f, "Unsupported nucleotide: '{}'", c)
            }
            SequenceError::Separator(c) => {
                write!(f, "Unexpected strand separation character '{}'", c)
            }
        }
    }
}

impl std::error::Error for SequenceError {}


#[derive(Clone, Hash, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Base { A, C, G, U, N }
pub const BCOUNT: usize = 5; // 5 Base variants for tables.

impl TryFrom<char> for Base {
    type Error = SequenceError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Base::A),
            'C' => Ok(Base::C),
            'G' => Ok(Base::G),
            'U' | 'T' => Ok(Base::U),
            'N' => Ok(Base::N),
            '&' | '+' => Err(SequenceError::Separator(c)),
            _ => Err(SequenceError::InvalidChar(c)),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::U => 'U',
            Base::N => 'N',
        };
        write!(f, "{}", c)
    }
}


#[derive(Clone, Hash, Debug, Eq, PartialEq)]
pub struct NucleotideVec(pub Vec<Base>);

impl Deref for NucleotideVec {
    type Target = [Base];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for NucleotideVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in &self.0 {
            write!(f, "{}", base)?;
        }
        Ok(())
    }
}

impl NucleotideVec {
    pub fn from_lossy(s: &str) -> Self {
        let vec = s.chars().map(|c| {
            Base::try_from(c).unwrap_or_else(|e| {
                warn!("{} {} -> converted to 'N'", "WARNING:".red(), e);
                Base::N
            })
        }).collect();
        NucleotideVec(vec)
    }

    /// Lossy parsing of one or two strands separated by '&'. Returns the
    /// concatenated bases and the 0-based index of the first base of the
    /// second strand.
    pub fn from_lossy_strands(s: &str) -> Result<(Self, Option<usize>), SequenceError> {
        let mut parts = s.split('&');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(SequenceError::Plain(
                "at most two strands separated by '&' are supported".to_string()));
        }
        let mut seq = NucleotideVec::from_lossy(first);
        let cut = match second {
            Some(other) => {
                let cut = seq.len();
                seq.0.extend(NucleotideVec::from_lossy(other).0);
                Some(cut)
            }
            None => None,
        };
        Ok((seq, cut))
    }
}

const PAIR_LOOKUP: [[PairTypeRNA; BCOUNT]; BCOUNT] = {
    use Base::*;
    use PairTypeRNA::*;
    let mut table = [[NN; BCOUNT]; BCOUNT];
    table[A as usize][U as usize] = AU;
    table[U as usize][A as usize] = UA;
    table[C as usize][G as usize] = CG;
    table[G as usize][C as usize] = GC;
    table[G as usize][U as usize] = GU;
    table[U as usize][G as usize] = UG;
    table
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PairTypeRNA { AU, UA, CG, GC, GU, UG, NN }
pub const PCOUNT: usize = 7; // 7 Pair variants for tables.

impl From<(Base, Base)> for PairTypeRNA {
    fn from(pair: (Base, Base)) -> Self {
        PAIR_LOOKUP[pair.0 as usize][pair.1 as usize]
    }
}

impl fmt::Display for PairTypeRNA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PairTypeRNA::AU => "A-U",
            PairTypeRNA::UA => "U-A",
            PairTypeRNA::CG => "C-G",
            PairTypeRNA::GC => "G-C",
            PairTypeRNA::GU => "G-U",
            PairTypeRNA::UG => "U-G",
            PairTypeRNA::NN => "N-N",
        };
        write!(f, "{}", s)
    }
}

impl PairTypeRNA {
    /// Pairs that carry the terminal AU/GU penalty.
    pub fn is_ru(&self) -> bool {
       matches!(self
            , PairTypeRNA::GU | PairTypeRNA::UG
            | PairTypeRNA::AU | PairTypeRNA::UA)
    }

    pub fn is_wobble(&self) -> bool {
       matches!(self, PairTypeRNA::GU | PairTypeRNA::UG)
    }

    pub fn can_pair(&self) -> bool {
       self != &PairTypeRNA::NN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_lookup() {
        assert_eq!(PairTypeRNA::from((Base::G, Base::C)), PairTypeRNA::GC);
        assert_eq!(PairTypeRNA::from((Base::U, Base::G)), PairTypeRNA::UG);
        assert_eq!(PairTypeRNA::from((Base::A, Base::A)), PairTypeRNA::NN);
        assert!(PairTypeRNA::UA.is_ru());
        assert!(!PairTypeRNA::CG.is_ru());
        assert!(PairTypeRNA::GU.is_wobble());
        assert!(!PairTypeRNA::NN.can_pair());
    }

    #[test]
    fn test_from_lossy() {
        let seq = NucleotideVec::from_lossy("acgtX");
        assert_eq!(seq.to_string(), "ACGUN");
    }

    #[test]
    fn test_from_lossy_strands() {
        let (seq, cut) = NucleotideVec::from_lossy_strands("GGGA&UCCC").unwrap();
        assert_eq!(seq.to_string(), "GGGAUCCC");
        assert_eq!(cut, Some(4));

        let (seq, cut) = NucleotideVec::from_lossy_strands("GGGA").unwrap();
        assert_eq!(seq.len(), 4);
        assert_eq!(cut, None);

        assert!(NucleotideVec::from_lossy_strands("A&C&G").is_err());
    }
}
