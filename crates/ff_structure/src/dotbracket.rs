use std::fmt;
use std::ops::Deref;
use std::ops::DerefMut;
use std::convert::TryFrom;

use crate::PairTable;
use crate::Quadruplex;
use crate::StructureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotBracket {
    Unpaired, // '.'
    Open,     // '('
    Close,    // ')'
    Quad,     // '+'
    Break,    // '&'
}

impl TryFrom<char> for DotBracket {
    type Error = StructureError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '.' => Ok(DotBracket::Unpaired),
            '(' => Ok(DotBracket::Open),
            ')' => Ok(DotBracket::Close),
            '+' => Ok(DotBracket::Quad),
            '&' => Ok(DotBracket::Break),
            _ => Err(StructureError::InvalidToken(c.to_string(), "dot-bracket".into(), 0)),
        }
    }
}

impl From<DotBracket> for char {
    fn from(db: DotBracket) -> Self {
        match db {
            DotBracket::Open => '(',
            DotBracket::Close => ')',
            DotBracket::Unpaired => '.',
            DotBracket::Quad => '+',
            DotBracket::Break => '&',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotBracketVec(pub Vec<DotBracket>);

impl Deref for DotBracketVec {
    type Target = [DotBracket];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DotBracketVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl DotBracketVec {
    /// The open chain of length `n`.
    pub fn unpaired(n: usize) -> Self {
        DotBracketVec(vec![DotBracket::Unpaired; n])
    }

    /// Removes a strand break, returning the structure without it and the
    /// 0-based index of the first position after the break.
    pub fn split_break(&self) -> Result<(DotBracketVec, Option<usize>), StructureError> {
        let mut cut = None;
        let mut marks = Vec::with_capacity(self.len());
        for (i, &db) in self.iter().enumerate() {
            if db == DotBracket::Break {
                if cut.is_some() {
                    return Err(StructureError::InvalidToken(
                        "second strand break".into(), "dot-bracket".into(), i));
                }
                cut = Some(marks.len());
            } else {
                marks.push(db);
            }
        }
        Ok((DotBracketVec(marks), cut))
    }

    /// Renders the structure with a '&' in front of the 0-based index `cut`.
    pub fn to_string_with_break(&self, cut: Option<usize>) -> String {
        let mut s = String::with_capacity(self.len() + 1);
        for (i, &db) in self.iter().enumerate() {
            if Some(i) == cut {
                s.push('&');
            }
            s.push(char::from(db));
        }
        s
    }

    /// Parses the G-quadruplex annotation: four runs of '+' with equal
    /// length, separated by unpaired linkers.
    pub fn quadruplexes(&self) -> Result<Vec<Quadruplex>, StructureError> {
        let n = self.len();
        let mut quads = Vec::new();
        let mut i = 0;
        while i < n {
            if self[i] != DotBracket::Quad {
                i += 1;
                continue;
            }
            let start = i;
            let run = self[i..].iter().take_while(|&&db| db == DotBracket::Quad).count();
            let mut pos = start + run;
            let mut linkers = [0; 3];
            for linker in linkers.iter_mut() {
                let link_start = pos;
                while pos < n && self[pos] == DotBracket::Unpaired {
                    pos += 1;
                }
                if pos == link_start
                    || pos + run > n
                    || self[pos..pos + run].iter().any(|&db| db != DotBracket::Quad) {
                    return Err(StructureError::InvalidQuadruplex(start));
                }
                *linker = pos - link_start;
                pos += run;
            }
            quads.push(Quadruplex::new(start, run, linkers));
            i = pos;
        }
        Ok(quads)
    }
}

impl TryFrom<&str> for DotBracketVec {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut vec = Vec::with_capacity(s.len());
        for (i, c) in s.chars().enumerate() {
            match DotBracket::try_from(c) {
                Ok(db) => vec.push(db),
                Err(StructureError::InvalidToken(tok, src, _)) => {
                    return Err(StructureError::InvalidToken(tok, src, i));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(DotBracketVec(vec))
    }
}

impl From<&PairTable> for DotBracketVec {
    fn from(pt: &PairTable) -> Self {
        let mut result: Vec<DotBracket> = Vec::with_capacity(pt.len());
        for (i, &j_opt) in pt.iter().enumerate() {
            match j_opt {
                None => result.push(DotBracket::Unpaired),
                Some(j) if j > i => result.push(DotBracket::Open),
                Some(j) if j < i => result.push(DotBracket::Close),
                Some(_) => {
                    unreachable!("PairTable construction prevents self-pairing! ({})", i);
                }
            }
        }
        DotBracketVec(result)
    }
}

impl fmt::Display for DotBracketVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for db in &self.0 {
            write!(f, "{}", char::from(*db))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_bracket_from_char() {
        assert_eq!(DotBracket::try_from('.').unwrap(), DotBracket::Unpaired);
        assert_eq!(DotBracket::try_from('(').unwrap(), DotBracket::Open);
        assert_eq!(DotBracket::try_from(')').unwrap(), DotBracket::Close);
        assert_eq!(DotBracket::try_from('+').unwrap(), DotBracket::Quad);
        assert_eq!(DotBracket::try_from('&').unwrap(), DotBracket::Break);
    }

    #[test]
    fn test_dot_bracket_from_invalid_char() {
        let res = DotBracket::try_from('x');
        assert!(matches!(res, Err(StructureError::InvalidToken(_, src, _)) if src == "dot-bracket"));
        let res = DotBracketVec::try_from("(.x)");
        assert!(matches!(res, Err(StructureError::InvalidToken(_, _, 2))));
    }

    #[test]
    fn test_dot_bracket_vec_from_str() {
        let dbv = DotBracketVec::try_from("(.).").unwrap();
        assert_eq!(format!("{}", dbv), "(.).");
        assert_eq!(dbv.len(), 4);
        assert_eq!(dbv[0], DotBracket::Open);
        assert_eq!(dbv[1], DotBracket::Unpaired);
        assert_eq!(dbv[2], DotBracket::Close);
        assert_eq!(dbv[3], DotBracket::Unpaired);
    }

    #[test]
    fn test_dot_bracket_vec_from_pair_table() {
        let pt = PairTable::try_from("((..))").unwrap();
        let dbv = DotBracketVec::from(&pt);
        assert_eq!(format!("{}", dbv), "((..))");
    }

    #[test]
    fn test_split_and_render_break() {
        let dbv = DotBracketVec::try_from("((.&.))").unwrap();
        let (marks, cut) = dbv.split_break().unwrap();
        assert_eq!(marks.to_string(), "((..))");
        assert_eq!(cut, Some(3));
        assert_eq!(marks.to_string_with_break(cut), "((.&.))");
        assert_eq!(marks.to_string_with_break(None), "((..))");

        let twice = DotBracketVec::try_from("(&.&)").unwrap();
        assert!(twice.split_break().is_err());
    }

    #[test]
    fn test_quadruplex_parsing() {
        let dbv = DotBracketVec::try_from("..++.++..++.++.").unwrap();
        let quads = dbv.quadruplexes().unwrap();
        assert_eq!(quads, vec![Quadruplex::new(2, 2, [1, 2, 1])]);
        assert_eq!(quads[0].end(), 13);

        // Two quadruplexes back to back.
        let dbv = DotBracketVec::try_from("++.++.++.++++.++.++.++").unwrap();
        let quads = dbv.quadruplexes().unwrap();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0], Quadruplex::new(0, 2, [1, 1, 1]));
        assert_eq!(quads[1], Quadruplex::new(11, 2, [1, 1, 1]));
    }

    #[test]
    fn test_quadruplex_parsing_errors() {
        for s in ["++.++.++", "++.++.+.++", "++(++.++.++)", "++++.++.++.++"] {
            let dbv = DotBracketVec::try_from(s).unwrap();
            assert!(matches!(dbv.quadruplexes(), Err(StructureError::InvalidQuadruplex(_))), "{}", s);
        }
    }
}
