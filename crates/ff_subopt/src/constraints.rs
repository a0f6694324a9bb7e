//! Hard and soft constraints.
//!
//! Hard constraints are bit masks: per base pair, which loop contexts the
//! pair may take part in, and per position, in which loops the position may
//! stay unpaired. Soft constraints are additive energy terms.

use std::fmt;
use ndarray::Array2;

use crate::SuboptError;

/// Pair (i,j) is a branch of the exterior loop (or closes a loop containing the cut).
pub const EXT_LOOP: u8 = 0x01;
/// Pair (i,j) closes a hairpin, or position i is unpaired in a hairpin.
pub const HP_LOOP: u8 = 0x02;
/// Pair (i,j) closes an interior loop, or position i is unpaired in one.
pub const INT_LOOP: u8 = 0x04;
/// Pair (p,q) is enclosed by an interior loop.
pub const INT_LOOP_ENC: u8 = 0x08;
/// Pair (i,j) closes a multiloop, or position i is unpaired in one.
pub const MB_LOOP: u8 = 0x10;
/// Pair (p,q) is a branch of a multiloop.
pub const MB_LOOP_ENC: u8 = 0x20;
pub const ALL_LOOPS: u8 = 0x3f;

/// Hard constraints over 1-based positions `1..=n`.
#[derive(Debug, Clone)]
pub struct HardConstraints {
    n: usize,
    pairs: Array2<u8>,
    unpaired: Vec<u8>,
    up_ext: Vec<usize>,
    up_hp: Vec<usize>,
    up_int: Vec<usize>,
    up_ml: Vec<usize>,
    up_any: Vec<usize>,
}

impl HardConstraints {
    /// No constraints at all.
    pub fn new(n: usize) -> Self {
        let mut hc = HardConstraints {
            n,
            pairs: Array2::from_elem((n + 2, n + 2), ALL_LOOPS),
            unpaired: vec![ALL_LOOPS; n + 2],
            up_ext: vec![0; n + 2],
            up_hp: vec![0; n + 2],
            up_int: vec![0; n + 2],
            up_ml: vec![0; n + 2],
            up_any: vec![0; n + 2],
        };
        hc.unpaired[0] = 0;
        hc.unpaired[n + 1] = 0;
        hc.update();
        hc
    }

    /// Parses a constraint string:
    /// `.` no constraint, `x` unpaired, `|` paired, `(` `)` forced pair.
    /// A single `&` is accepted at the strand break.
    pub fn from_string(s: &str, n: usize, cut: Option<usize>) -> Result<Self, SuboptError> {
        let mut tokens: Vec<char> = Vec::with_capacity(n);
        for (k, c) in s.chars().enumerate() {
            if c == '&' {
                if cut != Some(tokens.len() + 1) {
                    return Err(SuboptError::Constraint(
                        format!("strand break at position {} does not match the sequence", k)));
                }
                continue;
            }
            tokens.push(c);
        }
        if tokens.len() != n {
            return Err(SuboptError::Constraint(
                format!("constraint length {} does not match sequence length {}", tokens.len(), n)));
        }

        let mut hc = HardConstraints::new(n);
        let mut stack = Vec::new();
        for (k, &c) in tokens.iter().enumerate() {
            let i = k + 1;
            match c {
                '.' => (),
                'x' => hc.force_unpaired(i),
                '|' => hc.force_paired(i),
                '(' => stack.push(i),
                ')' => {
                    let o = stack.pop().ok_or_else(|| SuboptError::Constraint(
                        format!("unmatched ')' at position {}", i)))?;
                    hc.force_pair(o, i);
                }
                _ => {
                    return Err(SuboptError::Constraint(
                        format!("invalid constraint character '{}' at position {}", c, i)));
                }
            }
        }
        if let Some(o) = stack.pop() {
            return Err(SuboptError::Constraint(format!("unmatched '(' at position {}", o)));
        }
        hc.update();
        Ok(hc)
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Loop contexts in which (i,j) may appear.
    #[inline]
    pub fn pair(&self, i: usize, j: usize) -> u8 {
        self.pairs[[i, j]]
    }

    #[inline]
    pub fn pair_allows(&self, i: usize, j: usize, ctx: u8) -> bool {
        self.pairs[[i, j]] & ctx != 0
    }

    /// Restricts the loop contexts of (i,j) to `ctx`.
    pub fn restrict_pair(&mut self, i: usize, j: usize, ctx: u8) {
        self.pairs[[i, j]] &= ctx;
        self.pairs[[j, i]] &= ctx;
    }

    /// Restricts the loop contexts in which `i` may stay unpaired. Call
    /// `update` after a batch of changes.
    pub fn restrict_unpaired(&mut self, i: usize, ctx: u8) {
        self.unpaired[i] &= ctx;
    }

    pub fn force_unpaired(&mut self, i: usize) {
        for k in 1..=self.n {
            self.pairs[[i, k]] = 0;
            self.pairs[[k, i]] = 0;
        }
    }

    pub fn force_paired(&mut self, i: usize) {
        self.unpaired[i] = 0;
    }

    /// (i,j) must be formed: no other partner for i and j, nothing crossing.
    pub fn force_pair(&mut self, i: usize, j: usize) {
        let keep = self.pairs[[i, j]];
        self.force_unpaired(i);
        self.force_unpaired(j);
        self.pairs[[i, j]] = keep;
        self.pairs[[j, i]] = keep;
        for k in 1..=self.n {
            for l in k + 1..=self.n {
                if (k < i && i < l && l < j) || (i < k && k < j && j < l) {
                    self.pairs[[k, l]] = 0;
                    self.pairs[[l, k]] = 0;
                }
            }
        }
        self.unpaired[i] = 0;
        self.unpaired[j] = 0;
    }

    /// Recomputes the maximal unpaired stretches.
    pub fn update(&mut self) {
        let n = self.n;
        for (bit, up) in [
            (EXT_LOOP, &mut self.up_ext),
            (HP_LOOP, &mut self.up_hp),
            (INT_LOOP, &mut self.up_int),
            (MB_LOOP, &mut self.up_ml),
            (ALL_LOOPS, &mut self.up_any),
        ] {
            up[n + 1] = 0;
            for i in (1..=n).rev() {
                up[i] = if self.unpaired[i] & bit != 0 { up[i + 1] + 1 } else { 0 };
            }
        }
    }

    /// Can `len` positions starting at `i` stay unpaired in a loop of type `ctx`?
    #[inline]
    pub fn unpaired_run(&self, ctx: u8, i: usize, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        let up = match ctx {
            EXT_LOOP => &self.up_ext,
            HP_LOOP => &self.up_hp,
            INT_LOOP => &self.up_int,
            MB_LOOP => &self.up_ml,
            _ => &self.up_any,
        };
        up[i] >= len
    }
}

/// The loop kind passed to a soft-constraint callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    /// Called as `f(i, j, i, j, Hairpin)`.
    Hairpin,
    /// Called as `f(i, j, p, q, Interior)` for the inner pair (p,q).
    Interior,
}

pub type SoftCallback = Box<dyn Fn(usize, usize, usize, usize, LoopKind) -> i32 + Send + Sync>;

/// Additive pseudo energies over 1-based positions.
pub struct SoftConstraints {
    up: Vec<i32>,
    up_prefix: Vec<i32>,
    bp: Array2<i32>,
    callback: Option<SoftCallback>,
}

impl fmt::Debug for SoftConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftConstraints")
            .field("up", &self.up)
            .field("bp", &self.bp)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl SoftConstraints {
    pub fn new(n: usize) -> Self {
        SoftConstraints {
            up: vec![0; n + 2],
            up_prefix: vec![0; n + 2],
            bp: Array2::zeros((n + 2, n + 2)),
            callback: None,
        }
    }

    pub fn len(&self) -> usize {
        self.up.len() - 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Energy bonus (negative) or penalty for position `i` being unpaired.
    pub fn set_unpaired(&mut self, i: usize, energy: i32) {
        self.up[i] = energy;
        for k in 1..self.up.len() {
            self.up_prefix[k] = self.up_prefix[k - 1] + self.up[k];
        }
    }

    pub fn set_pair(&mut self, i: usize, j: usize, energy: i32) {
        self.bp[[i, j]] = energy;
        self.bp[[j, i]] = energy;
    }

    pub fn with_callback<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize, usize, usize, LoopKind) -> i32 + Send + Sync + 'static,
    {
        self.callback = Some(Box::new(f));
        self
    }

    /// Sum over the unpaired terms of `i..=j`.
    #[inline]
    pub fn unpaired(&self, i: usize, j: usize) -> i32 {
        if j < i {
            0
        } else {
            self.up_prefix[j] - self.up_prefix[i - 1]
        }
    }

    #[inline]
    pub fn pair(&self, i: usize, j: usize) -> i32 {
        self.bp[[i, j]]
    }

    #[inline]
    pub fn callback(&self, i: usize, j: usize, k: usize, l: usize, kind: LoopKind) -> i32 {
        self.callback.as_ref().map_or(0, |f| f(i, j, k, l, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconstrained() {
        let hc = HardConstraints::new(6);
        assert_eq!(hc.pair(1, 6), ALL_LOOPS);
        assert!(hc.unpaired_run(EXT_LOOP, 1, 6));
        assert!(!hc.unpaired_run(EXT_LOOP, 1, 7));
        assert!(hc.unpaired_run(HP_LOOP, 3, 0));
    }

    #[test]
    fn test_constraint_string() {
        let hc = HardConstraints::from_string("(x..|.)..", 9, None).unwrap();
        assert_eq!(hc.pair(1, 7), ALL_LOOPS);
        // 1 and 7 have no other partner.
        assert_eq!(hc.pair(1, 9), 0);
        assert_eq!(hc.pair(3, 7), 0);
        // 'x' cannot pair.
        assert_eq!(hc.pair(2, 6), 0);
        // crossing the forced pair.
        assert_eq!(hc.pair(4, 9), 0);
        assert_eq!(hc.pair(3, 6), ALL_LOOPS);
        // '|' must pair.
        assert!(!hc.unpaired_run(HP_LOOP, 3, 3));
        assert!(hc.unpaired_run(HP_LOOP, 2, 2));
        assert!(hc.unpaired_run(EXT_LOOP, 8, 2));
        assert!(!hc.unpaired_run(EXT_LOOP, 7, 1));
    }

    #[test]
    fn test_constraint_string_errors() {
        assert!(matches!(HardConstraints::from_string("((..)", 5, None), Err(SuboptError::Constraint(_))));
        assert!(matches!(HardConstraints::from_string("...", 5, None), Err(SuboptError::Constraint(_))));
        assert!(matches!(HardConstraints::from_string("..?..", 5, None), Err(SuboptError::Constraint(_))));
        assert!(HardConstraints::from_string("..&...", 5, Some(3)).is_ok());
        assert!(HardConstraints::from_string(".&....", 5, Some(3)).is_err());
    }

    #[test]
    fn test_soft_constraints() {
        let mut sc = SoftConstraints::new(5);
        sc.set_unpaired(2, -10);
        sc.set_unpaired(4, -30);
        sc.set_pair(1, 5, -100);
        assert_eq!(sc.unpaired(1, 5), -40);
        assert_eq!(sc.unpaired(3, 4), -30);
        assert_eq!(sc.unpaired(4, 3), 0);
        assert_eq!(sc.pair(5, 1), -100);
        assert_eq!(sc.callback(1, 5, 1, 5, LoopKind::Hairpin), 0);

        let sc = sc.with_callback(|i, _, _, _, kind| {
            if kind == LoopKind::Hairpin && i == 1 { -5 } else { 0 }
        });
        assert_eq!(sc.callback(1, 5, 1, 5, LoopKind::Hairpin), -5);
        assert_eq!(sc.callback(1, 5, 2, 4, LoopKind::Interior), 0);
    }
}
