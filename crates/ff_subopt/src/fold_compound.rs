use log::info;

use ff_energy::Base;
use ff_energy::EnergyModel;
use ff_energy::NucleotideVec;
use ff_energy::PairTypeRNA;
use ff_energy::SequenceError;
use ff_structure::Quadruplex;

use crate::ModelDetails;
use crate::SuboptError;
use crate::{HardConstraints, SoftConstraints};

pub const GQUAD_MIN_RUN: usize = 2;
pub const GQUAD_MAX_RUN: usize = 7;
pub const GQUAD_MIN_LINKER: usize = 1;
pub const GQUAD_MAX_LINKER: usize = 15;

/// Everything the recursions need to know about one folding problem.
///
/// Positions are 1-based throughout (`1..=n`). The padded sequence has
/// `S[0] = S[n]` and `S[n+1] = S[1]`, so circular neighbors need no special
/// casing. A cut point `cp` is the first base of the second strand.
pub struct FoldCompound<M: EnergyModel> {
    model: M,
    md: ModelDetails,
    sequence: NucleotideVec,
    s: Vec<Base>,
    n: usize,
    cut: Option<usize>,
    hc: HardConstraints,
    sc: Option<SoftConstraints>,
    g_run: Vec<usize>,
}

impl<M: EnergyModel> FoldCompound<M> {
    pub fn new(sequence: &str, model: M, md: ModelDetails) -> Result<Self, SuboptError> {
        let (sequence, cut) = NucleotideVec::from_lossy_strands(sequence.trim())?;
        let n = sequence.len();
        if n == 0 {
            return Err(SequenceError::Plain("empty sequence".to_string()).into());
        }
        let cut = match cut {
            Some(0) => return Err(SequenceError::Plain("empty first strand".to_string()).into()),
            Some(c) if c == n => return Err(SequenceError::Plain("empty second strand".to_string()).into()),
            Some(c) => Some(c + 1),
            None => None,
        };

        if md.dangles > 2 {
            return Err(SuboptError::Unsupported(format!("dangles = {} (only 0, 1 and 2)", md.dangles)));
        }
        if md.circular && cut.is_some() {
            return Err(SuboptError::Unsupported("circular folding of two strands".to_string()));
        }
        if md.gquad && (md.circular || cut.is_some()) {
            return Err(SuboptError::Unsupported(
                "quadruplexes are only supported for linear single strands".to_string()));
        }

        let mut s = Vec::with_capacity(n + 2);
        s.push(sequence[n - 1]);
        s.extend_from_slice(&sequence);
        s.push(sequence[0]);

        let mut g_run = vec![0; n + 2];
        for i in (1..=n).rev() {
            if s[i] == Base::G {
                g_run[i] = g_run[i + 1] + 1;
            }
        }

        info!("Fold compound: {} nt, cut point {:?}, {:?}", n, cut, md);
        Ok(FoldCompound {
            model,
            md,
            sequence,
            s,
            n,
            cut,
            hc: HardConstraints::new(n),
            sc: None,
            g_run,
        })
    }

    /// Applies a hard-constraint string (see `HardConstraints::from_string`).
    pub fn with_constraint(self, constraint: &str) -> Result<Self, SuboptError> {
        let hc = HardConstraints::from_string(constraint, self.n, self.cut)?;
        self.with_hard_constraints(hc)
    }

    pub fn with_hard_constraints(mut self, hc: HardConstraints) -> Result<Self, SuboptError> {
        if hc.len() != self.n {
            return Err(SuboptError::Constraint(format!(
                "hard constraints for {} nt, sequence has {} nt", hc.len(), self.n)));
        }
        self.hc = hc;
        Ok(self)
    }

    pub fn with_soft_constraints(mut self, sc: SoftConstraints) -> Result<Self, SuboptError> {
        if sc.len() != self.n {
            return Err(SuboptError::Constraint(format!(
                "soft constraints for {} nt, sequence has {} nt", sc.len(), self.n)));
        }
        self.sc = Some(sc);
        Ok(self)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn details(&self) -> &ModelDetails {
        &self.md
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// 1-based first position of the second strand.
    pub fn cut(&self) -> Option<usize> {
        self.cut
    }

    pub fn sequence(&self) -> &NucleotideVec {
        &self.sequence
    }

    /// The sequence with '&' at the cut point.
    pub fn sequence_string(&self) -> String {
        let mut out = String::with_capacity(self.n + 1);
        for (k, b) in self.sequence.iter().enumerate() {
            if self.cut == Some(k + 1) {
                out.push('&');
            }
            out.push_str(&b.to_string());
        }
        out
    }

    pub fn hard_constraints(&self) -> &HardConstraints {
        &self.hc
    }

    pub fn soft_constraints(&self) -> Option<&SoftConstraints> {
        self.sc.as_ref()
    }

    pub fn max_loop(&self) -> usize {
        self.md.max_loop.min(self.model.max_loop_size())
    }

    #[inline]
    pub(crate) fn base(&self, i: usize) -> Base {
        self.s[i]
    }

    /// Pair type of (S[i], S[j]), in this orientation.
    #[inline]
    pub(crate) fn pair_type(&self, i: usize, j: usize) -> PairTypeRNA {
        PairTypeRNA::from((self.s[i], self.s[j]))
    }

    /// Are `a <= b` on the same strand?
    #[inline]
    pub fn same_strand(&self, a: usize, b: usize) -> bool {
        match self.cut {
            Some(cp) => !(a < cp && cp <= b),
            None => true,
        }
    }

    /// Can (i,j) be a base pair at all? Same-strand pairs must leave room for
    /// a hairpin, pairs across the cut may be adjacent.
    pub(crate) fn pair_allowed(&self, i: usize, j: usize) -> bool {
        if i >= j || j > self.n {
            return false;
        }
        if self.same_strand(i, j) && j - i - 1 < self.model.min_hairpin_size() {
            return false;
        }
        if !self.model.can_pair(self.s[i], self.s[j]) {
            return false;
        }
        if self.md.no_gu && self.pair_type(i, j).is_wobble() {
            return false;
        }
        self.hc.pair(i, j) != 0
    }

    /// Calls `f` for every quadruplex geometry that exactly spans `[i, j]`.
    pub(crate) fn for_each_gquad<F: FnMut(Quadruplex)>(&self, i: usize, j: usize, mut f: F) {
        if j < i || j > self.n {
            return;
        }
        let span = j - i + 1;
        for run in GQUAD_MIN_RUN..=GQUAD_MAX_RUN {
            if 4 * run + 3 * GQUAD_MIN_LINKER > span {
                break;
            }
            if self.g_run[i] < run {
                break;
            }
            let rest = span - 4 * run;
            if rest > 3 * GQUAD_MAX_LINKER {
                continue;
            }
            for l1 in GQUAD_MIN_LINKER..=GQUAD_MAX_LINKER {
                for l2 in GQUAD_MIN_LINKER..=GQUAD_MAX_LINKER {
                    if l1 + l2 + GQUAD_MIN_LINKER > rest {
                        break;
                    }
                    let l3 = rest - l1 - l2;
                    if l3 > GQUAD_MAX_LINKER {
                        continue;
                    }
                    let q = Quadruplex::new(i, run, [l1, l2, l3]);
                    if q.run_starts().iter().all(|&s| self.g_run[s] >= run) {
                        f(q);
                    }
                }
            }
        }
    }

    /// Is `q` a valid quadruplex of G runs on this sequence?
    pub(crate) fn is_gquad(&self, q: &Quadruplex) -> bool {
        (GQUAD_MIN_RUN..=GQUAD_MAX_RUN).contains(&q.run)
            && q.linkers.iter().all(|l| (GQUAD_MIN_LINKER..=GQUAD_MAX_LINKER).contains(l))
            && q.start >= 1
            && q.end() <= self.n
            && q.run_starts().iter().all(|&s| self.g_run[s] >= q.run)
    }
}
