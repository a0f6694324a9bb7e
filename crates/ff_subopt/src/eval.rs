//! Free energy of a given structure by loop decomposition.
//!
//! Uses the same loop functions as the recursions, so a structure reported
//! by the enumeration evaluates to exactly its reported energy. Structures
//! the recursions cannot produce are rejected as inadmissible.

use ff_energy::EnergyModel;
use ff_energy::INF;
use ff_structure::{DotBracketVec, PairTable, Quadruplex, StructureError};

use crate::FoldCompound;
use crate::SuboptError;

#[derive(Debug, Clone, Copy)]
enum Branch {
    Pair(usize, usize),
    Quad(Quadruplex),
}

/// The branches and unpaired positions of one loop.
#[derive(Debug, Default)]
struct LoopContent {
    branches: Vec<Branch>,
    unpaired: Vec<usize>,
}

/// A stem of a loop with the unpaired neighbors that may dangle on it.
#[derive(Debug, Clone, Copy)]
struct Stem {
    d5: Option<usize>,
    d3: Option<usize>,
    /// Energy by `5' dangle | 3' dangle << 1`.
    energy: [i32; 4],
}

impl Stem {
    fn fixed(e: i32) -> Self {
        Stem { d5: None, d3: None, energy: [e, INF, INF, INF] }
    }
}

/// Cheapest total of the stems of one loop, in loop order, where an unpaired
/// base between two stems dangles on at most one of them. In a `cyclic` loop
/// the last stem neighbors the first.
fn min_stem_energy(stems: &[Stem], cyclic: bool) -> i32 {
    let Some((first, _)) = stems.split_first() else {
        return 0;
    };
    let mut best = INF;
    for first5 in [0, 1] {
        // dp[x]: best total so far, x if the last stem dangles 3'.
        let mut dp = [first.energy[first5], first.energy[first5 | 2]];
        for w in stems.windows(2) {
            let shared = w[0].d3.is_some() && w[0].d3 == w[1].d5;
            let mut next = [INF; 2];
            for (p3, &acc) in dp.iter().enumerate() {
                if acc >= INF {
                    continue;
                }
                for (x, &e) in w[1].energy.iter().enumerate() {
                    if e >= INF || (shared && p3 == 1 && x & 1 == 1) {
                        continue;
                    }
                    next[x >> 1] = next[x >> 1].min(acc + e);
                }
            }
            dp = next;
        }
        let last = stems[stems.len() - 1];
        let wraps = cyclic && first5 == 1 && last.d3.is_some() && last.d3 == first.d5;
        best = best.min(if wraps { dp[0] } else { dp[0].min(dp[1]) });
    }
    best
}

struct Evaluator<'a, M: EnergyModel> {
    fc: &'a FoldCompound<M>,
    /// 1-based partners, 0 if unpaired.
    partner: Vec<usize>,
    /// Quadruplexes by 1-based start.
    quad_at: Vec<Option<Quadruplex>>,
}

fn inadmissible(msg: String) -> SuboptError {
    SuboptError::Inadmissible(msg)
}

fn checked(e: i32, what: &str) -> Result<i32, SuboptError> {
    if e >= INF {
        Err(inadmissible(what.to_string()))
    } else {
        Ok(e)
    }
}

impl<'a, M: EnergyModel> Evaluator<'a, M> {
    fn new(fc: &'a FoldCompound<M>, structure: &DotBracketVec) -> Result<Self, SuboptError> {
        let n = fc.len();
        if structure.len() != n {
            return Err(StructureError::LengthMismatch(structure.len(), n).into());
        }
        let pt = PairTable::try_from(structure)?;
        let quads = structure.quadruplexes()?;
        if !quads.is_empty() && !fc.details().gquad {
            return Err(inadmissible("quadruplexes are disabled".to_string()));
        }

        let mut partner = vec![0; n + 2];
        for (i, j) in pt.pairs() {
            partner[i + 1] = j + 1;
            partner[j + 1] = i + 1;
        }
        let mut quad_at = vec![None; n + 2];
        for q in quads {
            let q = Quadruplex::new(q.start + 1, q.run, q.linkers);
            if !fc.is_gquad(&q) {
                return Err(inadmissible(format!("no quadruplex at {}", q.start)));
            }
            quad_at[q.start] = Some(q);
        }
        Ok(Evaluator { fc, partner, quad_at })
    }

    fn check_pairs(&self) -> Result<(), SuboptError> {
        let fc = self.fc;
        let n = fc.len();
        for i in 1..=n {
            let j = self.partner[i];
            if j <= i {
                continue;
            }
            if !fc.pair_allowed(i, j) {
                return Err(inadmissible(format!("pair ({}, {}) is not allowed", i, j)));
            }
            if fc.details().no_lp && self.is_lonely(i, j) {
                return Err(inadmissible(format!("lonely pair ({}, {})", i, j)));
            }
        }
        Ok(())
    }

    fn is_lonely(&self, i: usize, j: usize) -> bool {
        let fc = self.fc;
        let n = fc.len();
        let inner = self.partner[i + 1] == j - 1
            && fc.same_strand(i, i + 1) && fc.same_strand(j - 1, j);
        let outer = i > 1 && j < n && self.partner[i - 1] == j + 1
            && fc.same_strand(i - 1, i) && fc.same_strand(j, j + 1);
        let across_origin = fc.details().circular
            && ((i == 1 && j < n && self.partner[j + 1] == n)
                || (j == n && i > 1 && self.partner[i - 1] == 1));
        !(inner || outer || across_origin)
    }

    /// Top-level content of the segment [from, to].
    fn scan(&self, from: usize, to: usize) -> Result<LoopContent, SuboptError> {
        let mut content = LoopContent::default();
        let mut k = from;
        while k <= to {
            let p = self.partner[k];
            if p > k {
                content.branches.push(Branch::Pair(k, p));
                k = p + 1;
            } else if p != 0 {
                return Err(inadmissible(format!("pair at {} crosses a loop boundary", k)));
            } else if let Some(q) = self.quad_at[k] {
                if q.end() > to {
                    return Err(inadmissible(format!("quadruplex at {} leaves its loop", k)));
                }
                content.branches.push(Branch::Quad(q));
                k = q.end() + 1;
            } else {
                content.unpaired.push(k);
                k += 1;
            }
        }
        Ok(content)
    }

    fn ml_unpaired(&self, unpaired: &[usize]) -> i32 {
        let fc = self.fc;
        let linear: i32 = unpaired.iter().map(|&k| fc.ml_unpaired(k, k)).sum();
        if fc.details().log_ml {
            let base = fc.model().multi_base() * unpaired.len() as i32;
            linear - base + fc.model().multi_unpaired_log(unpaired.len())
        } else {
            linear
        }
    }

    /// `energy` of a stem with the given neighbors. With dangles=1 only
    /// neighbors in `free` may dangle, each on one stem.
    fn stem<F>(&self, free: &[usize], (n5, n3): (Option<usize>, Option<usize>), energy: F) -> Stem
    where
        F: Fn(Option<usize>, Option<usize>) -> i32,
    {
        let md = self.fc.details();
        if md.dangles != 1 {
            return if md.with_dangles() { Stem::fixed(energy(n5, n3)) } else { Stem::fixed(energy(None, None)) };
        }
        let d5 = n5.filter(|k| free.binary_search(k).is_ok());
        let d3 = n3.filter(|k| free.binary_search(k).is_ok());
        let mut e = [INF; 4];
        for (x, slot) in e.iter_mut().enumerate() {
            let (u5, u3) = (x & 1 == 1, x & 2 == 2);
            if (u5 && d5.is_none()) || (u3 && d3.is_none()) {
                continue;
            }
            *slot = energy(d5.filter(|_| u5), d3.filter(|_| u3));
        }
        Stem { d5, d3, energy: e }
    }

    /// Stem terms of a multiloop, closed by `closing` or by the circular exterior.
    fn ml_stems(
        &self,
        closing: Option<(usize, usize)>,
        branches: &[Branch],
        free: &[usize],
    ) -> Result<i32, SuboptError> {
        let fc = self.fc;
        let mut stems = Vec::with_capacity(branches.len() + 1);
        if let Some((i, j)) = closing {
            stems.push(self.stem(free, fc.ml_closing_neighbors(i, j),
                |d5, d3| fc.e_ml_closing_with(i, j, d5, d3)));
        }
        let mut quads = 0;
        for b in branches {
            match *b {
                Branch::Pair(p, q) => stems.push(self.stem(free, fc.ml_stem_neighbors(p, q),
                    |d5, d3| fc.e_ml_stem_with(p, q, d5, d3))),
                Branch::Quad(q) => quads += checked(fc.e_gquad(&q), "quadruplex")? + fc.model().gquad_multi_stem(),
            }
        }
        Ok(checked(min_stem_energy(&stems, true), "multiloop")? + quads)
    }

    /// Energy of the loop closed by (i,j).
    fn pair_loop(&self, i: usize, j: usize) -> Result<i32, SuboptError> {
        let fc = self.fc;
        let content = self.scan(i + 1, j - 1)?;
        let crossing = content.branches.iter().any(|b| match *b {
            Branch::Pair(p, q) => !fc.same_strand(p, q),
            Branch::Quad(q) => !fc.same_strand(q.start, q.end()),
        });

        let e = if !fc.same_strand(i, j) && !crossing {
            let free = &content.unpaired;
            let mut stems = vec![self.stem(free, fc.cut_loop_neighbors(i, j),
                |d5, d3| fc.e_cut_loop_with(i, j, d5, d3))];
            for b in &content.branches {
                match *b {
                    Branch::Pair(p, q) => stems.push(self.stem(free, fc.ext_stem_neighbors(p, q),
                        |d5, d3| fc.e_ext_stem_with(p, q, d5, d3))),
                    Branch::Quad(_) => return Err(inadmissible("quadruplex next to the strand break".to_string())),
                }
            }
            let mut e = checked(min_stem_energy(&stems, true), "cut loop")?;
            for &k in &content.unpaired {
                e += checked(fc.exterior_unpaired(k, k), "unpaired base")?;
            }
            e
        } else {
            match content.branches.as_slice() {
                [] => fc.e_hairpin(i, j),
                [Branch::Pair(p, q)] => fc.e_interior(i, j, *p, *q),
                [Branch::Quad(q)] => fc.e_gquad_interior(i, j, q.start, q.end())
                    + checked(fc.e_gquad(q), "quadruplex")?,
                branches => self.ml_stems(Some((i, j)), branches, &content.unpaired)?
                    + self.ml_unpaired(&content.unpaired),
            }
        };
        let e = e + fc.sc_pair(i, j);
        if e >= INF {
            return Err(inadmissible(format!("loop closed by ({}, {})", i, j)));
        }
        Ok(e)
    }

    fn exterior_loop(&self) -> Result<i32, SuboptError> {
        let fc = self.fc;
        let n = fc.len();
        let content = self.scan(1, n)?;

        if fc.details().circular {
            let pairs: Vec<(usize, usize)> = content.branches.iter()
                .map(|b| match *b {
                    Branch::Pair(p, q) => Ok((p, q)),
                    Branch::Quad(_) => Err(inadmissible("quadruplex in a circular sequence".to_string())),
                })
                .collect::<Result<_, _>>()?;
            let e = match pairs.as_slice() {
                [] => fc.exterior_unpaired(1, n),
                [(k, l)] => fc.e_circ_hairpin(*k, *l),
                [(k, l), (p, q)] => fc.e_circ_interior(*k, *l, *p, *q),
                _ => fc.model().multi_closing()
                    + self.ml_stems(None, &content.branches, &content.unpaired)?
                    + self.ml_unpaired(&content.unpaired),
            };
            return checked(e, "exterior loop");
        }

        let mut e = 0;
        let mut stems = Vec::with_capacity(content.branches.len());
        for b in &content.branches {
            match *b {
                Branch::Pair(p, q) => {
                    stems.push(self.stem(&content.unpaired, fc.ext_stem_neighbors(p, q),
                        |d5, d3| fc.e_ext_stem_with(p, q, d5, d3)));
                    e += fc.e_duplex(p, q);
                }
                Branch::Quad(q) => e += checked(fc.e_gquad(&q), "quadruplex")?,
            }
        }
        e += checked(min_stem_energy(&stems, false), "exterior stem")?;
        for &k in &content.unpaired {
            e += checked(fc.exterior_unpaired(k, k), "unpaired base")?;
        }
        Ok(e)
    }
}

/// Free energy (dcal/mol) of a structure without strand break symbols.
pub fn eval_structure<M: EnergyModel>(
    fc: &FoldCompound<M>,
    structure: &DotBracketVec,
) -> Result<i32, SuboptError> {
    let ev = Evaluator::new(fc, structure)?;
    ev.check_pairs()?;
    let mut total = ev.exterior_loop()?;
    for i in 1..=fc.len() {
        let j = ev.partner[i];
        if j > i {
            total += ev.pair_loop(i, j)?;
        }
    }
    Ok(total)
}

/// Free energy (dcal/mol) of a dot-bracket string. A '&' must match the
/// strand break of the sequence.
pub fn eval_dotbracket<M: EnergyModel>(fc: &FoldCompound<M>, structure: &str) -> Result<i32, SuboptError> {
    let (db, cut) = DotBracketVec::try_from(structure.trim())?.split_break()?;
    if cut != fc.cut().map(|cp| cp - 1) {
        return Err(inadmissible(format!(
            "strand break of {} does not match the sequence", structure)));
    }
    eval_structure(fc, &db)
}
