//! Minimum free energy tables.
//!
//! All tables hold exact optima of the sub-problems the enumeration
//! decomposes into, which makes them admissible lower bounds. Values are
//! capped at `INF`.

use log::{debug, info};
use ndarray::Array2;

use ff_energy::EnergyModel;
use ff_energy::INF;

use crate::FoldCompound;

#[inline]
fn cap(e: i32) -> i32 {
    e.min(INF)
}

/// Exterior loop alternatives of a circular sequence.
#[derive(Debug, Clone)]
pub struct CircularTables {
    pub open: i32,
    pub hairpin: i32,
    pub interior: i32,
    pub multi: i32,
}

impl CircularTables {
    pub fn mfe(&self) -> i32 {
        self.open.min(self.hairpin).min(self.interior).min(self.multi)
    }
}

#[derive(Debug, Clone)]
pub struct DpTables {
    n: usize,
    /// (i,j) paired, not stacked from outside.
    pub(crate) c: Array2<i32>,
    /// (i,j) paired and stacked onto (i-1,j+1). Equal to `c` unless noLP.
    pub(crate) cc: Array2<i32>,
    /// Multiloop segment with at least one branch.
    pub(crate) fml: Array2<i32>,
    /// Multiloop segment with exactly one branch starting at i.
    pub(crate) fm1: Array2<i32>,
    pub(crate) ggg: Array2<i32>,
    pub(crate) f5: Vec<i32>,
    /// Exterior segment [i, cp-1] left of the cut.
    pub(crate) fc_left: Vec<i32>,
    /// Exterior segment [cp, j] right of the cut.
    pub(crate) fc_right: Vec<i32>,
    pub(crate) circular: Option<CircularTables>,
}

impl DpTables {
    fn new(n: usize) -> Self {
        let mut f5 = vec![INF; n + 1];
        f5[0] = 0;
        DpTables {
            n,
            c: Array2::from_elem((n + 2, n + 2), INF),
            cc: Array2::from_elem((n + 2, n + 2), INF),
            fml: Array2::from_elem((n + 2, n + 2), INF),
            fm1: Array2::from_elem((n + 2, n + 2), INF),
            ggg: Array2::from_elem((n + 2, n + 2), INF),
            f5,
            fc_left: vec![INF; n + 2],
            fc_right: vec![INF; n + 2],
            circular: None,
        }
    }

    pub fn fill<M: EnergyModel>(fc: &FoldCompound<M>) -> Self {
        let n = fc.len();
        let mut t = DpTables::new(n);
        if fc.details().gquad {
            t.fill_gquads(fc);
        }
        if let Some(cp) = fc.cut() {
            t.fc_left[cp] = 0;
            t.fc_right[cp - 1] = 0;
        }

        for i in (1..=n).rev() {
            if fc.cut() == Some(i + 1) {
                // All rows on the second strand are done.
                t.fill_cut_right(fc, i + 1);
            }
            for j in i + 1..=n {
                t.fill_pair(fc, i, j);
                t.fill_multi(fc, i, j);
            }
            match fc.cut() {
                Some(cp) if i < cp => t.fill_cut_left(fc, i, cp),
                _ => (),
            }
        }

        t.fill_exterior(fc);
        if fc.details().circular {
            t.fill_circular(fc);
        }
        info!("MFE: {:.2} kcal/mol", t.mfe() as f64 / 100.);
        t
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Minimum free energy in dcal/mol, `INF` if nothing can fold.
    pub fn mfe(&self) -> i32 {
        match &self.circular {
            Some(circ) => circ.mfe(),
            None => self.f5[self.n],
        }
    }

    pub fn circular(&self) -> Option<&CircularTables> {
        self.circular.as_ref()
    }

    fn fill_gquads<M: EnergyModel>(&mut self, fc: &FoldCompound<M>) {
        let n = fc.len();
        for i in 1..=n {
            for j in i + 10..=n {
                let mut e = INF;
                fc.for_each_gquad(i, j, |q| e = e.min(fc.e_gquad(&q)));
                self.ggg[[i, j]] = e;
            }
        }
    }

    fn fill_pair<M: EnergyModel>(&mut self, fc: &FoldCompound<M>, i: usize, j: usize) {
        if !fc.pair_allowed(i, j) {
            return;
        }
        let max_loop = fc.max_loop();
        let mut e = fc.e_hairpin(i, j);

        for p in i + 1..j.min(i + max_loop + 2) {
            let u1 = p - i - 1;
            for q in (p + 1..j).rev() {
                if u1 + (j - q - 1) > max_loop {
                    break;
                }
                if !fc.pair_allowed(p, q) {
                    continue;
                }
                let inner = if p == i + 1 && q == j - 1 {
                    self.cc[[p, q]]
                } else {
                    self.c[[p, q]]
                };
                if inner < INF {
                    e = e.min(fc.e_interior(i, j, p, q) + inner);
                }
            }
        }

        let closing = fc.e_ml_closing(i, j);
        if closing < INF {
            for k in i + 1..j - 1 {
                e = e.min(closing + self.fml[[i + 1, k]] + self.fm1[[k + 1, j - 1]]);
            }
        }

        if !fc.same_strand(i, j) {
            e = e.min(fc.e_cut_loop(i, j) + self.fc_left[i + 1] + self.fc_right[j - 1]);
        }

        if fc.details().gquad {
            for p in i + 1..j {
                let u1 = p - i - 1;
                if u1 > max_loop {
                    break;
                }
                for q in (p + 10..j).rev() {
                    if u1 + (j - q - 1) > max_loop {
                        break;
                    }
                    if self.ggg[[p, q]] < INF {
                        e = e.min(fc.e_gquad_interior(i, j, p, q) + self.ggg[[p, q]]);
                    }
                }
            }
        }

        let bp = fc.sc_pair(i, j);
        self.cc[[i, j]] = cap(e + bp);
        self.c[[i, j]] = if fc.details().no_lp {
            if fc.pair_allowed(i + 1, j - 1) {
                cap(bp + fc.e_interior(i, j, i + 1, j - 1) + self.cc[[i + 1, j - 1]])
            } else {
                INF
            }
        } else {
            self.cc[[i, j]]
        };
    }

    /// Branch [i, j] of a multiloop: a pair or a quadruplex.
    pub(crate) fn ml_stem<M: EnergyModel>(&self, fc: &FoldCompound<M>, i: usize, j: usize) -> i32 {
        let mut e = INF;
        if self.c[[i, j]] < INF {
            e = e.min(self.c[[i, j]] + fc.e_ml_stem(i, j));
        }
        if self.ggg[[i, j]] < INF {
            e = e.min(self.ggg[[i, j]] + fc.model().gquad_multi_stem());
        }
        e
    }

    fn fill_multi<M: EnergyModel>(&mut self, fc: &FoldCompound<M>, i: usize, j: usize) {
        if !(fc.same_strand(i - 1, i) && fc.same_strand(j, j + 1)) {
            return;
        }
        let stem = self.ml_stem(fc, i, j);
        let nibble = fc.ml_unpaired(j, j);

        self.fm1[[i, j]] = cap(stem.min(self.fm1[[i, j - 1]] + nibble));

        let mut e = stem.min(self.fml[[i, j - 1]] + nibble);
        for k in i..j {
            if self.fml[[i, k]] < INF {
                e = e.min(self.fml[[i, k]] + self.ml_stem(fc, k + 1, j));
            }
        }
        for a in i + 1..j {
            if !fc.same_strand(i, a) {
                break;
            }
            let up = fc.ml_unpaired(i, a - 1);
            if up >= INF {
                break;
            }
            e = e.min(up + self.ml_stem(fc, a, j));
        }
        self.fml[[i, j]] = cap(e);
    }

    fn fill_cut_left<M: EnergyModel>(&mut self, fc: &FoldCompound<M>, i: usize, cp: usize) {
        let mut e = self.fc_left[i + 1] + fc.exterior_unpaired(i, i);
        for l in i + 1..cp {
            if self.c[[i, l]] < INF {
                e = e.min(self.c[[i, l]] + fc.e_ext_stem(i, l) + self.fc_left[l + 1]);
            }
        }
        self.fc_left[i] = cap(e);
    }

    fn fill_cut_right<M: EnergyModel>(&mut self, fc: &FoldCompound<M>, cp: usize) {
        for j in cp..=fc.len() {
            let mut e = self.fc_right[j - 1] + fc.exterior_unpaired(j, j);
            for k in cp..j {
                if self.c[[k, j]] < INF {
                    e = e.min(self.fc_right[k - 1] + self.c[[k, j]] + fc.e_ext_stem(k, j));
                }
            }
            self.fc_right[j] = cap(e);
        }
    }

    fn fill_exterior<M: EnergyModel>(&mut self, fc: &FoldCompound<M>) {
        for j in 1..=self.n {
            let mut e = self.f5[j - 1] + fc.exterior_unpaired(j, j);
            for k in 1..j {
                if self.c[[k, j]] < INF {
                    e = e.min(self.f5[k - 1] + self.c[[k, j]] + fc.e_ext_stem(k, j) + fc.e_duplex(k, j));
                }
                if self.ggg[[k, j]] < INF {
                    e = e.min(self.f5[k - 1] + self.ggg[[k, j]]);
                }
            }
            self.f5[j] = cap(e);
        }
    }

    fn fill_circular<M: EnergyModel>(&mut self, fc: &FoldCompound<M>) {
        let n = self.n;
        let max_loop = fc.max_loop();

        let open = cap(fc.exterior_unpaired(1, n));

        let mut hairpin = INF;
        for k in 1..n {
            for l in k + 1..=n {
                if self.c[[k, l]] < INF {
                    hairpin = hairpin.min(self.c[[k, l]] + fc.e_circ_hairpin(k, l));
                }
            }
        }

        let mut interior = INF;
        for k in 1..=n.min(max_loop + 1) {
            for l in k + 1..=n {
                if self.cc[[k, l]] >= INF {
                    continue;
                }
                for p in l + 1..=n {
                    let u1 = p - l - 1;
                    if u1 + k - 1 > max_loop {
                        break;
                    }
                    for q in (p + 1..=n).rev() {
                        let u2 = n - q + k - 1;
                        if u1 + u2 > max_loop {
                            break;
                        }
                        let (outer, inner) = if u1 + u2 == 0 {
                            (self.cc[[k, l]], self.cc[[p, q]])
                        } else {
                            (self.c[[k, l]], self.c[[p, q]])
                        };
                        if outer < INF && inner < INF {
                            interior = interior.min(outer + inner + fc.e_circ_interior(k, l, p, q));
                        }
                    }
                }
            }
        }

        // Two branches of the multiloop ending at n.
        let mut fm2 = vec![INF; n + 2];
        for i in 1..n {
            for u in i..n {
                fm2[i] = fm2[i].min(self.fm1[[i, u]] + self.fm1[[u + 1, n]]);
            }
        }
        let mut multi = INF;
        for k in 1..n {
            multi = multi.min(self.fml[[1, k]] + fm2[k + 1]);
        }
        let multi = cap(multi + fc.model().multi_closing());

        let circ = CircularTables {
            open,
            hairpin: cap(hairpin),
            interior: cap(interior),
            multi,
        };
        debug!("Circular exterior: {:?}", circ);
        self.circular = Some(circ);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_energy::ViennaRNA;
    use crate::ModelDetails;

    fn tables(seq: &str, md: ModelDetails) -> (FoldCompound<ViennaRNA>, DpTables) {
        let fc = FoldCompound::new(seq, ViennaRNA::default(), md).unwrap();
        let t = DpTables::fill(&fc);
        (fc, t)
    }

    #[test]
    fn test_mfe_single_hairpin() {
        let (_, t) = tables("GGGGAAAACCCC", ModelDetails::default());
        // 3 GC/CG stacks and a tetraloop with AA mismatch.
        assert_eq!(t.mfe(), 3 * -330 + 480);
        assert_eq!(t.c[[4, 9]], 480);
        assert_eq!(t.f5[4], 0);
    }

    #[test]
    fn test_mfe_open_chain() {
        let (_, t) = tables("AAAAAAAAAA", ModelDetails::default());
        assert_eq!(t.mfe(), 0);
        assert!(t.c.iter().all(|&e| e == INF));
    }

    #[test]
    fn test_no_lonely_pairs() {
        let (_, t) = tables("GAAAC", ModelDetails { no_lp: true, ..Default::default() });
        assert_eq!(t.c[[1, 5]], INF);
        assert!(t.cc[[1, 5]] < INF);
        assert_eq!(t.mfe(), 0);
    }

    #[test]
    fn test_multiloop_tables_respect_the_cut() {
        let (fc, t) = tables("GGGAAACCCGGG&CCCAAAGGGCCC", ModelDetails::default());
        let cp = fc.cut().unwrap();
        // No segment may end or start right at the break.
        for i in 1..cp {
            assert_eq!(t.fml[[i, cp - 1]], INF);
            assert_eq!(t.fm1[[i, cp - 1]], INF);
        }
        for j in cp..=fc.len() {
            assert_eq!(t.fml[[cp, j]], INF);
            assert_eq!(t.fm1[[cp, j]], INF);
        }
        assert_eq!(t.fc_left[cp], 0);
        assert_eq!(t.fc_right[cp - 1], 0);
        assert!(t.mfe() < 0);
    }

    #[test]
    fn test_cofold_duplex() {
        let (_, t) = tables("GGGA&ACCC", ModelDetails::default());
        // (1,8),(2,7),(3,6) around the cut, initiation counted once.
        assert_eq!(t.c[[3, 6]], -50 - 110);
        assert_eq!(t.mfe(), 410 - 660 - 160);

        // A-U across the cut closes the helix.
        let (_, t) = tables("GGGA&UCCC", ModelDetails::default());
        assert_eq!(t.c[[4, 5]], 50);
        assert_eq!(t.mfe(), 410 - 660 - 240 + 50);
    }

    #[test]
    fn test_circular_open_chain_and_hairpin() {
        let md = ModelDetails { circular: true, ..Default::default() };
        let (_, t) = tables("GGGGAAAACCCCAAAA", md);
        let circ = t.circular().unwrap();
        assert_eq!(circ.open, 0);
        assert!(circ.hairpin < 0);
        assert_eq!(t.mfe(), circ.mfe());
    }

    #[test]
    fn test_gquad_table() {
        let md = ModelDetails { gquad: true, ..Default::default() };
        let (_, t) = tables("AGGAGGAGGAGGA", md);
        assert_eq!(t.ggg[[2, 12]], -1800);
        assert_eq!(t.mfe(), -1800);
    }
}
