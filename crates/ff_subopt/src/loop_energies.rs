//! Loop energies at fixed coordinates.
//!
//! Every function returns `INF` (or more) when the loop is not allowed by the
//! model switches or the hard constraints. The fill, the enumeration and the
//! evaluation of structures all go through these, which keeps the three in
//! exact agreement.

use ff_energy::EnergyModel;
use ff_energy::INF;
use ff_structure::Quadruplex;

use crate::FoldCompound;
use crate::LoopKind;
use crate::constraints::*;

impl<M: EnergyModel> FoldCompound<M> {
    #[inline]
    pub(crate) fn sc_unpaired(&self, i: usize, j: usize) -> i32 {
        self.soft_constraints().map_or(0, |sc| sc.unpaired(i, j))
    }

    #[inline]
    pub(crate) fn sc_pair(&self, i: usize, j: usize) -> i32 {
        self.soft_constraints().map_or(0, |sc| sc.pair(i, j))
    }

    #[inline]
    fn sc_callback(&self, i: usize, j: usize, p: usize, q: usize, kind: LoopKind) -> i32 {
        self.soft_constraints().map_or(0, |sc| sc.callback(i, j, p, q, kind))
    }

    /// Positions `i..=j` unpaired in the exterior loop.
    pub(crate) fn exterior_unpaired(&self, i: usize, j: usize) -> i32 {
        if j < i {
            return 0;
        }
        if !self.hard_constraints().unpaired_run(EXT_LOOP, i, j - i + 1) {
            return INF;
        }
        self.sc_unpaired(i, j)
    }

    /// Positions `i..=j` unpaired in a multiloop.
    pub(crate) fn ml_unpaired(&self, i: usize, j: usize) -> i32 {
        if j < i {
            return 0;
        }
        let u = j - i + 1;
        if !self.hard_constraints().unpaired_run(MB_LOOP, i, u) {
            return INF;
        }
        u as i32 * self.model().multi_base() + self.sc_unpaired(i, j)
    }

    /// Initiation for a pair that connects the two strands.
    pub(crate) fn e_duplex(&self, i: usize, j: usize) -> i32 {
        if self.same_strand(i, j) { 0 } else { self.model().duplex_init() }
    }

    #[inline]
    fn dangling(&self, (d5, d3): (Option<usize>, Option<usize>)) -> (Option<usize>, Option<usize>) {
        if self.details().with_dangles() { (d5, d3) } else { (None, None) }
    }

    /// Neighbors of (i,j) as an exterior branch: 5' of i and 3' of j.
    pub(crate) fn ext_stem_neighbors(&self, i: usize, j: usize) -> (Option<usize>, Option<usize>) {
        ((i > 1 && self.same_strand(i - 1, i)).then_some(i - 1),
         (j < self.len() && self.same_strand(j, j + 1)).then_some(j + 1))
    }

    /// Neighbors of (i,j) as a multiloop branch. Wraps around the origin.
    pub(crate) fn ml_stem_neighbors(&self, i: usize, j: usize) -> (Option<usize>, Option<usize>) {
        let n = self.len();
        (Some(if i == 1 { n } else { i - 1 }), Some(if j == n { 1 } else { j + 1 }))
    }

    /// Neighbors inside the multiloop closed by (i,j): 5' of j and 3' of i.
    pub(crate) fn ml_closing_neighbors(&self, i: usize, j: usize) -> (Option<usize>, Option<usize>) {
        (Some(j - 1), Some(i + 1))
    }

    /// Neighbors inside the loop closed by (i,j) that contains the strand break.
    pub(crate) fn cut_loop_neighbors(&self, i: usize, j: usize) -> (Option<usize>, Option<usize>) {
        (self.same_strand(j - 1, j).then_some(j - 1), self.same_strand(i, i + 1).then_some(i + 1))
    }

    /// (i,j) as a branch of the exterior loop.
    pub(crate) fn e_ext_stem(&self, i: usize, j: usize) -> i32 {
        let (d5, d3) = self.dangling(self.ext_stem_neighbors(i, j));
        self.e_ext_stem_with(i, j, d5, d3)
    }

    /// (i,j) as an exterior branch with the given dangling positions.
    pub(crate) fn e_ext_stem_with(&self, i: usize, j: usize, d5: Option<usize>, d3: Option<usize>) -> i32 {
        if !self.hard_constraints().pair_allows(i, j, EXT_LOOP) {
            return INF;
        }
        self.model().exterior_stem(self.pair_type(i, j), d5.map(|k| self.base(k)), d3.map(|k| self.base(k)))
    }

    /// (i,j) as a branch of a multiloop.
    pub(crate) fn e_ml_stem(&self, i: usize, j: usize) -> i32 {
        let (d5, d3) = self.dangling(self.ml_stem_neighbors(i, j));
        self.e_ml_stem_with(i, j, d5, d3)
    }

    pub(crate) fn e_ml_stem_with(&self, i: usize, j: usize, d5: Option<usize>, d3: Option<usize>) -> i32 {
        if !self.hard_constraints().pair_allows(i, j, MB_LOOP_ENC) {
            return INF;
        }
        self.model().multi_stem(self.pair_type(i, j), d5.map(|k| self.base(k)), d3.map(|k| self.base(k)))
    }

    /// (i,j) closing a multiloop: closing penalty plus its own stem term.
    pub(crate) fn e_ml_closing(&self, i: usize, j: usize) -> i32 {
        let (d5, d3) = self.dangling(self.ml_closing_neighbors(i, j));
        self.e_ml_closing_with(i, j, d5, d3)
    }

    pub(crate) fn e_ml_closing_with(&self, i: usize, j: usize, d5: Option<usize>, d3: Option<usize>) -> i32 {
        if !self.hard_constraints().pair_allows(i, j, MB_LOOP) {
            return INF;
        }
        let tt = self.pair_type(j, i);
        if self.details().no_gu_closure && tt.is_wobble() {
            return INF;
        }
        self.model().multi_closing()
            + self.model().multi_stem(tt, d5.map(|k| self.base(k)), d3.map(|k| self.base(k)))
    }

    pub(crate) fn e_hairpin(&self, i: usize, j: usize) -> i32 {
        if !self.same_strand(i, j) {
            return INF;
        }
        let u = j - i - 1;
        if u < self.model().min_hairpin_size() {
            return INF;
        }
        let hc = self.hard_constraints();
        if !hc.pair_allows(i, j, HP_LOOP) || !hc.unpaired_run(HP_LOOP, i + 1, u) {
            return INF;
        }
        let tt = self.pair_type(i, j);
        if self.details().no_gu_closure && tt.is_wobble() {
            return INF;
        }
        self.model().hairpin(u, tt, self.base(i + 1), self.base(j - 1))
            + self.sc_unpaired(i + 1, j - 1)
            + self.sc_callback(i, j, i, j, LoopKind::Hairpin)
    }

    /// Stack, bulge or interior loop closed by (i,j) with inner pair (p,q).
    pub(crate) fn e_interior(&self, i: usize, j: usize, p: usize, q: usize) -> i32 {
        if !(self.same_strand(i, p) && self.same_strand(q, j)) {
            return INF;
        }
        let (u1, u2) = (p - i - 1, j - q - 1);
        if u1 + u2 > self.max_loop() {
            return INF;
        }
        let hc = self.hard_constraints();
        if !hc.pair_allows(i, j, INT_LOOP) || !hc.pair_allows(p, q, INT_LOOP_ENC) {
            return INF;
        }
        if !hc.unpaired_run(INT_LOOP, i + 1, u1) || !hc.unpaired_run(INT_LOOP, q + 1, u2) {
            return INF;
        }
        let (outer, inner) = (self.pair_type(i, j), self.pair_type(q, p));
        if self.details().no_gu_closure && u1 + u2 > 0 && (outer.is_wobble() || inner.is_wobble()) {
            return INF;
        }
        self.model().interior(u1, u2, outer, inner,
                (self.base(i + 1), self.base(j - 1)),
                (self.base(q + 1), self.base(p - 1)))
            + self.sc_unpaired(i + 1, p - 1)
            + self.sc_unpaired(q + 1, j - 1)
            + self.sc_callback(i, j, p, q, LoopKind::Interior)
    }

    /// (i,j) closing the loop that contains the strand break.
    pub(crate) fn e_cut_loop(&self, i: usize, j: usize) -> i32 {
        let (d5, d3) = self.dangling(self.cut_loop_neighbors(i, j));
        self.e_cut_loop_with(i, j, d5, d3)
    }

    pub(crate) fn e_cut_loop_with(&self, i: usize, j: usize, d5: Option<usize>, d3: Option<usize>) -> i32 {
        if !self.hard_constraints().pair_allows(i, j, EXT_LOOP) {
            return INF;
        }
        self.model().exterior_stem(self.pair_type(j, i), d5.map(|k| self.base(k)), d3.map(|k| self.base(k)))
    }

    /// A quadruplex on its own. Its positions must be free of pairing constraints.
    pub(crate) fn e_gquad(&self, q: &Quadruplex) -> i32 {
        if !self.is_gquad(q) || !self.hard_constraints().unpaired_run(ALL_LOOPS, q.start, q.span()) {
            return INF;
        }
        self.model().gquad(q.run, q.linker_total())
    }

    /// (i,j) closing an interior loop around the quadruplex [p, q].
    pub(crate) fn e_gquad_interior(&self, i: usize, j: usize, p: usize, q: usize) -> i32 {
        let (u1, u2) = (p - i - 1, j - q - 1);
        if u1 + u2 > self.max_loop() || (u1 == 0 && u2 < 3) || (u2 == 0 && u1 < 3) {
            return INF;
        }
        let hc = self.hard_constraints();
        if !hc.pair_allows(i, j, INT_LOOP)
            || !hc.unpaired_run(INT_LOOP, i + 1, u1)
            || !hc.unpaired_run(INT_LOOP, q + 1, u2) {
            return INF;
        }
        let tt = self.pair_type(i, j);
        if self.details().no_gu_closure && tt.is_wobble() {
            return INF;
        }
        self.model().gquad_interior(tt, u1, u2, self.base(i + 1), self.base(j - 1))
            + self.sc_unpaired(i + 1, p - 1)
            + self.sc_unpaired(q + 1, j - 1)
    }

    /// Circular exterior loop as a hairpin closed by (k,l).
    pub(crate) fn e_circ_hairpin(&self, k: usize, l: usize) -> i32 {
        let n = self.len();
        let u = n - l + k - 1;
        if u < self.model().min_hairpin_size() {
            return INF;
        }
        let hc = self.hard_constraints();
        if !hc.pair_allows(k, l, HP_LOOP)
            || !hc.unpaired_run(HP_LOOP, l + 1, n - l)
            || !hc.unpaired_run(HP_LOOP, 1, k - 1) {
            return INF;
        }
        let tt = self.pair_type(l, k);
        if self.details().no_gu_closure && tt.is_wobble() {
            return INF;
        }
        self.model().hairpin(u, tt, self.base(l + 1), self.base(k - 1))
            + self.sc_unpaired(l + 1, n)
            + self.sc_unpaired(1, k - 1)
    }

    /// Circular exterior loop as an interior loop between (k,l) and (p,q), l < p.
    pub(crate) fn e_circ_interior(&self, k: usize, l: usize, p: usize, q: usize) -> i32 {
        let n = self.len();
        let (u1, u2) = (p - l - 1, n - q + k - 1);
        if u1 + u2 > self.max_loop() {
            return INF;
        }
        let hc = self.hard_constraints();
        if !hc.pair_allows(k, l, INT_LOOP) || !hc.pair_allows(p, q, INT_LOOP) {
            return INF;
        }
        if !hc.unpaired_run(INT_LOOP, l + 1, u1)
            || !hc.unpaired_run(INT_LOOP, q + 1, n - q)
            || !hc.unpaired_run(INT_LOOP, 1, k - 1) {
            return INF;
        }
        let (outer, inner) = (self.pair_type(l, k), self.pair_type(q, p));
        if self.details().no_gu_closure && u1 + u2 > 0 && (outer.is_wobble() || inner.is_wobble()) {
            return INF;
        }
        self.model().interior(u1, u2, outer, inner,
                (self.base(l + 1), self.base(k - 1)),
                (self.base(q + 1), self.base(p - 1)))
            + self.sc_unpaired(l + 1, p - 1)
            + self.sc_unpaired(q + 1, n)
            + self.sc_unpaired(1, k - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_energy::ViennaRNA;
    use crate::{ModelDetails, SoftConstraints};

    fn compound(seq: &str, md: ModelDetails) -> FoldCompound<ViennaRNA> {
        FoldCompound::new(seq, ViennaRNA::default(), md).unwrap()
    }

    #[test]
    fn test_hairpin_and_stack() {
        let fc = compound("GGGGAAAACCCC", ModelDetails::default());
        assert_eq!(fc.e_hairpin(4, 9), 560 - 80);
        assert_eq!(fc.e_hairpin(5, 8), INF);
        assert_eq!(fc.e_interior(3, 10, 4, 9), -330);
        assert_eq!(fc.e_ext_stem(1, 12), 0);
        // G-C with G on the 5' side (0) and C on the 3' side.
        assert_eq!(fc.e_ext_stem(2, 11), -80);
    }

    #[test]
    fn test_cut_loop_dangles() {
        let fc = compound("GGGA&UCCC", ModelDetails::default());
        // rtype C-G, 5' U and 3' A
        assert_eq!(fc.e_cut_loop(3, 6), -10 - 110);
        // Adjacent across the cut: no dangles.
        let fc = compound("GGG&CCC", ModelDetails::default());
        assert_eq!(fc.e_cut_loop(3, 4), 0);
        assert_eq!(fc.e_duplex(3, 4), 410);
        assert_eq!(fc.e_duplex(1, 3), 0);
        assert_eq!(fc.e_hairpin(1, 6), INF);
    }

    #[test]
    fn test_no_gu_closure() {
        let md = ModelDetails { no_gu_closure: true, ..Default::default() };
        let fc = compound("GGAAAAUC", md);
        assert_eq!(fc.e_hairpin(2, 7), INF);
        // GU outer pair may stack.
        assert!(fc.e_interior(1, 8, 2, 7) < INF);
        assert_eq!(fc.e_ml_closing(2, 7), INF);
    }

    #[test]
    fn test_soft_constraints_enter_loops() {
        let mut sc = SoftConstraints::new(12).with_callback(|i, j, _, _, kind| {
            if kind == LoopKind::Hairpin && (i, j) == (4, 9) { -7 } else { 0 }
        });
        sc.set_unpaired(5, -20);
        sc.set_unpaired(12, -3);
        let fc = compound("GGGGAAAACCCC", ModelDetails::default()).with_soft_constraints(sc).unwrap();
        assert_eq!(fc.e_hairpin(4, 9), 560 - 80 - 20 - 7);
        assert_eq!(fc.exterior_unpaired(11, 12), -3);
        assert_eq!(fc.ml_unpaired(5, 6), -20);
    }

    #[test]
    fn test_hard_constraints_enter_loops() {
        let fc = compound("GGGGAAAACCCC", ModelDetails::default())
            .with_constraint("...x........").unwrap();
        assert_eq!(fc.e_interior(3, 10, 4, 9), INF);
        let fc = compound("GGGGAAAACCCC", ModelDetails::default())
            .with_constraint("......|.....").unwrap();
        assert_eq!(fc.e_hairpin(4, 9), INF);
        assert_eq!(fc.exterior_unpaired(5, 7), INF);
        assert_eq!(fc.exterior_unpaired(8, 12), 0);
    }

    #[test]
    fn test_circular_exterior_loops() {
        let md = ModelDetails { circular: true, ..Default::default() };
        let fc = compound("GGGGAAAACCCCAAAA", md);
        // (1,12) leaves 4 unpaired bases on the other side of the origin.
        assert_eq!(fc.e_circ_hairpin(1, 12), 560 - 80);
        assert_eq!(fc.e_circ_hairpin(1, 14), INF);

        // (2,8) and (11,17): u1 = 2, u2 = 1 across the origin.
        let fc = compound("AGGAAACCAAGGAAACC", ModelDetails { circular: true, ..Default::default() });
        assert!(fc.e_circ_interior(2, 8, 11, 17) < INF);
        assert_eq!(fc.e_circ_interior(2, 8, 11, 17), fc.model().interior(
            2, 1, fc.pair_type(8, 2), fc.pair_type(17, 11),
            (fc.base(9), fc.base(1)), (fc.base(1), fc.base(10))));
    }

    #[test]
    fn test_gquad_loops() {
        let md = ModelDetails { gquad: true, ..Default::default() };
        let fc = compound("CAAGGAGGAGGAGGAAAG", md);
        let q = Quadruplex::new(4, 2, [1, 1, 1]);
        assert_eq!(fc.e_gquad(&q), -1800);
        assert_eq!(fc.e_gquad(&Quadruplex::new(3, 2, [1, 1, 1])), INF);
        // u1 = 2, u2 = 3
        assert_eq!(fc.e_gquad_interior(1, 18, 4, 14), 200);
        // u1 = 0 needs u2 >= 3
        assert_eq!(fc.e_gquad_interior(3, 16, 4, 14), INF);
    }
}
