use crate::Base;
use crate::PairTypeRNA;

/// Loop energy primitives of a nearest neighbor model, in dcal/mol.
///
/// Pair types are always given in the orientation in which the pair closes
/// the loop: for the outer pair (i, j) of a loop that is `(S[i], S[j])`, for
/// a pair (p, q) enclosed by that loop it is the reversed `(S[q], S[p])`.
/// Mismatch / dangle arguments follow the same convention: `d5` is the base
/// 5' of the first base of the (oriented) pair, `d3` is 3' of its second base.
pub trait EnergyModel {
    fn can_pair(&self, b1: Base, b2: Base) -> bool;

    fn min_hairpin_size(&self) -> usize;

    /// Maximal number of unpaired bases in an interior loop.
    fn max_loop_size(&self) -> usize;

    fn hairpin(&self, size: usize, closing: PairTypeRNA, m5: Base, m3: Base) -> i32;

    /// Stacks, bulges and interior loops. `outer_mm = (S[i+1], S[j-1])`,
    /// `inner_mm = (S[q+1], S[p-1])`.
    fn interior(&self,
        u1: usize,
        u2: usize,
        outer: PairTypeRNA,
        inner: PairTypeRNA,
        outer_mm: (Base, Base),
        inner_mm: (Base, Base),
    ) -> i32;

    fn exterior_stem(&self, pair: PairTypeRNA, d5: Option<Base>, d3: Option<Base>) -> i32;

    fn multi_stem(&self, pair: PairTypeRNA, d5: Option<Base>, d3: Option<Base>) -> i32;

    fn multi_closing(&self) -> i32;

    /// Penalty per unpaired base in a multiloop.
    fn multi_base(&self) -> i32;

    /// Logarithmic penalty for `u` unpaired bases in a multiloop.
    fn multi_unpaired_log(&self, u: usize) -> i32;

    /// Initiation of an intermolecular interaction.
    fn duplex_init(&self) -> i32;

    /// A quadruplex with runs of length `run` and `linker_total` linker bases.
    fn gquad(&self, run: usize, linker_total: usize) -> i32;

    /// Penalty of a quadruplex as a multiloop branch.
    fn gquad_multi_stem(&self) -> i32;

    /// An interior loop closed by a base pair with a quadruplex inside.
    fn gquad_interior(&self, closing: PairTypeRNA, u1: usize, u2: usize, m5: Base, m3: Base) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use Base::*;

    /// Everything costs one unit per loop.
    struct MockEnergyModel;

    impl EnergyModel for MockEnergyModel {
        fn can_pair(&self, b1: Base, b2: Base) -> bool {
            matches!((b1, b2), (A, U) | (U, A) | (C, G) | (G, C))
        }
        fn min_hairpin_size(&self) -> usize { 3 }
        fn max_loop_size(&self) -> usize { 30 }
        fn hairpin(&self, _: usize, _: PairTypeRNA, _: Base, _: Base) -> i32 { 1 }
        fn interior(&self, _: usize, _: usize, _: PairTypeRNA, _: PairTypeRNA,
            _: (Base, Base), _: (Base, Base)) -> i32 { 1 }
        fn exterior_stem(&self, _: PairTypeRNA, _: Option<Base>, _: Option<Base>) -> i32 { 1 }
        fn multi_stem(&self, _: PairTypeRNA, _: Option<Base>, _: Option<Base>) -> i32 { 1 }
        fn multi_closing(&self) -> i32 { 1 }
        fn multi_base(&self) -> i32 { 0 }
        fn multi_unpaired_log(&self, _: usize) -> i32 { 0 }
        fn duplex_init(&self) -> i32 { 1 }
        fn gquad(&self, _: usize, _: usize) -> i32 { 1 }
        fn gquad_multi_stem(&self) -> i32 { 1 }
        fn gquad_interior(&self, _: PairTypeRNA, _: usize, _: usize, _: Base, _: Base) -> i32 { 1 }
    }

    fn hairpin_stack<M: EnergyModel>(model: &M) -> i32 {
        model.exterior_stem(PairTypeRNA::GC, None, None)
            + model.interior(0, 0, PairTypeRNA::GC, PairTypeRNA::GC, (G, C), (G, C))
            + model.hairpin(4, PairTypeRNA::GC, A, A)
    }

    #[test]
    fn test_can_pair() {
        let model = MockEnergyModel;
        assert!(model.can_pair(A, U));
        assert!(model.can_pair(C, G));
        assert!(!model.can_pair(A, G));
        assert!(!model.can_pair(C, C));
    }

    #[test]
    fn test_generic_usage() {
        assert_eq!(hairpin_stack(&MockEnergyModel), 3);
    }
}
