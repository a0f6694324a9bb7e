use std::path::Path;
use log::info;

use crate::Base;
use crate::PairTypeRNA;
use crate::EnergyModel;
use crate::ParameterSet;
use crate::ParameterError;
use crate::{INF, MAXLOOP};

/// A ViennaRNA-style nearest neighbor model.
///
/// Dangles are decided by the caller: a `None` neighbor contributes nothing,
/// so dangles=0 folding simply never passes neighbors.
#[derive(Debug, Clone)]
pub struct ViennaRNA {
    min_hp_size: usize,
    max_loop: usize,
    params: ParameterSet,
}

impl Default for ViennaRNA {
    fn default() -> Self {
        ViennaRNA::from_parameters(ParameterSet::default())
    }
}

impl ViennaRNA {
    pub fn from_parameters(params: ParameterSet) -> Self {
        ViennaRNA {
            min_hp_size: 3,
            max_loop: MAXLOOP,
            params,
        }
    }

    pub fn from_parameter_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        info!("Loading energy parameters from {}", path.as_ref().display());
        Ok(ViennaRNA::from_parameters(ParameterSet::from_json_file(path)?))
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn tabulated(&self, table: &[i32], size: usize) -> i32 {
        if size <= MAXLOOP {
            table[size]
        } else {
            let scale = size as f64 / MAXLOOP as f64;
            table[MAXLOOP] + (self.params.lxc * scale.ln()) as i32
        }
    }

    fn terminal(&self, pair: PairTypeRNA) -> i32 {
        if pair.is_ru() { self.params.terminal_au } else { 0 }
    }

    fn stem(&self, pair: PairTypeRNA, d5: Option<Base>, d3: Option<Base>) -> i32 {
        let p = pair as usize;
        self.terminal(pair)
            + d5.map_or(0, |b| self.params.dangle5[p][b as usize])
            + d3.map_or(0, |b| self.params.dangle3[p][b as usize])
    }
}

impl EnergyModel for ViennaRNA {
    fn can_pair(&self, b1: Base, b2: Base) -> bool {
        PairTypeRNA::from((b1, b2)).can_pair()
    }

    fn min_hairpin_size(&self) -> usize {
        self.min_hp_size
    }

    fn max_loop_size(&self) -> usize {
        self.max_loop
    }

    fn hairpin(&self, size: usize, closing: PairTypeRNA, m5: Base, m3: Base) -> i32 {
        if size < self.min_hp_size {
            return INF;
        }
        let en = self.tabulated(&self.params.hairpin, size);
        if size == 3 {
            en + self.terminal(closing)
        } else {
            en + self.params.mismatch_hairpin[closing as usize][m5 as usize][m3 as usize]
        }
    }

    fn interior(&self,
        u1: usize,
        u2: usize,
        outer: PairTypeRNA,
        inner: PairTypeRNA,
        outer_mm: (Base, Base),
        inner_mm: (Base, Base),
    ) -> i32 {
        let (ns, nl) = (u1.min(u2), u1.max(u2));
        let (o, i) = (outer as usize, inner as usize);

        if nl == 0 {
            return self.params.stack[o][i];
        }

        if ns == 0 {
            let en = self.tabulated(&self.params.bulge, nl);
            return if nl == 1 {
                en + self.params.stack[o][i]
            } else {
                en + self.terminal(outer) + self.terminal(inner)
            };
        }

        let ninio = (self.params.ninio * (nl - ns) as i32).min(self.params.max_ninio);
        let en = self.tabulated(&self.params.interior, u1 + u2) + ninio;
        let mismatch = if ns == 1 {
            &self.params.mismatch_interior_1n
        } else {
            &self.params.mismatch_interior
        };
        en + mismatch[o][outer_mm.0 as usize][outer_mm.1 as usize]
           + mismatch[i][inner_mm.0 as usize][inner_mm.1 as usize]
    }

    fn exterior_stem(&self, pair: PairTypeRNA, d5: Option<Base>, d3: Option<Base>) -> i32 {
        self.stem(pair, d5, d3)
    }

    fn multi_stem(&self, pair: PairTypeRNA, d5: Option<Base>, d3: Option<Base>) -> i32 {
        self.stem(pair, d5, d3) + self.params.ml_intern
    }

    fn multi_closing(&self) -> i32 {
        self.params.ml_closing
    }

    fn multi_base(&self) -> i32 {
        self.params.ml_base
    }

    fn multi_unpaired_log(&self, u: usize) -> i32 {
        if u > 6 {
            6 * self.params.ml_base + (self.params.lxc * (u as f64 / 6.0).ln()) as i32
        } else {
            u as i32 * self.params.ml_base
        }
    }

    fn duplex_init(&self) -> i32 {
        self.params.duplex_init
    }

    fn gquad(&self, run: usize, linker_total: usize) -> i32 {
        debug_assert!(run >= 2 && linker_total >= 3);
        self.params.gquad_alpha * (run as i32 - 1)
            + (self.params.gquad_beta as f64 * ((linker_total - 2) as f64).ln()) as i32
    }

    fn gquad_multi_stem(&self) -> i32 {
        self.params.ml_intern
    }

    fn gquad_interior(&self, closing: PairTypeRNA, u1: usize, u2: usize, m5: Base, m3: Base) -> i32 {
        self.tabulated(&self.params.interior, u1 + u2)
            + self.params.mismatch_interior[closing as usize][m5 as usize][m3 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Base::*;
    use PairTypeRNA::*;

    #[test]
    fn test_vrna_hairpin_evaluation() {
        let model = ViennaRNA::default();
        // Triloops only get the terminal penalty.
        assert_eq!(model.hairpin(3, GC, A, A), 540);
        assert_eq!(model.hairpin(3, AU, A, A), 590);
        // Larger loops get the first mismatch.
        assert_eq!(model.hairpin(4, GC, A, A), 560 - 80);
        assert_eq!(model.hairpin(4, CG, G, A), 560 - 130);
        assert_eq!(model.hairpin(2, GC, A, A), INF);
        // Extrapolation beyond the table.
        let big = model.hairpin(60, GC, A, A);
        assert_eq!(big, 769 + (107.856 * 2f64.ln()) as i32 - 80);
    }

    #[test]
    fn test_vrna_stacking_and_bulges() {
        let model = ViennaRNA::default();
        // 5'-GC-3' / 3'-CG-5': (i,j) = G-C, (p,q) = C-G -> reversed G-C
        assert_eq!(model.interior(0, 0, GC, GC, (C, G), (C, G)), -340);
        // Bulge of size one stacks.
        assert_eq!(model.interior(1, 0, CG, GC, (A, G), (C, A)), 380 - 330);
        // Larger bulges get terminal penalties.
        assert_eq!(model.interior(0, 3, AU, CG, (A, A), (A, A)), 320 + 50);
    }

    #[test]
    fn test_vrna_interior_loops() {
        let model = ViennaRNA::default();
        // 2x2 with a GA mismatch on the outer pair.
        assert_eq!(model.interior(2, 2, CG, CG, (G, A), (A, A)), 110 - 100);
        // 1x3 uses the terminal-only mismatch and ninio.
        assert_eq!(model.interior(1, 3, AU, CG, (G, A), (A, A)), 110 + 120 + 70);
        // Ninio is capped.
        assert_eq!(model.interior(2, 20, CG, CG, (A, A), (A, A)), 340 + 300);
    }

    #[test]
    fn test_vrna_stems() {
        let model = ViennaRNA::default();
        assert_eq!(model.exterior_stem(CG, None, None), 0);
        assert_eq!(model.exterior_stem(AU, None, None), 50);
        assert_eq!(model.exterior_stem(CG, Some(A), Some(G)), -50 - 130);
        assert_eq!(model.multi_stem(UA, Some(C), None), 50 - 10 - 90);
    }

    #[test]
    fn test_vrna_multiloop_log() {
        let model = ViennaRNA::default();
        assert_eq!(model.multi_unpaired_log(4), 0);
        assert_eq!(model.multi_unpaired_log(12), (107.856 * 2f64.ln()) as i32);
    }

    #[test]
    fn test_vrna_gquad() {
        let model = ViennaRNA::default();
        assert_eq!(model.gquad(2, 3), -1800);
        assert_eq!(model.gquad(3, 6), -3600 + (1200.0 * 4f64.ln()) as i32);
        assert_eq!(model.gquad_multi_stem(), -90);
        assert_eq!(model.gquad_interior(AU, 1, 2, A, A), 100 + 70);
    }
}
