use log::warn;
use colored::*;

use ff_energy::EnergyModel;
use ff_energy::INF;

use super::{Context, Interval, Search, State};

impl<M: EnergyModel> Search<'_, M> {
    /// Pushes all loops that the formed pair (i,j) can close.
    pub(crate) fn repeat(&mut self, state: &State, i: usize, j: usize, stacked: bool, base: i32) -> usize {
        let fc = self.fc;
        if !fc.pair_allowed(i, j) {
            warn!("{} pair ({}, {}) cannot form", "WARNING:".red(), i, j);
            return 0;
        }
        let bp = fc.sc_pair(i, j);

        if fc.details().no_lp && !stacked {
            // A lonely pair must be followed by a stack.
            if !fc.pair_allowed(i + 1, j - 1) {
                return 0;
            }
            let e = bp + fc.e_interior(i, j, i + 1, j - 1);
            return self.branch(state, base, e, &[Interval::pair(i + 1, j - 1, true)]);
        }

        let mut count = self.branch(state, base, bp + fc.e_hairpin(i, j), &[]);

        let max_loop = fc.max_loop();
        for p in i + 1..j.min(i + max_loop + 2) {
            let u1 = p - i - 1;
            for q in (p + 1..j).rev() {
                if u1 + (j - q - 1) > max_loop {
                    break;
                }
                if !fc.pair_allowed(p, q) {
                    continue;
                }
                let stack = p == i + 1 && q == j - 1;
                let e = bp + fc.e_interior(i, j, p, q);
                count += self.branch(state, base, e, &[Interval::pair(p, q, stack)]);
            }
        }

        let closing = fc.e_ml_closing(i, j);
        if closing < INF {
            for k in i + 1..j - 1 {
                count += self.branch(state, base, bp + closing, &[
                    Interval::new(i + 1, k, Context::Multi),
                    Interval::new(k + 1, j - 1, Context::Stem),
                ]);
            }
        }

        if let Some(cp) = fc.cut().filter(|_| !fc.same_strand(i, j)) {
            count += self.branch(state, base, bp + fc.e_cut_loop(i, j), &[
                Interval::new(i + 1, cp - 1, Context::CutLeft),
                Interval::new(cp, j - 1, Context::CutRight),
            ]);
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
                    if self.dp.ggg[[p, q]] < INF {
                        let e = bp + fc.e_gquad_interior(i, j, p, q);
                        count += self.branch(state, base, e,
                            &[Interval::new(p, q, Context::Quadruplex)]);
                    }
                }
            }
        }
        count
    }

    /// Pushes every quadruplex geometry on exactly [i, j] that fits.
    pub(crate) fn repeat_gquad(&mut self, state: &State, i: usize, j: usize, base: i32) -> usize {
        let fc = self.fc;
        let budget = self.threshold - base;
        let mut count = 0;
        fc.for_each_gquad(i, j, |q| {
            let e = fc.e_gquad(&q);
            if e <= budget {
                count += self.branch_quad(state, base, e, &q);
            }
        });
        count
    }
}
