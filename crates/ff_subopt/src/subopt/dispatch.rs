//! Decomposition of the open intervals that are not base pairs.
//!
//! Each scan enumerates exactly the alternatives its table was minimized
//! over in `mfe.rs`, so the bound of the interval is always reached by at
//! least one child.

use ff_energy::EnergyModel;
use ff_energy::INF;

use super::{Context, Interval, Search, State};

impl<M: EnergyModel> Search<'_, M> {
    /// Pushes all children of `state` that decompose `iv`.
    pub(crate) fn scan_interval(&mut self, state: &State, iv: Interval, base: i32) -> usize {
        match iv.ctx {
            Context::Exterior if self.dp.circular().is_some() => self.scan_circular(state, base),
            Context::Exterior => self.scan_exterior(state, iv.j, base),
            Context::Multi => self.scan_multi(state, iv.i, iv.j, base),
            Context::Stem => self.scan_stem(state, iv.i, iv.j, base),
            Context::Pair { stacked } => self.repeat(state, iv.i, iv.j, stacked, base),
            Context::Quadruplex => self.repeat_gquad(state, iv.i, iv.j, base),
            Context::CutLeft => self.scan_cut_left(state, iv.i, iv.j + 1, base),
            Context::CutRight => self.scan_cut_right(state, iv.i, iv.j, base),
        }
    }

    fn scan_exterior(&mut self, state: &State, j: usize, base: i32) -> usize {
        let fc = self.fc;
        if j < fc.model().min_hairpin_size() + 2 && fc.same_strand(1, j) {
            // Too short for any branch.
            return self.branch(state, base, fc.exterior_unpaired(1, j), &[]);
        }

        let mut count = self.branch(state, base, fc.exterior_unpaired(j, j),
            &[Interval::new(1, j - 1, Context::Exterior)]);

        for k in 1..j {
            let rest = Interval::new(1, k - 1, Context::Exterior);
            if self.dp.c[[k, j]] < INF {
                let e = fc.e_ext_stem(k, j) + fc.e_duplex(k, j);
                count += self.branch(state, base, e, &[rest, Interval::pair(k, j, false)]);
            }
            if self.dp.ggg[[k, j]] < INF {
                count += self.branch(state, base, 0, &[rest, Interval::new(k, j, Context::Quadruplex)]);
            }
        }
        count
    }

    /// The exterior loop of a circular sequence: open chain, hairpin,
    /// interior loop or multiloop across the origin.
    fn scan_circular(&mut self, state: &State, base: i32) -> usize {
        let fc = self.fc;
        let n = fc.len();
        let max_loop = fc.max_loop();

        let mut count = self.branch(state, base, fc.exterior_unpaired(1, n), &[]);

        for k in 1..n {
            for l in k + 1..=n {
                if self.dp.c[[k, l]] < INF {
                    count += self.branch(state, base, fc.e_circ_hairpin(k, l),
                        &[Interval::pair(k, l, false)]);
                }
            }
        }

        for k in 1..=n.min(max_loop + 1) {
            for l in k + 1..=n {
                if self.dp.cc[[k, l]] >= INF {
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
                        let stack = u1 + u2 == 0;
                        let e = fc.e_circ_interior(k, l, p, q);
                        count += self.branch(state, base, e,
                            &[Interval::pair(k, l, stack), Interval::pair(p, q, stack)]);
                    }
                }
            }
        }

        let closing = fc.model().multi_closing();
        for k in 1..n {
            if self.dp.fml[[1, k]] >= INF {
                continue;
            }
            for u in k + 1..n {
                count += self.branch(state, base, closing, &[
                    Interval::new(1, k, Context::Multi),
                    Interval::new(k + 1, u, Context::Stem),
                    Interval::new(u + 1, n, Context::Stem),
                ]);
            }
        }
        count
    }

    /// The branch [k, l] of a multiloop, as a pair or a quadruplex, next to
    /// the optional segment `rest`.
    fn ml_branches(&mut self,
        state: &State,
        base: i32,
        energy: i32,
        rest: Option<Interval>,
        k: usize,
        l: usize,
    ) -> usize {
        let fc = self.fc;
        let mut count = 0;
        if self.dp.c[[k, l]] < INF {
            let e = energy + fc.e_ml_stem(k, l);
            let pair = Interval::pair(k, l, false);
            count += match rest {
                Some(r) => self.branch(state, base, e, &[r, pair]),
                None => self.branch(state, base, e, &[pair]),
            };
        }
        if self.dp.ggg[[k, l]] < INF {
            let e = energy + fc.model().gquad_multi_stem();
            let quad = Interval::new(k, l, Context::Quadruplex);
            count += match rest {
                Some(r) => self.branch(state, base, e, &[r, quad]),
                None => self.branch(state, base, e, &[quad]),
            };
        }
        count
    }

    fn scan_multi(&mut self, state: &State, i: usize, j: usize, base: i32) -> usize {
        let fc = self.fc;
        let mut count = 0;
        if self.dp.fml[[i, j - 1]] < INF {
            count += self.branch(state, base, fc.ml_unpaired(j, j),
                &[Interval::new(i, j - 1, Context::Multi)]);
        }

        for k in i..j {
            if self.dp.fml[[i, k]] < INF {
                let rest = Interval::new(i, k, Context::Multi);
                count += self.ml_branches(state, base, 0, Some(rest), k + 1, j);
            }
        }

        for a in i..j {
            if a > i && !fc.same_strand(i, a) {
                break;
            }
            let up = fc.ml_unpaired(i, a - 1);
            if up >= INF {
                break;
            }
            count += self.ml_branches(state, base, up, None, a, j);
        }
        count
    }

    fn scan_stem(&mut self, state: &State, i: usize, j: usize, base: i32) -> usize {
        let mut count = 0;
        if self.dp.fm1[[i, j - 1]] < INF {
            count += self.branch(state, base, self.fc.ml_unpaired(j, j),
                &[Interval::new(i, j - 1, Context::Stem)]);
        }
        count + self.ml_branches(state, base, 0, None, i, j)
    }

    /// The segment [i, cp-1] left of the strand break.
    fn scan_cut_left(&mut self, state: &State, i: usize, cp: usize, base: i32) -> usize {
        let fc = self.fc;
        let mut count = self.branch(state, base, fc.exterior_unpaired(i, i),
            &[Interval::new(i + 1, cp - 1, Context::CutLeft)]);
        for l in i + 1..cp {
            if self.dp.c[[i, l]] < INF {
                count += self.branch(state, base, fc.e_ext_stem(i, l), &[
                    Interval::new(l + 1, cp - 1, Context::CutLeft),
                    Interval::pair(i, l, false),
                ]);
            }
        }
        count
    }

    /// The segment [cp, j] right of the strand break.
    fn scan_cut_right(&mut self, state: &State, cp: usize, j: usize, base: i32) -> usize {
        let fc = self.fc;
        let mut count = self.branch(state, base, fc.exterior_unpaired(j, j),
            &[Interval::new(cp, j - 1, Context::CutRight)]);
        for k in cp..j {
            if self.dp.c[[k, j]] < INF {
                count += self.branch(state, base, fc.e_ext_stem(k, j), &[
                    Interval::new(cp, k - 1, Context::CutRight),
                    Interval::pair(k, j, false),
                ]);
            }
        }
        count
    }
}
