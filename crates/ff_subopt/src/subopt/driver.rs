use std::sync::atomic::{AtomicBool, Ordering};
use log::{debug, trace, warn};
use colored::*;

use ff_energy::EnergyModel;
use ff_energy::INF;
use ff_structure::{DotBracket, Quadruplex};

use crate::DpTables;
use crate::FoldCompound;
use crate::SuboptError;
use super::{Context, Interval, State, StatePool, SuboptStats};

/// The search context: read-only problem data plus the worklist.
pub(crate) struct Search<'a, M: EnergyModel> {
    pub(crate) fc: &'a FoldCompound<M>,
    pub(crate) dp: &'a DpTables,
    pub(crate) threshold: i32,
    stack: Vec<State>,
    pool: StatePool,
    stats: SuboptStats,
}

impl<'a, M: EnergyModel> Search<'a, M> {
    pub fn new(fc: &'a FoldCompound<M>, dp: &'a DpTables, threshold: i32) -> Self {
        Search {
            fc,
            dp,
            threshold,
            stack: Vec::new(),
            pool: StatePool::default(),
            stats: SuboptStats::default(),
        }
    }

    pub fn into_stats(self) -> SuboptStats {
        self.stats
    }

    /// Table value of an open interval.
    #[inline]
    pub(crate) fn bound(&self, iv: &Interval) -> i32 {
        let dp = self.dp;
        match iv.ctx {
            Context::Exterior => match dp.circular() {
                Some(circ) => circ.mfe(),
                None => dp.f5[iv.j],
            },
            Context::Multi => dp.fml[[iv.i, iv.j]],
            Context::Stem => dp.fm1[[iv.i, iv.j]],
            Context::Pair { stacked: true } => dp.cc[[iv.i, iv.j]],
            Context::Pair { stacked: false } => dp.c[[iv.i, iv.j]],
            Context::Quadruplex => dp.ggg[[iv.i, iv.j]],
            Context::CutLeft => dp.fc_left[iv.i],
            Context::CutRight => dp.fc_right[iv.j],
        }
    }

    /// Energy of the decided loops plus the bounds of all open intervals.
    pub(crate) fn lower_bound(&self, state: &State) -> i32 {
        state.intervals.iter().fold(state.energy, |acc, iv| acc + self.bound(iv))
    }

    /// Pushes a child of `parent` that adds `energy` and opens `intervals`
    /// (empty ones are dropped), if it can still finish within the threshold.
    /// `base` is the lower bound of `parent` without the interval under
    /// decomposition. Returns the number of pushed states.
    pub(crate) fn branch(&mut self,
        parent: &State,
        base: i32,
        energy: i32,
        intervals: &[Interval],
    ) -> usize {
        if energy >= INF {
            return 0;
        }
        let mut bound = base + energy;
        for iv in intervals.iter().filter(|iv| !iv.is_empty()) {
            bound += self.bound(iv);
        }
        if bound > self.threshold {
            return 0;
        }

        let mut child = self.pool.fork(parent);
        child.energy += energy;
        for iv in intervals.iter().filter(|iv| !iv.is_empty()) {
            if let Context::Pair { .. } = iv.ctx {
                child.mark(iv.i, DotBracket::Open);
                child.mark(iv.j, DotBracket::Close);
            }
            child.intervals.push(*iv);
        }
        self.stack.push(child);
        1
    }

    /// Pushes a child of `parent` with the quadruplex `q` placed.
    pub(crate) fn branch_quad(&mut self, parent: &State, base: i32, energy: i32, q: &Quadruplex) -> usize {
        if energy >= INF || base + energy > self.threshold {
            return 0;
        }
        let mut child = self.pool.fork(parent);
        child.energy += energy;
        for pos in q.positions() {
            child.mark(pos, DotBracket::Quad);
        }
        self.stack.push(child);
        1
    }

    fn dead_end(&mut self, state: State, iv: Interval) {
        match iv.ctx {
            Context::Pair { .. } | Context::Quadruplex => {
                warn!("{} no decomposition of {:?} [{}, {}] within the threshold: {}",
                    "WARNING:".red(), iv.ctx, iv.i, iv.j, state.marks);
                self.stats.inconsistencies += 1;
                self.pool.release(state);
            }
            _ if self.lower_bound(&state) > self.threshold => {
                debug!("Dropping {} after {:?} [{}, {}]", state.marks, iv.ctx, iv.i, iv.j);
                self.pool.release(state);
            }
            _ => {
                debug!("Interval {:?} [{}, {}] left undecomposed: {}", iv.ctx, iv.i, iv.j, state.marks);
                self.stack.push(state);
            }
        }
    }

    /// Runs the search to completion. `finished` sees every complete state.
    pub fn run<F>(&mut self, cancel: Option<&AtomicBool>, mut finished: F) -> Result<(), SuboptError>
    where
        F: FnMut(&State),
    {
        let n = self.fc.len();
        let root = self.pool.root(n, Interval::new(1, n, Context::Exterior));
        if self.lower_bound(&root) > self.threshold {
            return Ok(());
        }
        self.stack.push(root);

        while let Some(mut state) = self.stack.pop() {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                self.stack.clear();
                return Err(SuboptError::Cancelled);
            }
            self.stats.popped += 1;

            let Some(iv) = state.intervals.pop() else {
                self.stats.finalized += 1;
                trace!("{} {:>6.2}", state.marks, state.energy as f64 / 100.);
                finished(&state);
                self.pool.release(state);
                continue;
            };

            let base = self.lower_bound(&state);
            if self.scan_interval(&state, iv, base) > 0 {
                self.pool.release(state);
            } else {
                self.dead_end(state, iv);
            }
            self.stats.max_depth = self.stats.max_depth.max(self.stack.len());
        }
        Ok(())
    }
}
