use ff_structure::{DotBracket, DotBracketVec};

/// Which table an open interval is bounded by, and how it decomposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Context {
    /// Exterior prefix [1, j], or the whole circle when folding circular.
    Exterior,
    /// Multiloop segment with at least one branch.
    Multi,
    /// Multiloop segment with exactly one branch starting at i.
    Stem,
    /// A formed base pair (i, j). `stacked` if (i-1, j+1) is formed as well.
    Pair { stacked: bool },
    Quadruplex,
    /// Exterior segment [i, cp-1] inside a loop that contains the cut.
    CutLeft,
    /// Exterior segment [cp, j] inside a loop that contains the cut.
    CutRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Interval {
    pub i: usize,
    pub j: usize,
    pub ctx: Context,
}

impl Interval {
    pub fn new(i: usize, j: usize, ctx: Context) -> Self {
        Interval { i, j, ctx }
    }

    pub fn pair(i: usize, j: usize, stacked: bool) -> Self {
        Interval { i, j, ctx: Context::Pair { stacked } }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.j < self.i
    }
}

/// A partial structure: fixed marks, open intervals and the energy of all
/// loops that are already decided.
#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) marks: DotBracketVec,
    pub(crate) intervals: Vec<Interval>,
    pub(crate) energy: i32,
}

impl State {
    #[inline]
    pub(crate) fn mark(&mut self, pos: usize, db: DotBracket) {
        self.marks[pos - 1] = db;
    }
}

/// Recycles the buffers of finished states.
#[derive(Debug, Default)]
pub(crate) struct StatePool {
    free: Vec<State>,
}

const MAX_POOLED: usize = 4096;

impl StatePool {
    pub fn root(&mut self, n: usize, interval: Interval) -> State {
        let mut state = self.free.pop().unwrap_or_else(|| State {
            marks: DotBracketVec(Vec::with_capacity(n)),
            intervals: Vec::new(),
            energy: 0,
        });
        state.marks.0.clear();
        state.marks.0.resize(n, DotBracket::Unpaired);
        state.intervals.clear();
        state.intervals.push(interval);
        state.energy = 0;
        state
    }

    /// A copy of `parent` in a recycled buffer.
    pub fn fork(&mut self, parent: &State) -> State {
        match self.free.pop() {
            Some(mut state) => {
                state.marks.0.clear();
                state.marks.0.extend_from_slice(&parent.marks);
                state.intervals.clear();
                state.intervals.extend_from_slice(&parent.intervals);
                state.energy = parent.energy;
                state
            }
            None => parent.clone(),
        }
    }

    pub fn release(&mut self, state: State) {
        if self.free.len() < MAX_POOLED {
            self.free.push(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_forks_do_not_alias() {
        let mut pool = StatePool::default();
        let mut root = pool.root(6, Interval::new(1, 6, Context::Exterior));
        root.mark(1, DotBracket::Open);
        root.mark(6, DotBracket::Close);
        root.energy = -30;

        let mut child = pool.fork(&root);
        child.mark(2, DotBracket::Open);
        child.intervals.pop();
        assert_eq!(root.marks.to_string(), "(....)");
        assert_eq!(child.marks.to_string(), "((...)");
        assert_eq!(root.intervals.len(), 1);
        assert_eq!(child.energy, -30);

        pool.release(child);
        let again = pool.fork(&root);
        assert_eq!(again.marks, root.marks);
        assert_eq!(again.intervals, root.intervals);
    }

    #[test]
    fn test_empty_interval() {
        assert!(Interval::new(1, 0, Context::Exterior).is_empty());
        assert!(!Interval::pair(3, 8, false).is_empty());
    }
}
