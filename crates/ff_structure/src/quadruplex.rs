
/// A G-quadruplex: four runs of `run` stacked G's connected by three linkers.
/// Positions use whatever index base the caller uses for `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quadruplex {
    pub start: usize,
    pub run: usize,
    pub linkers: [usize; 3],
}

impl Quadruplex {
    pub fn new(start: usize, run: usize, linkers: [usize; 3]) -> Self {
        Self { start, run, linkers }
    }

    /// Total number of linker nucleotides.
    pub fn linker_total(&self) -> usize {
        self.linkers.iter().sum()
    }

    pub fn span(&self) -> usize {
        4 * self.run + self.linker_total()
    }

    /// Last position covered by the quadruplex (inclusive).
    pub fn end(&self) -> usize {
        self.start + self.span() - 1
    }

    /// Start positions of the four G runs.
    pub fn run_starts(&self) -> [usize; 4] {
        let mut starts = [self.start; 4];
        for k in 1..4 {
            starts[k] = starts[k - 1] + self.run + self.linkers[k - 1];
        }
        starts
    }

    /// All positions that are part of a G run.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        let run = self.run;
        self.run_starts().into_iter().flat_map(move |s| s..s + run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadruplex_geometry() {
        let q = Quadruplex::new(1, 2, [1, 3, 2]);
        assert_eq!(q.linker_total(), 6);
        assert_eq!(q.span(), 14);
        assert_eq!(q.end(), 14);
        assert_eq!(q.run_starts(), [1, 4, 9, 13]);
        assert_eq!(q.positions().collect::<Vec<_>>(), vec![1, 2, 4, 5, 9, 10, 13, 14]);
    }
}
