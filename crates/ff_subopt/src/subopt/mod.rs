//! Enumeration of all structures within an energy band above the MFE.
//!
//! A depth-first branch and bound over partial structures. Every open
//! interval of a partial structure is bounded by the MFE table of its
//! context, so a partial structure is only kept while it can still be
//! completed within the threshold.

mod state;
mod driver;
mod dispatch;
mod loops;


pub(crate) use state::*;
pub(crate) use driver::Search;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use log::{info, warn};
use colored::*;
use serde::{Serialize, Deserialize};

use ff_energy::EnergyModel;
use ff_energy::INF;

use crate::DpTables;
use crate::FoldCompound;
use crate::SuboptError;
use crate::eval_structure;

/// Overflow bucket of the density of states.
pub const MAXDOS: usize = 1000;
/// Headroom below `INF` that a threshold must leave.
pub const EMAX: i32 = INF / 10;

#[derive(Debug, Clone)]
pub struct SuboptOptions {
    /// Collect all solutions and report them by increasing energy.
    pub sorted: bool,
    /// Only report solutions up to this many kcal/mol above the MFE.
    pub print_energy: f64,
    /// Keep unsorted solutions in the result, not only pass them on.
    pub keep_solutions: bool,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SuboptOptions {
    fn default() -> Self {
        SuboptOptions {
            sorted: false,
            print_energy: 9999.,
            keep_solutions: true,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub structure: String,
    /// kcal/mol
    pub energy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuboptStats {
    pub popped: usize,
    pub max_depth: usize,
    pub finalized: usize,
    /// Pair or quadruplex intervals without any admissible decomposition.
    pub inconsistencies: usize,
    pub energy_mismatches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuboptResult {
    pub sequence: String,
    /// kcal/mol
    pub mfe: f64,
    /// dcal/mol
    pub threshold: i32,
    pub solutions: Vec<Solution>,
    /// Solutions per 0.1 kcal/mol above the MFE; the last bucket collects the rest.
    pub density_of_states: Vec<usize>,
    pub stats: SuboptStats,
}

fn threshold(mfe: i32, delta: i32) -> i32 {
    let t = mfe as i64 + delta as i64;
    if t > (INF - EMAX) as i64 {
        warn!("{} energy range too large, threshold set to {}", "WARNING:".red(), INF - EMAX);
        INF - EMAX
    } else {
        t as i32
    }
}

fn kcal(e: i32) -> f64 {
    e as f64 / 100.
}

/// The reference energy (kcal/mol) of the histogram and the print cutoff:
/// the MFE, or the re-evaluated energy of the first MFE structure when
/// energies are re-evaluated.
pub fn reference_energy<M: EnergyModel>(
    fc: &FoldCompound<M>,
    dp: &DpTables,
) -> Result<f64, SuboptError> {
    let mfe = dp.mfe();
    if !fc.details().reevaluate() {
        return Ok(kcal(mfe));
    }
    let mut search = Search::new(fc, dp, mfe);
    let mut first = None;
    search.run(None, |state| {
        if first.is_none() {
            first = Some(state.marks.clone());
        }
    })?;
    match first {
        Some(marks) => Ok(kcal(eval_structure(fc, &marks)?)),
        None => Ok(kcal(mfe)),
    }
}

/// Enumerates all structures with energy at most MFE + `delta` (dcal/mol).
///
/// In unsorted mode, `on_solution` sees every solution as soon as it is
/// complete. In sorted mode, it sees them in order after the search.
pub fn subopt<M, F>(
    fc: &FoldCompound<M>,
    dp: &DpTables,
    delta: i32,
    opts: &SuboptOptions,
    mut on_solution: F,
) -> Result<SuboptResult, SuboptError>
where
    M: EnergyModel,
    F: FnMut(&Solution),
{
    let mfe = dp.mfe();
    if mfe >= INF {
        return Err(SuboptError::NoStructure);
    }
    let threshold = threshold(mfe, delta);
    let min_en = reference_energy(fc, dp)?;
    if fc.details().dangles == 1 {
        info!("Enumerating on dangles=2 energies, reporting dangles=1");
    }
    let eprint = opts.print_energy + min_en;
    let reevaluate = fc.details().reevaluate();
    let check = fc.details().check_energy && !reevaluate;
    info!("Enumerating structures up to {:.2} kcal/mol", kcal(threshold));

    let mut dos = vec![0; MAXDOS + 1];
    let mut solutions = Vec::new();
    let mut mismatches = 0;

    let mut search = Search::new(fc, dp, threshold);
    search.run(opts.cancel.as_deref(), |state| {
        let energy = if reevaluate {
            match eval_structure(fc, &state.marks) {
                Ok(e) => kcal(e),
                Err(err) => {
                    warn!("{} {} ({})", "WARNING:".red(), err, state.marks);
                    kcal(state.energy)
                }
            }
        } else {
            kcal(state.energy)
        };

        if check {
            match eval_structure(fc, &state.marks) {
                Ok(e) if e == state.energy => (),
                other => {
                    warn!("{} energy of {} is {:.2}, evaluation gives {:?}",
                        "WARNING:".red(), state.marks, kcal(state.energy), other);
                    mismatches += 1;
                }
            }
        }

        let bucket = ((energy - min_en) * 10. + 0.1) as usize;
        dos[bucket.min(MAXDOS)] += 1;

        if energy > eprint {
            return;
        }
        let solution = Solution { structure: state.marks.to_string(), energy };
        if !opts.sorted {
            on_solution(&solution);
        }
        if opts.sorted || opts.keep_solutions {
            solutions.push(solution);
        }
    })?;

    let mut stats = search.into_stats();
    stats.energy_mismatches = mismatches;
    if stats.inconsistencies > 0 {
        warn!("{} {} partial structures could not be completed", "WARNING:".red(), stats.inconsistencies);
    }

    if opts.sorted {
        solutions.sort_by(|a, b| a.energy.total_cmp(&b.energy)
            .then_with(|| a.structure.cmp(&b.structure)));
        for s in &solutions {
            on_solution(s);
        }
    }
    info!("{} structures, {} states popped, max depth {}",
        stats.finalized, stats.popped, stats.max_depth);

    Ok(SuboptResult {
        sequence: fc.sequence_string(),
        mfe: min_en,
        threshold,
        solutions,
        density_of_states: dos,
        stats,
    })
}

/// Fills the tables and returns all solutions within `delta` in sorted order.
pub fn subopt_sorted<M: EnergyModel>(
    fc: &FoldCompound<M>,
    delta: i32,
    opts: &SuboptOptions,
) -> Result<SuboptResult, SuboptError> {
    let dp = DpTables::fill(fc);
    let opts = SuboptOptions { sorted: true, ..opts.clone() };
    subopt(fc, &dp, delta, &opts, |_| ())
}
