//! Exhaustive enumeration for cross-checking the branch and bound on short
//! sequences.

use ff_energy::EnergyModel;
use ff_structure::{DotBracket, DotBracketVec, Quadruplex};

use crate::FoldCompound;
use crate::eval_structure;

/// Every structure the model admits with energy at most `threshold`.
pub(crate) fn enumerate<M: EnergyModel>(fc: &FoldCompound<M>, threshold: i32) -> Vec<(String, i32)> {
    let mut structures = Vec::new();
    let mut marks = DotBracketVec::unpaired(fc.len());
    extend(fc, &mut marks, &[(1, fc.len())], &mut structures);

    structures.into_iter()
        .filter_map(|db| match eval_structure(fc, &db) {
            Ok(e) if e <= threshold => Some((db.to_string(), e)),
            _ => None,
        })
        .collect()
}

fn extend<M: EnergyModel>(
    fc: &FoldCompound<M>,
    marks: &mut DotBracketVec,
    pending: &[(usize, usize)],
    out: &mut Vec<DotBracketVec>,
) {
    let Some((&(i, j), rest)) = pending.split_last() else {
        out.push(marks.clone());
        return;
    };
    if j < i {
        extend(fc, marks, rest, out);
        return;
    }

    let mut next = rest.to_vec();
    next.push((i + 1, j));
    extend(fc, marks, &next, out);

    for l in i + 1..=j {
        if !fc.pair_allowed(i, l) {
            continue;
        }
        marks[i - 1] = DotBracket::Open;
        marks[l - 1] = DotBracket::Close;
        let mut next = rest.to_vec();
        next.push((l + 1, j));
        next.push((i + 1, l - 1));
        extend(fc, marks, &next, out);
        marks[i - 1] = DotBracket::Unpaired;
        marks[l - 1] = DotBracket::Unpaired;
    }

    if fc.details().gquad {
        let mut quads: Vec<Quadruplex> = Vec::new();
        for e in i + 10..=j {
            fc.for_each_gquad(i, e, |q| quads.push(q));
        }
        for q in quads {
            for p in q.positions() {
                marks[p - 1] = DotBracket::Quad;
            }
            let mut next = rest.to_vec();
            next.push((q.end() + 1, j));
            extend(fc, marks, &next, out);
            for p in q.positions() {
                marks[p - 1] = DotBracket::Unpaired;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_energy::ViennaRNA;
    use crate::ModelDetails;

    #[test]
    fn test_brute_force_counts_open_chain() {
        let fc = FoldCompound::new("AAAAAAA", ViennaRNA::default(), ModelDetails::default()).unwrap();
        let all = enumerate(&fc, 10_000);
        assert_eq!(all, vec![(".......".to_string(), 0)]);
    }

    #[test]
    fn test_brute_force_finds_hairpin() {
        let fc = FoldCompound::new("GGGGAAAACCCC", ViennaRNA::default(), ModelDetails::default()).unwrap();
        let all = enumerate(&fc, -510);
        assert_eq!(all, vec![("((((....))))".to_string(), -510)]);
    }
}
