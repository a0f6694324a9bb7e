use std::hint::black_box;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use ff_energy::ViennaRNA;
use ff_subopt::DpTables;
use ff_subopt::FoldCompound;
use ff_subopt::ModelDetails;
use ff_subopt::SuboptOptions;
use ff_subopt::subopt;

fn random_sequence(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| ['A', 'C', 'G', 'U'][rng.random_range(0..4)]).collect()
}

pub fn mfe_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("MFE");
    let mut rng = StdRng::seed_from_u64(1);
    let seq = random_sequence(&mut rng, 100);
    let fc = FoldCompound::new(&seq, ViennaRNA::default(), ModelDetails::default()).unwrap();

    group.bench_function("Table fill (100 nt)", |b| {
        b.iter(|| black_box(DpTables::fill(&fc)));
    });
}

pub fn subopt_band(c: &mut Criterion) {
    let mut group = c.benchmark_group("Subopt");
    group.sample_size(20);
    let seq = "UCAGUCUUCGCUGCGCUGUAUCGAUUCGGUUUCAGUUUUUAUUGC";
    let opts = SuboptOptions { keep_solutions: false, ..Default::default() };

    for (name, md) in [
        ("d2", ModelDetails::default()),
        ("d0 noLP", ModelDetails { dangles: 0, no_lp: true, ..Default::default() }),
    ] {
        let fc = FoldCompound::new(seq, ViennaRNA::default(), md).unwrap();
        let dp = DpTables::fill(&fc);
        group.bench_function(format!("Enumerate 2 kcal/mol ({})", name), |b| {
            b.iter(|| {
                let mut count = 0;
                let _ = subopt(&fc, &dp, 200, &opts, |_| count += 1);
                black_box(count)
            });
        });
    }
}

criterion_group!(benches, mfe_fill, subopt_band);
criterion_main!(benches);
