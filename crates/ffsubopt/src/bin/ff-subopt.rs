use std::io::Write;
use log::info;
use colored::*;
use env_logger::Builder;
use clap::Args;
use clap::Parser;
use clap::ArgAction;
use anyhow::{anyhow, Result};

use ff_structure::DotBracketVec;
use ff_subopt::DpTables;
use ff_subopt::FoldCompound;
use ff_subopt::Solution;
use ff_subopt::SuboptOptions;
use ff_subopt::SuboptResult;
use ff_subopt::MAXDOS;
use ff_subopt::subopt;
use ff_subopt::reference_energy;

use ffsubopt::input_parsers::ruler;
use ffsubopt::input_parsers::read_subopt_input;
use ffsubopt::energy_parsers::EnergyModelArguments;

#[derive(Debug, Args)]
pub struct SuboptInputArgs {
    /// Input file (FASTA-like), or "-" for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: String,

    /// Energy range above the MFE in kcal/mol
    #[arg(short = 'e', long, default_value_t = 1.0)]
    pub delta: f64,

    /// Sort the output by energy
    #[arg(short, long)]
    pub sorted: bool,

    /// Only print structures up to this many kcal/mol above the MFE
    #[arg(long, value_name = "KCAL")]
    pub print_cutoff: Option<f64>,

    /// Read a constraint line after the sequence
    #[arg(short = 'C', long)]
    pub constraint: bool,

    /// Print the density of states
    #[arg(long)]
    pub dos: bool,

    /// Print the result as a single JSON document
    #[arg(long)]
    pub json: bool,

    /// Verbosity (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Parser)]
#[command(name = "ff-subopt")]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub subopt: SuboptInputArgs,

    #[command(flatten, next_help_heading = "Energy model parameters")]
    pub energy: EnergyModelArguments,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            // no prefix, just the message
            writeln!(buf, "{}", record.args())
        })
        .init();
}

/// The structure with '&' at the strand break.
fn with_break(structure: &str, cut: Option<usize>) -> String {
    match DotBracketVec::try_from(structure) {
        Ok(db) => db.to_string_with_break(cut.map(|cp| cp - 1)),
        Err(_) => structure.to_string(),
    }
}

fn print_solution(s: &Solution, cut: Option<usize>) {
    println!("{} {}", with_break(&s.structure, cut), format!("{:6.2}", s.energy).green());
}

fn print_dos(result: &SuboptResult) {
    println!("# Energy  Count");
    for (k, &count) in result.density_of_states.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let label = if k == MAXDOS { ">".to_string() } else { String::new() };
        println!("{}{:6.2} {:>7}", label, result.mfe + k as f64 / 10., count);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.subopt.verbose);

    let model = cli.energy.build_model()?;
    let md = cli.energy.model_details();

    let record = read_subopt_input(&cli.subopt.input)?;
    let mut fc = FoldCompound::new(&record.sequence, model, md)?;
    if cli.subopt.constraint {
        let constraint = record.constraint
            .ok_or_else(|| anyhow!("--constraint given, but the input has no constraint line"))?;
        fc = fc.with_constraint(&constraint)?;
    }

    let delta = (cli.subopt.delta * 100.).round() as i32;
    let opts = SuboptOptions {
        sorted: cli.subopt.sorted,
        print_energy: cli.subopt.print_cutoff.unwrap_or(SuboptOptions::default().print_energy),
        keep_solutions: cli.subopt.json,
        cancel: None,
    };

    let dp = DpTables::fill(&fc);
    let cut = fc.cut();
    let sequence = fc.sequence_string();

    if !cli.subopt.json {
        if let Some(h) = &record.header {
            println!("{}", h.yellow())
        }
        let min_en = reference_energy(&fc, &dp)?;
        println!("{} {:>6} {:>6}", sequence, (min_en * 100.).round() as i32, delta);
        info!("{}", ruler(fc.len() - 1).magenta());
    }

    let result = subopt(&fc, &dp, delta, &opts, |s| {
        if !cli.subopt.json {
            print_solution(s, cut);
        }
    })?;

    if cli.subopt.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    info!("{}", ruler(fc.len() - 1).magenta());
    if cli.subopt.dos {
        print_dos(&result);
    }
    Ok(())
}
