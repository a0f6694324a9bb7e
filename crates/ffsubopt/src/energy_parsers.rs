use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use log::debug;

use ff_energy::ViennaRNA;
use ff_subopt::ModelDetails;

/// Free energy model and folding switches.
#[derive(Debug, Args)]
pub struct EnergyModelArguments {
    /// Parameter file in JSON format (defaults to the built-in Turner 2004 set)
    #[arg(short = 'p', long, value_name = "FILE")]
    pub model_parameters: Option<PathBuf>,

    /// Dangling end treatment: 0 (none), 1 (each unpaired base on one stem)
    /// or 2 (both sides of every stem)
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub dangles: u8,

    /// Forbid lonely base pairs
    #[arg(long = "noLP")]
    pub no_lp: bool,

    /// Forbid GU pairs
    #[arg(long = "noGU")]
    pub no_gu: bool,

    /// Forbid GU pairs at the end of helices
    #[arg(long = "noClosingGU")]
    pub no_closing_gu: bool,

    /// Assume a circular sequence
    #[arg(short, long)]
    pub circ: bool,

    /// Allow G-quadruplexes
    #[arg(short, long)]
    pub gquad: bool,

    /// Maximal size of interior loops
    #[arg(long, default_value_t = 30)]
    pub max_loop: usize,

    /// Report multiloop energies with a logarithmic unpaired penalty
    #[arg(long = "logML")]
    pub log_ml: bool,

    /// Re-evaluate every structure and warn about disagreements
    #[arg(long)]
    pub check_energy: bool,
}

impl EnergyModelArguments {
    pub fn build_model(&self) -> Result<ViennaRNA> {
        debug!("Using parameter file: {:?}", self.model_parameters);
        match &self.model_parameters {
            Some(path) => ViennaRNA::from_parameter_file(path)
                .with_context(|| format!("Failed to load parameter file {}", path.display())),
            None => Ok(ViennaRNA::default()),
        }
    }

    pub fn model_details(&self) -> ModelDetails {
        ModelDetails {
            dangles: self.dangles,
            no_lp: self.no_lp,
            no_gu: self.no_gu,
            no_gu_closure: self.no_closing_gu,
            circular: self.circ,
            gquad: self.gquad,
            max_loop: self.max_loop,
            log_ml: self.log_ml,
            check_energy: self.check_energy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        energy: EnergyModelArguments,
    }

    #[test]
    fn test_flags_to_model_details() {
        let cli = TestCli::parse_from(["test", "--noLP", "-d", "0", "--circ", "--logML"]);
        let md = cli.energy.model_details();
        assert!(md.no_lp && md.circular && md.log_ml);
        assert_eq!(md.dangles, 0);
        assert!(!md.gquad);
        assert_eq!(md.max_loop, 30);
        let cli = TestCli::parse_from(["test", "-d", "1"]);
        assert_eq!(cli.energy.model_details().dangles, 1);
        assert!(TestCli::try_parse_from(["test", "-d", "3"]).is_err());
    }

    #[test]
    fn test_default_model() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(cli.energy.model_details(), ModelDetails::default());
        assert!(cli.energy.build_model().is_ok());
    }
}
