//! # ffsubopt
//!
//! Command-line front end for suboptimal folding.
//!
//! This crate re-exports the library crates it is built on.

pub mod input_parsers;
pub mod energy_parsers;

pub mod structure {
    pub use ::ff_structure::*;
}

pub mod energy {
    pub use ::ff_energy::*;
}

pub mod subopt {
    pub use ::ff_subopt::*;
}
