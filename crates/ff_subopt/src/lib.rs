//! Suboptimal secondary structures of nucleic acids.
//!
//! The usual entry point:
//!
//! ```no_run
//! use ff_energy::ViennaRNA;
//! use ff_subopt::{FoldCompound, ModelDetails, SuboptOptions, subopt_sorted};
//!
//! let fc = FoldCompound::new("GGGGAAAACCCC", ViennaRNA::default(), ModelDetails::default()).unwrap();
//! let result = subopt_sorted(&fc, 100, &SuboptOptions::default()).unwrap();
//! for s in &result.solutions {
//!     println!("{} {:6.2}", s.structure, s.energy);
//! }
//! ```

/// Errors of folding, evaluation and enumeration.
mod error;

/// Model switches independent of the energy parameters.
mod model_details;

/// Hard and soft constraints.
mod constraints;

/// The folding problem: sequence, model and constraints.
mod fold_compound;

/// Loop energies shared by all recursions.
mod loop_energies;

/// The MFE tables.
mod mfe;

/// Energy evaluation of given structures.
mod eval;

/// Stack-based enumeration of suboptimal structures.
mod subopt;

#[cfg(test)]
mod brute_force;

pub use error::*;
pub use model_details::*;
pub use constraints::*;
pub use fold_compound::*;
pub use mfe::*;
pub use eval::*;
pub use subopt::*;
