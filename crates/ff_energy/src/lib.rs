/// Base, NucleotideVec, PairTypeRNA, ....
mod nucleotides;

/// The energy model trait.
mod energy_model;

/// Parameter sets and their JSON representation.
mod parameters;

/// The default nearest neighbor model.
mod viennarna;

pub use nucleotides::*;
pub use energy_model::*;
pub use parameters::*;
pub use viennarna::*;

