use serde::{Serialize, Deserialize};

/// Switches of the folding model that are independent of the energy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDetails {
    /// 0: no dangles, 2: both neighbors of every stem dangle, 1: every
    /// unpaired base dangles on at most one stem, the cheaper one.
    pub dangles: u8,
    /// No isolated base pairs.
    pub no_lp: bool,
    /// No GU/UG pairs at all.
    pub no_gu: bool,
    /// GU/UG pairs may not close loops other than stacks.
    pub no_gu_closure: bool,
    pub circular: bool,
    pub gquad: bool,
    /// Maximal number of unpaired bases in an interior loop.
    pub max_loop: usize,
    /// Report multiloop energies with a logarithmic unpaired penalty.
    pub log_ml: bool,
    /// Re-evaluate every finished structure and count disagreements.
    pub check_energy: bool,
}

impl Default for ModelDetails {
    fn default() -> Self {
        ModelDetails {
            dangles: 2,
            no_lp: false,
            no_gu: false,
            no_gu_closure: false,
            circular: false,
            gquad: false,
            max_loop: 30,
            log_ml: false,
            check_energy: false,
        }
    }
}

impl ModelDetails {
    /// Dangles in the recursions. With dangles=1 they run on the
    /// dangles=2 energies.
    #[inline]
    pub fn with_dangles(&self) -> bool {
        self.dangles != 0
    }

    /// Reported energies come from evaluation rather than from the recursions.
    #[inline]
    pub fn reevaluate(&self) -> bool {
        self.log_ml || self.dangles == 1
    }
}
