use std::fmt;
use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::{BCOUNT, PCOUNT};

/// "Infinite" free energy. Sums of a few INF values must not overflow i32.
pub const INF: i32 = 10_000_000;

/// Loop tables are tabulated up to this size and extrapolated beyond.
pub const MAXLOOP: usize = 30;

#[derive(Debug)]
pub enum ParameterError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl std::error::Error for ParameterError {}

impl From<std::io::Error> for ParameterError {
    fn from(e: std::io::Error) -> Self {
        ParameterError::Io(e)
    }
}

impl From<serde_json::Error> for ParameterError {
    fn from(e: serde_json::Error) -> Self {
        ParameterError::Json(e)
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::Io(e) => write!(f, "I/O error: {}", e),
            ParameterError::Json(e) => write!(f, "Parse error: {}", e),
            ParameterError::Invalid(msg) => write!(f, "Invalid parameter set: {}", msg),
        }
    }
}

type PairTable2 = [[i32; PCOUNT]; PCOUNT];
type MismatchTable = [[[i32; BCOUNT]; BCOUNT]; PCOUNT];
type DangleTable = [[i32; BCOUNT]; PCOUNT];

/// Free energy parameters at 37 °C in dcal/mol.
///
/// Pair tables are indexed by `PairTypeRNA as usize`, base tables by
/// `Base as usize`. The built-in default is a compact rendition of the
/// Turner 2004 set (no special hairpins, no 1x1/2x1/2x2 tables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub stack: PairTable2,
    pub mismatch_hairpin: MismatchTable,
    pub mismatch_interior: MismatchTable,
    pub mismatch_interior_1n: MismatchTable,
    pub dangle5: DangleTable,
    pub dangle3: DangleTable,
    pub hairpin: Vec<i32>,
    pub bulge: Vec<i32>,
    pub interior: Vec<i32>,
    pub ninio: i32,
    pub max_ninio: i32,
    pub terminal_au: i32,
    pub ml_closing: i32,
    pub ml_intern: i32,
    pub ml_base: i32,
    pub duplex_init: i32,
    pub lxc: f64,
    pub gquad_alpha: i32,
    pub gquad_beta: i32,
}

// Row/column order: AU, UA, CG, GC, GU, UG, NN
const STACK: PairTable2 = [
    [-110,  -90, -210, -220, -140,  -60, 0],
    [ -90, -130, -210, -240, -130, -100, 0],
    [-210, -210, -240, -330, -210, -140, 0],
    [-220, -240, -330, -340, -250, -150, 0],
    [-140, -130, -210, -250,  130,  -50, 0],
    [ -60, -100, -140, -150,  -50,   30, 0],
    [   0,    0,    0,    0,    0,    0, 0],
];

// Columns: A, C, G, U, N
const DANGLE5: DangleTable = [
    [-30, -30, -40, -20, 0],
    [-30, -10, -20, -20, 0],
    [-50, -30, -20, -10, 0],
    [-20, -30,   0,   0, 0],
    [-30, -30, -40, -20, 0],
    [-30, -10, -20, -20, 0],
    [  0,   0,   0,   0, 0],
];

const DANGLE3: DangleTable = [
    [ -70, -10,  -70, -10, 0],
    [ -80, -50,  -80, -60, 0],
    [-110, -40, -130, -60, 0],
    [-170, -80, -170, -120, 0],
    [ -70, -10,  -70, -10, 0],
    [ -80, -50,  -80, -60, 0],
    [   0,   0,    0,   0, 0],
];

// First mismatch of hairpins, rows 5' side (i+1), columns 3' side (j-1).
const HAIRPIN_MISMATCH: [[i32; BCOUNT]; BCOUNT] = [
    [ -80, -100, -110, -100,  -80],
    [ -60,  -70,  -70,  -50,  -50],
    [-130, -110, -120, -110, -110],
    [ -50,  -80,  -80,  -60,  -50],
    [ -50,  -50,  -50,  -50,  -50],
];

const INTERIOR_MISMATCH: [[i32; BCOUNT]; BCOUNT] = [
    [   0,    0,  -80,    0, 0],
    [   0,    0,    0,    0, 0],
    [-100,    0, -110,    0, 0],
    [   0,    0,    0,  -70, 0],
    [   0,    0,    0,    0, 0],
];

const HAIRPIN: [i32; MAXLOOP + 1] = [
    INF, INF, INF, 540, 560, 570, 540, 600, 550, 640,
    650, 660, 670, 678, 686, 694, 701, 707, 713, 719,
    725, 730, 735, 740, 744, 749, 753, 757, 761, 765, 769,
];

const BULGE: [i32; MAXLOOP + 1] = [
    INF, 380, 280, 320, 360, 400, 440, 459, 470, 480,
    490, 500, 510, 519, 527, 534, 541, 548, 554, 560,
    565, 571, 576, 580, 585, 589, 594, 598, 602, 605, 609,
];

const INTERIOR: [i32; MAXLOOP + 1] = [
    INF, INF,  80, 100, 110, 200, 200, 210, 230, 240,
    250, 260, 270, 280, 290, 290, 300, 310, 310, 320,
    330, 330, 340, 340, 350, 350, 350, 360, 360, 370, 370,
];

/// Penalty of AU/GU closures inside interior loop mismatches.
const INTERIOR_TERMINAL: i32 = 70;

fn mismatch_for_all_pairs(base: &[[i32; BCOUNT]; BCOUNT], terminal: i32) -> MismatchTable {
    let mut table = [[[0; BCOUNT]; BCOUNT]; PCOUNT];
    // AU, UA, GU, UG carry the terminal penalty; NN stays zero.
    let ru = [true, true, false, false, true, true];
    for (p, &is_ru) in ru.iter().enumerate() {
        for x in 0..BCOUNT {
            for y in 0..BCOUNT {
                table[p][x][y] = base[x][y] + if is_ru { terminal } else { 0 };
            }
        }
    }
    table
}

impl Default for ParameterSet {
    fn default() -> Self {
        ParameterSet {
            stack: STACK,
            mismatch_hairpin: mismatch_for_all_pairs(&HAIRPIN_MISMATCH, 0),
            mismatch_interior: mismatch_for_all_pairs(&INTERIOR_MISMATCH, INTERIOR_TERMINAL),
            mismatch_interior_1n: mismatch_for_all_pairs(&[[0; BCOUNT]; BCOUNT], INTERIOR_TERMINAL),
            dangle5: DANGLE5,
            dangle3: DANGLE3,
            hairpin: HAIRPIN.to_vec(),
            bulge: BULGE.to_vec(),
            interior: INTERIOR.to_vec(),
            ninio: 60,
            max_ninio: 300,
            terminal_au: 50,
            ml_closing: 930,
            ml_intern: -90,
            ml_base: 0,
            duplex_init: 410,
            lxc: 107.856,
            gquad_alpha: -1800,
            gquad_beta: 1200,
        }
    }
}

impl ParameterSet {
    pub fn from_json(s: &str) -> Result<Self, ParameterError> {
        let params: ParameterSet = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn to_json(&self) -> Result<String, ParameterError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ParameterError> {
        for (name, table) in [("hairpin", &self.hairpin), ("bulge", &self.bulge), ("interior", &self.interior)] {
            if table.len() != MAXLOOP + 1 {
                return Err(ParameterError::Invalid(format!(
                    "table '{}' has {} entries, expected {}", name, table.len(), MAXLOOP + 1)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PairTypeRNA;
    use crate::Base;

    #[test]
    fn test_stack_table_is_symmetric() {
        let p = ParameterSet::default();
        for a in 0..PCOUNT {
            for b in 0..PCOUNT {
                assert_eq!(p.stack[a][b], p.stack[b][a]);
            }
        }
        // 5'-CC-3' / 3'-GG-5'
        assert_eq!(p.stack[PairTypeRNA::CG as usize][PairTypeRNA::GC as usize], -330);
    }

    #[test]
    fn test_terminal_penalties_in_interior_mismatch() {
        let p = ParameterSet::default();
        let (a, g) = (Base::A as usize, Base::G as usize);
        assert_eq!(p.mismatch_interior[PairTypeRNA::CG as usize][a][g], -80);
        assert_eq!(p.mismatch_interior[PairTypeRNA::AU as usize][a][g], -10);
        assert_eq!(p.mismatch_interior_1n[PairTypeRNA::GU as usize][a][a], 70);
        assert_eq!(p.mismatch_interior_1n[PairTypeRNA::NN as usize][a][a], 0);
    }

    #[test]
    fn test_json_roundtrip_and_validation() {
        let p = ParameterSet::default();
        let json = p.to_json().unwrap();
        let back = ParameterSet::from_json(&json).unwrap();
        assert_eq!(back.stack, p.stack);
        assert_eq!(back.mismatch_interior, p.mismatch_interior);
        assert_eq!(back.hairpin, p.hairpin);
        assert!((back.lxc - p.lxc).abs() < 1e-9);

        let mut short = p.clone();
        short.hairpin.truncate(10);
        let json = short.to_json().unwrap();
        assert!(matches!(ParameterSet::from_json(&json), Err(ParameterError::Invalid(_))));
        assert!(matches!(ParameterSet::from_json("{"), Err(ParameterError::Json(_))));
    }
}
