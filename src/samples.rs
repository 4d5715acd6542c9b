use crate::model::GameState;
use crate::notation::{NotationError, parse_state};

/// Hand-authored puzzles in notation form. A few are intentionally
/// implausible (`A1/B2/C3`, `A3/A3`) to exercise the plausibility check.
pub const SAMPLE_PUZZLES: &[&str] = &[
    "D1.C1.B1.A1/A1.D1.E2/F1.A1.E1.B1/E2/C1.B1/C1.A1/F1.E1.F1.B1/E2.C1.D1/D1.F1/",
    "A1.B1/B3/A3",
    "A1.B1.C1/A3/B3/C3",
    "A1/B2/C3",
    "A3/A3",
    "R1.H1.O1.B1/R1.P1.D1.H1/R2.G1.B1/O1.L1.S1.G1/H1.D1.L1.S1/O1.H1.D1.G1/O1.B1.L1.S1/P1.S1.G1.L1/P1.D1.B1.P1//",
    "L1.O2.S1/R1.L1.P1.D1/O1.P1.L1.B1/R1.S1.D1.B1/S1.D1.B1.O1/S1.G1.R1.P1/B1.H1.L1.H1/G1.H2.G1/D1.G1.P1.R1//",
    "G1.R1.H1.L1/B1.L1.H1.G1/D1.B1.S1.L1/S1.R1.D1.S1/G1.D1.S1.G1/D1.B1.R1.H1/H1.R1.L1.B1//",
    "H1.O1.D1.H1/S1.D1.S1.B1/P2.D2/R1.B1.G1.L1/B1.P1.H2/B1.G1.O1.L1/R1.S1.R1.L1/L1.O1.P1.S1/O1.G1.R1.G1//",
    "G1.H1.S1.E1/B1.D1.S1.A1/H1.A1.G1.P1/E1.D1.R2/H1.T1.B1.A1/E1.S1.L2/G1.P1.O1.S1/D1.L1.A1.P1/B1.T1.O1.E1/O1.T1.H1.G1/B1.R1.D1.L1/T1.R1.O1.P1//",
    "D1.B2.G1/H1.B1.P1.H1/O1.S1.R1.G1/O1.L1.H1.P1/H1.O1.D1.R1/S1.B1.L1.D1/S1.R2.O1/S1.P2.G1/L1.G1.D1.L1//",
    "D1.H1.O1.G1/S2.P1.R1/P1.D1.P1.T1/G1.H1.E1.G1/R1.T1.H1.P1/L1.U1.E1.O1/I1.H1.O1.D1/R1.S1.L1.U1/R1.I1.T1.L1/U1.L1.T1.D1/G1.E1.S1.U1/I1.E1.O1.I1//",
    "S2.P1.R1/E1.B1.Ö1.O1/P1.D1.P1.T1/L1.H1.O1.D1/D1.H1.O1.G1/G1.H1.Ö1.G1/R1.T1.H1.P1/R1.S1.E1.B1/G1.Ö1.S1.B1/L1.Ö1.O1.L1/B1.E1.T1.D1/R1.L1.T1.E1//",
    "O1.D1.R1.Z1/D1.G1.Y1.B1/P1.S1.L1.T1/O1.l1.Y1.Z1/S1.Z1.O1.G1/B1.T1.L1.l1/B1.O1.L1.Z1/R1.P1.D1.G1/T1.B1.l1.L1/Y1.S1.P1.G1/T1.Y1.D1.P1/l1.S1.R2//",
];

/// Parses sample `index`, or `None` when the library has no such entry.
pub fn sample(index: usize, capacity: u32) -> Option<Result<GameState, NotationError>> {
    SAMPLE_PUZZLES
        .get(index)
        .map(|text| parse_state(text, capacity))
}

pub fn all(capacity: u32) -> Result<Vec<GameState>, NotationError> {
    SAMPLE_PUZZLES
        .iter()
        .map(|text| parse_state(text, capacity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PlausibilityError;

    #[test]
    fn every_sample_parses() {
        let states = all(4).unwrap();
        assert_eq!(states.len(), SAMPLE_PUZZLES.len());
    }

    #[test]
    fn out_of_range_sample_is_none() {
        assert!(sample(SAMPLE_PUZZLES.len(), 4).is_none());
    }

    #[test]
    fn implausible_samples_are_flagged() {
        let state = sample(4, 4).unwrap().unwrap();
        assert!(matches!(
            state.check_plausible(),
            Err(PlausibilityError::ImbalancedFluid { amount: 6, .. })
        ));
    }

    #[test]
    fn full_size_samples_are_plausible() {
        for index in [0, 1, 2, 5, 6, 7, 8, 9, 10, 11, 12, 13] {
            let state = sample(index, 4).unwrap().unwrap();
            assert_eq!(state.check_plausible(), Ok(()), "sample {index}");
        }
    }
}
