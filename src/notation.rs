//! Compact puzzle notation: bottles separated by `/`, segments by `.`, each
//! segment a fluid symbol followed by its amount. `A1.B1/B3/A3` is three
//! bottles, the first holding one `A` under one `B`. Empty bottles are empty
//! strings between separators, so a trailing `//` adds spare bottles.

use crate::model::*;

pub const BOTTLE_SEPARATOR: char = '/';
pub const SEGMENT_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("segment {item:?} in bottle {bottle} needs a fluid symbol followed by an amount")]
    InvalidAmount { bottle: usize, item: String },
    #[error(transparent)]
    State(#[from] StateError),
}

/// Parses the notation into a state whose bottles all hold `capacity` units.
pub fn parse_state(text: &str, capacity: u32) -> Result<GameState, NotationError> {
    let mut matrix = Vec::new();
    for (bottle, repr) in text.trim().split(BOTTLE_SEPARATOR).enumerate() {
        let mut segments = Vec::new();
        for item in repr.split(SEGMENT_SEPARATOR).map(str::trim) {
            if item.is_empty() {
                continue;
            }
            segments.push(parse_segment(bottle, item)?);
        }
        matrix.push(segments);
    }
    Ok(GameState::new(matrix, capacity)?)
}

fn parse_segment(bottle: usize, item: &str) -> Result<(char, u32), NotationError> {
    let invalid = || NotationError::InvalidAmount {
        bottle,
        item: item.to_string(),
    };
    let mut chars = item.chars();
    let symbol = chars.next().ok_or_else(invalid)?;
    let amount = chars.as_str().parse::<u32>().map_err(|_| invalid())?;
    Ok((symbol, amount))
}

impl GameState {
    /// Inverse of [`parse_state`]; the capacity is not part of the notation.
    pub fn to_notation(&self) -> String {
        let bottles: Vec<String> = self
            .bottles()
            .iter()
            .map(|bottle| {
                let segments: Vec<String> = bottle
                    .segments()
                    .iter()
                    .map(|s| format!("{}{}", s.fluid().symbol(), s.amount()))
                    .collect();
                segments.join(&SEGMENT_SEPARATOR.to_string())
            })
            .collect();
        bottles.join(&BOTTLE_SEPARATOR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_basic_example() {
        let state = parse_state("A1.B1/B3/A3", 4).unwrap();
        let expected =
            GameState::new(vec![vec![('A', 1), ('B', 1)], vec![('B', 3)], vec![('A', 3)]], 4).unwrap();
        assert_eq!(state, expected);
    }

    #[test]
    fn trailing_separators_add_empty_bottles() {
        let state = parse_state("A4/B4//", 4).unwrap();
        assert_eq!(state.len(), 4);
        assert!(state.bottles()[2].is_empty());
        assert!(state.bottles()[3].is_empty());
    }

    #[test]
    fn dangling_segment_separator_is_ignored() {
        let state = parse_state("S1.B1.L1./L3", 4).unwrap();
        assert_eq!(state.bottles()[0].segments().len(), 3);
    }

    #[test]
    fn non_ascii_symbols_are_kept() {
        let state = parse_state("Ö2.l2", 4).unwrap();
        let top = state.bottles()[0].top().unwrap();
        assert_eq!(top.fluid(), FluidType::new('l'));
        assert_eq!(state.bottles()[0].segments()[0].fluid(), FluidType::new('Ö'));
    }

    #[test]
    fn multi_digit_amounts_parse() {
        let state = parse_state("A12", 12).unwrap();
        assert_eq!(state.bottles()[0].filled_amount(), 12);
    }

    #[test]
    fn missing_amount_is_an_error() {
        assert_eq!(
            parse_state("A1/BX", 4),
            Err(NotationError::InvalidAmount {
                bottle: 1,
                item: "BX".to_string()
            })
        );
        assert!(matches!(
            parse_state("A", 4),
            Err(NotationError::InvalidAmount { bottle: 0, .. })
        ));
    }

    #[test]
    fn zero_amount_is_an_error() {
        assert_eq!(
            parse_state("A0", 4),
            Err(NotationError::State(StateError::ZeroAmount { bottle: 0, segment: 0 }))
        );
    }

    #[test]
    fn notation_survives_a_reparse() {
        let text = "D1.C1.B1.A1/A1.D1.E2/E2//";
        let state = parse_state(text, 4).unwrap();
        assert_eq!(state.to_notation(), text);
    }
}
