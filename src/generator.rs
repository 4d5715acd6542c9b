use crate::model::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const MAX_COLORS: usize = 26;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PuzzleShape {
    pub colors: usize,
    pub empty_bottles: usize,
    pub capacity: u32,
}

impl Default for PuzzleShape {
    fn default() -> Self {
        PuzzleShape {
            colors: 4,
            empty_bottles: 2,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    #[error("at most {MAX_COLORS} colours are supported, got {0}")]
    TooManyColors(usize),
    #[error(transparent)]
    State(#[from] StateError),
}

/// Shuffles `capacity` units of each colour across `colors` full bottles and
/// appends the empty ones. Neighbouring units of one colour share a segment.
pub fn generate<R: Rng + ?Sized>(shape: &PuzzleShape, rng: &mut R) -> Result<GameState, GeneratorError> {
    if shape.colors > MAX_COLORS {
        return Err(GeneratorError::TooManyColors(shape.colors));
    }
    if shape.capacity == 0 {
        return Err(StateError::ZeroCapacity.into());
    }

    let mut units: Vec<FluidType> = (0..shape.colors)
        .flat_map(|color| {
            let symbol = FluidType::new((b'A' + color as u8) as char);
            std::iter::repeat_n(symbol, shape.capacity as usize)
        })
        .collect();
    units.shuffle(rng);

    let mut bottles: Vec<Bottle> = units
        .chunks(shape.capacity as usize)
        .map(|chunk| {
            let mut segments: Vec<FluidSegment> = Vec::new();
            for &fluid in chunk {
                match segments.last_mut() {
                    Some(top) if top.fluid == fluid => top.amount += 1,
                    _ => segments.push(FluidSegment { fluid, amount: 1 }),
                }
            }
            Bottle::from_segments(segments)
        })
        .collect();
    bottles.extend((0..shape.empty_bottles).map(|_| Bottle::new()));

    Ok(GameState::from_bottles(bottles, shape.capacity)?)
}

pub fn generate_seeded(shape: &PuzzleShape, seed: u64) -> Result<GameState, GeneratorError> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(shape, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_puzzle() {
        let shape = PuzzleShape::default();
        assert_eq!(generate_seeded(&shape, 7), generate_seeded(&shape, 7));
    }

    #[test]
    fn generated_puzzles_are_plausible() {
        let shape = PuzzleShape {
            colors: 6,
            empty_bottles: 2,
            capacity: 4,
        };
        for seed in 0..20 {
            let state = generate_seeded(&shape, seed).unwrap();
            assert_eq!(state.len(), 8);
            assert_eq!(state.check_plausible(), Ok(()));
            assert!(state.bottles()[6].is_empty() && state.bottles()[7].is_empty());
            for bottle in &state.bottles()[..6] {
                assert_eq!(bottle.filled_amount(), 4);
                assert!(bottle.segments().windows(2).all(|w| w[0].fluid() != w[1].fluid()));
            }
        }
    }

    #[test]
    fn too_many_colours_is_rejected() {
        let shape = PuzzleShape {
            colors: 27,
            ..PuzzleShape::default()
        };
        assert_eq!(
            generate_seeded(&shape, 0),
            Err(GeneratorError::TooManyColors(27))
        );
    }
}
