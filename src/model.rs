use std::collections::BTreeMap;
use std::fmt;

/// A fluid colour, identified by the single symbol used in puzzle notation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FluidType(char);

impl FluidType {
    pub fn new(symbol: char) -> Self {
        FluidType(symbol)
    }

    pub fn symbol(&self) -> char {
        self.0
    }

    /// Stable 0-based index for palette lookups: `A`..`Z` map to 0..25,
    /// anything else falls back to its code point.
    pub fn palette_index(&self) -> usize {
        if self.0.is_ascii_uppercase() {
            (self.0 as u8 - b'A') as usize
        } else {
            self.0 as usize
        }
    }
}

impl fmt::Display for FluidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<char> for FluidType {
    fn from(symbol: char) -> Self {
        FluidType(symbol)
    }
}

/// A contiguous run of one fluid type. The amount is always positive;
/// a segment that would drop to zero is removed from its bottle instead.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FluidSegment {
    pub(crate) fluid: FluidType,
    pub(crate) amount: u32,
}

impl FluidSegment {
    pub fn new(fluid: FluidType, amount: u32) -> Option<Self> {
        (amount > 0).then_some(FluidSegment { fluid, amount })
    }

    pub fn fluid(&self) -> FluidType {
        self.fluid
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }
}

/// An ordered stack of segments; the top of the bottle is the last element.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Bottle {
    pub(crate) segments: Vec<FluidSegment>,
}

impl Bottle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<FluidSegment>) -> Self {
        Bottle { segments }
    }

    pub fn segments(&self) -> &[FluidSegment] {
        &self.segments
    }

    pub fn top(&self) -> Option<&FluidSegment> {
        self.segments.last()
    }

    pub fn top_fluid(&self) -> Option<FluidType> {
        self.top().map(|s| s.fluid)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A bottle is pure when it holds at most one segment.
    pub fn is_pure(&self) -> bool {
        self.segments.len() <= 1
    }

    pub fn filled_amount(&self) -> u32 {
        self.segments.iter().map(|s| s.amount).sum()
    }

    pub fn empty_space(&self, capacity: u32) -> u32 {
        capacity.saturating_sub(self.filled_amount())
    }

    /// Visual fill of the bottle, bottom unit first. Occupied units carry
    /// their fluid type and the remainder up to `capacity` is `None`.
    pub fn fill_units(&self, capacity: u32) -> Vec<Option<FluidType>> {
        let mut units = Vec::with_capacity(capacity.max(self.filled_amount()) as usize);
        for segment in &self.segments {
            for _ in 0..segment.amount {
                units.push(Some(segment.fluid));
            }
        }
        units.resize(units.len().max(capacity as usize), None);
        units
    }
}

/// Errors raised while building a [`GameState`] from external input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("bottle capacity must be at least 1")]
    ZeroCapacity,
    #[error("segment {segment} of bottle {bottle} has zero amount")]
    ZeroAmount { bottle: usize, segment: usize },
}

/// The full puzzle: every bottle plus the capacity they all share.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct GameState {
    pub(crate) bottles: Vec<Bottle>,
    pub(crate) capacity: u32,
}

pub const DEFAULT_CAPACITY: u32 = 4;

impl GameState {
    /// Builds a state from a bottle-by-bottle matrix of `(type, amount)`
    /// pairs, bottom segment first.
    pub fn new<T>(matrix: Vec<Vec<(T, u32)>>, capacity: u32) -> Result<Self, StateError>
    where
        T: Into<FluidType>,
    {
        if capacity == 0 {
            return Err(StateError::ZeroCapacity);
        }
        let mut bottles = Vec::with_capacity(matrix.len());
        for (bottle, contents) in matrix.into_iter().enumerate() {
            let mut segments = Vec::with_capacity(contents.len());
            for (segment, (fluid, amount)) in contents.into_iter().enumerate() {
                let seg = FluidSegment::new(fluid.into(), amount)
                    .ok_or(StateError::ZeroAmount { bottle, segment })?;
                segments.push(seg);
            }
            bottles.push(Bottle::from_segments(segments));
        }
        Ok(GameState { bottles, capacity })
    }

    pub fn from_bottles(bottles: Vec<Bottle>, capacity: u32) -> Result<Self, StateError> {
        if capacity == 0 {
            return Err(StateError::ZeroCapacity);
        }
        Ok(GameState { bottles, capacity })
    }

    pub fn bottles(&self) -> &[Bottle] {
        &self.bottles
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.bottles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bottles.is_empty()
    }

    /// Total amount of every fluid type across all bottles.
    pub fn fluid_totals(&self) -> BTreeMap<FluidType, u32> {
        let mut totals = BTreeMap::new();
        for segment in self.bottles.iter().flat_map(|b| b.segments.iter()) {
            *totals.entry(segment.fluid).or_insert(0) += segment.amount;
        }
        totals
    }
}

/// A single pour from one bottle slot onto another.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct PourAction {
    pub from_bottle: usize,
    pub to_bottle: usize,
}

impl PourAction {
    pub fn new(from_bottle: usize, to_bottle: usize) -> Self {
        PourAction {
            from_bottle,
            to_bottle,
        }
    }
}
