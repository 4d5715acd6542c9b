//! Water sort puzzles: a pour engine that enforces capacity and colour
//! rules, and a depth-bounded depth-first solver over the reachable states.
//!
//! - `model`: fluid types, segments, bottles, game states and pours.
//! - `engine`: pour legality, solved and plausibility checks, move generation.
//! - `solver`: the search itself, one [`Solver`] session per puzzle.
//! - `notation`, `display`, `samples`, `generator`: input and output helpers.

pub mod config;
pub mod display;
pub mod engine;
pub mod generator;
pub mod model;
pub mod notation;
pub mod samples;
pub mod solver;

pub use config::Config;
pub use engine::{PlausibilityError, PourError, ReplayError};
pub use model::{Bottle, FluidSegment, FluidType, GameState, PourAction, StateError};
pub use notation::{NotationError, parse_state};
pub use solver::{SearchConfig, SearchError, SearchStats, Solver, solve, solve_batch};
