use crate::model::*;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;

pub const DEFAULT_DEPTH_LIMIT: u32 = 30;
/// Recursion depth equals the depth limit, so larger limits are clamped to
/// keep the search within a worker thread's stack.
pub const MAX_DEPTH_LIMIT: u32 = 512;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Deepest recursion level explored before a branch is abandoned.
    pub depth_limit: u32,
    /// Run [`GameState::auto_consolidate`] at every visited state.
    pub auto_consolidate: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            auto_consolidate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Every branch ran into the depth limit. The puzzle may still be solvable.
    #[error("no solution found within a depth limit of {depth_limit}")]
    Exhausted { depth_limit: u32 },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub states_visited: usize,
    pub duplicates_skipped: usize,
    pub pours_rejected: usize,
}

/// Bottle-order independent key for a state: bottle contents sorted.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct Fingerprint(Vec<Bottle>);

impl Fingerprint {
    fn of(state: &GameState) -> Self {
        let mut bottles = state.bottles().to_vec();
        bottles.sort();
        Fingerprint(bottles)
    }
}

/// One search session. The visited set is reset by every call to
/// [`Solver::solve`] and never shared between sessions.
pub struct Solver {
    config: SearchConfig,
    visited: HashSet<Fingerprint>,
    stats: SearchStats,
}

impl Solver {
    pub fn new(config: SearchConfig) -> Solver {
        Solver {
            config,
            visited: HashSet::new(),
            stats: SearchStats::default(),
        }
    }

    /// Counters from the most recent [`Solver::solve`] call.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Depth-first search for a pour sequence that sorts `start`. Returns the
    /// first sequence found along the exploration order, not the shortest.
    pub fn solve(&mut self, start: &GameState) -> Result<Vec<PourAction>, SearchError> {
        self.visited.clear();
        self.stats = SearchStats::default();

        let depth_limit = self.config.depth_limit.min(MAX_DEPTH_LIMIT);
        if depth_limit < self.config.depth_limit {
            tracing::warn!(
                requested = self.config.depth_limit,
                depth_limit,
                "depth limit clamped"
            );
        }
        let result = self.search(start.clone(), Vec::new(), depth_limit);
        tracing::debug!(
            solved = result.is_some(),
            states = self.stats.states_visited,
            duplicates = self.stats.duplicates_skipped,
            rejected = self.stats.pours_rejected,
            "search finished"
        );
        result.ok_or(SearchError::Exhausted { depth_limit })
    }

    fn search(
        &mut self,
        mut state: GameState,
        mut history: Vec<PourAction>,
        depth_limit: u32,
    ) -> Option<Vec<PourAction>> {
        if depth_limit == 0 {
            return None;
        }
        if !self.visited.insert(Fingerprint::of(&state)) {
            self.stats.duplicates_skipped += 1;
            return None;
        }
        self.stats.states_visited += 1;

        if self.config.auto_consolidate {
            history.extend(state.auto_consolidate());
        }
        if state.is_solved() {
            return Some(history);
        }

        for pour in state.legal_pours() {
            let mut next = state.clone();
            if let Err(err) = next.apply_pour(pour) {
                tracing::trace!(%pour, %err, "pour rejected");
                self.stats.pours_rejected += 1;
                continue;
            }
            let mut next_history = history.clone();
            next_history.push(pour);
            if let Some(found) = self.search(next, next_history, depth_limit - 1) {
                return Some(found);
            }
        }
        None
    }
}

/// Solves `state` with consolidation enabled and the given depth limit.
pub fn solve(state: &GameState, depth_limit: u32) -> Result<Vec<PourAction>, SearchError> {
    Solver::new(SearchConfig {
        depth_limit,
        ..SearchConfig::default()
    })
    .solve(state)
}

/// Solves independent puzzles in parallel, one sequential search per puzzle.
pub fn solve_batch(
    states: &[GameState],
    config: SearchConfig,
) -> Vec<Result<Vec<PourAction>, SearchError>> {
    states
        .par_iter()
        .map(|state| Solver::new(config).solve(state))
        .collect()
}
