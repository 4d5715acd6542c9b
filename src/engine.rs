use crate::model::*;

/// Why a single pour was refused. The state is left untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PourError {
    #[error("bottle index {index} is out of range ({len} bottles)")]
    InvalidIndex { index: usize, len: usize },
    #[error("cannot pour bottle {0} into itself")]
    SameBottle(usize),
    #[error("bottle {0} is empty")]
    EmptySource(usize),
    #[error("cannot pour {poured} onto {found}")]
    TypeMismatch { poured: FluidType, found: FluidType },
    #[error("bottle {0} is already full")]
    NothingPoured(usize),
}

/// Cheap reasons a state can never be sorted. Passing the check is only a hint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlausibilityError {
    #[error("bottle {bottle} holds more than its capacity of {capacity}")]
    Overfull { bottle: usize, capacity: u32 },
    #[error("fluid {fluid} has {amount} units, not a multiple of the capacity {capacity}")]
    ImbalancedFluid {
        fluid: FluidType,
        amount: u32,
        capacity: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("step {step} ({pour}) could not be replayed")]
pub struct ReplayError {
    pub step: usize,
    pub pour: PourAction,
    #[source]
    pub error: PourError,
}

fn pair_mut(bottles: &mut [Bottle], a: usize, b: usize) -> (&mut Bottle, &mut Bottle) {
    if a < b {
        let (low, high) = bottles.split_at_mut(b);
        (&mut low[a], &mut high[0])
    } else {
        let (low, high) = bottles.split_at_mut(a);
        (&mut high[0], &mut low[b])
    }
}

impl GameState {
    /// Pours the top segment of `from_bottle` onto `to_bottle`, splitting it
    /// when the destination cannot take all of it.
    pub fn apply_pour(&mut self, pour: PourAction) -> Result<(), PourError> {
        let len = self.bottles.len();
        for index in [pour.from_bottle, pour.to_bottle] {
            if index >= len {
                return Err(PourError::InvalidIndex { index, len });
            }
        }
        if pour.from_bottle == pour.to_bottle {
            return Err(PourError::SameBottle(pour.from_bottle));
        }

        let capacity = self.capacity;
        let (source, target) = pair_mut(&mut self.bottles, pour.from_bottle, pour.to_bottle);
        let Some(&poured) = source.top() else {
            return Err(PourError::EmptySource(pour.from_bottle));
        };

        let target_fill = target.filled_amount();
        let target_top = match target.segments.last_mut() {
            Some(top) => top,
            None => {
                // Empty destination: the whole segment moves over unchanged.
                source.segments.pop();
                target.segments.push(poured);
                return Ok(());
            }
        };
        if target_top.fluid != poured.fluid {
            return Err(PourError::TypeMismatch {
                poured: poured.fluid,
                found: target_top.fluid,
            });
        }

        if poured.amount.saturating_add(target_fill) > capacity {
            let transfer = capacity.saturating_sub(target_fill);
            if transfer == 0 {
                return Err(PourError::NothingPoured(pour.to_bottle));
            }
            target_top.amount += transfer;
            if let Some(source_top) = source.segments.last_mut() {
                source_top.amount -= transfer;
            }
        } else {
            target_top.amount += poured.amount;
            source.segments.pop();
        }
        Ok(())
    }

    /// Solved when every bottle holds at most one fluid type.
    pub fn is_solved(&self) -> bool {
        self.bottles.iter().all(Bottle::is_pure)
    }

    /// Rejects states that obviously cannot be sorted: a bottle holding more
    /// than its capacity (this covers any single oversize segment), or a fluid
    /// whose total would not fill a whole number of bottles.
    pub fn check_plausible(&self) -> Result<(), PlausibilityError> {
        let capacity = self.capacity;
        if let Some(bottle) = self
            .bottles
            .iter()
            .position(|b| b.filled_amount() > capacity)
        {
            return Err(PlausibilityError::Overfull { bottle, capacity });
        }
        for (fluid, amount) in self.fluid_totals() {
            if amount % capacity != 0 {
                return Err(PlausibilityError::ImbalancedFluid {
                    fluid,
                    amount,
                    capacity,
                });
            }
        }
        Ok(())
    }

    /// Every pour worth trying from this state, source-major then destination,
    /// both ascending. The order fixes which solution the search finds first.
    pub fn legal_pours(&self) -> Vec<PourAction> {
        let mut pours = Vec::new();
        for (from, source) in self.bottles.iter().enumerate() {
            let Some(top) = source.top_fluid() else {
                continue;
            };
            for (to, target) in self.bottles.iter().enumerate() {
                if from == to {
                    continue;
                }
                // Moving a pure bottle into an empty one only relabels it.
                if source.is_pure() && target.is_empty() {
                    continue;
                }
                if target.top_fluid().is_some_and(|t| t != top) {
                    continue;
                }
                pours.push(PourAction::new(from, to));
            }
        }
        pours
    }

    /// Greedily tops up every non-empty pure bottle from the others until a
    /// full pass changes nothing. Returns the pours performed, in order.
    ///
    /// A pure source only pours into another pure bottle when all of it fits,
    /// otherwise two half-full bottles of one colour would trade fluid forever.
    pub fn auto_consolidate(&mut self) -> Vec<PourAction> {
        let mut history = Vec::new();
        let mut changed = true;
        while changed {
            changed = false;
            for target in 0..self.bottles.len() {
                let bottle = &self.bottles[target];
                if bottle.is_empty() || !bottle.is_pure() {
                    continue;
                }
                for source in 0..self.bottles.len() {
                    if source == target || !self.consolidation_fits(source, target) {
                        continue;
                    }
                    let pour = PourAction::new(source, target);
                    match self.apply_pour(pour) {
                        Ok(()) => {
                            history.push(pour);
                            changed = true;
                        }
                        Err(err) => tracing::trace!(%pour, %err, "consolidation pour skipped"),
                    }
                }
            }
        }
        if !history.is_empty() {
            tracing::debug!(pours = history.len(), "consolidated pure bottles");
        }
        history
    }

    fn consolidation_fits(&self, source: usize, target: usize) -> bool {
        let source = &self.bottles[source];
        !source.is_pure() || source.filled_amount() <= self.bottles[target].empty_space(self.capacity)
    }

    /// Applies `pours` in order, stopping at the first one that fails.
    pub fn replay(&mut self, pours: &[PourAction]) -> Result<(), ReplayError> {
        for (step, &pour) in pours.iter().enumerate() {
            self.apply_pour(pour)
                .map_err(|error| ReplayError { step, pour, error })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(matrix: Vec<Vec<(char, u32)>>) -> GameState {
        GameState::new(matrix, 4).unwrap()
    }

    fn pour(from: usize, to: usize) -> PourAction {
        PourAction::new(from, to)
    }

    #[test]
    fn out_of_range_index_fails() {
        let mut s = state(vec![vec![('A', 1)], vec![]]);
        let before = s.clone();
        assert_eq!(
            s.apply_pour(pour(0, 2)),
            Err(PourError::InvalidIndex { index: 2, len: 2 })
        );
        assert_eq!(
            s.apply_pour(pour(5, 0)),
            Err(PourError::InvalidIndex { index: 5, len: 2 })
        );
        assert_eq!(s, before);
    }

    #[test]
    fn empty_source_fails() {
        let mut s = state(vec![vec![], vec![('A', 1)]]);
        assert_eq!(s.apply_pour(pour(0, 1)), Err(PourError::EmptySource(0)));
    }

    #[test]
    fn same_bottle_fails() {
        let mut s = state(vec![vec![('A', 1)], vec![]]);
        assert_eq!(s.apply_pour(pour(0, 0)), Err(PourError::SameBottle(0)));
    }

    #[test]
    fn type_mismatch_fails_without_side_effects() {
        let mut s = state(vec![vec![('A', 1)], vec![('B', 1)]]);
        let before = s.clone();
        assert_eq!(
            s.apply_pour(pour(0, 1)),
            Err(PourError::TypeMismatch {
                poured: FluidType::new('A'),
                found: FluidType::new('B'),
            })
        );
        assert_eq!(s, before);
    }

    #[test]
    fn overflow_splits_the_segment() {
        let mut s = state(vec![vec![('B', 1), ('X', 3)], vec![('C', 1), ('X', 1)], vec![('D', 2)]]);
        s.apply_pour(pour(0, 1)).unwrap();
        assert_eq!(s, state(vec![vec![('B', 1), ('X', 1)], vec![('C', 1), ('X', 3)], vec![('D', 2)]]));
    }

    #[test]
    fn full_destination_pours_nothing() {
        let mut s = state(vec![vec![('A', 1)], vec![('B', 1), ('A', 3)]]);
        let before = s.clone();
        assert_eq!(s.apply_pour(pour(0, 1)), Err(PourError::NothingPoured(1)));
        assert_eq!(s, before);
    }

    #[test]
    fn pour_into_empty_moves_whole_segment() {
        let mut s = state(vec![vec![('A', 1), ('X', 2)], vec![]]);
        s.apply_pour(pour(0, 1)).unwrap();
        assert_eq!(s, state(vec![vec![('A', 1)], vec![('X', 2)]]));
    }

    #[test]
    fn pour_onto_matching_top_merges() {
        let mut s = state(vec![vec![('X', 2)], vec![('A', 1), ('X', 1)]]);
        s.apply_pour(pour(0, 1)).unwrap();
        assert_eq!(s, state(vec![vec![], vec![('A', 1), ('X', 3)]]));
    }

    #[test]
    fn solved_detection() {
        assert!(state(vec![vec![('A', 4)], vec![], vec![('B', 4)]]).is_solved());
        assert!(!state(vec![vec![('A', 2), ('B', 2)], vec![], vec![('B', 2), ('A', 2)]]).is_solved());
    }

    #[test]
    fn plausibility_flags_overfull_bottles() {
        let s = state(vec![vec![('A', 5)], vec![('A', 3)]]);
        assert_eq!(
            s.check_plausible(),
            Err(PlausibilityError::Overfull { bottle: 0, capacity: 4 })
        );
    }

    #[test]
    fn plausibility_counts_the_whole_bottle_not_one_segment() {
        // Neither segment is oversize on its own, but together they spill over.
        let s = state(vec![vec![('A', 2), ('B', 3)], vec![('A', 2), ('B', 1)]]);
        assert_eq!(
            s.check_plausible(),
            Err(PlausibilityError::Overfull { bottle: 0, capacity: 4 })
        );
    }

    #[test]
    fn plausibility_flags_imbalanced_fluid() {
        let s = state(vec![vec![('A', 3)], vec![('A', 3)]]);
        assert_eq!(
            s.check_plausible(),
            Err(PlausibilityError::ImbalancedFluid {
                fluid: FluidType::new('A'),
                amount: 6,
                capacity: 4,
            })
        );
    }

    #[test]
    fn plausibility_accepts_multiple_bottles_per_colour() {
        let s = state(vec![vec![('A', 2), ('B', 2)], vec![('A', 4)], vec![('B', 2), ('A', 2)], vec![]]);
        assert_eq!(s.check_plausible(), Ok(()));
    }

    #[test]
    fn legal_pours_follow_enumeration_rules() {
        // 0: mixed, top B. 1: pure B. 2: pure A. 3: empty.
        let s = state(vec![vec![('A', 1), ('B', 1)], vec![('B', 2)], vec![('A', 3)], vec![]]);
        assert_eq!(s.legal_pours(), vec![pour(0, 1), pour(0, 3), pour(1, 0)]);
    }

    #[test]
    fn consolidation_fills_pure_bottles() {
        let mut s = state(vec![vec![('A', 1), ('B', 1)], vec![('B', 3)], vec![('A', 3)]]);
        let history = s.auto_consolidate();
        assert_eq!(history, vec![pour(0, 1), pour(0, 2)]);
        assert_eq!(s, state(vec![vec![], vec![('B', 4)], vec![('A', 4)]]));
    }

    #[test]
    fn consolidation_does_not_ping_pong() {
        let mut s = state(vec![vec![('A', 3)], vec![('A', 3)], vec![('A', 2)]]);
        let before = s.clone();
        assert!(s.auto_consolidate().is_empty());
        assert_eq!(s, before);
    }

    #[test]
    fn consolidation_empties_pure_bottles_that_fit() {
        let mut s = state(vec![vec![('A', 3)], vec![('A', 1)], vec![('B', 4)]]);
        assert_eq!(s.auto_consolidate(), vec![pour(1, 0)]);
        assert_eq!(s, state(vec![vec![('A', 4)], vec![], vec![('B', 4)]]));
    }

    #[test]
    fn replay_reports_failing_step() {
        let mut s = state(vec![vec![('A', 1), ('B', 1)], vec![('B', 3)], vec![('A', 3)]]);
        let err = s.replay(&[pour(0, 1), pour(1, 2)]).unwrap_err();
        assert_eq!(err.step, 1);
        assert!(matches!(err.error, PourError::TypeMismatch { .. }));
    }
}
