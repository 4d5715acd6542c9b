use crate::model::*;
use std::fmt;

impl fmt::Display for PourAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from_bottle, self.to_bottle)
    }
}

/// One line per bottle: `#index`, a tab, a symbol per filled unit and `-`
/// per empty unit, e.g. `#0\tAAB-`.
impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, bottle) in self.bottles().iter().enumerate() {
            write!(f, "#{index}\t")?;
            for unit in bottle.fill_units(self.capacity()) {
                match unit {
                    Some(fluid) => write!(f, "{fluid}")?,
                    None => f.write_str("-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Prompt shown while stepping through a solution, with 1-based bottle numbers.
pub fn step_label(step: usize, total: usize, pour: PourAction) -> String {
    format!(
        "({}/{}) {}. -> {}.",
        step + 1,
        total,
        pour.from_bottle + 1,
        pour.to_bottle + 1
    )
}

/// Whole plan on one line, e.g. `0 -> 1, 0 -> 2`.
pub fn plan_line(pours: &[PourAction]) -> String {
    pours
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_prints_fill_and_empty_space() {
        let state = GameState::new(vec![vec![('A', 1), ('B', 2)], vec![], vec![('C', 4)]], 4).unwrap();
        assert_eq!(state.to_string(), "#0\tABB-\n#1\t----\n#2\tCCCC\n");
    }

    #[test]
    fn pour_uses_zero_based_arrow() {
        assert_eq!(PourAction::new(2, 0).to_string(), "2 -> 0");
    }

    #[test]
    fn step_label_is_one_based() {
        assert_eq!(step_label(0, 3, PourAction::new(2, 0)), "(1/3) 3. -> 1.");
    }

    #[test]
    fn plan_line_lists_pours_in_order() {
        let pours = [PourAction::new(0, 1), PourAction::new(0, 2)];
        assert_eq!(plan_line(&pours), "0 -> 1, 0 -> 2");
        assert_eq!(plan_line(&[]), "");
    }
}
