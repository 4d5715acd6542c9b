use crate::renderer::{FLUID_COLORS, HitItem, Renderer};
use clipboard_rs::{Clipboard, ClipboardContext};
use macroquad::prelude::*;
use water_sort_solver::{Config, GameState, PourAction, Solver, parse_state};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlAction {
    SelectBottle(usize),
    Deselect,
    Pour(usize, usize),
    Solve,
    StepForward,
    StepBack,
    Reset,
    CopyState,
    PasteState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    label: String,
    action: ControlAction,
    color: Color,
}
impl Button {
    pub fn new(label: &str, action: ControlAction, color: Color) -> Self {
        Self {
            label: label.to_string(),
            action,
            color,
        }
    }
    pub fn get_action(&self) -> ControlAction {
        self.action
    }
    pub fn get_label(&self) -> &str {
        &self.label
    }
    pub fn get_color(&self) -> Color {
        self.color
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    None,
    Bottle(usize),
}

/// Steps through a found solution one pour at a time. Manual pours are
/// allowed too; one that matches the next planned pour keeps the plan.
pub struct ReplayEngine {
    state: GameState,
    starting_state: GameState,
    config: Config,
    solution: Vec<PourAction>,
    cursor: usize,
    undo_stack: Vec<(GameState, Vec<PourAction>, usize)>,
    buttons: Vec<Button>,
    renderer: Renderer,
    selected: Selection,
    status: String,
}

impl ReplayEngine {
    pub fn new(state: GameState, config: Config) -> Self {
        let buttons = vec![
            Button::new("Solve", ControlAction::Solve, FLUID_COLORS[3]), // GREEN
            Button::new("Prev", ControlAction::StepBack, FLUID_COLORS[1]), // BLUE
            Button::new("Next", ControlAction::StepForward, FLUID_COLORS[16]), // TEAL
            Button::new("Reset", ControlAction::Reset, FLUID_COLORS[0]), // RED
            Button::new("Copy", ControlAction::CopyState, FLUID_COLORS[5]), // ORANGE
            Button::new("Paste", ControlAction::PasteState, FLUID_COLORS[4]), // PURPLE
        ];
        Self {
            state: state.clone(),
            starting_state: state,
            config,
            solution: Vec::new(),
            cursor: 0,
            undo_stack: Vec::new(),
            buttons,
            renderer: Renderer::new(),
            selected: Selection::None,
            status: "Press Solve (S) to search".to_string(),
        }
    }

    pub fn render(&mut self) {
        self.renderer.autoset_viewport();
        let selected = match self.selected {
            Selection::Bottle(index) => Some(index),
            Selection::None => None,
        };
        let buttons = self.buttons.iter().collect::<Vec<_>>();
        let status = format!("{}  |  {}", self.progress_label(), self.status);
        self.renderer.render_game(
            &self.state,
            &buttons,
            selected,
            self.solution.get(self.cursor).copied(),
            &status,
        );
    }

    fn progress_label(&self) -> String {
        if self.solution.is_empty() {
            "no plan".to_string()
        } else {
            format!("step {}/{}", self.cursor, self.solution.len())
        }
    }

    pub fn handle_click(&mut self, x: f32, y: f32) {
        if let Some(hit) = self.renderer.get_hit_test_registry().hit_test(x, y) {
            self.handle_hit_item(hit.item);
        }
    }

    fn handle_hit_item(&mut self, item: HitItem) {
        let action = match item {
            HitItem::Button { action } => action,
            HitItem::Bottle { index } => match self.selected {
                Selection::Bottle(from) if from == index => ControlAction::Deselect,
                Selection::Bottle(from) => ControlAction::Pour(from, index),
                Selection::None => ControlAction::SelectBottle(index),
            },
        };
        self.handle_game_action(action);
    }

    pub fn handle_game_action(&mut self, action: ControlAction) {
        match action {
            ControlAction::SelectBottle(index) => {
                self.selected = Selection::Bottle(index);
            }
            ControlAction::Deselect => {
                self.selected = Selection::None;
            }
            ControlAction::Pour(from, to) => {
                self.manual_pour(PourAction::new(from, to));
            }
            ControlAction::Solve => {
                self.solve();
            }
            ControlAction::StepForward => {
                self.step_forward();
            }
            ControlAction::StepBack => {
                self.step_back();
            }
            ControlAction::Reset => {
                self.load_state(self.starting_state.clone());
                self.status = "Reset to the starting position".to_string();
            }
            ControlAction::CopyState => {
                let repr = self.state.to_notation();
                self.set_clipboard(&repr);
                self.status = format!("Copied {repr}");
            }
            ControlAction::PasteState => {
                let repr = self.get_clipboard();
                match parse_state(&repr, self.config.capacity) {
                    Ok(state) => {
                        self.starting_state = state.clone();
                        self.load_state(state);
                        self.status = "Loaded puzzle from clipboard".to_string();
                    }
                    Err(err) => self.status = format!("Paste failed: {err}"),
                }
            }
        }
    }

    fn manual_pour(&mut self, pour: PourAction) {
        let mut next = self.state.clone();
        if let Err(err) = next.apply_pour(pour) {
            self.status = err.to_string();
            self.handle_game_action(ControlAction::SelectBottle(pour.to_bottle));
            return;
        }
        self.push_undo();
        self.state = next;
        self.selected = Selection::None;
        if self.solution.get(self.cursor) == Some(&pour) {
            self.cursor += 1;
        } else if !self.solution.is_empty() {
            self.solution.clear();
            self.cursor = 0;
            self.status = "Left the plan, solve again".to_string();
            return;
        }
        self.status = if self.state.is_solved() {
            "Solved!".to_string()
        } else {
            format!("Poured {pour}")
        };
    }

    fn solve(&mut self) {
        if let Err(err) = self.state.check_plausible() {
            self.status = format!("Not solvable: {err}");
            return;
        }
        let mut solver = Solver::new(self.config.search);
        match solver.solve(&self.state) {
            Ok(pours) => {
                self.status = format!(
                    "Found {} pours ({} states searched)",
                    pours.len(),
                    solver.stats().states_visited
                );
                self.solution = pours;
                self.cursor = 0;
            }
            Err(err) => {
                self.solution.clear();
                self.cursor = 0;
                self.status = err.to_string();
            }
        }
        self.selected = Selection::None;
    }

    fn step_forward(&mut self) {
        let Some(&pour) = self.solution.get(self.cursor) else {
            self.status = "No further steps".to_string();
            return;
        };
        let mut next = self.state.clone();
        match next.apply_pour(pour) {
            Ok(()) => {
                self.push_undo();
                self.state = next;
                self.cursor += 1;
                self.status = water_sort_solver::display::step_label(
                    self.cursor - 1,
                    self.solution.len(),
                    pour,
                );
            }
            Err(err) => {
                tracing::warn!(%pour, %err, "planned pour no longer applies");
                self.status = err.to_string();
            }
        }
        self.selected = Selection::None;
    }

    /// Each undo entry carries the plan its cursor points into.
    fn push_undo(&mut self) {
        self.undo_stack
            .push((self.state.clone(), self.solution.clone(), self.cursor));
    }

    fn step_back(&mut self) {
        if let Some((previous_state, solution, cursor)) = self.undo_stack.pop() {
            self.state = previous_state;
            self.solution = solution;
            self.cursor = cursor;
            self.selected = Selection::None;
        }
    }

    fn load_state(&mut self, state: GameState) {
        self.state = state;
        self.solution.clear();
        self.cursor = 0;
        self.undo_stack.clear();
        self.selected = Selection::None;
    }

    fn get_clipboard(&self) -> String {
        ClipboardContext::new()
            .ok()
            .and_then(|ctx| ctx.get_text().ok())
            .unwrap_or_default()
    }

    fn set_clipboard(&self, content: &str) {
        match ClipboardContext::new() {
            Ok(ctx) => {
                if let Err(err) = ctx.set_text(content.to_string()) {
                    tracing::warn!("failed to write clipboard: {err}");
                }
            }
            Err(err) => tracing::warn!("clipboard unavailable: {err}"),
        }
    }
}

pub async fn run(mut engine: ReplayEngine) {
    loop {
        engine.render();
        if is_mouse_button_pressed(MouseButton::Left) {
            let (x, y) = mouse_position();
            engine.handle_click(x, y);
        }
        if is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Right) {
            engine.handle_game_action(ControlAction::StepForward);
        }
        if is_key_pressed(KeyCode::Left) {
            engine.handle_game_action(ControlAction::StepBack);
        }
        if is_key_pressed(KeyCode::S) {
            engine.handle_game_action(ControlAction::Solve);
        }
        if is_key_pressed(KeyCode::Escape) {
            engine.handle_game_action(ControlAction::Deselect);
        }
        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(text: &str) -> ReplayEngine {
        ReplayEngine::new(parse_state(text, 4).unwrap(), Config::default())
    }

    #[test]
    fn solve_then_step_through_reaches_solved_state() {
        let mut engine = engine("A1.B1/B3/A3");
        engine.handle_game_action(ControlAction::Solve);
        assert_eq!(engine.solution.len(), 2);
        engine.handle_game_action(ControlAction::StepForward);
        engine.handle_game_action(ControlAction::StepForward);
        assert!(engine.state.is_solved());
        assert_eq!(engine.cursor, 2);

        engine.handle_game_action(ControlAction::StepBack);
        assert_eq!(engine.cursor, 1);
        assert_eq!(engine.state.bottles()[2].filled_amount(), 3);
    }

    #[test]
    fn stepping_back_past_a_re_solve_restores_the_older_plan() {
        let mut engine = engine("A1.B1/B3/A3");
        engine.handle_game_action(ControlAction::Solve);
        let first_plan = engine.solution.clone();
        engine.handle_game_action(ControlAction::StepForward);
        let after_first_step = engine.state.clone();

        engine.handle_game_action(ControlAction::Solve);
        assert_eq!(engine.cursor, 0);

        engine.handle_game_action(ControlAction::StepBack);
        assert_eq!(engine.state, engine.starting_state);
        assert_eq!(engine.solution, first_plan);
        assert_eq!(engine.cursor, 0);

        engine.handle_game_action(ControlAction::StepForward);
        assert_eq!(engine.state, after_first_step);
        assert_eq!(engine.cursor, 1);
    }

    #[test]
    fn stepping_back_over_an_off_plan_pour_restores_the_plan() {
        let mut engine = engine("A1.B1/B3/A3");
        engine.handle_game_action(ControlAction::Solve);
        let plan = engine.solution.clone();
        engine.handle_game_action(ControlAction::Pour(1, 0));
        assert!(engine.solution.is_empty());

        engine.handle_game_action(ControlAction::StepBack);
        assert_eq!(engine.solution, plan);
        engine.handle_game_action(ControlAction::StepForward);
        engine.handle_game_action(ControlAction::StepForward);
        assert!(engine.state.is_solved());
    }

    #[test]
    fn matching_manual_pour_keeps_the_plan() {
        let mut engine = engine("A1.B1/B3/A3");
        engine.handle_game_action(ControlAction::Solve);
        engine.handle_game_action(ControlAction::SelectBottle(0));
        engine.handle_game_action(ControlAction::Pour(0, 1));
        assert_eq!(engine.cursor, 1);
        assert_eq!(engine.solution.len(), 2);
    }

    #[test]
    fn rejected_manual_pour_selects_target() {
        let mut engine = engine("A1.B1/B3/A3");
        engine.handle_game_action(ControlAction::Pour(0, 2));
        assert_eq!(engine.selected, Selection::Bottle(2));
        assert_eq!(engine.state, engine.starting_state);
    }

    #[test]
    fn implausible_puzzle_is_not_searched() {
        let mut engine = engine("A3/A3");
        engine.handle_game_action(ControlAction::Solve);
        assert!(engine.solution.is_empty());
        assert!(engine.status.starts_with("Not solvable"));
    }
}
