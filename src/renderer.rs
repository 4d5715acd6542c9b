use std::{collections::HashMap, sync::Mutex};

use crate::gameplay::{Button, ControlAction};
use macroquad::prelude::*;
use water_sort_solver::{Bottle, FluidType, GameState, PourAction};

pub const FLUID_COLORS: [Color; 32] = [
    Color::new(1.0  , 0.0  , 0.0  , 1.0  ), //RED
    Color::new(0.0  , 0.0  , 1.0  , 1.0  ), //BLUE
    Color::new(1.0  , 1.0  , 0.0  , 1.0  ), //YELLOW
    Color::new(0.0  , 0.5  , 0.0  , 1.0  ), //GREEN
    Color::new(0.627, 0.125, 0.941, 1.0  ), //PURPLE
    Color::new(1.0  , 0.647, 0.0  , 1.0  ), //ORANGE
    Color::new(0.0  , 1.0  , 1.0  , 1.0  ), //CYAN
    Color::new(1.0  , 0.0  , 1.0  , 1.0  ), //MAGENTA
    Color::new(0.0  , 1.0  , 0.0  , 1.0  ), //LIME
    Color::new(1.0  , 0.752, 0.796, 1.0  ), //PINK
    Color::new(0.647, 0.164, 0.164, 1.0  ), //BROWN
    Color::new(0.0  , 0.0  , 0.5  , 1.0  ), //NAVY
    Color::new(0.250, 0.878, 0.815, 1.0  ), //TURQUOISE
    Color::new(0.5  , 0.5  , 0.0  , 1.0  ), //OLIVE
    Color::new(0.5  , 0.0  , 0.0  , 1.0  ), //MAROON
    Color::new(0.941, 0.901, 0.549, 1.0  ), //KHAKI
    Color::new(0.0  , 0.5  , 0.5  , 1.0  ), //TEAL
    Color::new(1.0  , 0.843, 0.0  , 1.0  ), //GOLD
    Color::new(0.75 , 0.75 , 0.75 , 1.0  ), //SILVER
    Color::new(1.0  , 0.498, 0.313, 1.0  ), //CORAL
    Color::new(0.933, 0.509, 0.933, 1.0  ), //VIOLET
    Color::new(0.596, 1.0  , 0.596, 1.0  ), //MINT
    Color::new(0.960, 0.960, 0.862, 1.0  ), //BEIGE
    Color::new(0.980, 0.501, 0.447, 1.0  ), //SALMON
    Color::new(0.956, 0.643, 0.376, 1.0  ), //SANDYBROWN
    Color::new(0.294, 0.0  , 0.509, 1.0  ), //INDIGO
    Color::new(0.862, 0.078, 0.235, 1.0  ), //CRIMSON
    Color::new(0.596, 0.984, 0.596, 1.0  ), //PALEGREEN
    Color::new(0.866, 0.627, 0.866, 1.0  ), //PLUM
    Color::new(0.823, 0.411, 0.117, 1.0  ), //CHOCOLATE
    Color::new(0.0  , 0.392, 0.0  , 1.0  ), //DARKGREEN
    Color::new(1.0  , 0.549, 0.0  , 1.0  ), //DARKORANGE
];

pub fn fluid_color(fluid: FluidType) -> Color {
    FLUID_COLORS[fluid.palette_index() % FLUID_COLORS.len()]
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitItem {
    Button { action: ControlAction },
    Bottle { index: usize },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitRecord {
    pub rect: Rect,
    pub item: HitItem,
}

#[derive(Default)]
pub struct HitTestRegistry {
    items: Vec<HitRecord>,
}

impl HitTestRegistry {
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, rect: Rect, item: HitItem) {
        self.items.push(HitRecord { rect, item });
    }

    /// Topmost item under the point; the last one drawn wins.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<&HitRecord> {
        self.items
            .iter()
            .rev()
            .find(|r| r.rect.contains(vec2(x, y)))
    }
}

/// Font size and centring offsets for a label fitted into a rectangle.
type TextFit = (f32, f32, f32);

#[derive(Default)]
pub struct CachedTextSizer {
    fitted: Mutex<HashMap<(String, u16, u16), TextFit>>,
}

impl CachedTextSizer {
    pub fn fit(&self, text: &str, rect_width: f32, rect_height: f32) -> TextFit {
        let w_px = rect_width.round().clamp(0.0, u16::MAX as f32) as u16;
        let h_px = rect_height.round().clamp(0.0, u16::MAX as f32) as u16;
        let key = (text.to_string(), w_px, h_px);

        if let Ok(cache) = self.fitted.lock()
            && let Some(fit) = cache.get(&key)
        {
            return *fit;
        }

        let reference_size = 100u16;
        let dimensions = measure_text(text, None, reference_size, 1.0);
        let scale = (rect_width / dimensions.width).min(rect_height / dimensions.height);
        let font_size = reference_size as f32 * scale;
        let offset_x = (rect_width - dimensions.width * scale) / 2.0;
        let offset_y = (rect_height + dimensions.height * scale) / 2.0;
        let fit = (font_size, offset_x, offset_y);

        if let Ok(mut cache) = self.fitted.lock() {
            cache.insert(key, fit);
        }
        fit
    }
}

pub struct Renderer {
    text_sizer: CachedTextSizer,
    hit_test: HitTestRegistry,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            text_sizer: CachedTextSizer::default(),
            hit_test: HitTestRegistry::default(),
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 600.0,
        }
    }

    pub fn get_hit_test_registry(&self) -> &HitTestRegistry {
        &self.hit_test
    }

    pub fn autoset_viewport(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.width = screen_width();
        self.height = screen_height();
    }

    pub fn render_game(
        &mut self,
        state: &GameState,
        buttons: &[&Button],
        selected_bottle: Option<usize>,
        next_pour: Option<PourAction>,
        status: &str,
    ) {
        self.hit_test.clear();

        clear_background(BLACK);
        let area_padding = 10.0;
        let button_area_height = self.height * 0.1;
        let status_area_height = self.height * 0.06;
        let bottle_area_height =
            self.height - button_area_height - status_area_height - 2.0 * area_padding;
        self.render_button_lineup(
            buttons,
            Rect::new(self.x, self.y, self.width, button_area_height),
        );
        self.render_bottle_grid(
            state,
            selected_bottle,
            next_pour,
            6,
            Rect::new(
                self.x,
                self.y + button_area_height + area_padding,
                self.width,
                bottle_area_height,
            ),
        );
        self.render_text(
            status,
            Rect::new(
                self.x,
                self.y + button_area_height + bottle_area_height + 2.0 * area_padding,
                self.width,
                status_area_height,
            ),
            WHITE,
        );
    }

    pub fn render_text(&self, text: &str, rect: Rect, color: Color) {
        if text.is_empty() {
            return;
        }
        let (font_size, x, y) = self.text_sizer.fit(text, rect.w, rect.h);
        draw_text(text, rect.x + x, rect.y + y, font_size, color);
    }

    fn render_unit(&self, unit: Option<FluidType>, rect: Rect) {
        match unit {
            None => {
                draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, GRAY);
            }
            Some(fluid) => {
                draw_rectangle(rect.x, rect.y, rect.w, rect.h, fluid_color(fluid));
                draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, BLACK);
                let label = Rect::new(rect.x + rect.w * 0.3, rect.y, rect.w * 0.4, rect.h);
                self.render_text(&fluid.to_string(), label, WHITE);
            }
        }
    }

    fn render_bottle(
        &mut self,
        bottle: &Bottle,
        capacity: u32,
        index: usize,
        outline: Option<Color>,
        rect: Rect,
    ) {
        self.hit_test.push(rect, HitItem::Bottle { index });

        let label_height = rect.h * 0.1;
        let body = Rect::new(rect.x, rect.y + label_height, rect.w, rect.h - label_height);
        self.render_text(
            &format!("#{index}"),
            Rect::new(rect.x, rect.y, rect.w, label_height),
            LIGHTGRAY,
        );

        let units = bottle.fill_units(capacity);
        let unit_height = body.h / units.len().max(1) as f32;
        for (i, unit) in units.into_iter().enumerate() {
            let unit_y = body.y + body.h - (i as f32 + 1.0) * unit_height;
            self.render_unit(unit, Rect::new(body.x, unit_y, body.w, unit_height));
        }
        draw_rectangle_lines(body.x, body.y, body.w, body.h, 3.0, BLACK);
        if let Some(color) = outline {
            draw_rectangle_lines(body.x, body.y, body.w, body.h, 4.0, color);
        }
    }

    fn render_bottle_grid(
        &mut self,
        state: &GameState,
        selected: Option<usize>,
        next_pour: Option<PourAction>,
        max_columns: usize,
        rect: Rect,
    ) {
        let bottle_count = state.len();
        if bottle_count == 0 {
            return;
        }
        let columns = bottle_count.min(max_columns);
        let rows = bottle_count.div_ceil(max_columns);
        let spacing = 10.0;
        let bottle_width = (rect.w - spacing * (columns as f32 - 1.0)) / columns as f32;
        let bottle_height = (rect.h - spacing * (rows as f32 - 1.0)) / rows as f32;

        for (index, bottle) in state.bottles().iter().enumerate() {
            let (row, column) = (index / max_columns, index % max_columns);
            let outline = if Some(index) == selected {
                Some(WHITE)
            } else if next_pour.is_some_and(|p| p.from_bottle == index) {
                Some(YELLOW)
            } else if next_pour.is_some_and(|p| p.to_bottle == index) {
                Some(GREEN)
            } else {
                None
            };
            self.render_bottle(
                bottle,
                state.capacity(),
                index,
                outline,
                Rect::new(
                    rect.x + column as f32 * (bottle_width + spacing),
                    rect.y + row as f32 * (bottle_height + spacing),
                    bottle_width,
                    bottle_height,
                ),
            );
        }
    }

    fn render_button(&mut self, button: &Button, rect: Rect) {
        self.hit_test.push(
            rect,
            HitItem::Button {
                action: button.get_action(),
            },
        );

        draw_rectangle(rect.x, rect.y, rect.w, rect.h, button.get_color());
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, BLACK);
        self.render_text(button.get_label(), rect, WHITE);
    }

    fn render_button_lineup(&mut self, buttons: &[&Button], rect: Rect) {
        let button_count = buttons.len() as f32;
        let spacing = 10.0;
        let total_spacing = spacing * (button_count - 1.0);
        let button_width = (rect.w - total_spacing) / button_count;
        for (i, button) in buttons.iter().enumerate() {
            let button_x = rect.x + i as f32 * (button_width + spacing);
            self.render_button(button, Rect::new(button_x, rect.y, button_width, rect.h));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_prefers_last_drawn() {
        let mut registry = HitTestRegistry::default();
        registry.push(Rect::new(0.0, 0.0, 100.0, 100.0), HitItem::Bottle { index: 0 });
        registry.push(Rect::new(50.0, 50.0, 100.0, 100.0), HitItem::Bottle { index: 1 });
        assert_eq!(registry.hit_test(75.0, 75.0).unwrap().item, HitItem::Bottle { index: 1 });
        assert_eq!(registry.hit_test(10.0, 10.0).unwrap().item, HitItem::Bottle { index: 0 });
        assert!(registry.hit_test(500.0, 500.0).is_none());
    }

    #[test]
    fn palette_covers_every_symbol() {
        assert_eq!(fluid_color(FluidType::new('A')), FLUID_COLORS[0]);
        assert_eq!(fluid_color(FluidType::new('Ö')), FLUID_COLORS['Ö' as usize % 32]);
    }
}
