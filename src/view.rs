//! Layout and drawing of the exercise: the equation line, the ruler, the
//! two arrows and the text fields that sit on top of them.

use ratatui::layout::Size;
use ratatui::style::Color;
use tracing::{debug, warn};

use crate::input::{InputField, InputGeometry};
use crate::surface::{
    Align, Point, PxRect, RulerSprite, Segment, Sprite, Stroke, Surface, TextStyle, CELL_HEIGHT,
    CELL_WIDTH, RULER,
};
use crate::task::Task;

const EQUATION_FONT: i32 = 48;
const EQUATION_TOP: i32 = 30;
const MARK_PADDING: i32 = 2;
const TEXT_COLOR: Color = Color::Rgb(230, 230, 240);
const MARK_COLOR: Color = Color::Rgb(255, 165, 0);
const PLACEHOLDER: &str = "?";
const RESULT_INPUT_LEN: usize = 2;

/// Gap between the ruler sprite and the bottom edge of the surface.
const RULER_MARGIN: i32 = 20;
/// Arrows start and end this far below the sprite's top edge.
const ARROW_BASE: i32 = 20;
/// Control points sit at 1/CONTROL_FRACTION of the arrow's span.
const CONTROL_FRACTION: i32 = 4;
/// Empirically fitted apex correction per unit of arrow value. Only holds
/// for CONTROL_FRACTION = 4; re-fit it if the control points move.
const APEX_CORRECTION: f64 = 22.0 / 9.0;
const ARROW_COLOR: Color = Color::Rgb(0xb5, 0x5b, 0x84);
const ARROW_LINE_WIDTH: i32 = 2;
const CAP_WIDTH: i32 = 5;
const CAP_LENGTH: i32 = 3 * CAP_WIDTH;
const ARROW_FONT: i32 = 36;
const VALUE_GAP: i32 = 20;
const OPERAND_INPUT_LEN: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    First,
    Second,
}

impl Operand {
    fn slot(self) -> usize {
        match self {
            Operand::First => 0,
            Operand::Second => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawOptions {
    pub mark: Option<Operand>,
    pub solved: bool,
}

impl DrawOptions {
    pub fn marked(operand: Option<Operand>) -> Self {
        Self {
            mark: operand,
            solved: false,
        }
    }

    pub fn solved() -> Self {
        Self {
            mark: None,
            solved: true,
        }
    }
}

/// Geometry of the equation line, measured once with the equation font.
#[derive(Clone, Debug, PartialEq)]
pub struct EquationLayout {
    pub font_size: i32,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub op_left: [i32; 2],
    pub op_width: [i32; 2],
    pub result_left: i32,
    pub text_color: Color,
    pub mark_color: Color,
    pub mark_padding: i32,
    task_text: String,
    result_text: String,
}

impl EquationLayout {
    pub fn compute(task: &Task, surface: &impl Surface) -> Self {
        let font = EQUATION_FONT;
        let measure = |text: &str| surface.measure_text(text, font) as i32;

        let task_text = format!("{} + {} = ", task.a, task.b);
        let result_text = task.result.to_string();
        let width = measure(&format!("{task_text}{result_text}"));
        let left = (surface.width() - width) / 2;

        Self {
            font_size: font,
            left,
            top: EQUATION_TOP,
            width,
            op_left: [left, left + measure(&format!("{} + ", task.a))],
            op_width: [measure(&task.a.to_string()), measure(&task.b.to_string())],
            result_left: left + measure(&task_text),
            text_color: TEXT_COLOR,
            mark_color: MARK_COLOR,
            mark_padding: MARK_PADDING,
            task_text,
            result_text,
        }
    }

    /// Region wiped before each redraw, mark padding included.
    pub fn bounds(&self) -> PxRect {
        PxRect::new(
            self.left - self.mark_padding,
            self.top,
            self.width + 2 * self.mark_padding,
            self.font_size,
        )
    }

    fn mark_rect(&self, operand: Operand) -> PxRect {
        let i = operand.slot();
        PxRect::new(
            self.op_left[i] - self.mark_padding,
            self.top,
            self.op_width[i] + 2 * self.mark_padding,
            self.font_size,
        )
    }

    fn text_style(&self) -> TextStyle {
        TextStyle {
            font_size: self.font_size,
            align: Align::Left,
            color: self.text_color,
        }
    }
}

/// Where the ruler sprite landed on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpritePlacement {
    pub left: i32,
    pub top: i32,
}

impl SpritePlacement {
    /// Centred horizontally, `RULER_MARGIN` above the bottom edge.
    pub fn for_surface(sprite: &RulerSprite, width: i32, height: i32) -> Self {
        Self {
            left: (width - sprite.width) / 2,
            top: height - sprite.height - RULER_MARGIN,
        }
    }

    pub fn mark_x(&self, sprite: &RulerSprite, value: i32) -> i32 {
        self.left + sprite.zero_offset + value * sprite.step
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrowLayout {
    pub value: i32,
    pub left: i32,
    pub right: i32,
    pub center: i32,
    pub control: i32,
    pub bottom: i32,
    pub top: i32,
    pub cap_width: i32,
    pub cap_length: i32,
    pub stroke: Stroke,
    pub font_size: i32,
    pub value_gap: i32,
}

impl ArrowLayout {
    /// Pure function of the two ruler values and where the ruler sits.
    pub fn compute(start: i32, end: i32, placement: SpritePlacement, sprite: &RulerSprite) -> Self {
        let left = placement.mark_x(sprite, start);
        let right = placement.mark_x(sprite, end);
        let control = (right - left) / CONTROL_FRACTION;
        let bottom = placement.top + ARROW_BASE;
        let top = (f64::from(bottom - control) + f64::from(end - start) * APEX_CORRECTION) as i32;

        Self {
            value: end - start,
            left,
            right,
            center: (left + right) / 2,
            control,
            bottom,
            top,
            cap_width: CAP_WIDTH,
            cap_length: CAP_LENGTH,
            stroke: Stroke {
                color: ARROW_COLOR,
                line_width: ARROW_LINE_WIDTH,
            },
            font_size: ARROW_FONT,
            value_gap: VALUE_GAP,
        }
    }

    pub fn path(&self) -> Vec<Segment> {
        let (l, r, b, c) = (self.left, self.right, self.bottom, self.control);
        vec![
            Segment::MoveTo(Point::new(l, b)),
            Segment::CubicTo(
                Point::new(l + c, b - c),
                Point::new(r - c, b - c),
                Point::new(r, b),
            ),
            Segment::MoveTo(Point::new(r - self.cap_width, b - self.cap_length)),
            Segment::LineTo(Point::new(r, b)),
            Segment::LineTo(Point::new(r - self.cap_length, b - self.cap_width)),
        ]
    }

    /// Top of the value label, which is also where the operand field goes.
    pub fn label_top(&self) -> i32 {
        self.top - self.value_gap - self.font_size
    }
}

pub struct View<S: Surface> {
    surface: S,
    equation: EquationLayout,
    arrows: [ArrowLayout; 2],
}

impl<S: Surface> View<S> {
    /// Sizes the surface to `container` (in terminal cells), draws the ruler
    /// and fixes every layout for the rest of the session.
    pub fn init(task: &Task, mut surface: S, container: Size) -> Self {
        let width = i32::from(container.width) * CELL_WIDTH;
        let height = i32::from(container.height) * CELL_HEIGHT;
        surface.resize(width, height);

        let equation = EquationLayout::compute(task, &surface);

        let sprite = SpritePlacement::for_surface(&RULER, width, height);
        surface.draw_image(Sprite::Ruler, sprite.left, sprite.top);

        let arrows = [
            ArrowLayout::compute(0, task.a, sprite, &RULER),
            ArrowLayout::compute(task.a, task.result, sprite, &RULER),
        ];

        if sprite.left < 0 || arrows[0].label_top().min(arrows[1].label_top()) < equation.top + equation.font_size {
            warn!(width, height, "surface is too small, parts of the exercise will be clipped");
        }
        debug!(?equation, ?sprite, "view initialised");

        Self {
            surface,
            equation,
            arrows,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(test)]
    pub fn equation(&self) -> &EquationLayout {
        &self.equation
    }

    #[cfg(test)]
    pub fn arrow(&self, operand: Operand) -> &ArrowLayout {
        &self.arrows[operand.slot()]
    }

    pub fn draw_task(&mut self, options: DrawOptions) {
        let eq = &self.equation;
        self.surface.clear_rect(eq.bounds());
        if let Some(operand) = options.mark {
            self.surface.fill_rect(eq.mark_rect(operand), eq.mark_color);
        }
        let style = eq.text_style();
        self.surface.fill_text(&eq.task_text, eq.left, eq.top, style);
        let tail = if options.solved {
            eq.result_text.as_str()
        } else {
            PLACEHOLDER
        };
        self.surface.fill_text(tail, eq.result_left, eq.top, style);
    }

    /// Strokes the arrow and writes its value above it. Drawing is additive.
    pub fn draw_arrow(&mut self, operand: Operand) {
        let arrow = &self.arrows[operand.slot()];
        self.surface.stroke_path(&arrow.path(), arrow.stroke);
        self.surface.fill_text(
            &arrow.value.to_string(),
            arrow.center,
            arrow.label_top(),
            TextStyle {
                font_size: arrow.font_size,
                align: Align::Center,
                color: TEXT_COLOR,
            },
        );
    }

    /// A fresh one-character field over the arrow's label slot.
    pub fn draw_input(&self, operand: Operand) -> InputField {
        let arrow = &self.arrows[operand.slot()];
        InputField::new(InputGeometry {
            left: arrow.center - arrow.font_size / 2,
            top: arrow.label_top(),
            width: arrow.font_size,
            font_size: arrow.font_size,
            align: Align::Center,
            max_len: OPERAND_INPUT_LEN,
        })
    }

    /// A fresh two-character field where the placeholder sits.
    pub fn draw_result_input(&self) -> InputField {
        let eq = &self.equation;
        InputField::new(InputGeometry {
            left: eq.result_left,
            top: eq.top,
            width: 2 * eq.font_size,
            font_size: eq.font_size,
            align: Align::Left,
            max_len: RESULT_INPUT_LEN,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Canvas, DrawCmd};

    fn view(task: Task) -> View<Canvas> {
        View::init(&task, Canvas::new(), Size::new(80, 20))
    }

    #[test]
    fn equation_is_centred_and_measured() {
        let v = view(Task::new(3, 4));
        let eq = v.equation();
        // "3 + 4 = 7" is 9 glyphs of 24px on a 960px surface
        assert_eq!(eq.width, 216);
        assert_eq!(eq.left, 372);
        assert_eq!(eq.op_left, [372, 372 + 96]);
        assert_eq!(eq.op_width, [24, 24]);
        assert_eq!(eq.result_left, 372 + 192);
    }

    #[test]
    fn equation_box_bounds_every_part() {
        for (a, b) in [(3, 4), (9, 5), (6, 8), (1, 1)] {
            let task = Task::new(a, b);
            let v = view(task);
            let eq = v.equation();
            let right = eq.left + eq.width;
            for i in 0..2 {
                assert!(eq.op_left[i] >= eq.left);
                assert!(eq.op_left[i] + eq.op_width[i] <= right);
            }
            assert!(eq.result_left >= eq.op_left[1] + eq.op_width[1]);
            let result_width = v.surface().measure_text(&task.result.to_string(), eq.font_size) as i32;
            assert!(eq.result_left + result_width <= right);
            assert!(eq.bounds().contains(&PxRect::new(eq.left, eq.top, eq.width, eq.font_size)));
        }
    }

    #[test]
    fn arrow_layout_follows_the_ruler() {
        let placement = SpritePlacement { left: 42, top: 357 };
        let arrow = ArrowLayout::compute(0, 8, placement, &RULER);
        assert_eq!(arrow.left, 42 + 35);
        assert_eq!(arrow.right, 42 + 35 + 8 * 39);
        assert_eq!(arrow.center, (arrow.left + arrow.right) / 2);
        assert_eq!(arrow.control, 312 / 4);
        assert_eq!(arrow.bottom, 377);
        // 377 - 78 + 8 * 22 / 9 = 318.55..
        assert_eq!(arrow.top, 318);
        assert_eq!(arrow.value, 8);
    }

    #[test]
    fn arrow_layout_is_deterministic() {
        let placement = SpritePlacement { left: 10, top: 200 };
        for (start, end) in [(0, 3), (3, 7), (9, 14)] {
            assert_eq!(
                ArrowLayout::compute(start, end, placement, &RULER),
                ArrowLayout::compute(start, end, placement, &RULER)
            );
        }
    }

    #[test]
    fn second_arrow_starts_where_the_first_ends() {
        let v = view(Task::new(6, 7));
        assert_eq!(v.arrow(Operand::First).right, v.arrow(Operand::Second).left);
        assert_eq!(v.arrow(Operand::Second).value, 7);
    }

    #[test]
    fn init_draws_only_the_ruler() {
        let v = view(Task::new(3, 4));
        let cmds = v.surface().commands();
        // 960x480 surface
        let placement = SpritePlacement::for_surface(&RULER, 960, 480);
        assert_eq!(placement, SpritePlacement { left: 42, top: 377 });
        assert_eq!(cmds.len(), 1);
        assert_eq!(
            cmds[0],
            DrawCmd::Image {
                sprite: Sprite::Ruler,
                x: placement.left,
                y: placement.top,
            }
        );
    }

    #[test]
    fn unsolved_task_shows_placeholder() {
        let mut v = view(Task::new(3, 4));
        v.draw_task(DrawOptions::default());
        let bounds = v.equation().bounds();
        assert_eq!(v.surface().texts_in(bounds), vec!["3 + 4 = ", "?"]);
        assert!(v.surface().fills_in(bounds).is_empty());
    }

    #[test]
    fn solved_task_shows_result() {
        let mut v = view(Task::new(3, 4));
        v.draw_task(DrawOptions::default());
        v.draw_task(DrawOptions::solved());
        let bounds = v.equation().bounds();
        assert_eq!(v.surface().texts_in(bounds), vec!["3 + 4 = ", "7"]);
    }

    #[test]
    fn mark_is_drawn_under_the_operand_and_cleared_on_redraw() {
        let mut v = view(Task::new(3, 4));
        v.draw_task(DrawOptions::marked(Some(Operand::Second)));
        let bounds = v.equation().bounds();
        let fills = v.surface().fills_in(bounds);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].x, v.equation().op_left[1] - MARK_PADDING);
        assert_eq!(fills[0].width, v.equation().op_width[1] + 2 * MARK_PADDING);

        v.draw_task(DrawOptions::default());
        assert!(v.surface().fills_in(bounds).is_empty());
        assert_eq!(v.surface().texts_in(bounds).len(), 2);
    }

    #[test]
    fn arrow_draws_curve_and_label() {
        let mut v = view(Task::new(3, 4));
        v.draw_arrow(Operand::Second);
        assert_eq!(v.surface().path_count(), 1);
        let arrow = v.arrow(Operand::Second).clone();
        let label = PxRect::new(arrow.left, arrow.label_top(), arrow.right - arrow.left, arrow.font_size);
        assert_eq!(v.surface().texts_in(label), vec!["4"]);
    }

    #[test]
    fn arrow_label_uses_equation_text_colour() {
        let mut v = view(Task::new(3, 4));
        v.draw_arrow(Operand::First);
        let label_color = v.surface().commands().iter().find_map(|cmd| match cmd {
            DrawCmd::Text { text, style, .. } if text == "3" => Some(style.color),
            _ => None,
        });
        assert_eq!(label_color, Some(TEXT_COLOR));
        assert_ne!(label_color, Some(ARROW_COLOR));
    }

    #[test]
    fn inputs_sit_on_their_slots() {
        let v = view(Task::new(3, 4));
        let arrow = v.arrow(Operand::First).clone();
        let input = v.draw_input(Operand::First);
        assert_eq!(input.geometry().left, arrow.center - 18);
        assert_eq!(input.geometry().top, arrow.label_top());
        assert_eq!(input.geometry().max_len, 1);

        let result = v.draw_result_input();
        assert_eq!(result.geometry().left, v.equation().result_left);
        assert_eq!(result.geometry().top, v.equation().top);
        assert_eq!(result.geometry().max_len, 2);
        assert_eq!(result.value(), "");
    }
}
