//! Logical-pixel drawing surface.
//!
//! The view lays everything out in pixels, the way a 2D canvas would, and
//! the terminal renderer maps pixels onto cells afterwards. `Canvas` keeps
//! the drawing as an ordered list of commands so it can be replayed at any
//! terminal size and inspected in tests.

use ratatui::style::Color;

/// Logical pixels per terminal cell.
pub const CELL_WIDTH: i32 = 12;
pub const CELL_HEIGHT: i32 = 24;

/// Horizontal advance of one glyph, as a fraction of the font size.
/// Monospace, so measured text and placed glyphs always agree.
pub const GLYPH_ADVANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PxRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PxRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, other: &PxRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &PxRect) -> bool {
        other.x < self.right()
            && self.x < other.right()
            && other.y < self.bottom()
            && self.y < other.bottom()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x: x as f64,
            y: y as f64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
}

impl Segment {
    fn points(&self) -> impl Iterator<Item = Point> {
        let pts: [Option<Point>; 3] = match *self {
            Segment::MoveTo(p) | Segment::LineTo(p) => [Some(p), None, None],
            Segment::CubicTo(c1, c2, p) => [Some(c1), Some(c2), Some(p)],
        };
        pts.into_iter().flatten()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Text is always laid out with a top baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: i32,
    pub align: Align,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub line_width: i32,
}

/// Pixel geometry of the number-line sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RulerSprite {
    pub width: i32,
    pub height: i32,
    /// Offset from the sprite's left edge to the "0" mark.
    pub zero_offset: i32,
    /// Distance between neighbouring marks.
    pub step: i32,
    pub last_mark: i32,
}

pub const RULER: RulerSprite = RulerSprite {
    width: 875,
    height: 83,
    zero_offset: 35,
    step: 39,
    last_mark: 20,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sprite {
    Ruler,
}

impl Sprite {
    pub fn size(&self) -> (i32, i32) {
        match self {
            Sprite::Ruler => (RULER.width, RULER.height),
        }
    }
}

pub trait Surface {
    fn resize(&mut self, width: i32, height: i32);
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn clear_rect(&mut self, rect: PxRect);
    fn fill_rect(&mut self, rect: PxRect, color: Color);
    fn fill_text(&mut self, text: &str, x: i32, y: i32, style: TextStyle);
    fn stroke_path(&mut self, path: &[Segment], stroke: Stroke);
    fn measure_text(&self, text: &str, font_size: i32) -> f64;
    fn draw_image(&mut self, sprite: Sprite, x: i32, y: i32);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    Clear(PxRect),
    Fill {
        rect: PxRect,
        color: Color,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        style: TextStyle,
    },
    Path {
        segments: Vec<Segment>,
        stroke: Stroke,
    },
    Image {
        sprite: Sprite,
        x: i32,
        y: i32,
    },
}

pub fn text_width(text: &str, font_size: i32) -> f64 {
    text.chars().count() as f64 * font_size as f64 * GLYPH_ADVANCE
}

impl DrawCmd {
    pub fn bounds(&self) -> PxRect {
        match self {
            DrawCmd::Clear(rect) | DrawCmd::Fill { rect, .. } => *rect,
            DrawCmd::Text { text, x, y, style } => {
                let width = text_width(text, style.font_size).ceil() as i32;
                let left = match style.align {
                    Align::Left => *x,
                    Align::Center => *x - width / 2,
                };
                PxRect::new(left, *y, width, style.font_size)
            }
            DrawCmd::Path { segments, stroke } => {
                // Control points bound a cubic, so the hull of all points is enough.
                let mut min = (f64::MAX, f64::MAX);
                let mut max = (f64::MIN, f64::MIN);
                for p in segments.iter().flat_map(|s| s.points()) {
                    min = (min.0.min(p.x), min.1.min(p.y));
                    max = (max.0.max(p.x), max.1.max(p.y));
                }
                if min.0 > max.0 {
                    return PxRect::default();
                }
                let pad = stroke.line_width;
                let x = min.0.floor() as i32 - pad;
                let y = min.1.floor() as i32 - pad;
                PxRect::new(
                    x,
                    y,
                    max.0.ceil() as i32 + pad - x,
                    max.1.ceil() as i32 + pad - y,
                )
            }
            DrawCmd::Image { sprite, x, y } => {
                let (w, h) = sprite.size();
                PxRect::new(*x, *y, w, h)
            }
        }
    }
}

/// Retained-mode surface: commands are kept in draw order.
#[derive(Clone, Debug, Default)]
pub struct Canvas {
    width: i32,
    height: i32,
    commands: Vec<DrawCmd>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }
}

#[cfg(test)]
impl Canvas {
    /// Text drawn inside `area`, in draw order.
    pub fn texts_in(&self, area: PxRect) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Text { text, .. } if area.contains(&cmd.bounds()) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fills_in(&self, area: PxRect) -> Vec<PxRect> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Fill { rect, .. } if area.intersects(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn path_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCmd::Path { .. }))
            .count()
    }
}

impl Surface for Canvas {
    fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.commands.clear();
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn clear_rect(&mut self, rect: PxRect) {
        self.commands.retain(|cmd| !rect.contains(&cmd.bounds()));
        // Only keep the clear itself if something it overlaps survived.
        if self.commands.iter().any(|cmd| rect.intersects(&cmd.bounds())) {
            self.commands.push(DrawCmd::Clear(rect));
        }
    }

    fn fill_rect(&mut self, rect: PxRect, color: Color) {
        self.commands.push(DrawCmd::Fill { rect, color });
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32, style: TextStyle) {
        self.commands.push(DrawCmd::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }

    fn stroke_path(&mut self, path: &[Segment], stroke: Stroke) {
        self.commands.push(DrawCmd::Path {
            segments: path.to_vec(),
            stroke,
        });
    }

    fn measure_text(&self, text: &str, font_size: i32) -> f64 {
        text_width(text, font_size)
    }

    fn draw_image(&mut self, sprite: Sprite, x: i32, y: i32) {
        self.commands.push(DrawCmd::Image { sprite, x, y });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            font_size: 48,
            align: Align::Left,
            color: Color::White,
        }
    }

    #[test]
    fn measures_monospace() {
        let canvas = Canvas::new();
        assert_eq!(canvas.measure_text("3 + 4 = ", 48), 192.0);
        assert_eq!(canvas.measure_text("", 48), 0.0);
    }

    #[test]
    fn clear_drops_contained_commands() {
        let mut canvas = Canvas::new();
        canvas.resize(960, 480);
        canvas.fill_rect(PxRect::new(10, 10, 20, 20), Color::Yellow);
        canvas.fill_text("7", 12, 10, style());
        canvas.draw_image(Sprite::Ruler, 40, 300);

        canvas.clear_rect(PxRect::new(0, 0, 100, 100));

        assert_eq!(canvas.commands().len(), 1);
        assert!(matches!(canvas.commands()[0], DrawCmd::Image { .. }));
    }

    #[test]
    fn clear_over_partial_overlap_is_recorded() {
        let mut canvas = Canvas::new();
        canvas.resize(960, 480);
        canvas.draw_image(Sprite::Ruler, 40, 300);
        canvas.clear_rect(PxRect::new(0, 290, 100, 40));
        assert_eq!(canvas.commands().len(), 2);
        assert!(matches!(canvas.commands()[1], DrawCmd::Clear(_)));
    }

    #[test]
    fn centered_text_bounds() {
        let cmd = DrawCmd::Text {
            text: "12".into(),
            x: 100,
            y: 5,
            style: TextStyle {
                font_size: 36,
                align: Align::Center,
                color: Color::White,
            },
        };
        assert_eq!(cmd.bounds(), PxRect::new(82, 5, 36, 36));
    }

    #[test]
    fn path_bounds_cover_control_points() {
        let cmd = DrawCmd::Path {
            segments: vec![
                Segment::MoveTo(Point::new(0, 100)),
                Segment::CubicTo(Point::new(25, 75), Point::new(75, 75), Point::new(100, 100)),
            ],
            stroke: Stroke {
                color: Color::Magenta,
                line_width: 2,
            },
        };
        assert_eq!(cmd.bounds(), PxRect::new(-2, 73, 104, 29));
    }
}
