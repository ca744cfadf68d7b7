use ratatui::prelude::*;

use crate::surface::{
    text_width, Align, Canvas, DrawCmd, Point, PxRect, Segment, Sprite, TextStyle, CELL_HEIGHT,
    CELL_WIDTH, RULER,
};

pub type Grid = Vec<Vec<(char, Style)>>;

pub const BACKGROUND: Color = Color::Rgb(12, 12, 22);
const RULER_COLOR: Color = Color::Rgb(140, 140, 170);
const RULER_LABEL_FONT: i32 = 24;
const RULER_LINE_OFFSET: i32 = 44;
const RULER_LABEL_OFFSET: i32 = 56;
const BOLD_FONT: i32 = 40;

#[derive(Clone, Copy)]
struct Cell {
    symbol: char,
    style: Style,
    dots: u8,
}

impl Cell {
    fn blank() -> Self {
        Self {
            symbol: ' ',
            style: Style::default().bg(BACKGROUND),
            dots: 0,
        }
    }
}

/// Terminal-cell image of a canvas.
pub struct Raster {
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Cell>>,
}

impl Raster {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![vec![Cell::blank(); cols]; rows],
        }
    }

    pub fn from_canvas(canvas: &Canvas, cols: usize, rows: usize) -> Self {
        let mut raster = Self::new(cols, rows);
        for cmd in canvas.commands() {
            raster.apply(cmd);
        }
        raster
    }

    pub fn into_grid(self) -> Grid {
        self.cells
            .into_iter()
            .map(|row| row.into_iter().map(|c| (c.symbol, c.style)).collect())
            .collect()
    }

    fn apply(&mut self, cmd: &DrawCmd) {
        match cmd {
            DrawCmd::Clear(rect) => {
                self.for_cells(*rect, |cell| *cell = Cell::blank());
            }
            DrawCmd::Fill { rect, color } => {
                let color = *color;
                self.for_cells(*rect, |cell| {
                    *cell = Cell {
                        symbol: ' ',
                        style: Style::default().bg(color),
                        dots: 0,
                    }
                });
            }
            DrawCmd::Text { text, x, y, style } => {
                let mut fg = Style::default().fg(style.color);
                if style.font_size >= BOLD_FONT {
                    fg = fg.add_modifier(Modifier::BOLD);
                }
                self.text(text, *x, *y, *style, fg);
            }
            DrawCmd::Path { segments, stroke } => {
                let style = Style::default().fg(stroke.color);
                for p in flatten(segments) {
                    self.dot(p, style);
                }
            }
            DrawCmd::Image { sprite, x, y } => match sprite {
                Sprite::Ruler => self.ruler(*x, *y),
            },
        }
    }

    fn cell_at(&mut self, px: f64, py: f64) -> Option<&mut Cell> {
        if px < 0.0 || py < 0.0 {
            return None;
        }
        let col = (px / CELL_WIDTH as f64) as usize;
        let row = (py / CELL_HEIGHT as f64) as usize;
        self.cells.get_mut(row)?.get_mut(col)
    }

    /// Every cell the rectangle overlaps.
    fn for_cells(&mut self, rect: PxRect, mut f: impl FnMut(&mut Cell)) {
        if rect.width <= 0 || rect.height <= 0 {
            return;
        }
        let col0 = rect.x.max(0) / CELL_WIDTH;
        let row0 = rect.y.max(0) / CELL_HEIGHT;
        let col1 = (rect.right() + CELL_WIDTH - 1) / CELL_WIDTH;
        let row1 = (rect.bottom() + CELL_HEIGHT - 1) / CELL_HEIGHT;
        for row in row0.max(0) as usize..(row1.max(0) as usize).min(self.rows) {
            for col in col0.max(0) as usize..(col1.max(0) as usize).min(self.cols) {
                f(&mut self.cells[row][col]);
            }
        }
    }

    /// Places one glyph per advance, centred in its slot, on the row through
    /// the middle of the font box. Keeps whatever background is underneath.
    pub fn text(&mut self, text: &str, x: i32, y: i32, style: TextStyle, glyph: Style) {
        let advance = text_width("0", style.font_size);
        let start = match style.align {
            Align::Left => x as f64,
            Align::Center => x as f64 - text_width(text, style.font_size) / 2.0,
        };
        let mid = (y + style.font_size / 2) as f64;
        for (i, ch) in text.chars().enumerate() {
            let cx = start + advance * i as f64 + advance / 2.0;
            if let Some(cell) = self.cell_at(cx, mid) {
                cell.symbol = ch;
                cell.dots = 0;
                cell.style = cell.style.patch(glyph);
            }
        }
    }

    /// Blanks the cells under `rect` and restyles them, like an opaque widget.
    pub fn cover(&mut self, rect: PxRect, style: Style) {
        self.for_cells(rect, |cell| {
            cell.symbol = ' ';
            cell.dots = 0;
            cell.style = cell.style.patch(style);
        });
    }

    /// Strokes land on a 2x4 braille sub-grid per cell.
    fn dot(&mut self, p: Point, style: Style) {
        if p.x < 0.0 || p.y < 0.0 {
            return;
        }
        let dx = (p.x * 2.0 / CELL_WIDTH as f64) as usize;
        let dy = (p.y * 4.0 / CELL_HEIGHT as f64) as usize;
        let bit = match (dx % 2, dy % 4) {
            (0, 0) => 0x01,
            (0, 1) => 0x02,
            (0, 2) => 0x04,
            (1, 0) => 0x08,
            (1, 1) => 0x10,
            (1, 2) => 0x20,
            (0, _) => 0x40,
            _ => 0x80,
        };
        let Some(cell) = self.cells.get_mut(dy / 4).and_then(|r| r.get_mut(dx / 2)) else {
            return;
        };
        cell.dots |= bit;
        cell.symbol = char::from_u32(0x2800 + u32::from(cell.dots)).unwrap_or('•');
        cell.style = cell.style.patch(style);
    }

    fn ruler(&mut self, x: i32, y: i32) {
        let line_y = y + RULER_LINE_OFFSET;
        let first = x + RULER.zero_offset;
        let last = first + RULER.last_mark * RULER.step;
        let line = Style::default().fg(RULER_COLOR);

        let mut px = first;
        while px <= last {
            if let Some(cell) = self.cell_at(px as f64, line_y as f64) {
                cell.symbol = '─';
                cell.dots = 0;
                cell.style = cell.style.patch(line);
            }
            px += CELL_WIDTH / 2;
        }

        let label = TextStyle {
            font_size: RULER_LABEL_FONT,
            align: Align::Center,
            color: RULER_COLOR,
        };
        for mark in 0..=RULER.last_mark {
            let mx = first + mark * RULER.step;
            if let Some(cell) = self.cell_at(mx as f64, line_y as f64) {
                cell.symbol = '┼';
            }
            self.text(&mark.to_string(), mx, y + RULER_LABEL_OFFSET, label, line);
        }
    }
}

/// Samples a path densely enough that consecutive points are under one
/// braille dot apart.
fn flatten(segments: &[Segment]) -> Vec<Point> {
    let mut points = Vec::new();
    let mut at = Point { x: 0.0, y: 0.0 };
    for seg in segments {
        match *seg {
            Segment::MoveTo(p) => at = p,
            Segment::LineTo(p) => {
                let steps = steps_for(dist(at, p));
                for i in 0..=steps {
                    let t = i as f64 / steps as f64;
                    points.push(Point {
                        x: at.x + (p.x - at.x) * t,
                        y: at.y + (p.y - at.y) * t,
                    });
                }
                at = p;
            }
            Segment::CubicTo(c1, c2, p) => {
                let steps = steps_for(dist(at, c1) + dist(c1, c2) + dist(c2, p));
                for i in 0..=steps {
                    points.push(cubic(at, c1, c2, p, i as f64 / steps as f64));
                }
                at = p;
            }
        }
    }
    points
}

fn steps_for(length: f64) -> usize {
    ((length / 2.0).ceil() as usize).max(1)
}

fn dist(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

fn cubic(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    Point {
        x: a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        y: a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    }
}
