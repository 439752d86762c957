use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::canvas::{Canvas, Circle, Context},
};

use crate::{
    config::{DARKER_FACTOR, LIGHTER_FACTOR},
    types::{BodySnapshot, Rgb, ShapeView, Viewport},
};

/// Braille resolution: each terminal cell holds a 2x4 grid of dots, and one
/// dot is one world unit.
pub const DOTS_PER_CELL_X: f64 = 2.0;
pub const DOTS_PER_CELL_Y: f64 = 4.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStyle {
    pub fill: bool,
}

pub fn viewport_for(area: Rect) -> Viewport {
    Viewport::new(
        area.width as f64 * DOTS_PER_CELL_X,
        area.height as f64 * DOTS_PER_CELL_Y,
    )
}

/// Half extents of a single line of text, in world units.
pub fn measure_label(text: &str) -> (f64, f64) {
    let cells = Line::from(text).width() as f64;
    (cells * DOTS_PER_CELL_X / 2.0, DOTS_PER_CELL_Y / 2.0)
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Outer (darker) and inner (lighter) tones of a bevelled outline.
pub fn bevel(color: Rgb) -> (Rgb, Rgb) {
    (color.scaled(DARKER_FACTOR), color.scaled(LIGHTER_FACTOR))
}

/// Rings to stroke for one circle, outermost first.
pub fn rings(radius: f64, color: Rgb, style: DrawStyle) -> Vec<(f64, Rgb)> {
    if style.fill {
        let mut out = Vec::new();
        let mut r = radius;
        while r > 0.0 {
            out.push((r, color));
            r -= 1.0;
        }
        return out;
    }
    let (outer, inner) = bevel(color);
    let mut out = vec![(radius, outer)];
    if radius > 1.0 {
        out.push((radius - 1.0, inner));
    }
    out
}

pub fn draw_body(ctx: &mut Context, body: &BodySnapshot, style: DrawStyle) {
    match &body.shape {
        ShapeView::Circle { radius } => {
            for (r, color) in rings(*radius, body.color, style) {
                ctx.draw(&Circle {
                    x: body.pos.x,
                    y: body.pos.y,
                    radius: r,
                    color: to_color(color),
                });
            }
        }
        ShapeView::Label { text } => {
            let line = Line::styled(text.clone(), Style::default().fg(to_color(body.color)));
            ctx.print(body.pos.x - body.half_extent.x, body.pos.y, line);
        }
    }
}

pub fn canvas<'a>(
    snapshot: &'a [BodySnapshot],
    viewport: Viewport,
    style: DrawStyle,
) -> Canvas<'a, impl Fn(&mut Context) + 'a> {
    Canvas::default()
        .marker(Marker::Braille)
        .background_color(Color::Black)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(move |ctx| {
            for body in snapshot {
                draw_body(ctx, body, style);
            }
        })
}

#[cfg(test)]
mod tests {
    use ratatui::{buffer::Buffer, widgets::Widget};

    use super::*;
    use crate::types::Vec2;

    mod viewport_for {
        use super::*;

        #[test]
        fn scales_cells_to_braille_dots() {
            let vp = viewport_for(Rect::new(0, 0, 80, 24));
            assert_eq!(vp, Viewport::new(160.0, 96.0));
        }
    }

    mod measure_label {
        use super::*;

        #[test]
        fn half_width_is_one_unit_per_cell() {
            assert_eq!(measure_label("I am to misbehave"), (17.0, 2.0));
        }

        #[test]
        fn wide_glyphs_take_two_cells() {
            assert_eq!(measure_label("卒論"), (4.0, 2.0));
        }
    }

    mod rings {
        use super::*;

        #[test]
        fn outline_is_dark_outer_and_light_inner() {
            let color = Rgb::new(200, 100, 0);
            let out = rings(8.0, color, DrawStyle { fill: false });
            assert_eq!(
                out,
                vec![(8.0, Rgb::new(100, 50, 0)), (7.0, Rgb::new(255, 150, 0))]
            );
        }

        #[test]
        fn tiny_outline_has_single_ring() {
            assert_eq!(rings(1.0, Rgb::new(10, 10, 10), DrawStyle::default()).len(), 1);
        }

        #[test]
        fn fill_steps_down_to_centre() {
            let color = Rgb::new(1, 2, 3);
            let out = rings(3.5, color, DrawStyle { fill: true });
            let radii: Vec<f64> = out.iter().map(|(r, _)| *r).collect();
            assert_eq!(radii, vec![3.5, 2.5, 1.5, 0.5]);
            assert!(out.iter().all(|(_, c)| *c == color));
        }
    }

    mod canvas_fn {
        use super::*;

        fn render(snapshot: &[BodySnapshot], area: Rect) -> Buffer {
            let mut buf = Buffer::empty(area);
            canvas(snapshot, viewport_for(area), DrawStyle::default()).render(area, &mut buf);
            buf
        }

        #[test]
        fn empty_snapshot_leaves_blank_canvas() {
            let buf = render(&[], Rect::new(0, 0, 20, 10));
            assert!(buf.content.iter().all(|cell| cell.symbol() == " "));
        }

        #[test]
        fn circle_marks_cells_in_its_colors() {
            let color = Rgb::new(200, 100, 0);
            let snapshot = vec![BodySnapshot {
                pos: Vec2::new(20.0, 20.0),
                half_extent: Vec2::new(8.0, 8.0),
                color,
                shape: ShapeView::Circle { radius: 8.0 },
            }];
            let buf = render(&snapshot, Rect::new(0, 0, 20, 10));
            let (outer, inner) = bevel(color);
            let marked: Vec<_> = buf
                .content
                .iter()
                .filter(|cell| cell.symbol() != " ")
                .collect();
            assert!(!marked.is_empty());
            assert!(
                marked
                    .iter()
                    .all(|cell| cell.fg == to_color(outer) || cell.fg == to_color(inner))
            );
        }

        #[test]
        fn label_text_is_printed() {
            let snapshot = vec![BodySnapshot {
                pos: Vec2::new(20.0, 20.0),
                half_extent: Vec2::new(2.0, 2.0),
                color: Rgb::new(255, 0, 0),
                shape: ShapeView::Label { text: "hi".into() },
            }];
            let buf = render(&snapshot, Rect::new(0, 0, 20, 10));
            let printed: String = buf
                .content
                .iter()
                .map(|cell| cell.symbol())
                .filter(|s| *s != " ")
                .collect();
            assert_eq!(printed, "hi");
        }
    }
}
