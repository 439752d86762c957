use crate::{
    core::body::Body,
    types::{Extent, Viewport},
};

/// Corrected position when the body touches an edge on this axis.
fn reflect_axis(pos: f64, extent: f64, dimension: f64) -> Option<f64> {
    if pos - extent <= 0.0 {
        Some(extent)
    } else if pos + extent >= dimension {
        Some(dimension - extent)
    } else {
        None
    }
}

/// Clamps the body inside the viewport and flips the velocity component of
/// every axis that touched an edge. Returns the number of axes that bounced.
pub fn reflect(body: &mut Body, viewport: Viewport) -> usize {
    let mut bounced = 0;
    if let Some(x) = reflect_axis(body.pos.x, body.half_extent_x(), viewport.width) {
        body.pos.x = x;
        body.vel.x = -body.vel.x;
        bounced += 1;
    }
    if let Some(y) = reflect_axis(body.pos.y, body.half_extent_y(), viewport.height) {
        body.pos.y = y;
        body.vel.y = -body.vel.y;
        bounced += 1;
    }
    bounced
}

/// Position-only clamp into `[extent, dimension - extent]`. Velocity is left
/// alone. When the viewport is narrower than the body the low edge wins.
pub fn contain(body: &mut Body, viewport: Viewport) {
    body.pos.x = clamp_axis(body.pos.x, body.half_extent_x(), viewport.width);
    body.pos.y = clamp_axis(body.pos.y, body.half_extent_y(), viewport.height);
}

fn clamp_axis(pos: f64, extent: f64, dimension: f64) -> f64 {
    pos.min(dimension - extent).max(extent)
}
