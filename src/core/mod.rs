pub mod body;
pub mod bounds;
pub mod collision;
pub mod color;

use std::time::Duration;

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, trace};

use crate::{
    config::{ConfigError, SimConfig},
    types::{BodySnapshot, Viewport},
};

use self::{
    body::{Body, spawn_circle, spawn_label},
    collision::CollisionResolver,
    color::Palette,
};

/// Per-frame input from the host.
#[derive(Clone, Copy, Debug)]
pub struct StepContext {
    pub viewport: Viewport,
    /// Time since the previous step. Only consulted by wall-clock pacing.
    pub dt: Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub bodies: usize,
    pub collisions: usize,
    pub wall_hits: usize,
}

pub struct Simulation {
    config: SimConfig,
    palette: Palette,
    bodies: Vec<Body>,
    viewport: Viewport,
    resolver: CollisionResolver,
    rng: StdRng,
    stats: FrameStats,
}

impl Simulation {
    pub fn new(config: SimConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        Self::with_rng(config, viewport, StdRng::from_entropy())
    }

    pub fn with_seed(config: SimConfig, viewport: Viewport, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, viewport, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimConfig, viewport: Viewport, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate_for(viewport)?;
        let palette = Palette::new(config.palette.clone())?;
        let resolver = CollisionResolver::new(config.broad_phase_threshold);
        let mut sim = Self {
            config,
            palette,
            bodies: Vec::new(),
            viewport,
            resolver,
            rng,
            stats: FrameStats::default(),
        };
        sim.spawn_bodies();
        info!(
            bodies = sim.bodies.len(),
            width = viewport.width,
            height = viewport.height,
            "simulation started"
        );
        Ok(sim)
    }

    /// Builds a simulation around an explicit body set, skipping random
    /// placement.
    #[cfg(test)]
    pub fn from_bodies(
        config: SimConfig,
        viewport: Viewport,
        bodies: Vec<Body>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for body in &bodies {
            check_body(body, viewport)?;
        }
        let palette = Palette::new(config.palette.clone())?;
        let resolver = CollisionResolver::new(config.broad_phase_threshold);
        Ok(Self {
            config,
            palette,
            stats: FrameStats {
                bodies: bodies.len(),
                ..FrameStats::default()
            },
            bodies,
            viewport,
            resolver,
            rng: StdRng::from_entropy(),
        })
    }

    /// Replaces the whole body set with a freshly spawned one for `viewport`.
    pub fn restart(&mut self, viewport: Viewport) -> Result<(), ConfigError> {
        self.config.validate_for(viewport)?;
        self.viewport = viewport;
        self.spawn_bodies();
        info!(
            bodies = self.bodies.len(),
            width = viewport.width,
            height = viewport.height,
            "simulation restarted"
        );
        Ok(())
    }

    fn spawn_bodies(&mut self) {
        let config = &self.config;
        let radius_range = (config.min_radius, config.max_radius);
        let mut bodies = Vec::with_capacity(config.body_count + 1);
        for ordinal in 0..config.body_count {
            let fade = self.palette.phase_for(ordinal);
            bodies.push(spawn_circle(
                &mut self.rng,
                self.viewport,
                radius_range,
                config.move_amount,
                fade,
            ));
        }
        if let Some(label) = &config.label {
            // The label continues the round-robin after the circles.
            let fade = self.palette.phase_for(config.body_count);
            bodies.push(spawn_label(
                &mut self.rng,
                self.viewport,
                label,
                config.move_amount,
                fade,
            ));
        }
        self.bodies = bodies;
        self.stats = FrameStats {
            bodies: self.bodies.len(),
            ..FrameStats::default()
        };
    }

    /// Advances one frame: integrate, reflect, fade, collide, then clamp
    /// everything back inside. The order is observable and must not change.
    pub fn step(&mut self, ctx: StepContext) {
        if ctx.viewport != self.viewport {
            debug!(
                width = ctx.viewport.width,
                height = ctx.viewport.height,
                "viewport changed"
            );
            self.viewport = ctx.viewport;
        }
        let viewport = self.viewport;
        let scale = self.config.pacing.scale(ctx.dt.as_secs_f64());
        let advance = self.config.speed_multiplier * scale;
        let fade = self.config.fade_speed * scale;
        let palette_len = self.palette.len();

        for body in &mut self.bodies {
            body.pos += body.vel * advance;
        }

        let mut wall_hits = 0;
        for body in &mut self.bodies {
            wall_hits += bounds::reflect(body, viewport);
        }

        for body in &mut self.bodies {
            body.fade.advance(fade, palette_len);
        }

        let collisions = self.resolver.resolve(&mut self.bodies);

        for body in &mut self.bodies {
            bounds::contain(body, viewport);
        }

        self.stats = FrameStats {
            frame: self.stats.frame + 1,
            bodies: self.bodies.len(),
            collisions,
            wall_hits,
        };
        trace!(
            frame = self.stats.frame,
            collisions,
            wall_hits,
            "step"
        );
    }

    #[cfg(test)]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Read-only view of every body for drawing.
    pub fn snapshot(&self, out: &mut Vec<BodySnapshot>) {
        out.clear();
        out.extend(self.bodies.iter().map(|b| b.snapshot(&self.palette)));
    }
}

#[cfg(test)]
fn check_body(body: &Body, viewport: Viewport) -> Result<(), ConfigError> {
    use self::body::Shape;
    use crate::types::Extent;

    let (hx, hy) = (body.half_extent_x(), body.half_extent_y());
    if ![hx, hy].iter().all(|v| v.is_finite() && *v > 0.0) {
        return Err(match &body.shape {
            Shape::Circle(circle) => ConfigError::InvalidRadius(circle.radius),
            Shape::Label(_) => ConfigError::InvalidLabel,
        });
    }
    if !viewport.contains_extents(hx, hy) {
        return Err(ConfigError::ViewportTooSmall {
            width: viewport.width,
            height: viewport.height,
            needed_x: 2.0 * hx,
            needed_y: 2.0 * hy,
        });
    }
    Ok(())
}
