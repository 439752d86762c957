use thiserror::Error;

use crate::types::{Rgb, Viewport};

pub const FRAME_HZ: f64 = 60.0;

pub const NUM_BODIES: usize = 10;
pub const MIN_RADIUS: f64 = 6.0;
pub const MAX_RADIUS: f64 = 14.0;
pub const MOVE_AMOUNT: f64 = 1.0;
pub const SPEED_MULTIPLIER: f64 = 4.0;
pub const FADE_SPEED: f64 = 0.01;

pub const BROAD_PHASE_THRESHOLD: usize = 32;

pub const DARKER_FACTOR: f64 = 0.5;
pub const LIGHTER_FACTOR: f64 = 1.5;

pub const EXIT_DELAY_SECS: f64 = 2.0;
pub const MIN_POINTER_DISTANCE: u16 = 2;

pub const PALETTE: [Rgb; 14] = [
    Rgb::new(255, 0, 0),     // red
    Rgb::new(255, 165, 0),   // orange
    Rgb::new(255, 255, 0),   // yellow
    Rgb::new(0, 128, 0),     // green
    Rgb::new(0, 0, 255),     // blue
    Rgb::new(128, 0, 128),   // purple
    Rgb::new(255, 192, 203), // pink
    Rgb::new(0, 255, 255),   // cyan
    Rgb::new(0, 255, 255),   // aqua
    Rgb::new(255, 0, 255),   // magenta
    Rgb::new(255, 215, 0),   // gold
    Rgb::new(0, 255, 0),     // lime
    Rgb::new(64, 224, 208),  // turquoise
    Rgb::new(255, 255, 255), // white
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("palette needs at least 2 colors, got {0}")]
    PaletteTooSmall(usize),
    #[error("body radius must be positive and finite, got {0}")]
    InvalidRadius(f64),
    #[error("radius range is inverted: min {min} > max {max}")]
    InvalidRadiusRange { min: f64, max: f64 },
    #[error("label must have text and positive finite extents")]
    InvalidLabel,
    #[error("{name} must be finite and {requirement}, got {value}")]
    InvalidParameter {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },
    #[error(
        "viewport {width}x{height} is smaller than the largest body ({needed_x}x{needed_y})"
    )]
    ViewportTooSmall {
        width: f64,
        height: f64,
        needed_x: f64,
        needed_y: f64,
    },
}

/// How per-step increments relate to elapsed time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pacing {
    /// Fixed increments every step; visual speed follows the frame rate.
    PerFrame,
    /// Increments scaled by `dt * reference_hz`.
    WallClock { reference_hz: f64 },
}

impl Pacing {
    pub fn scale(self, dt_secs: f64) -> f64 {
        match self {
            Pacing::PerFrame => 1.0,
            Pacing::WallClock { reference_hz } => dt_secs * reference_hz,
        }
    }
}

/// A text body, already measured by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSpec {
    pub text: String,
    pub half_width: f64,
    pub half_height: f64,
}

/// Everything the simulation needs at construction. Never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub palette: Vec<Rgb>,
    pub body_count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    pub move_amount: f64,
    pub speed_multiplier: f64,
    pub fade_speed: f64,
    pub pacing: Pacing,
    pub label: Option<LabelSpec>,
    pub broad_phase_threshold: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            palette: PALETTE.to_vec(),
            body_count: NUM_BODIES,
            min_radius: MIN_RADIUS,
            max_radius: MAX_RADIUS,
            move_amount: MOVE_AMOUNT,
            speed_multiplier: SPEED_MULTIPLIER,
            fade_speed: FADE_SPEED,
            pacing: Pacing::PerFrame,
            label: None,
            broad_phase_threshold: BROAD_PHASE_THRESHOLD,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.len() < 2 {
            return Err(ConfigError::PaletteTooSmall(self.palette.len()));
        }
        for radius in [self.min_radius, self.max_radius] {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ConfigError::InvalidRadius(radius));
            }
        }
        if self.min_radius > self.max_radius {
            return Err(ConfigError::InvalidRadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        check_param("move_amount", self.move_amount, "non-negative", |v| v >= 0.0)?;
        check_param("speed_multiplier", self.speed_multiplier, "non-negative", |v| {
            v >= 0.0
        })?;
        check_param("fade_speed", self.fade_speed, "positive", |v| v > 0.0)?;
        if let Pacing::WallClock { reference_hz } = self.pacing {
            check_param("reference_hz", reference_hz, "positive", |v| v > 0.0)?;
        }
        if let Some(label) = &self.label {
            let extents_ok = [label.half_width, label.half_height]
                .iter()
                .all(|v| v.is_finite() && *v > 0.0);
            if label.text.is_empty() || !extents_ok {
                return Err(ConfigError::InvalidLabel);
            }
        }
        Ok(())
    }

    /// Largest half extent any body may have along each axis.
    pub fn max_half_extents(&self) -> (f64, f64) {
        let mut x = if self.body_count > 0 { self.max_radius } else { 0.0 };
        let mut y = x;
        if let Some(label) = &self.label {
            x = x.max(label.half_width);
            y = y.max(label.half_height);
        }
        (x, y)
    }

    pub fn fits(&self, viewport: Viewport) -> bool {
        let (x, y) = self.max_half_extents();
        viewport.contains_extents(x, y)
    }

    /// Validates the config and checks that every body can fit in `viewport`.
    pub fn validate_for(&self, viewport: Viewport) -> Result<(), ConfigError> {
        self.validate()?;
        if !self.fits(viewport) {
            let (x, y) = self.max_half_extents();
            return Err(ConfigError::ViewportTooSmall {
                width: viewport.width,
                height: viewport.height,
                needed_x: 2.0 * x,
                needed_y: 2.0 * y,
            });
        }
        Ok(())
    }
}

fn check_param(
    name: &'static str,
    value: f64,
    requirement: &'static str,
    ok: impl Fn(f64) -> bool,
) -> Result<(), ConfigError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            requirement,
            value,
        })
    }
}
