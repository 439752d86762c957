//! User-facing settings: built-in defaults, overridden by an optional YAML
//! file, overridden by command-line flags.
//!
//! ```yaml
//! bodies: 12
//! speed: 3.0
//! fade: 0.02
//! min_radius: 5
//! max_radius: 12
//! message: "I am to misbehave"
//! fill: false
//! wall_clock: false
//! fps: 60
//! palette:
//!   - [255, 0, 0]
//!   - [0, 0, 255]
//! ```

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::{
    config::{self, LabelSpec, Pacing, SimConfig},
    render::{self, DrawStyle},
    types::Rgb,
};

#[derive(Parser, Debug, Default)]
#[command(name = "bouncesaver", about = "Bouncing, color-cycling terminal screensaver")]
pub struct Args {
    /// YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Number of circles
    #[arg(short, long)]
    pub bodies: Option<usize>,
    /// Distance multiplier applied to every step
    #[arg(short, long)]
    pub speed: Option<f64>,
    /// Color fade increment per step
    #[arg(short, long)]
    pub fade: Option<f64>,
    #[arg(long)]
    pub min_radius: Option<f64>,
    #[arg(long)]
    pub max_radius: Option<f64>,
    /// Bouncing text shown alongside the circles
    #[arg(short, long)]
    pub message: Option<String>,
    /// Draw filled circles instead of bevelled outlines
    #[arg(long)]
    pub fill: bool,
    /// Scale motion by elapsed time instead of per frame
    #[arg(long)]
    pub wall_clock: bool,
    /// Target frames per second
    #[arg(long)]
    pub fps: Option<f64>,
    /// Seed for reproducible layouts
    #[arg(long)]
    pub seed: Option<u64>,
    /// Show a stats line at the bottom
    #[arg(long)]
    pub stats: bool,
    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Shape of the YAML settings file. Every key is optional.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub bodies: Option<usize>,
    pub speed: Option<f64>,
    pub fade: Option<f64>,
    pub min_radius: Option<f64>,
    pub max_radius: Option<f64>,
    pub message: Option<String>,
    pub fill: Option<bool>,
    pub wall_clock: Option<bool>,
    pub fps: Option<f64>,
    pub seed: Option<u64>,
    pub palette: Option<Vec<[u8; 3]>>,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open settings file {}", path.display()))?;
        serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }
}

/// Everything the host needs, resolved from all sources.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub sim: SimConfig,
    pub style: DrawStyle,
    pub fps: f64,
    pub seed: Option<u64>,
    pub show_stats: bool,
}

impl Settings {
    pub fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };
        let settings = Self::merge(args, file);
        anyhow::ensure!(
            settings.fps.is_finite() && settings.fps > 0.0,
            "fps must be positive, got {}",
            settings.fps
        );
        Ok(settings)
    }

    pub fn merge(args: &Args, file: FileSettings) -> Self {
        let defaults = SimConfig::default();
        let fps = args.fps.or(file.fps).unwrap_or(config::FRAME_HZ);
        let wall_clock = args.wall_clock || file.wall_clock.unwrap_or(false);
        let pacing = if wall_clock {
            Pacing::WallClock { reference_hz: fps }
        } else {
            Pacing::PerFrame
        };
        let label = args
            .message
            .clone()
            .or(file.message)
            .filter(|text| !text.trim().is_empty())
            .map(|text| {
                let (half_width, half_height) = render::measure_label(&text);
                LabelSpec {
                    text,
                    half_width,
                    half_height,
                }
            });
        let palette = file
            .palette
            .map(|colors| colors.into_iter().map(Rgb::from).collect())
            .unwrap_or(defaults.palette);

        let sim = SimConfig {
            palette,
            body_count: args.bodies.or(file.bodies).unwrap_or(defaults.body_count),
            min_radius: args
                .min_radius
                .or(file.min_radius)
                .unwrap_or(defaults.min_radius),
            max_radius: args
                .max_radius
                .or(file.max_radius)
                .unwrap_or(defaults.max_radius),
            speed_multiplier: args
                .speed
                .or(file.speed)
                .unwrap_or(defaults.speed_multiplier),
            fade_speed: args.fade.or(file.fade).unwrap_or(defaults.fade_speed),
            pacing,
            label,
            ..defaults
        };

        Self {
            sim,
            style: DrawStyle {
                fill: args.fill || file.fill.unwrap_or(false),
            },
            fps,
            seed: args.seed.or(file.seed),
            show_stats: args.stats,
        }
    }
}
