use crate::{config::ConfigError, types::Rgb};

/// Ordered, fixed set of colors that bodies fade through.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self, ConfigError> {
        if colors.len() < 2 {
            return Err(ConfigError::PaletteTooSmall(colors.len()));
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Starting phase for the body with the given ordinal, staggered round-robin.
    pub fn phase_for(&self, ordinal: usize) -> FadePhase {
        let current = ordinal % self.colors.len();
        FadePhase {
            current,
            next: (current + 1) % self.colors.len(),
            t: 0.0,
        }
    }

    pub fn color(&self, phase: &FadePhase) -> Rgb {
        lerp(self.colors[phase.current], self.colors[phase.next], phase.t)
    }
}

/// Position in the color cycle: fading from `current` towards `next`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadePhase {
    current: usize,
    next: usize,
    t: f64,
}

impl FadePhase {
    #[cfg(test)]
    pub fn current(&self) -> usize {
        self.current
    }

    #[cfg(test)]
    pub fn next(&self) -> usize {
        self.next
    }

    #[cfg(test)]
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Moves the fade forward by `amount`. Reaching 1.0 snaps to the next color
    /// and restarts the fade from 0.
    pub fn advance(&mut self, amount: f64, palette_len: usize) {
        self.t += amount;
        if self.t >= 1.0 {
            self.t = 0.0;
            self.current = self.next;
            self.next = (self.next + 1) % palette_len;
        }
    }
}

pub fn lerp(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let channel = |a: u8, b: u8| {
        let a = a as f64;
        let value = a + (b as f64 - a) * t;
        (value as i64).clamp(0, 255) as u8
    };
    Rgb::new(
        channel(from.r, to.r),
        channel(from.g, to.g),
        channel(from.b, to.b),
    )
}
