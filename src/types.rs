use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians.
    pub fn from_angle(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }

    pub fn length_sq(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self * rhs.x, self * rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Multiplies every channel by `factor`, truncating and capping at 255.
    pub fn scaled(self, factor: f64) -> Rgb {
        let channel = |c: u8| (c as f64 * factor).clamp(0.0, 255.0) as u8;
        Rgb::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgb::new(r, g, b)
    }
}

/// Drawable area in world units. Supplied by the host every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True when a body with the given half extents can sit inside without
    /// touching both opposite edges at once.
    pub fn contains_extents(self, half_x: f64, half_y: f64) -> bool {
        self.width >= 2.0 * half_x && self.height >= 2.0 * half_y
    }
}

/// Per-axis half size of a body. Boundary and collision code only ever
/// talks to bodies through this.
pub trait Extent {
    fn half_extent_x(&self) -> f64;
    fn half_extent_y(&self) -> f64;

    /// Distance from the centre to the outline along `dir`. `dir` need not be
    /// normalised; a zero vector yields the larger half extent.
    fn extent_along(&self, dir: Vec2) -> f64 {
        let hx = self.half_extent_x();
        let hy = self.half_extent_y();
        let len = dir.length();
        if len == 0.0 {
            return hx.max(hy);
        }
        let ux = dir.x.abs() / len;
        let uy = dir.y.abs() / len;
        let along_x = if ux > 0.0 { hx / ux } else { f64::INFINITY };
        let along_y = if uy > 0.0 { hy / uy } else { f64::INFINITY };
        along_x.min(along_y)
    }

    /// Radius of the smallest circle enclosing the body.
    fn bounding_radius(&self) -> f64 {
        self.half_extent_x().hypot(self.half_extent_y())
    }
}

/// What the host needs to draw one body.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeView {
    Circle { radius: f64 },
    Label { text: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct BodySnapshot {
    pub pos: Vec2,
    pub half_extent: Vec2,
    pub color: Rgb,
    pub shape: ShapeView,
}
