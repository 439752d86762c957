use rand::Rng;

use crate::{
    config::LabelSpec,
    core::color::{FadePhase, Palette},
    types::{BodySnapshot, Extent, ShapeView, Vec2, Viewport},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Extent for Circle {
    fn half_extent_x(&self) -> f64 {
        self.radius
    }

    fn half_extent_y(&self) -> f64 {
        self.radius
    }

    fn extent_along(&self, _dir: Vec2) -> f64 {
        self.radius
    }

    fn bounding_radius(&self) -> f64 {
        self.radius
    }
}

/// A line of text treated as its bounding box.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub half_width: f64,
    pub half_height: f64,
}

impl Extent for Label {
    fn half_extent_x(&self) -> f64 {
        self.half_width
    }

    fn half_extent_y(&self) -> f64 {
        self.half_height
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Label(Label),
}

impl Shape {
    fn as_extent(&self) -> &dyn Extent {
        match self {
            Shape::Circle(circle) => circle as &dyn Extent,
            Shape::Label(label) => label,
        }
    }
}

impl Extent for Shape {
    fn half_extent_x(&self) -> f64 {
        self.as_extent().half_extent_x()
    }

    fn half_extent_y(&self) -> f64 {
        self.as_extent().half_extent_y()
    }

    fn extent_along(&self, dir: Vec2) -> f64 {
        self.as_extent().extent_along(dir)
    }

    fn bounding_radius(&self) -> f64 {
        self.as_extent().bounding_radius()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub shape: Shape,
    pub fade: FadePhase,
}

impl Body {
    pub fn circle(pos: Vec2, vel: Vec2, radius: f64, fade: FadePhase) -> Self {
        Self {
            pos,
            vel,
            shape: Shape::Circle(Circle { radius }),
            fade,
        }
    }

    pub fn label(pos: Vec2, vel: Vec2, spec: &LabelSpec, fade: FadePhase) -> Self {
        Self {
            pos,
            vel,
            shape: Shape::Label(Label {
                text: spec.text.clone(),
                half_width: spec.half_width,
                half_height: spec.half_height,
            }),
            fade,
        }
    }

    pub fn snapshot(&self, palette: &Palette) -> BodySnapshot {
        let shape = match &self.shape {
            Shape::Circle(circle) => ShapeView::Circle {
                radius: circle.radius,
            },
            Shape::Label(label) => ShapeView::Label {
                text: label.text.clone(),
            },
        };
        BodySnapshot {
            pos: self.pos,
            half_extent: Vec2::new(self.half_extent_x(), self.half_extent_y()),
            color: palette.color(&self.fade),
            shape,
        }
    }
}

impl Extent for Body {
    fn half_extent_x(&self) -> f64 {
        self.shape.half_extent_x()
    }

    fn half_extent_y(&self) -> f64 {
        self.shape.half_extent_y()
    }

    fn extent_along(&self, dir: Vec2) -> f64 {
        self.shape.extent_along(dir)
    }

    fn bounding_radius(&self) -> f64 {
        self.shape.bounding_radius()
    }
}

/// Random circle placed clear of the edges, heading in a random direction.
pub fn spawn_circle<R: Rng>(
    rng: &mut R,
    viewport: Viewport,
    radius_range: (f64, f64),
    speed: f64,
    fade: FadePhase,
) -> Body {
    let (min, max) = radius_range;
    let radius = rng.gen_range(min..=max);
    let x = rng.gen_range(radius..=viewport.width - radius);
    let y = rng.gen_range(radius..=viewport.height - radius);
    Body::circle(Vec2::new(x, y), random_heading(rng, speed), radius, fade)
}

/// The label always starts at the centre of the viewport.
pub fn spawn_label<R: Rng>(
    rng: &mut R,
    viewport: Viewport,
    spec: &LabelSpec,
    speed: f64,
    fade: FadePhase,
) -> Body {
    Body::label(viewport.center(), random_heading(rng, speed), spec, fade)
}

fn random_heading<R: Rng>(rng: &mut R, speed: f64) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    Vec2::from_angle(angle) * speed
}
