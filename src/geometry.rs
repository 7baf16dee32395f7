use rand::prelude::*;
use std::ops::{Add, AddAssign, Sub};

/// A point (or displacement) in the 2D logical coordinate space.
///
/// Points are plain value types: generated once, then only read, copied and
/// projected. All arithmetic needed by the clustering session is provided here,
/// so no external linear-algebra crate is pulled in for two components.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared length of this vector.
    pub fn length_sqr(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Squared euclidean distance to `other`.
    ///
    /// The square root is never taken anywhere in the crate: nearest-centroid
    /// comparisons are order-preserving under squaring.
    pub fn distance_sqr(self, other: Vec2) -> f32 {
        (self - other).length_sqr()
    }

    pub fn scale(self, factor: f32) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
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

/// Axis-aligned rectangle describing the logical domain in which synthetic
/// data and centroids live, prior to any screen projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min: Vec2::new(min_x, min_y), max: Vec2::new(max_x, max_y) }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// A domain with zero span on either axis cannot be projected (the
    /// normalization would divide by zero). [`Session::new`] rejects such
    /// domains up front.
    ///
    /// [`Session::new`]: crate::Session::new
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0) || !(self.height() > 0.0)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Center of the rectangle.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max).scale(0.5)
    }

    /// Draw a uniformly distributed point from the rectangle's interior.
    pub fn sample_uniform(&self, rnd: &mut dyn RngCore) -> Vec2 {
        Vec2::new(
            rnd.gen_range(self.min.x, self.max.x),
            rnd.gen_range(self.min.y, self.max.y),
        )
    }

    /// Rectangle with the same center, scaled by `factor` on both axes.
    pub fn shrunk(&self, factor: f32) -> Rect {
        let c = self.center();
        let half = Vec2::new(self.width() * 0.5 * factor, self.height() * 0.5 * factor);
        Rect { min: c - half, max: c + half }
    }
}

/// Map a point from the logical `domain` into screen pixel space.
///
/// The x fraction scales to `[0, screen_w]`; the y axis is flipped so that
/// increasing logical y goes *up* on screen (`screen_y = h - ny * h`).
///
/// This is a pure function and must be re-invoked every frame: the screen size
/// can change between calls when the window is resized. Behavior is undefined
/// for a degenerate domain (zero width or height).
pub fn project(point: Vec2, domain: &Rect, screen_w: f32, screen_h: f32) -> Vec2 {
    let nx = (point.x - domain.min.x) / domain.width();
    let ny = (point.y - domain.min.y) / domain.height();
    Vec2::new(nx * screen_w, screen_h - ny * screen_h)
}
