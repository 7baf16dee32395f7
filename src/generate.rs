use crate::geometry::{Rect, Vec2};
use rand::prelude::*;
use std::f32::consts::PI;

/// Append `count` points sampled from a disk of the given `radius` around
/// `center` to `into`.
///
/// The distribution is area-uniform: the angle is drawn uniformly from
/// `[0, 2π)` and the radius as `sqrt(U) * radius`. The square-root transform
/// is required — sampling the radius linearly would over-concentrate points
/// near the center relative to true uniform-disk density, since the area of
/// an annulus grows with its distance from the center.
///
/// `count = 0` is a no-op. Existing contents of `into` are kept.
pub fn generate_disk(rnd: &mut dyn RngCore, center: Vec2, radius: f32, count: usize, into: &mut Vec<Vec2>) {
    into.reserve(count);
    for _ in 0..count {
        let direction = rnd.gen_range(0.0f32, 2.0 * PI);
        let unit: f32 = rnd.gen_range(0.0, 1.0);
        let magnitude = unit.sqrt() * radius;
        into.push(center + Vec2::new(magnitude * direction.cos(), magnitude * direction.sin()));
    }
}

/// One circular blob of a [`DatasetLayout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    pub center: Vec2,
    pub radius: f32,
    pub count: usize,
}

/// Description of a synthetic dataset as a composition of disk-shaped blobs.
///
/// A layout is purely declarative; [`Session::regenerate`] materializes it
/// into the session's point set, replacing the previous dataset wholesale.
///
/// [`Session::regenerate`]: crate::Session::regenerate
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetLayout {
    pub blobs: Vec<Blob>,
}

impl DatasetLayout {
    pub fn new(blobs: Vec<Blob>) -> Self {
        Self { blobs }
    }

    /// The stock layout: one large blob of 1000 points in the center of the
    /// domain, plus four satellite blobs of 100 points each at the domain's
    /// half-corners. Blob radii scale with the domain's shorter axis so that
    /// the default `[-20, 20]²` domain yields radii 10 and 5.
    pub fn default_for(domain: &Rect) -> Self {
        let short = domain.width().min(domain.height());
        let inner = domain.shrunk(0.5);
        let mut blobs = vec![Blob { center: domain.center(), radius: short / 4.0, count: 1000 }];
        for &corner in &[
            Vec2::new(inner.min.x, inner.max.y),
            Vec2::new(inner.max.x, inner.max.y),
            Vec2::new(inner.max.x, inner.min.y),
            Vec2::new(inner.min.x, inner.min.y),
        ] {
            blobs.push(Blob { center: corner, radius: short / 8.0, count: 100 });
        }
        Self { blobs }
    }

    /// `blob_cnt` equally sized blobs at uniform-random centers within the
    /// central half of the domain.
    pub fn scattered(rnd: &mut dyn RngCore, blob_cnt: usize, radius: f32, count: usize, domain: &Rect) -> Self {
        let inner = domain.shrunk(0.5);
        let blobs = (0..blob_cnt)
            .map(|_| Blob { center: inner.sample_uniform(rnd), radius, count })
            .collect();
        Self { blobs }
    }

    /// Total number of points this layout materializes into.
    pub fn point_count(&self) -> usize {
        self.blobs.iter().map(|b| b.count).sum()
    }

    /// Clear `into` (retaining its capacity) and fill it with fresh samples
    /// for every blob of the layout.
    pub fn fill_into(&self, rnd: &mut dyn RngCore, into: &mut Vec<Vec2>) {
        into.clear();
        for blob in &self.blobs {
            generate_disk(rnd, blob.center, blob.radius, blob.count, into);
        }
    }
}
