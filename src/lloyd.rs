use crate::geometry::Vec2;
use rayon::prelude::*;

/// Assign every point to its nearest centroid (squared euclidean distance).
///
/// Writes the winning centroid index into `assignments` and the squared
/// distance to that centroid into `distances`; both slices must have the same
/// length as `points`. This is a full recomputation from the current centroid
/// positions with no memory of any previous assignment.
///
/// Ties are broken towards the lowest centroid index: the scan replaces the
/// running minimum only on a strict `<`, so the first minimal centroid wins.
/// `Iterator::min_by` would return the *last* minimum on ties, which is why
/// the scan is written out by hand. Parallelizing per point does not affect
/// the outcome — centroids are read-only during the scan.
pub(crate) fn assign_points(points: &[Vec2], centroids: &[Vec2], assignments: &mut [usize], distances: &mut [f32]) {
    debug_assert_eq!(points.len(), assignments.len());
    debug_assert_eq!(points.len(), distances.len());
    if points.is_empty() {
        return;
    }

    // rayon does no static scheduling; hand it uniform work packets instead of
    // letting work-stealing chop the scan into tiny pieces.
    let work_packet_size = (points.len() / rayon::current_num_threads()).max(1);
    points
        .par_iter()
        .with_min_len(work_packet_size)
        .zip(assignments.par_iter_mut())
        .zip(distances.par_iter_mut())
        .for_each(|((p, assignment), dist)| {
            let mut best_idx = 0usize;
            let mut best_dist = f32::INFINITY;
            for (ci, c) in centroids.iter().enumerate() {
                let d = p.distance_sqr(*c);
                if d < best_dist {
                    best_dist = d;
                    best_idx = ci;
                }
            }
            *assignment = best_idx;
            *dist = best_dist;
        });
}

/// Componentwise arithmetic mean of a non-empty point slice.
pub(crate) fn mean(members: &[Vec2]) -> Vec2 {
    debug_assert!(!members.is_empty());
    let sum = members.iter().fold(Vec2::ZERO, |acc, &p| acc + p);
    sum.scale(1.0 / members.len() as f32)
}
