use crate::error::SessionError;
use crate::generate::DatasetLayout;
use crate::geometry::{Rect, Vec2};
use crate::lloyd;
use log::{debug, warn};
use rand::prelude::*;
use std::cell::RefCell;

pub type InitDoneCallbackFn<'a> = &'a dyn Fn(&[Cluster]);
pub type IterationDoneCallbackFn<'a> = &'a dyn Fn(&[Cluster], usize, f32);
pub type ReseedDoneCallbackFn<'a> = &'a dyn Fn(&[usize]);

/// What happens to centroid positions when a cluster ends up with no members
/// after partitioning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReseedPolicy {
    /// Re-randomize **all** K centroids to fresh uniform positions within the
    /// logical domain. A single empty cluster discards the progress of every
    /// other centroid too. Aggressive, but it is the behavior the
    /// visualization was built around, so it is the default.
    AllCentroids,
    /// Re-randomize only the empty clusters' centroids; non-empty clusters
    /// still receive their member mean. The conventional k-means recovery.
    EmptyOnly,
}

/// Configuration for a clustering [`Session`], such as the cluster count, the
/// logical domain, the random number generator to use, and a couple of
/// callbacks that report status from a running session.
///
/// For details on the individual options, see [`SessionConfigBuilder`].
pub struct SessionConfig<'a> {
    /// Number of clusters, fixed for the lifetime of the session.
    pub(crate) k: usize,
    /// The logical domain: synthetic data, centroids and reseeded centroids
    /// all live inside this rectangle.
    pub(crate) domain: Rect,
    pub(crate) reseed_policy: ReseedPolicy,
    /// Dataset description; `None` resolves to
    /// [`DatasetLayout::default_for`] the configured domain at session build.
    pub(crate) layout: Option<DatasetLayout>,
    /// Rendering hints for an external presentation layer.
    pub(crate) point_radius: f32,
    pub(crate) centroid_radius: f32,
    /// Random number generator used for dataset generation and centroid
    /// (re)seeding.
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// Called after `regenerate` finished (fresh dataset, first partition).
    pub(crate) init_done: InitDoneCallbackFn<'a>,
    /// Called after each `iterate` with the iteration number and the new
    /// sum of squared point-to-centroid distances.
    pub(crate) iteration_done: IterationDoneCallbackFn<'a>,
    /// Called when empty clusters triggered the reseed policy, with the
    /// indices of the clusters that were empty.
    pub(crate) reseed_done: ReseedDoneCallbackFn<'a>,
}

impl<'a> Default for SessionConfig<'a> {
    fn default() -> Self {
        Self {
            k: 5,
            domain: Rect::new(-20.0, -20.0, 20.0, 20.0),
            reseed_policy: ReseedPolicy::AllCentroids,
            layout: None,
            point_radius: 5.0,
            centroid_radius: 10.0,
            rnd: Box::new(RefCell::new(rand::thread_rng())),
            init_done: &|_| {},
            iteration_done: &|_, _, _| {},
            reseed_done: &|_| {},
        }
    }
}

impl<'a> SessionConfig<'a> {
    /// Use the [`SessionConfigBuilder`] to build a [`SessionConfig`] instance.
    pub fn build() -> SessionConfigBuilder<'a> {
        SessionConfigBuilder { config: SessionConfig::default() }
    }
}

impl<'a> std::fmt::Debug for SessionConfig<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("k", &self.k)
            .field("domain", &self.domain)
            .field("reseed_policy", &self.reseed_policy)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

pub struct SessionConfigBuilder<'a> {
    config: SessionConfig<'a>,
}

impl<'a> SessionConfigBuilder<'a> {
    /// Set the number of clusters. Must be at least 1.
    /// ## Default
    /// `5`
    pub fn k(mut self, k: usize) -> Self {
        self.config.k = k; self
    }
    /// Set the logical domain rectangle. Must span a non-zero area.
    /// ## Default
    /// `[-20, 20] × [-20, 20]`
    pub fn domain(mut self, domain: Rect) -> Self {
        self.config.domain = domain; self
    }
    /// Set the empty-cluster reseed policy.
    /// ## Default
    /// [`ReseedPolicy::AllCentroids`]
    pub fn reseed_policy(mut self, policy: ReseedPolicy) -> Self {
        self.config.reseed_policy = policy; self
    }
    /// Set the dataset layout used by `regenerate`.
    /// ## Default
    /// [`DatasetLayout::default_for`] the configured domain
    pub fn dataset(mut self, layout: DatasetLayout) -> Self {
        self.config.layout = Some(layout); self
    }
    /// Set the point radius rendering hint (pixels).
    pub fn point_radius(mut self, radius: f32) -> Self {
        self.config.point_radius = radius; self
    }
    /// Set the centroid radius rendering hint (pixels).
    pub fn centroid_radius(mut self, radius: f32) -> Self {
        self.config.centroid_radius = radius; self
    }
    /// Set the random number generator used for generation and reseeding.
    /// Use a seeded generator for deterministically repeatable sessions.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Set the callback invoked after every `regenerate`.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback invoked after every `iterate`.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the callback invoked whenever empty clusters trigger a reseed.
    pub fn reseed_done(mut self, reseed_done: ReseedDoneCallbackFn<'a>) -> Self {
        self.config.reseed_done = reseed_done; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> SessionConfig<'a> {
        self.config
    }
}

/// One centroid paired with the points currently closest to it.
///
/// Membership is recomputed from scratch on every partition step; points do
/// not carry a stored cluster id.
#[derive(Clone, Debug, Default)]
pub struct Cluster {
    pub centroid: Vec2,
    pub members: Vec<Vec2>,
}

/// An interactive Lloyd k-means session.
///
/// The session owns all mutable state: the global point set, the K clusters
/// with their centroids, and reusable assignment scratch buffers. It is purely
/// request-driven — an external presentation layer triggers
/// [`regenerate`](Session::regenerate) and [`iterate`](Session::iterate) on
/// discrete input events and reads [`clusters`](Session::clusters) back each
/// frame. There is no convergence detection; the loop runs indefinitely under
/// external control.
pub struct Session<'a> {
    config: SessionConfig<'a>,
    layout: DatasetLayout,
    points: Vec<Vec2>,
    clusters: Vec<Cluster>,
    // Scratch, retained across partitions.
    assignments: Vec<usize>,
    distances: Vec<f32>,
    distsum: f32,
    iteration: usize,
}

impl<'a> Session<'a> {
    /// Create a session and run the initial [`regenerate`](Session::regenerate),
    /// so a fresh session always holds a renderable, partitioned dataset.
    ///
    /// Fails if `k` is zero or the domain is degenerate; all other inputs are
    /// assumed well-formed.
    pub fn new(mut config: SessionConfig<'a>) -> Result<Self, SessionError> {
        if config.k == 0 {
            return Err(SessionError::ClusterCount);
        }
        if config.domain.is_degenerate() {
            return Err(SessionError::DegenerateDomain);
        }
        let layout = config
            .layout
            .take()
            .unwrap_or_else(|| DatasetLayout::default_for(&config.domain));

        let mut session = Self {
            clusters: vec![Cluster::default(); config.k],
            config,
            layout,
            points: Vec::new(),
            assignments: Vec::new(),
            distances: Vec::new(),
            distsum: 0.0,
            iteration: 0,
        };
        session.regenerate();
        Ok(session)
    }

    /// Throw away the current dataset, materialize the configured layout into
    /// a fresh one, randomize all K centroids within the domain and partition.
    /// Resets the iteration counter and fires the `init_done` callback.
    pub fn regenerate(&mut self) {
        {
            let rnd = &mut *self.config.rnd.borrow_mut();
            self.layout.fill_into(rnd, &mut self.points);
            for cluster in self.clusters.iter_mut() {
                cluster.centroid = self.config.domain.sample_uniform(rnd);
            }
        }
        self.iteration = 0;
        self.partition();
        debug!(
            "regenerated dataset: {} points in {} blobs, k = {}, distsum = {:.3}",
            self.points.len(),
            self.layout.blobs.len(),
            self.config.k,
            self.distsum
        );
        (self.config.init_done)(&self.clusters);
    }

    /// Perform one Lloyd step: mean-update, then partition. Fires the
    /// `iteration_done` callback with the new iteration number and distsum.
    pub fn iterate(&mut self) {
        self.update_means();
        self.partition();
        self.iteration += 1;
        debug!("iteration {}: distsum = {:.3}", self.iteration, self.distsum);
        (self.config.iteration_done)(&self.clusters, self.iteration, self.distsum);
    }

    /// Assign every point of the global set to the cluster of its nearest
    /// centroid (strict `<`, so exact ties go to the lowest centroid index).
    ///
    /// All membership lists are cleared first (their capacity is retained);
    /// the partition has no memory of the previous one. Also recomputes the
    /// session's distsum.
    ///
    /// Exposed separately from [`update_means`](Session::update_means) on
    /// purpose: a caller may redraw between the two half-steps, or repeat one
    /// of them in isolation.
    pub fn partition(&mut self) {
        let n = self.points.len();
        self.assignments.resize(n, 0);
        self.distances.resize(n, f32::INFINITY);
        let centroids: Vec<Vec2> = self.clusters.iter().map(|c| c.centroid).collect();
        lloyd::assign_points(&self.points, &centroids, &mut self.assignments, &mut self.distances);

        for cluster in self.clusters.iter_mut() {
            cluster.members.clear();
        }
        for (&p, &assignment) in self.points.iter().zip(self.assignments.iter()) {
            self.clusters[assignment].members.push(p);
        }
        self.distsum = self.distances.iter().sum();
    }

    /// Recompute each centroid as the componentwise mean of its members.
    ///
    /// Clusters without members trigger the configured [`ReseedPolicy`]; the
    /// `reseed_done` callback then fires with the empty clusters' indices.
    /// This is the only abnormal condition the session knows, and it is fully
    /// self-healing — never surfaced as an error.
    pub fn update_means(&mut self) {
        let empty: Vec<usize> = self
            .clusters
            .iter()
            .enumerate()
            .filter(|(_, c)| c.members.is_empty())
            .map(|(i, _)| i)
            .collect();

        if empty.is_empty() {
            for cluster in self.clusters.iter_mut() {
                cluster.centroid = lloyd::mean(&cluster.members);
            }
            return;
        }

        warn!(
            "{} of {} clusters empty after partitioning, reseeding per {:?}",
            empty.len(),
            self.config.k,
            self.config.reseed_policy
        );
        {
            let rnd = &mut *self.config.rnd.borrow_mut();
            match self.config.reseed_policy {
                ReseedPolicy::AllCentroids => {
                    for cluster in self.clusters.iter_mut() {
                        cluster.centroid = self.config.domain.sample_uniform(rnd);
                    }
                }
                ReseedPolicy::EmptyOnly => {
                    for cluster in self.clusters.iter_mut() {
                        cluster.centroid = if cluster.members.is_empty() {
                            self.config.domain.sample_uniform(rnd)
                        } else {
                            lloyd::mean(&cluster.members)
                        };
                    }
                }
            }
        }
        (self.config.reseed_done)(&empty);
    }

    /// The clusters in index order: each centroid with its current members.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// The global point set under clustering.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// The logical domain; pass this to [`project`](crate::project) together
    /// with the current screen size.
    pub fn domain(&self) -> &Rect {
        &self.config.domain
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Iterations performed since the last `regenerate`.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Sum of squared point-to-centroid distances, as of the last partition.
    pub fn distsum(&self) -> f32 {
        self.distsum
    }

    /// Rendering hint: radius to draw ordinary points with.
    pub fn point_radius(&self) -> f32 {
        self.config.point_radius
    }

    /// Rendering hint: radius to draw centroids with.
    pub fn centroid_radius(&self) -> f32 {
        self.config.centroid_radius
    }
}

impl<'a> std::fmt::Debug for Session<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("points", &self.points.len())
            .field("iteration", &self.iteration)
            .field("distsum", &self.distsum)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Blob;
    use approx::assert_abs_diff_eq;
    use std::cell::Cell;

    fn seeded_config<'a>(seed: u64) -> SessionConfig<'a> {
        SessionConfig::build()
            .random_generator(StdRng::seed_from_u64(seed))
            .build()
    }

    #[test]
    fn construction_rejects_invalid_configs() {
        let err = Session::new(SessionConfig::build().k(0).build()).unwrap_err();
        assert_eq!(err, SessionError::ClusterCount);

        let err = Session::new(
            SessionConfig::build().domain(Rect::new(0.0, 0.0, 0.0, 5.0)).build(),
        )
        .unwrap_err();
        assert_eq!(err, SessionError::DegenerateDomain);
    }

    #[test]
    fn fresh_session_is_partitioned() {
        let session = Session::new(seeded_config(1337)).unwrap();
        assert_eq!(session.k(), 5);
        assert_eq!(session.points().len(), 1400);
        assert_eq!(session.iteration(), 0);
        let assigned: usize = session.clusters().iter().map(|c| c.members.len()).sum();
        assert_eq!(assigned, 1400);
    }

    #[test]
    fn partition_is_complete_and_nearest() {
        let mut session = Session::new(seeded_config(7)).unwrap();
        session.partition();

        // Union of all membership lists equals the input set as a multiset.
        let key = |p: &Vec2| (p.x.to_bits(), p.y.to_bits());
        let mut input: Vec<_> = session.points().iter().map(key).collect();
        let mut members: Vec<_> = session
            .clusters()
            .iter()
            .flat_map(|c| c.members.iter().map(key))
            .collect();
        input.sort_unstable();
        members.sort_unstable();
        assert_eq!(input, members);

        // Every member is at least as close to its own centroid as to any other.
        let centroids: Vec<Vec2> = session.clusters().iter().map(|c| c.centroid).collect();
        for cluster in session.clusters() {
            for &p in &cluster.members {
                let own = p.distance_sqr(cluster.centroid);
                for &c in &centroids {
                    assert!(own <= p.distance_sqr(c) + 1e-5);
                }
            }
        }
    }

    #[test]
    fn update_means_averages_member_coordinates() {
        let mut session = Session::new(seeded_config(11)).unwrap();
        session.points = vec![
            Vec2::new(1.0, 1.0),
            Vec2::new(3.0, 5.0),
            Vec2::new(-8.0, -2.0),
            Vec2::new(-6.0, -4.0),
        ];
        session.clusters.truncate(2);
        session.config.k = 2;
        session.clusters[0].centroid = Vec2::new(2.0, 2.0);
        session.clusters[1].centroid = Vec2::new(-7.0, -3.0);

        session.partition();
        session.update_means();

        assert_abs_diff_eq!(session.clusters[0].centroid.x, 2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(session.clusters[0].centroid.y, 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(session.clusters[1].centroid.x, -7.0, epsilon = 1e-4);
        assert_abs_diff_eq!(session.clusters[1].centroid.y, -3.0, epsilon = 1e-4);
    }

    #[test]
    fn empty_cluster_reseeds_all_centroids_by_default() {
        let empties = RefCell::new(Vec::new());
        let reseed_done = |idx: &[usize]| empties.borrow_mut().extend_from_slice(idx);
        let config = SessionConfig::build()
            .k(3)
            .random_generator(StdRng::seed_from_u64(99))
            .reseed_done(&reseed_done)
            .build();
        let mut session = Session::new(config).unwrap();

        session.points = vec![Vec2::new(5.0, 5.0), Vec2::new(5.5, 4.5), Vec2::new(4.5, 5.5)];
        session.clusters[0].centroid = Vec2::new(5.0, 5.0);
        session.clusters[1].centroid = Vec2::new(-15.0, -15.0);
        session.clusters[2].centroid = Vec2::new(15.0, -15.0);
        session.partition();
        assert!(session.clusters[1].members.is_empty());
        assert!(session.clusters[2].members.is_empty());

        let before: Vec<Vec2> = session.clusters.iter().map(|c| c.centroid).collect();
        session.update_means();

        assert_eq!(*empties.borrow(), vec![1, 2]);
        for (cluster, old) in session.clusters.iter().zip(&before) {
            // A fresh uniform draw landing exactly on the old position does
            // not happen; all three must have moved, the non-empty one included.
            assert_ne!(cluster.centroid, *old);
            assert!(session.config.domain.contains(cluster.centroid));
        }
    }

    #[test]
    fn empty_only_policy_keeps_the_others_means() {
        let config = SessionConfig::build()
            .k(2)
            .random_generator(StdRng::seed_from_u64(5))
            .reseed_policy(ReseedPolicy::EmptyOnly)
            .build();
        let mut session = Session::new(config).unwrap();

        session.points = vec![Vec2::new(4.0, 4.0), Vec2::new(6.0, 6.0)];
        session.clusters[0].centroid = Vec2::new(5.0, 5.0);
        session.clusters[1].centroid = Vec2::new(-19.0, -19.0);
        session.partition();
        assert!(session.clusters[1].members.is_empty());

        session.update_means();
        assert_eq!(session.clusters[0].centroid, Vec2::new(5.0, 5.0));
        assert_ne!(session.clusters[1].centroid, Vec2::new(-19.0, -19.0));
        assert!(session.config.domain.contains(session.clusters[1].centroid));
    }

    #[test]
    fn regenerate_replaces_the_dataset_and_resets_iterations() {
        let layout = DatasetLayout::new(vec![
            Blob { center: Vec2::new(-10.0, 0.0), radius: 2.0, count: 40 },
            Blob { center: Vec2::new(10.0, 0.0), radius: 2.0, count: 60 },
        ]);
        let config = SessionConfig::build()
            .k(2)
            .dataset(layout)
            .random_generator(StdRng::seed_from_u64(3))
            .build();
        let mut session = Session::new(config).unwrap();
        assert_eq!(session.points().len(), 100);

        session.iterate();
        session.iterate();
        assert_eq!(session.iteration(), 2);

        let old_points = session.points().to_vec();
        session.regenerate();
        assert_eq!(session.iteration(), 0);
        assert_eq!(session.points().len(), 100);
        assert_ne!(session.points(), &old_points[..]);
    }

    #[test]
    fn iteration_callback_reports_progress() {
        let calls = Cell::new(0usize);
        let last_iteration = Cell::new(0usize);
        let iteration_done = |clusters: &[Cluster], iteration: usize, distsum: f32| {
            calls.set(calls.get() + 1);
            last_iteration.set(iteration);
            assert_eq!(clusters.len(), 5);
            assert!(distsum >= 0.0);
        };
        let config = SessionConfig::build()
            .random_generator(StdRng::seed_from_u64(21))
            .iteration_done(&iteration_done)
            .build();
        let mut session = Session::new(config).unwrap();

        for _ in 0..4 {
            session.iterate();
        }
        assert_eq!(calls.get(), 4);
        assert_eq!(last_iteration.get(), 4);
        assert_eq!(session.iteration(), 4);
    }

    #[test]
    fn session_without_points_survives_iteration() {
        let config = SessionConfig::build()
            .k(2)
            .dataset(DatasetLayout::new(Vec::new()))
            .random_generator(StdRng::seed_from_u64(17))
            .build();
        let mut session = Session::new(config).unwrap();
        assert_eq!(session.points().len(), 0);
        assert_eq!(session.distsum(), 0.0);

        // Every cluster is empty, so each iterate reseeds and re-partitions.
        session.iterate();
        session.iterate();
        assert!(session.clusters().iter().all(|c| c.members.is_empty()));
    }

    #[test]
    fn centroids_seeded_near_blob_centers_converge_onto_them() {
        let mut session = Session::new(seeded_config(1337)).unwrap();
        let blob_centers: Vec<Vec2> = session.layout.blobs.iter().map(|b| b.center).collect();
        assert_eq!(blob_centers.len(), 5);

        // Inject starting centroids slightly off the true blob centers, as a
        // user stepping the visualization would reach after a lucky seed.
        for (cluster, &center) in session.clusters.iter_mut().zip(&blob_centers) {
            cluster.centroid = center + Vec2::new(0.9, -0.7);
        }
        session.partition();

        // Iterate until the partition stops changing.
        let mut stable = false;
        let mut prev = session.assignments.clone();
        for _ in 0..50 {
            session.iterate();
            if session.assignments == prev {
                stable = true;
                break;
            }
            prev = session.assignments.clone();
        }
        assert!(stable, "partition did not stabilize within 50 iterations");

        // Each converged centroid sits closer to its own blob center than to
        // any other blob center.
        for (cluster, &own_center) in session.clusters.iter().zip(&blob_centers) {
            let own = cluster.centroid.distance_sqr(own_center);
            assert!(!cluster.members.is_empty());
            for &other in &blob_centers {
                if other != own_center {
                    assert!(
                        own < cluster.centroid.distance_sqr(other),
                        "centroid {:?} drifted away from blob {:?}",
                        cluster.centroid,
                        own_center
                    );
                }
            }
        }
    }

    #[test]
    fn distsum_is_non_increasing_under_empty_only_reseed() {
        let config = SessionConfig::build()
            .random_generator(StdRng::seed_from_u64(4242))
            .reseed_policy(ReseedPolicy::EmptyOnly)
            .build();
        let mut session = Session::new(config).unwrap();

        let mut prev = session.distsum();
        for _ in 0..20 {
            session.iterate();
            let cur = session.distsum();
            // Slack covers f32 summation noise over ~1400 terms.
            assert!(
                cur <= prev * (1.0 + 1e-4) + 1e-2,
                "distsum increased: {} -> {}",
                prev,
                cur
            );
            prev = cur;
        }
    }
}
