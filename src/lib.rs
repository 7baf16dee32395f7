//! # kmeans-vis - API documentation
//!
//! kmeans-vis is the session core of an interactive visualization of Lloyd's
//! k-means clustering algorithm, operating on synthetic 2D point sets.
//!
//! ## Design target
//! The crate deliberately contains no windowing or drawing code. It owns the
//! data side of the demonstration — dataset generation, the two Lloyd
//! half-steps (partition and mean-update), the empty-cluster reseed policy and
//! the logical-domain-to-screen projection — and leaves event polling and
//! draw calls to whatever presentation layer drives it. A renderer triggers
//! [`Session::regenerate`] and [`Session::iterate`] on discrete input events
//! and reads [`Session::clusters`] back every frame.
//!
//! There is intentionally no convergence detection: stepping the algorithm by
//! hand and watching the centroids wander is the whole point.
//!
//! ## The two half-steps
//! [`Session::partition`] assigns every point to its nearest centroid
//! (squared euclidean distance, exact ties to the lowest centroid index) and
//! [`Session::update_means`] recomputes each centroid as the mean of its
//! members. They are exposed separately so a caller can redraw between them;
//! [`Session::iterate`] chains mean-update and partition into one step.
//!
//! A cluster that ends up without members is not an error. It triggers the
//! configured [`ReseedPolicy`] — by default the rather blunt historical
//! behavior of re-randomizing *all* centroids inside the domain.
//!
//! ## Example
//! ```rust
//! use kmeans_vis::*;
//!
//! fn main() {
//!     let mut session = Session::new(SessionConfig::default()).unwrap();
//!
//!     for _ in 0..10 {
//!         session.iterate();
//!     }
//!
//!     for (i, cluster) in session.clusters().iter().enumerate() {
//!         println!("cluster {}: centroid ({:.2}, {:.2}), {} points",
//!             i, cluster.centroid.x, cluster.centroid.y, cluster.members.len());
//!     }
//!
//!     // Project a centroid into an 800x600 window.
//!     let on_screen = project(session.clusters()[0].centroid, session.domain(), 800.0, 600.0);
//!     println!("drawn at ({:.0}, {:.0})", on_screen.x, on_screen.y);
//! }
//! ```
//!
//! ## Example (using the status event callbacks)
//! ```rust
//! use kmeans_vis::*;
//!
//! fn main() {
//!     let conf = SessionConfig::build()
//!         .init_done(&|_| println!("Dataset regenerated."))
//!         .iteration_done(&|_, nr, distsum|
//!             println!("Iteration {} - Error: {:.2}", nr, distsum))
//!         .reseed_done(&|empty| println!("Reseed triggered by clusters {:?}", empty))
//!         .build();
//!
//!     let mut session = Session::new(conf).unwrap();
//!     for _ in 0..5 {
//!         session.iterate();
//!     }
//! }
//! ```
//!
//! ## Short API-Overview / Description
//! Entry point is the [`Session`] struct, built from a [`SessionConfig`]
//! (cluster count, logical domain, dataset layout, reseed policy, RNG and
//! status callbacks — see [`SessionConfigBuilder`]). Synthetic datasets are
//! described by a [`DatasetLayout`] of disk-shaped [`Blob`]s and sampled
//! area-uniformly by [`generate_disk`]. [`project`] maps logical coordinates
//! to screen pixels with the vertical axis flipped.

mod api;
mod error;
mod generate;
mod geometry;
mod lloyd;

pub use api::{
    Cluster, InitDoneCallbackFn, IterationDoneCallbackFn, ReseedDoneCallbackFn, ReseedPolicy,
    Session, SessionConfig, SessionConfigBuilder,
};
pub use error::SessionError;
pub use generate::{generate_disk, Blob, DatasetLayout};
pub use geometry::{project, Rect, Vec2};
