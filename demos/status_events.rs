use kmeans_vis::*;

fn main() {
    let conf = SessionConfig::build()
        .init_done(&|clusters: &[Cluster]| {
            let points: usize = clusters.iter().map(|c| c.members.len()).sum();
            println!("Dataset regenerated: {} points in {} clusters", points, clusters.len());
        })
        .iteration_done(&|_: &[Cluster], nr, distsum| {
            println!("Iteration {:>2} - Error: {:.2}", nr, distsum);
        })
        .reseed_done(&|empty: &[usize]| {
            println!("  clusters {:?} went empty - centroids reseeded", empty);
        })
        .build();

    let mut session = Session::new(conf).unwrap();
    for _ in 0..15 {
        session.iterate();
    }

    // A second regeneration reuses the session; the visualization binds this
    // to a key press.
    session.regenerate();
    for _ in 0..5 {
        session.iterate();
    }
}
