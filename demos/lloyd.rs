use kmeans_vis::*;

fn main() {
    let (w, h) = (800.0, 600.0);

    let mut session = Session::new(SessionConfig::default()).unwrap();
    for _ in 0..20 {
        session.iterate();
    }

    println!("distsum after {} iterations: {:.2}", session.iteration(), session.distsum());
    for (i, cluster) in session.clusters().iter().enumerate() {
        let s = project(cluster.centroid, session.domain(), w, h);
        println!(
            "cluster {}: {} points, centroid ({:.2}, {:.2}) -> screen ({:.0}, {:.0})",
            i, cluster.members.len(), cluster.centroid.x, cluster.centroid.y, s.x, s.y
        );
    }
}
