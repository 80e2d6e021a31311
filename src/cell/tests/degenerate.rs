//! Cuts that land exactly on existing vertices and edges.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{full_check, EPS};
use crate::cell::VoronoiCell;
use crate::real::Real;

#[test]
fn test_thin_slab() {
    let mut c = VoronoiCell::new();
    c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    assert!(c.plane(1.0, 0.0, 0.0, 1.0).unwrap());
    // a second plane within the tolerance band of the first face
    assert!(c.plane(1.0, 0.0, 0.0, 1.0 + crate::TOL * 0.1).unwrap());
    full_check(&c);
    assert!((c.volume() - 6.0).abs() < EPS, "volume {}", c.volume());
}

#[test]
fn test_repeat_cut_is_idempotent() {
    let mut c = VoronoiCell::new();
    c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    assert!(c.plane(0.4, -0.3, 0.9, 1.06).unwrap());
    let vol = c.volume();
    let p = c.vertex_count();
    assert!(c.plane(0.4, -0.3, 0.9, 1.06).unwrap());
    full_check(&c);
    assert_eq!(c.vertex_count(), p, "vertex count changed on repeat cut");
    assert!(
        (c.volume() - vol).abs() < EPS,
        "volume changed on repeat cut: {} -> {}",
        vol,
        c.volume()
    );
}

#[test]
fn test_planes_through_random_vertices() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for trial in 0..60 {
        let mut c = VoronoiCell::new();
        c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        for _ in 0..12 {
            let vi = rng.gen_range(0..c.vertex_count());
            let [vx, vy, vz] = c.vertex(vi);
            let dx: Real = rng.gen_range(-1.0..1.0);
            let dy: Real = rng.gen_range(-1.0..1.0);
            let dz: Real = rng.gen_range(-1.0..1.0);
            let n = (dx * dx + dy * dy + dz * dz).sqrt();
            if n < 1e-3 {
                continue;
            }
            let (dx, dy, dz) = (dx / n, dy / n, dz / n);
            // the plane passes exactly through vertex vi
            let rsq = 2.0 * (dx * vx + dy * vy + dz * vz);
            if rsq <= 1e-3 {
                continue;
            }
            if !c.plane(dx, dy, dz, rsq).unwrap() {
                break;
            }
            full_check(&c);
        }
        assert!(c.vertex_count() >= 4 || c.vertex_count() == 0, "trial {}", trial);
    }
}

#[test]
fn test_planes_through_random_edges() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    for trial in 0..60 {
        let mut c = VoronoiCell::new();
        c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        'cuts: for _ in 0..10 {
            let vi = rng.gen_range(0..c.vertex_count());
            let wj = c.nbr(vi, rng.gen_range(0..c.order(vi))) as usize;
            let [ax, ay, az] = c.vertex(vi);
            let [bx, by, bz] = c.vertex(wj);
            // a plane containing the whole edge, at a random tilt
            let (ex, ey, ez) = (bx - ax, by - ay, bz - az);
            let rx: Real = rng.gen_range(-1.0..1.0);
            let ry: Real = rng.gen_range(-1.0..1.0);
            let rz: Real = rng.gen_range(-1.0..1.0);
            let dx = ey * rz - ez * ry;
            let dy = ez * rx - ex * rz;
            let dz = ex * ry - ey * rx;
            let n = (dx * dx + dy * dy + dz * dz).sqrt();
            if n < 1e-6 {
                continue;
            }
            let (dx, dy, dz) = (dx / n, dy / n, dz / n);
            let rsq = 2.0 * (dx * ax + dy * ay + dz * az);
            if rsq <= 1e-3 {
                continue;
            }
            if !c.plane(dx, dy, dz, rsq).unwrap() {
                break 'cuts;
            }
            full_check(&c);
        }
        let _ = trial;
    }
}

#[test]
fn test_many_planes_through_one_point() {
    // several planes through the same point build a marginal vertex of
    // elevated order; the generic path must keep the topology sound
    let mut c = VoronoiCell::new();
    c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    let apex = [0.8, 0.0, 0.0];
    let dirs: [[Real; 3]; 5] = [
        [1.0, 0.3, 0.0],
        [1.0, -0.3, 0.1],
        [1.0, 0.0, 0.3],
        [1.0, 0.2, -0.25],
        [1.0, -0.15, -0.2],
    ];
    for d in dirs {
        let rsq = 2.0 * (d[0] * apex[0] + d[1] * apex[1] + d[2] * apex[2]);
        assert!(c.plane(d[0], d[1], d[2], rsq).unwrap());
        full_check(&c);
    }
    // the apex survives as a vertex of every cut plane
    let tol = EPS * 10.0;
    let found = (0..c.vertex_count()).any(|v| {
        let [x, y, z] = c.vertex(v);
        (x - apex[0]).abs() < tol && (y - apex[1]).abs() < tol && (z - apex[2]).abs() < tol
    });
    assert!(found, "apex vertex lost: {:?}", c.vertices());
}
