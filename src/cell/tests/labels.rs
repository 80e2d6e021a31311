//! Neighbour tracking: every face carries the id of the plane that made it.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{full_check, EPS};
use crate::cell::VoronoiCellNeighbor;
use crate::real::Real;

#[test]
fn test_box_wall_labels() {
    let c = {
        let mut c = VoronoiCellNeighbor::new();
        c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        c
    };
    let mut labels = c.label_facets();
    labels.sort_unstable();
    assert_eq!(labels, vec![-6, -5, -4, -3, -2, -1]);
}

#[test]
fn test_octahedron_wall_labels() {
    let mut c = VoronoiCellNeighbor::new();
    c.init_octahedron(1.0);
    let mut labels = c.label_facets();
    labels.sort_unstable();
    assert_eq!(labels, vec![-8, -7, -6, -5, -4, -3, -2, -1]);
}

#[test]
fn test_cut_face_gets_the_seed_id() {
    let mut c = VoronoiCellNeighbor::new();
    c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    assert!(c.nplane(1.0, 0.0, 0.0, 1.0, 42).unwrap());
    full_check(&c);
    let mut labels = c.label_facets();
    labels.sort_unstable();
    assert_eq!(labels, vec![-6, -5, -4, -3, -1, 42], "x+ wall replaced by seed");
}

#[test]
fn test_corner_cut_keeps_wall_labels() {
    let mut c = VoronoiCellNeighbor::new();
    c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    assert!(c.nplane(1.0, 1.0, 1.0, 4.0, 7).unwrap());
    let mut labels = c.label_facets();
    labels.sort_unstable();
    assert_eq!(labels, vec![-6, -5, -4, -3, -2, -1, 7]);
}

#[test]
fn test_labels_match_face_geometry() {
    // after random cuts, every face tagged with a seed id must lie on that
    // seed's bisector plane
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    for trial in 0..30 {
        let mut c = VoronoiCellNeighbor::new();
        c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        let mut planes: Vec<(Real, Real, Real, Real)> = Vec::new();
        for id in 0..14 {
            let dx: Real = rng.gen_range(-1.4..1.4);
            let dy: Real = rng.gen_range(-1.4..1.4);
            let dz: Real = rng.gen_range(-1.4..1.4);
            let rsq = dx * dx + dy * dy + dz * dz;
            if rsq < 1e-2 {
                continue;
            }
            if !c.nplane(dx, dy, dz, rsq, id).unwrap() {
                break;
            }
            planes.resize(id as usize + 1, (0.0, 0.0, 0.0, 0.0));
            planes[id as usize] = (dx, dy, dz, rsq);
        }
        full_check(&c);
        let faces = c.face_vertex_lists();
        let labels = c.label_facets();
        assert_eq!(faces.len(), labels.len());
        for (f, &id) in faces.iter().zip(&labels) {
            if id < 0 {
                continue;
            }
            let (dx, dy, dz, rsq) = planes[id as usize];
            for &v in f {
                let [x, y, z] = c.vertex(v as usize);
                let d = dx * x + dy * y + dz * z - 0.5 * rsq;
                assert!(
                    d.abs() < EPS.max(1e-6),
                    "trial {}: face labelled {} strays {} off its plane",
                    trial,
                    id,
                    d
                );
            }
        }
    }
}

#[test]
fn test_neighbors_output_one_line_per_face() {
    let mut c = VoronoiCellNeighbor::new();
    c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    assert!(c.nplane(1.0, 0.0, 0.0, 1.0, 9).unwrap());
    let mut out = Vec::new();
    c.neighbors(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), c.face_count());
    assert!(text.lines().any(|l| l == "9"), "seed id missing:\n{}", text);
}
