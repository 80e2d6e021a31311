//! Randomised invariant checks over sequences of bisector cuts.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{full_check, EPS};
use crate::cell::VoronoiCell;
use crate::real::Real;

fn random_bisector(rng: &mut ChaCha8Rng) -> Option<(Real, Real, Real, Real)> {
    let dx: Real = rng.gen_range(-1.5..1.5);
    let dy: Real = rng.gen_range(-1.5..1.5);
    let dz: Real = rng.gen_range(-1.5..1.5);
    let rsq = dx * dx + dy * dy + dz * dz;
    if rsq < 1e-3 {
        return None;
    }
    Some((dx, dy, dz, rsq))
}

#[test]
fn test_random_cut_sequences() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for trial in 0..40 {
        let mut c = VoronoiCell::new();
        c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        let mut vol = c.volume();
        for step in 0..30 {
            let Some((dx, dy, dz, rsq)) = random_bisector(&mut rng) else {
                continue;
            };
            if !c.plane(dx, dy, dz, rsq).unwrap() {
                break;
            }
            full_check(&c);
            let v2 = c.volume();
            assert!(
                v2 <= vol + EPS,
                "volume grew: trial {} step {}: {} -> {}",
                trial,
                step,
                vol,
                v2
            );
            vol = v2;
            // the same cut again must be a no-op
            assert!(c.plane(dx, dy, dz, rsq).unwrap());
            full_check(&c);
            assert!(
                (c.volume() - vol).abs() < EPS.max(vol * EPS),
                "idempotence broken: trial {} step {}",
                trial,
                step
            );
        }
    }
}

#[test]
fn test_two_cuts_commute() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for trial in 0..80 {
        let Some(p1) = random_bisector(&mut rng) else {
            continue;
        };
        let Some(p2) = random_bisector(&mut rng) else {
            continue;
        };
        let mut c1 = VoronoiCell::new();
        c1.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        let mut c2 = VoronoiCell::new();
        c2.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        let r1 = c1.plane(p1.0, p1.1, p1.2, p1.3).unwrap()
            && c1.plane(p2.0, p2.1, p2.2, p2.3).unwrap();
        let r2 = c2.plane(p2.0, p2.1, p2.2, p2.3).unwrap()
            && c2.plane(p1.0, p1.1, p1.2, p1.3).unwrap();
        assert_eq!(r1, r2, "liveness differs: trial {}", trial);
        if r1 {
            full_check(&c1);
            full_check(&c2);
            assert!(
                (c1.volume() - c2.volume()).abs() < EPS,
                "volumes differ: trial {}: {} vs {}",
                trial,
                c1.volume(),
                c2.volume()
            );
            assert_eq!(
                c1.face_size_histogram(),
                c2.face_size_histogram(),
                "histograms differ: trial {}",
                trial
            );
        }
    }
}

#[test]
fn test_brute_force_periodic_tiling() {
    // cells of all seeds, cut against all periodic images, tile the domain
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let l = 2.0;
    let n = 16;
    let seeds: Vec<[Real; 3]> = (0..n)
        .map(|_| {
            [
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            ]
        })
        .collect();
    let mut total: Real = 0.0;
    for (i, s) in seeds.iter().enumerate() {
        let mut c = VoronoiCell::new();
        c.init_box(-l / 2.0, l / 2.0, -l / 2.0, l / 2.0, -l / 2.0, l / 2.0);
        for (j, t) in seeds.iter().enumerate() {
            for ox in [-l, 0.0, l] {
                for oy in [-l, 0.0, l] {
                    for oz in [-l, 0.0, l] {
                        if i == j && ox == 0.0 && oy == 0.0 && oz == 0.0 {
                            continue;
                        }
                        let dx = t[0] + ox - s[0];
                        let dy = t[1] + oy - s[1];
                        let dz = t[2] + oz - s[2];
                        let rsq = dx * dx + dy * dy + dz * dz;
                        assert!(c.plane(dx, dy, dz, rsq).unwrap(), "cell {} died", i);
                    }
                }
            }
        }
        full_check(&c);
        total += c.volume();
    }
    assert!(
        (total - l * l * l).abs() < EPS * n as Real * 100.0,
        "volumes sum to {} in a domain of {}",
        total,
        l * l * l
    );
}

#[test]
fn test_perturb_keeps_topology() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut c = VoronoiCell::new();
    c.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    assert!(c.plane(1.0, 1.0, 1.0, 4.0).unwrap());
    let faces = c.face_count();
    c.perturb(&mut rng, 1e-4);
    full_check(&c);
    assert_eq!(c.face_count(), faces, "perturb changed the topology");
}
