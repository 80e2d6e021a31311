use super::*;
use crate::real::Real;

mod degenerate;
mod invariants;
mod labels;

#[cfg(not(feature = "f32"))]
pub(crate) const EPS: Real = 1e-9;
#[cfg(feature = "f32")]
pub(crate) const EPS: Real = 1e-4;

/// Relations plus the Euler characteristic; cheap enough to run after every
/// cut in the test loops.
pub(crate) fn full_check<M: NeighborMode>(cell: &VoronoiCellBase<M>) {
    cell.check_relations().expect("edge relations broken");
    let v = cell.vertex_count();
    let e = cell.edge_count();
    let f = cell.face_count();
    assert_eq!(
        v + f,
        e + 2,
        "euler characteristic broken: V={} E={} F={}",
        v,
        e,
        f
    );
}

/// Compare a face-size histogram against `(size, count)` pairs.
pub(crate) fn assert_hist<M: NeighborMode>(cell: &VoronoiCellBase<M>, expect: &[(usize, usize)]) {
    let hist = cell.face_size_histogram();
    assert_eq!(
        hist.len(),
        expect.len(),
        "histogram sizes differ: got {:?}, expected {:?}",
        hist,
        expect
    );
    for &(k, n) in expect {
        assert_eq!(
            hist.get(&k),
            Some(&n),
            "histogram at {}: got {:?}, expected {:?}",
            k,
            hist,
            expect
        );
    }
}
