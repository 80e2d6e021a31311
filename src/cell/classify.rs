//! Tolerant vertex classification against the current cutting plane.
//!
//! Floating-point comparisons near the plane can disagree between
//! evaluations once extended-precision registers or instruction reordering
//! enter the picture. The cut algorithm needs every vertex to keep a single
//! verdict for the whole duration of one cut, so marginal results are
//! memoised in a small side table and replayed on re-test. The table is
//! cleared when a new plane is primed.

use crate::real::{Real, TOL, TOL2};

/// Classification of a vertex against the cutting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Strictly inside the kept half-space.
    In,
    /// Within the on-plane band.
    On,
    /// Strictly outside; the vertex will be cut away.
    Out,
}

/// The primed plane and the memo table for marginal vertices.
///
/// A plane `(x, y, z, rsq)` keeps the half-space
/// `x·qx + y·qy + z·qz <= rsq` where `q` ranges over the cell's doubled
/// vertex coordinates, so in real space the boundary is the perpendicular
/// bisector of a neighbour at displacement `(x, y, z)` when
/// `rsq = x² + y² + z²`.
#[derive(Debug, Default)]
pub(crate) struct PlaneTest {
    px: Real,
    py: Real,
    pz: Real,
    prsq: Real,
    /// Memoised `(vertex, verdict)` pairs for this cut.
    sn: Vec<(u32, Verdict)>,
}

impl PlaneTest {
    /// Prime for a new cut. Clears the marginal table.
    pub fn init(&mut self, x: Real, y: Real, z: Real, rsq: Real) {
        self.px = x;
        self.py = y;
        self.pz = z;
        self.prsq = rsq;
        self.sn.clear();
    }

    /// Signed distance of a (doubled-coordinate) point to the plane.
    #[inline]
    pub fn dist(&self, vx: Real, vy: Real, vz: Real) -> Real {
        self.px * vx + self.py * vy + self.pz * vz - self.prsq
    }

    /// Classify vertex `v` at the given coordinates.
    ///
    /// Results with `|d| <= TOL2` are pinned on first evaluation; anything
    /// further from the plane is safe to recompute.
    pub fn test(&mut self, v: u32, vx: Real, vy: Real, vz: Real) -> (Verdict, Real) {
        let d = self.dist(vx, vy, vz);
        if d > TOL2 {
            return (Verdict::Out, d);
        }
        if d < -TOL2 {
            return (Verdict::In, d);
        }
        if let Some(&(_, verdict)) = self.sn.iter().find(|&&(sv, _)| sv == v) {
            return (verdict, d);
        }
        let verdict = if d > TOL {
            Verdict::Out
        } else if d < -TOL {
            Verdict::In
        } else {
            Verdict::On
        };
        self.sn.push((v, verdict));
        (verdict, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_verdicts() {
        let mut t = PlaneTest::default();
        t.init(1.0, 0.0, 0.0, 1.0);
        assert_eq!(t.test(0, 2.0, 0.0, 0.0).0, Verdict::Out);
        assert_eq!(t.test(1, 0.0, 5.0, -5.0).0, Verdict::In);
        assert_eq!(t.test(2, 1.0, 0.0, 0.0).0, Verdict::On);
    }

    #[test]
    fn test_marginal_memoised() {
        let mut t = PlaneTest::default();
        t.init(1.0, 0.0, 0.0, 0.0);
        let (v1, _) = t.test(7, TOL * 0.5, 0.0, 0.0);
        assert_eq!(v1, Verdict::On);
        // re-testing replays the stored verdict
        let (v2, _) = t.test(7, TOL * 0.5, 0.0, 0.0);
        assert_eq!(v2, Verdict::On);
        assert_eq!(t.sn.len(), 1, "memo grew on replay: {:?}", t.sn);
    }

    #[test]
    fn test_memo_cleared_on_init() {
        let mut t = PlaneTest::default();
        t.init(1.0, 0.0, 0.0, 0.0);
        t.test(3, 0.0, 0.0, 0.0);
        assert_eq!(t.sn.len(), 1);
        t.init(0.0, 1.0, 0.0, 0.0);
        assert!(t.sn.is_empty(), "memo table survived re-priming");
    }
}
