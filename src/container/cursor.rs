//! Block-iteration cursor: lexicographic enumeration of a sub-grid with
//! per-block periodic offsets.
//!
//! Sub-grid bounds may run outside `[0, n)` on periodic axes; the cursor
//! reduces each index to its canonical block and reports the world-space
//! displacement that must be added to a seed read from that block to obtain
//! the correct periodic image. This is the only place periodicity lives; the
//! cell kernel sees seed-centred coordinates only.

use super::Container;
use crate::real::Real;

/// Inclusive sub-grid index bounds, possibly extending past the grid on
/// periodic axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubGrid {
    pub ai: i64,
    pub bi: i64,
    pub aj: i64,
    pub bj: i64,
    pub ak: i64,
    pub bk: i64,
}

impl SubGrid {
    #[inline]
    pub fn contains(&self, (i, j, k): (i64, i64, i64)) -> bool {
        self.ai <= i && i <= self.bi && self.aj <= j && j <= self.bj && self.ak <= k && k <= self.bk
    }
}

/// One cursor step: a canonical block plus the periodic image offset.
#[derive(Debug, Clone, Copy)]
pub struct CursorStep {
    /// Canonical block index.
    pub block: usize,
    /// World-space displacement of this periodic image.
    pub offset: [Real; 3],
    /// Unwrapped sub-grid position.
    pub(crate) ijk: (i64, i64, i64),
}

/// Lexicographic iterator over a sub-grid.
#[derive(Debug)]
pub struct BlockCursor {
    nx: i64,
    ny: i64,
    nz: i64,
    spanx: Real,
    spany: Real,
    spanz: Real,
    sub: SubGrid,
    i: i64,
    j: i64,
    k: i64,
    ip: i64,
    jp: i64,
    kp: i64,
    apx: Real,
    apy: Real,
    apz: Real,
    done: bool,
}

#[inline]
fn wrap(v: i64, n: i64, span: Real) -> (i64, Real) {
    let vp = v.rem_euclid(n);
    (vp, ((v - vp) / n) as Real * span)
}

impl BlockCursor {
    /// Cursor over the blocks overlapping a ball of radius `r` around
    /// `(x, y, z)`, per axis independently (a box of blocks).
    pub fn ball(container: &Container, x: Real, y: Real, z: Real, r: Real) -> Self {
        Self::with_sub(container, container.ball_sub(x, y, z, r))
    }

    /// Cursor over the blocks overlapping an axis-aligned box.
    #[allow(clippy::too_many_arguments)]
    pub fn aabb(
        container: &Container,
        xmin: Real,
        xmax: Real,
        ymin: Real,
        ymax: Real,
        zmin: Real,
        zmax: Real,
    ) -> Self {
        Self::with_sub(container, container.aabb_sub(xmin, xmax, ymin, ymax, zmin, zmax))
    }

    pub(crate) fn with_sub(container: &Container, sub: SubGrid) -> Self {
        let (nx, ny, nz) = container.block_dims();
        let (spanx, spany, spanz) = container.spans();
        let done = sub.ai > sub.bi || sub.aj > sub.bj || sub.ak > sub.bk;
        let (ip, apx) = wrap(sub.ai, nx as i64, spanx);
        let (jp, apy) = wrap(sub.aj, ny as i64, spany);
        let (kp, apz) = wrap(sub.ak, nz as i64, spanz);
        Self {
            nx: nx as i64,
            ny: ny as i64,
            nz: nz as i64,
            spanx,
            spany,
            spanz,
            sub,
            i: sub.ai,
            j: sub.aj,
            k: sub.ak,
            ip,
            jp,
            kp,
            apx,
            apy,
            apz,
            done,
        }
    }

    /// The next block and its periodic offset, or `None` when the sub-grid
    /// is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<CursorStep> {
        if self.done {
            return None;
        }
        let step = CursorStep {
            block: (self.ip + self.nx * (self.jp + self.ny * self.kp)) as usize,
            offset: [self.apx, self.apy, self.apz],
            ijk: (self.i, self.j, self.k),
        };
        self.advance();
        Some(step)
    }

    fn advance(&mut self) {
        self.i += 1;
        self.ip += 1;
        if self.ip == self.nx {
            self.ip = 0;
            self.apx += self.spanx;
        }
        if self.i <= self.sub.bi {
            return;
        }
        self.i = self.sub.ai;
        let (ip, apx) = wrap(self.i, self.nx, self.spanx);
        self.ip = ip;
        self.apx = apx;

        self.j += 1;
        self.jp += 1;
        if self.jp == self.ny {
            self.jp = 0;
            self.apy += self.spany;
        }
        if self.j <= self.sub.bj {
            return;
        }
        self.j = self.sub.aj;
        let (jp, apy) = wrap(self.j, self.ny, self.spany);
        self.jp = jp;
        self.apy = apy;

        self.k += 1;
        self.kp += 1;
        if self.kp == self.nz {
            self.kp = 0;
            self.apz += self.spanz;
        }
        if self.k > self.sub.bk {
            self.done = true;
        }
    }
}
