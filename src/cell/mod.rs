//! The per-cell geometric kernel.
//!
//! A cell starts as a finite convex polyhedron (box or octahedron) and is
//! repeatedly intersected with half-spaces until it converges to the seed's
//! Voronoi region. The polyhedron is held as packed vertex coordinates plus
//! cyclic edge lists with inline back-indices, pooled per vertex order, so
//! the structure is index-based and relocatable with no pointer chasing.
//!
//! Vertex coordinates are stored doubled. That absorbs the factor 2 of the
//! perpendicular-bisector equation `2 d·q = |d|²`: a cut by a neighbour at
//! displacement `d` passes plane parameters `(dx, dy, dz, |d|²)` directly.
//! [`volume`](VoronoiCellBase::volume) and the vertex accessors scale back
//! to real space; [`max_radius_sq`](VoronoiCellBase::max_radius_sq) stays in
//! the doubled frame, where it is exactly the `|d|²` cut-off below which a
//! candidate neighbour can still touch the cell.

mod classify;
mod cut;
mod draw;
mod measure;
mod neighbor;

#[cfg(test)]
mod tests;

pub use neighbor::{NeighborMode, Neighbors, NoNeighbors};

use rand::Rng;

use crate::error::VoroError;
use crate::real::{Real, MAX_VERTICES};
use classify::{PlaneTest, Verdict};
use cut::ContourEntry;

/// Sentinel for the scratch slot of an edge record; any other value means a
/// cut is in progress.
const SCRATCH_CLEAR: i32 = -1;

/// A slab of edge records of a single order `k`.
///
/// Each record is `2k + 1` signed integers: `k` neighbour vertex indices in
/// cyclic order, `k` back-indices (the position at which the owning vertex
/// appears in each neighbour's own list), and one scratch slot. A parallel
/// owner table lets swap-removal re-point the owning vertex at its moved
/// record.
#[derive(Debug)]
struct EdgePool {
    order: usize,
    data: Vec<i32>,
    owners: Vec<u32>,
}

impl EdgePool {
    fn new(order: usize) -> Self {
        Self {
            order,
            data: Vec::new(),
            owners: Vec::new(),
        }
    }

    #[inline]
    fn rec_len(&self) -> usize {
        2 * self.order + 1
    }

    fn clear(&mut self) {
        self.data.clear();
        self.owners.clear();
    }

    /// Append a fresh record (neighbours and back-indices zeroed, scratch at
    /// the sentinel) and return its slot.
    fn alloc(&mut self, owner: u32) -> u32 {
        let slot = self.owners.len();
        let len = self.rec_len();
        self.data.resize(self.data.len() + len, 0);
        let end = self.data.len();
        self.data[end - 1] = SCRATCH_CLEAR;
        self.owners.push(owner);
        slot as u32
    }

    /// Swap-remove the record at `slot`. Returns the owner of the record
    /// that was moved into `slot`, if any.
    fn free(&mut self, slot: u32) -> Option<u32> {
        let len = self.rec_len();
        let last = self.owners.len() - 1;
        let moved = if (slot as usize) < last {
            self.data.copy_within(last * len..(last + 1) * len, slot as usize * len);
            let owner = self.owners[last];
            self.owners[slot as usize] = owner;
            Some(owner)
        } else {
            None
        };
        self.owners.pop();
        self.data.truncate(last * len);
        moved
    }

    #[inline]
    fn get(&self, slot: u32, i: usize) -> i32 {
        self.data[slot as usize * self.rec_len() + i]
    }

    #[inline]
    fn set(&mut self, slot: u32, i: usize, val: i32) {
        let len = self.rec_len();
        self.data[slot as usize * len + i] = val;
    }
}

/// A convex cell polyhedron, generic over neighbour tracking.
///
/// Use the [`VoronoiCell`] and [`VoronoiCellNeighbor`] aliases.
#[derive(Debug)]
pub struct VoronoiCellBase<M: NeighborMode> {
    /// Live vertex count.
    p: usize,
    /// Packed doubled vertex coordinates, `3 * p` long.
    pts: Vec<Real>,
    /// Order (incident edge count) per vertex.
    nu: Vec<usize>,
    /// Slot of each vertex's record within the pool of its order.
    slot: Vec<u32>,
    /// Edge record pools, indexed by order.
    pools: Vec<EdgePool>,
    /// Main delete stack: vertices cut away by the current plane.
    ds: Vec<u32>,
    /// Auxiliary stack: collapse candidates reached during cleanup.
    ds2: Vec<u32>,
    tester: PlaneTest,
    verdicts: Vec<Verdict>,
    contour: Vec<ContourEntry>,
    touched: Vec<u32>,
    neigh: M,
}

/// A cell without neighbour bookkeeping.
pub type VoronoiCell = VoronoiCellBase<NoNeighbors>;
/// A cell that records, per face, the seed that created it.
pub type VoronoiCellNeighbor = VoronoiCellBase<Neighbors>;

// Box connectivity. Vertex v sits at corner (v&1, v&2, v&4) of
// (xmin|xmax, ymin|ymax, zmin|zmax); lists are cyclic and each back-index is
// the position of the owner in the neighbour's list. Wall tags follow the
// x-, x+, y-, y+, z-, z+ = -1..-6 convention.
const BOX_NBR: [[u32; 3]; 8] = [
    [1, 2, 4],
    [0, 5, 3],
    [0, 3, 6],
    [1, 7, 2],
    [0, 6, 5],
    [1, 4, 7],
    [2, 7, 4],
    [3, 5, 6],
];
const BOX_BACK: [[u32; 3]; 8] = [
    [0, 0, 0],
    [0, 0, 0],
    [1, 2, 0],
    [2, 0, 1],
    [2, 2, 1],
    [1, 2, 1],
    [2, 2, 1],
    [1, 2, 1],
];
const BOX_TAG: [[i32; 3]; 8] = [
    [-3, -5, -1],
    [-5, -3, -2],
    [-1, -5, -4],
    [-5, -2, -4],
    [-3, -1, -6],
    [-2, -3, -6],
    [-1, -4, -6],
    [-4, -2, -6],
];

// Octahedron connectivity; vertices 0..6 sit at -x, +x, -y, +y, -z, +z.
const OCT_NBR: [[u32; 4]; 6] = [
    [2, 4, 3, 5],
    [2, 5, 3, 4],
    [0, 5, 1, 4],
    [0, 4, 1, 5],
    [0, 2, 1, 3],
    [0, 3, 1, 2],
];
const OCT_BACK: [[u32; 4]; 6] = [
    [0, 0, 0, 0],
    [2, 2, 2, 2],
    [0, 3, 0, 1],
    [2, 3, 2, 1],
    [1, 3, 3, 1],
    [3, 3, 1, 1],
];
const OCT_TAG: [[i32; 4]; 6] = [
    [-1, -2, -3, -4],
    [-5, -6, -7, -8],
    [-2, -1, -6, -5],
    [-4, -3, -8, -7],
    [-3, -2, -5, -8],
    [-1, -4, -7, -6],
];

impl<M: NeighborMode> Default for VoronoiCellBase<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: NeighborMode> VoronoiCellBase<M> {
    /// A reset cell; initialise it with [`init_box`](Self::init_box) or
    /// [`init_octahedron`](Self::init_octahedron) before cutting.
    pub fn new() -> Self {
        Self {
            p: 0,
            pts: Vec::new(),
            nu: Vec::new(),
            slot: Vec::new(),
            pools: Vec::new(),
            ds: Vec::new(),
            ds2: Vec::new(),
            tester: PlaneTest::default(),
            verdicts: Vec::new(),
            contour: Vec::new(),
            touched: Vec::new(),
            neigh: M::default(),
        }
    }

    fn reset(&mut self) {
        self.p = 0;
        self.pts.clear();
        self.nu.clear();
        self.slot.clear();
        for pool in &mut self.pools {
            pool.clear();
        }
        self.neigh.reset();
    }

    /// Reset to the axis-aligned box `[xmin, xmax] × [ymin, ymax] × [zmin,
    /// zmax]`.
    pub fn init_box(
        &mut self,
        xmin: Real,
        xmax: Real,
        ymin: Real,
        ymax: Real,
        zmin: Real,
        zmax: Real,
    ) {
        self.reset();
        let (xmin, xmax) = (2.0 * xmin, 2.0 * xmax);
        let (ymin, ymax) = (2.0 * ymin, 2.0 * ymax);
        let (zmin, zmax) = (2.0 * zmin, 2.0 * zmax);
        for v in 0..8u32 {
            let x = if v & 1 == 0 { xmin } else { xmax };
            let y = if v & 2 == 0 { ymin } else { ymax };
            let z = if v & 4 == 0 { zmin } else { zmax };
            self.push_vertex_raw(x, y, z);
        }
        for v in 0..8 {
            self.install_record(v, &BOX_NBR[v], &BOX_BACK[v], &BOX_TAG[v]);
        }
    }

    /// Reset to the octahedron with vertices at `±l` along each axis.
    pub fn init_octahedron(&mut self, l: Real) {
        self.reset();
        let l = 2.0 * l;
        self.push_vertex_raw(-l, 0.0, 0.0);
        self.push_vertex_raw(l, 0.0, 0.0);
        self.push_vertex_raw(0.0, -l, 0.0);
        self.push_vertex_raw(0.0, l, 0.0);
        self.push_vertex_raw(0.0, 0.0, -l);
        self.push_vertex_raw(0.0, 0.0, l);
        for v in 0..6 {
            self.install_record(v, &OCT_NBR[v], &OCT_BACK[v], &OCT_TAG[v]);
        }
    }

    /// Append a vertex with no edge record yet (doubled coordinates).
    fn push_vertex_raw(&mut self, x: Real, y: Real, z: Real) {
        self.pts.push(x);
        self.pts.push(y);
        self.pts.push(z);
        self.nu.push(0);
        self.slot.push(u32::MAX);
        self.p += 1;
    }

    /// Like `push_vertex_raw` but guarded by the hard vertex limit.
    pub(crate) fn add_vertex(&mut self, x: Real, y: Real, z: Real) -> Result<u32, VoroError> {
        if self.p >= MAX_VERTICES {
            return Err(VoroError::VertexOverflow { vertices: self.p });
        }
        self.push_vertex_raw(x, y, z);
        Ok((self.p - 1) as u32)
    }

    fn install_record(&mut self, v: usize, nbrs: &[u32], backs: &[u32], tags: &[i32]) {
        let k = nbrs.len();
        let slot = self.alloc_record(k, v as u32);
        self.nu[v] = k;
        self.slot[v] = slot;
        for (m, (&j, &b)) in nbrs.iter().zip(backs).enumerate() {
            self.pools[k].set(slot, m, j as i32);
            self.pools[k].set(slot, k + m, b as i32);
        }
        if M::TRACKS {
            for (m, &t) in tags.iter().enumerate() {
                self.neigh.set(k, slot, m, t);
            }
        }
    }

    fn ensure_order(&mut self, k: usize) {
        while self.pools.len() <= k {
            self.pools.push(EdgePool::new(self.pools.len()));
        }
        self.neigh.ensure_order(k);
    }

    /// Allocate an edge record and its tag mirror in lockstep.
    pub(crate) fn alloc_record(&mut self, k: usize, owner: u32) -> u32 {
        self.ensure_order(k);
        let slot = self.pools[k].alloc(owner);
        self.neigh.alloc(k);
        slot
    }

    /// Free an edge record and its tag mirror; fix the relocated owner.
    pub(crate) fn free_record(&mut self, k: usize, slot: u32) {
        let moved = self.pools[k].free(slot);
        self.neigh.free(k, slot);
        if let Some(owner) = moved {
            self.slot[owner as usize] = slot;
        }
    }

    // --- edge table accessors -------------------------------------------

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.p
    }

    /// Order of vertex `v`.
    #[inline]
    pub fn order(&self, v: usize) -> usize {
        self.nu[v]
    }

    #[inline]
    pub(crate) fn record_slot(&self, v: usize) -> u32 {
        self.slot[v]
    }

    #[inline]
    pub(crate) fn neigh_store(&self) -> &M {
        &self.neigh
    }

    /// The `m`-th neighbour of vertex `v` in cyclic order.
    #[inline]
    pub(crate) fn nbr(&self, v: usize, m: usize) -> u32 {
        self.pools[self.nu[v]].get(self.slot[v], m) as u32
    }

    /// Position of `v` in its `m`-th neighbour's list.
    #[inline]
    pub(crate) fn back(&self, v: usize, m: usize) -> usize {
        self.pools[self.nu[v]].get(self.slot[v], self.nu[v] + m) as usize
    }

    #[inline]
    pub(crate) fn set_nbr(&mut self, v: usize, m: usize, j: u32) {
        self.pools[self.nu[v]].set(self.slot[v], m, j as i32);
    }

    #[inline]
    pub(crate) fn set_back(&mut self, v: usize, m: usize, b: usize) {
        let k = self.nu[v];
        self.pools[k].set(self.slot[v], k + m, b as i32);
    }

    #[inline]
    fn scratch_of(&self, v: usize) -> i32 {
        self.pools[self.nu[v]].get(self.slot[v], 2 * self.nu[v])
    }

    #[inline]
    fn set_scratch_of(&mut self, v: usize, val: i32) {
        let k = self.nu[v];
        self.pools[k].set(self.slot[v], 2 * k, val);
    }

    /// Point vertex `v` at the record `slot` in the order-`k` pool.
    #[inline]
    pub(crate) fn set_order(&mut self, v: usize, k: usize, slot: u32) {
        self.nu[v] = k;
        self.slot[v] = slot;
    }

    #[inline]
    pub(crate) fn neigh_mut(&mut self) -> &mut M {
        &mut self.neigh
    }

    /// Position of `target` in `v`'s neighbour list.
    pub(crate) fn position_of(&self, v: usize, target: u32) -> Result<usize, VoroError> {
        let k = self.nu[v];
        for m in 0..k {
            if self.nbr(v, m) == target {
                return Ok(m);
            }
        }
        Err(VoroError::BrokenTopology { vertex: v })
    }

    /// Real-space position of vertex `v`.
    #[inline]
    pub fn vertex(&self, v: usize) -> [Real; 3] {
        [
            0.5 * self.pts[3 * v],
            0.5 * self.pts[3 * v + 1],
            0.5 * self.pts[3 * v + 2],
        ]
    }

    /// Real-space positions of all vertices.
    pub fn vertices(&self) -> Vec<[Real; 3]> {
        (0..self.p).map(|v| self.vertex(v)).collect()
    }

    #[inline]
    pub(crate) fn pt(&self, v: usize) -> (Real, Real, Real) {
        (self.pts[3 * v], self.pts[3 * v + 1], self.pts[3 * v + 2])
    }

    // --- vertex deletion ------------------------------------------------

    /// Remove vertex `v` by swapping the last vertex into its place.
    ///
    /// The caller guarantees no live record still points at `v`. Indices of
    /// surviving vertices are not stable across this.
    pub(crate) fn delete_vertex(&mut self, v: usize) {
        self.free_record(self.nu[v], self.slot[v]);
        let last = self.p - 1;
        if v != last {
            self.pts[3 * v] = self.pts[3 * last];
            self.pts[3 * v + 1] = self.pts[3 * last + 1];
            self.pts[3 * v + 2] = self.pts[3 * last + 2];
            self.nu[v] = self.nu[last];
            self.slot[v] = self.slot[last];
            self.pools[self.nu[v]].owners[self.slot[v] as usize] = v as u32;
            for m in 0..self.nu[v] {
                let j = self.nbr(v, m) as usize;
                let b = self.back(v, m);
                self.set_nbr(j, b, v as u32);
            }
        }
        self.p = last;
        self.pts.truncate(3 * last);
        self.nu.truncate(last);
        self.slot.truncate(last);
    }

    // --- diagnostics ----------------------------------------------------

    /// Verify the half-edge pairing invariant, neighbour-list sanity, and
    /// scratch-slot discipline. Diagnostic; cheap enough for test loops.
    pub fn check_relations(&self) -> Result<(), VoroError> {
        for v in 0..self.p {
            let k = self.nu[v];
            if k < 3 {
                return Err(VoroError::BrokenTopology { vertex: v });
            }
            if self.scratch_of(v) != SCRATCH_CLEAR {
                return Err(VoroError::BrokenTopology { vertex: v });
            }
            for m in 0..k {
                let j = self.nbr(v, m) as usize;
                if j >= self.p || j == v {
                    return Err(VoroError::BrokenTopology { vertex: v });
                }
                let b = self.back(v, m);
                if b >= self.nu[j]
                    || self.nbr(j, b) as usize != v
                    || self.back(j, b) != m
                {
                    return Err(VoroError::BrokenTopology { vertex: v });
                }
                for m2 in 0..m {
                    if self.nbr(v, m2) as usize == j {
                        return Err(VoroError::BrokenTopology { vertex: v });
                    }
                }
            }
        }
        Ok(())
    }

    /// Add uniform noise of real-space amplitude `r` to every vertex.
    /// Diagnostic, for probing near-degenerate configurations.
    pub fn perturb<R: Rng>(&mut self, rng: &mut R, r: Real) {
        for c in &mut self.pts {
            *c += 2.0 * r * rng.gen_range(-1.0..1.0);
        }
    }

    /// Cut by the half-space `{q : x·qx + y·qy + z·qz <= rsq/2}` (in real
    /// coordinates); for a neighbour seed at displacement `d` pass
    /// `(dx, dy, dz, |d|²)` to cut at the perpendicular bisector.
    ///
    /// Returns `Ok(false)` when every vertex is outside and the cell is
    /// gone; the cell contents are unspecified then. A plane that removes
    /// nothing leaves the cell untouched.
    pub fn plane(&mut self, x: Real, y: Real, z: Real, rsq: Real) -> Result<bool, VoroError> {
        self.plane_id(x, y, z, rsq, 0)
    }
}
