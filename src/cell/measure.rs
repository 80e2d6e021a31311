//! Geometric summaries of a cell: volume, bounding radius, faces.
//!
//! Faces have no explicit representation; they are equivalence classes of
//! directed edges under the walk "move to the neighbour, then take the entry
//! after the back-index". Every routine here recovers them by that walk.

use rustc_hash::FxHashMap;

use super::{NeighborMode, VoronoiCellBase};
use crate::real::Real;

impl<M: NeighborMode> VoronoiCellBase<M> {
    /// Walk every face once. The callback receives the cyclic vertex list
    /// and the face's first directed edge `(vertex, position)`.
    pub(crate) fn for_each_face(&self, mut f: impl FnMut(&[u32], (usize, usize))) {
        let p = self.vertex_count();
        let mut offs = Vec::with_capacity(p + 1);
        let mut total = 0usize;
        for v in 0..p {
            offs.push(total);
            total += self.order(v);
        }
        offs.push(total);
        let mut visited = vec![false; total];
        let mut cyc: Vec<u32> = Vec::new();
        for v in 0..p {
            for m in 0..self.order(v) {
                if visited[offs[v] + m] {
                    continue;
                }
                cyc.clear();
                let (mut a, mut b) = (v, m);
                while !visited[offs[a] + b] {
                    visited[offs[a] + b] = true;
                    cyc.push(a as u32);
                    let j = self.nbr(a, b) as usize;
                    let bb = self.back(a, b);
                    a = j;
                    b = (bb + 1) % self.order(j);
                }
                f(&cyc, (v, m));
            }
        }
    }

    /// The cell volume.
    ///
    /// Signed tetrahedra fanned from vertex 0 across every triangulated
    /// face; the 1/48 absorbs both the tetrahedron 1/6 and the doubled
    /// coordinate frame.
    pub fn volume(&self) -> Real {
        if self.vertex_count() == 0 {
            return 0.0;
        }
        let (ox, oy, oz) = self.pt(0);
        let mut vol = 0.0;
        self.for_each_face(|cyc, _| {
            let (ax, ay, az) = self.pt(cyc[0] as usize);
            let (ux, uy, uz) = (ax - ox, ay - oy, az - oz);
            for t in 1..cyc.len() - 1 {
                let (bx, by, bz) = self.pt(cyc[t] as usize);
                let (cx, cy, cz) = self.pt(cyc[t + 1] as usize);
                let (vx, vy, vz) = (bx - ox, by - oy, bz - oz);
                let (wx, wy, wz) = (cx - ox, cy - oy, cz - oz);
                vol += ux * (vy * wz - vz * wy) + uy * (vz * wx - vx * wz)
                    + uz * (vx * wy - vy * wx);
            }
        });
        vol.abs() / 48.0
    }

    /// Maximum squared vertex distance from the cell's local origin, in the
    /// doubled frame: this is precisely the `|d|²` threshold below which a
    /// neighbour at displacement `d` can still cut the cell.
    pub fn max_radius_sq(&self) -> Real {
        let mut max = 0.0;
        for v in 0..self.vertex_count() {
            let (x, y, z) = self.pt(v);
            let rs = x * x + y * y + z * z;
            if rs > max {
                max = rs;
            }
        }
        max
    }

    /// One cyclic vertex-index list per face.
    pub fn face_vertex_lists(&self) -> Vec<Vec<u32>> {
        let mut faces = Vec::new();
        self.for_each_face(|cyc, _| faces.push(cyc.to_vec()));
        faces
    }

    /// Face-size histogram: `k -> number of k-gonal faces`.
    pub fn face_size_histogram(&self) -> FxHashMap<usize, usize> {
        let mut hist = FxHashMap::default();
        self.for_each_face(|cyc, _| {
            *hist.entry(cyc.len()).or_insert(0) += 1;
        });
        hist
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        let mut n = 0;
        self.for_each_face(|_, _| n += 1);
        n
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        (0..self.vertex_count()).map(|v| self.order(v)).sum::<usize>() / 2
    }
}
