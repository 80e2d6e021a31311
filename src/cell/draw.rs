//! Cell output: gnuplot and POV-Ray geometry, face lists, face statistics.
//!
//! Emitters take the seed's world position so the cell, which lives in a
//! seed-centred frame, lands at the right place in the output.

use std::io::{self, Write};

use super::{NeighborMode, VoronoiCellBase};
use crate::real::Real;

impl<M: NeighborMode> VoronoiCellBase<M> {
    /// World-space position of vertex `v` for a seed at `(x, y, z)`.
    #[inline]
    fn world(&self, v: usize, x: Real, y: Real, z: Real) -> (Real, Real, Real) {
        let (vx, vy, vz) = self.pt(v);
        (x + 0.5 * vx, y + 0.5 * vy, z + 0.5 * vz)
    }

    /// Visit every undirected edge once.
    fn for_each_edge(&self, mut f: impl FnMut(usize, usize)) {
        for v in 0..self.vertex_count() {
            for m in 0..self.order(v) {
                let j = self.nbr(v, m) as usize;
                if v < j {
                    f(v, j);
                }
            }
        }
    }

    /// Write the cell's edges as gnuplot line segments: each edge is a pair
    /// of endpoint rows followed by a blank line.
    pub fn draw_gnuplot<W: Write>(
        &self,
        x: Real,
        y: Real,
        z: Real,
        w: &mut W,
    ) -> io::Result<()> {
        let mut out = Ok(());
        self.for_each_edge(|a, b| {
            if out.is_err() {
                return;
            }
            let (ax, ay, az) = self.world(a, x, y, z);
            let (bx, by, bz) = self.world(b, x, y, z);
            out = writeln!(w, "{} {} {}\n{} {} {}\n", ax, ay, az, bx, by, bz);
        });
        out
    }

    /// Write the cell as POV-Ray spheres (vertices) and cylinders (edges).
    /// The radius is left as the literal `r` for a POV `#declare`.
    pub fn draw_pov<W: Write>(&self, x: Real, y: Real, z: Real, w: &mut W) -> io::Result<()> {
        for v in 0..self.vertex_count() {
            let (vx, vy, vz) = self.world(v, x, y, z);
            writeln!(w, "sphere{{<{},{},{}>,r}}", vx, vy, vz)?;
        }
        let mut out = Ok(());
        self.for_each_edge(|a, b| {
            if out.is_err() {
                return;
            }
            let (ax, ay, az) = self.world(a, x, y, z);
            let (bx, by, bz) = self.world(b, x, y, z);
            out = writeln!(
                w,
                "cylinder{{<{},{},{}>,<{},{},{}>,r}}",
                ax, ay, az, bx, by, bz
            );
        });
        out
    }

    /// Write the cell as a POV-Ray `mesh2` of triangulated faces.
    pub fn draw_pov_mesh<W: Write>(
        &self,
        x: Real,
        y: Real,
        z: Real,
        w: &mut W,
    ) -> io::Result<()> {
        let p = self.vertex_count();
        writeln!(w, "mesh2 {{")?;
        writeln!(w, "vertex_vectors {{")?;
        writeln!(w, "{},", p)?;
        for v in 0..p {
            let (vx, vy, vz) = self.world(v, x, y, z);
            writeln!(w, "<{},{},{}>,", vx, vy, vz)?;
        }
        writeln!(w, "}}")?;
        let mut tris: Vec<[u32; 3]> = Vec::new();
        self.for_each_face(|cyc, _| {
            for t in 1..cyc.len() - 1 {
                tris.push([cyc[0], cyc[t], cyc[t + 1]]);
            }
        });
        writeln!(w, "face_indices {{")?;
        writeln!(w, "{},", tris.len())?;
        for [a, b, c] in &tris {
            writeln!(w, "<{},{},{}>,", a, b, c)?;
        }
        writeln!(w, "}}")?;
        writeln!(w, "inside_vector <0,0,1>")?;
        writeln!(w, "}}")?;
        Ok(())
    }

    /// Write one line per face listing its cyclic vertex indices.
    pub fn facets<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut out = Ok(());
        self.for_each_face(|cyc, _| {
            if out.is_err() {
                return;
            }
            out = (|| {
                write!(w, "{}", cyc.len())?;
                for v in cyc {
                    write!(w, " {}", v)?;
                }
                writeln!(w)
            })();
        });
        out
    }

    /// Write `k count` lines for every observed face size, ascending.
    pub fn facet_statistics<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let hist = self.face_size_histogram();
        let mut sizes: Vec<usize> = hist.keys().copied().collect();
        sizes.sort_unstable();
        for k in sizes {
            writeln!(w, "{} {}", k, hist[&k])?;
        }
        Ok(())
    }
}
