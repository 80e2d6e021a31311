//! The per-seed computation: initialise a cell, sweep candidate neighbours
//! outward, cut, and stop as soon as no unvisited block can matter.
//!
//! Candidates come from ball cursors of doubling radius around the seed;
//! blocks inside the previous ball's bounds are skipped, so each pass
//! handles one shell. Any block left unvisited lies at real distance at
//! least `r` from the seed, and a neighbour can only cut the cell while its
//! squared distance stays below the cell's `max_radius_sq`, which yields the
//! stopping rule.

use std::io::Write;

use crate::cell::{NeighborMode, VoronoiCell, VoronoiCellBase};
use crate::container::cursor::{BlockCursor, SubGrid};
use crate::container::Container;
use crate::error::VoroError;
use crate::log_enabled;
use crate::real::{RVec3, Real};

impl Container {
    /// Reset `cell` to the whole domain as seen from a seed at `(x, y, z)`:
    /// periodic axes get half-extents either side, walls are applied.
    ///
    /// `Ok(false)` when a wall cut deletes the cell.
    pub(crate) fn init_cell<M: NeighborMode>(
        &self,
        cell: &mut VoronoiCellBase<M>,
        x: Real,
        y: Real,
        z: Real,
    ) -> Result<bool, VoroError> {
        let (ax, bx, ay, by, az, bz) = self.bounds();
        let (xp, yp, zp) = self.periodic();
        let (x1, x2) = if xp {
            let h = 0.5 * (bx - ax);
            (-h, h)
        } else {
            (ax - x, bx - x)
        };
        let (y1, y2) = if yp {
            let h = 0.5 * (by - ay);
            (-h, h)
        } else {
            (ay - y, by - y)
        };
        let (z1, z2) = if zp {
            let h = 0.5 * (bz - az);
            (-h, h)
        } else {
            (az - z, bz - z)
        };
        cell.init_box(x1, x2, y1, y2, z1, z2);
        for wall in self.wall_list() {
            if let Some((px, py, pz, rs)) = wall.cutting_plane(x, y, z) {
                if !cell.plane_id(px, py, pz, rs, wall.id())? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Compute the Voronoi cell of the particle at `(block, slot)`.
    ///
    /// `Ok(false)` means the cell was deleted (by a wall, or a radical cut
    /// that swallowed the seed); the cell contents are then unspecified.
    pub fn compute_cell<M: NeighborMode>(
        &self,
        cell: &mut VoronoiCellBase<M>,
        block: usize,
        slot: usize,
    ) -> Result<bool, VoroError> {
        let seed = self.particle(block, slot);
        let [sx, sy, sz] = seed.position;
        let s = RVec3::new(sx, sy, sz);
        let sr = seed.radius;
        if !self.init_cell(cell, sx, sy, sz)? {
            return Ok(false);
        }

        let (nx, ny, nz) = self.block_dims();
        let (spanx, spany, spanz) = self.spans();
        let min_side = (spanx / nx as Real)
            .min(spany / ny as Real)
            .min(spanz / nz as Real);
        let mut r = 0.5 * min_side;
        let mut prev: Option<SubGrid> = None;
        loop {
            let sub = self.ball_sub(sx, sy, sz, r);
            let mut cursor = BlockCursor::with_sub(self, sub);
            while let Some(step) = cursor.next() {
                if prev.map_or(false, |p| p.contains(step.ijk)) {
                    continue;
                }
                let off = RVec3::from(step.offset);
                let home = off == RVec3::ZERO;
                for q in 0..self.block_len(step.block) {
                    if home && step.block == block && q == slot {
                        continue;
                    }
                    let t = self.particle(step.block, q);
                    let d = RVec3::from(t.position) + off - s;
                    let mut rs = d.length_squared();
                    if self.is_radical() {
                        rs += sr * sr - t.radius * t.radius;
                    }
                    if !cell.plane_id(d.x, d.y, d.z, rs, t.id)? {
                        return Ok(false);
                    }
                }
            }

            // termination: every unvisited block is at least r away
            let mrs = cell.max_radius_sq();
            let finished = if self.is_radical() {
                // a particle of radius up to max_radius at distance L >= r
                // cuts only while (L² + sr² - tr²)/L < sqrt(mrs)
                let num = r * r + sr * sr - self.max_radius() * self.max_radius();
                num > 0.0 && num >= r * mrs.sqrt()
            } else {
                r * r >= mrs
            };
            if finished {
                return Ok(true);
            }
            // a fully clamped sub-grid that stopped growing has no blocks left
            if prev == Some(sub) {
                return Ok(true);
            }
            prev = Some(sub);
            r *= 2.0;
        }
    }

    /// Compute every cell once; returns how many survived. Deleted cells
    /// are reported on the log channel.
    pub fn compute_all_cells(&self) -> Result<usize, VoroError> {
        let mut cell = VoronoiCell::new();
        let mut alive = 0usize;
        for p in self.particles() {
            if self.compute_cell(&mut cell, p.block, p.slot)? {
                alive += 1;
            } else if log_enabled() {
                eprintln!("compute: cell of seed {} deleted", p.id);
            }
        }
        Ok(alive)
    }

    /// Sum of all cell volumes. In a fully periodic wall-free domain this
    /// equals the domain volume.
    pub fn sum_cell_volumes(&self) -> Result<Real, VoroError> {
        let mut cell = VoronoiCell::new();
        let mut total = 0.0;
        for p in self.particles() {
            if self.compute_cell(&mut cell, p.block, p.slot)? {
                total += cell.volume();
            }
        }
        Ok(total)
    }

    /// Compute every cell and write its edges in gnuplot format.
    pub fn draw_cells_gnuplot<W: Write>(&self, w: &mut W) -> Result<(), VoroError> {
        let mut cell = VoronoiCell::new();
        for p in self.particles() {
            if self.compute_cell(&mut cell, p.block, p.slot)? {
                cell.draw_gnuplot(p.position[0], p.position[1], p.position[2], w)?;
            }
        }
        Ok(())
    }

    /// Compute every cell and write it in POV-Ray format.
    pub fn draw_cells_pov<W: Write>(&self, w: &mut W) -> Result<(), VoroError> {
        let mut cell = VoronoiCell::new();
        for p in self.particles() {
            if self.compute_cell(&mut cell, p.block, p.slot)? {
                writeln!(w, "// cell {}", p.id).map_err(VoroError::Io)?;
                cell.draw_pov(p.position[0], p.position[1], p.position[2], w)?;
            }
        }
        Ok(())
    }
}
