//! The spatial grid: seeds binned into axis-aligned blocks.
//!
//! The domain `[ax, bx] × [ay, by] × [az, bz]` is divided into
//! `nx · ny · nz` blocks, each owning its particle arrays. Positions are
//! packed per block with stride 3, or 4 in the radical variant where the
//! fourth component is the particle radius. Insertion wraps periodic axes
//! into the canonical image and rejects out-of-domain seeds otherwise.

mod compute;
mod cursor;
mod walls;


pub use cursor::{BlockCursor, CursorStep};
pub use walls::{Wall, WallCylinder, WallPlane, WallSphere, DEFAULT_WALL_ID};

use std::io::{self, BufRead, Write};

use cursor::SubGrid;

use crate::error::VoroError;
use crate::log_enabled;
use crate::real::Real;

/// A rectangular domain subdivided into blocks of seeds.
pub struct Container {
    ax: Real,
    bx: Real,
    ay: Real,
    by: Real,
    az: Real,
    bz: Real,
    nx: usize,
    ny: usize,
    nz: usize,
    /// Blocks per unit length on each axis.
    xsp: Real,
    ysp: Real,
    zsp: Real,
    xperiodic: bool,
    yperiodic: bool,
    zperiodic: bool,
    /// Per-block seed ids.
    ids: Vec<Vec<i32>>,
    /// Per-block packed positions, stride `ps`.
    pos: Vec<Vec<Real>>,
    /// 3, or 4 when each particle carries a radius.
    ps: usize,
    /// Largest inserted radius; bounds the radical cut-off.
    max_radius: Real,
    walls: Vec<Box<dyn Wall>>,
}

/// A view of one stored particle.
#[derive(Debug, Clone, Copy)]
pub struct ParticleRef {
    pub block: usize,
    pub slot: usize,
    pub id: i32,
    pub position: [Real; 3],
    pub radius: Real,
}

/// Outcome of an [`import`](Container::import) pass. Record-level problems
/// are non-fatal: the offending lines are skipped and reported here.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Seeds stored in the container.
    pub stored: usize,
    /// One [`VoroError::BadRecord`] per malformed line.
    pub errors: Vec<VoroError>,
    /// Well-formed seeds rejected for lying outside a non-periodic domain.
    pub rejected: usize,
}

impl Container {
    /// A container for the plain Voronoi tessellation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ax: Real,
        bx: Real,
        ay: Real,
        by: Real,
        az: Real,
        bz: Real,
        nx: usize,
        ny: usize,
        nz: usize,
        xperiodic: bool,
        yperiodic: bool,
        zperiodic: bool,
    ) -> Self {
        Self::with_ps(
            ax, bx, ay, by, az, bz, nx, ny, nz, xperiodic, yperiodic, zperiodic, 3,
        )
    }

    /// A container for the radical (power-diagram) tessellation; particles
    /// carry a radius and bisectors shift by the weight difference.
    #[allow(clippy::too_many_arguments)]
    pub fn new_radical(
        ax: Real,
        bx: Real,
        ay: Real,
        by: Real,
        az: Real,
        bz: Real,
        nx: usize,
        ny: usize,
        nz: usize,
        xperiodic: bool,
        yperiodic: bool,
        zperiodic: bool,
    ) -> Self {
        Self::with_ps(
            ax, bx, ay, by, az, bz, nx, ny, nz, xperiodic, yperiodic, zperiodic, 4,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn with_ps(
        ax: Real,
        bx: Real,
        ay: Real,
        by: Real,
        az: Real,
        bz: Real,
        nx: usize,
        ny: usize,
        nz: usize,
        xperiodic: bool,
        yperiodic: bool,
        zperiodic: bool,
        ps: usize,
    ) -> Self {
        assert!(bx > ax && by > ay && bz > az, "domain must have extent");
        assert!(nx > 0 && ny > 0 && nz > 0, "need at least one block per axis");
        let blocks = nx * ny * nz;
        Self {
            ax,
            bx,
            ay,
            by,
            az,
            bz,
            nx,
            ny,
            nz,
            xsp: nx as Real / (bx - ax),
            ysp: ny as Real / (by - ay),
            zsp: nz as Real / (bz - az),
            xperiodic,
            yperiodic,
            zperiodic,
            ids: vec![Vec::new(); blocks],
            pos: vec![Vec::new(); blocks],
            ps,
            max_radius: 0.0,
            walls: Vec::new(),
        }
    }

    /// Whether this container stores per-particle radii.
    #[inline]
    pub fn is_radical(&self) -> bool {
        self.ps == 4
    }

    #[inline]
    pub(crate) fn block_dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// Domain extent per axis.
    #[inline]
    pub(crate) fn spans(&self) -> (Real, Real, Real) {
        (self.bx - self.ax, self.by - self.ay, self.bz - self.az)
    }

    #[inline]
    pub(crate) fn periodic(&self) -> (bool, bool, bool) {
        (self.xperiodic, self.yperiodic, self.zperiodic)
    }

    #[inline]
    pub(crate) fn bounds(&self) -> (Real, Real, Real, Real, Real, Real) {
        (self.ax, self.bx, self.ay, self.by, self.az, self.bz)
    }

    #[inline]
    fn blocks(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub(crate) fn block_len(&self, b: usize) -> usize {
        self.ids[b].len()
    }

    pub(crate) fn particle(&self, block: usize, slot: usize) -> ParticleRef {
        let base = slot * self.ps;
        ParticleRef {
            block,
            slot,
            id: self.ids[block][slot],
            position: [
                self.pos[block][base],
                self.pos[block][base + 1],
                self.pos[block][base + 2],
            ],
            radius: if self.ps == 4 {
                self.pos[block][base + 3]
            } else {
                0.0
            },
        }
    }

    pub(crate) fn max_radius(&self) -> Real {
        self.max_radius
    }

    pub(crate) fn wall_list(&self) -> &[Box<dyn Wall>] {
        &self.walls
    }

    /// Confine cells by an additional wall.
    pub fn add_wall<W: Wall + 'static>(&mut self, wall: W) {
        self.walls.push(Box::new(wall));
    }

    /// Wrap one coordinate into `[a, b)` if periodic; `None` when it falls
    /// outside a non-periodic axis.
    #[inline]
    fn canonical(v: Real, a: Real, b: Real, periodic: bool) -> Option<Real> {
        if periodic {
            let span = b - a;
            Some(v - span * ((v - a) / span).floor())
        } else if v >= a && v < b {
            Some(v)
        } else {
            None
        }
    }

    /// Block coordinates of an in-domain position.
    #[inline]
    fn locate(&self, x: Real, y: Real, z: Real) -> usize {
        let i = (((x - self.ax) * self.xsp) as usize).min(self.nx - 1);
        let j = (((y - self.ay) * self.ysp) as usize).min(self.ny - 1);
        let k = (((z - self.az) * self.zsp) as usize).min(self.nz - 1);
        i + self.nx * (j + self.ny * k)
    }

    /// Store a seed. Periodic axes wrap the coordinate into the canonical
    /// image; on a non-periodic axis an out-of-domain seed is rejected and
    /// `false` returned.
    pub fn put(&mut self, id: i32, x: Real, y: Real, z: Real) -> bool {
        self.put_with_radius(id, x, y, z, 0.0)
    }

    /// Store a weighted seed (radical variant). On a plain container the
    /// radius is dropped.
    pub fn put_radical(&mut self, id: i32, x: Real, y: Real, z: Real, r: Real) -> bool {
        self.put_with_radius(id, x, y, z, r)
    }

    fn put_with_radius(&mut self, id: i32, x: Real, y: Real, z: Real, r: Real) -> bool {
        let Some(x) = Self::canonical(x, self.ax, self.bx, self.xperiodic) else {
            return false;
        };
        let Some(y) = Self::canonical(y, self.ay, self.by, self.yperiodic) else {
            return false;
        };
        let Some(z) = Self::canonical(z, self.az, self.bz, self.zperiodic) else {
            return false;
        };
        let b = self.locate(x, y, z);
        self.ids[b].push(id);
        self.pos[b].push(x);
        self.pos[b].push(y);
        self.pos[b].push(z);
        if self.ps == 4 {
            self.pos[b].push(r);
            if r > self.max_radius {
                self.max_radius = r;
            }
        }
        true
    }

    /// Drop every particle, keeping block capacity.
    pub fn clear(&mut self) {
        for b in 0..self.blocks() {
            self.ids[b].clear();
            self.pos[b].clear();
        }
        self.max_radius = 0.0;
    }

    /// Total stored particle count.
    pub fn total_particles(&self) -> usize {
        self.ids.iter().map(Vec::len).sum()
    }

    /// Iterate all stored particles in block order.
    pub fn particles(&self) -> impl Iterator<Item = ParticleRef> + '_ {
        (0..self.blocks())
            .flat_map(move |b| (0..self.block_len(b)).map(move |q| self.particle(b, q)))
    }

    /// Read whitespace-separated `id x y z` records (`id x y z r` for a
    /// radical container), one per line. Malformed records and out-of-domain
    /// seeds are skipped, logged, and reported in the returned
    /// [`ImportReport`]; only an I/O failure is an `Err`.
    pub fn import<R: BufRead>(&mut self, reader: R) -> Result<ImportReport, VoroError> {
        let want = if self.ps == 4 { 5 } else { 4 };
        let mut report = ImportReport::default();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let parsed = (|| {
                if fields.len() != want {
                    return None;
                }
                let id = fields[0].parse::<i32>().ok()?;
                let x = fields[1].parse::<Real>().ok()?;
                let y = fields[2].parse::<Real>().ok()?;
                let z = fields[3].parse::<Real>().ok()?;
                let r = if want == 5 {
                    fields[4].parse::<Real>().ok()?
                } else {
                    0.0
                };
                Some((id, x, y, z, r))
            })();
            match parsed {
                Some((id, x, y, z, r)) => {
                    if self.put_with_radius(id, x, y, z, r) {
                        report.stored += 1;
                    } else {
                        report.rejected += 1;
                        if log_enabled() {
                            eprintln!(
                                "import: seed {} at line {} outside the domain, skipped",
                                id,
                                lineno + 1
                            );
                        }
                    }
                }
                None => {
                    report.errors.push(VoroError::BadRecord { line: lineno + 1 });
                    if log_enabled() {
                        eprintln!("import: malformed record at line {}, skipped", lineno + 1);
                    }
                }
            }
        }
        Ok(report)
    }

    /// Sub-grid of blocks overlapping a ball, per axis independently;
    /// clamped on non-periodic axes.
    pub(crate) fn ball_sub(&self, x: Real, y: Real, z: Real, r: Real) -> SubGrid {
        self.aabb_sub(x - r, x + r, y - r, y + r, z - r, z + r)
    }

    pub(crate) fn aabb_sub(
        &self,
        xmin: Real,
        xmax: Real,
        ymin: Real,
        ymax: Real,
        zmin: Real,
        zmax: Real,
    ) -> SubGrid {
        let mut ai = ((xmin - self.ax) * self.xsp).floor() as i64;
        let mut bi = ((xmax - self.ax) * self.xsp).floor() as i64;
        let mut aj = ((ymin - self.ay) * self.ysp).floor() as i64;
        let mut bj = ((ymax - self.ay) * self.ysp).floor() as i64;
        let mut ak = ((zmin - self.az) * self.zsp).floor() as i64;
        let mut bk = ((zmax - self.az) * self.zsp).floor() as i64;
        if !self.xperiodic {
            ai = ai.max(0);
            bi = bi.min(self.nx as i64 - 1);
        }
        if !self.yperiodic {
            aj = aj.max(0);
            bj = bj.min(self.ny as i64 - 1);
        }
        if !self.zperiodic {
            ak = ak.max(0);
            bk = bk.min(self.nz as i64 - 1);
        }
        SubGrid {
            ai,
            bi,
            aj,
            bj,
            ak,
            bk,
        }
    }

    /// Whether a point lies inside the domain and all walls.
    pub fn point_inside(&self, x: Real, y: Real, z: Real) -> bool {
        if x < self.ax || x >= self.bx || y < self.ay || y >= self.by || z < self.az
            || z >= self.bz
        {
            return false;
        }
        self.walls.iter().all(|w| w.point_inside(x, y, z))
    }

    /// Write `i j k count` for every block.
    pub fn region_count<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for k in 0..self.nz {
            for j in 0..self.ny {
                for i in 0..self.nx {
                    let b = i + self.nx * (j + self.ny * k);
                    writeln!(w, "{} {} {} {}", i, j, k, self.ids[b].len())?;
                }
            }
        }
        Ok(())
    }

    /// Dump `id x y z` (`id x y z r` when radical) for every particle.
    pub fn draw_particles<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for p in self.particles() {
            if self.ps == 4 {
                writeln!(
                    w,
                    "{} {} {} {} {}",
                    p.id, p.position[0], p.position[1], p.position[2], p.radius
                )?;
            } else {
                writeln!(w, "{} {} {} {}", p.id, p.position[0], p.position[1], p.position[2])?;
            }
        }
        Ok(())
    }

    /// Dump every particle as a POV-Ray sphere.
    pub fn draw_particles_pov<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for p in self.particles() {
            writeln!(w, "// id {}", p.id)?;
            if self.ps == 4 {
                writeln!(
                    w,
                    "sphere{{<{},{},{}>,{}}}",
                    p.position[0], p.position[1], p.position[2], p.radius
                )?;
            } else {
                writeln!(
                    w,
                    "sphere{{<{},{},{}>,s}}",
                    p.position[0], p.position[1], p.position[2]
                )?;
            }
        }
        Ok(())
    }

    /// Draw the domain box as gnuplot line segments.
    pub fn draw_domain_gnuplot<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (a, b) in self.domain_edges() {
            writeln!(w, "{} {} {}\n{} {} {}\n", a[0], a[1], a[2], b[0], b[1], b[2])?;
        }
        Ok(())
    }

    /// Draw the domain box as POV-Ray cylinders and corner spheres.
    pub fn draw_domain_pov<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (a, b) in self.domain_edges() {
            writeln!(
                w,
                "cylinder{{<{},{},{}>,<{},{},{}>,rr}}",
                a[0], a[1], a[2], b[0], b[1], b[2]
            )?;
        }
        for x in [self.ax, self.bx] {
            for y in [self.ay, self.by] {
                for z in [self.az, self.bz] {
                    writeln!(w, "sphere{{<{},{},{}>,rr}}", x, y, z)?;
                }
            }
        }
        Ok(())
    }

    fn domain_edges(&self) -> Vec<([Real; 3], [Real; 3])> {
        let (ax, bx, ay, by, az, bz) = self.bounds();
        vec![
            ([ax, ay, az], [bx, ay, az]),
            ([ax, by, az], [bx, by, az]),
            ([ax, ay, bz], [bx, ay, bz]),
            ([ax, by, bz], [bx, by, bz]),
            ([ax, ay, az], [ax, by, az]),
            ([bx, ay, az], [bx, by, az]),
            ([ax, ay, bz], [ax, by, bz]),
            ([bx, ay, bz], [bx, by, bz]),
            ([ax, ay, az], [ax, ay, bz]),
            ([bx, ay, az], [bx, ay, bz]),
            ([ax, by, az], [ax, by, bz]),
            ([bx, by, az], [bx, by, bz]),
        ]
    }
}
