//! Three-dimensional Voronoi tessellations by cell-based half-space
//! clipping.
//!
//! Each seed's cell starts as the whole rectangular domain and is cut by
//! the perpendicular bisector of every near-enough neighbour, supplied in
//! distance order by a uniform block grid, until no further neighbour can
//! touch it. Optional periodic boundaries, radical (power-diagram)
//! weighting, wall boundaries, and per-face neighbour tracking are
//! supported.
//!
//! # Example
//!
//! ```
//! use vorocell::{Container, VoronoiCell};
//!
//! // eight seeds on a 2x2x2 lattice in a periodic unit domain
//! let mut container = Container::new(
//!     -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, // domain
//!     2, 2, 2,                         // blocks
//!     true, true, true,                // periodic
//! );
//! let mut n = 0;
//! for x in [-0.5, 0.5] {
//!     for y in [-0.5, 0.5] {
//!         for z in [-0.5, 0.5] {
//!             container.put(n, x, y, z);
//!             n += 1;
//!         }
//!     }
//! }
//!
//! let mut cell = VoronoiCell::new();
//! let alive = container.compute_cell(&mut cell, 0, 0).unwrap();
//! assert!(alive);
//! assert!((cell.volume() - 1.0).abs() < 1e-9);
//! ```
//!
//! A cell can also be driven directly, without a container:
//!
//! ```
//! use vorocell::VoronoiCell;
//!
//! let mut cell = VoronoiCell::new();
//! cell.init_box(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
//! // bisector of a neighbour at (1, 0, 0): the plane x = 0.5
//! cell.plane(1.0, 0.0, 0.0, 1.0).unwrap();
//! assert!((cell.volume() - 6.0).abs() < 1e-9);
//! ```

mod cell;
mod container;
mod error;
mod real;

pub use cell::{
    NeighborMode, Neighbors, NoNeighbors, VoronoiCell, VoronoiCellBase, VoronoiCellNeighbor,
};
pub use container::{
    BlockCursor, Container, CursorStep, DEFAULT_WALL_ID, ImportReport, ParticleRef, Wall,
    WallCylinder, WallPlane, WallSphere,
};
pub use error::VoroError;
pub use real::{MAX_VERTICES, Real, TOL, TOL2};

use std::sync::OnceLock;

/// Diagnostics are written to stderr when `VOROCELL_LOG` is `1` or `true`.
pub(crate) fn log_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        std::env::var("VOROCELL_LOG")
            .ok()
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    })
}
