//! # Core Module
//!
//! The computational foundation of molgrid.
//!
//! ## Architecture
//!
//! - **Grids** ([`grid`]) - Dimension-generic views (`Grid`, `GridMut`) over contiguous buffers,
//!   the owning `ManagedGrid`, the simulated device arena and the catalog of supported
//!   instantiations exposed to binding layers.
//! - **Geometry** ([`geometry`]) - `Quaternion` algebra, uniform SO(3) sampling and the
//!   `Transform` rigid-motion engine that maps coordinate rows forward and backward.
//! - **Randomness** ([`random`]) - The single seedable engine shared by all random sampling.
//!
//! ## Residency
//!
//! Whether a buffer lives in host or device memory is a type parameter (`Host` / `Device`),
//! never a runtime flag. Data moves between the two only through explicit, blocking calls on
//! `ManagedGrid`.

pub mod geometry;
pub mod grid;
pub mod random;
