//! Dimension-generic grids.
//!
//! A [`Grid`] / [`GridMut`] is a borrowed view: a shape plus a slice, with no ownership of the
//! underlying memory. A [`ManagedGrid`] owns its host buffer and an optional device mirror
//! allocated from a [`DeviceArena`]; both are released when the grid is dropped.
//!
//! Layout is row-major: the last axis is contiguous.

pub mod arena;
pub mod catalog;
pub mod element;
pub mod error;
pub mod managed;
pub mod residency;
pub mod shape;
pub mod view;

pub use arena::{DeviceArena, DeviceBuffer};
pub use element::GridElement;
pub use error::GridError;
pub use managed::ManagedGrid;
pub use residency::{Device, Host, Residency};
pub use shape::Shape;
pub use view::{Grid, GridMut, ScalarIndex, ScalarIndexMut};

/// Largest dimension count instantiated for binding layers.
pub const MAX_GRID_DIMS: usize = 6;
