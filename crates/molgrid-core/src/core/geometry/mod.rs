//! Rigid-motion geometry.
//!
//! - [`quaternion`] - Quaternion algebra and uniform sampling of rotations.
//! - [`transform`] - Rotation about a center followed by a translation, applied to grids of
//!   coordinate rows.

pub mod quaternion;
pub mod transform;

pub use quaternion::{Quaternion, QuaternionError};
pub use transform::{Transform, TransformError};
