//! # Workflows Module
//!
//! High-level entry points that tie grids, transforms, the random engine and configuration
//! together.
//!
//! - **Augmentation** ([`augment`]) - Random rigid-body augmentation of a coordinate set,
//!   returning the applied transform so model outputs can be mapped back.

pub mod augment;
