//! # molgrid Core Library
//!
//! Fixed-dimension numeric grids and a rigid-body transform engine for representing and
//! geometrically augmenting coordinate and voxel data in machine-learning pipelines, for
//! example molecular structures mapped onto 3D grids.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Grid views and owning grids with host/device residency
//!   tracked in the type system, unit-quaternion algebra, rigid transforms, and the
//!   process-wide random engine used for augmentation sampling.
//!
//! - **[`config`]: Configuration.** Augmentation parameters, assembled through a builder or
//!   loaded from a TOML file.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures such as randomly rotating and
//!   translating a coordinate set while keeping the transform for mapping results back.

pub mod config;
pub mod core;
pub mod workflows;

pub use crate::core::random::set_random_seed;
