use super::quaternion::{Quaternion, QuaternionError};
use crate::core::grid::{Grid, GridElement, GridMut, Residency};
use crate::core::random::with_random_engine;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use std::f64::consts::TAU;
use std::fmt;
use thiserror::Error;
use tracing::{instrument, trace, warn};

const UNIT_NORM_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Input grid shape {input:?} does not match output grid shape {output:?}")]
    ShapeMismatch {
        input: [usize; 2],
        output: [usize; 2],
    },

    #[error("Coordinate grids must have shape (K, 3), found {shape:?}")]
    NotCoordinateRows { shape: [usize; 2] },

    #[error(transparent)]
    Quaternion(#[from] QuaternionError),
}

/// Rigid motion: rotation by `q` about `center`, followed by `translation`.
///
/// Forward maps `v` to `rotate(q, v - center) + center + translation`; backward is its exact
/// inverse. The default value is the identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    q: Quaternion,
    center: Point3<f64>,
    translation: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::with_center(Point3::origin())
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn new(q: Quaternion, center: Point3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            q,
            center,
            translation,
        }
    }

    /// Rotation about the origin.
    pub fn from_quaternion(q: Quaternion) -> Self {
        Self::new(q, Point3::origin(), Vector3::zeros())
    }

    /// Rotation about the origin followed by `translation`.
    pub fn with_translation(q: Quaternion, translation: Vector3<f64>) -> Self {
        Self::new(q, Point3::origin(), translation)
    }

    /// Identity motion anchored at `center`.
    pub fn with_center(center: Point3<f64>) -> Self {
        Self::new(Quaternion::identity(), center, Vector3::zeros())
    }

    /// Random translation only, drawn from the process-wide engine.
    pub fn with_random_translation(center: Point3<f64>, random_translation: f64) -> Self {
        Self::random(center, random_translation, false)
    }

    /// Random motion about `center`, drawn from the process-wide engine.
    ///
    /// The translation has a uniformly distributed direction and a length uniform in
    /// `[0, random_translation]`. When `random_rotation` is set the rotation is uniform over
    /// SO(3), otherwise it is the identity. All draws happen under one engine lock.
    #[instrument(level = "trace", skip(center))]
    pub fn random(center: Point3<f64>, random_translation: f64, random_rotation: bool) -> Self {
        with_random_engine(|rng| {
            Self::random_with(rng, center, random_translation, random_rotation)
        })
    }

    /// As [`random`](Self::random), drawing from `rng`.
    ///
    /// The translation consumes three draws (direction then length) before the rotation
    /// consumes its three.
    pub fn random_with<G: Rng + ?Sized>(
        rng: &mut G,
        center: Point3<f64>,
        random_translation: f64,
        random_rotation: bool,
    ) -> Self {
        let cos_theta: f64 = rng.gen_range(-1.0..=1.0);
        let phi: f64 = rng.gen_range(0.0..TAU);
        let length: f64 = rng.r#gen::<f64>() * random_translation;

        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let direction = Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);

        let q = if random_rotation {
            Quaternion::random(rng)
        } else {
            Quaternion::identity()
        };

        let transform = Self::new(q, center, direction * length);
        trace!("Sampled random transform: {}", transform);
        transform
    }

    #[inline]
    pub fn quaternion(&self) -> &Quaternion {
        &self.q
    }

    #[inline]
    pub fn rotation_center(&self) -> Point3<f64> {
        self.center
    }

    #[inline]
    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    pub fn set_rotation_center(&mut self, center: Point3<f64>) {
        self.center = center;
    }

    /// The transform whose translated forward map is this one's translated backward map.
    pub fn inverse(&self) -> Result<Self, TransformError> {
        Ok(Self::new(
            self.q.inverse()?,
            self.center + self.translation,
            -self.translation,
        ))
    }

    pub fn apply_point(
        &self,
        p: &Point3<f64>,
        do_translate: bool,
    ) -> Result<Point3<f64>, TransformError> {
        let map = self.forward_map(do_translate)?;
        Ok(Point3::from(map.apply(p.coords)))
    }

    pub fn unapply_point(
        &self,
        p: &Point3<f64>,
        do_translate: bool,
    ) -> Result<Point3<f64>, TransformError> {
        let map = self.backward_map(do_translate)?;
        Ok(Point3::from(map.apply(p.coords)))
    }

    /// Writes the transformed rows of `input` into `output`, translating.
    pub fn forward<T: GridElement, R: Residency>(
        &self,
        input: &Grid<'_, T, 2, R>,
        output: &mut GridMut<'_, T, 2, R>,
    ) -> Result<(), TransformError> {
        self.forward_with(input, output, true)
    }

    #[instrument(level = "trace", skip(self, input, output), fields(rows = input.len()))]
    pub fn forward_with<T: GridElement, R: Residency>(
        &self,
        input: &Grid<'_, T, 2, R>,
        output: &mut GridMut<'_, T, 2, R>,
        do_translate: bool,
    ) -> Result<(), TransformError> {
        check_shapes(input.shape(), output.shape())?;
        let map = self.forward_map(do_translate)?;
        output.as_mut_slice().copy_from_slice(input.as_slice());
        map_rows(output, &map);
        Ok(())
    }

    /// Transforms `coords` in place.
    pub fn forward_in_place<T: GridElement, R: Residency>(
        &self,
        coords: &mut GridMut<'_, T, 2, R>,
        do_translate: bool,
    ) -> Result<(), TransformError> {
        check_rows(coords.shape())?;
        let map = self.forward_map(do_translate)?;
        map_rows(coords, &map);
        Ok(())
    }

    /// Writes the inverse-transformed rows of `input` into `output`, translating.
    pub fn backward<T: GridElement, R: Residency>(
        &self,
        input: &Grid<'_, T, 2, R>,
        output: &mut GridMut<'_, T, 2, R>,
    ) -> Result<(), TransformError> {
        self.backward_with(input, output, true)
    }

    #[instrument(level = "trace", skip(self, input, output), fields(rows = input.len()))]
    pub fn backward_with<T: GridElement, R: Residency>(
        &self,
        input: &Grid<'_, T, 2, R>,
        output: &mut GridMut<'_, T, 2, R>,
        do_translate: bool,
    ) -> Result<(), TransformError> {
        check_shapes(input.shape(), output.shape())?;
        let map = self.backward_map(do_translate)?;
        output.as_mut_slice().copy_from_slice(input.as_slice());
        map_rows(output, &map);
        Ok(())
    }

    pub fn backward_in_place<T: GridElement, R: Residency>(
        &self,
        coords: &mut GridMut<'_, T, 2, R>,
        do_translate: bool,
    ) -> Result<(), TransformError> {
        check_rows(coords.shape())?;
        let map = self.backward_map(do_translate)?;
        map_rows(coords, &map);
        Ok(())
    }

    /// `v -> rotate(q, v - center) + center + t`
    fn forward_map(&self, do_translate: bool) -> Result<RowMap, TransformError> {
        let rotation_inverse = self.q.inverse()?;
        self.warn_if_not_unit();
        Ok(RowMap {
            rotation: self.q,
            rotation_inverse,
            pivot_in: self.center.coords,
            pivot_out: self.center.coords + self.translation_if(do_translate),
        })
    }

    /// `v -> rotate(q⁻¹, v - center - t) + center`
    fn backward_map(&self, do_translate: bool) -> Result<RowMap, TransformError> {
        let rotation = self.q.inverse()?;
        self.warn_if_not_unit();
        Ok(RowMap {
            rotation,
            rotation_inverse: self.q,
            pivot_in: self.center.coords + self.translation_if(do_translate),
            pivot_out: self.center.coords,
        })
    }

    fn translation_if(&self, do_translate: bool) -> Vector3<f64> {
        if do_translate {
            self.translation
        } else {
            Vector3::zeros()
        }
    }

    fn warn_if_not_unit(&self) {
        let norm = self.q.norm();
        if (norm - 1.0).abs() > UNIT_NORM_TOLERANCE {
            warn!(
                "Applying transform with non-unit quaternion (norm {:.6}).",
                norm
            );
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transform {{ q: {}, center: ({:.4}, {:.4}, {:.4}), translation: ({:.4}, {:.4}, {:.4}) }}",
            self.q,
            self.center.x,
            self.center.y,
            self.center.z,
            self.translation.x,
            self.translation.y,
            self.translation.z
        )
    }
}

/// Rotation about `pivot_in`, landing relative to `pivot_out`.
#[derive(Debug, Clone, Copy)]
struct RowMap {
    rotation: Quaternion,
    rotation_inverse: Quaternion,
    pivot_in: Vector3<f64>,
    pivot_out: Vector3<f64>,
}

impl RowMap {
    #[inline]
    fn apply(&self, v: Vector3<f64>) -> Vector3<f64> {
        self.rotation
            .sandwich(&self.rotation_inverse, &(v - self.pivot_in))
            + self.pivot_out
    }
}

fn check_rows(shape: [usize; 2]) -> Result<(), TransformError> {
    if shape[1] == 3 {
        Ok(())
    } else {
        Err(TransformError::NotCoordinateRows { shape })
    }
}

fn check_shapes(input: [usize; 2], output: [usize; 2]) -> Result<(), TransformError> {
    check_rows(input)?;
    if input != output {
        return Err(TransformError::ShapeMismatch { input, output });
    }
    Ok(())
}

/// Applies `map` to each `(x, y, z)` row. Each row is read in full before it is written.
fn map_rows<T, R>(coords: &mut GridMut<'_, T, 2, R>, map: &RowMap)
where
    T: GridElement,
    R: Residency,
{
    R::launch_rows(coords.as_mut_slice(), 3, |row: &mut [T]| {
        let v = Vector3::new(row[0].to_f64(), row[1].to_f64(), row[2].to_f64());
        let mapped = map.apply(v);
        row[0] = T::from_f64(mapped.x);
        row[1] = T::from_f64(mapped.y);
        row[2] = T::from_f64(mapped.z);
    });
}
