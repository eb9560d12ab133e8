use crate::core::random::with_random_engine;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use rand::Rng;
use std::f64::consts::TAU;
use std::fmt;
use std::ops::{Div, Mul, MulAssign};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuaternionError {
    #[error("Quaternion has zero norm and cannot be inverted")]
    DivideByZero,
}

/// A quaternion `w + xi + yj + zk`.
///
/// Rotations are represented by unit quaternions, but nothing here renormalises
/// automatically: products of unit quaternions drift away from unit norm in floating point,
/// so long compositions should call [`normalize`](Self::normalize) periodically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    inner: nalgebra::Quaternion<f64>,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            inner: nalgebra::Quaternion::new(w, x, y, z),
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Samples a rotation uniformly over SO(3).
    ///
    /// Consumes exactly three uniform draws from `rng` (Shoemake's subgroup algorithm), so a
    /// seeded generator yields a reproducible sequence.
    pub fn random<G: Rng + ?Sized>(rng: &mut G) -> Self {
        let u1: f64 = rng.r#gen();
        let u2: f64 = rng.r#gen();
        let u3: f64 = rng.r#gen();

        let a = (1.0 - u1).sqrt();
        let b = u1.sqrt();
        let (sin2, cos2) = (TAU * u2).sin_cos();
        let (sin3, cos3) = (TAU * u3).sin_cos();

        Self::new(b * cos3, a * sin2, a * cos2, b * sin3)
    }

    /// Samples a uniform rotation from the process-wide engine.
    pub fn random_uniform() -> Self {
        with_random_engine(|rng| Self::random(rng))
    }

    #[inline]
    pub fn w(&self) -> f64 {
        self.inner.w
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.inner.i
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.inner.j
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.inner.k
    }

    /// The scalar part, same as [`w`](Self::w).
    #[inline]
    pub fn real(&self) -> f64 {
        self.inner.w
    }

    #[inline]
    pub fn r_component_1(&self) -> f64 {
        self.w()
    }

    #[inline]
    pub fn r_component_2(&self) -> f64 {
        self.x()
    }

    #[inline]
    pub fn r_component_3(&self) -> f64 {
        self.y()
    }

    #[inline]
    pub fn r_component_4(&self) -> f64 {
        self.z()
    }

    pub fn conj(&self) -> Self {
        Self {
            inner: self.inner.conjugate(),
        }
    }

    pub fn norm(&self) -> f64 {
        self.inner.norm()
    }

    pub fn norm_squared(&self) -> f64 {
        self.inner.norm_squared()
    }

    pub fn inverse(&self) -> Result<Self, QuaternionError> {
        let norm_squared = self.norm_squared();
        if norm_squared == 0.0 {
            return Err(QuaternionError::DivideByZero);
        }
        Ok(Self {
            inner: self.inner.conjugate() / norm_squared,
        })
    }

    pub fn normalize(&self) -> Result<Self, QuaternionError> {
        let norm = self.norm();
        if norm == 0.0 {
            return Err(QuaternionError::DivideByZero);
        }
        Ok(Self {
            inner: self.inner / norm,
        })
    }

    /// `self * rhs⁻¹`.
    pub fn checked_div(&self, rhs: &Self) -> Result<Self, QuaternionError> {
        Ok(*self * rhs.inverse()?)
    }

    pub fn checked_div_assign(&mut self, rhs: &Self) -> Result<(), QuaternionError> {
        *self = self.checked_div(rhs)?;
        Ok(())
    }

    /// Rotates `v` by the sandwich product `q (0, v) q⁻¹`.
    pub fn rotate(&self, v: &Vector3<f64>) -> Result<Vector3<f64>, QuaternionError> {
        let inverse = self.inverse()?;
        Ok(self.sandwich(&inverse, v))
    }

    /// Applies the rotation to a point about the origin; there is no translation part.
    pub fn transform(&self, p: &Point3<f64>) -> Result<Point3<f64>, QuaternionError> {
        self.rotate(&p.coords).map(Point3::from)
    }

    /// `q (0, v) inverse` with a precomputed inverse, for per-row use.
    #[inline]
    pub(crate) fn sandwich(&self, inverse: &Self, v: &Vector3<f64>) -> Vector3<f64> {
        let pure = nalgebra::Quaternion::from_imag(*v);
        (self.inner * pure * inverse.inner).imag()
    }

    pub fn to_unit_quaternion(&self) -> Result<UnitQuaternion<f64>, QuaternionError> {
        let normalized = self.normalize()?;
        Ok(UnitQuaternion::new_unchecked(normalized.inner))
    }
}

impl From<UnitQuaternion<f64>> for Quaternion {
    fn from(q: UnitQuaternion<f64>) -> Self {
        Self {
            inner: q.into_inner(),
        }
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product; not commutative.
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            inner: self.inner * rhs.inner,
        }
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, rhs: Self) {
        self.inner = self.inner * rhs.inner;
    }
}

impl Div for Quaternion {
    type Output = Result<Self, QuaternionError>;

    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(&rhs)
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quaternion({:.6}, {:.6}, {:.6}, {:.6})",
            self.w(),
            self.x(),
            self.y(),
            self.z()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::set_random_seed;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serial_test::serial;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TOLERANCE: f64 = 1e-9;

    fn approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn assert_quaternion_eq(a: &Quaternion, b: &Quaternion) {
        assert!(
            approx_equal(a.w(), b.w())
                && approx_equal(a.x(), b.x())
                && approx_equal(a.y(), b.y())
                && approx_equal(a.z(), b.z()),
            "{a} != {b}"
        );
    }

    fn assert_vector_eq(a: &Vector3<f64>, b: &Vector3<f64>) {
        assert!((a - b).norm() < TOLERANCE, "{a:?} != {b:?}");
    }

    #[test]
    fn components_are_exposed_in_wxyz_order() {
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(q.r_component_1(), 1.0);
        assert_eq!(q.r_component_2(), 2.0);
        assert_eq!(q.r_component_3(), 3.0);
        assert_eq!(q.r_component_4(), 4.0);
        assert_eq!(q.real(), 1.0);
    }

    #[test]
    fn conj_negates_vector_part() {
        let q = Quaternion::new(1.0, 2.0, -3.0, 4.0).conj();
        assert_eq!(q, Quaternion::new(1.0, -2.0, 3.0, -4.0));
    }

    #[test]
    fn norm_is_euclidean_norm_of_components() {
        assert!(approx_equal(Quaternion::new(1.0, 2.0, 2.0, 4.0).norm(), 5.0));
    }

    #[test]
    fn multiplication_follows_hamilton_table() {
        let i = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        let j = Quaternion::new(0.0, 0.0, 1.0, 0.0);
        let k = Quaternion::new(0.0, 0.0, 0.0, 1.0);
        let minus_one = Quaternion::new(-1.0, 0.0, 0.0, 0.0);

        assert_quaternion_eq(&(i * j), &k);
        assert_quaternion_eq(&(j * i), &Quaternion::new(0.0, 0.0, 0.0, -1.0));
        assert_quaternion_eq(&(j * k), &i);
        assert_quaternion_eq(&(k * i), &j);
        assert_quaternion_eq(&(i * i), &minus_one);
        assert_quaternion_eq(&(i * j * k), &minus_one);
    }

    #[test]
    fn product_with_inverse_is_identity() {
        let q = Quaternion::new(0.3, -1.2, 2.5, 0.7);
        let inverse = q.inverse().unwrap();
        assert_quaternion_eq(&(q * inverse), &Quaternion::identity());
        assert_quaternion_eq(&(inverse * q), &Quaternion::identity());
    }

    #[test]
    fn inverse_of_zero_quaternion_is_divide_by_zero() {
        let zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(zero.inverse(), Err(QuaternionError::DivideByZero));
        assert_eq!(zero.normalize(), Err(QuaternionError::DivideByZero));
        assert_eq!(
            Quaternion::identity() / zero,
            Err(QuaternionError::DivideByZero)
        );
        assert!(zero.rotate(&Vector3::x()).is_err());
    }

    #[test]
    fn division_multiplies_by_inverse() {
        let a = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        let b = Quaternion::new(0.5, -0.5, 0.5, 1.0);
        let quotient = (a / b).unwrap();
        assert_quaternion_eq(&(quotient * b), &a);

        let mut c = a;
        c.checked_div_assign(&a).unwrap();
        assert_quaternion_eq(&c, &Quaternion::identity());
    }

    #[test]
    fn mul_assign_matches_mul() {
        let a = Quaternion::new(1.0, 0.5, -0.5, 2.0);
        let b = Quaternion::new(0.0, 1.0, 1.0, 0.0);
        let mut c = a;
        c *= b;
        assert_eq!(c, a * b);
    }

    #[test]
    fn rotate_quarter_turn_about_z() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        assert_vector_eq(&q.rotate(&Vector3::x()).unwrap(), &Vector3::y());
        assert_vector_eq(&q.rotate(&Vector3::y()).unwrap(), &-Vector3::x());
        assert_vector_eq(&q.rotate(&Vector3::z()).unwrap(), &Vector3::z());
    }

    #[test]
    fn rotate_ignores_quaternion_scale() {
        let unit = Quaternion::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0);
        let scaled = Quaternion::new(3.0, 3.0, 0.0, 0.0);
        let v = Vector3::new(0.2, -1.0, 4.0);
        assert_vector_eq(&unit.rotate(&v).unwrap(), &scaled.rotate(&v).unwrap());
    }

    #[test]
    fn transform_rotates_point_about_origin() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let p = q.transform(&Point3::new(1.0, 0.0, 5.0)).unwrap();
        assert_vector_eq(&p.coords, &Vector3::new(0.0, 1.0, 5.0));
    }

    #[test]
    fn random_quaternions_are_unit_and_reproducible() {
        let mut rng_a = StdRng::seed_from_u64(11);
        let mut rng_b = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let a = Quaternion::random(&mut rng_a);
            let b = Quaternion::random(&mut rng_b);
            assert_eq!(a, b);
            assert!(approx_equal(a.norm(), 1.0));
        }
    }

    #[test]
    fn random_rotations_have_no_preferred_axis() {
        let mut rng = StdRng::seed_from_u64(3);
        let samples = 20_000;
        let mut mean = Vector3::zeros();
        for _ in 0..samples {
            mean += Quaternion::random(&mut rng).rotate(&Vector3::z()).unwrap();
        }
        mean /= samples as f64;
        assert!(mean.norm() < 0.05, "mean rotated axis {mean:?}");
    }

    #[test]
    fn unit_quaternion_round_trip_preserves_rotation() {
        let unit = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.7);
        let q = Quaternion::from(unit);
        let back = q.to_unit_quaternion().unwrap();
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_vector_eq(&(back * v), &q.rotate(&v).unwrap());
    }

    #[test]
    #[serial]
    fn uniform_sampling_draws_from_the_global_engine() {
        set_random_seed(21);
        let q = Quaternion::random_uniform();
        set_random_seed(21);
        let expected = with_random_engine(|rng| Quaternion::random(rng));

        assert_eq!(q, expected);
        assert!(approx_equal(q.norm(), 1.0));
    }
}
