use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Scalar types a grid can store: single and double precision floats.
///
/// Geometry is evaluated in `f64`; elements convert through [`to_f64`](Self::to_f64) and
/// [`from_f64`](Self::from_f64) at the row boundary.
pub trait GridElement:
    sealed::Sealed + Copy + Default + Debug + PartialEq + Send + Sync + 'static
{
    /// Single-letter suffix used in binding names (`Grid3f`, `Grid3d`).
    const SUFFIX: char;
    /// Human-readable element type name.
    const NAME: &'static str;

    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

impl GridElement for f32 {
    const SUFFIX: char = 'f';
    const NAME: &'static str = "float32";

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl GridElement for f64 {
    const SUFFIX: char = 'd';
    const NAME: &'static str = "float64";

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_match_binding_convention() {
        assert_eq!(<f32 as GridElement>::SUFFIX, 'f');
        assert_eq!(<f64 as GridElement>::SUFFIX, 'd');
    }

    #[test]
    fn single_precision_round_trips_representable_values() {
        assert_eq!(f32::from_f64(0.5f32.to_f64()), 0.5);
        assert_eq!(f32::from_f64(-3.25), -3.25);
    }
}
