use super::error::GridError;
use std::ops::Range;

/// Per-axis sizes of an `N`-dimensional row-major grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape<const N: usize> {
    dims: [usize; N],
}

impl<const N: usize> Shape<N> {
    pub const fn new(dims: [usize; N]) -> Self {
        Self { dims }
    }

    #[inline]
    pub const fn ndim(&self) -> usize {
        N
    }

    #[inline]
    pub fn dims(&self) -> [usize; N] {
        self.dims
    }

    /// Total element count, or `None` when it overflows `usize`.
    pub fn checked_size(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
    }

    pub fn dimension(&self, axis: usize) -> Result<usize, GridError> {
        self.dims
            .get(axis)
            .copied()
            .ok_or(GridError::AxisOutOfRange { axis, ndim: N })
    }

    /// Size of the leading axis, `0` for a zero-dimensional shape.
    #[inline]
    pub fn leading(&self) -> usize {
        self.dims.first().copied().unwrap_or(0)
    }

    /// Row-major offset of a full multi-index.
    pub fn offset(&self, index: [usize; N]) -> Result<usize, GridError> {
        let mut offset = 0;
        for (axis, (&i, &bound)) in index.iter().zip(self.dims.iter()).enumerate() {
            if i >= bound {
                return Err(GridError::IndexOutOfRange {
                    axis,
                    index: i,
                    bound,
                });
            }
            offset = offset * bound + i;
        }
        Ok(offset)
    }

    /// Element range and trailing shape of the slab with the leading axis fixed at `index`.
    ///
    /// `M` must equal `N - 1`.
    pub(crate) fn leading_slab<const M: usize>(
        &self,
        index: usize,
    ) -> Result<(Range<usize>, Shape<M>), GridError> {
        debug_assert_eq!(M + 1, N);
        let bound = self.leading();
        if index >= bound {
            return Err(GridError::IndexOutOfRange {
                axis: 0,
                index,
                bound,
            });
        }
        let mut dims = [0usize; M];
        dims.copy_from_slice(&self.dims[1..]);
        let stride: usize = dims.iter().product();
        Ok((index * stride..(index + 1) * stride, Shape::new(dims)))
    }

    pub(crate) fn check_len(&self, len: usize) -> Result<(), GridError> {
        match self.checked_size() {
            Some(expected) if expected == len => Ok(()),
            Some(expected) => Err(GridError::LengthMismatch {
                expected,
                actual: len,
            }),
            None => Err(GridError::LengthMismatch {
                expected: usize::MAX,
                actual: len,
            }),
        }
    }

    pub(crate) fn ensure_same(&self, other: &Shape<N>) -> Result<(), GridError> {
        if self == other {
            Ok(())
        } else {
            Err(GridError::ShapeMismatch {
                expected: self.dims.to_vec(),
                actual: other.dims.to_vec(),
            })
        }
    }
}

impl<const N: usize> From<[usize; N]> for Shape<N> {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims)
    }
}
