use super::element::GridElement;
use super::error::GridError;
use super::residency::{Host, Residency};
use super::shape::Shape;
use std::marker::PhantomData;

/// Read-only, non-owning view of an `N`-dimensional buffer.
///
/// The view borrows its buffer, so it can never outlive it. `R` records whether the buffer
/// lives in host or device memory.
#[derive(Debug, Clone, Copy)]
pub struct Grid<'a, T: GridElement, const N: usize, R: Residency = Host> {
    data: &'a [T],
    shape: Shape<N>,
    _residency: PhantomData<R>,
}

/// Mutable, non-owning view of an `N`-dimensional buffer.
#[derive(Debug)]
pub struct GridMut<'a, T: GridElement, const N: usize, R: Residency = Host> {
    data: &'a mut [T],
    shape: Shape<N>,
    _residency: PhantomData<R>,
}

/// Direct element access on the leading axis, implemented only by one-dimensional grids.
///
/// Higher-dimensional grids index their leading axis through `subgrid` instead, and set
/// elements only through the full multi-index form.
pub trait ScalarIndex<T: GridElement> {
    fn at(&self, index: usize) -> Result<T, GridError>;
}

pub trait ScalarIndexMut<T: GridElement>: ScalarIndex<T> {
    fn set_at(&mut self, index: usize, value: T) -> Result<(), GridError>;
}

impl<'a, T: GridElement, const N: usize, R: Residency> Grid<'a, T, N, R> {
    /// Wraps `data`, which must hold exactly the product of `dims` elements.
    pub fn from_slice(data: &'a [T], dims: [usize; N]) -> Result<Self, GridError> {
        let shape = Shape::new(dims);
        shape.check_len(data.len())?;
        Ok(Self::from_parts(data, shape))
    }

    pub(crate) fn from_parts(data: &'a [T], shape: Shape<N>) -> Self {
        Self {
            data,
            shape,
            _residency: PhantomData,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn dimension(&self, axis: usize) -> Result<usize, GridError> {
        self.shape.dimension(axis)
    }

    #[inline]
    pub fn shape(&self) -> [usize; N] {
        self.shape.dims()
    }

    /// Length of the leading axis.
    #[inline]
    pub fn len(&self) -> usize {
        self.shape.leading()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: [usize; N]) -> Result<T, GridError> {
        let offset = self.shape.offset(index)?;
        Ok(self.data[offset])
    }

    pub fn get_ref(&self, index: [usize; N]) -> Result<&'a T, GridError> {
        let offset = self.shape.offset(index)?;
        let data: &'a [T] = self.data;
        Ok(&data[offset])
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.data.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.to_vec()
    }
}

impl<'a, T: GridElement, const N: usize, R: Residency> GridMut<'a, T, N, R> {
    /// Wraps `data`, which must hold exactly the product of `dims` elements.
    pub fn from_slice_mut(data: &'a mut [T], dims: [usize; N]) -> Result<Self, GridError> {
        let shape = Shape::new(dims);
        shape.check_len(data.len())?;
        Ok(Self::from_parts(data, shape))
    }

    pub(crate) fn from_parts(data: &'a mut [T], shape: Shape<N>) -> Self {
        Self {
            data,
            shape,
            _residency: PhantomData,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn dimension(&self, axis: usize) -> Result<usize, GridError> {
        self.shape.dimension(axis)
    }

    #[inline]
    pub fn shape(&self) -> [usize; N] {
        self.shape.dims()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shape.leading()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: [usize; N]) -> Result<T, GridError> {
        let offset = self.shape.offset(index)?;
        Ok(self.data[offset])
    }

    pub fn get_mut(&mut self, index: [usize; N]) -> Result<&mut T, GridError> {
        let offset = self.shape.offset(index)?;
        Ok(&mut self.data[offset])
    }

    pub fn set(&mut self, index: [usize; N], value: T) -> Result<(), GridError> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Read-only view of the same buffer.
    pub fn as_grid(&self) -> Grid<'_, T, N, R> {
        Grid::from_parts(&*self.data, self.shape)
    }

    /// Shorter-lived mutable view of the same buffer.
    pub fn reborrow(&mut self) -> GridMut<'_, T, N, R> {
        GridMut::from_parts(&mut *self.data, self.shape)
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &*self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.data
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copies every element of `source`, whose shape must match exactly.
    pub fn copy_from(&mut self, source: &Grid<'_, T, N, R>) -> Result<(), GridError> {
        self.shape.ensure_same(&source.shape)?;
        self.data.copy_from_slice(source.data);
        Ok(())
    }
}

impl<'a, T: GridElement, R: Residency> ScalarIndex<T> for Grid<'a, T, 1, R> {
    fn at(&self, index: usize) -> Result<T, GridError> {
        self.get([index])
    }
}

impl<'a, T: GridElement, R: Residency> ScalarIndex<T> for GridMut<'a, T, 1, R> {
    fn at(&self, index: usize) -> Result<T, GridError> {
        self.get([index])
    }
}

impl<'a, T: GridElement, R: Residency> ScalarIndexMut<T> for GridMut<'a, T, 1, R> {
    fn set_at(&mut self, index: usize, value: T) -> Result<(), GridError> {
        self.set([index], value)
    }
}

macro_rules! impl_view_subgrid {
    ($($n:literal => $m:literal),* $(,)?) => {
        $(
            impl<'a, T: GridElement, R: Residency> Grid<'a, T, $n, R> {
                /// View of the slab with the leading axis fixed at `index`.
                pub fn subgrid(&self, index: usize) -> Result<Grid<'a, T, $m, R>, GridError> {
                    let (range, shape) = self.shape.leading_slab::<$m>(index)?;
                    let data: &'a [T] = self.data;
                    Ok(Grid::from_parts(&data[range], shape))
                }
            }

            impl<'a, T: GridElement, R: Residency> GridMut<'a, T, $n, R> {
                pub fn subgrid(&self, index: usize) -> Result<Grid<'_, T, $m, R>, GridError> {
                    let (range, shape) = self.shape.leading_slab::<$m>(index)?;
                    Ok(Grid::from_parts(&self.data[range], shape))
                }

                pub fn subgrid_mut(
                    &mut self,
                    index: usize,
                ) -> Result<GridMut<'_, T, $m, R>, GridError> {
                    let (range, shape) = self.shape.leading_slab::<$m>(index)?;
                    Ok(GridMut::from_parts(&mut self.data[range], shape))
                }
            }
        )*
    };
}

impl_view_subgrid!(2 => 1, 3 => 2, 4 => 3, 5 => 4, 6 => 5);
