use super::arena::{DeviceArena, DeviceBuffer};
use super::element::GridElement;
use super::error::GridError;
use super::residency::{Device, Host};
use super::shape::Shape;
use super::view::{Grid, GridMut, ScalarIndex, ScalarIndexMut};
use tracing::debug;

/// Owning `N`-dimensional grid.
///
/// The host buffer is allocated at construction. A device mirror is created by the first
/// [`to_device`](Self::to_device) call and kept in sync only through explicit
/// `to_device` / [`to_host`](Self::to_host) calls. Both buffers are released on drop.
///
/// `ManagedGrid` is deliberately not `Clone`; use [`try_clone`](Self::try_clone) for a deep
/// copy, since copying can fail to allocate.
#[derive(Debug)]
pub struct ManagedGrid<T: GridElement, const N: usize> {
    shape: Shape<N>,
    host: Vec<T>,
    device: Option<DeviceBuffer<T>>,
    arena: DeviceArena,
}

fn allocate_host<T: GridElement>(len: usize) -> Result<Vec<T>, GridError> {
    let mut host = Vec::new();
    host.try_reserve_exact(len)
        .map_err(|e| GridError::AllocationFailure {
            requested_bytes: len.saturating_mul(std::mem::size_of::<T>()),
            reason: e.to_string(),
        })?;
    host.resize(len, T::default());
    Ok(host)
}

impl<T: GridElement, const N: usize> ManagedGrid<T, N> {
    /// Allocates a zero-filled grid whose device mirror, if requested later, comes from the
    /// global arena.
    pub fn new(dims: [usize; N]) -> Result<Self, GridError> {
        Self::with_arena(dims, DeviceArena::global().clone())
    }

    pub fn with_arena(dims: [usize; N], arena: DeviceArena) -> Result<Self, GridError> {
        let shape = Shape::new(dims);
        let len = shape
            .checked_size()
            .ok_or_else(|| GridError::AllocationFailure {
                requested_bytes: usize::MAX,
                reason: format!("element count of {dims:?} overflows usize"),
            })?;
        let host = allocate_host::<T>(len)?;
        debug!("Allocated {:?} {} grid on host.", dims, T::NAME);
        Ok(Self {
            shape,
            host,
            device: None,
            arena,
        })
    }

    /// Takes ownership of `data`, which must hold exactly the product of `dims` elements.
    pub fn from_vec(data: Vec<T>, dims: [usize; N]) -> Result<Self, GridError> {
        let shape = Shape::new(dims);
        shape.check_len(data.len())?;
        Ok(Self {
            shape,
            host: data,
            device: None,
            arena: DeviceArena::global().clone(),
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.host.len()
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
        self.cpu().get(index)
    }

    pub fn get_mut(&mut self, index: [usize; N]) -> Result<&mut T, GridError> {
        let offset = self.shape.offset(index)?;
        Ok(&mut self.host[offset])
    }

    pub fn set(&mut self, index: [usize; N], value: T) -> Result<(), GridError> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// View of the host buffer.
    pub fn cpu(&self) -> Grid<'_, T, N, Host> {
        Grid::from_parts(self.host.as_slice(), self.shape)
    }

    pub fn cpu_mut(&mut self) -> GridMut<'_, T, N, Host> {
        GridMut::from_parts(self.host.as_mut_slice(), self.shape)
    }

    /// View of the device mirror as of the last synchronisation.
    pub fn gpu(&self) -> Result<Grid<'_, T, N, Device>, GridError> {
        let device = self.device.as_ref().ok_or(GridError::DeviceMirrorMissing)?;
        Ok(Grid::from_parts(device.as_slice(), self.shape))
    }

    pub fn gpu_mut(&mut self) -> Result<GridMut<'_, T, N, Device>, GridError> {
        let device = self.device.as_mut().ok_or(GridError::DeviceMirrorMissing)?;
        Ok(GridMut::from_parts(device.as_mut_slice(), self.shape))
    }

    #[inline]
    pub fn has_device_mirror(&self) -> bool {
        self.device.is_some()
    }

    /// Copies the host buffer to the device, allocating the mirror on first use.
    ///
    /// Blocks until the copy is complete.
    pub fn to_device(&mut self) -> Result<(), GridError> {
        if self.device.is_none() {
            self.device = Some(self.arena.allocate::<T>(self.host.len())?);
        }
        if let Some(device) = self.device.as_mut() {
            device.copy_from_host(&self.host)?;
        }
        Ok(())
    }

    /// Copies the device mirror back over the host buffer. Blocks until complete.
    pub fn to_host(&mut self) -> Result<(), GridError> {
        let device = self.device.as_ref().ok_or(GridError::DeviceMirrorMissing)?;
        device.copy_to_host(&mut self.host)
    }

    /// Zeroes the host buffer and the device mirror, if any.
    pub fn fill_zero(&mut self) {
        self.host.fill(T::default());
        if let Some(device) = self.device.as_mut() {
            device.as_mut_slice().fill(T::default());
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.host
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.host
    }

    pub fn into_vec(self) -> Vec<T> {
        let Self { host, .. } = self;
        host
    }

    /// Deep copy of the host buffer and of the device mirror if one exists.
    pub fn try_clone(&self) -> Result<Self, GridError> {
        let mut host = allocate_host::<T>(self.host.len())?;
        host.copy_from_slice(&self.host);
        let device = self
            .device
            .as_ref()
            .map(DeviceBuffer::try_clone)
            .transpose()?;
        Ok(Self {
            shape: self.shape,
            host,
            device,
            arena: self.arena.clone(),
        })
    }
}

impl<T: GridElement> ScalarIndex<T> for ManagedGrid<T, 1> {
    fn at(&self, index: usize) -> Result<T, GridError> {
        self.get([index])
    }
}

impl<T: GridElement> ScalarIndexMut<T> for ManagedGrid<T, 1> {
    fn set_at(&mut self, index: usize, value: T) -> Result<(), GridError> {
        self.set([index], value)
    }
}

macro_rules! impl_managed_subgrid {
    ($($n:literal => $m:literal),* $(,)?) => {
        $(
            impl<T: GridElement> ManagedGrid<T, $n> {
                /// Host view of the slab with the leading axis fixed at `index`.
                pub fn subgrid(&self, index: usize) -> Result<Grid<'_, T, $m, Host>, GridError> {
                    let (range, shape) = self.shape.leading_slab::<$m>(index)?;
                    Ok(Grid::from_parts(&self.host[range], shape))
                }

                pub fn subgrid_mut(
                    &mut self,
                    index: usize,
                ) -> Result<GridMut<'_, T, $m, Host>, GridError> {
                    let (range, shape) = self.shape.leading_slab::<$m>(index)?;
                    Ok(GridMut::from_parts(&mut self.host[range], shape))
                }
            }
        )*
    };
}

impl_managed_subgrid!(2 => 1, 3 => 2, 4 => 3, 5 => 4, 6 => 5);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_allocates_zeroed_buffer_of_declared_shape() {
        let grid = ManagedGrid::<f32, 3>::new([2, 3, 4]).unwrap();
        assert_eq!(grid.size(), 24);
        assert_eq!(grid.shape(), [2, 3, 4]);
        assert_eq!(grid.dimension(0), Ok(2));
        assert!(grid.as_slice().iter().all(|&v| v == 0.0));
        assert!(!grid.has_device_mirror());
    }

    #[test]
    fn overflowing_shape_is_an_allocation_failure() {
        let result = ManagedGrid::<f64, 2>::new([usize::MAX, 2]);
        assert!(matches!(
            result,
            Err(GridError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn elements_are_set_by_multi_index_and_read_through_subgrids() {
        let mut grid = ManagedGrid::<f32, 2>::new([8, 3]).unwrap();
        grid.set([6, 1], 1.0).unwrap();
        grid.subgrid_mut(7).unwrap().set_at(2, -9.0).unwrap();

        assert_eq!(grid.subgrid(6).unwrap().at(1), Ok(1.0));
        assert_eq!(grid.get([7, 2]), Ok(-9.0));
        assert!(matches!(
            grid.set([8, 0], 1.0),
            Err(GridError::IndexOutOfRange { axis: 0, index: 8, bound: 8 })
        ));
    }

    #[test]
    fn one_dimensional_managed_grid_supports_scalar_indexing() {
        let mut grid = ManagedGrid::<f64, 1>::new([3]).unwrap();
        grid.set_at(1, 2.5).unwrap();
        assert_eq!(grid.at(1), Ok(2.5));
        assert!(grid.at(3).is_err());
    }

    #[test]
    fn gpu_view_requires_explicit_transfer() {
        let mut grid = ManagedGrid::<f32, 1>::from_vec(vec![1.0, 2.0], [2]).unwrap();
        assert_eq!(grid.gpu().unwrap_err(), GridError::DeviceMirrorMissing);
        assert_eq!(grid.to_host().unwrap_err(), GridError::DeviceMirrorMissing);

        grid.to_device().unwrap();
        assert_eq!(grid.gpu().unwrap().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn host_and_device_change_only_on_explicit_sync() {
        let mut grid = ManagedGrid::<f32, 1>::from_vec(vec![1.0, 2.0], [2]).unwrap();
        grid.to_device().unwrap();

        grid.set([0], 10.0).unwrap();
        assert_eq!(grid.gpu().unwrap().get([0]), Ok(1.0));

        grid.gpu_mut().unwrap().set([1], 20.0).unwrap();
        assert_eq!(grid.get([1]), Ok(2.0));

        grid.to_host().unwrap();
        assert_eq!(grid.as_slice(), &[1.0, 20.0]);
    }

    #[test]
    fn device_mirror_is_released_on_drop() {
        let arena = DeviceArena::unbounded();
        {
            let mut grid = ManagedGrid::<f64, 2>::with_arena([4, 3], arena.clone()).unwrap();
            grid.to_device().unwrap();
            assert_eq!(arena.bytes_in_use(), 96);
        }
        assert_eq!(arena.bytes_in_use(), 0);
    }

    #[test]
    fn to_device_fails_when_arena_is_exhausted() {
        let arena = DeviceArena::with_capacity(16);
        let mut grid = ManagedGrid::<f32, 2>::with_arena([2, 3], arena).unwrap();
        assert!(matches!(
            grid.to_device(),
            Err(GridError::AllocationFailure { requested_bytes: 24, .. })
        ));
        assert!(!grid.has_device_mirror());
    }

    #[test]
    fn try_clone_does_not_alias_either_buffer() {
        let mut original = ManagedGrid::<f32, 2>::from_vec(vec![1.0; 6], [2, 3]).unwrap();
        original.to_device().unwrap();

        let mut copy = original.try_clone().unwrap();
        copy.set([0, 0], 5.0).unwrap();
        copy.gpu_mut().unwrap().set([1, 1], 7.0).unwrap();

        assert_eq!(original.get([0, 0]), Ok(1.0));
        assert_eq!(original.gpu().unwrap().get([1, 1]), Ok(1.0));
        assert_eq!(copy.shape(), original.shape());
    }

    #[test]
    fn fill_zero_clears_host_and_device() {
        let mut grid = ManagedGrid::<f64, 1>::from_vec(vec![3.0; 4], [4]).unwrap();
        grid.to_device().unwrap();
        grid.fill_zero();
        assert!(grid.as_slice().iter().all(|&v| v == 0.0));
        assert!(grid.gpu().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_vec_rejects_mismatched_length() {
        assert!(matches!(
            ManagedGrid::<f32, 2>::from_vec(vec![0.0; 5], [2, 3]),
            Err(GridError::LengthMismatch { expected: 6, actual: 5 })
        ));
    }

    #[test]
    fn emptiness_follows_the_leading_axis() {
        let rows = ManagedGrid::<f64, 2>::new([3, 0]).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(!rows.is_empty());

        let none = ManagedGrid::<f64, 2>::new([0, 3]).unwrap();
        assert!(none.is_empty());
    }
}
