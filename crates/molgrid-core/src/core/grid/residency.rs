use super::element::GridElement;
use std::fmt::Debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Host grids with fewer rows than this run their row kernels sequentially.
#[cfg(feature = "parallel")]
const HOST_PARALLEL_MIN_ROWS: usize = 4096;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Host {}
    impl Sealed for super::Device {}
}

/// Type-level tag naming the memory a grid's buffer lives in.
pub trait Residency: sealed::Sealed + Copy + Debug + Default + Send + Sync + 'static {
    const IS_DEVICE: bool;
    /// Suffix appended to binding names (`""` or `"CUDA"`).
    const BINDING_SUFFIX: &'static str;

    /// Runs `kernel` once per `row_len`-wide row of `data`.
    ///
    /// Rows are disjoint, so kernels may run in any order or concurrently.
    fn launch_rows<T, F>(data: &mut [T], row_len: usize, kernel: F)
    where
        T: GridElement,
        F: Fn(&mut [T]) + Send + Sync;
}

/// Buffer in ordinary host memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Host;

/// Buffer in device memory obtained from a [`DeviceArena`](super::DeviceArena).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Device;

impl Residency for Host {
    const IS_DEVICE: bool = false;
    const BINDING_SUFFIX: &'static str = "";

    fn launch_rows<T, F>(data: &mut [T], row_len: usize, kernel: F)
    where
        T: GridElement,
        F: Fn(&mut [T]) + Send + Sync,
    {
        if row_len == 0 {
            return;
        }

        #[cfg(feature = "parallel")]
        {
            if data.len() / row_len >= HOST_PARALLEL_MIN_ROWS {
                data.par_chunks_mut(row_len).for_each(kernel);
                return;
            }
        }

        data.chunks_mut(row_len).for_each(kernel);
    }
}

impl Residency for Device {
    const IS_DEVICE: bool = true;
    const BINDING_SUFFIX: &'static str = "CUDA";

    fn launch_rows<T, F>(data: &mut [T], row_len: usize, kernel: F)
    where
        T: GridElement,
        F: Fn(&mut [T]) + Send + Sync,
    {
        if row_len == 0 {
            return;
        }

        // One logical thread per row, regardless of size.
        #[cfg(feature = "parallel")]
        data.par_chunks_mut(row_len).for_each(kernel);

        #[cfg(not(feature = "parallel"))]
        data.chunks_mut(row_len).for_each(kernel);
    }
}
