use super::element::GridElement;
use super::error::GridError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use tracing::{debug, instrument, trace};

static GLOBAL_ARENA: LazyLock<DeviceArena> = LazyLock::new(DeviceArena::unbounded);

#[derive(Debug)]
struct ArenaLedger {
    capacity: Option<usize>,
    in_use: AtomicUsize,
}

impl ArenaLedger {
    fn reserve(&self, bytes: usize) -> Result<(), GridError> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                let next = used.checked_add(bytes)?;
                match self.capacity {
                    Some(capacity) if next > capacity => None,
                    _ => Some(next),
                }
            })
            .map(|_| ())
            .map_err(|used| GridError::AllocationFailure {
                requested_bytes: bytes,
                reason: match self.capacity {
                    Some(capacity) => format!(
                        "device arena exhausted ({used} of {capacity} bytes in use)"
                    ),
                    None => "device arena byte count overflow".to_string(),
                },
            })
    }

    fn release(&self, bytes: usize) {
        self.in_use.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Handle to the device memory pool.
///
/// Device memory is simulated in process memory; the arena only does the accounting
/// (capacity, bytes in use) a real device allocator would. Clones share one pool.
#[derive(Debug, Clone)]
pub struct DeviceArena {
    ledger: Arc<ArenaLedger>,
}

impl DeviceArena {
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self::new(Some(capacity_bytes))
    }

    fn new(capacity: Option<usize>) -> Self {
        Self {
            ledger: Arc::new(ArenaLedger {
                capacity,
                in_use: AtomicUsize::new(0),
            }),
        }
    }

    /// The process-wide default arena, with no capacity limit.
    pub fn global() -> &'static DeviceArena {
        &GLOBAL_ARENA
    }

    pub fn capacity(&self) -> Option<usize> {
        self.ledger.capacity
    }

    pub fn bytes_in_use(&self) -> usize {
        self.ledger.in_use.load(Ordering::Acquire)
    }

    /// Allocates a zero-initialised buffer of `len` elements.
    #[instrument(level = "trace", skip(self), fields(element = T::NAME))]
    pub fn allocate<T: GridElement>(&self, len: usize) -> Result<DeviceBuffer<T>, GridError> {
        let bytes = len
            .checked_mul(std::mem::size_of::<T>())
            .ok_or_else(|| GridError::AllocationFailure {
                requested_bytes: usize::MAX,
                reason: format!("{len} elements of {} overflow the address space", T::NAME),
            })?;

        self.ledger.reserve(bytes)?;

        let mut data = Vec::new();
        if let Err(e) = data.try_reserve_exact(len) {
            self.ledger.release(bytes);
            return Err(GridError::AllocationFailure {
                requested_bytes: bytes,
                reason: e.to_string(),
            });
        }
        data.resize(len, T::default());

        debug!(
            "Allocated {} device bytes ({} in use).",
            bytes,
            self.bytes_in_use()
        );

        Ok(DeviceBuffer {
            data: data.into_boxed_slice(),
            bytes,
            ledger: Arc::clone(&self.ledger),
        })
    }
}

/// An allocation owned by exactly one holder; its bytes return to the arena on drop.
#[derive(Debug)]
pub struct DeviceBuffer<T: GridElement> {
    data: Box<[T]>,
    bytes: usize,
    ledger: Arc<ArenaLedger>,
}

impl<T: GridElement> DeviceBuffer<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Blocking host-to-device copy. Returns once the data is visible on the device.
    pub fn copy_from_host(&mut self, source: &[T]) -> Result<(), GridError> {
        self.check_len(source.len())?;
        self.data.copy_from_slice(source);
        trace!("Copied {} bytes host -> device.", self.bytes);
        Ok(())
    }

    /// Blocking device-to-host copy.
    pub fn copy_to_host(&self, target: &mut [T]) -> Result<(), GridError> {
        self.check_len(target.len())?;
        target.copy_from_slice(&self.data);
        trace!("Copied {} bytes device -> host.", self.bytes);
        Ok(())
    }

    /// Deep copy drawn from the same arena.
    pub fn try_clone(&self) -> Result<Self, GridError> {
        let arena = DeviceArena {
            ledger: Arc::clone(&self.ledger),
        };
        let mut copy = arena.allocate::<T>(self.len())?;
        copy.data.copy_from_slice(&self.data);
        Ok(copy)
    }

    fn check_len(&self, len: usize) -> Result<(), GridError> {
        if len == self.data.len() {
            Ok(())
        } else {
            Err(GridError::LengthMismatch {
                expected: self.data.len(),
                actual: len,
            })
        }
    }
}

impl<T: GridElement> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        self.ledger.release(self.bytes);
    }
}
