//! Non-volatile storage for device records
//!
//! The driver keeps its device table in a byte-addressable store (typically
//! an EEPROM) so a restarted application can skip the bus scan. Boards without
//! one can use [`RamStore`].

/// Byte-addressable persistent storage
pub trait RecordStore {
    /// Error type of the backing storage
    type Error;

    /// Total size in bytes
    fn capacity(&self) -> usize;

    /// Fill `buf` with the bytes starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns the storage error on a failed or out-of-range access
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Store `data` starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns the storage error on a failed or out-of-range access
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error>;
}

/// Error returned by [`RamStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RamStoreError {
    /// Access past the end of the buffer
    OutOfBounds,
}

/// In-memory store of `N` bytes
#[derive(Debug, Clone)]
pub struct RamStore<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> RamStore<N> {
    /// Create an erased (all 0xFF) store
    #[must_use]
    pub const fn new() -> Self {
        Self { data: [0xFF; N] }
    }

    /// Raw contents
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.data
    }

    fn range(offset: usize, len: usize) -> Result<core::ops::Range<usize>, RamStoreError> {
        let end = offset.checked_add(len).ok_or(RamStoreError::OutOfBounds)?;
        if end > N {
            return Err(RamStoreError::OutOfBounds);
        }
        Ok(offset..end)
    }
}

impl<const N: usize> Default for RamStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RecordStore for RamStore<N> {
    type Error = RamStoreError;

    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error> {
        let range = Self::range(offset, data.len())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }
}
