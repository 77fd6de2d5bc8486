use crate::alloc::BlockId;
use crate::fs::VfsError;

/// The seam between the namespace tree and raw bytes. Everything above this trait
/// only deals in block ids; implementors own the bytes.
pub trait BlockStorage {
    /// Size in bytes of every block in the store.
    fn block_size(&self) -> usize;
    /// The total number of blocks available in the store.
    fn block_count(&self) -> usize;
    /// Reads the full raw block into the provided buffer.
    ///
    /// # Errors
    ///
    /// Attempting to read a block out of range, or into a buffer shorter than
    /// `block_size()`, will return an error.
    fn read_block(&self, blocknr: BlockId, buf: &mut [u8]) -> Result<(), VfsError>;
    /// Copies up to `block_size()` bytes into the block. A shorter buffer leaves the
    /// remainder of the block zero filled; a longer one is truncated.
    ///
    /// # Errors
    ///
    /// Attempting to write a block out of range will return an error.
    fn write_block(&mut self, blocknr: BlockId, buf: &[u8]) -> Result<(), VfsError>;
}
