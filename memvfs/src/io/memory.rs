use crate::alloc::BlockId;
use crate::fs::VfsError;
use crate::io::BlockStorage;

/// A fixed array of zero-initialized blocks held in a single contiguous buffer.
#[derive(Debug)]
pub struct MemoryBlockStore {
    bytes: Vec<u8>,
    block_size: usize,
    block_count: usize,
}

impl MemoryBlockStore {
    pub fn new(block_count: usize, block_size: usize) -> Self {
        Self {
            bytes: vec![0; block_count * block_size],
            block_size,
            block_count,
        }
    }

    /// Borrows the raw contents of a block.
    pub fn block(&self, blocknr: BlockId) -> Result<&[u8], VfsError> {
        let start = self.offset(blocknr)?;
        Ok(&self.bytes[start..start + self.block_size])
    }

    fn offset(&self, blocknr: BlockId) -> Result<usize, VfsError> {
        if blocknr >= self.block_count {
            return Err(VfsError::BlockOutOfRange(blocknr));
        }
        Ok(blocknr * self.block_size)
    }
}

impl BlockStorage for MemoryBlockStore {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn block_count(&self) -> usize {
        self.block_count
    }

    fn read_block(&self, blocknr: BlockId, buf: &mut [u8]) -> Result<(), VfsError> {
        let block = self.block(blocknr)?;
        if buf.len() < self.block_size {
            return Err(VfsError::BufferTooSmall {
                len: buf.len(),
                block_size: self.block_size,
            });
        }
        buf[..self.block_size].copy_from_slice(block);
        Ok(())
    }

    fn write_block(&mut self, blocknr: BlockId, buf: &[u8]) -> Result<(), VfsError> {
        let start = self.offset(blocknr)?;
        let block = &mut self.bytes[start..start + self.block_size];
        let max = buf.len().min(block.len());
        block[..max].copy_from_slice(&buf[..max]);
        // No residue from a previous owner may survive past the new contents.
        for byte in block[max..].iter_mut() {
            *byte = 0;
        }
        Ok(())
    }
}
