use crate::fs::{Vfs, VfsError};
use crate::io::MemoryBlockStore;

/// Number of blocks in the pool of a default instance.
pub const TOTAL_BLOCKS: usize = 1024;
/// Size in bytes of a single block of a default instance.
pub const BLOCK_SIZE: usize = 512;
/// Names must be strictly shorter than this many bytes.
pub const NAME_LIMIT: usize = 50;

/// Fixed parameters of a VFS instance, chosen once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfsConfig {
    pub total_blocks: usize,
    pub block_size: usize,
    pub name_limit: usize,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            total_blocks: TOTAL_BLOCKS,
            block_size: BLOCK_SIZE,
            name_limit: NAME_LIMIT,
        }
    }
}

impl VfsConfig {
    /// Total capacity of the pool in bytes.
    pub fn capacity(&self) -> usize {
        self.total_blocks * self.block_size
    }

    pub(crate) fn validate(&self) -> Result<(), VfsError> {
        if self.total_blocks == 0 {
            return Err(VfsError::InvalidConfig("total blocks must be positive"));
        }
        if self.block_size == 0 {
            return Err(VfsError::InvalidConfig("block size must be positive"));
        }
        // A name limit of one would only admit the empty name.
        if self.name_limit < 2 {
            return Err(VfsError::InvalidConfig("name limit must be at least 2"));
        }
        if self.total_blocks.checked_mul(self.block_size).is_none() {
            return Err(VfsError::InvalidConfig("pool size overflows"));
        }
        Ok(())
    }
}

/// Builds a `Vfs` backed by a freshly zeroed in-memory block store.
#[derive(Debug, Default)]
pub struct VfsBuilder {
    config: VfsConfig,
}

impl From<VfsConfig> for VfsBuilder {
    fn from(config: VfsConfig) -> Self {
        VfsBuilder { config }
    }
}

impl VfsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of blocks in the pool.
    pub fn with_total_blocks(mut self, blocks: usize) -> Self {
        self.config.total_blocks = blocks;
        self
    }

    /// Sets the size in bytes of every block.
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.config.block_size = size;
        self
    }

    pub fn with_name_limit(mut self, limit: usize) -> Self {
        self.config.name_limit = limit;
        self
    }

    pub fn build(self) -> Result<Vfs<MemoryBlockStore>, VfsError> {
        self.config.validate()?;
        let dev = MemoryBlockStore::new(self.config.total_blocks, self.config.block_size);
        Vfs::with_storage(dev, self.config.name_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = VfsConfig::default();

        assert_eq!(config.total_blocks, TOTAL_BLOCKS);
        assert_eq!(config.block_size, BLOCK_SIZE);
        assert_eq!(config.capacity(), TOTAL_BLOCKS * BLOCK_SIZE);
    }

    #[test]
    fn builder_applies_settings() {
        let vfs = VfsBuilder::new()
            .with_total_blocks(4)
            .with_block_size(8)
            .with_name_limit(10)
            .build()
            .unwrap();

        assert_eq!(
            vfs.config(),
            VfsConfig {
                total_blocks: 4,
                block_size: 8,
                name_limit: 10,
            }
        );
    }

    #[test]
    fn zero_sized_pools_are_rejected() {
        let no_blocks = VfsBuilder::new().with_total_blocks(0).build();
        let no_bytes = VfsBuilder::new().with_block_size(0).build();

        assert!(matches!(no_blocks, Err(VfsError::InvalidConfig(_))));
        assert!(matches!(no_bytes, Err(VfsError::InvalidConfig(_))));
    }

    #[test]
    fn overflowing_pool_is_rejected() {
        let result = VfsBuilder::new()
            .with_total_blocks(usize::MAX)
            .with_block_size(2)
            .build();

        assert!(matches!(result, Err(VfsError::InvalidConfig(_))));
    }
}
