use crate::alloc::{BlockAllocator, BlockId};
use crate::config::{VfsBuilder, VfsConfig, NAME_LIMIT};
use crate::io::{BlockStorage, MemoryBlockStore};
use crate::node::{NodeId, NodeKind, NodeTree};

use log::{debug, info, warn};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    #[error("invalid name: {0:?}")]
    InvalidName(String),
    #[error("an entry named {0:?} already exists")]
    DuplicateName(String),
    #[error("no entry named {0:?}")]
    NotFound(String),
    #[error("{0:?} is a directory")]
    IsDirectory(String),
    #[error("{0:?} is not a file")]
    NotAFile(String),
    #[error("{0:?} is not a directory")]
    NotADirectory(String),
    #[error("directory {0:?} is not empty")]
    NotEmpty(String),
    #[error("disk full, cannot allocate new block")]
    DiskFull,
    #[error("data contains a zero byte")]
    InvalidData,
    #[error("block {0} out of range")]
    BlockOutOfRange(BlockId),
    #[error("buffer of {len} bytes cannot hold a {block_size} byte block")]
    BufferTooSmall { len: usize, block_size: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// One line of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: NodeKind,
}

/// Block pool occupancy as reported by `df`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total: usize,
    pub used: usize,
    pub free: usize,
    pub percent_used: f64,
}

/// What `Vfs::teardown` reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownReport {
    /// Nodes destroyed, root included.
    pub nodes: usize,
    /// Blocks returned to the free list.
    pub blocks: usize,
}

/// An in-memory hierarchical file system over a fixed pool of fixed-size blocks.
///
/// Every operation acts on the current directory, which starts at the root and is
/// moved with `cd`. File content is stored with a trailing zero byte so the
/// logical length can be recovered from the last block alone:
///
/// ```text
/// write("a", "1234567890123") with 8 byte blocks
/// ===========================================
/// | 1 2 3 4 5 6 7 8 | 9 0 1 2 3 \0 \0 \0 |
/// ===========================================
/// ```
pub struct Vfs<T: BlockStorage = MemoryBlockStore> {
    dev: T,
    alloc: BlockAllocator,
    tree: NodeTree,
    cwd: NodeId,
    name_limit: usize,
}

impl Vfs<MemoryBlockStore> {
    /// Creates an instance with `total_blocks` blocks of `block_size` bytes each.
    pub fn new(total_blocks: usize, block_size: usize) -> Result<Self, VfsError> {
        VfsBuilder::new()
            .with_total_blocks(total_blocks)
            .with_block_size(block_size)
            .build()
    }
}

impl Default for Vfs<MemoryBlockStore> {
    fn default() -> Self {
        let config = VfsConfig::default();
        let dev = MemoryBlockStore::new(config.total_blocks, config.block_size);
        Vfs::mount(dev, NAME_LIMIT)
    }
}

impl<T: BlockStorage> Vfs<T> {
    /// Mounts an empty tree onto block storage. Every block of `dev` starts free.
    ///
    /// # Errors
    ///
    /// Storage with no blocks, zero-sized blocks, or a name limit that admits no
    /// names is rejected with `InvalidConfig`.
    pub fn with_storage(dev: T, name_limit: usize) -> Result<Self, VfsError> {
        VfsConfig {
            total_blocks: dev.block_count(),
            block_size: dev.block_size(),
            name_limit,
        }
        .validate()?;
        Ok(Self::mount(dev, name_limit))
    }

    fn mount(dev: T, name_limit: usize) -> Self {
        let alloc = BlockAllocator::new(dev.block_count());
        let tree = NodeTree::new(name_limit);
        let cwd = tree.root();
        info!(
            "Initialized VFS with {} blocks of {} bytes.",
            dev.block_count(),
            dev.block_size()
        );
        Self {
            dev,
            alloc,
            tree,
            cwd,
            name_limit,
        }
    }

    pub fn config(&self) -> VfsConfig {
        VfsConfig {
            total_blocks: self.dev.block_count(),
            block_size: self.dev.block_size(),
            name_limit: self.name_limit,
        }
    }

    pub fn mkdir(&mut self, name: &str) -> Result<(), VfsError> {
        self.tree.insert(self.cwd, name, NodeKind::Directory)?;
        Ok(())
    }

    pub fn create_file(&mut self, name: &str) -> Result<(), VfsError> {
        self.tree.insert(self.cwd, name, NodeKind::File)?;
        Ok(())
    }

    /// Replaces the content of a file with `data`.
    ///
    /// The file's previous blocks are released before the new ones are allocated,
    /// so a `DiskFull` failure leaves the file empty. Blocks allocated during the
    /// failed call are handed back and the free list is left as the release of the
    /// old blocks made it.
    pub fn write(&mut self, name: &str, data: &[u8]) -> Result<(), VfsError> {
        let file = self.file(name, VfsError::IsDirectory)?;
        // Zero terminates the content on disk.
        if data.contains(&0) {
            return Err(VfsError::InvalidData);
        }

        let block_size = self.dev.block_size();
        let mut encoded = Vec::with_capacity(data.len() + 1);
        encoded.extend_from_slice(data);
        encoded.push(0);
        let required = (encoded.len() + block_size - 1) / block_size;

        for id in self.tree.replace_blocks(file, Vec::new()) {
            self.alloc.release(id);
        }

        let mut blocks = Vec::with_capacity(required);
        for _ in 0..required {
            match self.alloc.allocate() {
                Some(id) => blocks.push(id),
                None => {
                    warn!(
                        "Disk full writing {:?}: needed {} blocks, got {}.",
                        name,
                        required,
                        blocks.len()
                    );
                    self.alloc.rollback(&blocks);
                    return Err(VfsError::DiskFull);
                }
            }
        }

        for (chunk, &id) in encoded.chunks(block_size).zip(blocks.iter()) {
            if let Err(err) = self.dev.write_block(id, chunk) {
                self.alloc.rollback(&blocks);
                return Err(err);
            }
        }

        info!(
            "Wrote {} bytes to {:?} across {} blocks.",
            data.len(),
            name,
            blocks.len()
        );
        self.tree.replace_blocks(file, blocks);
        Ok(())
    }

    /// Returns exactly the data passed to the most recent successful `write`, or an
    /// empty buffer for a file that holds no blocks.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, VfsError> {
        let file = self.file(name, VfsError::IsDirectory)?;
        let blocks = self.node_blocks(file);
        let (last, full) = match blocks.split_last() {
            Some(split) => split,
            None => return Ok(Vec::new()),
        };

        let block_size = self.dev.block_size();
        let mut buf = vec![0; block_size];
        let mut content = Vec::with_capacity(blocks.len() * block_size);
        for &id in full {
            self.dev.read_block(id, &mut buf)?;
            content.extend_from_slice(&buf);
        }

        self.dev.read_block(*last, &mut buf)?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(block_size);
        content.extend_from_slice(&buf[..end]);
        Ok(content)
    }

    pub fn delete(&mut self, name: &str) -> Result<(), VfsError> {
        let file = self.file(name, VfsError::NotAFile)?;
        let node = self.tree.remove(file);
        for &id in node.blocks() {
            self.alloc.release(id);
        }
        Ok(())
    }

    /// Removes an empty directory. Populated directories are never removed.
    pub fn rmdir(&mut self, name: &str) -> Result<(), VfsError> {
        let dir = self.dir(name)?;
        if !self.node_children(dir).is_empty() {
            return Err(VfsError::NotEmpty(name.to_string()));
        }
        self.tree.remove(dir);
        Ok(())
    }

    /// Lists the current directory in creation order.
    pub fn ls(&self) -> Vec<Entry> {
        self.node_children(self.cwd)
            .iter()
            .filter_map(|&id| self.tree.get(id))
            .map(|node| Entry {
                name: node.name().to_string(),
                kind: node.kind(),
            })
            .collect()
    }

    /// Moves into a child directory, or to the parent for `..`. Moving up from the
    /// root leaves the cursor where it is.
    pub fn cd(&mut self, name: &str) -> Result<(), VfsError> {
        if name == ".." {
            if let Some(parent) = self.tree.get(self.cwd).and_then(|node| node.parent()) {
                self.cwd = parent;
            }
        } else {
            self.cwd = self.dir(name)?;
        }
        debug!("Current directory is now {}.", self.pwd());
        Ok(())
    }

    pub fn pwd(&self) -> String {
        self.tree.path(self.cwd)
    }

    pub fn is_root(&self) -> bool {
        self.cwd == self.tree.root()
    }

    pub fn df(&self) -> DiskUsage {
        let total = self.alloc.total();
        let used = self.alloc.used_count();
        DiskUsage {
            total,
            used,
            free: self.alloc.free_count(),
            percent_used: 100.0 * used as f64 / total as f64,
        }
    }

    /// Number of blocks currently held by a file.
    pub fn block_count(&self, name: &str) -> Result<usize, VfsError> {
        let file = self.file(name, VfsError::IsDirectory)?;
        Ok(self.node_blocks(file).len())
    }

    /// Logical length of a file's content in bytes.
    pub fn file_size(&self, name: &str) -> Result<usize, VfsError> {
        self.read(name).map(|content| content.len())
    }

    /// Destroys the whole tree, returning every block to the free list.
    pub fn teardown(self) -> TeardownReport {
        let Vfs {
            mut alloc, tree, ..
        } = self;
        debug!("Tearing down {} nodes.", tree.len());
        let mut blocks = 0;
        let nodes = tree.teardown(|node| {
            for &id in node.blocks() {
                alloc.release(id);
                blocks += 1;
            }
        });
        debug_assert_eq!(alloc.free_count(), alloc.total());
        info!("Released {} nodes and {} blocks.", nodes, blocks);
        TeardownReport { nodes, blocks }
    }

    fn child(&self, name: &str) -> Result<(NodeId, NodeKind), VfsError> {
        self.tree
            .lookup(self.cwd, name)
            .and_then(|id| self.tree.get(id).map(|node| (id, node.kind())))
            .ok_or_else(|| VfsError::NotFound(name.to_string()))
    }

    /// Resolves a file in the current directory. `on_dir` builds the error for a
    /// name that turns out to be a directory.
    fn file(&self, name: &str, on_dir: fn(String) -> VfsError) -> Result<NodeId, VfsError> {
        match self.child(name)? {
            (id, NodeKind::File) => Ok(id),
            (_, NodeKind::Directory) => Err(on_dir(name.to_string())),
        }
    }

    fn dir(&self, name: &str) -> Result<NodeId, VfsError> {
        match self.child(name)? {
            (id, NodeKind::Directory) => Ok(id),
            (_, NodeKind::File) => Err(VfsError::NotADirectory(name.to_string())),
        }
    }

    fn node_blocks(&self, id: NodeId) -> &[BlockId] {
        self.tree.get(id).map(|node| node.blocks()).unwrap_or(&[])
    }

    fn node_children(&self, id: NodeId) -> &[NodeId] {
        self.tree.get(id).map(|node| node.children()).unwrap_or(&[])
    }
}
