//! An in-memory virtual file system: a tree of directories and files whose
//! content lives in a fixed pool of fixed-size blocks.
//!
//! ```
//! use memvfs::Vfs;
//!
//! let mut vfs = Vfs::new(4, 8).unwrap();
//! vfs.create_file("a").unwrap();
//! vfs.write("a", b"1234567890123").unwrap();
//! assert_eq!(vfs.read("a").unwrap(), b"1234567890123");
//! assert_eq!(vfs.df().free, 2);
//! ```
mod alloc;
mod config;
mod fs;
pub mod io;
mod node;

pub use crate::alloc::{BlockAllocator, BlockId, State};
pub use crate::config::{VfsBuilder, VfsConfig, BLOCK_SIZE, NAME_LIMIT, TOTAL_BLOCKS};
pub use crate::fs::{DiskUsage, Entry, TeardownReport, Vfs, VfsError};
pub use crate::node::{validate_name, NodeKind};
