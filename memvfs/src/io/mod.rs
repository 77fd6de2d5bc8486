mod block;
mod memory;

pub use block::BlockStorage;
pub use memory::MemoryBlockStore;
