use std::collections::VecDeque;

use log::debug;

/// The block number to access ranging from 0 (the first block) to n - 1 (the last
/// block) where n is number of blocks in the pool.
pub type BlockId = usize;

#[derive(Debug, PartialEq)]
pub enum State {
    Free,
    Used,
}

/// Tracks one bit per block in the pool, set while the block is owned by a file.
///
/// The free list alone cannot tell whether an id is already in it without a linear
/// scan, so the allocator keeps this map alongside it to catch double releases.
#[derive(Debug, Clone)]
pub struct Bitmap {
    bitmap: Vec<u64>,
    cap: usize,
}

impl Bitmap {
    pub fn new(cap: usize) -> Self {
        Self {
            bitmap: vec![0; (cap + 63) / 64],
            cap,
        }
    }

    pub fn get(&self, blocknr: BlockId) -> State {
        assert!(blocknr < self.cap, "block {} out of range", blocknr);
        let mask = 0b01_u64 << (blocknr % 64);
        if self.bitmap[blocknr / 64] & mask == 0 {
            State::Free
        } else {
            State::Used
        }
    }

    pub fn set_reserved(&mut self, blocknr: BlockId) {
        assert!(blocknr < self.cap, "block {} out of range", blocknr);
        let mask = 0b01_u64 << (blocknr % 64);
        self.bitmap[blocknr / 64] |= mask;
    }

    pub fn set_free(&mut self, blocknr: BlockId) {
        assert!(blocknr < self.cap, "block {} out of range", blocknr);
        let mask = 0b01_u64 << (blocknr % 64);
        self.bitmap[blocknr / 64] &= !mask;
    }
}

/// Hands out and reclaims block ids from a fixed pool.
///
/// Free ids are reused in FIFO order: released ids join the tail of the free list
/// and allocation always takes from the head. A fresh allocator hands out ids in
/// ascending order.
#[derive(Debug)]
pub struct BlockAllocator {
    free: VecDeque<BlockId>,
    used: Bitmap,
    total: usize,
}

impl BlockAllocator {
    pub fn new(total: usize) -> Self {
        Self {
            free: (0..total).collect(),
            used: Bitmap::new(total),
            total,
        }
    }

    /// Takes the head of the free list, or `None` when the pool is exhausted.
    pub fn allocate(&mut self) -> Option<BlockId> {
        let id = self.free.pop_front()?;
        self.used.set_reserved(id);
        debug!("Allocated block {} ({} free).", id, self.free.len());
        Some(id)
    }

    /// Appends `id` to the tail of the free list.
    ///
    /// # Panics
    ///
    /// Releasing a block that is not currently allocated is a bug in the caller.
    pub fn release(&mut self, id: BlockId) {
        assert_eq!(
            self.used.get(id),
            State::Used,
            "double release of block {}",
            id
        );
        self.used.set_free(id);
        self.free.push_back(id);
        debug!("Released block {} ({} free).", id, self.free.len());
    }

    /// Returns blocks handed out by the most recent `allocate` calls, restoring the
    /// free list to the exact order it had before them. `ids` must be in the order
    /// they were allocated.
    pub fn rollback(&mut self, ids: &[BlockId]) {
        for &id in ids.iter().rev() {
            assert_eq!(
                self.used.get(id),
                State::Used,
                "double release of block {}",
                id
            );
            self.used.set_free(id);
            self.free.push_front(id);
        }
        debug!("Rolled back {} blocks ({} free).", ids.len(), self.free.len());
    }

    pub fn state(&self, id: BlockId) -> State {
        self.used.get(id)
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn used_count(&self) -> usize {
        self.total - self.free.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_read_and_write_values_to_bitmap() {
        let mut bmp = Bitmap::new(128);

        bmp.set_reserved(2);

        assert_eq!(bmp.get(0), State::Free);
        assert_eq!(bmp.get(2), State::Used);
    }

    #[test]
    fn can_set_values_at_ends_of_bitmap() {
        let mut bmp = Bitmap::new(100);

        bmp.set_reserved(0);
        bmp.set_reserved(99);

        assert_eq!(bmp.get(0), State::Used);
        assert_eq!(bmp.get(99), State::Used);
        assert_eq!(bmp.get(64), State::Free);
    }

    #[test]
    fn can_toggle_block_between_free_and_used() {
        let mut bmp = Bitmap::new(64);

        bmp.set_reserved(10);
        bmp.set_reserved(11);
        assert_eq!(bmp.get(10), State::Used);

        bmp.set_free(10);
        assert_eq!(bmp.get(10), State::Free);
        // Neighbouring bits are untouched.
        assert_eq!(bmp.get(11), State::Used);
    }

    #[test]
    fn fresh_allocator_hands_out_ascending_ids() {
        let mut alloc = BlockAllocator::new(3);

        assert_eq!(alloc.allocate(), Some(0));
        assert_eq!(alloc.allocate(), Some(1));
        assert_eq!(alloc.allocate(), Some(2));
        assert_eq!(alloc.allocate(), None);
        assert_eq!(alloc.free_count(), 0);
        assert_eq!(alloc.used_count(), 3);
    }

    #[test]
    fn released_blocks_are_reused_in_fifo_order() {
        let mut alloc = BlockAllocator::new(4);
        let a = alloc.allocate().unwrap();
        let b = alloc.allocate().unwrap();

        alloc.release(b);
        alloc.release(a);

        // 2 and 3 were never handed out, so they come first.
        assert_eq!(alloc.allocate(), Some(2));
        assert_eq!(alloc.allocate(), Some(3));
        assert_eq!(alloc.allocate(), Some(b));
        assert_eq!(alloc.allocate(), Some(a));
    }

    #[test]
    fn rollback_restores_free_list_order() {
        let mut alloc = BlockAllocator::new(4);
        let taken: Vec<BlockId> = (0..3).map(|_| alloc.allocate().unwrap()).collect();

        alloc.rollback(&taken);

        assert_eq!(alloc.free_count(), 4);
        assert_eq!(alloc.allocate(), Some(0));
        assert_eq!(alloc.state(0), State::Used);
        assert_eq!(alloc.state(1), State::Free);
    }

    #[test]
    #[should_panic(expected = "double release")]
    fn double_release_panics() {
        let mut alloc = BlockAllocator::new(2);
        let id = alloc.allocate().unwrap();
        alloc.release(id);
        alloc.release(id);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn releasing_foreign_id_panics() {
        let mut alloc = BlockAllocator::new(2);
        alloc.release(7);
    }
}
