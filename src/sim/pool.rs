//! Fixed-capacity object pools (arena + free list)
//!
//! Entities are created once and recycled. A slot index is a stable handle for
//! the lifetime of the pool; whether it is in use is tracked on the entity
//! itself through [`Poolable`].

use serde::{Deserialize, Serialize};

/// Pool membership of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoolState {
    /// Parked: hidden, no collider
    #[default]
    Pooled,
    Active,
}

pub trait Poolable {
    fn pool_state(&self) -> PoolState;
    fn set_pool_state(&mut self, state: PoolState);

    fn is_active(&self) -> bool {
        self.pool_state() == PoolState::Active
    }
}

#[derive(Debug, Clone)]
pub struct Pool<T> {
    items: Vec<T>,
    /// Free slots, popped from the back so low indices are reused first
    free: Vec<usize>,
}

impl<T: Poolable> Pool<T> {
    pub fn new(capacity: usize, mut make: impl FnMut(usize) -> T) -> Self {
        Self {
            items: (0..capacity).map(&mut make).collect(),
            free: (0..capacity).rev().collect(),
        }
    }

    /// Take a parked slot, or `None` when exhausted
    pub fn acquire(&mut self) -> Option<usize> {
        let index = self.free.pop()?;
        self.items[index].set_pool_state(PoolState::Active);
        Some(index)
    }

    /// Park a slot; false if it was not active
    pub fn release(&mut self, index: usize) -> bool {
        match self.items.get_mut(index) {
            Some(item) if item.is_active() => {
                item.set_pool_state(PoolState::Pooled);
                self.free.push(index);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Active entities in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items.iter().enumerate().filter(|(_, item)| item.is_active())
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.items
            .iter_mut()
            .enumerate()
            .filter(|(_, item)| item.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.items.len() - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Dummy {
        state: PoolState,
    }

    impl Poolable for Dummy {
        fn pool_state(&self) -> PoolState {
            self.state
        }
        fn set_pool_state(&mut self, state: PoolState) {
            self.state = state;
        }
    }

    #[test]
    fn test_acquire_until_exhausted() {
        let mut pool = Pool::new(2, |_| Dummy::default());
        assert_eq!(pool.acquire(), Some(0));
        assert_eq!(pool.acquire(), Some(1));
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_release_recycles() {
        let mut pool = Pool::new(3, |_| Dummy::default());
        let a = pool.acquire().expect("slot");
        pool.acquire().expect("slot");
        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert_eq!(pool.acquire(), Some(a));
        assert_eq!(pool.iter_active().count(), 2);
    }

    #[test]
    fn test_release_out_of_range() {
        let mut pool = Pool::new(1, |_| Dummy::default());
        assert!(!pool.release(7));
    }
}
