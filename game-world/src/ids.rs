//! Stable ids for the short-lived, frequently created/destroyed objects
//! (entities, projectiles, wrecks, harbors) — an arena-style id allocator
//! rather than a process-global counter.

use std::fmt;

macro_rules! stable_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

stable_id!(EntityId);
stable_id!(ProjectileId);
stable_id!(WreckId);
stable_id!(HarborId);

/// Monotonic id allocator. One per id kind, owned by `World`.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn next_u64(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_is_monotonic() {
        let mut alloc = IdAllocator::default();
        let a = alloc.next_u64();
        let b = alloc.next_u64();
        assert!(b > a);
    }
}
